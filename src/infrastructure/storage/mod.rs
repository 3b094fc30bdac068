pub mod blob;
pub mod local;
