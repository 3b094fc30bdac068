pub mod comment;
pub mod image;
pub mod stats;
