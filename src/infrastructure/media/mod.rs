pub mod paths;
pub mod variants;
