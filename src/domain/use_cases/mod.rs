pub mod comments;
pub mod images;
pub mod stats;
