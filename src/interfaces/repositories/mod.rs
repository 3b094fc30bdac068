pub mod comment;
pub mod image_set;
pub mod sqlx_repo;
pub mod stats;
