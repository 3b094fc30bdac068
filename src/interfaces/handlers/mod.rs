pub mod comments;
pub mod home;
pub mod images;
pub mod stats;
pub mod storage;
pub mod system;
