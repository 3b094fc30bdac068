pub mod cache;
pub mod db;
pub mod media;
pub mod storage;
pub mod utils;
pub mod web;
