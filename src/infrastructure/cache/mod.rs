pub mod stats_cache;
