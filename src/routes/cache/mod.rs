mod handler;

pub use handler::user_cache_stats;
