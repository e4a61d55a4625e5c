mod handler;
mod model;

pub use handler::mark_read;
