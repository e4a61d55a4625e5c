mod handler;
mod model;

pub use handler::unread_count;
