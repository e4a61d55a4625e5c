mod handler;
mod model;

pub use handler::{lookup, me};
