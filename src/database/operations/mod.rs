pub mod conversation;
pub mod user;

pub use conversation::{ConversationOperation, ReadMarker};
pub use user::UserOperation;
