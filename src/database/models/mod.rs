pub mod conversation;
pub mod user;

pub use conversation::Participation;
pub use user::User;
