pub mod admin;
pub mod auth;
pub mod chat;
pub mod complaint;
pub mod feedback;

pub use auth::*;
