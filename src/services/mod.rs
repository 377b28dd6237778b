pub mod auth;
pub mod bootstrap_admin;
pub mod chatbot;
pub mod complaint;
pub mod dashboard;
pub mod export;
pub mod feedback;
pub mod geo;
pub mod upload;

pub use auth::AuthService;
pub use chatbot::ChatSessions;
pub use complaint::ComplaintService;
pub use feedback::FeedbackService;
pub use upload::{UploadConfig, UploadService};
