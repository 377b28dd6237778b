pub mod complaint;
pub mod feedback;
pub mod user;

pub use complaint::{ComplaintStatus, Entity as Complaint, Model as ComplaintModel};
pub use feedback::{Entity as Feedback, Model as FeedbackModel};
pub use user::{Entity as User, Model as UserModel};
