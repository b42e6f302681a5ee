pub mod attachment;
pub mod task;
pub mod user;

pub use attachment::Attachment;
pub use task::{Task, TaskWithAttachment};
pub use user::{User, UserProfile};
