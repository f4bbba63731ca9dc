mod comment;
mod dashboard;
mod feedback;
mod id;
mod request;
mod user;

pub use comment::*;
pub use dashboard::*;
pub use feedback::*;
pub use id::IdInput;
pub use request::*;
pub use user::*;
