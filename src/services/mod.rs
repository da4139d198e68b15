pub mod edit_request;
pub mod lock;
pub mod realtime;
pub mod session;
pub mod submission;

pub use edit_request::EditRequestService;
pub use session::MarkEntrySession;
pub use submission::SubmissionService;
