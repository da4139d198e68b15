pub mod common;
pub mod marks;
pub mod reviews;
pub mod rubrics;
pub mod teams;

pub use common::response::ApiAck;
