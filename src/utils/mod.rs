pub mod logging;
pub mod remarks;
pub mod validate;

pub use logging::init_tracing;
