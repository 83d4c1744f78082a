//! Mail transport adapters.

mod logging;
mod memory;

pub use logging::LogMailer;
pub use memory::RecordingMailer;
