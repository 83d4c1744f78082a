//! In-memory task adapters.

mod events;
mod task;

pub use events::RecordingEventPublisher;
pub use task::InMemoryTaskRepository;
