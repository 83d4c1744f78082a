//! Adapter implementations of task ports.

pub mod cache;
pub mod memory;
pub mod postgres;
pub mod queue;
