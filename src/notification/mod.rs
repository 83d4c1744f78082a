//! Email notifications for task lifecycle events.
//!
//! The dispatcher drains the lifecycle event queue on its own task, resolves
//! the task owner, renders a message, and hands it to a [`ports::Mailer`].
//! Delivery never feeds back into the mutation that produced the event.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
