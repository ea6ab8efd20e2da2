//! Utility modules for the screenplay sync core

pub mod scheduler;

pub use scheduler::{Millis, ScheduledTask, Throttle};
