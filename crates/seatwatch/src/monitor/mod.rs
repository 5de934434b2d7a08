//! The poll loop: fetch, compare, notify, sleep.

pub mod controller;
pub mod state;

pub use controller::{Monitor, PollOutcome, StepReport};
pub use state::{backoff, MonitorState, Transition};
