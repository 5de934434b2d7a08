//! CLI subcommand implementations for the seatwatch binary.

pub mod check;
pub mod run;
pub mod test_notify;
