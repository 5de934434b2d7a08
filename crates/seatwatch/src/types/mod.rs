//! Core data types shared by the fetcher, extractor, notifier and loop.

pub mod enrollment;
pub mod error;

pub use enrollment::*;
pub use error::*;
