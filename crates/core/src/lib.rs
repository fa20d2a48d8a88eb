#![forbid(unsafe_code)]

pub mod analyzer;
pub mod model;
pub mod scoring;
pub mod time;

pub use time::Clock;
