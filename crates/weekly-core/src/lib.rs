pub mod board;
pub mod clock;
pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod generation;
pub mod mail;
pub mod notes;
pub mod presentation;
pub mod publish;
pub mod render;
pub mod session;

pub use error::{Result, WeeklyError};
