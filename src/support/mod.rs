//! Cross-cutting utilities

pub mod time;
