//! Infrastructure adapters. Implement ports.
//!
//! Storage backends, the AI suggester, the terminal UI. Map errors to DomainError.

pub mod ai;
pub mod persistence;
pub mod ui;
