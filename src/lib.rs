//! Circle Pop (workspace facade crate).
//!
//! Re-exports the workspace crates as `circle_pop::{core,input,term,types}` and
//! holds the terminal runner's own pieces: configuration, the score store and
//! the keyboard session that drives the core.

pub mod app;
pub mod config;
pub mod scores;

pub use circle_pop_core as core;
pub use circle_pop_input as input;
pub use circle_pop_term as term;
pub use circle_pop_types as types;
