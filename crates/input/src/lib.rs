//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::PlayerAction`]. The host
//! turns those actions into calls on the core session; this crate knows
//! nothing about board state.

pub mod map;

pub use circle_pop_types as types;

pub use map::{handle_key_event, should_quit};
