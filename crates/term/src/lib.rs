//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It avoids widget
//! toolkits and instead renders into a simple framebuffer that is diffed and
//! flushed to the terminal with `crossterm`.
//!
//! - [`fb`]: styled character framebuffer
//! - [`game_view`]: pure mapping from a core snapshot to a framebuffer
//! - [`renderer`]: raw-mode terminal output with diff encoding

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use circle_pop_core as core;
pub use circle_pop_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, HudInfo, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
