//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains all the game rules, state management, and session logic.
//! It has **zero dependencies** on UI, input devices, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Unit tests for every rule and transition
//! - **Portable**: Can run in any host (terminal, GUI, headless)
//!
//! # Module Structure
//!
//! - [`board`]: N×N grid with fit testing, hover preview and both clearing rules
//! - [`game_state`]: Session state machine (drag, hover, drop, scoring, game over)
//! - [`hand`]: Hand slots, the rotating color pool and the constrained generator
//! - [`pieces`]: The 24 weighted shapes and weighted random selection
//! - [`rng`]: Seeded LCG used for every random choice
//! - [`scoring`]: Placement, color-match and line-clear points with combos
//! - [`snapshot`]: Read-only state copy for hosts
//!
//! # Game Rules
//!
//! - A piece may be dropped anywhere its blocks land in bounds on empty cells
//! - A drop first removes same-color groups of 3+ that touch an existing block,
//!   then every full row and column
//! - Each hand has distinct colors; a placed color leaves the pool until every
//!   color has been used
//! - An emptied hand is redealt so that at least two pieces fit when possible
//! - The game ends when no piece in the hand fits anywhere
//!
//! # Example
//!
//! ```
//! use circle_pop_core::{DropOutcome, GameState};
//! use circle_pop_types::GameMode;
//!
//! let mut game = GameState::new(GameMode::Classic, 12345);
//!
//! // Pick up the first piece, preview it, drop it
//! game.begin_drag(0).unwrap();
//! game.update_hover(0, 0);
//! let outcome = game.resolve_drop(None);
//!
//! assert!(matches!(outcome, DropOutcome::Placed(_)));
//! assert!(game.score() > 0); // Every block placed scores a point
//! ```

pub mod board;
pub mod game_state;
pub mod hand;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use circle_pop_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardCell, LegalOrigins, LinePreview};
pub use game_state::{DragError, DropOutcome, GameState, Phase, PlacementReport};
pub use hand::{generate_hand, ColorPool, Hand, HandDeal};
pub use pieces::{deal_piece, select_random_shape, Piece, PieceShape, ShapeFamily, CATALOG};
pub use rng::SimpleRng;
pub use scoring::{calculate_score, ScoreResult};
pub use snapshot::{DragSnapshot, GameSnapshot};
