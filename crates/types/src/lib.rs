//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the workspace.
//! Everything here is plain data with no game logic, making it usable from the
//! rule engine, the terminal host, and any other integration layer.
//!
//! # Game Modes
//!
//! | Mode | Board | Hand |
//! |------|-------|------|
//! | Classic | 8x8 | 3 pieces |
//! | Chaos | 10x10 | 5 pieces |
//!
//! Any other size pair can be expressed with [`GameMode::Custom`].
//!
//! # Palette
//!
//! Pieces are colored from a fixed palette of eight visually distinct colors
//! ([`PALETTE`]). Color equality is tolerance based (see [`Color::matches`]).
//!
//! # Examples
//!
//! ```
//! use circle_pop_types::{CellState, Color, GameMode, PALETTE};
//!
//! let mode = GameMode::from_str("chaos").unwrap();
//! assert_eq!(mode.board_len(), 10);
//! assert_eq!(mode.hand_size(), 5);
//!
//! let red = PALETTE[0];
//! assert!(red.matches(Color::new(239, 68, 68)));
//! assert_eq!(red.name(), Some("red"));
//!
//! assert!(CellState::HoveredBreakFilled.is_occupied());
//! assert!(!CellState::Hovered.is_occupied());
//! ```

use serde::{Deserialize, Serialize};

/// Board side length for Classic mode.
pub const CLASSIC_BOARD_LEN: u8 = 8;

/// Hand size for Classic mode.
pub const CLASSIC_HAND_SIZE: u8 = 3;

/// Board side length for Chaos mode.
pub const CHAOS_BOARD_LEN: u8 = 10;

/// Hand size for Chaos mode.
pub const CHAOS_HAND_SIZE: u8 = 5;

/// Largest supported board side (coordinates are `i8`).
pub const MAX_BOARD_LEN: u8 = 32;

/// Largest supported hand.
pub const MAX_HAND_SIZE: u8 = 8;

/// Upper bound on occupied cells in any catalog shape (the 3x3 block).
pub const MAX_PIECE_CELLS: usize = 9;

/// Retry cap for the hand generator before it accepts the last hand.
pub const MAX_HAND_ATTEMPTS: u32 = 100;

/// Playability floor used when the hand is dealt or refilled.
pub const MIN_PLACEABLE_PIECES: usize = 2;

/// Minimum size of a same-color group that gets removed.
pub const COLOR_MATCH_MIN: usize = 3;

/// 24-bit RGB color of a piece or board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Tolerance-based equality: every channel differs by less than 1.
    ///
    /// With 8-bit channels this is exact equality; the comparison is kept
    /// explicit so colors coming from interpolated sources compare the same way.
    pub fn matches(self, other: Color) -> bool {
        let close = |a: u8, b: u8| (a as i16 - b as i16).abs() < 1;
        close(self.r, other.r) && close(self.g, other.g) && close(self.b, other.b)
    }

    /// Palette name for this color, if it is one of [`PALETTE`].
    pub fn name(self) -> Option<&'static str> {
        PALETTE
            .iter()
            .position(|c| c.matches(self))
            .map(|i| PALETTE_NAMES[i])
    }

    /// `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The eight piece colors, in pool order.
pub const PALETTE: [Color; 8] = [
    Color::new(239, 68, 68),
    Color::new(34, 197, 94),
    Color::new(59, 130, 246),
    Color::new(245, 158, 11),
    Color::new(168, 85, 247),
    Color::new(236, 72, 153),
    Color::new(6, 182, 212),
    Color::new(251, 146, 60),
];

/// Names matching [`PALETTE`] index for index.
pub const PALETTE_NAMES: [&str; 8] = [
    "red", "green", "blue", "amber", "purple", "pink", "cyan", "orange",
];

/// State of a single board cell.
///
/// `Filled` is the only authoritative occupied state. The `Hovered*` variants
/// are a preview overlay drawn while a piece is dragged and are always undone by
/// clearing the hover marks:
///
/// - **Hovered**: empty cell the dragged piece would cover
/// - **HoveredBreakFilled**: filled cell that would be cleared by the drop
/// - **HoveredBreakEmpty**: empty (or hovered) cell inside a line that would clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Empty,
    Hovered,
    Filled,
    HoveredBreakFilled,
    HoveredBreakEmpty,
}

impl CellState {
    /// True when the cell holds a placed block (possibly under a preview mark).
    pub fn is_occupied(self) -> bool {
        matches!(self, CellState::Filled | CellState::HoveredBreakFilled)
    }

    /// True for the preview overlay states.
    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            CellState::Hovered | CellState::HoveredBreakFilled | CellState::HoveredBreakEmpty
        )
    }
}

/// Board and hand dimensions for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Classic,
    Chaos,
    Custom { board_len: u8, hand_size: u8 },
}

impl GameMode {
    pub fn board_len(&self) -> u8 {
        match self {
            GameMode::Classic => CLASSIC_BOARD_LEN,
            GameMode::Chaos => CHAOS_BOARD_LEN,
            GameMode::Custom { board_len, .. } => *board_len,
        }
    }

    pub fn hand_size(&self) -> u8 {
        match self {
            GameMode::Classic => CLASSIC_HAND_SIZE,
            GameMode::Chaos => CHAOS_HAND_SIZE,
            GameMode::Custom { hand_size, .. } => *hand_size,
        }
    }

    /// Parse a named mode (case-insensitive).
    ///
    /// ```
    /// use circle_pop_types::GameMode;
    ///
    /// assert_eq!(GameMode::from_str("Classic"), Some(GameMode::Classic));
    /// assert_eq!(GameMode::from_str("CHAOS"), Some(GameMode::Chaos));
    /// assert_eq!(GameMode::from_str("zen"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "chaos" => Some(GameMode::Chaos),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Chaos => "chaos",
            GameMode::Custom { .. } => "custom",
        }
    }

    /// Classic <-> Chaos; custom modes go back to Classic.
    pub fn toggled(&self) -> Self {
        match self {
            GameMode::Classic => GameMode::Chaos,
            GameMode::Chaos | GameMode::Custom { .. } => GameMode::Classic,
        }
    }
}

/// Host-level player intents.
///
/// These are produced by the input layer and translated by the host into
/// calls on the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Pick up the piece in the given hand slot (0-based)
    SelectSlot(u8),
    /// Pick up the next non-empty slot after the current one
    NextSlot,
    /// Move the hover cursor by one cell
    MoveCursor { dx: i8, dy: i8 },
    /// Drop the dragged piece
    Drop,
    /// Put the dragged piece back
    Cancel,
    /// Start a new game in the current mode
    Restart,
    /// Start a new game in the other mode
    SwitchMode,
}

impl PlayerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerAction::SelectSlot(_) => "selectSlot",
            PlayerAction::NextSlot => "nextSlot",
            PlayerAction::MoveCursor { .. } => "moveCursor",
            PlayerAction::Drop => "drop",
            PlayerAction::Cancel => "cancel",
            PlayerAction::Restart => "restart",
            PlayerAction::SwitchMode => "switchMode",
        }
    }
}

/// Notification emitted by the engine after a transition.
///
/// Events are informational only; nothing inside the engine reacts to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PiecePlaced { blocks: u32 },
    ClearResolved { color_blocks_removed: u32, lines_broken: u32 },
    GameOver { final_score: u64 },
}

/// Plain record handed to score persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub mode: GameMode,
}
