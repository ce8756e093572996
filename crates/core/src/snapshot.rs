use serde::Serialize;

use crate::board::{BoardCell, LegalOrigins};
use crate::pieces::Piece;
use crate::types::{Color, GameMode};

/// Drag state as seen by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragSnapshot {
    pub slot: usize,
    pub piece: Piece,
    pub hover: Option<(i8, i8)>,
    pub hover_legal: bool,
    pub last_valid: Option<(i8, i8)>,
    pub legal_origins: LegalOrigins,
    /// Rows + columns the hovered drop would clear.
    pub preview_lines: u32,
}

/// Read-only copy of everything a host needs to draw a frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GameSnapshot {
    pub mode: GameMode,
    pub seed: u32,
    pub board_len: u8,
    /// Row-major cells, `board_len * board_len` long.
    pub cells: Vec<BoardCell>,
    pub hand: Vec<Option<Piece>>,
    pub color_pool: Vec<Color>,
    pub score: u64,
    pub score_halves: u64,
    pub combo: u32,
    pub no_break_streak: u32,
    pub game_over: bool,
    pub drag: Option<DragSnapshot>,
    pub pieces_placed: u32,
    pub total_lines: u32,
    pub total_color_blocks: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.mode = GameMode::default();
        self.seed = 0;
        self.board_len = 0;
        self.cells.clear();
        self.hand.clear();
        self.color_pool.clear();
        self.score = 0;
        self.score_halves = 0;
        self.combo = 0;
        self.no_break_streak = 0;
        self.game_over = false;
        self.drag = None;
        self.pieces_placed = 0;
        self.total_lines = 0;
        self.total_color_blocks = 0;
    }

    /// Cell at (x, y), None if out of bounds.
    pub fn cell(&self, x: usize, y: usize) -> Option<&BoardCell> {
        let n = self.board_len as usize;
        if x >= n || y >= n {
            return None;
        }
        self.cells.get(y * n + x)
    }
}
