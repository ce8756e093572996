//! Keyboard host session: turns [`PlayerAction`]s into core transitions.
//!
//! The terminal has no pointer, so a board cursor stands in for the drag
//! position. Moving the cursor while a piece is lifted updates the hover
//! preview; dropping uses the cursor only when the piece fits there and
//! otherwise lets the core fall back to the last valid or first legal origin.

use anyhow::Result;

use crate::core::{DropOutcome, GameSnapshot, GameState};
use crate::scores::{now_ms, ScoreId, ScoreStore};
use crate::types::{GameEvent, GameMode, PlayerAction};

pub struct App {
    game: GameState,
    scores: ScoreStore,
    score_id: Option<ScoreId>,
    cursor: (i8, i8),
    message: String,
}

impl App {
    /// Start a game and register its score record.
    pub fn new(mode: GameMode, seed: u32, scores: ScoreStore) -> Result<Self> {
        let mut app = Self {
            game: GameState::new(mode, seed),
            scores,
            score_id: None,
            cursor: (0, 0),
            message: String::new(),
        };
        app.start_record()?;
        Ok(app)
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn cursor(&self) -> (i8, i8) {
        self.cursor
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn scores(&self) -> &ScoreStore {
        &self.scores
    }

    pub fn best_score(&self) -> Option<u64> {
        self.scores.best(self.game.mode())
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.game.snapshot_into(out);
    }

    pub fn apply(&mut self, action: PlayerAction) -> Result<()> {
        tracing::trace!(action = action.as_str(), "action");
        match action {
            PlayerAction::SelectSlot(slot) => self.select(slot as usize),
            PlayerAction::NextSlot => {
                match self.game.hand().next_occupied(self.game.dragging_slot()) {
                    Some(slot) => self.select(slot),
                    None => self.message.clear(),
                }
            }
            PlayerAction::MoveCursor { dx, dy } => self.move_cursor(dx, dy),
            PlayerAction::Drop => self.drop_piece()?,
            PlayerAction::Cancel => {
                if self.game.cancel_drag() {
                    self.message.clear();
                }
            }
            PlayerAction::Restart => self.restart(self.game.mode())?,
            PlayerAction::SwitchMode => self.restart(self.game.mode().toggled())?,
        }
        self.drain_events();
        Ok(())
    }

    fn select(&mut self, slot: usize) {
        match self.game.begin_drag(slot) {
            Ok(()) => {
                self.message.clear();
                self.clamp_cursor();
                self.game.update_hover(self.cursor.0, self.cursor.1);
            }
            Err(e) => {
                tracing::debug!(code = e.code(), "drag refused");
                self.message = e.to_string();
            }
        }
    }

    fn move_cursor(&mut self, dx: i8, dy: i8) {
        self.cursor = (
            self.cursor.0.saturating_add(dx),
            self.cursor.1.saturating_add(dy),
        );
        self.clamp_cursor();
        if self.game.dragging_slot().is_some() {
            self.game.update_hover(self.cursor.0, self.cursor.1);
        }
    }

    /// Keep the cursor, and the lifted piece's box, on the board.
    fn clamp_cursor(&mut self) {
        let n = self.game.board().size() as i8;
        let (w, h) = self
            .game
            .dragging_slot()
            .and_then(|slot| self.game.hand().get(slot))
            .map_or((1, 1), |p| (p.width() as i8, p.height() as i8));
        let max_x = (n - w).max(0);
        let max_y = (n - h).max(0);
        self.cursor = (self.cursor.0.clamp(0, max_x), self.cursor.1.clamp(0, max_y));
    }

    fn drop_piece(&mut self) -> Result<()> {
        let (x, y) = self.cursor;
        let target = self
            .game
            .drag_legal_origins()
            .filter(|legal| legal.is_legal(x, y))
            .map(|_| (x, y));

        match self.game.resolve_drop(target) {
            DropOutcome::Placed(report) => {
                self.message = if report.cleared_anything() {
                    format!(
                        "+{} ({} popped, {} lines)",
                        report.points(),
                        report.color_blocks_removed,
                        report.lines_broken
                    )
                } else {
                    format!("+{}", report.points())
                };
                if report.game_over {
                    self.message = format!("final score {}", self.game.score());
                }
                self.save_record()?;
            }
            DropOutcome::Cancelled => {
                self.message = "no room for that piece".to_string();
            }
            DropOutcome::Ignored => {}
        }
        Ok(())
    }

    fn restart(&mut self, mode: GameMode) -> Result<()> {
        self.game.reset(mode);
        self.cursor = (0, 0);
        self.message.clear();
        self.start_record()
    }

    fn start_record(&mut self) -> Result<()> {
        let id = self.scores.create(self.game.score_record(now_ms()))?;
        self.score_id = Some(id);
        Ok(())
    }

    fn save_record(&mut self) -> Result<()> {
        if let Some(id) = self.score_id {
            self.scores.update(id, self.game.score_record(now_ms()))?;
        }
        Ok(())
    }

    fn drain_events(&mut self) {
        for event in self.game.take_events() {
            match event {
                GameEvent::PiecePlaced { blocks } => tracing::trace!(blocks, "placed"),
                GameEvent::ClearResolved {
                    color_blocks_removed,
                    lines_broken,
                } => tracing::debug!(color_blocks_removed, lines_broken, "cleared"),
                GameEvent::GameOver { final_score } => {
                    tracing::info!(final_score, mode = self.game.mode().as_str(), "game over")
                }
            }
        }
    }
}
