//! Game state module - the session state machine
//!
//! This module ties together the board, the hand, the color pool and scoring.
//! A session moves between `Idle` and `Dragging` as the host picks up pieces,
//! previews them over the board and drops or cancels them. A successful drop
//! resolves color matches and line clears, updates score and combo, refills an
//! empty hand and checks for game over, all synchronously.

use arrayvec::ArrayVec;

use crate::board::{Board, LegalOrigins, LinePreview};
use crate::hand::{generate_hand, ColorPool, Hand};
use crate::pieces::Piece;
use crate::rng::SimpleRng;
use crate::scoring::{calculate_score, halves_to_points};
use crate::snapshot::{DragSnapshot, GameSnapshot};
use crate::types::*;

/// Pending events kept for the host; the oldest is dropped when full.
pub const MAX_PENDING_EVENTS: usize = 16;

/// Pending event buffer returned by [`GameState::take_events`].
pub type EventBuffer = ArrayVec<GameEvent, MAX_PENDING_EVENTS>;

/// Recoverable misuse of [`GameState::begin_drag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("the game is over")]
    GameOver,
    #[error("slot {slot} is out of range for a hand of {size}")]
    SlotOutOfRange { slot: usize, size: usize },
    #[error("slot {slot} is empty")]
    EmptySlot { slot: usize },
}

impl DragError {
    pub fn code(self) -> &'static str {
        match self {
            DragError::GameOver => "game_over",
            DragError::SlotOutOfRange { .. } => "slot_out_of_range",
            DragError::EmptySlot { .. } => "empty_slot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging,
    GameOver,
}

/// What one successful drop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementReport {
    pub slot: usize,
    pub origin: (i8, i8),
    pub blocks: u32,
    pub color: Color,
    pub color_blocks_removed: u32,
    pub lines_broken: u32,
    /// Points gained, in half points.
    pub points_halves: u64,
    pub combo: u32,
    pub no_break_streak: u32,
    /// The hand ran empty and was redealt.
    pub refilled: bool,
    /// The redeal hit the attempt cap and kept its last hand.
    pub refill_exhausted: bool,
    pub game_over: bool,
}

impl PlacementReport {
    pub fn points(&self) -> u64 {
        halves_to_points(self.points_halves)
    }

    pub fn cleared_anything(&self) -> bool {
        self.color_blocks_removed > 0 || self.lines_broken > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Placed(PlacementReport),
    /// No usable origin; the piece stays in its slot.
    Cancelled,
    /// Not dragging, or the game is over.
    Ignored,
}

#[derive(Debug, Clone)]
struct DragState {
    slot: usize,
    piece: Piece,
    legal: LegalOrigins,
    hover: Option<(i8, i8)>,
    last_valid: Option<(i8, i8)>,
    preview: LinePreview,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    mode: GameMode,
    seed: u32,
    rng: SimpleRng,
    board: Board,
    hand: Hand,
    color_pool: ColorPool,
    score_halves: u64,
    combo: u32,
    no_break_streak: u32,
    game_over: bool,
    drag: Option<DragState>,
    pieces_placed: u32,
    total_lines: u32,
    total_color_blocks: u32,
    last_report: Option<PlacementReport>,
    events: EventBuffer,
}

impl GameState {
    /// Create a new game with the given RNG seed and deal the first hand.
    ///
    /// Panics if the mode's board side is outside `1..=MAX_BOARD_LEN` or its
    /// hand size outside `1..=MAX_HAND_SIZE`.
    pub fn new(mode: GameMode, seed: u32) -> Self {
        let mut state = Self {
            mode,
            seed,
            rng: SimpleRng::new(seed),
            board: Board::new(1),
            hand: Hand::default(),
            color_pool: ColorPool::full(),
            score_halves: 0,
            combo: 0,
            no_break_streak: 0,
            game_over: false,
            drag: None,
            pieces_placed: 0,
            total_lines: 0,
            total_color_blocks: 0,
            last_report: None,
            events: EventBuffer::new(),
        };
        state.reset(mode);
        state
    }

    /// Start over with a fresh board, pool and hand. The RNG keeps running, so
    /// consecutive games in one session differ.
    pub fn reset(&mut self, mode: GameMode) {
        assert!(
            (1..=MAX_HAND_SIZE).contains(&mode.hand_size()),
            "hand size must be in 1..={}, got {}",
            MAX_HAND_SIZE,
            mode.hand_size()
        );
        self.mode = mode;
        self.board = Board::with_default_colors(mode.board_len(), &mut self.rng);
        self.color_pool = ColorPool::full();
        self.score_halves = 0;
        self.combo = 0;
        self.no_break_streak = 0;
        self.game_over = false;
        self.drag = None;
        self.pieces_placed = 0;
        self.total_lines = 0;
        self.total_color_blocks = 0;
        self.last_report = None;
        self.events.clear();

        let deal = generate_hand(
            mode.hand_size(),
            &self.color_pool,
            Some(&self.board),
            self.placeable_floor(),
            &mut self.rng,
        );
        self.hand = deal.hand;

        tracing::debug!(
            mode = mode.as_str(),
            board_len = mode.board_len(),
            hand_size = mode.hand_size(),
            attempts = deal.attempts,
            "new game"
        );

        if !self.board.any_piece_fits(&self.hand) {
            self.finish();
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get mutable board reference (for testing)
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Get mutable hand reference (for testing)
    pub fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn color_pool(&self) -> &ColorPool {
        &self.color_pool
    }

    /// Whole points (floor of the exact score).
    pub fn score(&self) -> u64 {
        halves_to_points(self.score_halves)
    }

    /// Exact score in half points.
    pub fn score_halves(&self) -> u64 {
        self.score_halves
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn no_break_streak(&self) -> u32 {
        self.no_break_streak
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn pieces_placed(&self) -> u32 {
        self.pieces_placed
    }

    pub fn total_lines(&self) -> u32 {
        self.total_lines
    }

    pub fn total_color_blocks(&self) -> u32 {
        self.total_color_blocks
    }

    pub fn last_report(&self) -> Option<&PlacementReport> {
        self.last_report.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.drag.is_some() {
            Phase::Dragging
        } else {
            Phase::Idle
        }
    }

    /// Slot of the piece being dragged.
    pub fn dragging_slot(&self) -> Option<usize> {
        self.drag.as_ref().map(|d| d.slot)
    }

    /// Legal origins of the dragged piece, computed when the drag began.
    pub fn drag_legal_origins(&self) -> Option<&LegalOrigins> {
        self.drag.as_ref().map(|d| &d.legal)
    }

    /// Last origin that was legal while hovering.
    pub fn last_valid_origin(&self) -> Option<(i8, i8)> {
        self.drag.as_ref().and_then(|d| d.last_valid)
    }

    /// Legal origins of whatever piece sits in `slot`.
    pub fn legal_origins(&self, slot: usize) -> Option<LegalOrigins> {
        self.hand.get(slot).map(|p| self.board.legal_origins(p))
    }

    pub fn any_piece_fits(&self) -> bool {
        self.board.any_piece_fits(&self.hand)
    }

    pub fn count_fittable_pieces(&self) -> usize {
        self.board.count_fittable_pieces(&self.hand)
    }

    /// Pick up the piece in `slot`. Picking up while already dragging switches
    /// to the new slot.
    pub fn begin_drag(&mut self, slot: usize) -> Result<(), DragError> {
        if self.game_over {
            return Err(DragError::GameOver);
        }
        if slot >= self.hand.size() {
            return Err(DragError::SlotOutOfRange {
                slot,
                size: self.hand.size(),
            });
        }
        let Some(&piece) = self.hand.get(slot) else {
            return Err(DragError::EmptySlot { slot });
        };

        if self.drag.is_some() {
            self.board.clear_hover_marks();
        }
        let legal = self.board.legal_origins(&piece);
        tracing::trace!(slot, legal = legal.count(), "drag started");
        self.drag = Some(DragState {
            slot,
            piece,
            legal,
            hover: None,
            last_valid: None,
            preview: LinePreview::default(),
        });
        Ok(())
    }

    /// Move the dragged piece over origin (x, y) and refresh the preview.
    ///
    /// Returns true if the piece fits there. A non-fitting origin only clears
    /// the preview; the last valid origin is kept.
    pub fn update_hover(&mut self, x: i8, y: i8) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        drag.hover = Some((x, y));
        if drag.legal.is_legal(x, y) {
            drag.preview = self.board.compute_hover_preview(&drag.piece, x, y);
            drag.last_valid = Some((x, y));
            true
        } else {
            self.board.clear_hover_marks();
            drag.preview = LinePreview::default();
            false
        }
    }

    /// Put the dragged piece back. Returns false if nothing was dragged.
    pub fn cancel_drag(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.board.clear_hover_marks();
        true
    }

    /// Drop the dragged piece.
    ///
    /// The origin is, in order: `target` (trusted; panics if the piece does not
    /// fit there), the last valid hover origin if it still fits, or the first
    /// legal origin in row-major order. With none of these the drag is
    /// cancelled.
    pub fn resolve_drop(&mut self, target: Option<(i8, i8)>) -> DropOutcome {
        if self.game_over {
            return DropOutcome::Ignored;
        }
        let Some(drag) = self.drag.take() else {
            return DropOutcome::Ignored;
        };
        self.board.clear_hover_marks();

        let origin = match target {
            Some((x, y)) => {
                assert!(
                    self.board.fits_at(&drag.piece, x, y),
                    "resolve_drop: piece does not fit at explicit origin ({}, {})",
                    x,
                    y
                );
                Some((x, y))
            }
            None => drag
                .last_valid
                .filter(|&(x, y)| self.board.fits_at(&drag.piece, x, y))
                .or_else(|| self.board.first_legal_origin(&drag.piece)),
        };

        let Some(origin) = origin else {
            tracing::debug!(slot = drag.slot, "drop cancelled, no legal origin");
            return DropOutcome::Cancelled;
        };

        DropOutcome::Placed(self.place(drag.slot, drag.piece, origin))
    }

    fn place(&mut self, slot: usize, piece: Piece, (x, y): (i8, i8)) -> PlacementReport {
        let footprint = self.board.stamp(&piece, x, y, CellState::Filled);
        self.hand.take(slot);

        let color_removed = self.board.break_color_matches(&footprint);
        let lines = self.board.break_full_lines();
        let blocks = piece.block_count();

        let result = calculate_score(
            blocks,
            color_removed,
            lines,
            self.board.size(),
            self.mode.hand_size(),
            self.combo,
            self.no_break_streak,
        );
        self.score_halves = self.score_halves.saturating_add(result.total_halves);
        self.combo = result.combo;
        self.no_break_streak = result.no_break_streak;

        self.pieces_placed += 1;
        self.total_lines += lines;
        self.total_color_blocks += color_removed;

        if self.color_pool.remove(piece.color()) {
            tracing::trace!("color pool reset");
        }

        let mut refilled = false;
        let mut refill_exhausted = false;
        if self.hand.is_empty() {
            let deal = generate_hand(
                self.mode.hand_size(),
                &self.color_pool,
                Some(&self.board),
                self.placeable_floor(),
                &mut self.rng,
            );
            self.hand = deal.hand;
            refilled = true;
            refill_exhausted = deal.exhausted;
            tracing::debug!(attempts = deal.attempts, exhausted = deal.exhausted, "hand refilled");
        }

        self.push_event(GameEvent::PiecePlaced { blocks });
        if color_removed > 0 || lines > 0 {
            self.push_event(GameEvent::ClearResolved {
                color_blocks_removed: color_removed,
                lines_broken: lines,
            });
        }

        tracing::debug!(
            slot,
            shape = piece.shape().family.as_str(),
            x,
            y,
            blocks,
            color_removed,
            lines,
            points_halves = result.total_halves,
            combo = self.combo,
            score = self.score(),
            "piece placed"
        );

        if !self.board.any_piece_fits(&self.hand) {
            self.finish();
        }

        let report = PlacementReport {
            slot,
            origin: (x, y),
            blocks,
            color: piece.color(),
            color_blocks_removed: color_removed,
            lines_broken: lines,
            points_halves: result.total_halves,
            combo: self.combo,
            no_break_streak: self.no_break_streak,
            refilled,
            refill_exhausted,
            game_over: self.game_over,
        };
        self.last_report = Some(report);
        report
    }

    /// Pieces a dealt hand must be able to place; never more than the hand holds.
    fn placeable_floor(&self) -> usize {
        MIN_PLACEABLE_PIECES.min(self.mode.hand_size() as usize)
    }

    fn finish(&mut self) {
        self.game_over = true;
        self.drag = None;
        let final_score = self.score();
        tracing::debug!(final_score, pieces = self.pieces_placed, "game over");
        self.push_event(GameEvent::GameOver { final_score });
    }

    fn push_event(&mut self, event: GameEvent) {
        if self.events.is_full() {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Take and clear the pending events, oldest first.
    pub fn take_events(&mut self) -> EventBuffer {
        std::mem::take(&mut self.events)
    }

    /// Record for the score store.
    pub fn score_record(&self, timestamp_ms: u64) -> ScoreRecord {
        ScoreRecord {
            score: self.score(),
            timestamp_ms,
            mode: self.mode,
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.mode = self.mode;
        out.seed = self.seed;
        out.board_len = self.board.size();
        out.cells.clear();
        out.cells.extend_from_slice(self.board.cells());
        out.hand.clear();
        out.hand.extend_from_slice(self.hand.slots());
        out.color_pool.clear();
        out.color_pool.extend_from_slice(self.color_pool.colors());
        out.score = self.score();
        out.score_halves = self.score_halves;
        out.combo = self.combo;
        out.no_break_streak = self.no_break_streak;
        out.game_over = self.game_over;
        out.drag = self.drag.as_ref().map(|d| DragSnapshot {
            slot: d.slot,
            piece: d.piece,
            hover: d.hover,
            hover_legal: d.hover.is_some_and(|(x, y)| d.legal.is_legal(x, y)),
            last_valid: d.last_valid,
            legal_origins: d.legal.clone(),
            preview_lines: d.preview.total(),
        });
        out.pieces_placed = self.pieces_placed;
        out.total_lines = self.total_lines;
        out.total_color_blocks = self.total_color_blocks;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::find_shape;

    fn piece(matrix: &[&[u8]], color: usize) -> Piece {
        Piece::new(find_shape(matrix).unwrap(), PALETTE[color])
    }

    fn with_hand(mode: GameMode, slots: Vec<Option<Piece>>) -> GameState {
        let mut state = GameState::new(mode, 12345);
        state.board_mut().clear();
        *state.hand_mut() = Hand::from_slots(slots);
        state
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(GameMode::Classic, 12345);
        assert_eq!(state.board().size(), 8);
        assert_eq!(state.board().filled_count(), 0);
        assert_eq!(state.hand().remaining(), 3);
        assert_eq!(state.score(), 0);
        assert_eq!(state.combo(), 0);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.color_pool().len(), PALETTE.len());
        assert!(!state.game_over());

        let chaos = GameState::new(GameMode::Chaos, 1);
        assert_eq!(chaos.board().size(), 10);
        assert_eq!(chaos.hand().remaining(), 5);
    }

    #[test]
    fn test_same_seed_same_game() {
        let a = GameState::new(GameMode::Classic, 99);
        let b = GameState::new(GameMode::Classic, 99);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_first_hand_uses_distinct_pool_prefix() {
        let state = GameState::new(GameMode::Classic, 5);
        let colors: Vec<Color> = state.hand().pieces().map(|(_, p)| p.color()).collect();
        for c in &PALETTE[..3] {
            assert!(colors.contains(c));
        }
    }

    #[test]
    fn test_begin_drag_errors() {
        let mut state = with_hand(
            GameMode::Classic,
            vec![Some(piece(&[&[1, 1]], 0)), None, None],
        );
        assert_eq!(state.begin_drag(1), Err(DragError::EmptySlot { slot: 1 }));
        let err = state.begin_drag(7).unwrap_err();
        assert_eq!(err.code(), "slot_out_of_range");
        assert_eq!(err.to_string(), "slot 7 is out of range for a hand of 3");
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.begin_drag(0).is_ok());
        assert_eq!(state.phase(), Phase::Dragging);
    }

    #[test]
    fn test_begin_drag_switches_slot_and_clears_marks() {
        let mut state = with_hand(
            GameMode::Classic,
            vec![Some(piece(&[&[1, 1]], 0)), Some(piece(&[&[1, 1], &[1, 1]], 1)), None],
        );
        state.begin_drag(0).unwrap();
        assert!(state.update_hover(3, 3));
        assert!(state.board().has_hover_marks());

        state.begin_drag(1).unwrap();
        assert_eq!(state.dragging_slot(), Some(1));
        assert!(!state.board().has_hover_marks());
        assert_eq!(state.last_valid_origin(), None);
    }

    #[test]
    fn test_update_hover_tracks_last_valid() {
        let mut state = with_hand(
            GameMode::Classic,
            vec![Some(piece(&[&[1, 1, 1, 1]], 0)), None, None],
        );
        assert!(!state.update_hover(0, 0));

        state.begin_drag(0).unwrap();
        assert!(state.update_hover(2, 5));
        assert_eq!(state.last_valid_origin(), Some((2, 5)));

        assert!(!state.update_hover(6, 0));
        assert!(!state.board().has_hover_marks());
        assert_eq!(state.last_valid_origin(), Some((2, 5)));

        let snap = state.snapshot();
        let drag = snap.drag.unwrap();
        assert_eq!(drag.hover, Some((6, 0)));
        assert!(!drag.hover_legal);
    }

    #[test]
    fn test_cancel_drag_restores_board() {
        let mut state = with_hand(
            GameMode::Classic,
            vec![Some(piece(&[&[1, 1]], 0)), None, None],
        );
        let before = state.board().clone();
        state.begin_drag(0).unwrap();
        state.update_hover(1, 1);
        assert!(state.cancel_drag());
        assert_eq!(state.board(), &before);
        assert_eq!(state.hand().remaining(), 1);
        assert!(!state.cancel_drag());
    }

    #[test]
    fn test_drop_uses_explicit_then_last_valid_then_first_legal() {
        let bar = piece(&[&[1, 1]], 0);
        let mut state = with_hand(GameMode::Classic, vec![Some(bar), Some(bar), Some(bar)]);

        state.begin_drag(0).unwrap();
        state.update_hover(4, 4);
        let DropOutcome::Placed(r) = state.resolve_drop(Some((6, 7))) else {
            panic!("expected placement");
        };
        assert_eq!(r.origin, (6, 7));

        state.begin_drag(1).unwrap();
        state.update_hover(4, 4);
        state.update_hover(7, 7);
        let DropOutcome::Placed(r) = state.resolve_drop(None) else {
            panic!("expected placement");
        };
        assert_eq!(r.origin, (4, 4));

        state.begin_drag(2).unwrap();
        let DropOutcome::Placed(r) = state.resolve_drop(None) else {
            panic!("expected placement");
        };
        assert_eq!(r.origin, (0, 0));
    }

    #[test]
    fn test_drop_without_drag_is_ignored() {
        let mut state = GameState::new(GameMode::Classic, 3);
        assert_eq!(state.resolve_drop(None), DropOutcome::Ignored);
    }

    #[test]
    fn test_drop_cancelled_when_nothing_fits() {
        let square = piece(&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]], 0);
        let bar = piece(&[&[1, 1]], 1);
        let mut state = with_hand(GameMode::Classic, vec![Some(square), Some(bar), None]);
        // Checkerboard of filled cells in the top-left leaves no 3x3 room anywhere
        for y in 0..8 {
            for x in 0..8 {
                if (x + y) % 3 == 0 {
                    state.board_mut().fill(x, y, PALETTE[2]);
                }
            }
        }
        state.begin_drag(0).unwrap();
        assert!(!state.drag_legal_origins().unwrap().any());
        assert_eq!(state.resolve_drop(None), DropOutcome::Cancelled);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.hand().remaining(), 2);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_explicit_illegal_origin_panics() {
        let mut state = with_hand(
            GameMode::Classic,
            vec![Some(piece(&[&[1, 1]], 0)), None, None],
        );
        state.begin_drag(0).unwrap();
        state.resolve_drop(Some((7, 0)));
    }

    #[test]
    fn test_line_clear_scores_and_resets_streak() {
        let bar = piece(&[&[1, 1, 1, 1]], 0);
        let other = piece(&[&[1, 1]], 1);
        let mut state = with_hand(GameMode::Classic, vec![Some(bar), Some(other), None]);
        for x in 0..4 {
            state.board_mut().fill(x, 0, PALETTE[2]);
        }
        state.begin_drag(0).unwrap();
        let DropOutcome::Placed(r) = state.resolve_drop(Some((4, 0))) else {
            panic!("expected placement");
        };
        // 4 + 1 * 8 * (1 / 2) * 4
        assert_eq!(r.lines_broken, 1);
        assert_eq!(r.points(), 20);
        assert_eq!(state.score(), 20);
        assert_eq!(state.combo(), 1);
        assert_eq!(state.no_break_streak(), 0);
        assert_eq!(state.board().filled_count(), 0);
        assert_eq!(state.total_lines(), 1);
    }

    #[test]
    fn test_color_match_removes_three() {
        let red_bar = piece(&[&[1, 1]], 0);
        let other = piece(&[&[1, 1]], 1);
        let mut state = with_hand(GameMode::Classic, vec![Some(red_bar), Some(other), None]);
        state.board_mut().fill(0, 3, PALETTE[0]);
        state.begin_drag(0).unwrap();
        let DropOutcome::Placed(r) = state.resolve_drop(Some((1, 3))) else {
            panic!("expected placement");
        };
        assert_eq!(r.color_blocks_removed, 3);
        assert_eq!(state.board().filled_count(), 0);
        // 2 + 3 * 2 * (1 / 2)
        assert_eq!(state.score_halves(), 10);
        assert_eq!(state.score(), 5);

        let events = state.take_events();
        assert_eq!(
            events.as_slice(),
            &[
                GameEvent::PiecePlaced { blocks: 2 },
                GameEvent::ClearResolved {
                    color_blocks_removed: 3,
                    lines_broken: 0,
                },
            ]
        );
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_placed_color_leaves_pool() {
        let bar = piece(&[&[1, 1]], 4);
        let mut state = with_hand(
            GameMode::Classic,
            vec![Some(bar), Some(piece(&[&[1, 1]], 5)), None],
        );
        state.begin_drag(0).unwrap();
        state.resolve_drop(None);
        assert!(!state.color_pool().contains(PALETTE[4]));
        assert_eq!(state.color_pool().len(), PALETTE.len() - 1);
    }

    #[test]
    fn test_empty_hand_refills_from_updated_pool() {
        let bar = piece(&[&[1, 1]], 0);
        let mut state = with_hand(GameMode::Classic, vec![None, Some(bar), None]);
        state.begin_drag(1).unwrap();
        let DropOutcome::Placed(r) = state.resolve_drop(None) else {
            panic!("expected placement");
        };
        assert!(r.refilled);
        assert_eq!(state.hand().remaining(), 3);
        // Red left the pool, so the new hand is drawn from green, blue, amber
        for (_, p) in state.hand().pieces() {
            assert_ne!(p.color(), PALETTE[0]);
        }
    }

    #[test]
    fn test_game_over_when_nothing_fits() {
        let bar = piece(&[&[1, 1]], 0);
        let square = piece(&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]], 1);
        let mut state = with_hand(
            GameMode::Classic,
            vec![Some(bar), Some(square), Some(square)],
        );
        // Isolated single holes, plus room for the bar at (1, 0)
        for y in 0..8i8 {
            for x in 0..8i8 {
                let hole = (x + 3 * y) % 4 == 0 || (y == 0 && (x == 1 || x == 2));
                if !hole {
                    state.board_mut().fill(x, y, PALETTE[2]);
                }
            }
        }
        state.begin_drag(0).unwrap();
        let DropOutcome::Placed(r) = state.resolve_drop(Some((1, 0))) else {
            panic!("expected placement");
        };
        assert!(r.game_over);
        assert!(state.game_over());
        assert_eq!(state.phase(), Phase::GameOver);

        let events = state.take_events();
        assert_eq!(events.last(), Some(&GameEvent::GameOver { final_score: 2 }));

        let snap = state.snapshot();
        assert_eq!(state.resolve_drop(None), DropOutcome::Ignored);
        assert_eq!(state.begin_drag(1), Err(DragError::GameOver));
        assert_eq!(state.snapshot(), snap);
    }

    #[test]
    fn test_single_slot_hand_refills_without_exhausting() {
        let mode = GameMode::Custom {
            board_len: 8,
            hand_size: 1,
        };
        let mut state = GameState::new(mode, 21);
        assert_eq!(state.hand().remaining(), 1);
        for _ in 0..3 {
            state.begin_drag(0).unwrap();
            let DropOutcome::Placed(r) = state.resolve_drop(None) else {
                panic!("expected placement");
            };
            assert!(r.refilled);
            assert!(!r.refill_exhausted);
        }
    }

    #[test]
    fn test_reset_clears_game_over() {
        let mut state = GameState::new(GameMode::Classic, 8);
        state.board_mut().fill(0, 0, PALETTE[0]);
        state.reset(GameMode::Chaos);
        assert_eq!(state.mode(), GameMode::Chaos);
        assert_eq!(state.board().size(), 10);
        assert_eq!(state.board().filled_count(), 0);
        assert_eq!(state.hand().remaining(), 5);
        assert!(!state.game_over());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_events_buffer_is_bounded() {
        let mut state = GameState::new(GameMode::Classic, 1);
        for _ in 0..(MAX_PENDING_EVENTS + 4) {
            state.push_event(GameEvent::PiecePlaced { blocks: 2 });
        }
        assert_eq!(state.take_events().len(), MAX_PENDING_EVENTS);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::new(GameMode::Classic, 4);
        state.begin_drag(0).unwrap();
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"mode\":\"classic\""));
        assert!(json.contains("\"drag\":{"));
    }
}
