//! Scoring module - placement, color-match and line-clear points with combos
//!
//! Points are tracked in half-point units. The combo multiplier is `combo / 2`
//! taken as a real quotient, so an odd combo yields half points; keeping the
//! accumulator in halves makes every formula exact integer arithmetic.
//!
//! For a piece of `k` blocks on a board of side `L`:
//! - placement: `k`
//! - color match: `combo += removed / 3`, then `removed * 2 * (combo / 2)`
//! - line clear: `combo += lines`, then `lines * L * (combo / 2) * k`
//! - no clear at all: the no-break streak grows, and once it reaches the hand
//!   size the combo drops back to zero

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Half points for the placed blocks.
    pub placement_halves: u64,
    /// Half points from removed color groups.
    pub color_halves: u64,
    /// Half points from broken lines.
    pub line_halves: u64,
    /// Sum of the three parts, in half points.
    pub total_halves: u64,
    pub combo: u32,
    pub no_break_streak: u32,
    /// True if this placement dropped a non-zero combo.
    pub combo_reset: bool,
}

impl ScoreResult {
    /// Whole points gained (floor).
    pub fn total_points(&self) -> u64 {
        halves_to_points(self.total_halves)
    }
}

/// Half points for placing a piece of `blocks` cells.
pub fn placement_halves(blocks: u32) -> u64 {
    2 * blocks as u64
}

/// Combo gained from removing `removed` color-matched cells.
pub fn color_combo_gain(removed: u32) -> u32 {
    removed / 3
}

/// Half points for `removed` color-matched cells at the (already updated) combo.
pub fn color_match_halves(removed: u32, combo: u32) -> u64 {
    // removed * 2 * (combo / 2), doubled
    removed as u64 * 2 * combo as u64
}

/// Half points for `lines` broken lines at the (already updated) combo.
pub fn line_clear_halves(lines: u32, board_len: u8, combo: u32, blocks: u32) -> u64 {
    // lines * L * (combo / 2) * k, doubled
    lines as u64 * board_len as u64 * combo as u64 * blocks as u64
}

pub fn halves_to_points(halves: u64) -> u64 {
    halves / 2
}

/// Apply one placement to the combo state and compute its points.
pub fn calculate_score(
    blocks: u32,
    color_removed: u32,
    lines: u32,
    board_len: u8,
    hand_size: u8,
    combo: u32,
    no_break_streak: u32,
) -> ScoreResult {
    let mut result = ScoreResult {
        placement_halves: placement_halves(blocks),
        combo,
        no_break_streak,
        ..ScoreResult::default()
    };

    if color_removed > 0 {
        result.no_break_streak = 0;
        result.combo = result.combo.saturating_add(color_combo_gain(color_removed));
        result.color_halves = color_match_halves(color_removed, result.combo);
    }

    if lines > 0 {
        result.no_break_streak = 0;
        result.combo = result.combo.saturating_add(lines);
        result.line_halves = line_clear_halves(lines, board_len, result.combo, blocks);
    } else if color_removed == 0 {
        result.no_break_streak = result.no_break_streak.saturating_add(1);
        if result.no_break_streak >= hand_size as u32 {
            result.combo_reset = result.combo > 0;
            result.combo = 0;
        }
    }

    result.total_halves = result.placement_halves + result.color_halves + result.line_halves;
    result
}
