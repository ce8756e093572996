//! Hand module - the player's slots and the constrained hand generator
//!
//! A hand is a fixed number of slots, each holding a piece or nothing. Pieces in
//! one hand carry distinct colors taken from the rotating [`ColorPool`]. When a
//! board is supplied the generator retries (rejection sampling) until enough
//! pieces are placeable, and falls back to its last attempt after
//! [`MAX_HAND_ATTEMPTS`].

use serde::Serialize;

use crate::board::Board;
use crate::pieces::{deal_piece, Piece};
use crate::rng::SimpleRng;
use crate::types::{Color, MAX_HAND_ATTEMPTS, PALETTE};

/// Ordered hand slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Hand {
    slots: Vec<Option<Piece>>,
}

impl Hand {
    /// A hand of `size` empty slots.
    pub fn empty(size: u8) -> Self {
        Self {
            slots: vec![None; size as usize],
        }
    }

    pub fn from_slots(slots: Vec<Option<Piece>>) -> Self {
        Self { slots }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<Piece>] {
        &self.slots
    }

    /// Piece in `slot`, None if the slot is empty or out of range.
    pub fn get(&self, slot: usize) -> Option<&Piece> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    /// Remove and return the piece in `slot`.
    pub fn take(&mut self, slot: usize) -> Option<Piece> {
        self.slots.get_mut(slot).and_then(|s| s.take())
    }

    /// Non-empty slots with their index.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, &Piece)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|p| (i, p)))
    }

    /// Number of pieces left.
    pub fn remaining(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// First non-empty slot after `current` (wrapping), or the first non-empty
    /// slot when nothing is selected.
    pub fn next_occupied(&self, current: Option<usize>) -> Option<usize> {
        let n = self.slots.len();
        if n == 0 {
            return None;
        }
        let start = current.map_or(0, |c| c + 1);
        (0..n)
            .map(|i| (start + i) % n)
            .find(|&i| self.slots[i].is_some())
    }
}

/// Colors still unused in the current placement cycle.
///
/// Starts as the full palette. Each successful placement removes its color;
/// removing the last color resets the pool to the full palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorPool {
    colors: Vec<Color>,
}

impl ColorPool {
    pub fn full() -> Self {
        Self {
            colors: PALETTE.to_vec(),
        }
    }

    /// Pool holding exactly these colors (may be empty, for tests).
    pub fn from_colors(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.iter().any(|c| c.matches(color))
    }

    /// Remove `color` if present. Returns true if the pool was reset to the
    /// full palette because it ran empty.
    pub fn remove(&mut self, color: Color) -> bool {
        self.colors.retain(|c| !c.matches(color));
        if self.colors.is_empty() {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.colors.clear();
        self.colors.extend_from_slice(&PALETTE);
    }
}

impl Default for ColorPool {
    fn default() -> Self {
        Self::full()
    }
}

/// Result of one call to [`generate_hand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandDeal {
    pub hand: Hand,
    /// Hands generated, including the accepted one.
    pub attempts: u32,
    /// True when no attempt met the playability floor and the last one was kept.
    pub exhausted: bool,
}

/// Colors for one hand attempt: the first `size` pool colors, shuffled.
///
/// A short pool is topped up with palette colors it does not contain (palette
/// order) so slots stay distinct; only a hand larger than the palette repeats
/// colors.
pub fn colors_for_hand(size: usize, pool: &ColorPool, rng: &mut SimpleRng) -> Vec<Color> {
    let mut colors: Vec<Color> = pool.colors().iter().take(size).copied().collect();
    for &c in PALETTE.iter() {
        if colors.len() >= size {
            break;
        }
        if !colors.iter().any(|x| x.matches(c)) {
            colors.push(c);
        }
    }
    let mut i = 0;
    while colors.len() < size {
        colors.push(PALETTE[i % PALETTE.len()]);
        i += 1;
    }
    rng.shuffle(&mut colors);
    colors
}

/// Deal a hand of `size` pieces with distinct pool colors.
///
/// With a board and `min_placeable > 0`, a hand is accepted only if at least
/// `min_placeable` of its pieces fit somewhere; otherwise it is redrawn, up to
/// [`MAX_HAND_ATTEMPTS`] times, after which the last hand is returned as is.
pub fn generate_hand(
    size: u8,
    pool: &ColorPool,
    board: Option<&Board>,
    min_placeable: usize,
    rng: &mut SimpleRng,
) -> HandDeal {
    let validate = match board {
        Some(b) if min_placeable > 0 => Some(b),
        _ => None,
    };

    let mut attempts = 0;
    loop {
        attempts += 1;
        let colors = colors_for_hand(size as usize, pool, rng);
        let hand = Hand::from_slots(
            colors
                .into_iter()
                .map(|c| Some(deal_piece(rng, Some(c))))
                .collect(),
        );

        let Some(board) = validate else {
            return HandDeal {
                hand,
                attempts,
                exhausted: false,
            };
        };

        let placeable = board.count_fittable_pieces(&hand);
        if placeable >= min_placeable {
            tracing::trace!(attempts, placeable, "hand accepted");
            return HandDeal {
                hand,
                attempts,
                exhausted: false,
            };
        }

        if attempts >= MAX_HAND_ATTEMPTS {
            tracing::warn!(
                attempts,
                placeable,
                min_placeable,
                filled = board.filled_count(),
                "hand generation exhausted, keeping last hand"
            );
            return HandDeal {
                hand,
                attempts,
                exhausted: true,
            };
        }
    }
}
