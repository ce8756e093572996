//! Board module - manages the square game grid
//!
//! The board is an N×N grid (8 for Classic, 10 for Chaos) stored as a flat
//! row-major array. Coordinates are `(x, y)` with x growing to the right and y
//! growing downwards; piece origins are the top-left corner of the piece's
//! bounding box.
//!
//! Only [`CellState::Filled`] is authoritative occupancy. The hover states are a
//! preview overlay layered on top, and [`Board::clear_hover_marks`] always
//! restores the authoritative board without needing a snapshot.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::hand::Hand;
use crate::pieces::{random_palette_color, Piece};
use crate::rng::SimpleRng;
use crate::types::{CellState, Color, COLOR_MATCH_MIN, MAX_BOARD_LEN, MAX_PIECE_CELLS};

/// Absolute board positions covered by one placed piece.
pub type Footprint = ArrayVec<(i8, i8), MAX_PIECE_CELLS>;

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoardCell {
    pub state: CellState,
    /// Block color. Meaningful when the state is occupied; on empty cells it is
    /// only the decorative default painted at game start.
    pub color: Color,
    /// Color of the piece being previewed over this cell.
    pub preview_color: Color,
}

/// Rows and columns a hovered drop would clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinePreview {
    pub rows: u32,
    pub columns: u32,
}

impl LinePreview {
    pub fn total(&self) -> u32 {
        self.rows + self.columns
    }
}

/// The game board - N×N cells using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    size: u8,
    /// Flat array of cells, row-major order (y * size + x)
    cells: Vec<BoardCell>,
}

impl Board {
    /// Create a new empty board.
    ///
    /// Panics if `size` is zero or larger than [`MAX_BOARD_LEN`].
    pub fn new(size: u8) -> Self {
        assert!(
            size > 0 && size <= MAX_BOARD_LEN,
            "board size must be in 1..={}, got {}",
            MAX_BOARD_LEN,
            size
        );
        let len = size as usize * size as usize;
        Self {
            size,
            cells: vec![BoardCell::default(); len],
        }
    }

    /// Empty board whose cells carry random palette colors (used by hosts for
    /// the load-up animation; the colors have no rule meaning).
    pub fn with_default_colors(size: u8, rng: &mut SimpleRng) -> Self {
        let mut board = Self::new(size);
        for cell in &mut board.cells {
            cell.color = random_palette_color(rng);
        }
        board
    }

    /// Side length of the board
    pub fn size(&self) -> u8 {
        self.size
    }

    #[inline(always)]
    fn index(&self, x: i16, y: i16) -> Option<usize> {
        let n = self.size as i16;
        if x < 0 || x >= n || y < 0 || y >= n {
            return None;
        }
        Some((y as usize) * (self.size as usize) + (x as usize))
    }

    #[inline(always)]
    fn coords(&self, idx: usize) -> (i8, i8) {
        let n = self.size as usize;
        ((idx % n) as i8, (idx / n) as i8)
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<BoardCell> {
        self.index(x as i16, y as i16).map(|idx| self.cells[idx])
    }

    /// State at position (x, y), None if out of bounds
    pub fn state(&self, x: i8, y: i8) -> Option<CellState> {
        self.get(x, y).map(|c| c.state)
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: BoardCell) -> bool {
        match self.index(x as i16, y as i16) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Mark a single cell as filled with `color`.
    pub fn fill(&mut self, x: i8, y: i8, color: Color) -> bool {
        self.set(
            x,
            y,
            BoardCell {
                state: CellState::Filled,
                color,
                preview_color: Color::default(),
            },
        )
    }

    /// Check if position is occupied (within bounds and holding a block)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.state(x, y), Some(s) if s.is_occupied())
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[BoardCell] {
        &self.cells
    }

    /// Number of authoritatively filled cells.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.state.is_occupied()).count()
    }

    /// True if any preview mark is present.
    pub fn has_hover_marks(&self) -> bool {
        self.cells.iter().any(|c| c.state.is_overlay())
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        let n = self.size as usize;
        if y >= n {
            return false;
        }
        self.cells[y * n..(y + 1) * n]
            .iter()
            .all(|c| c.state == CellState::Filled)
    }

    /// Check if a column is completely filled
    pub fn is_column_full(&self, x: usize) -> bool {
        let n = self.size as usize;
        if x >= n {
            return false;
        }
        (0..n).all(|y| self.cells[y * n + x].state == CellState::Filled)
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.state = CellState::Empty;
        }
    }

    /// True iff every block of `piece`, translated by the origin, lands in
    /// bounds on a cell that holds no block.
    pub fn fits_at(&self, piece: &Piece, x: i8, y: i8) -> bool {
        piece.cells().iter().all(|&(dx, dy)| {
            match self.index(x as i16 + dx as i16, y as i16 + dy as i16) {
                Some(idx) => !self.cells[idx].state.is_occupied(),
                None => false,
            }
        })
    }

    /// Every origin at which `piece` fits.
    pub fn legal_origins(&self, piece: &Piece) -> LegalOrigins {
        let mut origins = LegalOrigins::empty(self.size);
        let n = self.size as i16;
        let max_y = n - piece.height() as i16;
        let max_x = n - piece.width() as i16;
        for y in 0..=max_y {
            for x in 0..=max_x {
                if self.fits_at(piece, x as i8, y as i8) {
                    origins.mark(x as usize, y as usize);
                }
            }
        }
        origins
    }

    /// First legal origin in row-major order.
    pub fn first_legal_origin(&self, piece: &Piece) -> Option<(i8, i8)> {
        let n = self.size as i16;
        for y in 0..=(n - piece.height() as i16) {
            for x in 0..=(n - piece.width() as i16) {
                if self.fits_at(piece, x as i8, y as i8) {
                    return Some((x as i8, y as i8));
                }
            }
        }
        None
    }

    /// True if `piece` fits anywhere (stops at the first legal origin).
    pub fn has_legal_origin(&self, piece: &Piece) -> bool {
        self.first_legal_origin(piece).is_some()
    }

    /// True if at least one piece in the hand fits somewhere.
    pub fn any_piece_fits(&self, hand: &Hand) -> bool {
        hand.pieces().any(|(_, p)| self.has_legal_origin(p))
    }

    /// Number of hand pieces that fit somewhere.
    pub fn count_fittable_pieces(&self, hand: &Hand) -> usize {
        hand.pieces()
            .filter(|(_, p)| self.has_legal_origin(p))
            .count()
    }

    /// Write `piece` onto the board with the given state.
    ///
    /// Occupied target states also take the piece color; `Hovered` records it
    /// as the preview color. Returns the covered positions.
    ///
    /// Panics if the piece does not fit at the origin: there is no valid board
    /// that can result from such a call.
    pub fn stamp(&mut self, piece: &Piece, x: i8, y: i8, target: CellState) -> Footprint {
        assert!(
            self.fits_at(piece, x, y),
            "stamp: piece does not fit at ({}, {})",
            x,
            y
        );
        let mut footprint = Footprint::new();
        for (dx, dy) in piece.cells() {
            let (px, py) = (x + dx, y + dy);
            if let Some(idx) = self.index(px as i16, py as i16) {
                let cell = &mut self.cells[idx];
                cell.state = target;
                if target.is_occupied() {
                    cell.color = piece.color();
                } else if target == CellState::Hovered {
                    cell.preview_color = piece.color();
                }
                footprint.push((px, py));
            }
        }
        footprint
    }

    /// Undo every preview mark, restoring authoritative occupancy.
    pub fn clear_hover_marks(&mut self) {
        for cell in &mut self.cells {
            match cell.state {
                CellState::Hovered | CellState::HoveredBreakEmpty => {
                    cell.state = CellState::Empty;
                    cell.preview_color = Color::default();
                }
                CellState::HoveredBreakFilled => {
                    cell.state = CellState::Filled;
                    cell.preview_color = Color::default();
                }
                CellState::Empty | CellState::Filled => {}
            }
        }
    }

    /// Preview a drop at the origin: mark the piece's cells as `Hovered` and
    /// every cell of a row/column that would complete with a `HoveredBreak*`
    /// state. Existing marks are cleared first; authoritative state is never
    /// changed. Returns what would clear.
    ///
    /// Origins where the piece does not fit leave the board unmarked.
    pub fn compute_hover_preview(&mut self, piece: &Piece, x: i8, y: i8) -> LinePreview {
        self.clear_hover_marks();
        if !self.fits_at(piece, x, y) {
            return LinePreview::default();
        }

        let mut scratch = self.clone();
        scratch.stamp(piece, x, y, CellState::Hovered);

        let n = self.size as usize;
        let covered = |s: CellState| matches!(s, CellState::Filled | CellState::Hovered);
        let rows: ArrayVec<usize, { MAX_BOARD_LEN as usize }> = (0..n)
            .filter(|&r| (0..n).all(|c| covered(scratch.cells[r * n + c].state)))
            .collect();
        let cols: ArrayVec<usize, { MAX_BOARD_LEN as usize }> = (0..n)
            .filter(|&c| (0..n).all(|r| covered(scratch.cells[r * n + c].state)))
            .collect();

        self.stamp(piece, x, y, CellState::Hovered);

        let color = piece.color();
        let mark = |cell: &mut BoardCell| {
            if cell.state.is_occupied() {
                cell.state = CellState::HoveredBreakFilled;
            } else {
                cell.state = CellState::HoveredBreakEmpty;
            }
            cell.preview_color = color;
        };
        for &r in &rows {
            for c in 0..n {
                mark(&mut self.cells[r * n + c]);
            }
        }
        for &c in &cols {
            for r in 0..n {
                mark(&mut self.cells[r * n + c]);
            }
        }

        LinePreview {
            rows: rows.len() as u32,
            columns: cols.len() as u32,
        }
    }

    /// Clear every completely filled row and column.
    ///
    /// Rows and columns are detected before anything is cleared, so a cell at
    /// the intersection of two cleared lines is cleared once but both lines are
    /// counted. Returns rows + columns cleared.
    pub fn break_full_lines(&mut self) -> u32 {
        let n = self.size as usize;
        let rows: ArrayVec<usize, { MAX_BOARD_LEN as usize }> =
            (0..n).filter(|&y| self.is_row_full(y)).collect();
        let cols: ArrayVec<usize, { MAX_BOARD_LEN as usize }> =
            (0..n).filter(|&x| self.is_column_full(x)).collect();

        for &y in &rows {
            for x in 0..n {
                self.cells[y * n + x].state = CellState::Empty;
            }
        }
        for &x in &cols {
            for y in 0..n {
                self.cells[y * n + x].state = CellState::Empty;
            }
        }

        (rows.len() + cols.len()) as u32
    }

    /// Remove same-color groups connected to the last placement.
    ///
    /// Groups are 4-connected `Filled` cells of matching color, grown from the
    /// seed cells only. A group is removed when it has at least
    /// [`COLOR_MATCH_MIN`] cells and at least one of them is not a seed, so a
    /// piece never clears itself. Returns the number of cells removed.
    pub fn break_color_matches(&mut self, seeds: &[(i8, i8)]) -> u32 {
        let len = self.cells.len();
        let mut is_seed = vec![false; len];
        for &(x, y) in seeds {
            if let Some(idx) = self.index(x as i16, y as i16) {
                is_seed[idx] = true;
            }
        }

        let mut visited = vec![false; len];
        let mut doomed: Vec<usize> = Vec::new();
        let mut group: Vec<usize> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        for &(x, y) in seeds {
            let Some(start) = self.index(x as i16, y as i16) else {
                continue;
            };
            if visited[start] || self.cells[start].state != CellState::Filled {
                continue;
            }

            let target = self.cells[start].color;
            group.clear();
            stack.clear();
            stack.push(start);

            while let Some(idx) = stack.pop() {
                if visited[idx] {
                    continue;
                }
                let cell = self.cells[idx];
                if cell.state != CellState::Filled || !cell.color.matches(target) {
                    continue;
                }
                visited[idx] = true;
                group.push(idx);

                let (cx, cy) = self.coords(idx);
                for (dx, dy) in [(1i16, 0i16), (-1, 0), (0, 1), (0, -1)] {
                    if let Some(next) = self.index(cx as i16 + dx, cy as i16 + dy) {
                        if !visited[next] {
                            stack.push(next);
                        }
                    }
                }
            }

            let touches_existing = group.iter().any(|&i| !is_seed[i]);
            if group.len() >= COLOR_MATCH_MIN && touches_existing {
                doomed.extend_from_slice(&group);
            }
        }

        for &idx in &doomed {
            self.cells[idx].state = CellState::Empty;
        }
        doomed.len() as u32
    }

    /// Build a board from rows of characters, for tests and fixtures.
    ///
    /// `.` is empty; a digit `0`-`7` is a filled cell with that palette color.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut board = Self::new(rows.len() as u8);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if let Some(d) = ch.to_digit(10) {
                    let color = crate::types::PALETTE[d as usize % crate::types::PALETTE.len()];
                    board.fill(x as i8, y as i8, color);
                }
            }
        }
        board
    }
}

/// Per-origin legality grid for one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegalOrigins {
    size: u8,
    spots: Vec<bool>,
}

impl LegalOrigins {
    pub fn empty(size: u8) -> Self {
        Self {
            size,
            spots: vec![false; size as usize * size as usize],
        }
    }

    fn mark(&mut self, x: usize, y: usize) {
        self.spots[y * self.size as usize + x] = true;
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn is_legal(&self, x: i8, y: i8) -> bool {
        if x < 0 || y < 0 || x as u8 >= self.size || y as u8 >= self.size {
            return false;
        }
        self.spots[y as usize * self.size as usize + x as usize]
    }

    pub fn any(&self) -> bool {
        self.spots.iter().any(|&s| s)
    }

    pub fn count(&self) -> usize {
        self.spots.iter().filter(|&&s| s).count()
    }

    /// First legal origin in row-major order.
    pub fn first(&self) -> Option<(i8, i8)> {
        self.iter().next()
    }

    /// Legal origins in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let n = self.size as usize;
        self.spots
            .iter()
            .enumerate()
            .filter(|(_, &s)| s)
            .map(move |(i, _)| ((i % n) as i8, (i / n) as i8))
    }
}
