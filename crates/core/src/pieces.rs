//! Pieces module - the weighted shape catalog and piece dealing
//!
//! Shapes are fixed occupancy matrices (row-major, `1` = block). Each shape has
//! a selection weight; drawing a shape walks the catalog in order subtracting
//! weights from a uniform draw until the remainder goes negative.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::rng::SimpleRng;
use crate::types::{Color, MAX_PIECE_CELLS, PALETTE};

/// Offset of a single block relative to the piece's top-left corner
pub type BlockOffset = (i8, i8);

/// Block offsets of one piece, stack allocated.
pub type PieceCells = ArrayVec<BlockOffset, MAX_PIECE_CELLS>;

/// Shape families, used by hosts for labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeFamily {
    LShape,
    Triangle,
    Skew,
    Square3,
    Square2,
    Line4,
    Line3,
    Line2,
}

impl ShapeFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeFamily::LShape => "l",
            ShapeFamily::Triangle => "triangle",
            ShapeFamily::Skew => "skew",
            ShapeFamily::Square3 => "square3",
            ShapeFamily::Square2 => "square2",
            ShapeFamily::Line4 => "line4",
            ShapeFamily::Line3 => "line3",
            ShapeFamily::Line2 => "line2",
        }
    }
}

/// An immutable shape template.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PieceShape {
    pub family: ShapeFamily,
    /// Row-major occupancy matrix; every row has the same width.
    pub matrix: &'static [&'static [u8]],
    /// Selection weight in half distribution points (1.5 points = 3).
    pub weight: u32,
}

impl PieceShape {
    pub fn height(&self) -> u8 {
        self.matrix.len() as u8
    }

    pub fn width(&self) -> u8 {
        self.matrix.first().map_or(0, |row| row.len() as u8)
    }

    /// Offsets of the occupied cells, row by row.
    pub fn cells(&self) -> PieceCells {
        let mut out = PieceCells::new();
        for (y, row) in self.matrix.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v == 1 {
                    out.push((x as i8, y as i8));
                }
            }
        }
        out
    }

    pub fn block_count(&self) -> u32 {
        self.matrix
            .iter()
            .map(|row| row.iter().filter(|&&v| v == 1).count() as u32)
            .sum()
    }
}

macro_rules! shape {
    ($family:ident, $weight:expr, [$($row:expr),+ $(,)?]) => {
        PieceShape {
            family: ShapeFamily::$family,
            matrix: &[$(&$row),+],
            weight: $weight,
        }
    };
}

/// The full catalog, in selection order.
pub static CATALOG: [PieceShape; 24] = [
    // L / J
    shape!(LShape, 4, [[1, 0, 0], [1, 1, 1]]),
    shape!(LShape, 4, [[1, 1], [1, 0], [1, 0]]),
    shape!(LShape, 4, [[1, 1, 1], [0, 0, 1]]),
    shape!(LShape, 4, [[0, 1], [0, 1], [1, 1]]),
    shape!(LShape, 4, [[0, 0, 1], [1, 1, 1]]),
    shape!(LShape, 4, [[1, 0], [1, 0], [1, 1]]),
    shape!(LShape, 4, [[1, 1, 1], [1, 0, 0]]),
    shape!(LShape, 4, [[1, 1], [0, 1], [0, 1]]),
    // Triangle
    shape!(Triangle, 3, [[1, 1, 1], [0, 1, 0]]),
    shape!(Triangle, 3, [[1, 0], [1, 1], [1, 0]]),
    shape!(Triangle, 3, [[0, 1, 0], [1, 1, 1]]),
    shape!(Triangle, 3, [[0, 1], [1, 1], [0, 1]]),
    // S / Z
    shape!(Skew, 2, [[0, 1, 1], [1, 1, 0]]),
    shape!(Skew, 2, [[1, 0], [1, 1], [0, 1]]),
    shape!(Skew, 2, [[1, 1, 0], [0, 1, 1]]),
    shape!(Skew, 2, [[0, 1], [1, 1], [1, 0]]),
    // Blocks
    shape!(Square3, 6, [[1, 1, 1], [1, 1, 1], [1, 1, 1]]),
    shape!(Square2, 12, [[1, 1], [1, 1]]),
    // Lines
    shape!(Line4, 4, [[1], [1], [1], [1]]),
    shape!(Line4, 4, [[1, 1, 1, 1]]),
    shape!(Line3, 8, [[1], [1], [1]]),
    shape!(Line3, 8, [[1, 1, 1]]),
    shape!(Line2, 4, [[1], [1]]),
    shape!(Line2, 4, [[1, 1]]),
];

/// Sum of all catalog weights.
pub fn total_weight() -> u32 {
    CATALOG.iter().map(|s| s.weight).sum()
}

/// Map a draw in `[0, total_weight())` to a shape.
///
/// Draws past the end fall back to the last shape.
pub fn shape_for_draw(draw: u32) -> &'static PieceShape {
    let mut remaining = draw as i64;
    for shape in CATALOG.iter() {
        remaining -= shape.weight as i64;
        if remaining < 0 {
            return shape;
        }
    }
    &CATALOG[CATALOG.len() - 1]
}

/// Weighted random shape selection.
pub fn select_random_shape(rng: &mut SimpleRng) -> &'static PieceShape {
    shape_for_draw(rng.next_range(total_weight()))
}

/// Uniformly random palette color.
pub fn random_palette_color(rng: &mut SimpleRng) -> Color {
    PALETTE[rng.next_range(PALETTE.len() as u32) as usize]
}

/// Deal a random shape bound to `color`, or to a random palette color.
pub fn deal_piece(rng: &mut SimpleRng, color: Option<Color>) -> Piece {
    let shape = select_random_shape(rng);
    let color = match color {
        Some(c) => c,
        None => random_palette_color(rng),
    };
    Piece::new(shape, color)
}

/// A shape bound to a color. Immutable once dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    shape: &'static PieceShape,
    color: Color,
}

impl Piece {
    pub fn new(shape: &'static PieceShape, color: Color) -> Self {
        Self { shape, color }
    }

    pub fn shape(&self) -> &'static PieceShape {
        self.shape
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn cells(&self) -> PieceCells {
        self.shape.cells()
    }

    pub fn block_count(&self) -> u32 {
        self.shape.block_count()
    }

    pub fn width(&self) -> u8 {
        self.shape.width()
    }

    pub fn height(&self) -> u8 {
        self.shape.height()
    }
}

/// Find the catalog shape with exactly this matrix.
pub fn find_shape(matrix: &[&[u8]]) -> Option<&'static PieceShape> {
    CATALOG.iter().find(|s| {
        s.matrix.len() == matrix.len() && s.matrix.iter().zip(matrix).all(|(a, b)| *a == *b)
    })
}
