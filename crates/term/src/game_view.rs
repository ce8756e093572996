//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{GameSnapshot, Piece};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::CellState;

/// Width reserved for the side panel, in terminal columns.
const PANEL_W: u16 = 20;

/// Board cells a hand preview box is sized for (largest shape side).
const PREVIEW_CELLS: u16 = 4;

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Host-side values shown next to the board that the core does not track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudInfo<'a> {
    pub best_score: Option<u64>,
    /// One-line status, e.g. the result of the last drop.
    pub message: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// A lightweight terminal renderer for the puzzle.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Screen position of the board frame's top-left corner.
#[derive(Debug, Clone, Copy)]
struct Layout {
    start_x: u16,
    start_y: u16,
    frame_w: u16,
    frame_h: u16,
    hand_y: u16,
    panel_x: u16,
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render the current game state into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with_hud(snap, HudInfo::default(), viewport, fb);
    }

    pub fn render_into_with_hud(
        &self,
        snap: &GameSnapshot,
        hud: HudInfo<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let layout = self.layout(snap, viewport);
        let border = CellStyle {
            fg: Rgb::new(200, 200, 200),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        };

        self.draw_border(
            fb,
            layout.start_x,
            layout.start_y,
            layout.frame_w,
            layout.frame_h,
            border,
        );
        self.draw_board(fb, snap, layout);
        self.draw_cursor(fb, snap, layout);
        self.draw_hand(fb, snap, layout);
        self.draw_side_panel(fb, snap, hud, viewport, layout);

        if snap.game_over {
            self.draw_overlay_text(fb, layout, "GAME OVER");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    pub fn render_with_hud(
        &self,
        snap: &GameSnapshot,
        hud: HudInfo<'_>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into_with_hud(snap, hud, viewport, &mut fb);
        fb
    }

    /// Map a board cell to the terminal position of its top-left character.
    pub fn board_cell_origin(
        &self,
        snap: &GameSnapshot,
        viewport: Viewport,
        x: u16,
        y: u16,
    ) -> (u16, u16) {
        let layout = self.layout(snap, viewport);
        (
            layout.start_x + 1 + x * self.cell_w,
            layout.start_y + 1 + y * self.cell_h,
        )
    }

    fn layout(&self, snap: &GameSnapshot, viewport: Viewport) -> Layout {
        let n = snap.board_len as u16;
        let frame_w = n * self.cell_w + 2;
        let frame_h = n * self.cell_h + 2;
        let hand_h = 1 + PREVIEW_CELLS * self.cell_h;
        let total_h = frame_h + 1 + hand_h;
        // The hand row can be wider than the board; the panel sits right of both.
        let content_w = frame_w.max(snap.hand.len() as u16 * self.slot_w());

        let start_x = viewport.width.saturating_sub(content_w + 2 + PANEL_W) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(total_h) / 2,
            AnchorY::Top => 0,
        };
        Layout {
            start_x,
            start_y,
            frame_w,
            frame_h,
            hand_y: start_y + frame_h + 1,
            panel_x: start_x.saturating_add(content_w).saturating_add(2),
        }
    }

    fn slot_w(&self) -> u16 {
        PREVIEW_CELLS * self.cell_w + 2
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_board(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, layout: Layout) {
        let n = snap.board_len as usize;
        let legal = snap.drag.as_ref().map(|d| &d.legal_origins);

        for y in 0..n {
            for x in 0..n {
                let Some(cell) = snap.cell(x, y) else {
                    continue;
                };
                let (ch, style) = match cell.state {
                    CellState::Filled => ('█', block_style(cell.color.into(), false)),
                    CellState::Hovered => ('▓', block_style(cell.preview_color.into(), false)),
                    CellState::HoveredBreakFilled => {
                        ('█', block_style(cell.preview_color.into(), true))
                    }
                    CellState::HoveredBreakEmpty => (
                        '░',
                        CellStyle {
                            fg: cell.preview_color.into(),
                            bg: BOARD_BG,
                            bold: false,
                            dim: false,
                        },
                    ),
                    CellState::Empty => {
                        let is_origin = legal.is_some_and(|l| l.is_legal(x as i8, y as i8));
                        let tint: Rgb = cell.color.into();
                        let style = CellStyle {
                            fg: Rgb::new(90, 90, 100).mix(tint, 1, 4),
                            bg: BOARD_BG,
                            bold: false,
                            dim: true,
                        };
                        (if is_origin { '•' } else { '·' }, style)
                    }
                };
                self.fill_cell_rect(fb, layout, x as u16, y as u16, ch, style);
            }
        }
    }

    /// Outline of the dragged piece where it does not fit.
    fn draw_cursor(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, layout: Layout) {
        let Some(drag) = snap.drag.as_ref() else {
            return;
        };
        let Some((hx, hy)) = drag.hover else {
            return;
        };
        if drag.hover_legal {
            return;
        }
        let style = CellStyle {
            fg: Rgb::new(220, 80, 80),
            bg: BOARD_BG,
            bold: true,
            dim: false,
        };
        let n = snap.board_len as i16;
        for (dx, dy) in drag.piece.cells() {
            let (x, y) = (hx as i16 + dx as i16, hy as i16 + dy as i16);
            if x >= 0 && x < n && y >= 0 && y < n {
                self.fill_cell_rect(fb, layout, x as u16, y as u16, '×', style);
            }
        }
    }

    fn draw_hand(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, layout: Layout) {
        let slot_w = self.slot_w();
        let selected = snap.drag.as_ref().map(|d| d.slot);

        for (i, slot) in snap.hand.iter().enumerate() {
            let x = layout.start_x + i as u16 * slot_w;
            let is_selected = selected == Some(i);
            let label = CellStyle {
                fg: if is_selected {
                    Rgb::new(255, 255, 255)
                } else {
                    Rgb::new(150, 150, 150)
                },
                bg: Rgb::new(0, 0, 0),
                bold: is_selected,
                dim: false,
            };
            if is_selected {
                fb.put_char(x, layout.hand_y, '>', label);
            }
            fb.put_u64(x + 1, layout.hand_y, i as u64 + 1, label);

            match slot {
                Some(piece) => {
                    self.draw_piece_preview(fb, piece, x + 1, layout.hand_y + 1, is_selected)
                }
                None => {
                    let dim = CellStyle { dim: true, ..label };
                    fb.put_char(x + 1, layout.hand_y + 1, '-', dim);
                }
            }
        }
    }

    fn draw_piece_preview(
        &self,
        fb: &mut FrameBuffer,
        piece: &Piece,
        x: u16,
        y: u16,
        lifted: bool,
    ) {
        let mut style = block_style(piece.color().into(), false);
        style.bg = Rgb::new(0, 0, 0);
        if lifted {
            // A lifted piece is drawn faded in its slot.
            style.dim = true;
        }
        for (dx, dy) in piece.cells() {
            let px = x + dx as u16 * self.cell_w;
            let py = y + dy as u16 * self.cell_h;
            fb.fill_rect(px, py, self.cell_w, self.cell_h, '█', style);
        }
    }

    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        layout: Layout,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = layout.start_x + 1 + cell_x * self.cell_w;
        let py = layout.start_y + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: HudInfo<'_>,
        viewport: Viewport,
        layout: Layout,
    ) {
        let panel_x = layout.panel_x;
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle {
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
            bold: true,
            dim: false,
        };
        let value = CellStyle {
            fg: Rgb::new(200, 200, 200),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        };
        let dim = CellStyle { dim: true, ..value };

        let mut y = layout.start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        let end = fb.put_u64(panel_x, y, snap.score, value);
        if snap.score_halves % 2 == 1 {
            fb.put_str(end, y, ".5", dim);
        }
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "BEST", label);
        y = y.saturating_add(1);
        match hud.best_score {
            Some(best) => {
                fb.put_u64(panel_x, y, best.max(snap.score), value);
            }
            None => {
                fb.put_str(panel_x, y, "-", value);
            }
        }
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "COMBO", label);
        y = y.saturating_add(1);
        fb.put_char(panel_x, y, 'x', value);
        fb.put_u64(panel_x + 1, y, snap.combo as u64, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "STREAK", label);
        y = y.saturating_add(1);
        fb.put_u64(panel_x, y, snap.no_break_streak as u64, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "MODE", label);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, snap.mode.as_str(), value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "LINES", label);
        fb.put_u64(panel_x + 7, y, snap.total_lines as u64, value);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, "POPPED", label);
        fb.put_u64(panel_x + 7, y, snap.total_color_blocks as u64, value);
        y = y.saturating_add(2);

        if let Some(msg) = hud.message {
            fb.put_str(panel_x, y, msg, dim);
            y = y.saturating_add(1);
        }

        if y < viewport.height && panel_w >= 16 {
            y = y.saturating_add(1);
            for help in [
                "digit pick  tab next",
                "move  enter drop",
                "esc cancel  r new",
                "m mode  q quit",
            ] {
                if y >= viewport.height {
                    break;
                }
                fb.put_str(panel_x, y, help, dim);
                y = y.saturating_add(1);
            }
        }
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, layout: Layout, text: &str) {
        let mid_y = layout.start_y.saturating_add(layout.frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = layout
            .start_x
            .saturating_add(layout.frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle {
            fg: Rgb::new(255, 255, 255),
            bg: Rgb::new(0, 0, 0),
            bold: true,
            dim: false,
        };
        fb.put_str(x, mid_y, text, style);
    }
}

fn block_style(fg: Rgb, bold: bool) -> CellStyle {
    CellStyle {
        fg,
        bg: BOARD_BG,
        bold,
        dim: false,
    }
}
