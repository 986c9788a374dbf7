use textwrap::wrap;

use super::colors::{tile_colors, Rgb};
use super::error::{Result, TuiError};
use crate::engine::grid::{Idx, SIZE};
use crate::engine::session::View;

///  Layout, with the board drawn below a two line header:
///
///   2048 Puzzle               SCORE 1234  BEST 5678
///   You win! Keep going.
///
///  ╔═════════════════════════════════════╗
///  ║                                     ║
///  ║ xxxxxxxx xxxxxxxx xxxxxxxx xxxxxxxx ║
///  ║ xxxxxxxx xxxxxxxx xxxxxxxx xxxxxxxx ║
///  ║ xxxxxxxx xxxxxxxx xxxxxxxx xxxxxxxx ║
///  ║                                     ║
///  ║   ...three more rows of tiles...    ║
///  ║                                     ║
///  ╚═════════════════════════════════════╝
///   ←↑→↓ hjkl move   n new game   q quit
///   How to play: ...
const MARGIN_X: usize = 2;
const BOARD_Y: usize = 4;
const BORDER_WIDTH: usize = 1;
const TILE_WIDTH: usize = 8;
const TILE_HEIGHT: usize = 3;
const GAP_X: usize = 1;
const GAP_Y: usize = 1;
const BOARD_WIDTH: usize = 2 * BORDER_WIDTH + SIZE * TILE_WIDTH + (SIZE + 1) * GAP_X;
const BOARD_HEIGHT: usize = 2 * BORDER_WIDTH + SIZE * TILE_HEIGHT + (SIZE + 1) * GAP_Y;
const OVERLAY_WIDTH: usize = BOARD_WIDTH - 8;
const OVERLAY_HEIGHT: usize = 7;

const TITLE: &str = "2048";
const SUBTITLE: &str = "Puzzle";
const CONTROLS: &str = "←↑→↓ hjkl move   n new game   q quit";
const INSTRUCTIONS: &str = "How to play: use your arrow keys to move the tiles. When two tiles \
                            with the same number touch, they merge into one! Goal: reach the \
                            2048 tile to win!";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Style {
    pub(crate) fg: Option<Rgb>,
    pub(crate) bg: Option<Rgb>,
    pub(crate) bold: bool,
}

impl Style {
    fn colored(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg: Some(fg),
            bg: Some(bg),
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Rectangle {
    pub(crate) x: usize,
    pub(crate) y: usize,
    pub(crate) width: usize,
    pub(crate) height: usize,
}

impl Rectangle {
    fn inner(&self) -> Rectangle {
        Rectangle {
            x: self.x + 1,
            y: self.y + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }
}

/// Scene is an off-screen grid of styled characters that a Renderer copies to the terminal.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Scene {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Scene {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub(crate) fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub(crate) fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    /// Rows of cells from top to bottom.
    pub(crate) fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    pub(crate) fn row_text(&self, y: usize) -> String {
        self.rows()
            .nth(y)
            .map(|row| row.iter().map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    pub(crate) fn write(&mut self, x: usize, y: usize, text: &str, style: Style) -> Result<()> {
        if y >= self.height {
            return Err(TuiError::OutOfBoundsY(y));
        }
        for (i, ch) in text.chars().enumerate() {
            let cell = self.cell_mut(x + i, y)?;
            *cell = Cell { ch, style };
        }
        Ok(())
    }

    /// Write `text` centered horizontally within the row `y` of `rect`.
    pub(crate) fn write_centered(
        &mut self,
        rect: &Rectangle,
        y: usize,
        text: &str,
        style: Style,
    ) -> Result<()> {
        let len = text.chars().count();
        let x = rect.x + rect.width.saturating_sub(len) / 2;
        self.write(x, y, text, style)
    }

    pub(crate) fn fill(&mut self, rect: &Rectangle, style: Style) -> Result<()> {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                *self.cell_mut(x, y)? = Cell { ch: ' ', style };
            }
        }
        Ok(())
    }

    pub(crate) fn draw_border(&mut self, rect: &Rectangle, style: Style) -> Result<()> {
        let box_corner = boxy::Char::upper_left(boxy::Weight::Doubled);
        let box_horizontal = boxy::Char::horizontal(boxy::Weight::Doubled);
        let box_vertical = boxy::Char::vertical(boxy::Weight::Doubled);
        if rect.width < 2 || rect.height < 2 {
            // a border needs at least two rows and two columns
            return Ok(());
        }
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.x + rect.width - 1, rect.y + rect.height - 1);

        let mut put = |x: usize, y: usize, ch: char| -> Result<()> {
            *self.cell_mut(x, y)? = Cell { ch, style };
            Ok(())
        };

        put(left, top, box_corner.clone().into())?;
        put(right, top, box_corner.clone().rotate_cw(1).into())?;
        put(right, bottom, box_corner.clone().rotate_cw(2).into())?;
        put(left, bottom, box_corner.clone().rotate_ccw(1).into())?;
        for x in left + 1..right {
            put(x, top, box_horizontal.clone().into())?;
            put(x, bottom, box_horizontal.clone().into())?;
        }
        for y in top + 1..bottom {
            put(left, y, box_vertical.clone().into())?;
            put(right, y, box_vertical.clone().into())?;
        }
        Ok(())
    }

    fn cell_mut(&mut self, x: usize, y: usize) -> Result<&mut Cell> {
        if x >= self.width {
            return Err(TuiError::OutOfBoundsX(x));
        }
        if y >= self.height {
            return Err(TuiError::OutOfBoundsY(y));
        }
        let width = self.width;
        self.cells
            .get_mut(y * width + x)
            .ok_or(TuiError::OutOfBoundsY(y))
    }
}

fn instructions() -> Vec<String> {
    wrap(INSTRUCTIONS, BOARD_WIDTH)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Minimum terminal size needed by compose.
pub(crate) fn required_size() -> (usize, usize) {
    (
        2 * MARGIN_X + BOARD_WIDTH,
        BOARD_Y + BOARD_HEIGHT + 2 + instructions().len(),
    )
}

fn tile_rectangle(idx: Idx) -> Rectangle {
    Rectangle {
        x: MARGIN_X + BORDER_WIDTH + GAP_X + (TILE_WIDTH + GAP_X) * idx.col(),
        y: BOARD_Y + BORDER_WIDTH + GAP_Y + (TILE_HEIGHT + GAP_Y) * idx.row(),
        width: TILE_WIDTH,
        height: TILE_HEIGHT,
    }
}

/// Lay out a session view on a terminal of the given size.
pub(crate) fn compose(view: &View, width: usize, height: usize) -> Result<Scene> {
    let (min_width, min_height) = required_size();
    if width < min_width || height < min_height {
        return Err(TuiError::TerminalTooSmall(min_width, min_height));
    }
    let mut scene = Scene::new(width, height);
    let board = Rectangle {
        x: MARGIN_X,
        y: BOARD_Y,
        width: BOARD_WIDTH,
        height: BOARD_HEIGHT,
    };

    // header
    let title = Style {
        fg: Some(Rgb::HIGHLIGHT),
        ..Style::default()
    }
    .bold();
    scene.write(MARGIN_X + 1, 1, TITLE, title)?;
    scene.write(MARGIN_X + 2 + TITLE.len(), 1, SUBTITLE, Style::default())?;
    let panels = format!(" SCORE {} ", view.score) + " " + &format!(" BEST {} ", view.best);
    let panels_x = board.x + board.width - panels.chars().count();
    scene.write(
        panels_x,
        1,
        &panels,
        Style::colored(Rgb::TEXT, Rgb::PANEL_BG).bold(),
    )?;
    if view.won && view.accepts_input {
        scene.write(MARGIN_X + 1, 2, "You win! Keep going.", title)?;
    }

    // board
    let board_style = Style::colored(Rgb::BOARD_FG, Rgb::BOARD_BG);
    scene.fill(&board, board_style)?;
    scene.draw_border(&board, board_style)?;
    for (row, tiles) in view.grid.rows().iter().enumerate() {
        for (col, tile) in tiles.iter().enumerate() {
            let rect = tile_rectangle(Idx(row, col));
            let (bg, fg) = tile_colors(*tile);
            let style = Style::colored(fg, bg);
            scene.fill(&rect, style)?;
            if *tile != 0 {
                let middle = rect.y + TILE_HEIGHT / 2;
                scene.write_centered(&rect, middle, &tile.to_string(), style.bold())?;
            }
        }
    }

    if !view.accepts_input {
        draw_overlay(&mut scene, view, &board)?;
    }

    // footer
    let footer_y = board.y + board.height;
    scene.write(MARGIN_X + 1, footer_y, CONTROLS, Style::default())?;
    for (i, line) in instructions().iter().enumerate() {
        scene.write(MARGIN_X, footer_y + 1 + i, line, Style::default())?;
    }

    Ok(scene)
}

fn draw_overlay(scene: &mut Scene, view: &View, board: &Rectangle) -> Result<()> {
    let overlay = Rectangle {
        x: board.x + (board.width - OVERLAY_WIDTH) / 2,
        y: board.y + (board.height - OVERLAY_HEIGHT) / 2,
        width: OVERLAY_WIDTH,
        height: OVERLAY_HEIGHT,
    };
    let style = Style::colored(Rgb::TEXT, Rgb::PANEL_BG);
    scene.fill(&overlay, style)?;
    scene.draw_border(&overlay, style)?;

    let inner = overlay.inner();
    let headline = if view.won { "You Win!" } else { "Game Over!" };
    scene.write_centered(&inner, inner.y + 1, headline, style.bold())?;
    scene.write_centered(
        &inner,
        inner.y + 2,
        &format!("Final Score: {}", view.score),
        style,
    )?;
    scene.write_centered(&inner, inner.y + 3, "press n to try again", style)?;
    Ok(())
}

/// A scene asking for a larger terminal, clipped to whatever space is available.
pub(crate) fn too_small(width: usize, height: usize) -> Scene {
    let mut scene = Scene::new(width, height);
    let (min_width, min_height) = required_size();
    let message = format!("please resize your terminal to at least {min_width}x{min_height}");
    let clipped: String = message.chars().take(width).collect();
    // nothing fits on a zero-height terminal
    let _ = scene.write(0, 0, &clipped, Style::default());
    scene
}
