//! Character raster for the linkage.
//!
//! World coordinates cover `[-WORLD_EXTENT, WORLD_EXTENT]` on both axes, y
//! up. Terminal cells are about twice as tall as they are wide; a canvas
//! twice as wide as it is tall shows the world square undistorted.

use pendulum::{Frame, Point};

/// Half-width of the visible world square, in metres.
pub const WORLD_EXTENT: f64 = 2.5;

const PIVOT: char = '+';
const BOB: char = 'O';
const LINK: char = '.';

/// A fixed-size grid of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Canvas {
    /// A blank canvas. Zero dimensions are bumped to one cell.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![' '; width * height],
        }
    }

    /// Columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Character at a cell, `None` outside the canvas.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        (col < self.width && row < self.height).then(|| self.cells[row * self.width + col])
    }

    fn put(&mut self, col: i64, row: i64, ch: char) {
        let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row)) else {
            return;
        };
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = ch;
        }
    }

    /// Maps a world point to a cell, which may lie off the canvas.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn to_cell(&self, p: Point) -> (i64, i64) {
        let span = 2.0 * WORLD_EXTENT;
        let cols = (self.width - 1) as f64;
        let rows = (self.height - 1) as f64;
        let col = ((p.x + WORLD_EXTENT) / span * cols).round() as i64;
        let row = ((WORLD_EXTENT - p.y) / span * rows).round() as i64;
        (col, row)
    }

    /// Draws a straight segment between two cells (Bresenham).
    pub fn line(&mut self, from: (i64, i64), to: (i64, i64), ch: char) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put(x, y, ch);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draws both links, then the pivot and bobs on top.
    pub fn draw_frame(&mut self, frame: &Frame) {
        let [origin, bob1, bob2] = frame.polyline().map(|p| self.to_cell(p));
        self.line(origin, bob1, LINK);
        self.line(bob1, bob2, LINK);
        self.put(origin.0, origin.1, PIVOT);
        self.put(bob1.0, bob1.1, BOB);
        self.put(bob2.0, bob2.1, BOB);
    }

    /// Rows joined by `\n`, without a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
