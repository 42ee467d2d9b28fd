//! Immediate-mode frame with no pixel storage.
//!
//! When there is no RAM to spare for a buffer the panel can still show a
//! single colour: every column of every row pair gets the same sample.

use crate::Color;
use crate::FrameBuffer;

/// A whole-panel colour shown with `PLANES` bit planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolidFrame<const ROWS: usize, const COLS: usize, const PLANES: u8> {
    color: Color,
}

impl<const ROWS: usize, const COLS: usize, const PLANES: u8> SolidFrame<ROWS, COLS, PLANES> {
    /// A frame showing `color`. [`Color::NONE`] shows black.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        const {
            crate::assert_geometry(ROWS, COLS);
            assert!(PLANES >= 1 && PLANES <= 4, "a solid frame shows 1 to 4 planes");
        }
        let color = if color.is_none() {
            Color::BLACK
        } else {
            color.quantized(PLANES)
        };
        Self { color }
    }

    /// Change the colour. [`Color::NONE`] keeps the current one.
    pub fn set_color(&mut self, color: Color) {
        if !color.is_none() {
            self.color = color.quantized(PLANES);
        }
    }

    /// The colour shown.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }
}

impl<const ROWS: usize, const COLS: usize, const PLANES: u8> FrameBuffer
    for SolidFrame<ROWS, COLS, PLANES>
{
    const ROWS: usize = ROWS;
    const COLS: usize = COLS;
    const PLANES: u8 = PLANES;

    #[cfg_attr(feature = "max-speed", inline(always))]
    fn shift_row<F: FnMut(u8)>(&self, plane: u8, row: usize, mut emit: F) {
        if row >= crate::compute_rows(ROWS) || plane >= PLANES {
            return;
        }
        let bits = self.color.plane_bits(plane);
        let sample = bits | (bits << 3);
        for _ in 0..COLS {
            emit(sample);
        }
    }

    fn pixel(&self, x: usize, y: usize) -> Color {
        if x >= COLS || y >= ROWS {
            return Color::BLACK;
        }
        self.color
    }
}

#[cfg(feature = "defmt")]
impl<const ROWS: usize, const COLS: usize, const PLANES: u8> defmt::Format
    for SolidFrame<ROWS, COLS, PLANES>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SolidFrame<{}, {}, {}> {}", ROWS, COLS, PLANES, self.color);
    }
}
