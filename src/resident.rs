//! Read-only 4-bit frame buffers kept in flash.
//!
//! A resident image is stored as four bit-plane slabs, most significant plane
//! first. Each slab holds one byte per column per row pair: the colour sample
//! for that column, ready to be put on the data lines. A refresh therefore
//! never decodes anything, it just walks the slab.
//!
//! ```text
//! slab 0 (plane 3) | slab 1 (plane 2) | slab 2 (plane 1) | slab 3 (plane 0)
//!  row pair 0: COLS samples, row pair 1: COLS samples, ...
//! ```
//!
//! Images are built at compile time with [`ResidentImage`] and placed in a
//! `static`, so they cost no RAM:
//!
//! ```rust
//! use hub75_bcm::compute_resident_bytes;
//! use hub75_bcm::resident::{ResidentFrameBuffer, ResidentImage};
//! use hub75_bcm::{Color, FrameBuffer};
//!
//! const ROWS: usize = 32;
//! const COLS: usize = 64;
//! const BYTES: usize = compute_resident_bytes(ROWS, COLS);
//!
//! static SPLASH: [u8; BYTES] = ResidentImage::<ROWS, COLS, BYTES>::new()
//!     .with_fill(0, 0, 64)
//!     .with_pixel(10, 20, 255, 128, 0)
//!     .into_bytes();
//!
//! let fb = ResidentFrameBuffer::<ROWS, COLS, BYTES>::new(&SPLASH);
//! assert_eq!(fb.pixel(10, 20), Color::new(15, 8, 0));
//! assert_eq!(fb.pixel(0, 0), Color::new(0, 0, 4));
//! ```

use crate::compute_resident_bytes;
use crate::compute_rows;
use crate::Color;
use crate::FrameBuffer;
use crate::RESIDENT_PLANES;

/// Offset of the byte holding the sample of storage column `x`, row pair
/// `row` and `plane`.
const fn sample_index(rows: usize, cols: usize, plane: u8, row: usize, x: usize) -> usize {
    let slab = (RESIDENT_PLANES - 1 - plane) as usize;
    slab * compute_rows(rows) * cols + row * cols + x
}

/// Frame buffer over an image in read-only storage.
///
/// Only the reference is held; switching frames is a pointer swap.
pub struct ResidentFrameBuffer<const ROWS: usize, const COLS: usize, const BYTES: usize> {
    data: &'static [u8; BYTES],
}

impl<const ROWS: usize, const COLS: usize, const BYTES: usize> ResidentFrameBuffer<ROWS, COLS, BYTES> {
    /// Wrap a resident image.
    #[must_use]
    pub const fn new(data: &'static [u8; BYTES]) -> Self {
        const {
            crate::assert_geometry(ROWS, COLS);
            assert!(
                BYTES == compute_resident_bytes(ROWS, COLS),
                "BYTES must equal compute_resident_bytes(ROWS, COLS)"
            );
        }
        Self { data }
    }

    /// Show another resident image.
    pub fn swap_buffer(&mut self, data: &'static [u8; BYTES]) {
        self.data = data;
    }

    /// The image currently shown.
    #[must_use]
    pub const fn as_bytes(&self) -> &'static [u8; BYTES] {
        self.data
    }
}

impl<const ROWS: usize, const COLS: usize, const BYTES: usize> FrameBuffer
    for ResidentFrameBuffer<ROWS, COLS, BYTES>
{
    const ROWS: usize = ROWS;
    const COLS: usize = COLS;
    const PLANES: u8 = RESIDENT_PLANES;

    #[cfg_attr(feature = "max-speed", inline(always))]
    fn shift_row<F: FnMut(u8)>(&self, plane: u8, row: usize, mut emit: F) {
        if row >= compute_rows(ROWS) || plane >= RESIDENT_PLANES {
            return;
        }
        let start = sample_index(ROWS, COLS, plane, row, 0);
        let samples = &self.data[start..start + COLS];
        if cfg!(feature = "flip-horizontal") {
            for &sample in samples.iter().rev() {
                emit(sample);
            }
        } else {
            for &sample in samples {
                emit(sample);
            }
        }
    }

    fn pixel(&self, x: usize, y: usize) -> Color {
        if x >= COLS || y >= ROWS {
            return Color::BLACK;
        }
        let (half, row) = crate::split_row(y, ROWS);
        let mut channels = [0u8; 3];
        for plane in 0..RESIDENT_PLANES {
            let sample = self.data[sample_index(ROWS, COLS, plane, row, x)] >> (half * 3);
            for (channel, value) in channels.iter_mut().enumerate() {
                *value |= ((sample >> channel) & 1) << plane;
            }
        }
        Color::new(channels[0], channels[1], channels[2])
    }
}

impl<const ROWS: usize, const COLS: usize, const BYTES: usize> core::fmt::Debug
    for ResidentFrameBuffer<ROWS, COLS, BYTES>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResidentFrameBuffer")
            .field("rows", &ROWS)
            .field("cols", &COLS)
            .field("size", &BYTES)
            .field("address", &self.data.as_ptr())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const ROWS: usize, const COLS: usize, const BYTES: usize> defmt::Format
    for ResidentFrameBuffer<ROWS, COLS, BYTES>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ResidentFrameBuffer<{}, {}, {}>", ROWS, COLS, BYTES);
        defmt::write!(f, " address: {=usize:#x}", self.data.as_ptr() as usize);
    }
}

/// Compile-time builder for resident images.
///
/// Colours passed as 8-bit channels keep their high nibble.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ResidentImage<const ROWS: usize, const COLS: usize, const BYTES: usize> {
    bytes: [u8; BYTES],
}

impl<const ROWS: usize, const COLS: usize, const BYTES: usize> ResidentImage<ROWS, COLS, BYTES> {
    /// An all black image.
    #[must_use]
    pub const fn new() -> Self {
        const {
            crate::assert_geometry(ROWS, COLS);
            assert!(
                BYTES == compute_resident_bytes(ROWS, COLS),
                "BYTES must equal compute_resident_bytes(ROWS, COLS)"
            );
        }
        Self { bytes: [0; BYTES] }
    }

    /// Set one pixel from 8-bit channels. Out of bounds pixels are ignored.
    #[must_use]
    pub const fn with_pixel(self, x: usize, y: usize, red: u8, green: u8, blue: u8) -> Self {
        self.with_color(x, y, Color::new(red >> 4, green >> 4, blue >> 4))
    }

    /// Set one pixel from a panel-native colour. [`Color::NONE`] and out of
    /// bounds pixels are ignored.
    #[must_use]
    pub const fn with_color(mut self, x: usize, y: usize, color: Color) -> Self {
        if x >= COLS || y >= ROWS || color.is_none() {
            return self;
        }
        let (half, row) = crate::split_row(y, ROWS);
        let shift = half * 3;
        let mut plane = 0;
        while plane < RESIDENT_PLANES {
            let index = sample_index(ROWS, COLS, plane, row, x);
            self.bytes[index] =
                (self.bytes[index] & !(0x07 << shift)) | (color.plane_bits(plane) << shift);
            plane += 1;
        }
        self
    }

    /// Set every pixel from 8-bit channels.
    #[must_use]
    pub const fn with_fill(mut self, red: u8, green: u8, blue: u8) -> Self {
        let color = Color::new(red >> 4, green >> 4, blue >> 4);
        let mut plane = 0;
        while plane < RESIDENT_PLANES {
            let bits = color.plane_bits(plane);
            let sample = bits | (bits << 3);
            let start = sample_index(ROWS, COLS, plane, 0, 0);
            let mut index = start;
            while index < start + compute_rows(ROWS) * COLS {
                self.bytes[index] = sample;
                index += 1;
            }
            plane += 1;
        }
        self
    }

    /// The slabs built so far.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BYTES] {
        &self.bytes
    }

    /// Finish the image, ready to be placed in a `static`.
    #[must_use]
    pub const fn into_bytes(self) -> [u8; BYTES] {
        self.bytes
    }
}

impl<const ROWS: usize, const COLS: usize, const BYTES: usize> Default
    for ResidentImage<ROWS, COLS, BYTES>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROWS: usize, const COLS: usize, const BYTES: usize> core::fmt::Debug
    for ResidentImage<ROWS, COLS, BYTES>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResidentImage")
            .field("rows", &ROWS)
            .field("cols", &COLS)
            .field("size", &BYTES)
            .finish()
    }
}
