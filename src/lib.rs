//! Bit-banged Binary Code Modulation driver for HUB75 LED panels.
//!
//! ## How a HUB75 panel is driven
//!
//! A HUB75 panel has no memory for a whole picture. It holds one row pair at a
//! time in a chain of shift registers and relies on the controller to scan
//! through the row pairs fast enough that the eye sees a steady image.
//!
//! ### Signal names
//! - **R1 G1 B1 / R2 G2 B2** – colour data for the upper and the lower half of the panel
//! - **CLK** – shift clock; each pulse moves the six colour bits one column along
//! - **LAT** – latch; copies the shifted row into the LED drivers
//! - **OE** – output enable (active LOW on most panels); LEDs light only while it is asserted
//! - **A B C D** – address of the row pair being lit
//!
//! ### One row pass
//! 1. Clock in one six-bit colour sample per column. The sample carries the
//!    top-half pixel in bits 0-2 and the bottom-half pixel in bits 3-5.
//! 2. Select the row pair on the address lines and pulse LAT.
//! 3. Enable the output for a time proportional to the weight of the bit plane
//!    being shown, then blank again.
//!
//! ### Colour depth with Binary Code Modulation
//! A channel stored with `N` bits is shown as `N` planes. Plane `q` is lit for
//! `BASE_US << q` microseconds, so over a frame a pixel is on for a time
//! proportional to its channel value. An extra blanking period after each
//! on-time dims the whole panel without touching the colour weights. See
//! [Batsocks – LED dimming using Binary Code Modulation](https://www.batsocks.co.uk/readme/art_bcm_1.htm).
//!
//! ## Frame buffers
//!
//! Every encoding implements [`FrameBuffer`], which is all the [`refresh::Hub75`]
//! engine needs:
//!
//! 1. **Compact** ([`packed::CompactFrameBuffer`]) – 1 bit per channel, 3 bytes
//!    per 4 columns of a row pair.
//! 2. **Extended** ([`packed::ExtendedFrameBuffer`]) – 2 bits per channel, 6 bytes
//!    per 4 columns of a row pair.
//! 3. **Resident** ([`resident::ResidentFrameBuffer`]) – 4 bits per channel in
//!    four ready-to-send plane slabs that live in read-only storage.
//! 4. **Solid** ([`solid::SolidFrame`]) – no storage at all, every pixel shows the
//!    same colour.
//!
//! The RAM encodings also implement [`FrameBufferOperations`] and the
//! `embedded-graphics` `DrawTarget`, so shapes and text can be drawn straight
//! into them.
//!
//! ```rust,no_run
//! use hub75_bcm::compute_packed_bytes;
//! use hub75_bcm::packed::CompactFrameBuffer;
//! use hub75_bcm::{Color, FrameBufferOperations};
//!
//! const ROWS: usize = 32;
//! const COLS: usize = 64;
//! const BYTES: usize = compute_packed_bytes(ROWS, COLS, 1);
//!
//! let mut fb = CompactFrameBuffer::<ROWS, COLS, BYTES>::new();
//! fb.fill_buffer(Color::BLUE);
//! fb.set_block(8, 3, 4, Color::YELLOW);
//! fb.set_pixel(0, 0, Color::RED);
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `compact`, `extended`, `resident` Features
//! Select the encoding behind [`DefaultFrameBuffer`] and
//! [`compute_default_bytes`]. `compact` is on by default; at most one may be
//! enabled, so pick another one with default features turned off:
//!
//! ```toml
//! [dependencies]
//! hub75-bcm = { version = "0.1.0", default-features = false, features = ["extended"] }
//! ```
//!
//! With none of them enabled only the explicit types are available, and the
//! solid frame gives an immediate-mode panel without any buffer.
//!
//! ### `flip-horizontal` and `flip-vertical` Features
//! Mirror the panel for boards mounted the other way round. Pixel coordinates
//! stay logical; only the placement in the buffer (or the scan order) changes.
//! The resident encoding can only be flipped horizontally.
//!
//! ### `max-speed` Feature
//! Forces inlining of the row shift loop and of the pin primitives. Larger
//! code, shorter row passes.
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the colour, frame buffer and engine types and
//! logs engine creation. No functional changes.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

#[cfg(any(
    all(feature = "compact", feature = "extended"),
    all(feature = "compact", feature = "resident"),
    all(feature = "extended", feature = "resident"),
))]
compile_error!(
    "at most one of the `compact`, `extended` and `resident` features may be enabled; \
     disable default features to select `extended` or `resident`"
);

#[cfg(all(feature = "resident", feature = "flip-vertical"))]
compile_error!("the `resident` encoding cannot be flipped vertically");

pub mod color;
pub mod layout;
pub mod packed;
pub mod pins;
pub mod refresh;
#[cfg(not(feature = "flip-vertical"))]
pub mod resident;
pub mod solid;

pub use color::Clamped;
pub use color::Color;
pub use color::ColorCodec;
pub use color::FullRange;
pub use color::NormalizedFloat;
pub use color::Truncating;

/// Planes stored by the resident encoding.
pub const RESIDENT_PLANES: u8 = 4;

/// Largest number of row pairs the 4-bit address lines can select.
pub const MAX_ROW_PAIRS: usize = 16;

/// Computes the number of row pairs from the panel height.
///
/// # Arguments
///
/// * `rows` - Total number of rows in the display
///
/// # Returns
///
/// Number of row passes per plane
#[must_use]
pub const fn compute_rows(rows: usize) -> usize {
    rows / 2
}

/// Computes the total BCM weight of a frame with `bits` planes.
///
/// A row is lit for `BASE_US` times this value over one frame.
#[must_use]
pub const fn compute_frame_count(bits: u8) -> usize {
    (1usize << bits) - 1
}

/// Computes the buffer size of a packed (Compact or Extended) frame buffer.
///
/// # Arguments
///
/// * `rows` - Total number of rows in the display
/// * `cols` - Number of columns in the display
/// * `planes` - Bits stored per colour channel (1 or 2)
#[must_use]
pub const fn compute_packed_bytes(rows: usize, cols: usize, planes: u8) -> usize {
    compute_rows(rows) * cols / layout::GROUP_PIXELS * layout::BYTES_PER_PLANE * planes as usize
}

/// Computes the size of a resident image: one byte per column and row pair for
/// each of the four planes.
#[must_use]
pub const fn compute_resident_bytes(rows: usize, cols: usize) -> usize {
    RESIDENT_PLANES as usize * compute_rows(rows) * cols
}

/// Computes the buffer size of [`DefaultFrameBuffer`].
#[cfg(feature = "compact")]
#[must_use]
pub const fn compute_default_bytes(rows: usize, cols: usize) -> usize {
    compute_packed_bytes(rows, cols, 1)
}

/// Computes the buffer size of [`DefaultFrameBuffer`].
#[cfg(feature = "extended")]
#[must_use]
pub const fn compute_default_bytes(rows: usize, cols: usize) -> usize {
    compute_packed_bytes(rows, cols, 2)
}

/// Computes the buffer size of [`DefaultFrameBuffer`].
#[cfg(feature = "resident")]
#[must_use]
pub const fn compute_default_bytes(rows: usize, cols: usize) -> usize {
    compute_resident_bytes(rows, cols)
}

/// Frame buffer selected by the encoding feature.
#[cfg(feature = "compact")]
pub type DefaultFrameBuffer<const ROWS: usize, const COLS: usize, const BYTES: usize> =
    packed::CompactFrameBuffer<ROWS, COLS, BYTES>;

/// Frame buffer selected by the encoding feature.
#[cfg(feature = "extended")]
pub type DefaultFrameBuffer<const ROWS: usize, const COLS: usize, const BYTES: usize> =
    packed::ExtendedFrameBuffer<ROWS, COLS, BYTES>;

/// Frame buffer selected by the encoding feature.
#[cfg(all(feature = "resident", not(feature = "flip-vertical")))]
pub type DefaultFrameBuffer<const ROWS: usize, const COLS: usize, const BYTES: usize> =
    resident::ResidentFrameBuffer<ROWS, COLS, BYTES>;

/// Read side of a frame buffer, used by the refresh engine.
///
/// Coordinates are logical: `(0, 0)` is the top left corner whatever the
/// mounting flips are.
pub trait FrameBuffer {
    /// Total number of rows in the display.
    const ROWS: usize;
    /// Number of columns in the display.
    const COLS: usize;
    /// Bit planes shown per frame.
    const PLANES: u8;

    /// Emit the colour sample of every column of row pair `row` for `plane`
    /// (0 = least significant), in clocking order.
    fn shift_row<F: FnMut(u8)>(&self, plane: u8, row: usize, emit: F);

    /// The colour stored at `(x, y)`, [`Color::BLACK`] when out of bounds.
    fn pixel(&self, x: usize, y: usize) -> Color;
}

/// Write side of a RAM frame buffer.
///
/// Every operation ignores coordinates outside the panel and treats
/// [`Color::NONE`] as "leave untouched".
pub trait FrameBufferOperations: FrameBuffer {
    /// Set a single pixel.
    fn set_pixel(&mut self, x: usize, y: usize, color: Color);

    /// Set every pixel of the panel.
    fn fill_buffer(&mut self, color: Color);

    /// Set the `4 * count` pixels of row `y` starting at column `x`. The run is
    /// clipped at the right edge of the panel.
    fn set_block(&mut self, x: usize, y: usize, count: usize, color: Color);

    /// Turn every pixel off.
    fn erase(&mut self) {
        self.fill_buffer(Color::BLACK);
    }
}

/// Maps a logical pixel to its place in storage, or `None` when it is off the
/// panel.
#[inline]
pub(crate) fn panel_position(x: usize, y: usize, rows: usize, cols: usize) -> Option<(usize, usize)> {
    if x >= cols || y >= rows {
        return None;
    }
    let x = if cfg!(feature = "flip-horizontal") {
        cols - 1 - x
    } else {
        x
    };
    let y = if cfg!(feature = "flip-vertical") {
        rows - 1 - y
    } else {
        y
    };
    Some((x, y))
}

/// Clips a run of `len` pixels starting at logical `(x, y)` to the panel and
/// maps it to storage as `(first column, row, length)`.
#[inline]
pub(crate) fn panel_span(
    x: usize,
    y: usize,
    len: usize,
    rows: usize,
    cols: usize,
) -> Option<(usize, usize, usize)> {
    let (_, row) = panel_position(x, y, rows, cols)?;
    let len = len.min(cols - x);
    if len == 0 {
        return None;
    }
    let start = if cfg!(feature = "flip-horizontal") {
        cols - x - len
    } else {
        x
    };
    Some((start, row, len))
}

/// Rejects panel sizes the packing and the 4-bit row address cannot express.
/// Called from `const` blocks so a bad geometry fails the build.
pub(crate) const fn assert_geometry(rows: usize, cols: usize) {
    assert!(rows >= 2 && rows % 2 == 0, "ROWS must be even");
    assert!(
        compute_rows(rows).is_power_of_two(),
        "ROWS / 2 must be a power of two"
    );
    assert!(
        compute_rows(rows) <= MAX_ROW_PAIRS,
        "the row address selects at most 16 row pairs"
    );
    assert!(cols >= 4 && cols % 4 == 0, "COLS must be a multiple of 4");
}

/// Splits a storage row into its half (0 top, 1 bottom) and row pair.
#[inline]
pub(crate) const fn split_row(y: usize, rows: usize) -> (usize, usize) {
    let nrows = compute_rows(rows);
    if y < nrows {
        (0, y)
    } else {
        (1, y - nrows)
    }
}
