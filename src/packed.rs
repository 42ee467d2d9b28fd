//! RAM frame buffers that pack four columns of a row pair into a few bytes.
//!
//! Both encodings share [`PackedFrameBuffer`]; they only differ in how many
//! bit planes each group stores:
//!
//! | Encoding                  | Planes | Group size | 32×64 panel |
//! |---------------------------|--------|------------|-------------|
//! | [`CompactFrameBuffer`]    | 1      | 3 bytes    | 768 bytes   |
//! | [`ExtendedFrameBuffer`]   | 2      | 6 bytes    | 1536 bytes  |
//!
//! A group covers columns `4g..4g + 4` of one row pair, top and bottom half.
//! Groups are stored row pair by row pair, left to right, so one row pass
//! streams a contiguous slice of the buffer. See [`crate::layout`] for the
//! bit placement inside a group.
//!
//! # Writing runs
//! [`FrameBufferOperations::set_block`] writes whole runs of pixels. Pixels
//! that do not fill a group are packed one at a time; for the aligned groups
//! in between only the written half is masked in, one byte at a time, which
//! is what makes filling rectangles and clearing text lines cheap.
//!
//! # Example
//! ```rust
//! use embedded_graphics::pixelcolor::Rgb888;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::PrimitiveStyle;
//! use embedded_graphics::primitives::Rectangle;
//! use hub75_bcm::compute_packed_bytes;
//! use hub75_bcm::packed::ExtendedFrameBuffer;
//! use hub75_bcm::{Color, FrameBuffer, FrameBufferOperations};
//!
//! const ROWS: usize = 32;
//! const COLS: usize = 64;
//! const BYTES: usize = compute_packed_bytes(ROWS, COLS, 2);
//!
//! let mut fb = ExtendedFrameBuffer::<ROWS, COLS, BYTES>::new();
//!
//! Rectangle::new(Point::new(4, 4), Size::new(16, 8))
//!     .into_styled(PrimitiveStyle::with_fill(Rgb888::new(255, 85, 0)))
//!     .draw(&mut fb)
//!     .unwrap();
//!
//! assert_eq!(fb.pixel(4, 4), Color::new(3, 1, 0));
//! ```

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_graphics::geometry::Dimensions;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::OriginDimensions;
use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::Pixel;

use crate::layout::GroupLayout;
use crate::layout::GROUP_PIXELS;
use crate::layout::MAX_GROUP_BYTES;
use crate::Clamped;
use crate::Color;
use crate::ColorCodec;
use crate::FrameBuffer;
use crate::FrameBufferOperations;

/// Packed frame buffer storing `PLANES` bits per channel.
///
/// `BYTES` must equal [`crate::compute_packed_bytes`]`(ROWS, COLS, PLANES)`;
/// `C` is the [`ColorCodec`] used for colours drawn through
/// `embedded-graphics`.
///
/// # Type Parameters
///
/// * `ROWS` - Total number of rows in the display
/// * `COLS` - Number of columns in the display
/// * `PLANES` - Bits stored per colour channel (1 or 2)
/// * `BYTES` - Size of the backing store
/// * `C` - Conversion from 24-bit colour
#[repr(align(4))]
pub struct PackedFrameBuffer<
    const ROWS: usize,
    const COLS: usize,
    const PLANES: u8,
    const BYTES: usize,
    C = Clamped,
> {
    buffer: [u8; BYTES],
    codec: PhantomData<fn() -> C>,
}

/// One bit per channel: 8 colours.
pub type CompactFrameBuffer<const ROWS: usize, const COLS: usize, const BYTES: usize, C = Clamped> =
    PackedFrameBuffer<ROWS, COLS, 1, BYTES, C>;

/// Two bits per channel: 64 colours.
pub type ExtendedFrameBuffer<const ROWS: usize, const COLS: usize, const BYTES: usize, C = Clamped> =
    PackedFrameBuffer<ROWS, COLS, 2, BYTES, C>;

impl<const ROWS: usize, const COLS: usize, const PLANES: u8, const BYTES: usize, C>
    PackedFrameBuffer<ROWS, COLS, PLANES, BYTES, C>
{
    /// Create a new, all black frame buffer.
    ///
    /// Unsupported geometries and a `BYTES` that does not match the geometry
    /// fail the build.
    ///
    /// # Example
    /// ```rust
    /// use hub75_bcm::{compute_packed_bytes, packed::CompactFrameBuffer};
    ///
    /// const ROWS: usize = 32;
    /// const COLS: usize = 64;
    /// const BYTES: usize = compute_packed_bytes(ROWS, COLS, 1);
    ///
    /// static mut FRAME: CompactFrameBuffer<ROWS, COLS, BYTES> = CompactFrameBuffer::new();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        const {
            crate::assert_geometry(ROWS, COLS);
            assert!(PLANES >= 1 && PLANES <= 2, "packed buffers store 1 or 2 planes");
            assert!(
                BYTES == crate::compute_packed_bytes(ROWS, COLS, PLANES),
                "BYTES must equal compute_packed_bytes(ROWS, COLS, PLANES)"
            );
        }
        Self {
            buffer: [0; BYTES],
            codec: PhantomData,
        }
    }

    /// Replace the whole frame with a prepared one, for example a frame saved
    /// earlier with [`Self::as_bytes`].
    pub fn swap_buffer(&mut self, source: &[u8; BYTES]) {
        self.buffer.copy_from_slice(source);
    }

    /// The raw backing store.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BYTES] {
        &self.buffer
    }

    #[inline]
    fn layout() -> &'static GroupLayout {
        GroupLayout::for_planes(PLANES)
    }

    /// Byte offset of the group holding storage column `x` of row pair `row`.
    #[inline]
    fn group_offset(row: usize, x: usize) -> usize {
        (row * COLS + x) / GROUP_PIXELS * Self::layout().group_bytes()
    }

    /// Pack one pixel given in storage coordinates.
    #[inline]
    fn pack_pixel(&mut self, x: usize, y: usize, color: Color) {
        let layout = Self::layout();
        let (half, row) = crate::split_row(y, ROWS);
        let offset = Self::group_offset(row, x);
        let group = &mut self.buffer[offset..offset + layout.group_bytes()];
        layout.pack(group, x % GROUP_PIXELS, half, color);
    }

    /// Write `len` pixels of logical row `y` starting at column `x`.
    fn set_run(&mut self, x: usize, y: usize, len: usize, color: Color) {
        if color.is_none() {
            return;
        }
        let Some((start, y, len)) = crate::panel_span(x, y, len, ROWS, COLS) else {
            return;
        };
        let end = start + len;
        let aligned_start = start.next_multiple_of(GROUP_PIXELS).min(end);
        let aligned_end = (end / GROUP_PIXELS * GROUP_PIXELS).max(aligned_start);

        for x in start..aligned_start {
            self.pack_pixel(x, y, color);
        }

        if aligned_end > aligned_start {
            let layout = Self::layout();
            let group_bytes = layout.group_bytes();
            let (half, row) = crate::split_row(y, ROWS);
            let first = Self::group_offset(row, aligned_start);
            let last = Self::group_offset(row, aligned_end);

            let first_group = &mut self.buffer[first..first + group_bytes];
            for pixel in 0..GROUP_PIXELS {
                layout.pack(first_group, pixel, half, color);
            }

            let mask = layout.half_mask(half);
            let mut cached = [0u8; MAX_GROUP_BYTES];
            for ((cached, byte), mask) in cached.iter_mut().zip(first_group.iter()).zip(mask) {
                *cached = byte & mask;
            }

            for group in self.buffer[first + group_bytes..last].chunks_exact_mut(group_bytes) {
                for ((byte, mask), cached) in group.iter_mut().zip(mask).zip(&cached) {
                    *byte = (*byte & !mask) | cached;
                }
            }
        }

        for x in aligned_end..end {
            self.pack_pixel(x, y, color);
        }
    }
}

impl<const ROWS: usize, const COLS: usize, const PLANES: u8, const BYTES: usize, C> Default
    for PackedFrameBuffer<ROWS, COLS, PLANES, BYTES, C>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROWS: usize, const COLS: usize, const PLANES: u8, const BYTES: usize, C> FrameBuffer
    for PackedFrameBuffer<ROWS, COLS, PLANES, BYTES, C>
{
    const ROWS: usize = ROWS;
    const COLS: usize = COLS;
    const PLANES: u8 = PLANES;

    #[cfg_attr(feature = "max-speed", inline(always))]
    fn shift_row<F: FnMut(u8)>(&self, plane: u8, row: usize, mut emit: F) {
        if row >= crate::compute_rows(ROWS) || plane >= PLANES {
            return;
        }
        let layout = Self::layout();
        let start = Self::group_offset(row, 0);
        let end = Self::group_offset(row + 1, 0);
        for group in self.buffer[start..end].chunks_exact(layout.group_bytes()) {
            for sample in layout.samples(group, plane) {
                emit(sample);
            }
        }
    }

    fn pixel(&self, x: usize, y: usize) -> Color {
        let Some((x, y)) = crate::panel_position(x, y, ROWS, COLS) else {
            return Color::BLACK;
        };
        let layout = Self::layout();
        let (half, row) = crate::split_row(y, ROWS);
        let offset = Self::group_offset(row, x);
        layout.unpack(
            &self.buffer[offset..offset + layout.group_bytes()],
            x % GROUP_PIXELS,
            half,
        )
    }
}

impl<const ROWS: usize, const COLS: usize, const PLANES: u8, const BYTES: usize, C>
    FrameBufferOperations for PackedFrameBuffer<ROWS, COLS, PLANES, BYTES, C>
{
    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if color.is_none() {
            return;
        }
        if let Some((x, y)) = crate::panel_position(x, y, ROWS, COLS) {
            self.pack_pixel(x, y, color);
        }
    }

    fn fill_buffer(&mut self, color: Color) {
        if color.is_none() {
            return;
        }
        let layout = Self::layout();
        let group_bytes = layout.group_bytes();
        let mut template = [0u8; MAX_GROUP_BYTES];
        for pixel in 0..GROUP_PIXELS {
            for half in 0..2 {
                layout.pack(&mut template[..group_bytes], pixel, half, color);
            }
        }
        for group in self.buffer.chunks_exact_mut(group_bytes) {
            group.copy_from_slice(&template[..group_bytes]);
        }
    }

    fn set_block(&mut self, x: usize, y: usize, count: usize, color: Color) {
        self.set_run(x, y, count.saturating_mul(GROUP_PIXELS), color);
    }
}

impl<const ROWS: usize, const COLS: usize, const PLANES: u8, const BYTES: usize, C>
    OriginDimensions for PackedFrameBuffer<ROWS, COLS, PLANES, BYTES, C>
{
    fn size(&self) -> Size {
        Size::new(COLS as u32, ROWS as u32)
    }
}

impl<const ROWS: usize, const COLS: usize, const PLANES: u8, const BYTES: usize, C>
    embedded_graphics::draw_target::DrawTarget
    for PackedFrameBuffer<ROWS, COLS, PLANES, BYTES, C>
where
    C: ColorCodec,
{
    type Color = Rgb888;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel(point.x as usize, point.y as usize, C::encode(color, PLANES));
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.size.width == 0 || area.size.height == 0 {
            return Ok(());
        }
        let color = C::encode(color, PLANES);
        let x = area.top_left.x as usize;
        let y = area.top_left.y as usize;
        for y in y..y + area.size.height as usize {
            self.set_run(x, y, area.size.width as usize, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_buffer(C::encode(color, PLANES));
        Ok(())
    }
}

impl<const ROWS: usize, const COLS: usize, const PLANES: u8, const BYTES: usize, C>
    core::fmt::Debug for PackedFrameBuffer<ROWS, COLS, PLANES, BYTES, C>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PackedFrameBuffer")
            .field("rows", &ROWS)
            .field("cols", &COLS)
            .field("planes", &PLANES)
            .field("size", &BYTES)
            .field("group_size", &Self::layout().group_bytes())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const ROWS: usize, const COLS: usize, const PLANES: u8, const BYTES: usize, C>
    defmt::Format for PackedFrameBuffer<ROWS, COLS, PLANES, BYTES, C>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "PackedFrameBuffer<{}, {}, {}, {}>",
            ROWS,
            COLS,
            PLANES,
            BYTES
        );
        defmt::write!(f, " group_size: {}", Self::layout().group_bytes());
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;
    use std::vec;
    use std::vec::Vec;

    use embedded_graphics::draw_target::DrawTarget;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::Circle;
    use embedded_graphics::primitives::PointsIter;
    use embedded_graphics::primitives::PrimitiveStyle;

    use super::*;
    use crate::compute_packed_bytes;
    use crate::Truncating;

    const TEST_ROWS: usize = 32;
    const TEST_COLS: usize = 64;
    const COMPACT_BYTES: usize = compute_packed_bytes(TEST_ROWS, TEST_COLS, 1);
    const EXTENDED_BYTES: usize = compute_packed_bytes(TEST_ROWS, TEST_COLS, 2);

    type Compact = CompactFrameBuffer<TEST_ROWS, TEST_COLS, COMPACT_BYTES>;
    type Extended = ExtendedFrameBuffer<TEST_ROWS, TEST_COLS, EXTENDED_BYTES>;

    fn snapshot<const ROWS: usize, const COLS: usize, const P: u8, const B: usize, C>(
        fb: &PackedFrameBuffer<ROWS, COLS, P, B, C>,
    ) -> Vec<Color> {
        let mut pixels = Vec::with_capacity(ROWS * COLS);
        for y in 0..ROWS {
            for x in 0..COLS {
                pixels.push(fb.pixel(x, y));
            }
        }
        pixels
    }

    #[test]
    fn test_construction() {
        let fb = Compact::new();
        assert_eq!(fb.as_bytes().len(), 768);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));

        let fb = Extended::default();
        assert_eq!(fb.as_bytes().len(), 1536);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_static_construction() {
        static FRAME: Compact = Compact::new();
        assert_eq!(FRAME.pixel(0, 0), Color::BLACK);
    }

    #[test]
    fn test_set_pixel_readback() {
        let mut fb = Compact::new();
        fb.set_pixel(5, 2, Color::RED);
        fb.set_pixel(5, 18, Color::BLUE);
        fb.set_pixel(63, 31, Color::WHITE);

        assert_eq!(fb.pixel(5, 2), Color::new(1, 0, 0));
        assert_eq!(fb.pixel(5, 18), Color::new(0, 0, 1));
        assert_eq!(fb.pixel(63, 31), Color::new(1, 1, 1));
        assert_eq!(fb.pixel(4, 2), Color::BLACK);
        assert_eq!(fb.pixel(6, 2), Color::BLACK);
    }

    #[test]
    fn test_set_pixel_extended_readback() {
        let mut fb = Extended::new();
        let color = Color::new(2, 1, 3);
        fb.set_pixel(10, 7, color);
        assert_eq!(fb.pixel(10, 7), color);

        // Channels beyond two planes are dropped
        fb.set_pixel(11, 7, Color::new(15, 6, 5));
        assert_eq!(fb.pixel(11, 7), Color::new(3, 2, 1));
    }

    #[test]
    fn test_overwrite_clears_old_bits() {
        let mut fb = Extended::new();
        fb.set_pixel(3, 3, Color::WHITE);
        fb.set_pixel(3, 3, Color::new(1, 0, 2));
        assert_eq!(fb.pixel(3, 3), Color::new(1, 0, 2));
    }

    #[cfg(not(any(feature = "flip-horizontal", feature = "flip-vertical")))]
    #[test]
    fn test_set_pixel_byte_placement() {
        let mut fb = Compact::new();
        // Top half, column 0: red is bit 0 of the first group
        fb.set_pixel(0, 0, Color::RED);
        assert_eq!(fb.as_bytes()[0], 0b0000_0001);
        // Bottom half, same column: green is bit 4
        fb.set_pixel(0, 16, Color::GREEN);
        assert_eq!(fb.as_bytes()[0], 0b0001_0001);
        // Column 4 starts the second group
        fb.set_pixel(4, 0, Color::BLUE);
        assert_eq!(fb.as_bytes()[3], 0b0000_0100);
        // Row pair 1 starts after 16 groups
        fb.set_pixel(0, 1, Color::RED);
        assert_eq!(fb.as_bytes()[16 * 3], 0b0000_0001);
    }

    #[test]
    fn test_set_pixel_bounds() {
        let mut fb = Compact::new();
        fb.set_pixel(64, 0, Color::WHITE);
        fb.set_pixel(0, 32, Color::WHITE);
        fb.set_pixel(usize::MAX, usize::MAX, Color::WHITE);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(fb.pixel(64, 0), Color::BLACK);
    }

    #[test]
    fn test_none_is_a_no_op() {
        let mut fb = Extended::new();
        fb.fill_buffer(Color::CYAN);
        let before = *fb.as_bytes();

        fb.set_pixel(1, 1, Color::NONE);
        fb.set_block(0, 0, 4, Color::NONE);
        fb.fill_buffer(Color::NONE);
        assert_eq!(fb.as_bytes(), &before);
    }

    #[test]
    fn test_fill_buffer() {
        let mut fb = Compact::new();
        fb.fill_buffer(Color::RED);
        assert!(snapshot(&fb).iter().all(|&c| c == Color::new(1, 0, 0)));
        // Red in every pixel of both halves sets bits 0 and 3 of each sample
        assert!(fb.as_bytes().chunks_exact(3).all(|g| g == [0x49, 0x92, 0x24]));

        let mut fb = Extended::new();
        let color = Color::new(1, 2, 3);
        fb.fill_buffer(color);
        assert!(snapshot(&fb).iter().all(|&c| c == color));
    }

    #[test]
    fn test_erase() {
        let mut fb = Extended::new();
        fb.fill_buffer(Color::WHITE);
        fb.erase();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_block_touches_only_its_columns() {
        let mut fb = Compact::new();
        fb.set_block(4, 0, 3, Color::GREEN);

        for y in 0..TEST_ROWS {
            for x in 0..TEST_COLS {
                let expected = if y == 0 && (4..16).contains(&x) {
                    Color::new(0, 1, 0)
                } else {
                    Color::BLACK
                };
                assert_eq!(fb.pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_set_block_keeps_other_half() {
        let mut fb = Extended::new();
        fb.fill_buffer(Color::new(1, 2, 3));
        fb.set_block(0, 20, 16, Color::new(3, 0, 0));

        for x in 0..TEST_COLS {
            assert_eq!(fb.pixel(x, 4), Color::new(1, 2, 3));
            assert_eq!(fb.pixel(x, 20), Color::new(3, 0, 0));
        }
    }

    #[test]
    fn test_set_block_matches_set_pixel() {
        let colors = [Color::RED, Color::new(2, 3, 1), Color::BLACK, Color::WHITE];
        for x in [0, 1, 2, 3, 4, 6, 13, 48, 57, 62, 63] {
            for y in [0, 9, 16, 31] {
                for count in [1, 2, 3, 5, 16, 20] {
                    let color = colors[(x + y + count) % colors.len()];

                    let mut block = Extended::new();
                    let mut single = Extended::new();
                    block.fill_buffer(Color::new(1, 1, 2));
                    single.fill_buffer(Color::new(1, 1, 2));

                    block.set_block(x, y, count, color);
                    for column in x..x + 4 * count {
                        single.set_pixel(column, y, color);
                    }
                    assert_eq!(
                        block.as_bytes(),
                        single.as_bytes(),
                        "set_block({x}, {y}, {count})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_set_block_compact_matches_set_pixel() {
        for x in [0, 3, 5, 60] {
            let mut block = Compact::new();
            let mut single = Compact::new();
            block.set_block(x, 17, 3, Color::PURPLE);
            for column in x..x + 12 {
                single.set_pixel(column, 17, Color::PURPLE);
            }
            assert_eq!(block.as_bytes(), single.as_bytes(), "x = {x}");
        }
    }

    #[test]
    fn test_set_block_clips_at_row_end() {
        let mut fb = Compact::new();
        fb.set_block(60, 5, 8, Color::WHITE);

        for x in 60..64 {
            assert_eq!(fb.pixel(x, 5), Color::new(1, 1, 1));
        }
        // Nothing spilled into the next row
        for x in 0..TEST_COLS {
            assert_eq!(fb.pixel(x, 6), Color::BLACK);
        }
    }

    #[test]
    fn test_set_block_zero_count_and_bounds() {
        let mut fb = Compact::new();
        fb.set_block(0, 0, 0, Color::WHITE);
        fb.set_block(64, 0, 4, Color::WHITE);
        fb.set_block(0, 32, 4, Color::WHITE);
        fb.set_block(0, 0, usize::MAX, Color::NONE);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_swap_buffer() {
        let mut source = Compact::new();
        source.fill_buffer(Color::YELLOW);
        source.set_pixel(7, 7, Color::BLUE);

        let mut fb = Compact::new();
        fb.swap_buffer(source.as_bytes());
        assert_eq!(fb.as_bytes(), source.as_bytes());
        assert_eq!(fb.pixel(7, 7), Color::new(0, 0, 1));
        assert_eq!(fb.pixel(8, 7), Color::new(1, 1, 0));
    }

    #[test]
    fn test_shift_row_samples() {
        let mut fb = Compact::new();
        fb.fill_buffer(Color::RED);

        let mut samples = Vec::new();
        fb.shift_row(0, 3, |sample| samples.push(sample));
        assert_eq!(samples, vec![0b00_1001; TEST_COLS]);
    }

    #[cfg(not(feature = "flip-vertical"))]
    #[test]
    fn test_shift_row_extended_planes() {
        let mut fb = Extended::new();
        fb.set_pixel(5, 3, Color::new(2, 1, 3));
        fb.set_pixel(5, 19, Color::new(1, 3, 0));

        let mut low = Vec::new();
        let mut high = Vec::new();
        fb.shift_row(0, 3, |sample| low.push(sample));
        fb.shift_row(1, 3, |sample| high.push(sample));
        assert_eq!(low.len(), TEST_COLS);
        assert_eq!(high.len(), TEST_COLS);

        let column = if cfg!(feature = "flip-horizontal") { 58 } else { 5 };
        // top: r=0 g=1 b=1, bottom: r=1 g=1 b=0
        assert_eq!(low[column], 0b011_110);
        // top: r=1 g=0 b=1, bottom: r=0 g=1 b=0
        assert_eq!(high[column], 0b010_101);
        let lit = low.iter().filter(|&&s| s != 0).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_shift_row_out_of_range() {
        let fb = Compact::new();
        let mut count = 0;
        fb.shift_row(0, 16, |_| count += 1);
        fb.shift_row(1, 0, |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_origin_dimensions() {
        let fb = Compact::new();
        let size = fb.size();
        assert_eq!(size.width, TEST_COLS as u32);
        assert_eq!(size.height, TEST_ROWS as u32);
    }

    #[test]
    fn test_draw_iter() {
        let mut fb = Extended::new();
        let pixels = vec![
            Pixel(Point::new(0, 0), Rgb888::RED),
            Pixel(Point::new(1, 20), Rgb888::new(85, 170, 255)),
            Pixel(Point::new(-1, 0), Rgb888::WHITE),
            Pixel(Point::new(0, -1), Rgb888::WHITE),
            Pixel(Point::new(64, 0), Rgb888::WHITE),
        ];
        fb.draw_iter(pixels).unwrap();

        assert_eq!(fb.pixel(0, 0), Color::new(3, 0, 0));
        assert_eq!(fb.pixel(1, 20), Color::new(1, 2, 3));
        let lit = snapshot(&fb).iter().filter(|&&c| c != Color::BLACK).count();
        assert_eq!(lit, 2);
    }

    #[test]
    fn test_codec_parameter() {
        type Truncated = ExtendedFrameBuffer<TEST_ROWS, TEST_COLS, EXTENDED_BYTES, Truncating>;
        let mut fb = Truncated::new();
        fb.draw_iter([Pixel(Point::new(2, 2), Rgb888::new(127, 128, 191))])
            .unwrap();
        assert_eq!(fb.pixel(2, 2), Color::new(1, 2, 2));
    }

    #[test]
    fn test_fill_solid_matches_per_pixel() {
        let area = Rectangle::new(Point::new(-3, 10), Size::new(30, 12));
        let color = Rgb888::new(200, 90, 10);

        let mut fast = Extended::new();
        fast.fill_solid(&area, color).unwrap();

        let mut slow = Extended::new();
        slow.draw_iter(area.points().map(|p| Pixel(p, color))).unwrap();

        assert_eq!(fast.as_bytes(), slow.as_bytes());
    }

    #[test]
    fn test_fill_solid_outside() {
        let mut fb = Compact::new();
        fb.fill_solid(&Rectangle::new(Point::new(70, 0), Size::new(4, 4)), Rgb888::WHITE)
            .unwrap();
        fb.fill_solid(&Rectangle::new(Point::new(0, 0), Size::zero()), Rgb888::WHITE)
            .unwrap();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear() {
        let mut fb = Compact::new();
        fb.clear(Rgb888::CYAN).unwrap();
        assert!(snapshot(&fb).iter().all(|&c| c == Color::new(0, 1, 1)));
    }

    #[test]
    fn test_embedded_graphics_integration() {
        let mut fb = Extended::new();

        Rectangle::new(Point::new(5, 5), Size::new(10, 8))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.pixel(5, 5), Color::new(3, 0, 0));
        assert_eq!(fb.pixel(14, 12), Color::new(3, 0, 0));
        assert_eq!(fb.pixel(15, 12), Color::BLACK);

        Circle::new(Point::new(30, 15), 8)
            .into_styled(PrimitiveStyle::with_fill(Rgb888::BLUE))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.pixel(34, 19), Color::new(0, 0, 3));
    }

    #[test]
    fn test_debug_formatting() {
        let fb = Extended::new();
        let debug_string = format!("{:?}", fb);
        assert!(debug_string.contains("PackedFrameBuffer"));
        assert!(debug_string.contains("planes: 2"));
        assert!(debug_string.contains("group_size: 6"));
    }

    #[test]
    fn test_memory_alignment() {
        let fb = Compact::new();
        let ptr = &fb as *const _ as usize;
        assert_eq!(ptr % 4, 0);
    }

    #[test]
    fn test_small_panel() {
        const BYTES: usize = compute_packed_bytes(8, 8, 1);
        let mut fb = CompactFrameBuffer::<8, 8, BYTES>::new();
        // 4 row pairs of 2 groups, 3 bytes each
        assert_eq!(BYTES, 24);
        assert_eq!(fb.as_bytes().len(), 24);
        fb.set_block(0, 7, 2, Color::WHITE);
        for x in 0..8 {
            assert_eq!(fb.pixel(x, 7), Color::new(1, 1, 1));
            assert_eq!(fb.pixel(x, 3), Color::BLACK);
        }
    }
}
