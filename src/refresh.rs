//! The Binary Code Modulation refresh engine.
//!
//! [`Hub75::display_frame`] shows a frame buffer once: every bit plane, most
//! significant first, and for each plane every row pair. A row pass is
//!
//! 1. shift: one colour sample and one clock pulse per column,
//! 2. latch: select the row pair, pulse LAT,
//! 3. illuminate: output enable for `BASE_US << plane` µs, then blank. When
//!    `MAX_US > BASE_US` the panel stays blank for another
//!    `(MAX_US - BASE_US) << plane` µs, which dims the panel without changing
//!    the relative plane weights.
//!
//! The on-time of a row adds up to `BASE_US * (2^PLANES - 1)` per frame, so a
//! channel value `v` is visible for `BASE_US * v` µs. Call `display_frame` in a
//! loop (or from a timer) fast enough to avoid flicker:
//!
//! ```rust,ignore
//! let mut hub75: Hub75<_, _> = Hub75::new(pins, delay);
//! loop {
//!     hub75.display_frame(&frame);
//! }
//! ```

use embedded_hal::delay::DelayNs;

use crate::compute_rows;
use crate::pins::Hub75Pins;
use crate::FrameBuffer;

/// Row addresses the 4-bit address lines can select.
const ADDRESS_MASK: u8 = 0x0F;

/// BCM scan-out state machine.
///
/// # Type Parameters
///
/// * `P` - Panel control lines
/// * `D` - Delay source for the on and blank times
/// * `BASE_US` - On-time of the least significant plane, in microseconds
/// * `MAX_US` - Period of the least significant plane, in microseconds;
///   the difference to `BASE_US` is spent blanked
pub struct Hub75<P, D, const BASE_US: u32 = 4, const MAX_US: u32 = 10> {
    pins: P,
    delay: D,
    row: u8,
}

impl<P, D, const BASE_US: u32, const MAX_US: u32> Hub75<P, D, BASE_US, MAX_US>
where
    P: Hub75Pins,
    D: DelayNs,
{
    /// Take the panel lines and a delay source. The panel is blanked.
    pub fn new(mut pins: P, delay: D) -> Self {
        const {
            assert!(BASE_US > 0, "BASE_US must be at least 1");
            assert!(BASE_US <= MAX_US, "BASE_US must not exceed MAX_US");
        }
        pins.set_output_enable(false);
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "hub75: refresh engine ready, base {=u32} us, period {=u32} us",
            BASE_US,
            MAX_US
        );
        Self {
            pins,
            delay,
            row: 0,
        }
    }

    /// Show `buffer` once, all planes and all row pairs.
    ///
    /// The panel is blank when this returns.
    pub fn display_frame<B: FrameBuffer>(&mut self, buffer: &B) {
        const {
            assert!(
                B::ROWS >= 2 && compute_rows(B::ROWS).is_power_of_two(),
                "ROWS / 2 must be a power of two"
            );
            assert!(
                compute_rows(B::ROWS) <= ADDRESS_MASK as usize + 1,
                "the row address selects at most 16 row pairs"
            );
            assert!(B::PLANES >= 1, "a frame needs at least one plane");
            assert!(
                (MAX_US as u64) << (B::PLANES - 1) <= u32::MAX as u64,
                "plane period overflows u32"
            );
        }
        for plane in (0..B::PLANES).rev() {
            let on = BASE_US << plane;
            let blank = (MAX_US - BASE_US) << plane;
            for _ in 0..compute_rows(B::ROWS) {
                self.row_pass(buffer, plane, on, blank);
            }
        }
    }

    #[cfg_attr(feature = "max-speed", inline(always))]
    fn row_pass<B: FrameBuffer>(&mut self, buffer: &B, plane: u8, on: u32, blank: u32) {
        let data_row = usize::from(self.row) & (compute_rows(B::ROWS) - 1);

        let pins = &mut self.pins;
        buffer.shift_row(plane, data_row, |sample| {
            pins.write_color_sample(sample);
            pins.pulse_clock();
        });

        self.pins.set_row_address(self.row);
        self.pins.pulse_latch();

        self.pins.set_output_enable(true);
        self.delay.delay_us(on);
        self.pins.set_output_enable(false);
        if blank > 0 {
            self.delay.delay_us(blank);
        }

        self.row = (self.row + 1) & ADDRESS_MASK;
    }

    /// The row counter: the address used by the next row pass.
    #[must_use]
    pub fn row(&self) -> u8 {
        self.row
    }

    /// Give back the panel lines and the delay source.
    pub fn release(self) -> (P, D) {
        (self.pins, self.delay)
    }
}

impl<P, D, const BASE_US: u32, const MAX_US: u32> core::fmt::Debug
    for Hub75<P, D, BASE_US, MAX_US>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hub75")
            .field("base_us", &BASE_US)
            .field("max_us", &MAX_US)
            .field("row", &self.row)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<P, D, const BASE_US: u32, const MAX_US: u32> defmt::Format
    for Hub75<P, D, BASE_US, MAX_US>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Hub75<{}, {}> row: {}", BASE_US, MAX_US, self.row);
    }
}
