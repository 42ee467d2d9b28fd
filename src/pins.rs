//! Signal primitives the refresh engine drives.
//!
//! The engine only ever needs five operations on the panel's control lines,
//! collected in [`Hub75Pins`]. Boards with a fast port write (all six colour
//! lines in one register store) should implement the trait directly;
//! [`GpioPins`] is a portable implementation over individual
//! `embedded-hal` output pins.
//!
//! # Example
//! ```rust,ignore
//! use hub75_bcm::pins::GpioPins;
//!
//! let pins = GpioPins::new(
//!     [r1, g1, b1, r2, g2, b2],
//!     [a, b, c, d],
//!     clk,
//!     lat,
//!     oe,
//! );
//! ```

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use embedded_hal::digital::PinState;

/// Control lines of a HUB75 panel.
pub trait Hub75Pins {
    /// Put a colour sample on the six data lines: bit 0 R1, bit 1 G1, bit 2
    /// B1, bit 3 R2, bit 4 G2, bit 5 B2.
    fn write_color_sample(&mut self, sample: u8);

    /// One clock pulse, shifting the current sample into the panel.
    fn pulse_clock(&mut self);

    /// One latch pulse, moving the shifted row to the LED drivers.
    fn pulse_latch(&mut self);

    /// Light (`true`) or blank (`false`) the selected row pair.
    fn set_output_enable(&mut self, visible: bool);

    /// Select the row pair on the four address lines.
    fn set_row_address(&mut self, row: u8);
}

/// [`Hub75Pins`] over individual GPIO pins.
///
/// Colour and address lines keep their last level, so only the lines that
/// change between two samples are written. Output enable is active low.
pub struct GpioPins<P> {
    data: [P; 6],
    address: [P; 4],
    clock: P,
    latch: P,
    output_enable: P,
    sample: u8,
    row: u8,
}

impl<P> GpioPins<P>
where
    P: OutputPin<Error = Infallible>,
{
    /// Take the pins and drive them to a known state: data, address, clock
    /// and latch low, panel blanked.
    ///
    /// # Arguments
    ///
    /// * `data` - R1, G1, B1, R2, G2, B2
    /// * `address` - A, B, C, D
    /// * `clock` - CLK
    /// * `latch` - LAT
    /// * `output_enable` - OE
    pub fn new(data: [P; 6], address: [P; 4], clock: P, latch: P, output_enable: P) -> Self {
        let mut pins = Self {
            data,
            address,
            clock,
            latch,
            output_enable,
            sample: 0,
            row: 0,
        };
        for pin in pins.data.iter_mut().chain(pins.address.iter_mut()) {
            let Ok(()) = pin.set_low();
        }
        let Ok(()) = pins.clock.set_low();
        let Ok(()) = pins.latch.set_low();
        let Ok(()) = pins.output_enable.set_high();
        pins
    }

    /// Give the pins back: data, address, clock, latch, output enable.
    #[allow(clippy::type_complexity)]
    pub fn release(self) -> ([P; 6], [P; 4], P, P, P) {
        (
            self.data,
            self.address,
            self.clock,
            self.latch,
            self.output_enable,
        )
    }
}

/// Drive the pins whose bit differs between `old` and `new`.
#[cfg_attr(feature = "max-speed", inline(always))]
fn write_changed<P>(pins: &mut [P], old: u8, new: u8)
where
    P: OutputPin<Error = Infallible>,
{
    let changed = old ^ new;
    for (bit, pin) in pins.iter_mut().enumerate() {
        if changed & (1 << bit) != 0 {
            let Ok(()) = pin.set_state(PinState::from(new & (1 << bit) != 0));
        }
    }
}

impl<P> Hub75Pins for GpioPins<P>
where
    P: OutputPin<Error = Infallible>,
{
    #[cfg_attr(feature = "max-speed", inline(always))]
    fn write_color_sample(&mut self, sample: u8) {
        let sample = sample & 0x3F;
        write_changed(&mut self.data, self.sample, sample);
        self.sample = sample;
    }

    #[cfg_attr(feature = "max-speed", inline(always))]
    fn pulse_clock(&mut self) {
        let Ok(()) = self.clock.set_high();
        let Ok(()) = self.clock.set_low();
    }

    #[cfg_attr(feature = "max-speed", inline(always))]
    fn pulse_latch(&mut self) {
        let Ok(()) = self.latch.set_high();
        let Ok(()) = self.latch.set_low();
    }

    #[cfg_attr(feature = "max-speed", inline(always))]
    fn set_output_enable(&mut self, visible: bool) {
        let Ok(()) = self.output_enable.set_state(PinState::from(!visible));
    }

    #[cfg_attr(feature = "max-speed", inline(always))]
    fn set_row_address(&mut self, row: u8) {
        let row = row & 0x0F;
        write_changed(&mut self.address, self.row, row);
        self.row = row;
    }
}

impl<P> core::fmt::Debug for GpioPins<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GpioPins")
            .field("sample", &self.sample)
            .field("row", &self.row)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<P> defmt::Format for GpioPins<P> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "GpioPins sample: {=u8:#x} row: {=u8}", self.sample, self.row);
    }
}
