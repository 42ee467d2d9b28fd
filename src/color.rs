//! Panel-native colours and the conversions into them.
//!
//! The panel stores at most 4 bits per channel, so a [`Color`] packs red, green
//! and blue into the low 12 bits of a `u16`. A framebuffer of depth `N` keeps the
//! low `N` bits of every channel, which is why the full-level named colours use
//! all-ones channels: they are correct at every depth.
//!
//! The top nibble is reserved. When it is all ones the value is
//! [`Color::NONE`], which every write operation treats as "leave the pixel
//! alone". Text renderers use it for a transparent background.
//!
//! Converting 8-bit-per-channel colour into the panel's `N` bits is done by a
//! [`ColorCodec`]. Four policies are provided:
//!
//! | Policy              | Channel formula                               |
//! |---------------------|-----------------------------------------------|
//! | [`Truncating`]      | `v >> (8 - N)`                                |
//! | [`FullRange`]       | `min((v * 2^N + 128) / 256, 2^N - 1)`         |
//! | [`Clamped`]         | `(v * (2^N - 1) + 127) / 255`                 |
//! | [`NormalizedFloat`] | `round(f * (2^N - 1))` for `f` in `[0, 1]`    |
//!
//! All of them map 0 to 0, full scale to `2^N - 1`, and never decrease when an
//! input channel increases.

use bitfield::bitfield;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::pixelcolor::RgbColor;

/// Deepest colour depth any encoding stores, in bits per channel.
pub const MAX_BITS: u8 = 4;

bitfield! {
    /// A panel-native colour with up to 4 bits per channel.
    ///
    /// The bit layout is as follows:
    /// - Bits 15-12: Reserved, all ones for [`Color::NONE`]
    /// - Bits 11-8: Blue
    /// - Bits 7-4: Green
    /// - Bits 3-0: Red
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Color(u16);
    impl Debug;
    /// Red channel.
    pub u8, red, set_red: 3, 0;
    /// Green channel.
    pub u8, green, set_green: 7, 4;
    /// Blue channel.
    pub u8, blue, set_blue: 11, 8;
}

impl Color {
    /// Sentinel meaning "no colour": writes with it leave the buffer untouched.
    pub const NONE: Self = Self(0xF000);
    /// All channels off.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Full red.
    pub const RED: Self = Self::new(15, 0, 0);
    /// Full green.
    pub const GREEN: Self = Self::new(0, 15, 0);
    /// Full blue.
    pub const BLUE: Self = Self::new(0, 0, 15);
    /// Full white.
    pub const WHITE: Self = Self::new(15, 15, 15);
    /// Red and green.
    pub const YELLOW: Self = Self::new(15, 15, 0);
    /// Green and blue.
    pub const CYAN: Self = Self::new(0, 15, 15);
    /// Red and blue.
    pub const PURPLE: Self = Self::new(15, 0, 15);
    /// Full red, a third of green. Reads `(3, 1, 0)` at two bits per channel.
    pub const ORANGE: Self = Self::new(15, 5, 0);

    // Dimmed shades carry raw channel values, so they only read as dimmed at
    // two or more bits per channel. At one bit `DARK*` is black and
    // `DARKER*` is full brightness.

    /// Half-level red at two bits per channel.
    pub const DARK_RED: Self = Self::new(2, 0, 0);
    /// Half-level green at two bits per channel.
    pub const DARK_GREEN: Self = Self::new(0, 2, 0);
    /// Half-level blue at two bits per channel.
    pub const DARK_BLUE: Self = Self::new(0, 0, 2);
    /// Half-level white at two bits per channel.
    pub const DARK_WHITE: Self = Self::new(2, 2, 2);
    /// Half-level purple at two bits per channel.
    pub const DARK_PURPLE: Self = Self::new(2, 0, 2);
    /// Half-level yellow at two bits per channel.
    pub const DARK_YELLOW: Self = Self::new(2, 2, 0);
    /// Half-level cyan at two bits per channel.
    pub const DARK_CYAN: Self = Self::new(0, 2, 2);
    /// Lowest non-zero red.
    pub const DARKER_RED: Self = Self::new(1, 0, 0);
    /// Lowest non-zero green.
    pub const DARKER_GREEN: Self = Self::new(0, 1, 0);
    /// Lowest non-zero blue.
    pub const DARKER_BLUE: Self = Self::new(0, 0, 1);
    /// Lowest non-zero white.
    pub const DARKER_WHITE: Self = Self::new(1, 1, 1);
    /// Lowest non-zero purple.
    pub const DARKER_PURPLE: Self = Self::new(1, 0, 1);
    /// Lowest non-zero yellow.
    pub const DARKER_YELLOW: Self = Self::new(1, 1, 0);
    /// Lowest non-zero cyan.
    pub const DARKER_CYAN: Self = Self::new(0, 1, 1);

    /// Build a colour from panel-native channel values. Only the low 4 bits of
    /// each channel are kept.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self((red as u16 & 0x0F) | ((green as u16 & 0x0F) << 4) | ((blue as u16 & 0x0F) << 8))
    }

    /// Returns `true` for the [`Color::NONE`] sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 >> 12 == 0x0F
    }

    /// The colour a buffer storing `bits` bits per channel reads back after this
    /// colour was written to it.
    #[must_use]
    pub const fn quantized(self, bits: u8) -> Self {
        if self.is_none() {
            return self;
        }
        let mask = channel_max(bits);
        Self::new(
            self.channel(0) & mask,
            self.channel(1) & mask,
            self.channel(2) & mask,
        )
    }

    /// Channel value by index: 0 red, 1 green, 2 blue.
    #[must_use]
    pub const fn channel(self, index: usize) -> u8 {
        ((self.0 >> (index * 4)) & 0x0F) as u8
    }

    /// Whether `plane` (0 = least significant) of channel `index` is set.
    #[inline]
    #[must_use]
    pub const fn plane_bit(self, index: usize, plane: u8) -> bool {
        (self.channel(index) >> plane) & 1 == 1
    }

    /// The three-bit red/green/blue pattern of `plane`, as placed in one half
    /// of a colour sample.
    #[inline]
    #[must_use]
    pub const fn plane_bits(self, plane: u8) -> u8 {
        (self.plane_bit(0, plane) as u8)
            | ((self.plane_bit(1, plane) as u8) << 1)
            | ((self.plane_bit(2, plane) as u8) << 2)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Color {
    fn format(&self, f: defmt::Formatter) {
        if self.is_none() {
            defmt::write!(f, "Color(NONE)");
        } else {
            defmt::write!(f, "Color({}, {}, {})", self.red(), self.green(), self.blue());
        }
    }
}

/// Largest channel value at `bits` bits per channel.
#[must_use]
pub const fn channel_max(bits: u8) -> u8 {
    ((1u16 << bits) - 1) as u8
}

/// Conversion policy from 8-bit channels into `bits`-bit panel channels.
///
/// `bits` must be in `1..=MAX_BITS`.
pub trait ColorCodec {
    /// Convert one 8-bit channel value.
    fn channel(value: u8, bits: u8) -> u8;

    /// Convert a 24-bit colour.
    #[must_use]
    fn encode(color: Rgb888, bits: u8) -> Color {
        debug_assert!((1..=MAX_BITS).contains(&bits));
        Color::new(
            Self::channel(color.r(), bits),
            Self::channel(color.g(), bits),
            Self::channel(color.b(), bits),
        )
    }
}

/// Keeps the most significant `bits` bits of the channel.
///
/// Cheapest policy; it always rounds down, so it is biased toward low
/// brightness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Truncating;

impl ColorCodec for Truncating {
    #[inline]
    fn channel(value: u8, bits: u8) -> u8 {
        value >> (8 - bits)
    }
}

/// Divides by `256 / 2^bits` and rounds to nearest.
///
/// The half-step centring offset spreads 0..=255 evenly over the output range;
/// the top half-step is clamped to the maximum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FullRange;

impl ColorCodec for FullRange {
    #[inline]
    fn channel(value: u8, bits: u8) -> u8 {
        let scaled = ((u16::from(value) << bits) + 128) >> 8;
        scaled.min(u16::from(channel_max(bits))) as u8
    }
}

/// Divides by `255 / (2^bits - 1)` and rounds to nearest.
///
/// Both ends of the range map exactly, which keeps dim colours linear at low
/// depths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clamped;

impl ColorCodec for Clamped {
    #[inline]
    fn channel(value: u8, bits: u8) -> u8 {
        ((u16::from(value) * u16::from(channel_max(bits)) + 127) / 255) as u8
    }
}

/// Scales channels given in `[0, 1]`.
///
/// Used through [`ColorCodec`] the 8-bit input is first normalised by 255.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizedFloat;

impl NormalizedFloat {
    /// Convert one channel in `[0, 1]`. Values outside the range are clamped
    /// and NaN maps to 0.
    #[must_use]
    pub fn channel_unit(value: f32, bits: u8) -> u8 {
        let value = if value > 0.0 { value.min(1.0) } else { 0.0 };
        (value * f32::from(channel_max(bits)) + 0.5) as u8
    }

    /// Convert a colour with channels in `[0, 1]`.
    #[must_use]
    pub fn encode_unit(red: f32, green: f32, blue: f32, bits: u8) -> Color {
        Color::new(
            Self::channel_unit(red, bits),
            Self::channel_unit(green, bits),
            Self::channel_unit(blue, bits),
        )
    }
}

impl ColorCodec for NormalizedFloat {
    #[inline]
    fn channel(value: u8, bits: u8) -> u8 {
        Self::channel_unit(f32::from(value) / 255.0, bits)
    }
}
