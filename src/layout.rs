//! Bit placement inside a packed pixel group.
//!
//! A group covers 4 adjacent columns of one row pair, top and bottom half, for
//! every stored plane. Reading the group's bytes as a little-endian word, the
//! bit for pixel `k`, plane `q`, half `h` and channel `c` sits at
//!
//! ```text
//! k * 6 * PLANES + q * 6 + h * 3 + c
//! ```
//!
//! so the six bits starting at `k * 6 * PLANES + q * 6` are exactly the colour
//! sample the panel wants for that pixel and plane:
//!
//! ```text
//! bit:   5    4    3    2    1    0
//!       B2   G2   R2   B1   G1   R1
//! ```
//!
//! The tables here spell every slot out once at compile time so the frame
//! buffers never recompute the arithmetic on the hot path.

use crate::Color;

/// Largest plane count a packed group stores.
pub const MAX_PLANES: usize = 2;
/// Pixels per group.
pub const GROUP_PIXELS: usize = 4;
/// Group size for one stored plane.
pub const BYTES_PER_PLANE: usize = 3;

/// Largest group size.
pub const MAX_GROUP_BYTES: usize = BYTES_PER_PLANE * MAX_PLANES;

const HALVES: usize = 2;
const CHANNELS: usize = 3;

/// Location of one bit in a group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    /// Byte offset in the group.
    pub byte: u8,
    /// Bit within that byte, 0 = least significant.
    pub bit: u8,
}

impl Slot {
    const fn from_index(index: usize) -> Self {
        Self {
            byte: (index / 8) as u8,
            bit: (index % 8) as u8,
        }
    }

    #[inline]
    const fn mask(self) -> u8 {
        1 << self.bit
    }
}

/// Slot table and half masks for a group of a given plane count.
#[derive(Debug)]
pub struct GroupLayout {
    planes: u8,
    slots: [[[[Slot; CHANNELS]; HALVES]; MAX_PLANES]; GROUP_PIXELS],
    half_mask: [[u8; MAX_GROUP_BYTES]; HALVES],
}

/// Layout of a Compact group: 1 plane in 3 bytes.
pub static COMPACT_LAYOUT: GroupLayout = GroupLayout::new(1);
/// Layout of an Extended group: 2 planes in 6 bytes.
pub static EXTENDED_LAYOUT: GroupLayout = GroupLayout::new(2);

impl GroupLayout {
    /// Build the table for `planes` planes (1 or 2).
    ///
    /// # Panics
    ///
    /// Panics if `planes` is 0 or more than [`MAX_PLANES`]. The provided
    /// tables are statics, so this fails the build instead.
    #[must_use]
    pub const fn new(planes: u8) -> Self {
        assert!(planes >= 1 && planes as usize <= MAX_PLANES);

        let mut slots = [[[[Slot { byte: 0, bit: 0 }; CHANNELS]; HALVES]; MAX_PLANES]; GROUP_PIXELS];
        let mut half_mask = [[0u8; MAX_GROUP_BYTES]; HALVES];

        let mut pixel = 0;
        while pixel < GROUP_PIXELS {
            let mut plane = 0;
            while plane < planes as usize {
                let mut half = 0;
                while half < HALVES {
                    let mut channel = 0;
                    while channel < CHANNELS {
                        let index =
                            pixel * 6 * planes as usize + plane * 6 + half * CHANNELS + channel;
                        let slot = Slot::from_index(index);
                        slots[pixel][plane][half][channel] = slot;
                        half_mask[half][slot.byte as usize] |= slot.mask();
                        channel += 1;
                    }
                    half += 1;
                }
                plane += 1;
            }
            pixel += 1;
        }

        Self {
            planes,
            slots,
            half_mask,
        }
    }

    /// Table for the given plane count.
    #[must_use]
    pub fn for_planes(planes: u8) -> &'static Self {
        if planes == 1 {
            &COMPACT_LAYOUT
        } else {
            &EXTENDED_LAYOUT
        }
    }

    /// Number of planes stored.
    #[must_use]
    pub const fn planes(&self) -> u8 {
        self.planes
    }

    /// Bytes per group.
    #[must_use]
    pub const fn group_bytes(&self) -> usize {
        BYTES_PER_PLANE * self.planes as usize
    }

    /// Where the bit for (pixel, plane, half, channel) lives.
    #[must_use]
    pub const fn slot(&self, pixel: usize, plane: usize, half: usize, channel: usize) -> Slot {
        self.slots[pixel][plane][half][channel]
    }

    /// Per-byte mask of every bit that belongs to `half` (0 top, 1 bottom).
    #[must_use]
    pub fn half_mask(&self, half: usize) -> &[u8] {
        &self.half_mask[half][..self.group_bytes()]
    }

    /// Store `color` for pixel `pixel` of `half` into `group`. Bits of other
    /// pixels and of the other half are left alone.
    #[inline]
    pub fn pack(&self, group: &mut [u8], pixel: usize, half: usize, color: Color) {
        for plane in 0..self.planes as usize {
            for channel in 0..CHANNELS {
                let slot = self.slots[pixel][plane][half][channel];
                let byte = &mut group[slot.byte as usize];
                if color.plane_bit(channel, plane as u8) {
                    *byte |= slot.mask();
                } else {
                    *byte &= !slot.mask();
                }
            }
        }
    }

    /// Read back the colour of pixel `pixel` of `half`.
    #[must_use]
    pub fn unpack(&self, group: &[u8], pixel: usize, half: usize) -> Color {
        let mut channels = [0u8; CHANNELS];
        for plane in 0..self.planes as usize {
            for (channel, value) in channels.iter_mut().enumerate() {
                let slot = self.slots[pixel][plane][half][channel];
                if group[slot.byte as usize] & slot.mask() != 0 {
                    *value |= 1 << plane;
                }
            }
        }
        Color::new(channels[0], channels[1], channels[2])
    }

    /// The 6-bit colour sample of `pixel` for `plane`.
    #[inline]
    #[must_use]
    pub fn sample(&self, group: &[u8], pixel: usize, plane: u8) -> u8 {
        let shift = pixel * 6 * self.planes as usize + plane as usize * 6;
        ((word(group) >> shift) & 0x3F) as u8
    }

    /// The colour samples of all four pixels for `plane`, in clocking order.
    #[cfg_attr(feature = "max-speed", inline(always))]
    #[must_use]
    pub fn samples(&self, group: &[u8], plane: u8) -> [u8; GROUP_PIXELS] {
        let word = word(group) >> (plane as usize * 6);
        let stride = 6 * self.planes as usize;
        core::array::from_fn(|pixel| ((word >> (pixel * stride)) & 0x3F) as u8)
    }
}

/// The group's bytes as a little-endian word.
#[inline]
#[must_use]
pub fn word(group: &[u8]) -> u64 {
    group
        .iter()
        .rev()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}
