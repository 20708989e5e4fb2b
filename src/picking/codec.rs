//! ID <-> colour codec for the offscreen picking target.
//!
//! A point id is written into the R, G and B channels of the picking target
//! as three bytes (R holds bits 16-23, G bits 8-15, B bits 0-7). Reading the
//! pixel back and decoding its RGB gives the id of whatever point covered
//! that pixel.
//!
//! Only 24 bits fit. Ids above [`MAX_PICK_ID`] are silently truncated to
//! their low 24 bits by [`encode_id_to_color`]; this is a known limitation,
//! and [`Dataset`](crate::scene::Dataset) refuses such ids up front.

/// Reserved id meaning "nothing under the cursor".
pub const NO_HIT: u32 = 0;

/// Largest id representable in a 24-bit RGB triple.
pub const MAX_PICK_ID: u32 = 0x00FF_FFFF;

/// Encode an id into an RGB triple, keeping only its low 24 bits.
#[must_use]
pub fn encode_id_to_color(id: u32) -> [u8; 3] {
    [
        ((id >> 16) & 0xFF) as u8,
        ((id >> 8) & 0xFF) as u8,
        (id & 0xFF) as u8,
    ]
}

/// Decode an RGB triple back into an id. Exact inverse of
/// [`encode_id_to_color`] for every id up to [`MAX_PICK_ID`].
#[must_use]
pub fn decode_color_to_id(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) + (u32::from(g) << 8) + u32::from(b)
}

/// Decode an RGBA pixel sample. Alpha is ignored.
#[must_use]
pub fn decode_pixel(pixel: [u8; 4]) -> u32 {
    let [r, g, b, _] = pixel;
    decode_color_to_id(r, g, b)
}

/// Scale a byte channel into a normalized float in `[0, 1]`.
#[must_use]
pub fn byte_to_unit(channel: u8) -> f32 {
    f32::from(channel) / 255.0
}

/// Quantize a normalized float back to the nearest byte, the way an
/// `Rgba8Unorm` target stores it.
#[must_use]
pub fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Scale an RGB byte triple into normalized floats.
#[must_use]
pub fn color_to_unit(color: [u8; 3]) -> [f32; 3] {
    color.map(byte_to_unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_24_bit_id() {
        for id in 0..=MAX_PICK_ID {
            let [r, g, b] = encode_id_to_color(id);
            assert_eq!(decode_color_to_id(r, g, b), id);
        }
    }

    #[test]
    fn round_trips_through_unit_floats() {
        for id in (0..=MAX_PICK_ID).step_by(4093) {
            let unit = color_to_unit(encode_id_to_color(id));
            let bytes = unit.map(unit_to_byte);
            assert_eq!(decode_color_to_id(bytes[0], bytes[1], bytes[2]), id);
        }
    }

    #[test]
    fn truncates_to_low_24_bits() {
        assert_eq!(encode_id_to_color(1 << 24), encode_id_to_color(0));
        assert_eq!(
            encode_id_to_color(0x0123_4567),
            encode_id_to_color(0x0023_4567)
        );
    }

    #[test]
    fn channel_layout() {
        assert_eq!(encode_id_to_color(5), [0, 0, 5]);
        assert_eq!(encode_id_to_color(256), [0, 1, 0]);
        assert_eq!(encode_id_to_color(0xFF_0000), [255, 0, 0]);
        assert_eq!(encode_id_to_color(MAX_PICK_ID), [255, 255, 255]);
    }

    #[test]
    fn black_is_no_hit() {
        assert_eq!(decode_color_to_id(0, 0, 0), NO_HIT);
        assert_eq!(decode_pixel([0, 0, 0, 255]), NO_HIT);
    }

    #[test]
    fn alpha_is_ignored() {
        assert_eq!(decode_pixel([0, 0, 5, 0]), 5);
        assert_eq!(decode_pixel([0, 0, 5, 255]), 5);
    }
}
