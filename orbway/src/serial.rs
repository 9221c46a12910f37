//! Compact text serialization.
//!
//! Every serializable type renders into a fixed number of bytes of a plain
//! ASCII string. The format is positional: a value occupies exactly
//! `DATA_SIZE` bytes, and composite types concatenate their parts. `_` is
//! used as a "zero/absent" filler and decodes as hex 0 where a hex digit is
//! expected.

use crate::error::{Error, Result};

/// Fixed-size text serialization for game entities.
pub trait Serial: Sized {
    /// The exact number of bytes this type occupies in serialized form.
    const DATA_SIZE: usize;

    /// Append the serialized form to `data`.
    fn write_data(&self, data: &mut String);

    /// Parse a value from exactly `DATA_SIZE` bytes.
    fn from_data(data: &str) -> Result<Self>;

    /// Serialize into a fresh string of length `DATA_SIZE`.
    fn to_data(&self) -> String {
        let mut data = String::with_capacity(Self::DATA_SIZE);
        self.write_data(&mut data);
        data
    }
}

/// Check the exact length of a serialized chunk for type `name`.
pub fn check_size(name: &str, data: &str, expected: usize) -> Result<()> {
    if data.len() != expected {
        return Err(Error::invariant(format!(
            "{name}: invalid data size {} (expected {expected})",
            data.len()
        )));
    }
    Ok(())
}

pub fn is_hex_digit(digit: u8) -> bool {
    digit.is_ascii_digit() || (b'a'..=b'f').contains(&digit) || (b'A'..=b'F').contains(&digit)
}

pub fn value_to_hex_digit(value: u8) -> char {
    debug_assert!(value < 16);
    char::from_digit(value as u32, 16).unwrap_or('0')
}

/// Convert a hex digit into its value.
///
/// Any non-hex byte converts to zero. This is relied upon to decode `_` as 0
/// for ko-lock fields and ignored positions.
pub fn hex_digit_to_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

pub fn write_byte_as_hex(data: &mut String, value: u8) {
    data.push(value_to_hex_digit(value >> 4));
    data.push(value_to_hex_digit(value & 0x0f));
}

pub fn hex_str_to_byte(data: &str) -> u8 {
    let bytes = data.as_bytes();
    (hex_digit_to_value(bytes[0]) << 4) | hex_digit_to_value(bytes[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_digits_round_trip() {
        for value in 0..16u8 {
            let digit = value_to_hex_digit(value);
            assert_eq!(hex_digit_to_value(digit as u8), value);
        }
    }

    #[test]
    fn underscore_decodes_to_zero() {
        assert_eq!(hex_digit_to_value(b'_'), 0);
        assert_eq!(hex_str_to_byte("__"), 0);
    }

    #[test]
    fn byte_round_trip() {
        for value in [0u8, 1, 15, 16, 0x7f, 0xfe, 0xff] {
            let mut data = String::new();
            write_byte_as_hex(&mut data, value);
            assert_eq!(data.len(), 2);
            assert_eq!(hex_str_to_byte(&data), value);
        }
    }
}
