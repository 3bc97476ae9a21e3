//! AMF3 U29 variable-length integers
//!
//! ```text
//! 0x00000000 - 0x0000007F : 0xxxxxxx
//! 0x00000080 - 0x00003FFF : 1xxxxxxx 0xxxxxxx
//! 0x00004000 - 0x001FFFFF : 1xxxxxxx 1xxxxxxx 0xxxxxxx
//! 0x00200000 - 0x1FFFFFFF : 1xxxxxxx 1xxxxxxx 1xxxxxxx xxxxxxxx
//! ```
//!
//! The first three bytes carry 7 bits each behind a continuation flag; a
//! fourth byte carries a full 8 bits. Signed integers (the AMF3 integer type)
//! use the same 29 bits in two's complement.

use crate::byte_array::ByteArray;
use crate::error::{AmfError, Result};

/// Largest unsigned value a U29 can carry
pub const U29_MAX: u32 = 0x1FFF_FFFF;

/// Smallest AMF3 integer
pub const INT29_MIN: i32 = -0x1000_0000;

/// Largest AMF3 integer
pub const INT29_MAX: i32 = 0x0FFF_FFFF;

/// Write an unsigned U29
pub fn write_u29(out: &mut ByteArray, value: u32) -> Result<()> {
    if value > U29_MAX {
        return Err(AmfError::UnrepresentableValue("value exceeds U29 range"));
    }

    if value < 0x80 {
        out.write_u8(value as u8);
    } else if value < 0x4000 {
        out.write_bytes(&[((value >> 7) | 0x80) as u8, (value & 0x7F) as u8]);
    } else if value < 0x20_0000 {
        out.write_bytes(&[
            ((value >> 14) | 0x80) as u8,
            ((value >> 7) | 0x80) as u8,
            (value & 0x7F) as u8,
        ]);
    } else {
        out.write_bytes(&[
            ((value >> 22) | 0x80) as u8,
            ((value >> 15) | 0x80) as u8,
            ((value >> 8) | 0x80) as u8,
            (value & 0xFF) as u8,
        ]);
    }
    Ok(())
}

/// Read an unsigned U29
pub fn read_u29(input: &mut ByteArray) -> Result<u32> {
    let mut value: u32 = 0;
    for _ in 0..3 {
        let byte = input.read_u8()?;
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    let byte = input.read_u8()?;
    Ok((value << 8) | u32::from(byte))
}

/// Write a signed 29-bit integer
pub fn write_i29(out: &mut ByteArray, value: i32) -> Result<()> {
    if !(INT29_MIN..=INT29_MAX).contains(&value) {
        return Err(AmfError::UnrepresentableValue("integer outside 29-bit range"));
    }
    write_u29(out, (value as u32) & U29_MAX)
}

/// Read a signed 29-bit integer
pub fn read_i29(input: &mut ByteArray) -> Result<i32> {
    let raw = read_u29(input)?;
    // Sign-extend from bit 28
    Ok(((raw << 3) as i32) >> 3)
}

/// The 29-bit integer equal to `n`, if there is one
///
/// Fractions, NaN, infinities, negative zero and out-of-range values have no
/// integer form and must be written as doubles.
pub fn int29_from_f64(n: f64) -> Option<i32> {
    if n.fract() != 0.0 || n < f64::from(INT29_MIN) || n > f64::from(INT29_MAX) {
        return None;
    }
    if n == 0.0 && n.is_sign_negative() {
        return None;
    }
    Some(n as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u32) -> Vec<u8> {
        let mut ba = ByteArray::new();
        write_u29(&mut ba, value).unwrap();
        ba.as_slice().to_vec()
    }

    #[test]
    fn test_byte_lengths() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(0x7F), vec![0x7F]);
        assert_eq!(encoded(0x80), vec![0x81, 0x00]);
        assert_eq!(encoded(0x3FFF), vec![0xFF, 0x7F]);
        assert_eq!(encoded(0x4000), vec![0x81, 0x80, 0x00]);
        assert_eq!(encoded(0x1F_FFFF), vec![0xFF, 0xFF, 0x7F]);
        assert_eq!(encoded(0x20_0000), vec![0x80, 0xC0, 0x80, 0x00]);
        assert_eq!(encoded(U29_MAX), vec![0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut ba = ByteArray::new();
        assert!(write_u29(&mut ba, U29_MAX + 1).is_err());
        assert!(write_i29(&mut ba, INT29_MAX + 1).is_err());
        assert!(write_i29(&mut ba, INT29_MIN - 1).is_err());
        assert!(ba.is_empty());
    }

    #[test]
    fn test_signed_bounds() {
        for value in [0, -1, 1, INT29_MIN, INT29_MAX] {
            let mut ba = ByteArray::new();
            write_i29(&mut ba, value).unwrap();
            ba.set_position(0);
            assert_eq!(read_i29(&mut ba).unwrap(), value);
        }
    }

    #[test]
    fn test_minus_one_is_all_ones() {
        let mut ba = ByteArray::new();
        write_i29(&mut ba, -1).unwrap();
        assert_eq!(ba.as_slice(), &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_truncated() {
        let mut ba = ByteArray::from(vec![0x81, 0x80]);
        assert!(matches!(
            read_u29(&mut ba),
            Err(AmfError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_int29_from_f64() {
        assert_eq!(int29_from_f64(100.0), Some(100));
        assert_eq!(int29_from_f64(-268_435_456.0), Some(INT29_MIN));
        assert_eq!(int29_from_f64(268_435_455.0), Some(INT29_MAX));
        assert_eq!(int29_from_f64(268_435_456.0), None);
        assert_eq!(int29_from_f64(-268_435_457.0), None);
        assert_eq!(int29_from_f64(1.23), None);
        assert_eq!(int29_from_f64(-0.0), None);
        assert_eq!(int29_from_f64(f64::NAN), None);
        assert_eq!(int29_from_f64(f64::INFINITY), None);
    }
}
