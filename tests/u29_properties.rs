use amf_rs::amf::u29::{self, INT29_MAX, INT29_MIN, U29_MAX};
use amf_rs::{AmfValue, ByteArray};
use proptest::prelude::*;

proptest! {
    #[test]
    fn unsigned_values_use_one_to_four_bytes(value in 0u32..=U29_MAX) {
        let mut ba = ByteArray::new();
        u29::write_u29(&mut ba, value).unwrap();

        let expected_len = match value {
            0..=0x7F => 1,
            0x80..=0x3FFF => 2,
            0x4000..=0x1F_FFFF => 3,
            _ => 4,
        };
        prop_assert_eq!(ba.len(), expected_len);

        ba.set_position(0);
        prop_assert_eq!(u29::read_u29(&mut ba).unwrap(), value);
    }

    #[test]
    fn signed_values_keep_their_sign(value in INT29_MIN..=INT29_MAX) {
        let mut ba = ByteArray::new();
        u29::write_i29(&mut ba, value).unwrap();
        ba.set_position(0);
        prop_assert_eq!(u29::read_i29(&mut ba).unwrap(), value);
    }

    #[test]
    fn integers_outside_the_range_are_written_as_doubles(
        value in prop_oneof![i32::MIN..INT29_MIN, (INT29_MAX + 1)..=i32::MAX]
    ) {
        let mut ba = ByteArray::new();
        ba.write_object(&AmfValue::Integer(value)).unwrap();
        // double marker plus eight bytes
        prop_assert_eq!(ba.as_slice()[0], 0x05);
        prop_assert_eq!(ba.len(), 9);

        ba.set_position(0);
        prop_assert_eq!(ba.read_object().unwrap(), AmfValue::Number(f64::from(value)));
    }
}

#[test]
fn values_above_u29_are_rejected() {
    let mut ba = ByteArray::new();
    assert!(u29::write_u29(&mut ba, U29_MAX + 1).is_err());
    assert!(ba.is_empty());
}
