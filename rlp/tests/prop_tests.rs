use proptest::prelude::*;

use ewm_rlp::{decode, encode, RlpError, RlpItem};
use ewm_types::U256;

fn arb_item() -> impl Strategy<Value = RlpItem> {
    let leaf = prop::collection::vec(any::<u8>(), 0..80).prop_map(RlpItem::Bytes);
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop::collection::vec(inner, 0..8).prop_map(RlpItem::List)
    })
}

proptest! {
    /// decode(encode(x)) == x for arbitrary nested items.
    #[test]
    fn item_roundtrip(item in arb_item()) {
        let encoded = encode(&item);
        prop_assert_eq!(decode(&encoded), Ok(item));
    }

    /// Byte strings use the short form below 56 bytes and the minimal long form above.
    #[test]
    fn string_prefix_is_minimal(bytes in prop::collection::vec(any::<u8>(), 0..300)) {
        let encoded = encode(&RlpItem::Bytes(bytes.clone()));
        match bytes.len() {
            1 if bytes[0] < 0x80 => prop_assert_eq!(encoded.len(), 1),
            0..=55 => prop_assert_eq!(encoded.len(), 1 + bytes.len()),
            56..=255 => prop_assert_eq!(&encoded[..2], &[0xb8, bytes.len() as u8][..]),
            _ => prop_assert_eq!(encoded[0], 0xb9),
        }
    }

    /// Integers round trip and never carry leading zero bytes.
    #[test]
    fn u64_roundtrip(value: u64) {
        let item = RlpItem::from_u64(value);
        let bytes = item.as_bytes().unwrap();
        prop_assert!(bytes.first() != Some(&0));
        prop_assert_eq!(decode(&encode(&item)).unwrap().as_u64(), Ok(value));
    }

    /// 256-bit integers round trip.
    #[test]
    fn u256_roundtrip(words in prop::array::uniform4(0u64..)) {
        let value = U256::from_words(words);
        let decoded = decode(&encode(&RlpItem::from_u256(&value))).unwrap();
        prop_assert_eq!(decoded.as_u256(), Ok(value));
    }

    /// Chopping bytes off a valid encoding always fails cleanly.
    #[test]
    fn truncation_never_panics(item in arb_item(), cut in 1usize..16) {
        let encoded = encode(&item);
        if cut <= encoded.len() {
            let truncated = &encoded[..encoded.len() - cut];
            prop_assert!(decode(truncated).is_err());
        }
    }

    /// Arbitrary bytes decode or fail without panicking.
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
        match decode(&bytes) {
            Ok(item) => prop_assert_eq!(encode(&item), bytes),
            Err(RlpError::Truncated { .. })
            | Err(RlpError::NonCanonicalLength)
            | Err(RlpError::NonCanonicalSingleByte)
            | Err(RlpError::TrailingBytes(_))
            | Err(RlpError::TooDeep(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }
}
