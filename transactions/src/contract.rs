//! ERC20 `transfer` call data and the `Transfer` event.
//!
//! Only the token-transfer shape is supported: a 4-byte selector followed by
//! 32-byte big-endian argument words.

use ewm_types::{Address, Hash, U256};

/// `keccak("transfer(address,uint256)")[..4]`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// `keccak("Transfer(address,address,uint256)")`, topic 0 of every ERC20 transfer log.
pub const TRANSFER_EVENT_TOPIC: Hash = Hash::new([
    0xdd, 0xf2, 0x52, 0xad, 0x1b, 0xe2, 0xc8, 0x9b,
    0x69, 0xc2, 0xb0, 0x68, 0xfc, 0x37, 0x8d, 0xaa,
    0x95, 0x2b, 0xa7, 0xf1, 0x63, 0xc4, 0xa1, 0x16,
    0x28, 0xf5, 0x5a, 0x4d, 0xf5, 0x23, 0xb3, 0xef,
]);

const WORD: usize = 32;

/// A single ABI argument word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbiArgument {
    Address(Address),
    UInt256(U256),
}

impl AbiArgument {
    pub fn encode(&self) -> [u8; WORD] {
        match self {
            Self::Address(address) => *address.to_topic().as_bytes(),
            Self::UInt256(value) => value.to_be_bytes(),
        }
    }
}

/// Selector followed by each argument word.
pub fn encode_call(selector: [u8; 4], arguments: &[AbiArgument]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD * arguments.len());
    data.extend_from_slice(&selector);
    for argument in arguments {
        data.extend_from_slice(&argument.encode());
    }
    data
}

/// Call data for `transfer(target, value)`.
pub fn erc20_transfer_data(target: &Address, value: &U256) -> Vec<u8> {
    encode_call(
        TRANSFER_SELECTOR,
        &[AbiArgument::Address(*target), AbiArgument::UInt256(*value)],
    )
}

/// Parse `transfer(target, value)` call data back into its arguments.
pub fn decode_erc20_transfer_data(data: &[u8]) -> Option<(Address, U256)> {
    if data.len() != 4 + 2 * WORD || data[..4] != TRANSFER_SELECTOR {
        return None;
    }
    let target = decode_address_word(&data[4..4 + WORD])?;
    let value = decode_uint256_word(&data[4 + WORD..])?;
    Some((target, value))
}

/// An address word must have its top 12 bytes clear.
pub fn decode_address_word(word: &[u8]) -> Option<Address> {
    if word.len() != WORD || word[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Address::from_slice(&word[12..]).ok()
}

pub fn decode_uint256_word(word: &[u8]) -> Option<U256> {
    let bytes: [u8; WORD] = word.try_into().ok()?;
    Some(U256::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_their_signatures() {
        assert_eq!(&Hash::keccak(b"transfer(address,uint256)").as_bytes()[..4], &TRANSFER_SELECTOR);
        assert_eq!(Hash::keccak(b"Transfer(address,address,uint256)"), TRANSFER_EVENT_TOPIC);
    }

    #[test]
    fn transfer_call_data() {
        let target: Address = "0x932a27e1bc84f5b74c29af3d888926b1307f4a5c".parse().unwrap();
        let value = U256::parse_decimal("5968.77", 18).unwrap();
        let data = erc20_transfer_data(&target, &value);
        assert_eq!(
            hex::encode(&data),
            "a9059cbb000000000000000000000000932a27e1bc84f5b74c29af3d888926b1307f4a5c\
             0000000000000000000000000000000000000000000001439152d319e84d0000"
        );
        assert_eq!(decode_erc20_transfer_data(&data), Some((target, value)));
    }

    #[test]
    fn rejects_other_call_data() {
        let target = Address::new([0x11; 20]);
        let mut data = erc20_transfer_data(&target, &U256::ONE);
        data[0] = 0x00;
        assert_eq!(decode_erc20_transfer_data(&data), None);
        assert_eq!(decode_erc20_transfer_data(&data[..40]), None);

        let mut dirty = [0u8; 32];
        dirty[0] = 1;
        assert_eq!(decode_address_word(&dirty), None);
    }
}
