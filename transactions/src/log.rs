//! Contract event logs.

use std::cmp::Ordering;

use ewm_rlp::RlpItem;
use ewm_types::{Address, Hash, U256};

use crate::contract::{decode_uint256_word, TRANSFER_EVENT_TOPIC};
use crate::error::TransactionError;
use crate::status::TransactionStatus;

/// Which transaction receipt entry produced a log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LogIdentifier {
    pub transaction_hash: Hash,
    pub receipt_index: u64,
}

impl LogIdentifier {
    /// `keccak(rlp([transactionHash, receiptIndex]))`
    pub fn hash(&self) -> Hash {
        let item = RlpItem::list(vec![
            RlpItem::from(&self.transaction_hash),
            RlpItem::from_u64(self.receipt_index),
        ]);
        Hash::keccak(&ewm_rlp::encode(&item))
    }
}

/// A log emitted by a contract, optionally tied to the receipt that carried it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    address: Address,
    topics: Vec<Hash>,
    data: Vec<u8>,
    identifier: Option<LogIdentifier>,
    status: TransactionStatus,
}

impl Log {
    pub fn new(address: Address, topics: Vec<Hash>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
            identifier: None,
            status: TransactionStatus::Unknown,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn topics(&self) -> &[Hash] {
        &self.topics
    }

    pub fn topic(&self, index: usize) -> Option<&Hash> {
        self.topics.get(index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn identifier(&self) -> Option<LogIdentifier> {
        self.identifier
    }

    pub fn set_identifier(&mut self, transaction_hash: Hash, receipt_index: u64) {
        self.identifier = Some(LogIdentifier {
            transaction_hash,
            receipt_index,
        });
    }

    /// Unique hash, available once the log is identified.
    pub fn hash(&self) -> Option<Hash> {
        self.identifier.map(|id| id.hash())
    }

    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: TransactionStatus) {
        self.status = status;
    }

    /// `Transfer(from, to, value)` logs have exactly three topics.
    pub fn is_erc20_transfer(&self) -> bool {
        self.topics.len() == 3 && self.topics[0] == TRANSFER_EVENT_TOPIC
    }

    /// `(from, to)` of an ERC20 transfer log.
    pub fn transfer_parties(&self) -> Option<(Address, Address)> {
        if !self.is_erc20_transfer() {
            return None;
        }
        Some((
            Address::from_topic(&self.topics[1]),
            Address::from_topic(&self.topics[2]),
        ))
    }

    /// Value of an ERC20 transfer log, held in the data word.
    pub fn transfer_value(&self) -> Option<U256> {
        if !self.is_erc20_transfer() {
            return None;
        }
        decode_uint256_word(&self.data)
    }

    // ── Encoding ────────────────────────────────────────────────────────

    /// `[address, [topics...], data]`
    pub fn to_rlp(&self) -> RlpItem {
        RlpItem::list(vec![
            RlpItem::from(&self.address),
            RlpItem::list(self.topics.iter().map(RlpItem::from).collect()),
            RlpItem::bytes(self.data.clone()),
        ])
    }

    pub fn encode(&self) -> Vec<u8> {
        ewm_rlp::encode(&self.to_rlp())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TransactionError> {
        let item = ewm_rlp::decode(bytes)?;
        Self::from_fields(item.as_list_of_len(3)?)
    }

    /// `[address, [topics...], data, transactionHash, receiptIndex, status]`
    pub fn encode_archive(&self) -> Result<Vec<u8>, TransactionError> {
        let identifier = self.identifier.ok_or(TransactionError::MalformedField {
            field: "log identifier",
            reason: "log has not been identified".into(),
        })?;
        let mut items = vec![
            RlpItem::from(&self.address),
            RlpItem::list(self.topics.iter().map(RlpItem::from).collect()),
            RlpItem::bytes(self.data.clone()),
        ];
        items.push(RlpItem::from(&identifier.transaction_hash));
        items.push(RlpItem::from_u64(identifier.receipt_index));
        items.push(self.status.to_rlp());
        Ok(ewm_rlp::encode(&RlpItem::list(items)))
    }

    pub fn decode_archive(bytes: &[u8]) -> Result<Self, TransactionError> {
        let item = ewm_rlp::decode(bytes)?;
        let items = item.as_list_of_len(6)?;
        let mut log = Self::from_fields(&items[..3])?;
        log.set_identifier(items[3].as_hash()?, items[4].as_u64()?);
        log.status = TransactionStatus::from_rlp(&items[5])?;
        Ok(log)
    }

    fn from_fields(items: &[RlpItem]) -> Result<Self, TransactionError> {
        let topics = items[1]
            .as_list()?
            .iter()
            .map(RlpItem::as_hash)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            items[0].as_address()?,
            topics,
            items[2].as_bytes()?.to_vec(),
        ))
    }

    /// Included logs first, by `(block, transaction index, receipt index)`.
    pub fn compare_by_inclusion(&self, other: &Self) -> Ordering {
        let receipt = |log: &Self| log.identifier.map_or(u64::MAX, |id| id.receipt_index);
        match (self.status.inclusion(), other.status.inclusion()) {
            (Some(a), Some(b)) => (a.block_number, a.transaction_index, receipt(self))
                .cmp(&(b.block_number, b.transaction_index, receipt(other))),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
