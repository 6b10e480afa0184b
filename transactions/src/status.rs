//! Transaction status as reported by the network.

use std::fmt;

use ewm_rlp::RlpItem;
use ewm_types::{Gas, Hash};

use crate::error::TransactionError;

/// Why the network rejected a transaction. Discriminants are archived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionErrorKind {
    InvalidSignature = 0,
    NonceTooLow = 1,
    BalanceTooLow = 2,
    GasPriceTooLow = 3,
    GasTooLow = 4,
    ReplacementUnderpriced = 5,
    Dropped = 6,
    AlreadyKnown = 7,
    Unknown = 8,
}

const KINDS: [TransactionErrorKind; 9] = [
    TransactionErrorKind::InvalidSignature,
    TransactionErrorKind::NonceTooLow,
    TransactionErrorKind::BalanceTooLow,
    TransactionErrorKind::GasPriceTooLow,
    TransactionErrorKind::GasTooLow,
    TransactionErrorKind::ReplacementUnderpriced,
    TransactionErrorKind::Dropped,
    TransactionErrorKind::AlreadyKnown,
    TransactionErrorKind::Unknown,
];

/// Reason prefixes, matched case-insensitively, in priority order.
const REASON_PREFIXES: &[(&str, TransactionErrorKind)] = &[
    ("invalid signature", TransactionErrorKind::InvalidSignature),
    ("invalid sender", TransactionErrorKind::InvalidSignature),
    ("nonce too low", TransactionErrorKind::NonceTooLow),
    ("balance too low", TransactionErrorKind::BalanceTooLow),
    ("insufficient funds", TransactionErrorKind::BalanceTooLow),
    ("gas price too low", TransactionErrorKind::GasPriceTooLow),
    ("transaction underpriced", TransactionErrorKind::GasPriceTooLow),
    ("intrinsic gas too low", TransactionErrorKind::GasTooLow),
    ("gas too low", TransactionErrorKind::GasTooLow),
    ("replacement underpriced", TransactionErrorKind::ReplacementUnderpriced),
    ("replacement transaction underpriced", TransactionErrorKind::ReplacementUnderpriced),
    ("dropped", TransactionErrorKind::Dropped),
    ("already known", TransactionErrorKind::AlreadyKnown),
    ("known transaction", TransactionErrorKind::AlreadyKnown),
];

impl TransactionErrorKind {
    /// Classify a rejection reason by its leading words.
    pub fn from_reason(reason: &str) -> Self {
        let reason = reason.trim().to_ascii_lowercase();
        REASON_PREFIXES
            .iter()
            .find(|(prefix, _)| reason.starts_with(*prefix))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Unknown)
    }

    pub fn code(&self) -> u64 {
        *self as u64
    }

    pub fn from_code(code: u64) -> Option<Self> {
        KINDS.into_iter().find(|kind| kind.code() == code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "invalid signature",
            Self::NonceTooLow => "nonce too low",
            Self::BalanceTooLow => "balance too low",
            Self::GasPriceTooLow => "gas price too low",
            Self::GasTooLow => "gas too low",
            Self::ReplacementUnderpriced => "replacement underpriced",
            Self::Dropped => "dropped",
            Self::AlreadyKnown => "already known",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TransactionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a transaction landed on chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Inclusion {
    pub block_hash: Hash,
    pub block_number: u64,
    pub transaction_index: u64,
    pub block_timestamp: u64,
    pub gas_used: Gas,
}

/// Lifecycle of a transaction as seen from the network.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TransactionStatus {
    #[default]
    Unknown,
    Queued,
    Pending,
    Included(Inclusion),
    Errored {
        kind: TransactionErrorKind,
        detail: String,
    },
}

impl TransactionStatus {
    pub const TYPE_UNKNOWN: u64 = 0;
    pub const TYPE_QUEUED: u64 = 1;
    pub const TYPE_PENDING: u64 = 2;
    pub const TYPE_INCLUDED: u64 = 3;
    pub const TYPE_ERRORED: u64 = 4;

    /// Status for a network rejection.
    ///
    /// An "already known" rejection means an earlier submission succeeded, so it
    /// yields `Pending` rather than `Errored`.
    pub fn from_rejection(reason: &str) -> Self {
        match TransactionErrorKind::from_reason(reason) {
            TransactionErrorKind::AlreadyKnown => Self::Pending,
            kind => Self::Errored {
                kind,
                detail: reason.to_string(),
            },
        }
    }

    pub fn type_code(&self) -> u64 {
        match self {
            Self::Unknown => Self::TYPE_UNKNOWN,
            Self::Queued => Self::TYPE_QUEUED,
            Self::Pending => Self::TYPE_PENDING,
            Self::Included(_) => Self::TYPE_INCLUDED,
            Self::Errored { .. } => Self::TYPE_ERRORED,
        }
    }

    pub fn inclusion(&self) -> Option<&Inclusion> {
        match self {
            Self::Included(inclusion) => Some(inclusion),
            _ => None,
        }
    }

    pub fn is_included(&self) -> bool {
        matches!(self, Self::Included(_))
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Self::Errored { .. })
    }

    /// `[type, [blockHash, blockNumber, txIndex, blockTimestamp, gasUsed] | [], kind, detail]`
    ///
    /// `kind` is a [`TransactionErrorKind`] code and `detail` the rejection
    /// text; both are empty unless errored.
    pub fn to_rlp(&self) -> RlpItem {
        let details = match self {
            Self::Included(inclusion) => RlpItem::list(vec![
                RlpItem::from(&inclusion.block_hash),
                RlpItem::from_u64(inclusion.block_number),
                RlpItem::from_u64(inclusion.transaction_index),
                RlpItem::from_u64(inclusion.block_timestamp),
                RlpItem::from_u64(inclusion.gas_used.amount()),
            ]),
            _ => RlpItem::list(Vec::new()),
        };
        let (kind, detail) = match self {
            Self::Errored { kind, detail } => (RlpItem::from_u64(kind.code()), RlpItem::bytes(detail.as_bytes())),
            _ => (RlpItem::empty(), RlpItem::empty()),
        };
        RlpItem::list(vec![RlpItem::from_u64(self.type_code()), details, kind, detail])
    }

    /// Inverse of [`Self::to_rlp`].
    ///
    /// The older three-item form `[type, inclusion, reason]` is also read; there
    /// a non-empty reason wins over the type code and is classified again.
    /// Inclusion details may carry only `[blockHash, blockNumber, txIndex]`, in
    /// which case the timestamp and gas used are zero.
    pub fn from_rlp(item: &RlpItem) -> Result<Self, TransactionError> {
        let items = item.as_list()?;
        let code = match items.len() {
            3 | 4 => items[0].as_u64()?,
            actual => {
                return Err(TransactionError::MalformedField {
                    field: "status",
                    reason: format!("expected 3 or 4 items, got {actual}"),
                })
            }
        };

        if items.len() == 3 {
            let reason = utf8(&items[2])?;
            if !reason.is_empty() && reason != "0x" {
                return Ok(Self::from_rejection(&reason));
            }
        }

        match code {
            Self::TYPE_UNKNOWN => Ok(Self::Unknown),
            Self::TYPE_QUEUED => Ok(Self::Queued),
            Self::TYPE_PENDING => Ok(Self::Pending),
            Self::TYPE_INCLUDED => decode_inclusion(&items[1]).map(Self::Included),
            Self::TYPE_ERRORED if items.len() == 4 => {
                let kind_code = items[2].as_u64()?;
                let kind = TransactionErrorKind::from_code(kind_code).ok_or_else(|| {
                    TransactionError::MalformedField {
                        field: "status error kind",
                        reason: format!("unknown code {kind_code}"),
                    }
                })?;
                Ok(Self::Errored {
                    kind,
                    detail: utf8(&items[3])?,
                })
            }
            Self::TYPE_ERRORED => Ok(Self::Errored {
                kind: TransactionErrorKind::Unknown,
                detail: String::new(),
            }),
            other => Err(TransactionError::MalformedField {
                field: "status type",
                reason: format!("unknown code {other}"),
            }),
        }
    }
}

fn utf8(item: &RlpItem) -> Result<String, TransactionError> {
    String::from_utf8(item.as_bytes()?.to_vec()).map_err(|e| TransactionError::MalformedField {
        field: "status reason",
        reason: e.to_string(),
    })
}

fn decode_inclusion(item: &RlpItem) -> Result<Inclusion, TransactionError> {
    let fields = item.as_list()?;
    let (block_timestamp, gas_used) = match fields.len() {
        5 => (fields[3].as_u64()?, Gas::new(fields[4].as_u64()?)),
        3 => (0, Gas::default()),
        actual => {
            return Err(TransactionError::MalformedField {
                field: "inclusion",
                reason: format!("expected 3 or 5 items, got {actual}"),
            })
        }
    };
    Ok(Inclusion {
        block_hash: fields[0].as_hash()?,
        block_number: fields[1].as_u64()?,
        transaction_index: fields[2].as_u64()?,
        block_timestamp,
        gas_used,
    })
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Queued => f.write_str("queued"),
            Self::Pending => f.write_str("pending"),
            Self::Included(inclusion) => write!(
                f,
                "included in block {} at index {}",
                inclusion.block_number, inclusion.transaction_index
            ),
            Self::Errored { kind, .. } => write!(f, "errored: {kind}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn included() -> TransactionStatus {
        TransactionStatus::Included(Inclusion {
            block_hash: Hash::keccak(b"block"),
            block_number: 5_000_000,
            transaction_index: 17,
            block_timestamp: 1_520_000_000,
            gas_used: Gas::new(21_000),
        })
    }

    #[test]
    fn reason_prefixes_classify() {
        assert_eq!(
            TransactionErrorKind::from_reason("nonce too low"),
            TransactionErrorKind::NonceTooLow
        );
        assert_eq!(
            TransactionErrorKind::from_reason("Insufficient funds for gas * price + value"),
            TransactionErrorKind::BalanceTooLow
        );
        assert_eq!(
            TransactionErrorKind::from_reason("replacement transaction underpriced"),
            TransactionErrorKind::ReplacementUnderpriced
        );
        assert_eq!(
            TransactionErrorKind::from_reason("intrinsic gas too low"),
            TransactionErrorKind::GasTooLow
        );
        assert_eq!(
            TransactionErrorKind::from_reason("something odd"),
            TransactionErrorKind::Unknown
        );
    }

    #[test]
    fn already_known_is_pending() {
        assert_eq!(
            TransactionStatus::from_rejection("already known"),
            TransactionStatus::Pending
        );
        assert!(TransactionStatus::from_rejection("dropped").is_errored());
    }

    #[test]
    fn rlp_round_trip() {
        for status in [
            TransactionStatus::Unknown,
            TransactionStatus::Queued,
            TransactionStatus::Pending,
            included(),
            TransactionStatus::from_rejection("nonce too low"),
        ] {
            assert_eq!(TransactionStatus::from_rlp(&status.to_rlp()).unwrap(), status);
        }
    }

    #[test]
    fn error_kind_survives_any_detail() {
        for status in [
            TransactionStatus::Errored {
                kind: TransactionErrorKind::Dropped,
                detail: String::new(),
            },
            TransactionStatus::Errored {
                kind: TransactionErrorKind::NonceTooLow,
                detail: "already known".into(),
            },
            TransactionStatus::Errored {
                kind: TransactionErrorKind::Unknown,
                detail: "insufficient funds".into(),
            },
        ] {
            assert_eq!(TransactionStatus::from_rlp(&status.to_rlp()).unwrap(), status);
        }
    }

    #[test]
    fn error_kind_codes_are_stable() {
        assert_eq!(TransactionErrorKind::InvalidSignature.code(), 0);
        assert_eq!(TransactionErrorKind::Unknown.code(), 8);
        for code in 0..9 {
            assert_eq!(TransactionErrorKind::from_code(code).unwrap().code(), code);
        }
        assert_eq!(TransactionErrorKind::from_code(9), None);

        let item = RlpItem::list(vec![
            RlpItem::from_u64(TransactionStatus::TYPE_ERRORED),
            RlpItem::list(vec![]),
            RlpItem::from_u64(42),
            RlpItem::empty(),
        ]);
        assert!(matches!(
            TransactionStatus::from_rlp(&item),
            Err(TransactionError::MalformedField { .. })
        ));
    }

    #[test]
    fn legacy_reason_overrides_type_code() {
        let item = RlpItem::list(vec![
            RlpItem::from_u64(TransactionStatus::TYPE_PENDING),
            RlpItem::list(vec![]),
            RlpItem::bytes(b"gas price too low".to_vec()),
        ]);
        assert_eq!(
            TransactionStatus::from_rlp(&item).unwrap(),
            TransactionStatus::Errored {
                kind: TransactionErrorKind::GasPriceTooLow,
                detail: "gas price too low".into(),
            }
        );
    }

    #[test]
    fn short_inclusion_is_accepted() {
        let hash = Hash::keccak(b"block");
        let item = RlpItem::list(vec![
            RlpItem::from_u64(TransactionStatus::TYPE_INCLUDED),
            RlpItem::list(vec![RlpItem::from(&hash), RlpItem::from_u64(9), RlpItem::from_u64(2)]),
            RlpItem::empty(),
        ]);
        let status = TransactionStatus::from_rlp(&item).unwrap();
        let inclusion = status.inclusion().unwrap();
        assert_eq!(inclusion.block_number, 9);
        assert_eq!(inclusion.transaction_index, 2);
        assert_eq!(inclusion.gas_used, Gas::default());
    }

    #[test]
    fn unknown_type_code_is_rejected() {
        let item = RlpItem::list(vec![
            RlpItem::from_u64(9),
            RlpItem::list(vec![]),
            RlpItem::empty(),
        ]);
        assert!(matches!(
            TransactionStatus::from_rlp(&item),
            Err(TransactionError::MalformedField { .. })
        ));
    }
}
