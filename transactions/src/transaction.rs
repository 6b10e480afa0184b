//! The transaction value object and its EIP-155 encodings.
//!
//! All three encodings share the field order
//! `[nonce, gasPrice, gasLimit, target, amount, data, v, r, s]`:
//!
//! - **Unsigned**: `v = chainId`, `r = s = ""`. Its hash is what gets signed.
//! - **Signed**: `v = 27 + recid + 8 + 2·chainId`. Its hash is the transaction hash.
//! - **Archive**: the signed list followed by `[source, hash, status]`.

use std::cmp::Ordering;

use ewm_rlp::RlpItem;
use ewm_types::{Address, Ether, FeeBasis, Gas, GasPrice, Hash, Network, PrivateKey, Signature, U256};

use crate::error::TransactionError;
use crate::status::TransactionStatus;

/// Which of the three list shapes to produce or expect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RlpKind {
    Unsigned,
    Signed,
    Archive,
}

const SIGNED_FIELD_COUNT: usize = 9;
const ARCHIVE_FIELD_COUNT: usize = 12;
/// `v` values above this carry an EIP-155 chain id.
const EIP155_V_THRESHOLD: u64 = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    source: Address,
    target: Address,
    amount: Ether,
    gas_price: GasPrice,
    gas_limit: Gas,
    gas_estimate: Gas,
    nonce: Option<u64>,
    data: Vec<u8>,
    signature: Option<Signature>,
    status: TransactionStatus,
    hash: Option<Hash>,
}

impl Transaction {
    pub fn new(
        source: Address,
        target: Address,
        amount: Ether,
        gas_price: GasPrice,
        gas_limit: Gas,
        data: Vec<u8>,
        nonce: Option<u64>,
    ) -> Self {
        Self {
            source,
            target,
            amount,
            gas_price,
            gas_limit,
            gas_estimate: Gas::default(),
            nonce,
            data,
            signature: None,
            status: TransactionStatus::Unknown,
            hash: None,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn source(&self) -> Address {
        self.source
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn amount(&self) -> Ether {
        self.amount
    }

    pub fn gas_price(&self) -> GasPrice {
        self.gas_price
    }

    pub fn gas_limit(&self) -> Gas {
        self.gas_limit
    }

    pub fn gas_estimate(&self) -> Gas {
        self.gas_estimate
    }

    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    /// Hash of the signed encoding; `None` until signed or observed.
    pub fn hash(&self) -> Option<Hash> {
        self.hash
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some_and(|sig| sig.is_set())
    }

    pub fn fee_basis(&self) -> FeeBasis {
        FeeBasis::gas(self.gas_limit, self.gas_price)
    }

    // ── Mutation ────────────────────────────────────────────────────────
    //
    // Changing any encoded field discards the signature and hash.

    pub fn set_target(&mut self, target: Address) {
        self.target = target;
        self.invalidate();
    }

    pub fn set_amount(&mut self, amount: Ether) {
        self.amount = amount;
        self.invalidate();
    }

    pub fn set_gas_price(&mut self, gas_price: GasPrice) {
        self.gas_price = gas_price;
        self.invalidate();
    }

    pub fn set_gas_limit(&mut self, gas_limit: Gas) {
        self.gas_limit = gas_limit;
        self.invalidate();
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = Some(nonce);
        self.invalidate();
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
        self.invalidate();
    }

    /// Record an external gas estimate, raising the limit to cover it plus margin.
    ///
    /// The limit is never lowered.
    pub fn set_gas_estimate(&mut self, estimate: Gas) {
        self.gas_estimate = estimate;
        let limit = estimate.with_margin();
        if limit > self.gas_limit {
            self.set_gas_limit(limit);
        }
    }

    pub fn set_status(&mut self, status: TransactionStatus) {
        self.status = status;
    }

    fn invalidate(&mut self) {
        self.signature = None;
        self.hash = None;
    }

    // ── Fees ────────────────────────────────────────────────────────────

    /// `gasLimit × gasPrice`: the most this transaction can cost.
    pub fn fee_limit(&self) -> Result<Ether, TransactionError> {
        Ok(self.gas_price.cost_of(self.gas_limit)?)
    }

    /// Actual fee once included (gas used), otherwise the fee limit.
    pub fn fee(&self) -> Result<Ether, TransactionError> {
        let gas = match &self.status {
            TransactionStatus::Included(inclusion) => inclusion.gas_used,
            _ => self.gas_limit,
        };
        Ok(self.gas_price.cost_of(gas)?)
    }

    // ── Signing ─────────────────────────────────────────────────────────

    /// Sign for `network` with the source address's key and return the new hash.
    pub fn sign(&mut self, network: Network, private: &PrivateKey) -> Result<Hash, TransactionError> {
        let signer = ewm_crypto::address_from_private(private)?;
        if signer != self.source {
            return Err(TransactionError::WrongSigner {
                signer,
                source_address: self.source,
            });
        }

        let unsigned = self.encode(network, RlpKind::Unsigned)?;
        let signature = ewm_crypto::sign_bytes(&unsigned, private)?;
        self.signature = Some(signature);

        let signed = self.encode(network, RlpKind::Signed)?;
        let hash = Hash::keccak(&signed);
        self.hash = Some(hash);

        tracing::debug!(
            nonce = self.nonce,
            hash = %hash,
            chain_id = network.chain_id(),
            "signed transaction"
        );
        Ok(hash)
    }

    // ── Encoding ────────────────────────────────────────────────────────

    pub fn encode(&self, network: Network, kind: RlpKind) -> Result<Vec<u8>, TransactionError> {
        Ok(ewm_rlp::encode(&self.to_rlp(network, kind)?))
    }

    pub fn to_rlp(&self, network: Network, kind: RlpKind) -> Result<RlpItem, TransactionError> {
        let nonce = self.nonce.ok_or(TransactionError::NonceUnassigned)?;
        let mut items = vec![
            RlpItem::from_u64(nonce),
            RlpItem::from_u256(&self.gas_price.ether().wei()),
            RlpItem::from_u64(self.gas_limit.amount()),
            RlpItem::from(&self.target),
            RlpItem::from_u256(&self.amount.wei()),
            RlpItem::bytes(self.data.clone()),
        ];

        match kind {
            RlpKind::Unsigned => {
                items.push(RlpItem::from_u64(network.chain_id()));
                items.push(RlpItem::empty());
                items.push(RlpItem::empty());
            }
            RlpKind::Signed | RlpKind::Archive => {
                let signature = self
                    .signature
                    .filter(Signature::is_set)
                    .ok_or(TransactionError::NotSigned)?;
                items.push(RlpItem::from_u64(eip155_v(signature.v, network)));
                items.push(RlpItem::from_u256(&U256::from_be_bytes(signature.r)));
                items.push(RlpItem::from_u256(&U256::from_be_bytes(signature.s)));
            }
        }

        if kind == RlpKind::Archive {
            let hash = self.hash.ok_or(TransactionError::NotSigned)?;
            items.push(RlpItem::from(&self.source));
            items.push(RlpItem::from(&hash));
            items.push(self.status.to_rlp());
        }

        Ok(RlpItem::list(items))
    }

    /// Decode one of the three encodings.
    ///
    /// - Unsigned: the source is unknown and left as [`Address::ZERO`].
    /// - Signed: the source is recovered from the signature and the hash is
    ///   Keccak-256 of `bytes` exactly.
    /// - Archive: source, hash and status are read back; the stored hash must
    ///   match the re-encoded signed form.
    pub fn decode(bytes: &[u8], network: Network, kind: RlpKind) -> Result<Self, TransactionError> {
        let item = ewm_rlp::decode(bytes)?;
        match kind {
            RlpKind::Unsigned => {
                let items = item.as_list_of_len(SIGNED_FIELD_COUNT)?;
                let mut transaction = Self::from_fields(&items[..6])?;
                let chain_id = items[6].as_u64()?;
                if chain_id != network.chain_id() {
                    return Err(TransactionError::MalformedField {
                        field: "chain id",
                        reason: format!("expected {}, got {chain_id}", network.chain_id()),
                    });
                }
                if !items[7].as_bytes()?.is_empty() || !items[8].as_bytes()?.is_empty() {
                    return Err(TransactionError::MalformedField {
                        field: "signature",
                        reason: "unsigned encoding carries r or s".into(),
                    });
                }
                transaction.source = Address::ZERO;
                Ok(transaction)
            }
            RlpKind::Signed => {
                let items = item.as_list_of_len(SIGNED_FIELD_COUNT)?;
                let mut transaction = Self::from_fields(&items[..6])?;
                let signature = decode_signature(&items[6..9], network)?;
                transaction.signature = Some(signature);

                // Pre-EIP-155 signatures cover only the six payload fields.
                let unsigned = if items[6].as_u64()? > EIP155_V_THRESHOLD {
                    transaction.encode(network, RlpKind::Unsigned)?
                } else {
                    ewm_rlp::encode(&RlpItem::list(items[..6].to_vec()))
                };
                transaction.source =
                    ewm_crypto::recover_address(&Hash::keccak(&unsigned), &signature)
                        .map_err(|_| TransactionError::InvalidSignature {
                            v: signature.v as u64,
                        })?;
                transaction.hash = Some(Hash::keccak(bytes));
                Ok(transaction)
            }
            RlpKind::Archive => {
                let items = item.as_list_of_len(ARCHIVE_FIELD_COUNT)?;
                let mut transaction = Self::from_fields(&items[..6])?;
                transaction.signature = Some(decode_signature(&items[6..9], network)?);
                transaction.source = items[9].as_address()?;

                let expected = items[10].as_hash()?;
                let signed = ewm_rlp::encode(&RlpItem::list(items[..SIGNED_FIELD_COUNT].to_vec()));
                let actual = Hash::keccak(&signed);
                if expected != actual {
                    return Err(TransactionError::TransactionHashMismatch { expected, actual });
                }
                transaction.hash = Some(actual);
                transaction.status = TransactionStatus::from_rlp(&items[11])?;
                Ok(transaction)
            }
        }
    }

    fn from_fields(items: &[RlpItem]) -> Result<Self, TransactionError> {
        Ok(Self::new(
            Address::ZERO,
            items[3].as_address()?,
            Ether::from_wei(items[4].as_u256()?),
            GasPrice::new(Ether::from_wei(items[1].as_u256()?)),
            Gas::new(items[2].as_u64()?),
            items[5].as_bytes()?.to_vec(),
            Some(items[0].as_u64()?),
        ))
    }

    // ── Ordering ────────────────────────────────────────────────────────

    /// Included transactions first, by `(block number, index)`; the rest by nonce.
    pub fn compare_by_inclusion(&self, other: &Self) -> Ordering {
        match (self.status.inclusion(), other.status.inclusion()) {
            (Some(a), Some(b)) => (a.block_number, a.transaction_index)
                .cmp(&(b.block_number, b.transaction_index)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .nonce
                .unwrap_or(u64::MAX)
                .cmp(&other.nonce.unwrap_or(u64::MAX)),
        }
    }
}

fn eip155_v(v: u8, network: Network) -> u64 {
    v as u64 + 8 + 2 * network.chain_id()
}

fn decode_signature(items: &[RlpItem], network: Network) -> Result<Signature, TransactionError> {
    let eip_v = items[0].as_u64()?;
    let v = if eip_v > EIP155_V_THRESHOLD {
        eip_v
            .checked_sub(8 + 2 * network.chain_id())
            .ok_or(TransactionError::InvalidSignature { v: eip_v })?
    } else {
        eip_v
    };
    let v = u8::try_from(v)
        .ok()
        .filter(|v| (27..=28).contains(v))
        .ok_or(TransactionError::InvalidSignature { v: eip_v })?;

    Ok(Signature {
        v,
        r: items[1].as_u256()?.to_be_bytes(),
        s: items[2].as_u256()?.to_be_bytes(),
    })
}
