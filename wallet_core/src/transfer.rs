//! Transfers: a movement of ether or tokens backed by a transaction or a log.
//!
//! A transfer created locally owns its *originating* transaction. Once the
//! chain confirms it, the confirming evidence becomes its *basis*: the same
//! transaction for ether, or the contract's `Transfer` log for tokens. The two
//! are stored separately and either may be absent.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use ewm_transactions::{erc20_transfer_data, Inclusion, Log, Transaction, TransactionStatus};
use ewm_types::{
    Address, Amount, Ether, FeeBasis, Gas, GasPrice, Hash, Network, PrivateKey, Token,
    TokenQuantity,
};

use crate::error::WalletError;

/// Wallet-local handle for a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transfer-{}", self.0)
    }
}

/// Progress of a transfer, derived from its transaction status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    Created,
    Submitted,
    Included,
    Errored,
    /// Superseded by a cancel or replacement sharing its nonce.
    Replaced,
}

impl TransferStatus {
    pub fn from_transaction_status(status: &TransactionStatus) -> Self {
        match status {
            TransactionStatus::Unknown => Self::Created,
            TransactionStatus::Queued | TransactionStatus::Pending => Self::Submitted,
            TransactionStatus::Included(_) => Self::Included,
            TransactionStatus::Errored { .. } => Self::Errored,
        }
    }

    /// Included and errored are terminal.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Included | Self::Errored)
    }

    /// Whether moving to `next` is allowed. Final states only move to other
    /// final states; a replaced transfer waits for a final outcome.
    pub fn accepts(&self, next: TransferStatus) -> bool {
        next.is_final() || !(self.is_final() || *self == Self::Replaced)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Submitted => "submitted",
            Self::Included => "included",
            Self::Errored => "errored",
            Self::Replaced => "replaced",
        })
    }
}

/// On-chain evidence for a transfer. The payload is empty until observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferBasis {
    Transaction(Option<Transaction>),
    Log(Option<Log>),
}

impl TransferBasis {
    pub fn hash(&self) -> Option<Hash> {
        match self {
            Self::Transaction(transaction) => transaction.as_ref().and_then(Transaction::hash),
            Self::Log(log) => log.as_ref().and_then(Log::hash),
        }
    }

    pub fn status(&self) -> Option<&TransactionStatus> {
        match self {
            Self::Transaction(transaction) => transaction.as_ref().map(Transaction::status),
            Self::Log(log) => log.as_ref().map(Log::status),
        }
    }

    fn set_status(&mut self, status: TransactionStatus) {
        match self {
            Self::Transaction(Some(transaction)) => transaction.set_status(status),
            Self::Log(Some(log)) => log.set_status(status),
            _ => {}
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Transaction(Some(_)) | Self::Log(Some(_)))
    }
}

#[derive(Clone, Debug)]
pub struct Transfer {
    id: TransferId,
    source: Address,
    target: Address,
    amount: Amount,
    fee_basis: FeeBasis,
    gas_estimate: Gas,
    originating: Option<Transaction>,
    basis: TransferBasis,
    status: TransferStatus,
}

impl Transfer {
    /// A transfer created here, with its originating transaction.
    ///
    /// Token amounts produce a call to the token contract carrying zero ether
    /// and ERC20 `transfer` data.
    pub fn new_originating(
        id: TransferId,
        source: Address,
        target: Address,
        amount: Amount,
        gas_limit: Gas,
        gas_price: GasPrice,
        nonce: Option<u64>,
    ) -> Self {
        let (transaction, basis) = match &amount {
            Amount::Ether(ether) => (
                Transaction::new(source, target, *ether, gas_price, gas_limit, Vec::new(), nonce),
                TransferBasis::Transaction(None),
            ),
            Amount::Token(quantity) => (
                Transaction::new(
                    source,
                    quantity.token().address,
                    Ether::ZERO,
                    gas_price,
                    gas_limit,
                    erc20_transfer_data(&target, &quantity.value()),
                    nonce,
                ),
                TransferBasis::Log(None),
            ),
        };
        tracing::debug!(%id, %source, %target, %amount, "created transfer");
        Self {
            id,
            source,
            target,
            amount,
            fee_basis: FeeBasis::gas(gas_limit, gas_price),
            gas_estimate: Gas::default(),
            originating: Some(transaction),
            basis,
            status: TransferStatus::Created,
        }
    }

    /// An ether transfer first seen on chain.
    pub fn with_transaction(id: TransferId, transaction: Transaction) -> Self {
        let status = TransferStatus::from_transaction_status(transaction.status());
        Self {
            id,
            source: transaction.source(),
            target: transaction.target(),
            amount: Amount::Ether(transaction.amount()),
            fee_basis: transaction.fee_basis(),
            gas_estimate: transaction.gas_estimate(),
            originating: None,
            basis: TransferBasis::Transaction(Some(transaction)),
            status,
        }
    }

    /// A token transfer first seen as an ERC20 `Transfer` log.
    ///
    /// Log transfers carry no fee; the fee belongs to the ether transfer of
    /// the transaction that emitted the log.
    pub fn with_log(id: TransferId, log: Log, token: Arc<Token>) -> Result<Self, WalletError> {
        let (source, target) = log
            .transfer_parties()
            .ok_or_else(|| WalletError::MalformedLog("not an ERC20 transfer".into()))?;
        let value = log
            .transfer_value()
            .ok_or_else(|| WalletError::MalformedLog("transfer value is not one word".into()))?;
        let status = TransferStatus::from_transaction_status(log.status());
        Ok(Self {
            id,
            source,
            target,
            amount: Amount::Token(TokenQuantity::new(token, value)),
            fee_basis: FeeBasis::None,
            gas_estimate: Gas::default(),
            originating: None,
            basis: TransferBasis::Log(Some(log)),
            status,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn id(&self) -> TransferId {
        self.id
    }

    pub fn source(&self) -> Address {
        self.source
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn fee_basis(&self) -> FeeBasis {
        self.fee_basis
    }

    pub fn gas_estimate(&self) -> Gas {
        self.gas_estimate
    }

    pub fn originating_transaction(&self) -> Option<&Transaction> {
        self.originating.as_ref()
    }

    pub fn basis(&self) -> &TransferBasis {
        &self.basis
    }

    pub fn basis_transaction(&self) -> Option<&Transaction> {
        match &self.basis {
            TransferBasis::Transaction(transaction) => transaction.as_ref(),
            TransferBasis::Log(_) => None,
        }
    }

    pub fn basis_log(&self) -> Option<&Log> {
        match &self.basis {
            TransferBasis::Log(log) => log.as_ref(),
            TransferBasis::Transaction(_) => None,
        }
    }

    /// Hash of the basis; `None` until the basis is observed.
    pub fn identifier(&self) -> Option<Hash> {
        self.basis.hash()
    }

    /// Hash of the transaction this session signed, if any.
    pub fn originating_transaction_hash(&self) -> Option<Hash> {
        self.originating.as_ref().and_then(Transaction::hash)
    }

    /// Hash of the transaction that carried this transfer, from whichever side knows it.
    pub fn transaction_hash(&self) -> Option<Hash> {
        match &self.basis {
            TransferBasis::Transaction(Some(transaction)) => transaction.hash(),
            TransferBasis::Log(Some(log)) => log.identifier().map(|id| id.transaction_hash),
            _ => self.originating_transaction_hash(),
        }
    }

    pub fn nonce(&self) -> Option<u64> {
        self.originating
            .as_ref()
            .or(self.basis_transaction())
            .and_then(Transaction::nonce)
    }

    /// Fee paid. Log-basis transfers report zero.
    pub fn fee(&self) -> Result<Ether, WalletError> {
        match &self.basis {
            TransferBasis::Log(_) => Ok(Ether::ZERO),
            TransferBasis::Transaction(Some(transaction)) => Ok(transaction.fee()?),
            TransferBasis::Transaction(None) => match &self.originating {
                Some(transaction) => Ok(transaction.fee()?),
                None => Ok(self.fee_basis.fee()?),
            },
        }
    }

    /// Status of the basis, or of the originating transaction before that.
    pub fn transaction_status(&self) -> &TransactionStatus {
        const UNKNOWN: &TransactionStatus = &TransactionStatus::Unknown;
        self.basis
            .status()
            .or(self.originating.as_ref().map(Transaction::status))
            .unwrap_or(UNKNOWN)
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn is_submitted(&self) -> bool {
        self.status != TransferStatus::Created
    }

    // ── Mutation ────────────────────────────────────────────────────────

    pub fn set_gas_estimate(&mut self, estimate: Gas) {
        self.gas_estimate = estimate;
        if let Some(transaction) = self.originating.as_mut() {
            transaction.set_gas_estimate(estimate);
            self.fee_basis = transaction.fee_basis();
        }
    }

    pub(crate) fn assign_nonce(&mut self, nonce: u64) -> Result<(), WalletError> {
        let transaction = self
            .originating
            .as_mut()
            .ok_or(WalletError::NotOriginating(self.id))?;
        transaction.set_nonce(nonce);
        Ok(())
    }

    /// Sign the originating transaction.
    pub fn sign(&mut self, network: Network, key: &PrivateKey) -> Result<Hash, WalletError> {
        let transaction = self
            .originating
            .as_mut()
            .ok_or(WalletError::NotOriginating(self.id))?;
        Ok(transaction.sign(network, key)?)
    }

    /// Take `transaction` as the basis. A stale observation whose status
    /// would move the transfer backwards leaves the basis untouched.
    pub fn set_basis_transaction(&mut self, transaction: Transaction) {
        if !self.accepts(transaction.status()) {
            return;
        }
        let status = transaction.status().clone();
        self.basis = TransferBasis::Transaction(Some(transaction));
        self.status_update(status);
    }

    /// Take `log` as the basis, with the same staleness rule.
    pub fn set_basis_log(&mut self, log: Log) {
        if !self.accepts(log.status()) {
            return;
        }
        let status = log.status().clone();
        self.basis = TransferBasis::Log(Some(log));
        self.status_update(status);
    }

    fn accepts(&self, status: &TransactionStatus) -> bool {
        let next = TransferStatus::from_transaction_status(status);
        let accepted = self.status.accepts(next);
        if !accepted {
            tracing::warn!(id = %self.id, current = %self.status, ignored = %next, "ignored status regression");
        }
        accepted
    }

    /// Apply a transaction status and re-derive the transfer status.
    ///
    /// Re-applying the same status is a no-op, and a transfer never moves from
    /// included or errored back to created or submitted.
    pub fn status_update(&mut self, status: TransactionStatus) {
        if !self.accepts(&status) {
            return;
        }
        let next = TransferStatus::from_transaction_status(&status);

        if self.basis.is_populated() {
            self.basis.set_status(status.clone());
        }
        if let Some(transaction) = self.originating.as_mut() {
            transaction.set_status(status);
        }

        if next != self.status {
            tracing::debug!(id = %self.id, from = %self.status, to = %next, "transfer status");
            self.status = next;
        }
    }

    /// Mark as superseded by a cancel or replacement.
    pub(crate) fn mark_replaced(&mut self) {
        tracing::debug!(id = %self.id, from = %self.status, "transfer replaced");
        self.status = TransferStatus::Replaced;
    }

    // ── Ordering ────────────────────────────────────────────────────────

    fn inclusion(&self) -> Option<&Inclusion> {
        self.transaction_status().inclusion()
    }

    /// The transaction whose status orders this transfer.
    fn ordering_transaction(&self) -> Option<&Transaction> {
        self.basis_transaction().or(self.originating.as_ref())
    }

    /// Included transfers first, by `(block number, transaction index)`; the
    /// rest after them, by nonce.
    ///
    /// Two log-basis transfers order by their logs, two transaction-backed
    /// transfers by their transactions.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.basis_log(), other.basis_log()) {
            (Some(a), Some(b)) => return a.compare_by_inclusion(b),
            (None, None) => {
                if let (Some(a), Some(b)) = (self.ordering_transaction(), other.ordering_transaction()) {
                    return a.compare_by_inclusion(b);
                }
            }
            _ => {}
        }
        match (self.inclusion(), other.inclusion()) {
            (Some(a), Some(b)) => (a.block_number, a.transaction_index)
                .cmp(&(b.block_number, b.transaction_index)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .nonce()
                .unwrap_or(u64::MAX)
                .cmp(&other.nonce().unwrap_or(u64::MAX)),
        }
    }
}
