//! The wallet session: one account, its wallets and the announce entry points.
//!
//! The network layer pushes observations in through the `announce_*` methods.
//! Each is idempotent: re-delivering the same transaction, log or status
//! leaves the session unchanged. Callers serialize all mutating calls.

use std::collections::BTreeMap;

use ewm_transactions::{Log, TokenRegistry, Transaction, TransactionError, TransactionStatus};
use ewm_types::{Address, Amount, Ether, Gas, GasPrice, Hash, Network, PrivateKey};

use crate::account::Account;
use crate::config::EwmConfig;
use crate::error::WalletError;
use crate::transfer::{Transfer, TransferId};
use crate::wallet::{doubled, Wallet, WalletId};

pub struct WalletManager {
    account: Account,
    network: Network,
    tokens: TokenRegistry,
    default_gas_price: GasPrice,
    wallets: BTreeMap<WalletId, Wallet>,
    native: Option<WalletId>,
    next_wallet: u32,
}

impl WalletManager {
    pub fn new(
        account: Account,
        network: Network,
        tokens: TokenRegistry,
        default_gas_price: GasPrice,
    ) -> Self {
        Self {
            account,
            network,
            tokens,
            default_gas_price,
            wallets: BTreeMap::new(),
            native: None,
            next_wallet: 0,
        }
    }

    /// Session from a configuration: network, gas defaults and known tokens.
    pub fn from_config(account: Account, config: &EwmConfig) -> Result<Self, WalletError> {
        let mut manager = Self::new(
            account,
            config.network,
            config.token_registry()?,
            config.default_gas_price(),
        );
        let native = manager.native_wallet();
        manager.wallet_mut(native)?.set_default_gas_limit(Gas::new(config.default_gas_limit));
        Ok(manager)
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }

    // ── Wallets ─────────────────────────────────────────────────────────

    /// The ether wallet, created on first use.
    pub fn native_wallet(&mut self) -> WalletId {
        if let Some(id) = self.native {
            return id;
        }
        let id = self.allocate_wallet_id();
        let wallet = Wallet::new_native(
            id,
            self.account.primary_address(),
            self.network,
            self.default_gas_price,
        );
        self.wallets.insert(id, wallet);
        self.native = Some(id);
        id
    }

    /// The wallet holding the registered token at `address`, created on first use.
    pub fn wallet_holding_token(&mut self, address: &Address) -> Result<WalletId, WalletError> {
        if let Some(wallet) = self
            .wallets
            .values()
            .find(|w| w.token().is_some_and(|t| t.address == *address))
        {
            return Ok(wallet.id());
        }
        let token = self
            .tokens
            .lookup(address)
            .ok_or(WalletError::UnknownToken(*address))?;
        let id = self.allocate_wallet_id();
        let wallet = Wallet::new_token(id, self.account.primary_address(), self.network, token);
        self.wallets.insert(id, wallet);
        Ok(id)
    }

    fn allocate_wallet_id(&mut self) -> WalletId {
        let id = WalletId(self.next_wallet);
        self.next_wallet += 1;
        id
    }

    pub fn wallet(&self, id: WalletId) -> Result<&Wallet, WalletError> {
        self.wallets.get(&id).ok_or(WalletError::UnknownWallet(id))
    }

    pub fn wallet_mut(&mut self, id: WalletId) -> Result<&mut Wallet, WalletError> {
        self.wallets.get_mut(&id).ok_or(WalletError::UnknownWallet(id))
    }

    pub fn wallets(&self) -> impl Iterator<Item = &Wallet> {
        self.wallets.values()
    }

    // ── Transfers ───────────────────────────────────────────────────────

    pub fn create_transfer(
        &mut self,
        wallet: WalletId,
        target: Address,
        amount: Amount,
    ) -> Result<TransferId, WalletError> {
        self.wallet_mut(wallet)?.create_transfer(target, amount)
    }

    pub fn sign_transfer_with_phrase(
        &mut self,
        wallet: WalletId,
        transfer: TransferId,
        phrase: &str,
    ) -> Result<Hash, WalletError> {
        let wallet = self
            .wallets
            .get_mut(&wallet)
            .ok_or(WalletError::UnknownWallet(wallet))?;
        wallet.sign_transfer_with_phrase(&mut self.account, transfer, phrase)
    }

    pub fn sign_transfer_with_private_key(
        &mut self,
        wallet: WalletId,
        transfer: TransferId,
        key: &PrivateKey,
    ) -> Result<Hash, WalletError> {
        let wallet = self
            .wallets
            .get_mut(&wallet)
            .ok_or(WalletError::UnknownWallet(wallet))?;
        wallet.sign_transfer_with_private_key(&mut self.account, transfer, key)
    }

    pub fn raw_transaction(&self, wallet: WalletId, transfer: TransferId) -> Result<Vec<u8>, WalletError> {
        self.wallet(wallet)?.raw_transaction(transfer)
    }

    // ── Cancel and replace ──────────────────────────────────────────────

    pub fn can_cancel_transfer(&self, wallet: WalletId, transfer: TransferId) -> Result<bool, WalletError> {
        self.wallet(wallet)?.can_cancel_transfer(transfer)
    }

    pub fn can_replace_transfer(&self, wallet: WalletId, transfer: TransferId) -> Result<bool, WalletError> {
        self.wallet(wallet)?.can_replace_transfer(transfer)
    }

    /// Cancel a pending transfer with a zero-ether transfer to ourselves at
    /// the same nonce and twice the gas price. A token transfer is cancelled
    /// from the ether wallet, which is where the new transfer lands.
    pub fn create_transfer_to_cancel(
        &mut self,
        wallet: WalletId,
        transfer: TransferId,
    ) -> Result<(WalletId, TransferId), WalletError> {
        if self.wallet(wallet)?.is_native() {
            let native = self.wallet_mut(wallet)?;
            let cancel = native.create_transfer_to_cancel(transfer)?;
            rebalance(native);
            return Ok((wallet, cancel));
        }

        let (nonce, limit, price) = self.wallet(wallet)?.replaceable(transfer)?;
        let price = doubled(price)?;
        let address = self.account.primary_address();
        let native_id = self.native_wallet();
        let native = self.wallet_mut(native_id)?;
        let cancel = native.insert_originating(address, Amount::Ether(Ether::ZERO), limit, price, Some(nonce));
        rebalance(native);

        let source = self.wallet_mut(wallet)?;
        source.mark_replaced(transfer)?;
        rebalance(source);
        tracing::debug!(%wallet, %transfer, %cancel, nonce, "created cancel transfer for token transfer");
        Ok((native_id, cancel))
    }

    /// Resend a pending transfer at a higher gas price; see
    /// [`Wallet::create_transfer_to_replace`].
    pub fn create_transfer_to_replace(
        &mut self,
        wallet: WalletId,
        transfer: TransferId,
        gas_price: Option<GasPrice>,
    ) -> Result<TransferId, WalletError> {
        let wallet = self.wallet_mut(wallet)?;
        let replacement = wallet.create_transfer_to_replace(transfer, gas_price)?;
        rebalance(wallet);
        Ok(replacement)
    }

    // ── Announcements ───────────────────────────────────────────────────

    /// A transaction touching the primary address was observed.
    ///
    /// Returns the ether-wallet transfer it became the basis of, or `None`
    /// when the transaction does not concern this account.
    pub fn announce_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Option<(WalletId, TransferId)>, WalletError> {
        let address = self.account.primary_address();
        if transaction.source() != address && transaction.target() != address {
            tracing::debug!(source = %transaction.source(), "ignored unrelated transaction");
            return Ok(None);
        }
        let hash = transaction.hash().ok_or(TransactionError::NotSigned)?;

        if transaction.source() == address {
            if let Some(nonce) = transaction.nonce() {
                self.account.set_nonce(&address, nonce.saturating_add(1), false);
            }
        }

        // Token transfers sent from here follow the carrying transaction
        // until their log arrives.
        let status = transaction.status().clone();
        for wallet in self.wallets.values_mut().filter(|w| !w.is_native()) {
            let ids = wallet.transfer_ids_for_transaction(&hash);
            for id in &ids {
                wallet.transfer_mut(*id)?.status_update(status.clone());
            }
            if !ids.is_empty() {
                wallet.sort_transfers();
                rebalance(wallet);
            }
        }

        let wallet_id = self.native_wallet();
        let wallet = self.wallet_mut(wallet_id)?;
        let existing = wallet
            .transfer_by_identifier(&hash)
            .or_else(|| wallet.transfer_by_originating_hash(&hash))
            .map(Transfer::id);

        let transfer_id = match existing {
            Some(id) => {
                wallet.transfer_mut(id)?.set_basis_transaction(transaction);
                id
            }
            None => {
                let id = wallet.next_transfer_id();
                tracing::debug!(%id, hash = %hash, "new transfer from transaction");
                wallet.handle_transfer(Transfer::with_transaction(id, transaction));
                id
            }
        };
        wallet.sort_transfers();
        rebalance(wallet);
        Ok(Some((wallet_id, transfer_id)))
    }

    /// An ERC20 `Transfer` log was observed.
    ///
    /// Logs that are not token transfers, do not involve the primary address,
    /// or come from an unregistered token are ignored.
    pub fn announce_log(&mut self, log: Log) -> Result<Option<(WalletId, TransferId)>, WalletError> {
        let Some((from, to)) = log.transfer_parties() else {
            tracing::warn!(address = %log.address(), topics = log.topics().len(), "ignored non-transfer log");
            return Ok(None);
        };
        let address = self.account.primary_address();
        if from != address && to != address {
            return Ok(None);
        }
        let Some(token) = self.tokens.lookup(&log.address()) else {
            tracing::warn!(address = %log.address(), "ignored log for unknown token");
            return Ok(None);
        };
        let identifier = log
            .hash()
            .ok_or_else(|| WalletError::MalformedLog("log has no transaction identifier".into()))?;
        let transaction_hash = log.identifier().map(|id| id.transaction_hash);

        let wallet_id = self.wallet_holding_token(&token.address)?;
        let wallet = self.wallet_mut(wallet_id)?;
        let existing = wallet
            .transfer_by_identifier(&identifier)
            .or_else(|| {
                transaction_hash.and_then(|hash| wallet.transfer_by_originating_hash(&hash))
            })
            .map(Transfer::id);

        let transfer_id = match existing {
            Some(id) => {
                wallet.transfer_mut(id)?.set_basis_log(log);
                id
            }
            None => {
                let id = wallet.next_transfer_id();
                tracing::debug!(%id, log = %identifier, "new transfer from log");
                wallet.handle_transfer(Transfer::with_log(id, log, token)?);
                id
            }
        };
        wallet.sort_transfers();
        rebalance(wallet);
        Ok(Some((wallet_id, transfer_id)))
    }

    /// New status for the transaction `hash`, applied to every transfer it carries.
    pub fn announce_transaction_status(
        &mut self,
        hash: &Hash,
        status: TransactionStatus,
    ) -> Result<(), WalletError> {
        let mut found = false;
        for wallet in self.wallets.values_mut() {
            let ids = wallet.transfer_ids_for_transaction(hash);
            for id in &ids {
                wallet.transfer_mut(*id)?.status_update(status.clone());
            }
            if !ids.is_empty() {
                found = true;
                wallet.sort_transfers();
                rebalance(wallet);
            }
        }
        if found {
            Ok(())
        } else {
            Err(WalletError::UnknownTransaction(*hash))
        }
    }

    /// The network accepted a submission and reported `hash` for it.
    pub fn announce_submitted(
        &mut self,
        wallet: WalletId,
        transfer: TransferId,
        hash: &Hash,
    ) -> Result<(), WalletError> {
        let transfer = self.wallet_mut(wallet)?.transfer_mut(transfer)?;
        let expected = transfer
            .originating_transaction_hash()
            .ok_or(TransactionError::NotSigned)?;
        if expected != *hash {
            return Err(WalletError::TransactionHashMismatch {
                expected,
                actual: *hash,
            });
        }
        transfer.status_update(TransactionStatus::Pending);
        Ok(())
    }

    pub fn announce_gas_estimate(
        &mut self,
        wallet: WalletId,
        transfer: TransferId,
        estimate: Gas,
    ) -> Result<(), WalletError> {
        self.wallet_mut(wallet)?
            .transfer_mut(transfer)?
            .set_gas_estimate(estimate);
        Ok(())
    }

    /// The chain reports `nonce` as the next nonce for `address`.
    pub fn announce_nonce(&mut self, address: &Address, nonce: u64) -> Result<(), WalletError> {
        if !self.account.has_address(address) {
            return Err(WalletError::UnknownAccount(*address));
        }
        self.account.set_nonce(address, nonce, false);
        Ok(())
    }

    /// `(address, nonce)` pairs awaiting confirmation across all wallets.
    pub fn pending_nonces(&self) -> Vec<(Address, u64)> {
        let mut nonces: Vec<_> = self.wallets.values().flat_map(Wallet::pending_nonces).collect();
        nonces.sort_unstable();
        nonces.dedup();
        nonces
    }
}

/// Recompute a balance after an observation. Underflow is logged and the
/// previous balance kept, since the missing transfers may still arrive.
fn rebalance(wallet: &mut Wallet) {
    if let Err(error) = wallet.update_balance() {
        tracing::warn!(id = %wallet.id(), %error, "balance not updated");
    }
}
