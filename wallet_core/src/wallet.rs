//! Per-address ledger for one currency.
//!
//! A wallet holds either ether or a single ERC20 token for the account's
//! primary address. It owns the transfers touching that address, kept ordered
//! by confirmation progress, and recomputes its balance from them.

use std::fmt;
use std::sync::Arc;

use ewm_types::{
    Address, Amount, Ether, FeeBasis, Gas, GasPrice, Hash, Network, PrivateKey, Token,
    TokenQuantity, U256,
};

use crate::account::{Account, PRIMARY_INDEX};
use crate::error::WalletError;
use crate::transfer::{Transfer, TransferId, TransferStatus};

/// Session-local handle for a wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletId(pub u32);

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wallet-{}", self.0)
    }
}

pub struct Wallet {
    id: WalletId,
    address: Address,
    network: Network,
    token: Option<Arc<Token>>,
    default_gas_limit: Gas,
    default_gas_price: GasPrice,
    balance: Amount,
    transfers: Vec<Transfer>,
    next_transfer: u64,
}

impl Wallet {
    /// An ether wallet with a fallback gas price.
    pub fn new_native(id: WalletId, address: Address, network: Network, gas_price: GasPrice) -> Self {
        tracing::info!(%id, %address, network = network.as_str(), "created ether wallet");
        Self {
            id,
            address,
            network,
            token: None,
            default_gas_limit: Gas::NATIVE_TRANSFER,
            default_gas_price: gas_price,
            balance: Amount::Ether(Ether::ZERO),
            transfers: Vec::new(),
            next_transfer: 0,
        }
    }

    /// A token wallet using the token's configured gas defaults.
    pub fn new_token(id: WalletId, address: Address, network: Network, token: Arc<Token>) -> Self {
        tracing::info!(%id, %address, symbol = %token.symbol, "created token wallet");
        Self {
            id,
            address,
            network,
            default_gas_limit: token.default_gas_limit,
            default_gas_price: token.default_gas_price,
            balance: Amount::Token(TokenQuantity::new(token.clone(), U256::ZERO)),
            token: Some(token),
            transfers: Vec::new(),
            next_transfer: 0,
        }
    }

    pub fn id(&self) -> WalletId {
        self.id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The token held, or `None` for the ether wallet.
    pub fn token(&self) -> Option<&Arc<Token>> {
        self.token.as_ref()
    }

    pub fn is_native(&self) -> bool {
        self.token.is_none()
    }

    pub fn balance(&self) -> &Amount {
        &self.balance
    }

    // ── Gas defaults ────────────────────────────────────────────────────

    pub fn default_gas_limit(&self) -> Gas {
        self.default_gas_limit
    }

    pub fn set_default_gas_limit(&mut self, limit: Gas) {
        self.default_gas_limit = limit;
    }

    pub fn default_gas_price(&self) -> GasPrice {
        self.default_gas_price
    }

    pub fn set_default_gas_price(&mut self, price: GasPrice) {
        self.default_gas_price = price;
    }

    /// Fee for moving `amount` at the default price.
    pub fn estimate_fee(&self, amount: &Amount) -> Result<Ether, WalletError> {
        self.check_currency(amount)?;
        Ok(self.default_gas_price.cost_of(amount.gas_estimate())?)
    }

    fn check_currency(&self, amount: &Amount) -> Result<(), WalletError> {
        let matches = match (&self.token, amount.token()) {
            (None, None) => true,
            (Some(held), Some(moved)) => held.address == moved.address,
            _ => false,
        };
        if matches {
            Ok(())
        } else {
            Err(WalletError::CurrencyMismatch)
        }
    }

    // ── Transfer creation ───────────────────────────────────────────────

    /// Create a transfer from this wallet using the default gas policy.
    pub fn create_transfer(&mut self, target: Address, amount: Amount) -> Result<TransferId, WalletError> {
        self.create_transfer_with_fee_basis(target, amount, FeeBasis::None)
    }

    /// Create a transfer with an explicit fee basis. [`FeeBasis::None`] falls
    /// back to the wallet defaults.
    pub fn create_transfer_with_fee_basis(
        &mut self,
        target: Address,
        amount: Amount,
        fee_basis: FeeBasis,
    ) -> Result<TransferId, WalletError> {
        self.check_currency(&amount)?;
        let (limit, price) = match fee_basis {
            FeeBasis::Gas { limit, price } => (limit, price),
            FeeBasis::None => (self.default_gas_limit, self.default_gas_price),
        };
        Ok(self.insert_originating(target, amount, limit, price, None))
    }

    pub(crate) fn insert_originating(
        &mut self,
        target: Address,
        amount: Amount,
        limit: Gas,
        price: GasPrice,
        nonce: Option<u64>,
    ) -> TransferId {
        let id = self.next_transfer_id();
        let transfer = Transfer::new_originating(id, self.address, target, amount, limit, price, nonce);
        self.handle_transfer(transfer);
        id
    }

    pub(crate) fn next_transfer_id(&mut self) -> TransferId {
        let id = TransferId(self.next_transfer);
        self.next_transfer += 1;
        id
    }

    // ── Cancel and replace ──────────────────────────────────────────────

    /// A transfer can be replaced once it was created here with a nonce and
    /// until it is included, errored or already replaced.
    pub fn can_replace_transfer(&self, id: TransferId) -> Result<bool, WalletError> {
        let transfer = self.transfer(id)?;
        Ok(transfer.originating_transaction().is_some()
            && transfer.nonce().is_some()
            && !transfer.status().is_final()
            && transfer.status() != TransferStatus::Replaced)
    }

    /// Cancelling has the same preconditions as replacing.
    pub fn can_cancel_transfer(&self, id: TransferId) -> Result<bool, WalletError> {
        self.can_replace_transfer(id)
    }

    /// `(nonce, gas limit, gas price)` of a replaceable transfer.
    pub(crate) fn replaceable(&self, id: TransferId) -> Result<(u64, Gas, GasPrice), WalletError> {
        if !self.can_replace_transfer(id)? {
            return Err(WalletError::NotReplaceable(id));
        }
        let transaction = self
            .transfer(id)?
            .originating_transaction()
            .ok_or(WalletError::NotOriginating(id))?;
        let nonce = transaction
            .nonce()
            .ok_or(ewm_transactions::TransactionError::NonceUnassigned)?;
        Ok((nonce, transaction.gas_limit(), transaction.gas_price()))
    }

    pub(crate) fn mark_replaced(&mut self, id: TransferId) -> Result<(), WalletError> {
        self.transfer_mut(id)?.mark_replaced();
        Ok(())
    }

    /// Cancel an ether transfer: zero ether to ourselves with the same nonce
    /// and gas limit at twice the gas price. The old transfer becomes
    /// replaced.
    pub fn create_transfer_to_cancel(&mut self, id: TransferId) -> Result<TransferId, WalletError> {
        if !self.is_native() {
            return Err(WalletError::CurrencyMismatch);
        }
        let (nonce, limit, price) = self.replaceable(id)?;
        let price = doubled(price)?;
        let cancel = self.insert_originating(self.address, Amount::Ether(Ether::ZERO), limit, price, Some(nonce));
        self.mark_replaced(id)?;
        tracing::debug!(%id, %cancel, nonce, "created cancel transfer");
        Ok(cancel)
    }

    /// Resend a transfer with the same nonce, target and amount at a higher
    /// gas price: `gas_price` when given, otherwise twice the old price.
    pub fn create_transfer_to_replace(
        &mut self,
        id: TransferId,
        gas_price: Option<GasPrice>,
    ) -> Result<TransferId, WalletError> {
        let (nonce, limit, old_price) = self.replaceable(id)?;
        let price = match gas_price {
            Some(price) if price > old_price => price,
            Some(_) => return Err(WalletError::NotReplaceable(id)),
            None => doubled(old_price)?,
        };
        let old = self.transfer(id)?;
        let (target, amount) = (old.target(), old.amount().clone());
        let replacement = self.insert_originating(target, amount, limit, price, Some(nonce));
        self.mark_replaced(id)?;
        tracing::debug!(%id, %replacement, nonce, "created replacement transfer");
        Ok(replacement)
    }

    // ── Signing ─────────────────────────────────────────────────────────

    /// Sign with the primary key derived from `phrase`.
    pub fn sign_transfer_with_phrase(
        &mut self,
        account: &mut Account,
        id: TransferId,
        phrase: &str,
    ) -> Result<Hash, WalletError> {
        let key = account.private_key_for(phrase, PRIMARY_INDEX)?;
        self.sign_transfer_with_private_key(account, id, &key)
    }

    /// Sign with a raw key. An unassigned nonce is taken from the account's
    /// nonce table first.
    pub fn sign_transfer_with_private_key(
        &mut self,
        account: &mut Account,
        id: TransferId,
        key: &PrivateKey,
    ) -> Result<Hash, WalletError> {
        let signer = ewm_crypto::address_from_private(key)?;
        if signer != self.address {
            return Err(WalletError::UnknownAccount(signer));
        }

        let network = self.network;
        let address = self.address;
        let transfer = self.transfer_mut(id)?;
        if transfer.originating_transaction().is_none() {
            return Err(WalletError::NotOriginating(id));
        }
        if transfer.nonce().is_none() {
            let nonce = account.nonce_get_then_increment(&address);
            transfer.assign_nonce(nonce)?;
        }
        let hash = transfer.sign(network, key)?;
        tracing::debug!(%id, hash = %hash, nonce = transfer.nonce(), "signed transfer");
        Ok(hash)
    }

    /// Signed encoding of a transfer's originating transaction, for submission.
    pub fn raw_transaction(&self, id: TransferId) -> Result<Vec<u8>, WalletError> {
        let transfer = self.transfer(id)?;
        let transaction = transfer
            .originating_transaction()
            .ok_or(WalletError::NotOriginating(id))?;
        Ok(transaction.encode(self.network, ewm_transactions::RlpKind::Signed)?)
    }

    // ── Transfer set ────────────────────────────────────────────────────

    /// Insert in order, scanning from the newest end.
    pub fn handle_transfer(&mut self, transfer: Transfer) {
        let position = self
            .transfers
            .iter()
            .rposition(|existing| existing.compare(&transfer).is_le())
            .map_or(0, |index| index + 1);
        self.transfers.insert(position, transfer);
    }

    pub fn unhandle_transfer(&mut self, id: TransferId) -> Option<Transfer> {
        let index = self.transfers.iter().position(|t| t.id() == id)?;
        Some(self.transfers.remove(index))
    }

    pub fn has_transfer(&self, id: TransferId) -> bool {
        self.transfers.iter().any(|t| t.id() == id)
    }

    pub fn transfer(&self, id: TransferId) -> Result<&Transfer, WalletError> {
        self.transfers
            .iter()
            .find(|t| t.id() == id)
            .ok_or(WalletError::UnknownTransfer(id))
    }

    pub(crate) fn transfer_mut(&mut self, id: TransferId) -> Result<&mut Transfer, WalletError> {
        self.transfers
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(WalletError::UnknownTransfer(id))
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    pub fn transfer_at(&self, index: usize) -> Option<&Transfer> {
        self.transfers.get(index)
    }

    pub fn transfer_by_identifier(&self, hash: &Hash) -> Option<&Transfer> {
        self.transfers.iter().find(|t| t.identifier().as_ref() == Some(hash))
    }

    pub fn transfer_by_originating_hash(&self, hash: &Hash) -> Option<&Transfer> {
        self.transfers
            .iter()
            .find(|t| t.originating_transaction_hash().as_ref() == Some(hash))
    }

    /// Transfers carried by transaction `hash`, either as basis or as originator.
    pub(crate) fn transfer_ids_for_transaction(&self, hash: &Hash) -> Vec<TransferId> {
        self.transfers
            .iter()
            .filter(|t| {
                t.transaction_hash().as_ref() == Some(hash)
                    || t.originating_transaction_hash().as_ref() == Some(hash)
            })
            .map(Transfer::id)
            .collect()
    }

    pub fn transfer_by_nonce(&self, source: &Address, nonce: u64) -> Option<&Transfer> {
        self.transfers
            .iter()
            .find(|t| t.source() == *source && t.nonce() == Some(nonce))
    }

    /// Restore ordering after statuses change.
    pub(crate) fn sort_transfers(&mut self) {
        self.transfers.sort_by(Transfer::compare);
    }

    /// `(address, nonce)` of locally created transfers not yet confirmed.
    pub fn pending_nonces(&self) -> Vec<(Address, u64)> {
        self.transfers
            .iter()
            .filter(|t| t.originating_transaction().is_some())
            .filter(|t| matches!(t.status(), TransferStatus::Created | TransferStatus::Submitted))
            .filter_map(|t| t.nonce().map(|nonce| (t.source(), nonce)))
            .collect()
    }

    // ── Balance ─────────────────────────────────────────────────────────

    /// Recompute the balance as received − sent (− fees, ether wallets only).
    ///
    /// Errored and replaced transfers are skipped. On underflow the previous balance is
    /// kept and the error returned.
    pub fn update_balance(&mut self) -> Result<&Amount, WalletError> {
        let mut received = U256::ZERO;
        let mut sent = U256::ZERO;
        let mut fees = U256::ZERO;

        for transfer in &self.transfers {
            if matches!(transfer.status(), TransferStatus::Errored | TransferStatus::Replaced) {
                continue;
            }
            let value = transfer.amount().raw_value();
            if transfer.source() == self.address {
                sent = sent.checked_add(value)?;
                if self.is_native() {
                    fees = fees.checked_add(transfer.fee()?.wei())?;
                }
            } else {
                received = received.checked_add(value)?;
            }
        }

        let balance = received
            .checked_sub(sent)
            .and_then(|net| net.checked_sub(fees))
            .map_err(|e| {
                tracing::warn!(id = %self.id, %received, %sent, %fees, "balance underflow");
                e
            })?;

        self.balance = match &self.token {
            None => Amount::Ether(Ether::from_wei(balance)),
            Some(token) => Amount::Token(TokenQuantity::new(token.clone(), balance)),
        };
        tracing::debug!(id = %self.id, balance = %self.balance, "updated balance");
        Ok(&self.balance)
    }
}

pub(crate) fn doubled(price: GasPrice) -> Result<GasPrice, WalletError> {
    Ok(GasPrice::new(price.ether().checked_add(price.ether())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ewm_transactions::{Inclusion, Transaction, TransactionStatus};
    use ewm_types::EtherUnit;

    const PAPER_KEY: &str =
        "army van defense carry jealous true garbage claim echo media make crunch";

    fn ether(value: u64) -> Amount {
        Amount::Ether(Ether::from_number(value, EtherUnit::Ether).unwrap())
    }

    fn setup() -> (Account, Wallet) {
        let account = Account::from_phrase(PAPER_KEY).unwrap();
        let wallet = Wallet::new_native(
            WalletId(0),
            account.primary_address(),
            Network::Mainnet,
            GasPrice::from_number(2, EtherUnit::Gwei).unwrap(),
        );
        (account, wallet)
    }

    fn incoming(wallet: &Wallet, value: u64, block: u64) -> Transfer {
        let mut transaction = Transaction::new(
            Address::new([0x77; 20]),
            wallet.address(),
            Ether::from_number(value, EtherUnit::Ether).unwrap(),
            GasPrice::from_number(2, EtherUnit::Gwei).unwrap(),
            Gas::new(21_000),
            Vec::new(),
            Some(block),
        );
        transaction.set_status(TransactionStatus::Included(Inclusion {
            block_hash: Hash::keccak(&block.to_be_bytes()),
            block_number: block,
            transaction_index: 0,
            block_timestamp: 0,
            gas_used: Gas::new(21_000),
        }));
        Transfer::with_transaction(TransferId(1_000 + block), transaction)
    }

    #[test]
    fn create_uses_default_gas_policy() {
        let (_, mut wallet) = setup();
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        let transfer = wallet.transfer(id).unwrap();
        assert_eq!(transfer.fee_basis().limit(), Some(Gas::NATIVE_TRANSFER));
        assert_eq!(transfer.status(), TransferStatus::Created);
        assert_eq!(transfer.nonce(), None);
        assert!(wallet.has_transfer(id));
    }

    #[test]
    fn sign_assigns_increasing_nonces() {
        let (mut account, mut wallet) = setup();
        let first = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        let second = wallet.create_transfer(Address::new([2; 20]), ether(2)).unwrap();

        let h1 = wallet.sign_transfer_with_phrase(&mut account, first, PAPER_KEY).unwrap();
        let h2 = wallet.sign_transfer_with_phrase(&mut account, second, PAPER_KEY).unwrap();
        assert_ne!(h1, h2);
        assert_eq!(wallet.transfer(first).unwrap().nonce(), Some(0));
        assert_eq!(wallet.transfer(second).unwrap().nonce(), Some(1));
        assert_eq!(account.nonce(&wallet.address()), 2);
        assert_eq!(
            wallet.pending_nonces(),
            vec![(wallet.address(), 0), (wallet.address(), 1)]
        );
    }

    #[test]
    fn raw_transaction_decodes_to_the_same_source() {
        let (mut account, mut wallet) = setup();
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        wallet.sign_transfer_with_phrase(&mut account, id, PAPER_KEY).unwrap();
        let raw = wallet.raw_transaction(id).unwrap();
        let decoded =
            Transaction::decode(&raw, Network::Mainnet, ewm_transactions::RlpKind::Signed).unwrap();
        assert_eq!(decoded.source(), wallet.address());
        assert_eq!(decoded.hash(), wallet.transfer(id).unwrap().originating_transaction_hash());
    }

    #[test]
    fn signing_with_another_key_fails() {
        let (mut account, mut wallet) = setup();
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        let other = ewm_crypto::generate_private_key().unwrap();
        assert!(matches!(
            wallet.sign_transfer_with_private_key(&mut account, id, &other),
            Err(WalletError::UnknownAccount(_))
        ));
        assert_eq!(wallet.transfer(id).unwrap().nonce(), None);
    }

    #[test]
    fn currency_must_match() {
        let (_, mut wallet) = setup();
        let token = Arc::new(Token {
            address: Address::new([9; 20]),
            symbol: "TOK".into(),
            name: "Token".into(),
            description: String::new(),
            decimals: 6,
            default_gas_limit: Gas::new(60_000),
            default_gas_price: GasPrice::from_number(1, EtherUnit::Gwei).unwrap(),
        });
        let amount = Amount::Token(TokenQuantity::new(token, U256::ONE));
        assert!(matches!(
            wallet.create_transfer(Address::ZERO, amount),
            Err(WalletError::CurrencyMismatch)
        ));
    }

    #[test]
    fn balance_nets_sent_received_and_fees() {
        let (mut account, mut wallet) = setup();
        wallet.handle_transfer(incoming(&wallet, 3, 1));
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        wallet.sign_transfer_with_phrase(&mut account, id, PAPER_KEY).unwrap();

        wallet.update_balance().unwrap();
        let fee = Ether::from_number(42_000, EtherUnit::Gwei).unwrap();
        let expected = Ether::from_number(2, EtherUnit::Ether)
            .unwrap()
            .checked_sub(fee)
            .unwrap();
        assert_eq!(wallet.balance(), &Amount::Ether(expected));
    }

    #[test]
    fn errored_transfers_do_not_count() {
        let (_, mut wallet) = setup();
        wallet.handle_transfer(incoming(&wallet, 3, 1));
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        wallet
            .transfer_mut(id)
            .unwrap()
            .status_update(TransactionStatus::from_rejection("insufficient funds"));
        wallet.update_balance().unwrap();
        assert_eq!(wallet.balance(), &ether(3));
    }

    #[test]
    fn balance_underflow_keeps_previous_value() {
        let (_, mut wallet) = setup();
        wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        assert!(matches!(
            wallet.update_balance(),
            Err(WalletError::Numeric(ewm_types::NumericError::Underflow))
        ));
        assert_eq!(wallet.balance(), &Amount::Ether(Ether::ZERO));
    }

    #[test]
    fn transfers_stay_ordered() {
        let (_, mut wallet) = setup();
        let pending = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        wallet.handle_transfer(incoming(&wallet, 1, 9));
        wallet.handle_transfer(incoming(&wallet, 1, 4));
        let blocks: Vec<_> = wallet
            .transfers()
            .iter()
            .map(|t| t.transaction_status().inclusion().map(|i| i.block_number))
            .collect();
        assert_eq!(blocks, vec![Some(4), Some(9), None]);
        assert_eq!(wallet.transfer_at(2).map(Transfer::id), Some(pending));
    }

    #[test]
    fn lookups() {
        let (mut account, mut wallet) = setup();
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        let hash = wallet.sign_transfer_with_phrase(&mut account, id, PAPER_KEY).unwrap();
        assert_eq!(wallet.transfer_by_originating_hash(&hash).map(Transfer::id), Some(id));
        assert!(wallet.transfer_by_identifier(&hash).is_none());
        assert_eq!(
            wallet.transfer_by_nonce(&wallet.address(), 0).map(Transfer::id),
            Some(id)
        );
        assert!(wallet.unhandle_transfer(id).is_some());
        assert!(!wallet.has_transfer(id));
    }

    #[test]
    fn fee_estimate_uses_default_price() {
        let (_, wallet) = setup();
        assert_eq!(
            wallet.estimate_fee(&ether(1)).unwrap(),
            Ether::from_number(42_000, EtherUnit::Gwei).unwrap()
        );
        let token = Arc::new(Token {
            address: Address::new([9; 20]),
            symbol: "TOK".into(),
            name: "Token".into(),
            description: String::new(),
            decimals: 6,
            default_gas_limit: Gas::new(60_000),
            default_gas_price: GasPrice::from_number(1, EtherUnit::Gwei).unwrap(),
        });
        let amount = Amount::Token(TokenQuantity::new(token, U256::ONE));
        assert!(matches!(wallet.estimate_fee(&amount), Err(WalletError::CurrencyMismatch)));
    }

    #[test]
    fn only_signed_pending_transfers_are_replaceable() {
        let (mut account, mut wallet) = setup();
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        assert!(!wallet.can_replace_transfer(id).unwrap());
        assert!(matches!(
            wallet.create_transfer_to_cancel(id),
            Err(WalletError::NotReplaceable(_))
        ));

        wallet.sign_transfer_with_phrase(&mut account, id, PAPER_KEY).unwrap();
        assert!(wallet.can_cancel_transfer(id).unwrap());

        let received = incoming(&wallet, 1, 3);
        let received_id = received.id();
        wallet.handle_transfer(received);
        assert!(!wallet.can_replace_transfer(received_id).unwrap());
    }

    #[test]
    fn replacement_keeps_nonce_and_raises_price() {
        let (mut account, mut wallet) = setup();
        wallet.handle_transfer(incoming(&wallet, 3, 1));
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        wallet.sign_transfer_with_phrase(&mut account, id, PAPER_KEY).unwrap();

        let same = GasPrice::from_number(2, EtherUnit::Gwei).unwrap();
        assert!(matches!(
            wallet.create_transfer_to_replace(id, Some(same)),
            Err(WalletError::NotReplaceable(_))
        ));

        let replacement = wallet.create_transfer_to_replace(id, None).unwrap();
        assert_eq!(wallet.transfer(id).unwrap().status(), TransferStatus::Replaced);
        assert!(!wallet.can_replace_transfer(id).unwrap());

        let transfer = wallet.transfer(replacement).unwrap();
        assert_eq!(transfer.nonce(), Some(0));
        assert_eq!(transfer.amount(), &ether(1));
        assert_eq!(transfer.target(), Address::new([2; 20]));
        let transaction = transfer.originating_transaction().unwrap();
        assert_eq!(transaction.gas_price(), GasPrice::from_number(4, EtherUnit::Gwei).unwrap());
        assert_eq!(transaction.gas_limit(), Gas::NATIVE_TRANSFER);

        // The nonce is kept when signing, and only the replacement counts.
        wallet.sign_transfer_with_phrase(&mut account, replacement, PAPER_KEY).unwrap();
        assert_eq!(wallet.transfer(replacement).unwrap().nonce(), Some(0));
        assert_eq!(account.nonce(&wallet.address()), 1);
        wallet.update_balance().unwrap();
        let fee = Ether::from_number(84_000, EtherUnit::Gwei).unwrap();
        let expected = Ether::from_number(2, EtherUnit::Ether)
            .unwrap()
            .checked_sub(fee)
            .unwrap();
        assert_eq!(wallet.balance(), &Amount::Ether(expected));
    }

    #[test]
    fn cancel_sends_nothing_to_self() {
        let (mut account, mut wallet) = setup();
        let id = wallet.create_transfer(Address::new([2; 20]), ether(1)).unwrap();
        wallet.sign_transfer_with_phrase(&mut account, id, PAPER_KEY).unwrap();

        let cancel = wallet.create_transfer_to_cancel(id).unwrap();
        assert_eq!(wallet.transfer(id).unwrap().status(), TransferStatus::Replaced);
        let transfer = wallet.transfer(cancel).unwrap();
        assert_eq!(transfer.target(), wallet.address());
        assert_eq!(transfer.amount(), &Amount::Ether(Ether::ZERO));
        assert_eq!(transfer.nonce(), Some(0));
        assert_eq!(
            transfer.originating_transaction().unwrap().gas_price(),
            GasPrice::from_number(4, EtherUnit::Gwei).unwrap()
        );
        assert!(matches!(
            wallet.create_transfer_to_cancel(id),
            Err(WalletError::NotReplaceable(_))
        ));
    }
}
