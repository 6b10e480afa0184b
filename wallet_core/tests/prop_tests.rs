use proptest::prelude::*;

use ewm_transactions::{Inclusion, TokenRegistry, Transaction, TransactionStatus};
use ewm_types::{Address, Amount, Ether, EtherUnit, Gas, GasPrice, Hash, Network, PrivateKey, U256};
use ewm_wallet_core::{
    Account, Transfer, TransferId, TransferStatus, Wallet, WalletId, WalletManager,
};

fn key() -> PrivateKey {
    ewm_crypto::private_key_from_hex(&"46".repeat(32)).unwrap()
}

fn gas_price() -> GasPrice {
    GasPrice::from_number(1, EtherUnit::Gwei).unwrap()
}

fn status(code: u8, block: u64) -> TransactionStatus {
    match code % 5 {
        0 => TransactionStatus::Unknown,
        1 => TransactionStatus::Queued,
        2 => TransactionStatus::Pending,
        3 => TransactionStatus::Included(Inclusion {
            block_hash: Hash::keccak(&block.to_be_bytes()),
            block_number: block,
            transaction_index: 0,
            block_timestamp: 0,
            gas_used: Gas::new(21_000),
        }),
        _ => TransactionStatus::from_rejection("nonce too low"),
    }
}

/// (value in gwei, outgoing, status code, block)
type Shape = (u64, bool, u8, u64);

fn build(wallet: &Wallet, index: usize, (value, outgoing, code, block): Shape) -> Transfer {
    let other = Address::new([0x99; 20]);
    let (source, target) = if outgoing {
        (wallet.address(), other)
    } else {
        (other, wallet.address())
    };
    let mut transaction = Transaction::new(
        source,
        target,
        Ether::from_number(value, EtherUnit::Gwei).unwrap(),
        gas_price(),
        Gas::new(21_000),
        Vec::new(),
        Some(index as u64),
    );
    transaction.set_status(status(code, block));
    Transfer::with_transaction(TransferId(index as u64), transaction)
}

fn expected_balance(shapes: &[Shape]) -> Option<u128> {
    let gwei = 1_000_000_000u128;
    let fee = 21_000 * gwei;
    let mut received = 0u128;
    let mut spent = 0u128;
    for (value, outgoing, code, _) in shapes {
        if code % 5 == 4 {
            continue;
        }
        if *outgoing {
            spent += *value as u128 * gwei + fee;
        } else {
            received += *value as u128 * gwei;
        }
    }
    received.checked_sub(spent)
}

fn balance_of(shapes: &[Shape]) -> Option<u128> {
    let account = Account::from_private_key(&key()).unwrap();
    let mut wallet = Wallet::new_native(
        WalletId(0),
        account.primary_address(),
        Network::Mainnet,
        gas_price(),
    );
    let transfers: Vec<_> = shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| build(&wallet, i, *shape))
        .collect();
    for transfer in transfers {
        wallet.handle_transfer(transfer);
    }
    wallet.update_balance().ok().map(|amount| {
        amount
            .raw_value()
            .as_u128()
            .unwrap_or(u128::MAX)
    })
}

/// Signed transactions as the network would report them, one per shape.
fn observations(address: Address, shapes: &[Shape]) -> Vec<Transaction> {
    shapes
        .iter()
        .enumerate()
        .map(|(index, (value, outgoing, code, block))| {
            let (signer, target) = if *outgoing {
                (key(), Address::new([0x99; 20]))
            } else {
                (ewm_crypto::private_key_from_hex(&"47".repeat(32)).unwrap(), address)
            };
            let mut transaction = Transaction::new(
                ewm_crypto::address_from_private(&signer).unwrap(),
                target,
                Ether::from_number(*value, EtherUnit::Gwei).unwrap(),
                gas_price(),
                Gas::new(21_000),
                Vec::new(),
                Some(index as u64),
            );
            transaction.sign(Network::Mainnet, &signer).unwrap();
            transaction.set_status(status(*code, *block));
            transaction
        })
        .collect()
}

type Snapshot = Vec<(WalletId, Vec<(TransferId, TransferStatus, TransactionStatus)>, Amount)>;

fn snapshot(manager: &WalletManager) -> Snapshot {
    manager
        .wallets()
        .map(|wallet| {
            let transfers = wallet
                .transfers()
                .iter()
                .map(|t| (t.id(), t.status(), t.transaction_status().clone()))
                .collect();
            (wallet.id(), transfers, wallet.balance().clone())
        })
        .collect()
}

fn shape() -> impl Strategy<Value = Shape> {
    (0u64..1_000_000, any::<bool>(), 0u8..5, 0u64..1_000)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Balance depends only on the set of transfers, never on their order.
    #[test]
    fn balance_is_order_independent(
        (shapes, shuffled) in proptest::collection::vec(shape(), 0..12)
            .prop_flat_map(|shapes| (Just(shapes.clone()), Just(shapes).prop_shuffle()))
    ) {
        let expected = expected_balance(&shapes);
        prop_assert_eq!(balance_of(&shapes), expected);
        prop_assert_eq!(balance_of(&shuffled), expected);
    }

    /// A transfer never leaves included or errored once there.
    #[test]
    fn status_is_monotonic(codes in proptest::collection::vec(0u8..5, 1..20)) {
        let account = Account::from_private_key(&key()).unwrap();
        let wallet = Wallet::new_native(WalletId(0), account.primary_address(), Network::Mainnet, gas_price());
        let mut transfer = build(&wallet, 0, (1, true, 0, 0));
        let mut reached_final = false;
        for (i, code) in codes.into_iter().enumerate() {
            transfer.status_update(status(code, i as u64));
            if reached_final {
                prop_assert!(transfer.status().is_final());
            }
            reached_final |= transfer.status().is_final();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Redelivering every observation, in any order and alongside stale
    /// pending reports for finished transactions, leaves the session as the
    /// first delivery left it.
    #[test]
    fn redelivery_leaves_session_unchanged(
        (shapes, order) in proptest::collection::vec(shape(), 1..8).prop_flat_map(|shapes| {
            let indices: Vec<usize> = (0..shapes.len()).collect();
            (Just(shapes), Just(indices).prop_shuffle())
        })
    ) {
        let account = Account::from_private_key(&key()).unwrap();
        let address = account.primary_address();
        let mut manager = WalletManager::new(account, Network::Mainnet, TokenRegistry::new(), gas_price());
        let observed = observations(address, &shapes);
        for transaction in &observed {
            prop_assert!(manager.announce_transaction(transaction.clone()).unwrap().is_some());
        }
        let first = snapshot(&manager);

        for index in order {
            let transaction = &observed[index];
            let hash = transaction.hash().unwrap();
            let status = transaction.status();
            if status.is_included() || status.is_errored() {
                let mut stale = transaction.clone();
                stale.set_status(TransactionStatus::Pending);
                manager.announce_transaction(stale).unwrap();
                manager.announce_transaction_status(&hash, TransactionStatus::Pending).unwrap();
            }
            manager.announce_transaction(transaction.clone()).unwrap();
            manager.announce_transaction_status(&hash, transaction.status().clone()).unwrap();
        }
        prop_assert_eq!(snapshot(&manager), first);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Sequential signing assigns strictly increasing nonces from the account table.
    #[test]
    fn signing_assigns_increasing_nonces(count in 1usize..6, start in 0u64..1_000) {
        let key = key();
        let mut account = Account::from_private_key(&key).unwrap();
        let address = account.primary_address();
        account.set_nonce(&address, start, true);

        let mut wallet = Wallet::new_native(WalletId(0), address, Network::Ropsten, gas_price());
        let mut nonces = Vec::new();
        for i in 0..count {
            let id = wallet
                .create_transfer(
                    Address::new([i as u8; 20]),
                    Amount::Ether(Ether::from_wei(U256::from_u64(i as u64 + 1))),
                )
                .unwrap();
            wallet.sign_transfer_with_private_key(&mut account, id, &key).unwrap();
            nonces.push(wallet.transfer(id).unwrap().nonce().unwrap());
        }
        let expected: Vec<u64> = (start..start + count as u64).collect();
        prop_assert_eq!(nonces, expected);
        prop_assert_eq!(account.nonce(&address), start + count as u64);
        prop_assert!(wallet.transfers().iter().all(|t| t.status() == TransferStatus::Created));
    }
}
