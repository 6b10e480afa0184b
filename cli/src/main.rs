//! `ewm`: command-line front end for the wallet engine.
//!
//! Derives account addresses, signs ether and ERC20 transfers into raw
//! transactions ready for submission, and decodes raw transactions.

use anyhow::{anyhow, Context};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;

use ewm_transactions::{decode_erc20_transfer_data, RlpKind, Transaction};
use ewm_types::{Address, Amount, Ether, EtherUnit, Gas, GasPrice, Network, TokenQuantity};
use ewm_utils::LogFormat;
use ewm_wallet_core::{Account, EwmConfig, WalletManager};

#[derive(Parser)]
#[command(name = "ewm", about = "Ethereum wallet engine")]
struct Cli {
    /// Network to sign for: "mainnet", "ropsten" or "rinkeby".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "EWM_NETWORK")]
    network: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "EWM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "EWM_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "EWM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Generate a new 12-word recovery phrase.
    #[command(name = "new-phrase")]
    NewPhrase,

    /// Print the address derived from a recovery phrase.
    Address {
        #[arg(long, env = "EWM_PHRASE", hide_env_values = true)]
        phrase: String,

        /// Child index on m/44'/60'/0'/0.
        #[arg(long, default_value_t = 0)]
        index: u32,
    },

    /// Create and sign a transfer, printing the raw transaction.
    #[command(name = "sign-transfer")]
    SignTransfer {
        #[arg(long, env = "EWM_PHRASE", hide_env_values = true)]
        phrase: String,

        /// Recipient address.
        #[arg(long)]
        to: String,

        /// Decimal amount, e.g. "0.5".
        #[arg(long)]
        amount: String,

        /// Ether unit of `amount`. Ignored for token transfers.
        #[arg(long, default_value = "ether")]
        unit: String,

        /// Symbol of a configured ERC20 token to send instead of ether.
        #[arg(long)]
        token: Option<String>,

        /// Next nonce for the sending address, as reported by the chain.
        #[arg(long)]
        nonce: Option<u64>,

        /// Gas price in GWEI.
        #[arg(long)]
        gas_price_gwei: Option<u64>,

        #[arg(long)]
        gas_limit: Option<u64>,
    },

    /// Decode a raw transaction.
    Decode {
        /// Hex encoding, with or without 0x.
        raw: String,

        #[arg(long, value_enum, default_value_t = Encoding::Signed)]
        kind: Encoding,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Encoding {
    Unsigned,
    Signed,
    Archive,
}

impl From<Encoding> for RlpKind {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Unsigned => RlpKind::Unsigned,
            Encoding::Signed => RlpKind::Signed,
            Encoding::Archive => RlpKind::Archive,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EwmConfig::from_toml_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EwmConfig::default(),
    };
    if let Some(name) = &cli.network {
        config.network = Network::from_name(name).ok_or_else(|| anyhow!("unknown network: {name}"))?;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    let format: LogFormat = config.log_format.parse()?;
    ewm_utils::init_logging(format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::NewPhrase => {
            println!("{}", ewm_crypto::generate_mnemonic()?);
        }
        Command::Address { phrase, index } => {
            let key = ewm_crypto::private_key_from_phrase(&phrase, index)?;
            let address = ewm_crypto::address_from_private(&key)?;
            println!("{}", address.to_checksum_string());
        }
        Command::SignTransfer {
            phrase,
            to,
            amount,
            unit,
            token,
            nonce,
            gas_price_gwei,
            gas_limit,
        } => {
            let output = sign_transfer(
                &config,
                &phrase,
                &to,
                &amount,
                &unit,
                token.as_deref(),
                nonce,
                gas_price_gwei,
                gas_limit,
            )?;
            println!("{output:#}");
        }
        Command::Decode { raw, kind } => {
            let digits = raw.trim().trim_start_matches("0x");
            let bytes = hex::decode(digits).context("raw transaction is not hex")?;
            let transaction = Transaction::decode(&bytes, config.network, kind.into())?;
            println!("{:#}", describe(&transaction));
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sign_transfer(
    config: &EwmConfig,
    phrase: &str,
    to: &str,
    amount: &str,
    unit: &str,
    token: Option<&str>,
    nonce: Option<u64>,
    gas_price_gwei: Option<u64>,
    gas_limit: Option<u64>,
) -> anyhow::Result<serde_json::Value> {
    let account = Account::from_phrase(phrase)?;
    let source = account.primary_address();
    let mut manager = WalletManager::from_config(account, config)?;
    let target: Address = to.parse().with_context(|| format!("invalid recipient: {to}"))?;

    let (wallet, amount) = match token {
        Some(symbol) => {
            let token = manager
                .tokens()
                .lookup_symbol(symbol)
                .ok_or_else(|| anyhow!("token {symbol} is not configured"))?;
            let wallet = manager.wallet_holding_token(&token.address)?;
            (wallet, Amount::Token(TokenQuantity::from_string(token, amount)?))
        }
        None => {
            let unit = EtherUnit::from_name(unit).ok_or_else(|| anyhow!("unknown unit: {unit}"))?;
            (manager.native_wallet(), Amount::Ether(Ether::from_string(amount, unit)?))
        }
    };

    if let Some(gwei) = gas_price_gwei {
        let price = GasPrice::from_number(gwei, EtherUnit::Gwei)?;
        manager.wallet_mut(wallet)?.set_default_gas_price(price);
    }
    if let Some(limit) = gas_limit {
        manager.wallet_mut(wallet)?.set_default_gas_limit(Gas::new(limit));
    }
    if let Some(nonce) = nonce {
        manager.announce_nonce(&source, nonce)?;
    }

    let transfer = manager.create_transfer(wallet, target, amount)?;
    let hash = manager.sign_transfer_with_phrase(wallet, transfer, phrase)?;
    let raw = manager.raw_transaction(wallet, transfer)?;
    let transfer = manager.wallet(wallet)?.transfer(transfer)?;
    tracing::info!(%hash, source = %source, target = %target, "transfer signed");

    Ok(json!({
        "hash": hash.to_hex(),
        "source": source.to_checksum_string(),
        "target": target.to_checksum_string(),
        "amount": transfer.amount().to_string(),
        "nonce": transfer.nonce(),
        "fee_limit": transfer.fee_basis().fee()?.to_string(),
        "raw": format!("0x{}", hex::encode(raw)),
    }))
}

fn describe(transaction: &Transaction) -> serde_json::Value {
    let mut value = json!({
        "source": transaction.source().to_checksum_string(),
        "target": transaction.target().to_checksum_string(),
        "amount_wei": transaction.amount().wei().to_string(),
        "gas_price_wei": transaction.gas_price().ether().wei().to_string(),
        "gas_limit": transaction.gas_limit().amount(),
        "nonce": transaction.nonce(),
        "data": format!("0x{}", hex::encode(transaction.data())),
        "hash": transaction.hash().map(|hash| hash.to_hex()),
        "status": transaction.status().to_string(),
    });
    if let Some((recipient, tokens)) = decode_erc20_transfer_data(transaction.data()) {
        value["erc20_transfer"] = json!({
            "recipient": recipient.to_checksum_string(),
            "value": tokens.to_string(),
        });
    }
    value
}
