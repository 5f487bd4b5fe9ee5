use anyhow::Context;
use bigdecimal::BigDecimal;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::process::ExitCode;
use std::str::FromStr;

use ethereum_tool::config::AppConfig;
use ethereum_tool::exchange::{CoinGateClient, ExchangeRatePair};
use ethereum_tool::rpc::JsonRpcClient;
use ethereum_tool::signing::SigningRequest;
use ethereum_tool::token::TokenService;
use ethereum_tool::tx::{add_signature, broadcast_and_wait, decode_unsigned_hex, send_raw_transaction, TransactionService};
use ethereum_tool::types::{parse_source, Address};
use ethereum_tool::utils::{decode_hex, keccak256, logging};
use ethereum_tool::log_debug;

#[derive(Parser)]
#[command(name = "ethereum-tool")]
#[command(about = "Assemble EVM transactions offline and attach external signatures")]
#[command(version)]
struct Cli {
    /// Chain id bound into signing hashes [env: ETHEREUM_NETWORK_CHAIN_ID]
    #[arg(long, global = true)]
    chain_id: Option<u64>,

    /// Node JSON-RPC URL [env: ETHEREUM_NODE_URL]
    #[arg(long, global = true)]
    node_url: Option<String>,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an unsigned fee-market transfer and print the hash to sign
    CreateUnsignedTx {
        /// Source address or public key (33/65-byte hex)
        #[arg(long)]
        source: String,
        #[arg(long)]
        destination: String,
        /// USD for ETH transfers, whole tokens with --contract
        #[arg(long)]
        amount: String,
        /// ERC-20 contract to transfer from
        #[arg(long)]
        contract: Option<String>,
    },
    /// Print the signing hash of an unsigned transaction (offline)
    HashTx {
        #[arg(long)]
        unsigned: String,
    },
    /// Verify a detached signature and print the signed transaction (offline)
    AddSignature {
        /// Source address or public key (33/65-byte hex)
        #[arg(long)]
        source: String,
        #[arg(long)]
        unsigned: String,
        /// 64-byte r||s or 65-byte r||s||v hex
        #[arg(long)]
        signature: String,
        /// Hash that was signed
        #[arg(long)]
        hash: String,
    },
    /// Broadcast a signed transaction and wait for its receipt
    SendRawTx {
        #[arg(long)]
        raw: String,
        /// Return after submission without polling for the receipt
        #[arg(long)]
        no_wait: bool,
    },
    /// ETH balance of an address, in USD
    Balance {
        #[arg(long)]
        address: String,
    },
    /// ERC-20 balance of an address
    TokenBalance {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        address: String,
    },
    /// Worst-case fee of a transfer, in wei and USD
    EstimateFee {
        #[arg(long)]
        source: String,
        #[arg(long)]
        destination: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        contract: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("configuration")?;
    if let Some(chain_id) = cli.chain_id {
        config.chain_id = chain_id;
    }
    if cli.node_url.is_some() {
        config.node_url = cli.node_url;
    }
    if cli.verbose || config.debug {
        logging::enable_debug();
    }
    log_debug!("cli", "Configuration loaded", chain_id = config.chain_id);

    match cli.command {
        Command::CreateUnsignedTx {
            source,
            destination,
            amount,
            contract,
        } => {
            let source = parse_source(&source).context("source")?;
            let destination = parse_address(&destination, "destination")?;
            let amount = parse_amount(&amount)?;
            let contract = contract.map(|c| parse_address(&c, "contract")).transpose()?;

            let rpc = node(&config)?;
            let rates = load_rates(&config)?;
            let prepared = TransactionService::new(&rpc, &rates, config.chain_id)
                .create_unsigned_transaction(source, destination, &amount, contract)?;

            print_json(&json!({
                "transaction": prepared.tx,
                "unsigned": prepared.unsigned_hex(),
                "hash": prepared.signing_hash_hex(),
            }))
        }
        Command::HashTx { unsigned } => {
            let tx = decode_unsigned_hex(&unsigned).context("unsigned transaction")?;
            let payload = SigningRequest::new(&tx, config.chain_id)?.payload();

            print_json(&json!({
                "transaction": tx,
                "payload": format!("0x{}", hex::encode(&payload)),
                "hash": format!("0x{}", hex::encode(keccak256(&payload))),
            }))
        }
        Command::AddSignature {
            source,
            unsigned,
            signature,
            hash,
        } => {
            let source = parse_source(&source).context("source")?;
            let signed = add_signature(config.chain_id, source, &unsigned, &signature, &hash)?;

            print_json(&json!({
                "raw": signed.raw_hex(),
                "hash": signed.hash_hex(),
                "v": signed.v,
            }))
        }
        Command::SendRawTx { raw, no_wait } => {
            let raw = decode_hex(&raw).context("raw transaction")?;
            let rpc = node(&config)?;

            if no_wait {
                let tx_hash = send_raw_transaction(&rpc, &raw)?;
                return print_json(&json!({ "hash": tx_hash }));
            }

            let rates = load_rates(&config)?;
            let report = broadcast_and_wait(&rpc, &rates, &raw, &config.poller)?;
            print_json(&serde_json::to_value(&report)?)
        }
        Command::Balance { address } => {
            let address = parse_address(&address, "address")?;
            let rpc = node(&config)?;
            let rates = load_rates(&config)?;
            let usd = TransactionService::new(&rpc, &rates, config.chain_id).balance_in_fiat(address)?;

            print_json(&json!({
                "address": address.to_checksum(),
                "usd": usd.to_string(),
            }))
        }
        Command::TokenBalance { contract, address } => {
            let contract = parse_address(&contract, "contract")?;
            let address = parse_address(&address, "address")?;
            let rpc = node(&config)?;
            let balance = TokenService::new(&rpc).token_balance(contract, address)?;

            print_json(&json!({
                "address": address.to_checksum(),
                "contract": contract.to_checksum(),
                "balance": balance.to_string(),
                "raw": balance.raw.to_string(),
            }))
        }
        Command::EstimateFee {
            source,
            destination,
            amount,
            contract,
        } => {
            let source = parse_source(&source).context("source")?;
            let destination = parse_address(&destination, "destination")?;
            let amount = parse_amount(&amount)?;
            let contract = contract.map(|c| parse_address(&c, "contract")).transpose()?;

            let rpc = node(&config)?;
            let rates = load_rates(&config)?;
            let report = TransactionService::new(&rpc, &rates, config.chain_id)
                .estimate_fee(source, destination, &amount, contract)?;

            print_json(&serde_json::to_value(&report)?)
        }
    }
}

fn parse_address(input: &str, what: &str) -> anyhow::Result<Address> {
    Address::from_str(input).with_context(|| what.to_string())
}

fn parse_amount(input: &str) -> anyhow::Result<BigDecimal> {
    BigDecimal::from_str(input.trim()).with_context(|| format!("amount '{}'", input))
}

fn node(config: &AppConfig) -> anyhow::Result<JsonRpcClient> {
    Ok(JsonRpcClient::new(config.require_node_url()?)?)
}

fn load_rates(config: &AppConfig) -> anyhow::Result<ExchangeRatePair> {
    let source = CoinGateClient::new(config.coingate_url.clone())?;
    Ok(ExchangeRatePair::load(&source, &config.fallback)?)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
