//! CLI for the sealed-bid marketplace.
//!
//! This binary provides commands for:
//! - Registering assets and creating auctions
//! - Submitting sealed bids (real and decoy)
//! - Revealing from the local bid store
//! - Withdrawing refunds and settling auctions
//! - Querying marketplace state

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use market_client::{prepare_bid, prepare_decoy, BidStore};

#[derive(Parser)]
#[command(name = "market-cli")]
#[command(about = "CLI for the sealed-bid marketplace")]
struct Cli {
    /// Mock ledger RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:9944")]
    rpc: String,

    /// Path of the local bid store
    #[arg(long, default_value = "bids.json")]
    store: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new asset owned by the sender
    RegisterAsset {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset name
        #[arg(long)]
        name: Option<String>,

        /// Metadata URI
        #[arg(long)]
        uri: Option<String>,
    },

    /// Create a new auction
    CreateAuction {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset to auction (omit for a pure cash auction)
        #[arg(long)]
        asset_id: Option<u64>,

        /// Beneficiary address (hex)
        #[arg(long)]
        beneficiary: String,

        /// Bidding start (unix timestamp)
        #[arg(long)]
        bidding_start: u64,

        /// Bidding window length (seconds)
        #[arg(long)]
        bidding_duration: u64,

        /// Reveal window length (seconds)
        #[arg(long)]
        reveal_duration: u64,

        /// Minimum acceptable winning bid
        #[arg(long)]
        min_price: Option<u64>,
    },

    /// Re-list an asset the sender owns
    Resell {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset to re-list
        #[arg(long)]
        asset_id: u64,

        /// Beneficiary address (hex)
        #[arg(long)]
        beneficiary: String,

        /// Bidding start (unix timestamp)
        #[arg(long)]
        bidding_start: u64,

        /// Bidding window length (seconds)
        #[arg(long)]
        bidding_duration: u64,

        /// Reveal window length (seconds)
        #[arg(long)]
        reveal_duration: u64,

        /// Minimum acceptable winning bid
        #[arg(long)]
        min_price: Option<u64>,
    },

    /// Submit a sealed bid
    Bid {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Auction ID
        #[arg(long)]
        auction_id: u64,

        /// Bid value (hidden until reveal)
        #[arg(long)]
        value: u64,

        /// Deposit escrowed with the bid (visible on-ledger)
        #[arg(long)]
        deposit: u64,

        /// Mark this bid as a decoy
        #[arg(long)]
        decoy: bool,
    },

    /// Reveal all locally recorded bids for an auction
    Reveal {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Auction ID
        #[arg(long)]
        auction_id: u64,
    },

    /// Withdraw the sender's refundable balance
    Withdraw {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Auction ID
        #[arg(long)]
        auction_id: u64,
    },

    /// Settle an auction after its reveal window closes
    Settle {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Auction ID
        #[arg(long)]
        auction_id: u64,
    },

    /// Get auction details
    GetAuction {
        /// Auction ID
        #[arg(long)]
        auction_id: u64,
    },

    /// List auctions in creation order
    ListAuctions {
        #[arg(long, default_value = "0")]
        offset: u64,

        #[arg(long, default_value = "50")]
        limit: u64,
    },

    /// Get phase and remaining time for an auction
    Timers {
        /// Auction ID
        #[arg(long)]
        auction_id: u64,
    },

    /// Show bids recorded in the local store
    MyBids {
        /// Only show bids for this auction
        #[arg(long)]
        auction_id: Option<u64>,
    },

    /// Get the sender's refundable balance
    PendingReturn {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Auction ID
        #[arg(long)]
        auction_id: u64,
    },

    /// Advance ledger time by one block (for testing)
    AdvanceBlock,

    /// Set ledger timestamp (for testing)
    SetTimestamp {
        /// Unix timestamp to set
        #[arg(long)]
        timestamp: u64,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct AuctionViewRpc {
    auction_id: u64,
    seller: String,
    beneficiary: String,
    asset_id: Option<u64>,
    bidding_start: u64,
    bidding_end: u64,
    reveal_end: u64,
    min_price: Option<u64>,
    highest_bid: u64,
    highest_bidder: Option<String>,
    ended: bool,
    num_bids: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct TimersRpc {
    phase: String,
    bidding_remaining: u64,
    reveal_remaining: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct OutcomeRpc {
    auction_id: u64,
    winner: Option<String>,
    winning_bid: u64,
    forfeited: u64,
    beneficiary_amount: u64,
    settled_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct BlockInfo {
    height: u64,
    timestamp: u64,
}

async fn bid_cmd(
    client: &HttpClient,
    store_path: &str,
    sender: &str,
    auction_id: u64,
    value: u64,
    deposit: u64,
    decoy: bool,
) -> Result<()> {
    let mut rng = OsRng;
    let mut prepared = if decoy {
        prepare_decoy(auction_id, value, deposit, &mut rng)
    } else {
        prepare_bid(auction_id, value, deposit, &mut rng)?
    };

    let params = serde_json::json!({
        "sender": sender,
        "auction_id": auction_id,
        "commitment": hex::encode(prepared.commitment.0),
        "deposit": deposit
    });
    let index: usize = client.request("market_placeBid", vec![params]).await?;
    prepared.submission_index = Some(index);

    // Persist the reveal parameters before reporting success; without them
    // this bid's deposit cannot be recovered.
    let mut store = BidStore::load(store_path)?;
    store.record(prepared);
    store.save()?;

    info!("Bid recorded in {}", store_path);
    println!("Bid submitted");
    println!("  Auction ID: {}", auction_id);
    println!("  Index: {}", index);
    println!("  Value: {} ({})", value, if decoy { "decoy" } else { "hidden" });
    println!("  Deposit: {}", deposit);

    Ok(())
}

async fn reveal_cmd(
    client: &HttpClient,
    store_path: &str,
    sender: &str,
    auction_id: u64,
) -> Result<()> {
    let store = BidStore::load(store_path)?;
    let openings = store.openings_for(auction_id);
    if openings.is_empty() {
        return Err(anyhow!(
            "no recorded bids for auction {auction_id} in {store_path}"
        ));
    }

    let openings_rpc: Vec<serde_json::Value> = openings
        .iter()
        .map(|o| {
            serde_json::json!({
                "value": o.value,
                "is_decoy": o.is_decoy,
                "secret": hex::encode(o.secret.0),
            })
        })
        .collect();

    let params = serde_json::json!({
        "sender": sender,
        "auction_id": auction_id,
        "openings": openings_rpc,
    });
    let matched: usize = client.request("market_reveal", vec![params]).await?;

    println!(
        "Revealed {} of {} bids for auction {}",
        matched,
        openings.len(),
        auction_id
    );

    Ok(())
}

async fn get_auction_cmd(client: &HttpClient, auction_id: u64) -> Result<()> {
    let auction: Option<AuctionViewRpc> =
        client.request("query_getAuction", vec![auction_id]).await?;

    match auction {
        Some(a) => {
            println!("Auction {}:", a.auction_id);
            println!("  Seller: {}", a.seller);
            println!("  Beneficiary: {}", a.beneficiary);
            if let Some(asset_id) = a.asset_id {
                println!("  Asset: {}", asset_id);
            }
            println!("  Bidding: {} .. {}", a.bidding_start, a.bidding_end);
            println!("  Reveal ends: {}", a.reveal_end);
            if let Some(min) = a.min_price {
                println!("  Min price: {}", min);
            }
            println!("  Highest bid: {}", a.highest_bid);
            if let Some(leader) = a.highest_bidder {
                println!("  Highest bidder: {}", leader);
            }
            println!("  Bids: {}", a.num_bids);
            println!("  Ended: {}", a.ended);
        }
        None => {
            println!("Auction {} not found", auction_id);
        }
    }

    Ok(())
}

async fn list_auctions_cmd(client: &HttpClient, offset: u64, limit: u64) -> Result<()> {
    let auctions: Vec<AuctionViewRpc> = client
        .request("query_listAuctions", (offset, limit))
        .await?;

    if auctions.is_empty() {
        println!("No auctions found");
    } else {
        println!("Auctions:");
        for a in auctions {
            println!(
                "  [{}] seller {} - highest {} - {} bids{}",
                a.auction_id,
                a.seller,
                a.highest_bid,
                a.num_bids,
                if a.ended { " (ended)" } else { "" }
            );
        }
    }

    Ok(())
}

fn my_bids_cmd(store_path: &str, auction_id: Option<u64>) -> Result<()> {
    let store = BidStore::load(store_path)?;
    if store.is_empty() {
        println!("No bids recorded in {}", store_path);
        return Ok(());
    }

    println!("Recorded bids:");
    let auctions: Vec<u64> = match auction_id {
        Some(id) => vec![id],
        None => {
            let mut ids: Vec<u64> = store.all().iter().map(|b| b.auction_id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        }
    };

    for id in auctions {
        for bid in store.bids_for(id) {
            println!(
                "  auction {} index {:?}: value {} deposit {}{}",
                bid.auction_id,
                bid.submission_index,
                bid.value,
                bid.deposit,
                if bid.is_decoy { " (decoy)" } else { "" }
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let client = HttpClientBuilder::default().build(&cli.rpc)?;

    match cli.command {
        Commands::RegisterAsset { sender, name, uri } => {
            let params = serde_json::json!({
                "sender": sender,
                "name": name,
                "uri": uri,
            });
            let asset_id: u64 = client.request("market_registerAsset", vec![params]).await?;
            println!("Asset ID: {}", asset_id);
        }

        Commands::CreateAuction {
            sender,
            asset_id,
            beneficiary,
            bidding_start,
            bidding_duration,
            reveal_duration,
            min_price,
        } => {
            let params = serde_json::json!({
                "sender": sender,
                "asset_id": asset_id,
                "beneficiary": beneficiary,
                "bidding_start": bidding_start,
                "bidding_duration": bidding_duration,
                "reveal_duration": reveal_duration,
                "min_price": min_price,
            });
            let auction_id: u64 = client.request("market_createAuction", vec![params]).await?;
            println!("Auction ID: {}", auction_id);
        }

        Commands::Resell {
            sender,
            asset_id,
            beneficiary,
            bidding_start,
            bidding_duration,
            reveal_duration,
            min_price,
        } => {
            let params = serde_json::json!({
                "sender": sender,
                "asset_id": asset_id,
                "beneficiary": beneficiary,
                "bidding_start": bidding_start,
                "bidding_duration": bidding_duration,
                "reveal_duration": reveal_duration,
                "min_price": min_price,
            });
            let auction_id: u64 = client.request("market_resell", vec![params]).await?;
            println!("Auction ID: {}", auction_id);
        }

        Commands::Bid {
            sender,
            auction_id,
            value,
            deposit,
            decoy,
        } => {
            bid_cmd(
                &client, &cli.store, &sender, auction_id, value, deposit, decoy,
            )
            .await?;
        }

        Commands::Reveal { sender, auction_id } => {
            reveal_cmd(&client, &cli.store, &sender, auction_id).await?;
        }

        Commands::Withdraw { sender, auction_id } => {
            let amount: u64 = client
                .request("market_withdraw", (sender, auction_id))
                .await?;
            println!("Withdrew {}", amount);
        }

        Commands::Settle { sender, auction_id } => {
            let outcome: OutcomeRpc = client
                .request("market_settle", (sender, auction_id))
                .await?;
            println!("Auction {} settled", outcome.auction_id);
            match outcome.winner {
                Some(winner) => println!("  Winner: {} at {}", winner, outcome.winning_bid),
                None => println!("  No valid bid"),
            }
            println!("  Forfeited deposits: {}", outcome.forfeited);
            println!("  Beneficiary receives: {}", outcome.beneficiary_amount);
        }

        Commands::GetAuction { auction_id } => {
            get_auction_cmd(&client, auction_id).await?;
        }

        Commands::ListAuctions { offset, limit } => {
            list_auctions_cmd(&client, offset, limit).await?;
        }

        Commands::Timers { auction_id } => {
            let timers: Option<TimersRpc> =
                client.request("query_getTimers", vec![auction_id]).await?;
            match timers {
                Some(t) => {
                    println!("Phase: {}", t.phase);
                    println!("Bidding remaining: {}s", t.bidding_remaining);
                    println!("Reveal remaining: {}s", t.reveal_remaining);
                }
                None => println!("Auction {} not found", auction_id),
            }
        }

        Commands::MyBids { auction_id } => {
            my_bids_cmd(&cli.store, auction_id)?;
        }

        Commands::PendingReturn { sender, auction_id } => {
            let amount: u64 = client
                .request("query_getPendingReturn", (auction_id, sender))
                .await?;
            println!("Pending return: {}", amount);
        }

        Commands::AdvanceBlock => {
            let block: BlockInfo = client
                .request("admin_advanceBlock", Vec::<()>::new())
                .await?;
            println!(
                "Block advanced: height={}, timestamp={}",
                block.height, block.timestamp
            );
        }

        Commands::SetTimestamp { timestamp } => {
            let _: bool = client.request("admin_setTimestamp", vec![timestamp]).await?;
            println!("Timestamp set to {}", timestamp);
        }
    }

    Ok(())
}
