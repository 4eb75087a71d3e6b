//! Wire types for the mock ledger RPC surface.
//!
//! Byte arrays travel as hex strings over JSON; these mirror the module
//! types one-to-one.

use serde::{Deserialize, Serialize};

use market_module::state::AuctionInstance;
use market_types::{Address, AssetRecord, MarketEvent, SealedBid, SettlementOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfigRpc {
    pub min_bidding_duration: Option<u64>,
    pub min_reveal_duration: Option<u64>,
    pub initial_timestamp: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAssetParams {
    pub sender: String,
    pub name: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuctionParams {
    pub sender: String,
    pub asset_id: Option<u64>,
    pub beneficiary: String,
    pub bidding_start: u64,
    pub bidding_duration: u64,
    pub reveal_duration: u64,
    pub min_price: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResellParams {
    pub sender: String,
    pub asset_id: u64,
    pub beneficiary: String,
    pub bidding_start: u64,
    pub bidding_duration: u64,
    pub reveal_duration: u64,
    pub min_price: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBidParams {
    pub sender: String,
    pub auction_id: u64,
    /// Commitment hash, hex-encoded (32 bytes)
    pub commitment: String,
    pub deposit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningRpc {
    pub value: u64,
    pub is_decoy: bool,
    /// Opening secret, hex-encoded (32 bytes)
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealParams {
    pub sender: String,
    pub auction_id: u64,
    pub openings: Vec<OpeningRpc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionViewRpc {
    pub auction_id: u64,
    pub seller: String,
    pub beneficiary: String,
    pub asset_id: Option<u64>,
    pub bidding_start: u64,
    pub bidding_end: u64,
    pub reveal_end: u64,
    pub min_price: Option<u64>,
    pub highest_bid: u64,
    pub highest_bidder: Option<String>,
    pub ended: bool,
    pub num_bids: usize,
}

impl From<&AuctionInstance> for AuctionViewRpc {
    fn from(auction: &AuctionInstance) -> Self {
        Self {
            auction_id: auction.config.auction_id,
            seller: hex::encode(auction.config.seller),
            beneficiary: hex::encode(auction.config.beneficiary),
            asset_id: auction.config.asset_id,
            bidding_start: auction.config.bidding_start,
            bidding_end: auction.config.bidding_end,
            reveal_end: auction.config.reveal_end,
            min_price: auction.config.min_price,
            highest_bid: auction.highest_bid,
            highest_bidder: auction.highest_bidder.map(hex::encode),
            ended: auction.ended,
            num_bids: auction.total_bids(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersRpc {
    pub phase: String,
    pub bidding_remaining: u64,
    pub reveal_remaining: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedBidRpc {
    pub commitment: String,
    pub deposit: u64,
    pub revealed: bool,
    pub submitted_at: u64,
}

impl From<&SealedBid> for SealedBidRpc {
    fn from(bid: &SealedBid) -> Self {
        Self {
            commitment: hex::encode(bid.commitment.0),
            deposit: bid.deposit,
            revealed: bid.revealed,
            submitted_at: bid.submitted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRpc {
    pub auction_id: u64,
    pub winner: Option<String>,
    pub winning_bid: u64,
    pub forfeited: u64,
    pub beneficiary_amount: u64,
    pub settled_at: u64,
}

impl From<SettlementOutcome> for OutcomeRpc {
    fn from(outcome: SettlementOutcome) -> Self {
        Self {
            auction_id: outcome.auction_id,
            winner: outcome.winner.map(hex::encode),
            winning_bid: outcome.winning_bid,
            forfeited: outcome.forfeited,
            beneficiary_amount: outcome.beneficiary_amount(),
            settled_at: outcome.settled_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRpc {
    pub asset_id: u64,
    pub creator: String,
    pub current_owner: String,
    pub held_by: Option<u64>,
    pub created_at: u64,
    pub name: Option<String>,
    pub uri: Option<String>,
}

impl From<&AssetRecord> for AssetRpc {
    fn from(record: &AssetRecord) -> Self {
        Self {
            asset_id: record.asset_id,
            creator: hex::encode(record.creator),
            current_owner: hex::encode(record.current_owner),
            held_by: record.held_by,
            created_at: record.created_at,
            name: record.metadata.name.clone(),
            uri: record.metadata.uri.clone(),
        }
    }
}

/// Flattened event for indexer consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRpc {
    pub kind: String,
    pub auction_id: Option<u64>,
    pub asset_id: Option<u64>,
    pub actor: Option<String>,
    pub amount: Option<u64>,
    pub accepted: Option<bool>,
}

impl From<&MarketEvent> for EventRpc {
    fn from(event: &MarketEvent) -> Self {
        match event {
            MarketEvent::AssetRegistered { asset_id, creator } => Self {
                kind: "asset_registered".into(),
                auction_id: None,
                asset_id: Some(*asset_id),
                actor: Some(hex::encode(creator)),
                amount: None,
                accepted: None,
            },
            MarketEvent::AuctionCreated {
                auction_id,
                seller,
                asset_id,
                ..
            } => Self {
                kind: "auction_created".into(),
                auction_id: Some(*auction_id),
                asset_id: *asset_id,
                actor: Some(hex::encode(seller)),
                amount: None,
                accepted: None,
            },
            MarketEvent::BidSubmitted {
                auction_id,
                bidder,
                deposit,
                ..
            } => Self {
                kind: "bid_submitted".into(),
                auction_id: Some(*auction_id),
                asset_id: None,
                actor: Some(hex::encode(bidder)),
                amount: Some(*deposit),
                accepted: None,
            },
            MarketEvent::BidRevealed {
                auction_id,
                bidder,
                value,
                accepted,
            } => Self {
                kind: "bid_revealed".into(),
                auction_id: Some(*auction_id),
                asset_id: None,
                actor: Some(hex::encode(bidder)),
                amount: Some(*value),
                accepted: Some(*accepted),
            },
            MarketEvent::AuctionEnded {
                auction_id,
                winner,
                amount,
            } => Self {
                kind: "auction_ended".into(),
                auction_id: Some(*auction_id),
                asset_id: None,
                actor: winner.map(hex::encode),
                amount: Some(*amount),
                accepted: None,
            },
        }
    }
}

/// Parse a hex address, tolerating a 0x prefix and short input.
pub fn parse_address(s: &str) -> Address {
    let mut addr = [0u8; 32];
    if let Ok(bytes) = hex::decode(s.trim_start_matches("0x")) {
        let len = bytes.len().min(32);
        addr[..len].copy_from_slice(&bytes[..len]);
    }
    addr
}
