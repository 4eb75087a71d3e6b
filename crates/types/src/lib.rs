//! Core type definitions for the sealed-bid marketplace.
//!
//! This crate provides the shared data structures used across the system:
//! bid commitments, auction configuration and phase, asset records, and the
//! event notifications off-ledger indexers consume.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

pub mod events;

pub use events::MarketEvent;

// =========================
// IDENTIFIERS
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Stable auction identifier assigned by the registry
pub type AuctionId = u64;

/// Stable asset identifier assigned by the asset registry
pub type AssetId = u64;

// =========================
// COMMITMENTS
// =========================

/// Opaque hash binding (value, decoy flag, secret) without revealing them
#[serde_as]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize,
    Deserialize,
)]
pub struct Commitment(#[serde_as(as = "serde_with::hex::Hex")] pub [u8; 32]);

impl Default for Commitment {
    fn default() -> Self {
        Self([0u8; 32])
    }
}

/// Bidder-chosen opening secret (32 bytes, kept off-ledger until reveal)
#[serde_as]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Secret(#[serde_as(as = "serde_with::hex::Hex")] pub [u8; 32]);

impl Default for Secret {
    fn default() -> Self {
        Self([0u8; 32])
    }
}

/// Plaintext parameters disclosed during the reveal phase, parallel to the
/// bidder's stored bids in submission order.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BidOpening {
    pub value: u64,
    pub is_decoy: bool,
    pub secret: Secret,
}

// =========================
// BIDS
// =========================

/// One bidder's single sealed submission (stored on-ledger).
///
/// The deposit is set once at submission and never mutated. `revealed` flips
/// at most once, when an opening matches the commitment; bids are never
/// deleted so revealed and unrevealed entries both remain for audit.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SealedBid {
    pub commitment: Commitment,
    pub deposit: u64,
    pub revealed: bool,
    pub submitted_at: u64,
}

// =========================
// AUCTIONS
// =========================

/// Auction lifecycle phase, derived from the clock plus the terminal flag
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum AuctionPhase {
    /// Before bidding_start
    Pending,
    /// Accepting sealed bids
    Bidding,
    /// Accepting openings; persists past reveal_end until settlement
    Revealing,
    /// Settled, terminal
    Ended,
}

/// Immutable auction configuration fixed at creation
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AuctionConfig {
    pub auction_id: AuctionId,
    pub seller: Address,
    pub beneficiary: Address,

    // Timing: bidding_start <= bidding_end < reveal_end
    pub bidding_start: u64,
    pub bidding_end: u64,
    pub reveal_end: u64,

    // Optional asset binding and price floor
    pub asset_id: Option<AssetId>,
    pub min_price: Option<u64>,

    pub created_at: u64,
}

impl AuctionConfig {
    /// Phase at `now`, computed fresh on every call so it can never go stale.
    ///
    /// The Revealing -> Ended transition is driven by settlement, not the
    /// clock, so `ended` is supplied by the instance.
    pub fn phase_at(&self, now: u64, ended: bool) -> AuctionPhase {
        if ended {
            AuctionPhase::Ended
        } else if now < self.bidding_start {
            AuctionPhase::Pending
        } else if now < self.bidding_end {
            AuctionPhase::Bidding
        } else {
            AuctionPhase::Revealing
        }
    }

    /// Seconds of bidding window left; zero outside `[bidding_start, bidding_end)`.
    pub fn remaining_bidding(&self, now: u64) -> u64 {
        if now < self.bidding_start {
            0
        } else {
            self.bidding_end.saturating_sub(now)
        }
    }

    /// Seconds of reveal window left; zero outside `[bidding_end, reveal_end)`.
    pub fn remaining_reveal(&self, now: u64) -> u64 {
        if now < self.bidding_end {
            0
        } else {
            self.reveal_end.saturating_sub(now)
        }
    }
}

/// Result of settling an auction
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SettlementOutcome {
    pub auction_id: AuctionId,
    /// Highest valid revealed bidder, if any bid qualified
    pub winner: Option<Address>,
    pub winning_bid: u64,
    /// Deposits of bids never successfully revealed, paid to the beneficiary
    pub forfeited: u64,
    pub settled_at: u64,
    pub settler: Address,
}

impl SettlementOutcome {
    /// Total amount transferred to the beneficiary at settlement.
    pub fn beneficiary_amount(&self) -> u64 {
        self.winning_bid + self.forfeited
    }
}

// =========================
// ASSETS
// =========================

/// Descriptive metadata attached to an asset record
#[derive(
    Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct AssetMetadata {
    pub name: Option<String>,
    pub uri: Option<String>,
}

/// A non-fungible asset tracked by the registry
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AssetRecord {
    pub asset_id: AssetId,
    pub creator: Address,
    pub current_owner: Address,
    /// Auction currently holding custody, if any. An asset is bound to at
    /// most one live auction at a time.
    pub held_by: Option<AuctionId>,
    pub created_at: u64,
    pub metadata: AssetMetadata,
}

impl AssetRecord {
    pub fn is_under_auction(&self) -> bool {
        self.held_by.is_some()
    }
}
