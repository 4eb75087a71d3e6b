//! Event notifications emitted by the marketplace module.
//!
//! Notifications are the sole channel by which off-ledger indexers (analytics,
//! my-bids views) learn of state changes; they must not assume any other.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{Address, AssetId, AuctionId};

/// Everything an indexer needs to track the marketplace.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum MarketEvent {
    /// A new asset record was minted.
    AssetRegistered {
        asset_id: AssetId,
        creator: Address,
    },

    /// A new auction was created and the asset (if any) taken into custody.
    ///
    /// Carries the full descriptive data so clients can index the auction
    /// without re-deriving it from ledger history.
    AuctionCreated {
        auction_id: AuctionId,
        seller: Address,
        beneficiary: Address,
        asset_id: Option<AssetId>,
        bidding_start: u64,
        bidding_end: u64,
        reveal_end: u64,
        min_price: Option<u64>,
    },

    /// A sealed bid was submitted with its deposit.
    BidSubmitted {
        auction_id: AuctionId,
        bidder: Address,
        deposit: u64,
        /// Position in the bidder's append-only bid list
        index: usize,
    },

    /// One reveal entry was processed. `accepted` is true iff the entry
    /// became the new highest bid; `value` is the effective value of a
    /// matched non-decoy opening, zero otherwise.
    BidRevealed {
        auction_id: AuctionId,
        bidder: Address,
        value: u64,
        accepted: bool,
    },

    /// The auction settled. `amount` is the full beneficiary payout,
    /// winning bid plus forfeited deposits.
    AuctionEnded {
        auction_id: AuctionId,
        winner: Option<Address>,
        amount: u64,
    },
}

impl MarketEvent {
    /// Auction this event belongs to, if any.
    pub fn auction_id(&self) -> Option<AuctionId> {
        match self {
            MarketEvent::AssetRegistered { .. } => None,
            MarketEvent::AuctionCreated { auction_id, .. }
            | MarketEvent::BidSubmitted { auction_id, .. }
            | MarketEvent::BidRevealed { auction_id, .. }
            | MarketEvent::AuctionEnded { auction_id, .. } => Some(*auction_id),
        }
    }
}
