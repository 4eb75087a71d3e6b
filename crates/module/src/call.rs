//! Call message types for the marketplace module.

use borsh::{BorshDeserialize, BorshSerialize};

use market_types::{Address, AssetId, AssetMetadata, AuctionId, BidOpening, Commitment};

/// State-changing calls accepted by the marketplace.
///
/// Every call is a ledger transaction carrying caller identity and attached
/// value; it either applies fully or is rejected with no partial effect.
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize)]
pub enum MarketCall {
    // === Factory / registry ===
    /// Mint a new asset record owned by the caller.
    RegisterAsset { metadata: AssetMetadata },

    /// Create a new auction; when `asset_id` is set, the caller's asset is
    /// taken into custody for the auction's lifetime.
    CreateAuction {
        asset_id: Option<AssetId>,
        beneficiary: Address,
        bidding_start: u64,
        bidding_duration: u64,
        reveal_duration: u64,
        min_price: Option<u64>,
    },

    /// Re-list an existing asset the caller owns.
    Resell {
        asset_id: AssetId,
        beneficiary: Address,
        bidding_start: u64,
        bidding_duration: u64,
        reveal_duration: u64,
        min_price: Option<u64>,
    },

    // === Auction lifecycle ===
    /// Submit a sealed bid; the attached value is the deposit.
    PlaceBid {
        auction_id: AuctionId,
        commitment: Commitment,
    },

    /// Disclose openings for the caller's bids, in submission order.
    Reveal {
        auction_id: AuctionId,
        openings: Vec<BidOpening>,
    },

    /// Withdraw the caller's refundable balance.
    Withdraw { auction_id: AuctionId },

    /// Settle the auction once the reveal window has closed (permissionless).
    Settle { auction_id: AuctionId },
}
