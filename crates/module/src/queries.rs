//! Query handlers for the marketplace module.
//!
//! These functions provide read-only access to marketplace state. Phase and
//! timer queries take the caller-supplied clock so the answer is derived
//! fresh rather than cached.

use serde::{Deserialize, Serialize};

use market_types::{
    Address, AssetId, AssetRecord, AuctionConfig, AuctionId, AuctionPhase, MarketEvent, SealedBid,
    SettlementOutcome,
};

use crate::state::{AuctionInstance, MarketState};

/// Query request types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MarketQuery {
    /// Get one auction's configuration and live standing.
    GetAuction { auction_id: AuctionId },

    /// Registry listing in creation order, paginated.
    ListAuctions { offset: u64, limit: u64 },

    /// Number of auctions ever created.
    GetAuctionCount,

    /// Current phase plus remaining bidding/reveal time.
    GetTimers { auction_id: AuctionId },

    /// A bidder's sealed submissions, in order.
    GetBids {
        auction_id: AuctionId,
        bidder: Address,
    },

    /// A bidder's refundable balance.
    GetPendingReturn {
        auction_id: AuctionId,
        bidder: Address,
    },

    /// Settlement outcome, if settled.
    GetOutcome { auction_id: AuctionId },

    /// One asset record.
    GetAsset { asset_id: AssetId },

    /// Asset records in registration order, paginated.
    ListAssets { offset: u64, limit: u64 },

    /// Notification log slice for off-ledger indexers.
    GetEvents { offset: u64, limit: u64 },
}

/// One auction's configuration plus its live standing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionView {
    pub config: AuctionConfig,
    pub highest_bid: u64,
    pub highest_bidder: Option<Address>,
    pub ended: bool,
    pub num_bidders: usize,
    pub num_bids: usize,
}

impl AuctionView {
    fn from_instance(auction: &AuctionInstance) -> Self {
        Self {
            config: auction.config.clone(),
            highest_bid: auction.highest_bid,
            highest_bidder: auction.highest_bidder,
            ended: auction.ended,
            num_bidders: auction.bidders.len(),
            num_bids: auction.total_bids(),
        }
    }
}

/// Phase and clamped countdowns for one auction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionTimers {
    pub phase: AuctionPhase,
    pub bidding_remaining: u64,
    pub reveal_remaining: u64,
}

/// Query response types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MarketQueryResponse {
    Auction(Option<AuctionView>),
    AuctionList(Vec<AuctionView>),
    AuctionCount(u64),
    Timers(Option<AuctionTimers>),
    Bids(Vec<SealedBid>),
    PendingReturn(u64),
    Outcome(Option<SettlementOutcome>),
    Asset(Option<AssetRecord>),
    AssetList(Vec<AssetRecord>),
    Events(Vec<MarketEvent>),
}

/// Handle a query against the state as of `now`.
pub fn handle_query(state: &MarketState, now: u64, query: MarketQuery) -> MarketQueryResponse {
    match query {
        MarketQuery::GetAuction { auction_id } => MarketQueryResponse::Auction(
            state.get_auction(auction_id).map(AuctionView::from_instance),
        ),

        MarketQuery::ListAuctions { offset, limit } => MarketQueryResponse::AuctionList(
            state
                .auctions_page(offset as usize, limit as usize)
                .into_iter()
                .map(AuctionView::from_instance)
                .collect(),
        ),

        MarketQuery::GetAuctionCount => {
            MarketQueryResponse::AuctionCount(state.auction_count() as u64)
        }

        MarketQuery::GetTimers { auction_id } => {
            MarketQueryResponse::Timers(state.get_auction(auction_id).map(|auction| {
                AuctionTimers {
                    phase: auction.phase_at(now),
                    bidding_remaining: auction.config.remaining_bidding(now),
                    reveal_remaining: auction.config.remaining_reveal(now),
                }
            }))
        }

        MarketQuery::GetBids { auction_id, bidder } => MarketQueryResponse::Bids(
            state
                .get_auction(auction_id)
                .map(|auction| auction.bids_of(&bidder).to_vec())
                .unwrap_or_default(),
        ),

        MarketQuery::GetPendingReturn { auction_id, bidder } => MarketQueryResponse::PendingReturn(
            state
                .get_auction(auction_id)
                .map(|auction| auction.escrow.pending_of(&bidder))
                .unwrap_or(0),
        ),

        MarketQuery::GetOutcome { auction_id } => MarketQueryResponse::Outcome(
            state.get_auction(auction_id).and_then(|a| a.outcome.clone()),
        ),

        MarketQuery::GetAsset { asset_id } => {
            MarketQueryResponse::Asset(state.assets.get(asset_id).cloned())
        }

        MarketQuery::ListAssets { offset, limit } => MarketQueryResponse::AssetList(
            state
                .assets
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        ),

        MarketQuery::GetEvents { offset, limit } => MarketQueryResponse::Events(
            state.events_page(offset as usize, limit as usize).to_vec(),
        ),
    }
}

/// Summary of an auction for listing views.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionSummary {
    pub auction_id: AuctionId,
    pub seller: Address,
    pub asset_id: Option<AssetId>,
    pub phase: AuctionPhase,
    pub bidding_end: u64,
    pub reveal_end: u64,
    pub highest_bid: u64,
    pub num_bids: usize,
}

impl AuctionSummary {
    pub fn from_instance(auction: &AuctionInstance, now: u64) -> Self {
        Self {
            auction_id: auction.config.auction_id,
            seller: auction.config.seller,
            asset_id: auction.config.asset_id,
            phase: auction.phase_at(now),
            bidding_end: auction.config.bidding_end,
            reveal_end: auction.config.reveal_end,
            highest_bid: auction.highest_bid,
            num_bids: auction.total_bids(),
        }
    }
}

/// Auctions currently accepting bids.
pub fn get_open_auctions(state: &MarketState, now: u64) -> Vec<AuctionSummary> {
    state
        .auctions_page(0, state.auction_count())
        .into_iter()
        .filter(|auction| {
            matches!(
                auction.phase_at(now),
                AuctionPhase::Pending | AuctionPhase::Bidding
            )
        })
        .map(|auction| AuctionSummary::from_instance(auction, now))
        .collect()
}

/// Auctions past their reveal window but not yet settled.
pub fn get_settleable_auctions(state: &MarketState, now: u64) -> Vec<AuctionId> {
    state
        .auctions_page(0, state.auction_count())
        .into_iter()
        .filter(|auction| !auction.ended && now >= auction.config.reveal_end)
        .map(|auction| auction.config.auction_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::MarketParams;
    use crate::handlers::{handle_create_auction, handle_place_bid, CallContext};
    use market_types::Commitment;

    fn ctx(sender: Address, timestamp: u64, value: u64) -> CallContext {
        CallContext {
            sender,
            block_height: 1,
            timestamp,
            value,
        }
    }

    fn seeded_state() -> (MarketState, AuctionId) {
        let mut state = MarketState::new();
        let params = MarketParams {
            min_bidding_duration: 100,
            min_reveal_duration: 100,
        };
        let id = handle_create_auction(
            &mut state,
            &ctx([1u8; 32], 500, 0),
            &params,
            None,
            [2u8; 32],
            1000,
            1000,
            1000,
            None,
        )
        .unwrap();
        (state, id)
    }

    #[test]
    fn test_get_auction_and_count() {
        let (state, id) = seeded_state();

        let response = handle_query(&state, 1500, MarketQuery::GetAuction { auction_id: id });
        match response {
            MarketQueryResponse::Auction(Some(view)) => {
                assert_eq!(view.config.auction_id, id);
                assert!(!view.ended);
            }
            other => panic!("unexpected response: {other:?}"),
        }

        let response = handle_query(&state, 1500, MarketQuery::GetAuctionCount);
        assert!(matches!(response, MarketQueryResponse::AuctionCount(1)));
    }

    #[test]
    fn test_timers_follow_the_clock() {
        let (state, id) = seeded_state();

        let response = handle_query(&state, 1500, MarketQuery::GetTimers { auction_id: id });
        match response {
            MarketQueryResponse::Timers(Some(timers)) => {
                assert_eq!(timers.phase, AuctionPhase::Bidding);
                assert_eq!(timers.bidding_remaining, 500);
                assert_eq!(timers.reveal_remaining, 0);
            }
            other => panic!("unexpected response: {other:?}"),
        }

        let response = handle_query(&state, 2400, MarketQuery::GetTimers { auction_id: id });
        match response {
            MarketQueryResponse::Timers(Some(timers)) => {
                assert_eq!(timers.phase, AuctionPhase::Revealing);
                assert_eq!(timers.bidding_remaining, 0);
                assert_eq!(timers.reveal_remaining, 600);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_pending_return_defaults_to_zero() {
        let (state, id) = seeded_state();
        let response = handle_query(
            &state,
            1500,
            MarketQuery::GetPendingReturn {
                auction_id: id,
                bidder: [9u8; 32],
            },
        );
        assert!(matches!(response, MarketQueryResponse::PendingReturn(0)));
    }

    #[test]
    fn test_settleable_listing() {
        let (mut state, id) = seeded_state();
        handle_place_bid(
            &mut state,
            &ctx([3u8; 32], 1500, 10),
            id,
            Commitment([1u8; 32]),
        )
        .unwrap();

        assert!(get_settleable_auctions(&state, 2500).is_empty());
        assert_eq!(get_settleable_auctions(&state, 3000), vec![id]);

        let open = get_open_auctions(&state, 1500);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].num_bids, 1);
    }
}
