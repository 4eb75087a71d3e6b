//! Ledger state for the marketplace module.

use std::collections::HashMap;

use market_types::{
    Address, AuctionConfig, AuctionId, AuctionPhase, MarketEvent, SealedBid, SettlementOutcome,
};

use crate::custody::AssetRegistry;
use crate::escrow::EscrowLedger;

/// One sealed-bid auction: immutable configuration plus the mutable bid
/// book, escrow ledger, and leader bookkeeping.
#[derive(Debug)]
pub struct AuctionInstance {
    pub config: AuctionConfig,

    /// Append-only bid lists keyed by bidder, in submission order
    pub bids: HashMap<Address, Vec<SealedBid>>,

    /// Bidders in first-bid order, for audit listings
    pub bidders: Vec<Address>,

    pub escrow: EscrowLedger,

    /// Best valid revealed bid so far; (0, None) until one qualifies
    pub highest_bid: u64,
    pub highest_bidder: Option<Address>,

    /// Set exactly once, by settlement
    pub ended: bool,
    pub outcome: Option<SettlementOutcome>,
}

impl AuctionInstance {
    pub fn new(config: AuctionConfig) -> Self {
        Self {
            config,
            bids: HashMap::new(),
            bidders: Vec::new(),
            escrow: EscrowLedger::new(),
            highest_bid: 0,
            highest_bidder: None,
            ended: false,
            outcome: None,
        }
    }

    pub fn phase_at(&self, now: u64) -> AuctionPhase {
        self.config.phase_at(now, self.ended)
    }

    pub fn bid_count(&self, bidder: &Address) -> usize {
        self.bids.get(bidder).map(|b| b.len()).unwrap_or(0)
    }

    pub fn bids_of(&self, bidder: &Address) -> &[SealedBid] {
        self.bids.get(bidder).map(|b| b.as_slice()).unwrap_or(&[])
    }

    pub fn total_bids(&self) -> usize {
        self.bids.values().map(|b| b.len()).sum()
    }

    /// Deposits of bids never successfully revealed. Forfeited to the
    /// beneficiary at settlement; nothing stays permanently locked.
    pub fn forfeited_total(&self) -> u64 {
        self.bids
            .values()
            .flatten()
            .filter(|b| !b.revealed)
            .map(|b| b.deposit)
            .sum()
    }
}

/// Top-level mutable state owned by the ledger runtime.
///
/// The registry is an explicit owned struct passed by reference into every
/// handler; auction instances are addressed by stable identifier rather than
/// embedded pointers.
#[derive(Debug, Default)]
pub struct MarketState {
    next_auction_id: AuctionId,

    /// All auctions by ID
    pub auctions: HashMap<AuctionId, AuctionInstance>,

    /// Append-only creation order, backing paginated discovery
    pub auction_order: Vec<AuctionId>,

    /// Asset records and custody flags
    pub assets: AssetRegistry,

    /// Append-only notification log consumed by off-ledger indexers
    pub events: Vec<MarketEvent>,
}

impl MarketState {
    pub fn new() -> Self {
        Self {
            next_auction_id: 1,
            assets: AssetRegistry::new(),
            ..Default::default()
        }
    }

    /// Get the next auction ID and increment.
    pub fn allocate_auction_id(&mut self) -> AuctionId {
        let id = self.next_auction_id;
        self.next_auction_id += 1;
        id
    }

    pub fn get_auction(&self, auction_id: AuctionId) -> Option<&AuctionInstance> {
        self.auctions.get(&auction_id)
    }

    pub fn get_auction_mut(&mut self, auction_id: AuctionId) -> Option<&mut AuctionInstance> {
        self.auctions.get_mut(&auction_id)
    }

    pub fn auction_count(&self) -> usize {
        self.auction_order.len()
    }

    /// Auctions in creation order, paginated.
    pub fn auctions_page(&self, offset: usize, limit: usize) -> Vec<&AuctionInstance> {
        self.auction_order
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| self.auctions.get(id))
            .collect()
    }

    pub fn emit(&mut self, event: MarketEvent) {
        self.events.push(event);
    }

    /// Slice of the event log, paginated.
    pub fn events_page(&self, offset: usize, limit: usize) -> &[MarketEvent] {
        let start = offset.min(self.events.len());
        let end = offset.saturating_add(limit).min(self.events.len());
        &self.events[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(id: AuctionId) -> AuctionConfig {
        AuctionConfig {
            auction_id: id,
            seller: [1u8; 32],
            beneficiary: [2u8; 32],
            bidding_start: 100,
            bidding_end: 200,
            reveal_end: 300,
            asset_id: None,
            min_price: None,
            created_at: 50,
        }
    }

    #[test]
    fn test_allocate_auction_id() {
        let mut state = MarketState::new();
        assert_eq!(state.allocate_auction_id(), 1);
        assert_eq!(state.allocate_auction_id(), 2);
        assert_eq!(state.allocate_auction_id(), 3);
    }

    #[test]
    fn test_auction_page_preserves_creation_order() {
        let mut state = MarketState::new();
        for _ in 0..3 {
            let id = state.allocate_auction_id();
            state.auctions.insert(id, AuctionInstance::new(test_config(id)));
            state.auction_order.push(id);
        }

        let page: Vec<AuctionId> = state
            .auctions_page(1, 5)
            .iter()
            .map(|a| a.config.auction_id)
            .collect();
        assert_eq!(page, vec![2, 3]);
        assert_eq!(state.auction_count(), 3);
    }

    #[test]
    fn test_forfeited_total_counts_unrevealed_only() {
        let mut auction = AuctionInstance::new(test_config(1));
        let bidder = [3u8; 32];
        auction.bids.insert(
            bidder,
            vec![
                SealedBid {
                    commitment: Default::default(),
                    deposit: 10,
                    revealed: true,
                    submitted_at: 100,
                },
                SealedBid {
                    commitment: Default::default(),
                    deposit: 7,
                    revealed: false,
                    submitted_at: 110,
                },
            ],
        );

        assert_eq!(auction.forfeited_total(), 7);
        assert_eq!(auction.total_bids(), 2);
        assert_eq!(auction.bid_count(&bidder), 2);
    }

    #[test]
    fn test_events_page_clamps() {
        let mut state = MarketState::new();
        state.emit(MarketEvent::AssetRegistered {
            asset_id: 1,
            creator: [0u8; 32],
        });

        assert_eq!(state.events_page(0, 10).len(), 1);
        assert_eq!(state.events_page(1, 10).len(), 0);
        assert_eq!(state.events_page(99, 10).len(), 0);
    }
}
