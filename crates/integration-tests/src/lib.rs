//! End-to-end integration tests for the sealed-bid marketplace.
//!
//! These tests exercise the full auction lifecycle:
//! 1. Asset registration and custody
//! 2. Auction creation through the factory
//! 3. Sealed bid preparation and submission
//! 4. Reveals with highest-bid bookkeeping
//! 5. Settlement, withdrawals, and re-listing

use market_client::{prepare_bid, prepare_decoy};
use market_module::handlers::{
    handle_create_auction, handle_place_bid, handle_register_asset, handle_resell, handle_reveal,
    handle_settle, handle_withdraw, CallContext,
};
use market_module::{MarketError, MarketParams, MarketState, PhaseError};
use market_types::{Address, AssetMetadata, AuctionId, AuctionPhase, BidOpening, MarketEvent, Secret};

use rand::rngs::OsRng;

const SELLER: Address = [1u8; 32];
const BENEFICIARY: Address = [2u8; 32];
const BIDDER_X: Address = [3u8; 32];
const BIDDER_Y: Address = [4u8; 32];
const ANYONE: Address = [9u8; 32];

fn ctx(sender: Address, timestamp: u64, value: u64) -> CallContext {
    CallContext {
        sender,
        block_height: timestamp / 12,
        timestamp,
        value,
    }
}

fn params() -> MarketParams {
    MarketParams {
        min_bidding_duration: 100,
        min_reveal_duration: 100,
    }
}

/// Auction with bidding over [1000, 2000) and reveal over [2000, 3000).
fn create_cash_auction(state: &mut MarketState) -> AuctionId {
    handle_create_auction(
        state,
        &ctx(SELLER, 500, 0),
        &params(),
        None,
        BENEFICIARY,
        1000,
        1000,
        1000,
        None,
    )
    .expect("auction creation failed")
}

/// Scenarios A, B and C: two honest bidders, leader handover, settlement.
#[test]
fn test_full_auction_lifecycle() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    // X bids value 10 with deposit 15, Y bids value 20 with deposit 20.
    let bid_x = prepare_bid(auction_id, 10, 15, &mut rng).unwrap();
    let bid_y = prepare_bid(auction_id, 20, 20, &mut rng).unwrap();

    handle_place_bid(&mut state, &ctx(BIDDER_X, 1100, 15), auction_id, bid_x.commitment).unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_Y, 1200, 20), auction_id, bid_y.commitment).unwrap();

    // Scenario A: X reveals correctly and leads.
    handle_reveal(&mut state, &ctx(BIDDER_X, 2100, 0), auction_id, &[bid_x.opening()]).unwrap();
    {
        let auction = state.get_auction(auction_id).unwrap();
        assert_eq!(auction.highest_bidder, Some(BIDDER_X));
        assert_eq!(auction.highest_bid, 10);
        assert_eq!(auction.escrow.pending_of(&BIDDER_X), 5);
    }

    // Scenario B: Y outbids; X's full deposit becomes refundable.
    handle_reveal(&mut state, &ctx(BIDDER_Y, 2200, 0), auction_id, &[bid_y.opening()]).unwrap();
    {
        let auction = state.get_auction(auction_id).unwrap();
        assert_eq!(auction.highest_bidder, Some(BIDDER_Y));
        assert_eq!(auction.highest_bid, 20);
        assert_eq!(auction.escrow.pending_of(&BIDDER_X), 15);
        assert_eq!(auction.escrow.pending_of(&BIDDER_Y), 0);
    }

    // Scenario C: anyone settles once the reveal window has passed.
    let outcome = handle_settle(&mut state, &ctx(ANYONE, 3000, 0), auction_id).unwrap();
    assert_eq!(outcome.winner, Some(BIDDER_Y));
    assert_eq!(outcome.beneficiary_amount(), 20);
    assert_eq!(
        handle_settle(&mut state, &ctx(ANYONE, 3100, 0), auction_id),
        Err(MarketError::AlreadyEnded)
    );

    // Deposit conservation holds exactly once everyone withdraws.
    let withdrawn_x = handle_withdraw(&mut state, &ctx(BIDDER_X, 3200, 0), auction_id).unwrap();
    let withdrawn_y = handle_withdraw(&mut state, &ctx(BIDDER_Y, 3200, 0), auction_id).unwrap();
    assert_eq!(withdrawn_x, 15);
    assert_eq!(withdrawn_y, 0);

    let auction = state.get_auction(auction_id).unwrap();
    assert!(auction.escrow.conserves_deposits());
    assert_eq!(
        auction.escrow.total_withdrawn() + auction.escrow.paid_out(),
        auction.escrow.total_deposited()
    );
}

/// Scenario D: a reveal with the wrong secret has no effect and the deposit
/// is ultimately forfeited to the beneficiary.
#[test]
fn test_wrong_secret_forfeits_deposit() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let bid = prepare_bid(auction_id, 10, 12, &mut rng).unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_X, 1100, 12), auction_id, bid.commitment).unwrap();

    let wrong = BidOpening {
        value: 10,
        is_decoy: false,
        secret: Secret([0xAB; 32]),
    };
    let matched =
        handle_reveal(&mut state, &ctx(BIDDER_X, 2100, 0), auction_id, &[wrong]).unwrap();
    assert_eq!(matched, 0);

    {
        let auction = state.get_auction(auction_id).unwrap();
        assert_eq!(auction.highest_bid, 0);
        assert_eq!(auction.escrow.pending_of(&BIDDER_X), 0);
    }
    // No acceptance notification was emitted for the bad entry.
    assert!(matches!(
        state.events.last(),
        Some(MarketEvent::BidRevealed {
            accepted: false,
            value: 0,
            ..
        })
    ));

    let outcome = handle_settle(&mut state, &ctx(ANYONE, 3000, 0), auction_id).unwrap();
    assert_eq!(outcome.winner, None);
    assert_eq!(outcome.forfeited, 12);
    assert_eq!(outcome.beneficiary_amount(), 12);
}

/// Scenario E plus the explicit Pending decision: bids queue before the
/// window opens, fail after it closes; reveals are gated both ways.
#[test]
fn test_phase_gating() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let bid = prepare_bid(auction_id, 10, 10, &mut rng).unwrap();

    // Accepted during Pending: queues against the Pending -> Bidding transition.
    handle_place_bid(&mut state, &ctx(BIDDER_X, 900, 10), auction_id, bid.commitment).unwrap();

    // Rejected at and after bidding_end.
    assert_eq!(
        handle_place_bid(&mut state, &ctx(BIDDER_Y, 2000, 10), auction_id, bid.commitment),
        Err(MarketError::Phase(PhaseError::TooLate))
    );

    // Reveal gated on both sides of its window.
    assert_eq!(
        handle_reveal(&mut state, &ctx(BIDDER_X, 1500, 0), auction_id, &[bid.opening()]),
        Err(MarketError::Phase(PhaseError::TooEarly))
    );
    assert_eq!(
        handle_reveal(&mut state, &ctx(BIDDER_X, 3000, 0), auction_id, &[bid.opening()]),
        Err(MarketError::Phase(PhaseError::TooLate))
    );

    // Settle gated before reveal_end.
    assert_eq!(
        handle_settle(&mut state, &ctx(ANYONE, 2999, 0), auction_id),
        Err(MarketError::Phase(PhaseError::TooEarly))
    );
}

/// P2: the highest bid only ever climbs, and ties keep the earlier leader.
#[test]
fn test_highest_bid_monotonicity() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let bidders: [(Address, u64); 4] = [
        ([10u8; 32], 8),
        ([11u8; 32], 12),
        ([12u8; 32], 12), // tie with the previous leader
        ([13u8; 32], 5),  // lower than the running highest
    ];

    let mut prepared = Vec::new();
    for (bidder, value) in bidders {
        let bid = prepare_bid(auction_id, value, value, &mut rng).unwrap();
        handle_place_bid(&mut state, &ctx(bidder, 1500, value), auction_id, bid.commitment)
            .unwrap();
        prepared.push((bidder, bid));
    }

    let mut observed = Vec::new();
    for (i, (bidder, bid)) in prepared.iter().enumerate() {
        handle_reveal(
            &mut state,
            &ctx(*bidder, 2100 + i as u64, 0),
            auction_id,
            &[bid.opening()],
        )
        .unwrap();
        observed.push(state.get_auction(auction_id).unwrap().highest_bid);
    }

    assert_eq!(observed, vec![8, 12, 12, 12]);
    let auction = state.get_auction(auction_id).unwrap();
    // The tie at 12 keeps the earlier bidder.
    assert_eq!(auction.highest_bidder, Some([11u8; 32]));
}

/// P3: a failed second settlement leaves every observable field untouched.
#[test]
fn test_settlement_idempotence() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let bid = prepare_bid(auction_id, 10, 15, &mut rng).unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_X, 1100, 15), auction_id, bid.commitment).unwrap();
    handle_reveal(&mut state, &ctx(BIDDER_X, 2100, 0), auction_id, &[bid.opening()]).unwrap();

    let first = handle_settle(&mut state, &ctx(ANYONE, 3000, 0), auction_id).unwrap();

    let snapshot = {
        let auction = state.get_auction(auction_id).unwrap();
        (
            auction.ended,
            auction.highest_bid,
            auction.highest_bidder,
            auction.outcome.clone(),
            auction.escrow.clone(),
        )
    };
    let events_before = state.events.len();

    assert_eq!(
        handle_settle(&mut state, &ctx(ANYONE, 4000, 0), auction_id),
        Err(MarketError::AlreadyEnded)
    );

    let auction = state.get_auction(auction_id).unwrap();
    assert_eq!(auction.ended, snapshot.0);
    assert_eq!(auction.highest_bid, snapshot.1);
    assert_eq!(auction.highest_bidder, snapshot.2);
    assert_eq!(auction.outcome, snapshot.3);
    assert_eq!(auction.escrow, snapshot.4);
    assert_eq!(state.events.len(), events_before);
    assert_eq!(auction.outcome.as_ref().map(|o| o.settled_at), Some(first.settled_at));
}

/// P4: a bidder can never withdraw more than was credited to them.
#[test]
fn test_withdraw_safety() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let first = prepare_bid(auction_id, 10, 14, &mut rng).unwrap();
    let second = prepare_decoy(auction_id, 3, 6, &mut rng);
    handle_place_bid(&mut state, &ctx(BIDDER_X, 1100, 14), auction_id, first.commitment).unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_X, 1200, 6), auction_id, second.commitment).unwrap();

    handle_reveal(
        &mut state,
        &ctx(BIDDER_X, 2100, 0),
        auction_id,
        &[first.opening(), second.opening()],
    )
    .unwrap();

    // Credited: 14 + 6 minus the 10 reserved as the leading bid.
    assert_eq!(
        state
            .get_auction(auction_id)
            .unwrap()
            .escrow
            .pending_of(&BIDDER_X),
        10
    );

    // Repeated withdrawals drain once and only once.
    assert_eq!(handle_withdraw(&mut state, &ctx(BIDDER_X, 2200, 0), auction_id), Ok(10));
    assert_eq!(handle_withdraw(&mut state, &ctx(BIDDER_X, 2201, 0), auction_id), Ok(0));
    assert_eq!(handle_withdraw(&mut state, &ctx(BIDDER_X, 2202, 0), auction_id), Ok(0));

    let auction = state.get_auction(auction_id).unwrap();
    assert_eq!(auction.escrow.total_withdrawn(), 10);
    assert!(auction.escrow.conserves_deposits());
}

/// Decoy bids hide the real bid without ever competing; their deposits come
/// straight back.
#[test]
fn test_decoys_refund_without_competing() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let real = prepare_bid(auction_id, 9, 9, &mut rng).unwrap();
    let noise_a = prepare_decoy(auction_id, 50, 2, &mut rng);
    let noise_b = prepare_decoy(auction_id, 1, 0, &mut rng);

    for (t, bid) in [(1100, &noise_a), (1150, &real), (1200, &noise_b)] {
        handle_place_bid(&mut state, &ctx(BIDDER_X, t, bid.deposit), auction_id, bid.commitment)
            .unwrap();
    }

    let matched = handle_reveal(
        &mut state,
        &ctx(BIDDER_X, 2100, 0),
        auction_id,
        &[noise_a.opening(), real.opening(), noise_b.opening()],
    )
    .unwrap();
    assert_eq!(matched, 3);

    let auction = state.get_auction(auction_id).unwrap();
    assert_eq!(auction.highest_bid, 9);
    assert_eq!(auction.highest_bidder, Some(BIDDER_X));
    // Decoy deposits refundable in full; the real bid's value stays reserved.
    assert_eq!(auction.escrow.pending_of(&BIDDER_X), 2);
}

/// P1 with an unrevealed bid: every unit deposited is accounted for across
/// withdrawals, outstanding balances, and the beneficiary payout.
#[test]
fn test_deposit_conservation_with_forfeits() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let revealed = prepare_bid(auction_id, 10, 15, &mut rng).unwrap();
    let abandoned = prepare_bid(auction_id, 30, 30, &mut rng).unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_X, 1100, 15), auction_id, revealed.commitment)
        .unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_Y, 1200, 30), auction_id, abandoned.commitment)
        .unwrap();

    // Y never reveals.
    handle_reveal(&mut state, &ctx(BIDDER_X, 2100, 0), auction_id, &[revealed.opening()])
        .unwrap();

    let outcome = handle_settle(&mut state, &ctx(ANYONE, 3000, 0), auction_id).unwrap();
    assert_eq!(outcome.winner, Some(BIDDER_X));
    assert_eq!(outcome.winning_bid, 10);
    assert_eq!(outcome.forfeited, 30);

    handle_withdraw(&mut state, &ctx(BIDDER_X, 3100, 0), auction_id).unwrap();
    handle_withdraw(&mut state, &ctx(BIDDER_Y, 3100, 0), auction_id).unwrap();

    let auction = state.get_auction(auction_id).unwrap();
    assert_eq!(auction.escrow.total_deposited(), 45);
    assert_eq!(auction.escrow.total_withdrawn(), 5);
    assert_eq!(auction.escrow.paid_out(), 40);
    assert_eq!(auction.escrow.outstanding(), 0);
}

/// Full custody lifecycle: mint, auction, transfer to the winner, re-list by
/// the new owner, and return to the seller when nobody bids.
#[test]
fn test_asset_custody_lifecycle() {
    let mut rng = OsRng;
    let mut state = MarketState::new();

    let asset_id = handle_register_asset(
        &mut state,
        &ctx(SELLER, 100, 0),
        AssetMetadata {
            name: Some("genesis piece".into()),
            uri: Some("ipfs://QmExample".into()),
        },
    )
    .unwrap();

    let auction_id = handle_create_auction(
        &mut state,
        &ctx(SELLER, 500, 0),
        &params(),
        Some(asset_id),
        SELLER,
        1000,
        1000,
        1000,
        None,
    )
    .unwrap();

    // While under auction the asset cannot be listed again.
    assert_eq!(
        handle_resell(
            &mut state,
            &ctx(SELLER, 1100, 0),
            &params(),
            asset_id,
            SELLER,
            2000,
            1000,
            1000,
            None,
        ),
        Err(MarketError::AlreadyUnderAuction)
    );

    let bid = prepare_bid(auction_id, 25, 25, &mut rng).unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_X, 1500, 25), auction_id, bid.commitment).unwrap();
    handle_reveal(&mut state, &ctx(BIDDER_X, 2100, 0), auction_id, &[bid.opening()]).unwrap();
    handle_settle(&mut state, &ctx(ANYONE, 3000, 0), auction_id).unwrap();

    {
        let record = state.assets.get(asset_id).unwrap();
        assert_eq!(record.current_owner, BIDDER_X);
        assert_eq!(record.creator, SELLER);
        assert!(!record.is_under_auction());
    }

    // The old owner can no longer re-list; the winner can.
    assert_eq!(
        handle_resell(
            &mut state,
            &ctx(SELLER, 3500, 0),
            &params(),
            asset_id,
            SELLER,
            4000,
            1000,
            1000,
            None,
        ),
        Err(MarketError::NotOwner)
    );
    let resale_id = handle_resell(
        &mut state,
        &ctx(BIDDER_X, 3500, 0),
        &params(),
        asset_id,
        BIDDER_X,
        4000,
        1000,
        1000,
        Some(30),
    )
    .unwrap();

    // Nobody bids; settlement returns the asset to its (new) seller.
    let outcome = handle_settle(&mut state, &ctx(ANYONE, 6000, 0), resale_id).unwrap();
    assert_eq!(outcome.winner, None);
    let record = state.assets.get(asset_id).unwrap();
    assert_eq!(record.current_owner, BIDDER_X);
    assert!(!record.is_under_auction());
}

/// The notification log alone is enough to reconstruct an auction's story.
#[test]
fn test_events_drive_indexing() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let bid = prepare_bid(auction_id, 10, 10, &mut rng).unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_X, 1100, 10), auction_id, bid.commitment).unwrap();
    handle_reveal(&mut state, &ctx(BIDDER_X, 2100, 0), auction_id, &[bid.opening()]).unwrap();
    handle_settle(&mut state, &ctx(ANYONE, 3000, 0), auction_id).unwrap();

    let kinds: Vec<&'static str> = state
        .events
        .iter()
        .map(|e| match e {
            MarketEvent::AssetRegistered { .. } => "registered",
            MarketEvent::AuctionCreated { .. } => "created",
            MarketEvent::BidSubmitted { .. } => "submitted",
            MarketEvent::BidRevealed { .. } => "revealed",
            MarketEvent::AuctionEnded { .. } => "ended",
        })
        .collect();
    assert_eq!(kinds, vec!["created", "submitted", "revealed", "ended"]);

    assert!(matches!(
        state.events[2],
        MarketEvent::BidRevealed {
            value: 10,
            accepted: true,
            ..
        }
    ));
    assert!(matches!(
        state.events[3],
        MarketEvent::AuctionEnded {
            winner: Some(BIDDER_X),
            amount: 10,
            ..
        }
    ));
}

/// Nothing auto-expires: settlement arbitrarily long after reveal_end still
/// produces the same result.
#[test]
fn test_late_settlement() {
    let mut rng = OsRng;
    let mut state = MarketState::new();
    let auction_id = create_cash_auction(&mut state);

    let bid = prepare_bid(auction_id, 7, 7, &mut rng).unwrap();
    handle_place_bid(&mut state, &ctx(BIDDER_X, 1100, 7), auction_id, bid.commitment).unwrap();
    handle_reveal(&mut state, &ctx(BIDDER_X, 2100, 0), auction_id, &[bid.opening()]).unwrap();

    // Phase stays Revealing until someone settles, years later if need be.
    let auction = state.get_auction(auction_id).unwrap();
    assert_eq!(auction.phase_at(1_000_000_000), AuctionPhase::Revealing);

    let outcome = handle_settle(&mut state, &ctx(ANYONE, 1_000_000_000, 0), auction_id).unwrap();
    assert_eq!(outcome.winner, Some(BIDDER_X));
    assert_eq!(
        state.get_auction(auction_id).unwrap().phase_at(1_000_000_001),
        AuctionPhase::Ended
    );
}
