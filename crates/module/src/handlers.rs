//! Call handlers for the marketplace module.
//!
//! These functions implement the business logic for each call type. All
//! preconditions are checked before any state is touched, so a failing call
//! leaves the state exactly as it found it.

use market_types::{
    Address, AssetId, AssetMetadata, AuctionConfig, AuctionId, AuctionPhase, BidOpening,
    Commitment, MarketEvent, SealedBid, SettlementOutcome,
};

use crate::error::{MarketError, PhaseError};
use crate::genesis::MarketParams;
use crate::state::{AuctionInstance, MarketState};

/// Context provided by the runtime for each call.
pub struct CallContext {
    /// Sender of the transaction
    pub sender: Address,
    /// Current block height
    pub block_height: u64,
    /// Current timestamp
    pub timestamp: u64,
    /// Value attached to the call (the deposit, for bids)
    pub value: u64,
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, MarketError>;

/// Handle RegisterAsset: mint a new asset record owned by the caller.
pub fn handle_register_asset(
    state: &mut MarketState,
    ctx: &CallContext,
    metadata: AssetMetadata,
) -> HandlerResult<AssetId> {
    let asset_id = state.assets.register(ctx.sender, metadata, ctx.timestamp);
    state.emit(MarketEvent::AssetRegistered {
        asset_id,
        creator: ctx.sender,
    });
    Ok(asset_id)
}

/// Handle CreateAuction.
///
/// Validates the window against the factory minimums, takes custody of the
/// asset when one is bound, and appends the new instance to the registry.
#[allow(clippy::too_many_arguments)]
pub fn handle_create_auction(
    state: &mut MarketState,
    ctx: &CallContext,
    params: &MarketParams,
    asset_id: Option<AssetId>,
    beneficiary: Address,
    bidding_start: u64,
    bidding_duration: u64,
    reveal_duration: u64,
    min_price: Option<u64>,
) -> HandlerResult<AuctionId> {
    if bidding_duration < params.min_bidding_duration
        || reveal_duration < params.min_reveal_duration
    {
        return Err(MarketError::InvalidTiming);
    }
    if bidding_start < ctx.timestamp {
        return Err(MarketError::InvalidTiming);
    }

    // Custody preconditions before any state changes
    if let Some(asset_id) = asset_id {
        state.assets.check_listable(asset_id, &ctx.sender)?;
    }

    let auction_id = state.allocate_auction_id();
    if let Some(asset_id) = asset_id {
        state
            .assets
            .take_into_custody(asset_id, &ctx.sender, auction_id)?;
    }

    let bidding_end = bidding_start + bidding_duration;
    let reveal_end = bidding_end + reveal_duration;
    let config = AuctionConfig {
        auction_id,
        seller: ctx.sender,
        beneficiary,
        bidding_start,
        bidding_end,
        reveal_end,
        asset_id,
        min_price,
        created_at: ctx.timestamp,
    };

    state
        .auctions
        .insert(auction_id, AuctionInstance::new(config));
    state.auction_order.push(auction_id);

    state.emit(MarketEvent::AuctionCreated {
        auction_id,
        seller: ctx.sender,
        beneficiary,
        asset_id,
        bidding_start,
        bidding_end,
        reveal_end,
        min_price,
    });

    Ok(auction_id)
}

/// Handle Resell: re-list an asset the caller owns. Re-uses the existing
/// asset record; never mints.
#[allow(clippy::too_many_arguments)]
pub fn handle_resell(
    state: &mut MarketState,
    ctx: &CallContext,
    params: &MarketParams,
    asset_id: AssetId,
    beneficiary: Address,
    bidding_start: u64,
    bidding_duration: u64,
    reveal_duration: u64,
    min_price: Option<u64>,
) -> HandlerResult<AuctionId> {
    handle_create_auction(
        state,
        ctx,
        params,
        Some(asset_id),
        beneficiary,
        bidding_start,
        bidding_duration,
        reveal_duration,
        min_price,
    )
}

/// Handle PlaceBid: append a sealed bid for the caller with the attached
/// deposit. Returns the bid's position in the caller's list.
///
/// Bids are accepted during Pending as well as Bidding; an early bid simply
/// queues ahead of the window. The deposit may be zero (decoys) and carries
/// no relation to the hidden value until reveal.
pub fn handle_place_bid(
    state: &mut MarketState,
    ctx: &CallContext,
    auction_id: AuctionId,
    commitment: Commitment,
) -> HandlerResult<usize> {
    let (bidder, deposit, index) = {
        let auction = state
            .get_auction_mut(auction_id)
            .ok_or(MarketError::AuctionNotFound(auction_id))?;

        match auction.phase_at(ctx.timestamp) {
            AuctionPhase::Pending | AuctionPhase::Bidding => {}
            AuctionPhase::Revealing | AuctionPhase::Ended => {
                return Err(MarketError::Phase(PhaseError::TooLate));
            }
        }

        if auction.bid_count(&ctx.sender) == 0 {
            auction.bidders.push(ctx.sender);
        }
        let entries = auction.bids.entry(ctx.sender).or_default();
        let index = entries.len();
        entries.push(SealedBid {
            commitment,
            deposit: ctx.value,
            revealed: false,
            submitted_at: ctx.timestamp,
        });
        auction.escrow.record_deposit(ctx.value);

        (ctx.sender, ctx.value, index)
    };

    state.emit(MarketEvent::BidSubmitted {
        auction_id,
        bidder,
        deposit,
        index,
    });

    Ok(index)
}

/// Handle Reveal: process the caller's openings in submission order and
/// return how many matched their commitments.
///
/// A mismatched entry is skipped with no credit rather than failing the
/// call, so one bad opening cannot block the caller's other entries.
/// Trailing bids may be left unrevealed; their deposits are forfeited to
/// the beneficiary at settlement.
pub fn handle_reveal(
    state: &mut MarketState,
    ctx: &CallContext,
    auction_id: AuctionId,
    openings: &[BidOpening],
) -> HandlerResult<usize> {
    let mut events = Vec::with_capacity(openings.len());
    let mut matched = 0usize;

    {
        let auction = state
            .get_auction_mut(auction_id)
            .ok_or(MarketError::AuctionNotFound(auction_id))?;

        match auction.phase_at(ctx.timestamp) {
            AuctionPhase::Pending | AuctionPhase::Bidding => {
                return Err(MarketError::Phase(PhaseError::TooEarly));
            }
            AuctionPhase::Revealing => {
                if ctx.timestamp >= auction.config.reveal_end {
                    return Err(MarketError::Phase(PhaseError::TooLate));
                }
            }
            AuctionPhase::Ended => return Err(MarketError::Phase(PhaseError::TooLate)),
        }

        let stored = auction.bid_count(&ctx.sender);
        if openings.len() > stored {
            return Err(MarketError::InvalidRevealLength {
                stored,
                got: openings.len(),
            });
        }
        if openings.is_empty() {
            return Ok(0);
        }

        // Disjoint borrows of the instance fields mutated below
        let AuctionInstance {
            config,
            bids,
            escrow,
            highest_bid,
            highest_bidder,
            ..
        } = auction;
        let sender_bids = bids.entry(ctx.sender).or_default();

        for (index, opening) in openings.iter().enumerate() {
            let bid = &mut sender_bids[index];

            let matches = !bid.revealed
                && market_codec::verify(
                    &bid.commitment,
                    opening.value,
                    opening.is_decoy,
                    &opening.secret,
                );
            if !matches {
                // Invalid reveal: no refund, no effect
                events.push(MarketEvent::BidRevealed {
                    auction_id,
                    bidder: ctx.sender,
                    value: 0,
                    accepted: false,
                });
                continue;
            }

            bid.revealed = true;
            matched += 1;
            escrow.credit(ctx.sender, bid.deposit);

            let effective = if opening.is_decoy { 0 } else { opening.value };
            let candidate = !opening.is_decoy
                && bid.deposit >= opening.value
                && opening.value >= config.min_price.unwrap_or(0);

            // Strict comparison: ties keep the earlier leader
            let mut accepted = false;
            if candidate && opening.value > *highest_bid {
                if let Some(previous) = *highest_bidder {
                    // The dethroned leader's reservation becomes refundable
                    escrow.credit(previous, *highest_bid);
                }
                let _reserved = escrow.debit(&ctx.sender, opening.value);
                debug_assert!(_reserved, "leader reservation exceeded refundable balance");
                *highest_bidder = Some(ctx.sender);
                *highest_bid = opening.value;
                accepted = true;
            }

            events.push(MarketEvent::BidRevealed {
                auction_id,
                bidder: ctx.sender,
                value: effective,
                accepted,
            });
        }
    }

    for event in events {
        state.emit(event);
    }

    Ok(matched)
}

/// Handle Withdraw: zero the caller's refundable balance first, then report
/// the amount the runtime must pay out. A zero balance is a harmless no-op.
pub fn handle_withdraw(
    state: &mut MarketState,
    ctx: &CallContext,
    auction_id: AuctionId,
) -> HandlerResult<u64> {
    let auction = state
        .get_auction_mut(auction_id)
        .ok_or(MarketError::AuctionNotFound(auction_id))?;

    Ok(auction.escrow.take_all(&ctx.sender))
}

/// Handle Settle: terminal, exactly once, permissionless after reveal_end.
///
/// Pays the beneficiary the winning bid plus all forfeited deposits, then
/// releases the asset to the winner, or back to the seller when no valid
/// bid was recorded.
pub fn handle_settle(
    state: &mut MarketState,
    ctx: &CallContext,
    auction_id: AuctionId,
) -> HandlerResult<SettlementOutcome> {
    // All preconditions checked read-only before the terminal flag is set
    let (asset_id, seller) = {
        let auction = state
            .get_auction(auction_id)
            .ok_or(MarketError::AuctionNotFound(auction_id))?;
        if auction.ended {
            return Err(MarketError::AlreadyEnded);
        }
        if ctx.timestamp < auction.config.reveal_end {
            return Err(MarketError::Phase(PhaseError::TooEarly));
        }
        if let Some(asset_id) = auction.config.asset_id {
            state
                .assets
                .get(asset_id)
                .ok_or(MarketError::AssetNotFound(asset_id))?;
        }
        (auction.config.asset_id, auction.config.seller)
    };

    let outcome = {
        let auction = state
            .get_auction_mut(auction_id)
            .ok_or(MarketError::AuctionNotFound(auction_id))?;

        // Terminal flag before any value or custody movement
        auction.ended = true;

        let forfeited = auction.forfeited_total();
        let outcome = SettlementOutcome {
            auction_id,
            winner: auction.highest_bidder,
            winning_bid: auction.highest_bid,
            forfeited,
            settled_at: ctx.timestamp,
            settler: ctx.sender,
        };
        auction.escrow.record_payout(outcome.beneficiary_amount());
        auction.outcome = Some(outcome.clone());
        outcome
    };

    if let Some(asset_id) = asset_id {
        use crate::custody::AssetCustodian;
        let new_owner = outcome.winner.unwrap_or(seller);
        state.assets.release_to(asset_id, new_owner)?;
    }

    state.emit(MarketEvent::AuctionEnded {
        auction_id,
        winner: outcome.winner,
        amount: outcome.beneficiary_amount(),
    });

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_types::Secret;

    fn ctx(sender: Address, timestamp: u64, value: u64) -> CallContext {
        CallContext {
            sender,
            block_height: 1,
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
    fn open_auction(state: &mut MarketState) -> AuctionId {
        handle_create_auction(
            state,
            &ctx([1u8; 32], 500, 0),
            &params(),
            None,
            [2u8; 32],
            1000,
            1000,
            1000,
            None,
        )
        .unwrap()
    }

    fn sealed(value: u64, is_decoy: bool, seed: u8) -> (Commitment, BidOpening) {
        let secret = Secret([seed; 32]);
        let commitment = market_codec::commit(value, is_decoy, &secret);
        (
            commitment,
            BidOpening {
                value,
                is_decoy,
                secret,
            },
        )
    }

    #[test]
    fn test_create_auction_validates_timing() {
        let mut state = MarketState::new();

        // Bidding window shorter than the factory minimum
        let result = handle_create_auction(
            &mut state,
            &ctx([1u8; 32], 500, 0),
            &params(),
            None,
            [2u8; 32],
            1000,
            50,
            1000,
            None,
        );
        assert_eq!(result, Err(MarketError::InvalidTiming));

        // Start in the past
        let result = handle_create_auction(
            &mut state,
            &ctx([1u8; 32], 500, 0),
            &params(),
            None,
            [2u8; 32],
            400,
            1000,
            1000,
            None,
        );
        assert_eq!(result, Err(MarketError::InvalidTiming));

        assert_eq!(state.auction_count(), 0);
    }

    #[test]
    fn test_bid_accepted_during_pending_and_bidding() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];
        let (commitment, _) = sealed(10, false, 1);

        // Before bidding_start: queued against the Pending -> Bidding transition
        assert_eq!(
            handle_place_bid(&mut state, &ctx(bidder, 900, 15), id, commitment),
            Ok(0)
        );
        // During the window
        assert_eq!(
            handle_place_bid(&mut state, &ctx(bidder, 1500, 5), id, commitment),
            Ok(1)
        );
        assert_eq!(state.get_auction(id).unwrap().bid_count(&bidder), 2);
    }

    #[test]
    fn test_bid_after_window_fails() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let (commitment, _) = sealed(10, false, 1);

        let result = handle_place_bid(&mut state, &ctx([3u8; 32], 2000, 10), id, commitment);
        assert_eq!(result, Err(MarketError::Phase(PhaseError::TooLate)));
    }

    #[test]
    fn test_reveal_window_gating() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];
        let (commitment, opening) = sealed(10, false, 1);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 15), id, commitment).unwrap();

        let openings = vec![opening];
        assert_eq!(
            handle_reveal(&mut state, &ctx(bidder, 1999, 0), id, &openings),
            Err(MarketError::Phase(PhaseError::TooEarly))
        );
        assert_eq!(
            handle_reveal(&mut state, &ctx(bidder, 3000, 0), id, &openings),
            Err(MarketError::Phase(PhaseError::TooLate))
        );
        assert_eq!(
            handle_reveal(&mut state, &ctx(bidder, 2500, 0), id, &openings),
            Ok(1)
        );
    }

    #[test]
    fn test_reveal_updates_leader_and_refunds() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let x = [3u8; 32];
        let y = [4u8; 32];

        // X: value 10, deposit 15. Y: value 20, deposit 20.
        let (cx, ox) = sealed(10, false, 1);
        let (cy, oy) = sealed(20, false, 2);
        handle_place_bid(&mut state, &ctx(x, 1500, 15), id, cx).unwrap();
        handle_place_bid(&mut state, &ctx(y, 1500, 20), id, cy).unwrap();

        handle_reveal(&mut state, &ctx(x, 2100, 0), id, &[ox]).unwrap();
        {
            let auction = state.get_auction(id).unwrap();
            assert_eq!(auction.highest_bid, 10);
            assert_eq!(auction.highest_bidder, Some(x));
            assert_eq!(auction.escrow.pending_of(&x), 5);
        }

        handle_reveal(&mut state, &ctx(y, 2200, 0), id, &[oy]).unwrap();
        {
            let auction = state.get_auction(id).unwrap();
            assert_eq!(auction.highest_bid, 20);
            assert_eq!(auction.highest_bidder, Some(y));
            // X's full deposit refundable once dethroned
            assert_eq!(auction.escrow.pending_of(&x), 15);
            assert_eq!(auction.escrow.pending_of(&y), 0);
        }
    }

    #[test]
    fn test_reveal_tie_keeps_earlier_leader() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let x = [3u8; 32];
        let y = [4u8; 32];

        let (cx, ox) = sealed(10, false, 1);
        let (cy, oy) = sealed(10, false, 2);
        handle_place_bid(&mut state, &ctx(x, 1500, 10), id, cx).unwrap();
        handle_place_bid(&mut state, &ctx(y, 1500, 10), id, cy).unwrap();

        handle_reveal(&mut state, &ctx(x, 2100, 0), id, &[ox]).unwrap();
        handle_reveal(&mut state, &ctx(y, 2200, 0), id, &[oy]).unwrap();

        let auction = state.get_auction(id).unwrap();
        assert_eq!(auction.highest_bidder, Some(x));
        // Y's deposit is fully refundable, never reserved
        assert_eq!(auction.escrow.pending_of(&y), 10);
    }

    #[test]
    fn test_reveal_wrong_secret_is_skipped_not_failed() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];

        let (c1, _) = sealed(10, false, 1);
        let (c2, o2) = sealed(8, false, 2);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 10), id, c1).unwrap();
        handle_place_bid(&mut state, &ctx(bidder, 1500, 8), id, c2).unwrap();

        // First opening lies about the secret; second is honest.
        let bad = BidOpening {
            value: 10,
            is_decoy: false,
            secret: Secret([99u8; 32]),
        };
        let matched = handle_reveal(&mut state, &ctx(bidder, 2100, 0), id, &[bad, o2]).unwrap();
        assert_eq!(matched, 1);

        let auction = state.get_auction(id).unwrap();
        // Only the honest bid is credited and leads
        assert_eq!(auction.highest_bid, 8);
        assert_eq!(auction.escrow.pending_of(&bidder), 0);
        // The mismatched bid stays unrevealed and will be forfeited
        assert_eq!(auction.forfeited_total(), 10);
    }

    #[test]
    fn test_reveal_decoy_refunds_without_leading() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];

        let (c, o) = sealed(1000, true, 1);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 3), id, c).unwrap();
        handle_reveal(&mut state, &ctx(bidder, 2100, 0), id, &[o]).unwrap();

        let auction = state.get_auction(id).unwrap();
        assert_eq!(auction.highest_bid, 0);
        assert_eq!(auction.highest_bidder, None);
        assert_eq!(auction.escrow.pending_of(&bidder), 3);
    }

    #[test]
    fn test_reveal_underfunded_bid_refunds_without_leading() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];

        // Deposit 5 cannot cover a claimed value of 10
        let (c, o) = sealed(10, false, 1);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 5), id, c).unwrap();
        handle_reveal(&mut state, &ctx(bidder, 2100, 0), id, &[o]).unwrap();

        let auction = state.get_auction(id).unwrap();
        assert_eq!(auction.highest_bidder, None);
        assert_eq!(auction.escrow.pending_of(&bidder), 5);
    }

    #[test]
    fn test_reveal_below_min_price_refunds_without_leading() {
        let mut state = MarketState::new();
        let id = handle_create_auction(
            &mut state,
            &ctx([1u8; 32], 500, 0),
            &params(),
            None,
            [2u8; 32],
            1000,
            1000,
            1000,
            Some(50),
        )
        .unwrap();
        let bidder = [3u8; 32];

        let (c, o) = sealed(40, false, 1);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 40), id, c).unwrap();
        handle_reveal(&mut state, &ctx(bidder, 2100, 0), id, &[o]).unwrap();

        let auction = state.get_auction(id).unwrap();
        assert_eq!(auction.highest_bidder, None);
        assert_eq!(auction.escrow.pending_of(&bidder), 40);
    }

    #[test]
    fn test_reveal_length_checked() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];
        let (c, o) = sealed(10, false, 1);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 10), id, c).unwrap();

        let result = handle_reveal(
            &mut state,
            &ctx(bidder, 2100, 0),
            id,
            &[o.clone(), o.clone()],
        );
        assert_eq!(
            result,
            Err(MarketError::InvalidRevealLength { stored: 1, got: 2 })
        );
    }

    #[test]
    fn test_reveal_is_idempotent_per_bid() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];
        let (c, o) = sealed(10, false, 1);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 15), id, c).unwrap();

        handle_reveal(&mut state, &ctx(bidder, 2100, 0), id, &[o.clone()]).unwrap();
        let matched = handle_reveal(&mut state, &ctx(bidder, 2200, 0), id, &[o]).unwrap();
        assert_eq!(matched, 0);

        // No double credit
        let auction = state.get_auction(id).unwrap();
        assert_eq!(auction.escrow.pending_of(&bidder), 5);
        assert_eq!(auction.highest_bid, 10);
    }

    #[test]
    fn test_withdraw_is_safe_and_idempotent() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];
        let (c, o) = sealed(10, false, 1);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 15), id, c).unwrap();
        handle_reveal(&mut state, &ctx(bidder, 2100, 0), id, &[o]).unwrap();

        assert_eq!(handle_withdraw(&mut state, &ctx(bidder, 2200, 0), id), Ok(5));
        assert_eq!(handle_withdraw(&mut state, &ctx(bidder, 2200, 0), id), Ok(0));
        // Withdrawing with no balance at all is a no-op, not an error
        assert_eq!(
            handle_withdraw(&mut state, &ctx([9u8; 32], 2200, 0), id),
            Ok(0)
        );
    }

    #[test]
    fn test_settle_happy_path_and_idempotence() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let bidder = [3u8; 32];
        let (c, o) = sealed(20, false, 1);
        handle_place_bid(&mut state, &ctx(bidder, 1500, 20), id, c).unwrap();
        handle_reveal(&mut state, &ctx(bidder, 2100, 0), id, &[o]).unwrap();

        assert_eq!(
            handle_settle(&mut state, &ctx([7u8; 32], 2500, 0), id),
            Err(MarketError::Phase(PhaseError::TooEarly))
        );

        let outcome = handle_settle(&mut state, &ctx([7u8; 32], 3000, 0), id).unwrap();
        assert_eq!(outcome.winner, Some(bidder));
        assert_eq!(outcome.winning_bid, 20);
        assert_eq!(outcome.forfeited, 0);

        assert_eq!(
            handle_settle(&mut state, &ctx([7u8; 32], 3001, 0), id),
            Err(MarketError::AlreadyEnded)
        );
    }

    #[test]
    fn test_settle_forfeits_unrevealed_deposits() {
        let mut state = MarketState::new();
        let id = open_auction(&mut state);
        let x = [3u8; 32];
        let y = [4u8; 32];

        let (cx, ox) = sealed(10, false, 1);
        let (cy, _) = sealed(30, false, 2);
        handle_place_bid(&mut state, &ctx(x, 1500, 10), id, cx).unwrap();
        handle_place_bid(&mut state, &ctx(y, 1500, 30), id, cy).unwrap();

        // Only X reveals; Y forfeits their deposit.
        handle_reveal(&mut state, &ctx(x, 2100, 0), id, &[ox]).unwrap();

        let outcome = handle_settle(&mut state, &ctx([7u8; 32], 3000, 0), id).unwrap();
        assert_eq!(outcome.winner, Some(x));
        assert_eq!(outcome.winning_bid, 10);
        assert_eq!(outcome.forfeited, 30);
        assert_eq!(outcome.beneficiary_amount(), 40);

        let auction = state.get_auction(id).unwrap();
        assert!(auction.escrow.conserves_deposits());
    }

    #[test]
    fn test_settle_releases_asset_to_winner() {
        let mut state = MarketState::new();
        let seller = [1u8; 32];
        let winner = [3u8; 32];

        let asset_id =
            handle_register_asset(&mut state, &ctx(seller, 100, 0), AssetMetadata::default())
                .unwrap();
        let id = handle_create_auction(
            &mut state,
            &ctx(seller, 500, 0),
            &params(),
            Some(asset_id),
            seller,
            1000,
            1000,
            1000,
            None,
        )
        .unwrap();
        assert!(state.assets.get(asset_id).unwrap().is_under_auction());

        let (c, o) = sealed(20, false, 1);
        handle_place_bid(&mut state, &ctx(winner, 1500, 20), id, c).unwrap();
        handle_reveal(&mut state, &ctx(winner, 2100, 0), id, &[o]).unwrap();
        handle_settle(&mut state, &ctx([7u8; 32], 3000, 0), id).unwrap();

        let record = state.assets.get(asset_id).unwrap();
        assert_eq!(record.current_owner, winner);
        assert!(!record.is_under_auction());
    }

    #[test]
    fn test_settle_returns_asset_when_no_valid_bid() {
        let mut state = MarketState::new();
        let seller = [1u8; 32];

        let asset_id =
            handle_register_asset(&mut state, &ctx(seller, 100, 0), AssetMetadata::default())
                .unwrap();
        let id = handle_create_auction(
            &mut state,
            &ctx(seller, 500, 0),
            &params(),
            Some(asset_id),
            seller,
            1000,
            1000,
            1000,
            None,
        )
        .unwrap();

        let outcome = handle_settle(&mut state, &ctx([7u8; 32], 3000, 0), id).unwrap();
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.winning_bid, 0);

        let record = state.assets.get(asset_id).unwrap();
        assert_eq!(record.current_owner, seller);
        assert!(!record.is_under_auction());
    }

    #[test]
    fn test_resell_requires_ownership() {
        let mut state = MarketState::new();
        let owner = [1u8; 32];
        let other = [2u8; 32];

        let asset_id =
            handle_register_asset(&mut state, &ctx(owner, 100, 0), AssetMetadata::default())
                .unwrap();

        let result = handle_resell(
            &mut state,
            &ctx(other, 500, 0),
            &params(),
            asset_id,
            other,
            1000,
            1000,
            1000,
            None,
        );
        assert_eq!(result, Err(MarketError::NotOwner));

        let id = handle_resell(
            &mut state,
            &ctx(owner, 500, 0),
            &params(),
            asset_id,
            owner,
            1000,
            1000,
            1000,
            Some(5),
        )
        .unwrap();
        assert_eq!(state.get_auction(id).unwrap().config.asset_id, Some(asset_id));
    }
}
