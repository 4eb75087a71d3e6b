//! Sealed-bid preparation.
//!
//! Commitments are computed off-ledger; the ledger never sees the plaintext
//! value or secret until the reveal phase.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use market_types::{AuctionId, BidOpening, Commitment, Secret};

/// Errors that can occur during bid preparation.
#[derive(Debug, Error)]
pub enum BidError {
    #[error("deposit {deposit} is below the bid value {value}; the reveal would never qualify")]
    DepositBelowValue { value: u64, deposit: u64 },
}

/// A prepared bid plus everything needed to reveal it later.
///
/// This is the persisted local convenience record: losing it cannot corrupt
/// the ledger, but without it the bidder may be unable to reconstruct their
/// reveal parameters and forfeits that bid's deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedBid {
    pub auction_id: AuctionId,
    pub value: u64,
    pub is_decoy: bool,
    pub secret: Secret,
    pub commitment: Commitment,
    pub deposit: u64,
    /// Position in the bidder's on-ledger list, set once the ledger acks
    pub submission_index: Option<usize>,
}

impl PreparedBid {
    /// The opening to disclose during the reveal phase.
    pub fn opening(&self) -> BidOpening {
        BidOpening {
            value: self.value,
            is_decoy: self.is_decoy,
            secret: self.secret,
        }
    }
}

/// Prepare a real bid. The deposit must cover the value or the reveal could
/// never qualify as a candidate.
pub fn prepare_bid<R: RngCore + CryptoRng>(
    auction_id: AuctionId,
    value: u64,
    deposit: u64,
    rng: &mut R,
) -> Result<PreparedBid, BidError> {
    if deposit < value {
        return Err(BidError::DepositBelowValue { value, deposit });
    }
    Ok(build(auction_id, value, false, deposit, rng))
}

/// Prepare a decoy bid to hide the real one among noise. The claimed value
/// never affects the outcome, so any value and deposit are fine.
pub fn prepare_decoy<R: RngCore + CryptoRng>(
    auction_id: AuctionId,
    claimed_value: u64,
    deposit: u64,
    rng: &mut R,
) -> PreparedBid {
    build(auction_id, claimed_value, true, deposit, rng)
}

fn build<R: RngCore + CryptoRng>(
    auction_id: AuctionId,
    value: u64,
    is_decoy: bool,
    deposit: u64,
    rng: &mut R,
) -> PreparedBid {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    let secret = Secret(bytes);
    let commitment = market_codec::commit(value, is_decoy, &secret);

    PreparedBid {
        auction_id,
        value,
        is_decoy,
        secret,
        commitment,
        deposit,
        submission_index: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_prepare_bid_commits_correctly() {
        let mut rng = OsRng;
        let bid = prepare_bid(1, 100, 150, &mut rng).unwrap();

        assert_eq!(bid.deposit, 150);
        assert!(!bid.is_decoy);
        let opening = bid.opening();
        assert!(market_codec::verify(
            &bid.commitment,
            opening.value,
            opening.is_decoy,
            &opening.secret
        ));
    }

    #[test]
    fn test_prepare_bid_rejects_short_deposit() {
        let mut rng = OsRng;
        assert!(matches!(
            prepare_bid(1, 100, 99, &mut rng),
            Err(BidError::DepositBelowValue {
                value: 100,
                deposit: 99
            })
        ));
    }

    #[test]
    fn test_decoy_allows_any_deposit() {
        let mut rng = OsRng;
        let decoy = prepare_decoy(1, 1_000_000, 0, &mut rng);
        assert!(decoy.is_decoy);
        assert_eq!(decoy.deposit, 0);
    }

    #[test]
    fn test_secrets_are_unique() {
        let mut rng = OsRng;
        let a = prepare_decoy(1, 5, 0, &mut rng);
        let b = prepare_decoy(1, 5, 0, &mut rng);
        assert_ne!(a.secret, b.secret);
        assert_ne!(a.commitment, b.commitment);
    }
}
