//! Marketplace module error types.

use thiserror::Error;

use market_types::{AssetId, AuctionId};

/// Which side of its window an operation missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("operation attempted before its window opened")]
    TooEarly,

    #[error("operation attempted after its window closed")]
    TooLate,
}

/// Errors that can occur in the marketplace module.
///
/// Every variant aborts the whole call with no partial effect. A malformed
/// individual reveal entry is not an error; it is skipped so that one bad
/// opening cannot block a bidder's other entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error("auction not found: {0}")]
    AuctionNotFound(AuctionId),

    #[error("asset not found: {0}")]
    AssetNotFound(AssetId),

    #[error("phase error: {0}")]
    Phase(PhaseError),

    #[error("auction already ended")]
    AlreadyEnded,

    #[error("caller does not own the asset")]
    NotOwner,

    #[error("asset is already under auction")]
    AlreadyUnderAuction,

    #[error("reveal entries exceed stored bid count: {got} > {stored}")]
    InvalidRevealLength { stored: usize, got: usize },

    #[error("invalid timing configuration")]
    InvalidTiming,
}
