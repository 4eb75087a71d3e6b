//! Client SDK for bidding in sealed-bid auctions.
//!
//! This crate provides the off-ledger half of the protocol:
//! - Preparing bid commitments (real and decoy) with fresh secrets
//! - Keeping the local record needed to reveal later
//! - Driving the marketplace over JSON-RPC from the CLI

pub mod bid;
pub mod store;

pub use bid::{prepare_bid, prepare_decoy, BidError, PreparedBid};
pub use store::BidStore;
