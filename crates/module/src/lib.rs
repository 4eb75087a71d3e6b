//! Sealed-bid marketplace module.
//!
//! This crate implements the ledger-side logic of the marketplace:
//!
//! - Asset registration and custody during auctions
//! - Auction creation with configurable timing and a factory registry
//! - Sealed bid submission with escrowed deposits
//! - Commitment-verified reveals with running highest-bid bookkeeping
//! - Exactly-once settlement and safe withdrawal of refundable balances
//!
//! # Architecture
//!
//! - `call`: Message types for state-changing operations
//! - `handlers`: Business logic for processing calls
//! - `queries`: Read-only state access
//! - `state`: Ledger state structures
//! - `escrow`: Per-auction refundable balance ledger
//! - `custody`: Asset registry and custody capabilities
//! - `genesis`: Initial configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```ignore
//! use market_module::{handlers, state::MarketState, MarketParams};
//!
//! let mut state = MarketState::new();
//! let params = MarketParams::default();
//! let ctx = handlers::CallContext { ... };
//!
//! // Create an auction
//! let auction_id = handlers::handle_create_auction(&mut state, &ctx, &params, ...)?;
//!
//! // Submit a sealed bid
//! handlers::handle_place_bid(&mut state, &ctx, auction_id, commitment)?;
//! ```

pub mod call;
pub mod custody;
pub mod error;
pub mod escrow;
pub mod genesis;
pub mod handlers;
pub mod queries;
pub mod state;

pub use call::MarketCall;
pub use custody::{AssetCustodian, AssetOwnership, AssetRegistry};
pub use error::{MarketError, PhaseError};
pub use escrow::EscrowLedger;
pub use genesis::{MarketGenesisConfig, MarketParams};
pub use handlers::{CallContext, HandlerResult};
pub use queries::{MarketQuery, MarketQueryResponse};
pub use state::{AuctionInstance, MarketState};
