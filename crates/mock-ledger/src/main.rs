//! Mock ledger server for local testing of the sealed-bid marketplace.
//!
//! Provides a JSON-RPC server that simulates the ledger runtime: a single
//! writer lock around module state, a simulated block height/timestamp that
//! tests can advance, and the market_* / query_* method surface clients use.

use anyhow::Result;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use market_module::{handlers, CallContext, MarketParams, MarketState};
use market_types::{AssetMetadata, AuctionPhase, BidOpening, Commitment, Secret};

mod types;
use types::*;

/// Shared ledger state.
struct LedgerState {
    /// Module state
    market: MarketState,
    /// Factory parameters
    params: MarketParams,
    /// Current block height (simulated)
    block_height: u64,
    /// Current timestamp (simulated, can be advanced)
    timestamp: u64,
}

impl LedgerState {
    fn new() -> Self {
        Self {
            market: MarketState::new(),
            params: MarketParams::default(),
            block_height: 0,
            timestamp: 0,
        }
    }

    fn advance_block(&mut self) {
        self.block_height += 1;
        self.timestamp += 12; // ~12 second blocks
    }

    fn set_timestamp(&mut self, ts: u64) {
        self.timestamp = ts;
    }
}

/// RPC API definition for the mock ledger.
#[rpc(server)]
pub trait MockLedgerApi {
    // ============ Admin Methods ============

    /// Initialize the ledger with genesis parameters.
    #[method(name = "admin_init")]
    async fn admin_init(&self, config: GenesisConfigRpc) -> Result<bool, ErrorObjectOwned>;

    /// Advance the ledger by one block.
    #[method(name = "admin_advanceBlock")]
    async fn admin_advance_block(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Set the current timestamp (for testing time-dependent logic).
    #[method(name = "admin_setTimestamp")]
    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<bool, ErrorObjectOwned>;

    // ============ Market Methods ============

    /// Mint a new asset record owned by the sender.
    #[method(name = "market_registerAsset")]
    async fn market_register_asset(
        &self,
        params: RegisterAssetParams,
    ) -> Result<u64, ErrorObjectOwned>;

    /// Create a new auction, taking custody of the asset if one is bound.
    #[method(name = "market_createAuction")]
    async fn market_create_auction(
        &self,
        params: CreateAuctionParams,
    ) -> Result<u64, ErrorObjectOwned>;

    /// Re-list an existing asset.
    #[method(name = "market_resell")]
    async fn market_resell(&self, params: ResellParams) -> Result<u64, ErrorObjectOwned>;

    /// Submit a sealed bid; returns its index in the sender's bid list.
    #[method(name = "market_placeBid")]
    async fn market_place_bid(&self, params: PlaceBidParams) -> Result<usize, ErrorObjectOwned>;

    /// Reveal openings; returns how many matched their commitments.
    #[method(name = "market_reveal")]
    async fn market_reveal(&self, params: RevealParams) -> Result<usize, ErrorObjectOwned>;

    /// Withdraw the sender's refundable balance; returns the amount paid.
    #[method(name = "market_withdraw")]
    async fn market_withdraw(
        &self,
        sender: String,
        auction_id: u64,
    ) -> Result<u64, ErrorObjectOwned>;

    /// Settle an auction after its reveal window closes.
    #[method(name = "market_settle")]
    async fn market_settle(
        &self,
        sender: String,
        auction_id: u64,
    ) -> Result<OutcomeRpc, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Get current block info.
    #[method(name = "chain_getBlockInfo")]
    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Get auction by ID.
    #[method(name = "query_getAuction")]
    async fn query_get_auction(
        &self,
        auction_id: u64,
    ) -> Result<Option<AuctionViewRpc>, ErrorObjectOwned>;

    /// Registry listing in creation order.
    #[method(name = "query_listAuctions")]
    async fn query_list_auctions(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<AuctionViewRpc>, ErrorObjectOwned>;

    /// Number of auctions ever created.
    #[method(name = "query_getAuctionCount")]
    async fn query_get_auction_count(&self) -> Result<u64, ErrorObjectOwned>;

    /// Phase and remaining bidding/reveal time for an auction.
    #[method(name = "query_getTimers")]
    async fn query_get_timers(
        &self,
        auction_id: u64,
    ) -> Result<Option<TimersRpc>, ErrorObjectOwned>;

    /// A bidder's sealed bids for an auction, in submission order.
    #[method(name = "query_getBids")]
    async fn query_get_bids(
        &self,
        auction_id: u64,
        bidder: String,
    ) -> Result<Vec<SealedBidRpc>, ErrorObjectOwned>;

    /// A bidder's refundable balance.
    #[method(name = "query_getPendingReturn")]
    async fn query_get_pending_return(
        &self,
        auction_id: u64,
        bidder: String,
    ) -> Result<u64, ErrorObjectOwned>;

    /// Settlement outcome, if settled.
    #[method(name = "query_getOutcome")]
    async fn query_get_outcome(
        &self,
        auction_id: u64,
    ) -> Result<Option<OutcomeRpc>, ErrorObjectOwned>;

    /// One asset record.
    #[method(name = "query_getAsset")]
    async fn query_get_asset(&self, asset_id: u64) -> Result<Option<AssetRpc>, ErrorObjectOwned>;

    /// Notification log slice for off-ledger indexers.
    #[method(name = "query_getEvents")]
    async fn query_get_events(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<EventRpc>, ErrorObjectOwned>;
}

/// Implementation of the mock ledger RPC server.
struct MockLedgerServer {
    state: Arc<RwLock<LedgerState>>,
}

impl MockLedgerServer {
    fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::new())),
        }
    }

    fn make_context(state: &LedgerState, sender: &str, value: u64) -> CallContext {
        CallContext {
            sender: parse_address(sender),
            block_height: state.block_height,
            timestamp: state.timestamp,
            value,
        }
    }

    fn rpc_error(msg: &str) -> ErrorObjectOwned {
        ErrorObjectOwned::owned(-32000, msg.to_string(), None::<()>)
    }

    fn parse_hex32(s: &str, what: &str) -> Result<[u8; 32], ErrorObjectOwned> {
        hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| Self::rpc_error(&format!("Invalid {what} hex: {e}")))?
            .try_into()
            .map_err(|_| Self::rpc_error(&format!("{what} must be 32 bytes")))
    }
}

#[async_trait]
impl MockLedgerApiServer for MockLedgerServer {
    async fn admin_init(&self, config: GenesisConfigRpc) -> Result<bool, ErrorObjectOwned> {
        let mut state = self.state.write();

        if let Some(min) = config.min_bidding_duration {
            state.params.min_bidding_duration = min;
        }
        if let Some(min) = config.min_reveal_duration {
            state.params.min_reveal_duration = min;
        }
        if let Some(ts) = config.initial_timestamp {
            state.timestamp = ts;
        }

        info!("Ledger initialized");
        Ok(true)
    }

    async fn admin_advance_block(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let mut state = self.state.write();
        state.advance_block();
        Ok(BlockInfo {
            height: state.block_height,
            timestamp: state.timestamp,
        })
    }

    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<bool, ErrorObjectOwned> {
        let mut state = self.state.write();
        state.set_timestamp(timestamp);
        info!("Timestamp set to {}", timestamp);
        Ok(true)
    }

    async fn market_register_asset(
        &self,
        params: RegisterAssetParams,
    ) -> Result<u64, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = Self::make_context(&state, &params.sender, 0);

        let metadata = AssetMetadata {
            name: params.name,
            uri: params.uri,
        };
        let asset_id = handlers::handle_register_asset(&mut state.market, &ctx, metadata)
            .map_err(|e| Self::rpc_error(&format!("Failed to register asset: {e}")))?;

        info!("Registered asset {} for {}", asset_id, params.sender);
        Ok(asset_id)
    }

    async fn market_create_auction(
        &self,
        params: CreateAuctionParams,
    ) -> Result<u64, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = Self::make_context(&state, &params.sender, 0);
        let factory_params = state.params.clone();

        let auction_id = handlers::handle_create_auction(
            &mut state.market,
            &ctx,
            &factory_params,
            params.asset_id,
            parse_address(&params.beneficiary),
            params.bidding_start,
            params.bidding_duration,
            params.reveal_duration,
            params.min_price,
        )
        .map_err(|e| Self::rpc_error(&format!("Failed to create auction: {e}")))?;

        info!("Created auction {}", auction_id);
        Ok(auction_id)
    }

    async fn market_resell(&self, params: ResellParams) -> Result<u64, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = Self::make_context(&state, &params.sender, 0);
        let factory_params = state.params.clone();

        let auction_id = handlers::handle_resell(
            &mut state.market,
            &ctx,
            &factory_params,
            params.asset_id,
            parse_address(&params.beneficiary),
            params.bidding_start,
            params.bidding_duration,
            params.reveal_duration,
            params.min_price,
        )
        .map_err(|e| Self::rpc_error(&format!("Failed to resell: {e}")))?;

        info!(
            "Asset {} re-listed as auction {}",
            params.asset_id, auction_id
        );
        Ok(auction_id)
    }

    async fn market_place_bid(&self, params: PlaceBidParams) -> Result<usize, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = Self::make_context(&state, &params.sender, params.deposit);

        let commitment = Commitment(Self::parse_hex32(&params.commitment, "commitment")?);
        let index =
            handlers::handle_place_bid(&mut state.market, &ctx, params.auction_id, commitment)
                .map_err(|e| Self::rpc_error(&format!("Failed to place bid: {e}")))?;

        info!(
            "Bid #{} submitted for auction {} by {} (deposit {})",
            index, params.auction_id, params.sender, params.deposit
        );
        Ok(index)
    }

    async fn market_reveal(&self, params: RevealParams) -> Result<usize, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = Self::make_context(&state, &params.sender, 0);

        let openings = params
            .openings
            .iter()
            .map(|o| {
                Ok(BidOpening {
                    value: o.value,
                    is_decoy: o.is_decoy,
                    secret: Secret(Self::parse_hex32(&o.secret, "secret")?),
                })
            })
            .collect::<Result<Vec<_>, ErrorObjectOwned>>()?;

        let matched = handlers::handle_reveal(&mut state.market, &ctx, params.auction_id, &openings)
            .map_err(|e| Self::rpc_error(&format!("Failed to reveal: {e}")))?;

        info!(
            "{} of {} openings matched for auction {} from {}",
            matched,
            openings.len(),
            params.auction_id,
            params.sender
        );
        Ok(matched)
    }

    async fn market_withdraw(
        &self,
        sender: String,
        auction_id: u64,
    ) -> Result<u64, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = Self::make_context(&state, &sender, 0);

        let amount = handlers::handle_withdraw(&mut state.market, &ctx, auction_id)
            .map_err(|e| Self::rpc_error(&format!("Failed to withdraw: {e}")))?;

        // The balance is already zeroed; the runtime pays out afterwards.
        info!("Paid {} to {} from auction {}", amount, sender, auction_id);
        Ok(amount)
    }

    async fn market_settle(
        &self,
        sender: String,
        auction_id: u64,
    ) -> Result<OutcomeRpc, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = Self::make_context(&state, &sender, 0);

        let outcome = handlers::handle_settle(&mut state.market, &ctx, auction_id)
            .map_err(|e| Self::rpc_error(&format!("Failed to settle: {e}")))?;

        info!(
            "Auction {} settled; beneficiary receives {}",
            auction_id,
            outcome.beneficiary_amount()
        );
        Ok(OutcomeRpc::from(outcome))
    }

    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(BlockInfo {
            height: state.block_height,
            timestamp: state.timestamp,
        })
    }

    async fn query_get_auction(
        &self,
        auction_id: u64,
    ) -> Result<Option<AuctionViewRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state.market.get_auction(auction_id).map(AuctionViewRpc::from))
    }

    async fn query_list_auctions(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<AuctionViewRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .market
            .auctions_page(offset as usize, limit as usize)
            .into_iter()
            .map(AuctionViewRpc::from)
            .collect())
    }

    async fn query_get_auction_count(&self) -> Result<u64, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state.market.auction_count() as u64)
    }

    async fn query_get_timers(
        &self,
        auction_id: u64,
    ) -> Result<Option<TimersRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        let now = state.timestamp;
        Ok(state.market.get_auction(auction_id).map(|auction| {
            let phase = match auction.phase_at(now) {
                AuctionPhase::Pending => "pending",
                AuctionPhase::Bidding => "bidding",
                AuctionPhase::Revealing => "revealing",
                AuctionPhase::Ended => "ended",
            };
            TimersRpc {
                phase: phase.to_string(),
                bidding_remaining: auction.config.remaining_bidding(now),
                reveal_remaining: auction.config.remaining_reveal(now),
            }
        }))
    }

    async fn query_get_bids(
        &self,
        auction_id: u64,
        bidder: String,
    ) -> Result<Vec<SealedBidRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        let bidder = parse_address(&bidder);
        Ok(state
            .market
            .get_auction(auction_id)
            .map(|auction| auction.bids_of(&bidder).iter().map(SealedBidRpc::from).collect())
            .unwrap_or_default())
    }

    async fn query_get_pending_return(
        &self,
        auction_id: u64,
        bidder: String,
    ) -> Result<u64, ErrorObjectOwned> {
        let state = self.state.read();
        let bidder = parse_address(&bidder);
        Ok(state
            .market
            .get_auction(auction_id)
            .map(|auction| auction.escrow.pending_of(&bidder))
            .unwrap_or(0))
    }

    async fn query_get_outcome(
        &self,
        auction_id: u64,
    ) -> Result<Option<OutcomeRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .market
            .get_auction(auction_id)
            .and_then(|a| a.outcome.clone())
            .map(OutcomeRpc::from))
    }

    async fn query_get_asset(&self, asset_id: u64) -> Result<Option<AssetRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state.market.assets.get(asset_id).map(AssetRpc::from))
    }

    async fn query_get_events(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<EventRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .market
            .events_page(offset as usize, limit as usize)
            .iter()
            .map(EventRpc::from)
            .collect())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_ledger=info".parse().unwrap())
                .add_directive("jsonrpsee=warn".parse().unwrap()),
        )
        .init();

    let addr: SocketAddr = "127.0.0.1:9944".parse()?;

    info!("Starting mock ledger server on {}", addr);

    let server = Server::builder().build(addr).await?;
    let handle = server.start(MockLedgerServer::new().into_rpc());

    info!("Mock ledger server running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}
