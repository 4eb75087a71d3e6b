//! Non-authoritative local record of prepared bids.
//!
//! The store only exists to prefill reveal calls. Losing the file cannot
//! corrupt the ledger; it only makes the affected bids impossible to reveal,
//! forfeiting their deposits.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use market_types::{AuctionId, BidOpening};

use crate::bid::PreparedBid;

/// Errors that can occur loading or saving the bid store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access bid store: {0}")]
    Io(#[from] std::io::Error),

    #[error("bid store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    bids: Vec<PreparedBid>,
}

/// Prepared bids persisted as JSON on the bidder's machine.
#[derive(Debug)]
pub struct BidStore {
    path: PathBuf,
    bids: Vec<PreparedBid>,
}

impl BidStore {
    /// Load the store, treating a missing file as empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let bids = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<StoreFile>(&contents)?.bids,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, bids })
    }

    /// Write the store back to disk.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&StoreFile {
            bids: self.bids.clone(),
        })?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Append a prepared bid.
    pub fn record(&mut self, bid: PreparedBid) {
        self.bids.push(bid);
    }

    /// Bids for one auction, in submission order.
    pub fn bids_for(&self, auction_id: AuctionId) -> Vec<&PreparedBid> {
        let mut bids: Vec<&PreparedBid> = self
            .bids
            .iter()
            .filter(|b| b.auction_id == auction_id)
            .collect();
        bids.sort_by_key(|b| b.submission_index.unwrap_or(usize::MAX));
        bids
    }

    /// Openings ready to prefill a reveal call, in submission order.
    pub fn openings_for(&self, auction_id: AuctionId) -> Vec<BidOpening> {
        self.bids_for(auction_id)
            .into_iter()
            .map(|b| b.opening())
            .collect()
    }

    /// Every recorded bid, in record order.
    pub fn all(&self) -> &[PreparedBid] {
        &self.bids
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bid::{prepare_bid, prepare_decoy};
    use rand::rngs::OsRng;

    fn temp_store_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("market-bidstore-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = BidStore::load(temp_store_path("missing")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_round_trip_and_ordering() {
        let path = temp_store_path("roundtrip");
        let mut rng = OsRng;

        let mut store = BidStore::load(&path).unwrap();
        let mut real = prepare_bid(7, 100, 120, &mut rng).unwrap();
        real.submission_index = Some(1);
        let mut decoy = prepare_decoy(7, 500, 0, &mut rng);
        decoy.submission_index = Some(0);
        let mut other = prepare_bid(8, 10, 10, &mut rng).unwrap();
        other.submission_index = Some(0);

        store.record(real.clone());
        store.record(decoy);
        store.record(other);
        store.save().unwrap();

        let reloaded = BidStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 3);

        let openings = reloaded.openings_for(7);
        assert_eq!(openings.len(), 2);
        // Submission order, not record order
        assert!(openings[0].is_decoy);
        assert_eq!(openings[1].value, 100);

        fs::remove_file(&path).ok();
    }
}
