//! Asset records and custody transfer.
//!
//! The registry is the single concrete implementer of the narrow ownership
//! and custody capabilities the auction lifecycle needs; the set of
//! implementers is closed, so no dynamic dispatch is involved.

use std::collections::HashMap;

use market_types::{Address, AssetId, AssetMetadata, AssetRecord, AuctionId};

use crate::error::MarketError;

/// Read access to asset ownership.
pub trait AssetOwnership {
    fn owner_of(&self, asset_id: AssetId) -> Option<Address>;
}

/// Custody operations available to auction creation and settlement.
pub trait AssetCustodian: AssetOwnership {
    /// Move an asset out of auction custody to `new_owner`.
    fn release_to(&mut self, asset_id: AssetId, new_owner: Address) -> Result<(), MarketError>;
}

/// The asset registry backing the marketplace.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    next_asset_id: AssetId,
    assets: HashMap<AssetId, AssetRecord>,
    order: Vec<AssetId>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self {
            next_asset_id: 1,
            ..Default::default()
        }
    }

    /// Mint a new asset record owned by its creator.
    pub fn register(&mut self, creator: Address, metadata: AssetMetadata, now: u64) -> AssetId {
        let asset_id = self.next_asset_id;
        self.next_asset_id += 1;
        self.assets.insert(
            asset_id,
            AssetRecord {
                asset_id,
                creator,
                current_owner: creator,
                held_by: None,
                created_at: now,
                metadata,
            },
        );
        self.order.push(asset_id);
        asset_id
    }

    pub fn get(&self, asset_id: AssetId) -> Option<&AssetRecord> {
        self.assets.get(&asset_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Asset records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetRecord> {
        self.order.iter().filter_map(|id| self.assets.get(id))
    }

    /// Preconditions for listing an asset: the caller owns it and no auction
    /// currently holds it.
    pub fn check_listable(
        &self,
        asset_id: AssetId,
        expected_owner: &Address,
    ) -> Result<(), MarketError> {
        let record = self
            .assets
            .get(&asset_id)
            .ok_or(MarketError::AssetNotFound(asset_id))?;
        if record.current_owner != *expected_owner {
            return Err(MarketError::NotOwner);
        }
        if record.is_under_auction() {
            return Err(MarketError::AlreadyUnderAuction);
        }
        Ok(())
    }

    /// Place an asset into an auction's custody.
    pub fn take_into_custody(
        &mut self,
        asset_id: AssetId,
        expected_owner: &Address,
        auction_id: AuctionId,
    ) -> Result<(), MarketError> {
        self.check_listable(asset_id, expected_owner)?;
        if let Some(record) = self.assets.get_mut(&asset_id) {
            record.held_by = Some(auction_id);
        }
        Ok(())
    }
}

impl AssetOwnership for AssetRegistry {
    fn owner_of(&self, asset_id: AssetId) -> Option<Address> {
        self.assets.get(&asset_id).map(|r| r.current_owner)
    }
}

impl AssetCustodian for AssetRegistry {
    fn release_to(&mut self, asset_id: AssetId, new_owner: Address) -> Result<(), MarketError> {
        let record = self
            .assets
            .get_mut(&asset_id)
            .ok_or(MarketError::AssetNotFound(asset_id))?;
        record.held_by = None;
        record.current_owner = new_owner;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_ownership() {
        let mut registry = AssetRegistry::new();
        let creator = [1u8; 32];

        let id = registry.register(creator, AssetMetadata::default(), 10);
        assert_eq!(id, 1);
        assert_eq!(registry.owner_of(id), Some(creator));
        assert_eq!(registry.get(id).map(|r| r.created_at), Some(10));
        assert!(!registry.get(id).map(|r| r.is_under_auction()).unwrap());
    }

    #[test]
    fn test_custody_round_trip() {
        let mut registry = AssetRegistry::new();
        let seller = [1u8; 32];
        let winner = [2u8; 32];

        let id = registry.register(seller, AssetMetadata::default(), 0);
        registry.take_into_custody(id, &seller, 9).unwrap();
        assert_eq!(registry.get(id).and_then(|r| r.held_by), Some(9));

        registry.release_to(id, winner).unwrap();
        assert_eq!(registry.owner_of(id), Some(winner));
        assert!(registry.get(id).and_then(|r| r.held_by).is_none());
    }

    #[test]
    fn test_custody_rejects_non_owner() {
        let mut registry = AssetRegistry::new();
        let owner = [1u8; 32];
        let other = [2u8; 32];

        let id = registry.register(owner, AssetMetadata::default(), 0);
        assert_eq!(
            registry.take_into_custody(id, &other, 1),
            Err(MarketError::NotOwner)
        );
    }

    #[test]
    fn test_custody_rejects_double_listing() {
        let mut registry = AssetRegistry::new();
        let owner = [1u8; 32];

        let id = registry.register(owner, AssetMetadata::default(), 0);
        registry.take_into_custody(id, &owner, 1).unwrap();
        assert_eq!(
            registry.take_into_custody(id, &owner, 2),
            Err(MarketError::AlreadyUnderAuction)
        );
    }

    #[test]
    fn test_missing_asset() {
        let mut registry = AssetRegistry::new();
        assert_eq!(
            registry.take_into_custody(42, &[0u8; 32], 1),
            Err(MarketError::AssetNotFound(42))
        );
        assert_eq!(
            registry.release_to(42, [0u8; 32]),
            Err(MarketError::AssetNotFound(42))
        );
    }
}
