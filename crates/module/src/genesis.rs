//! Genesis configuration for the marketplace module.

use serde::{Deserialize, Serialize};

use market_types::{Address, AssetMetadata};

use crate::state::MarketState;

/// Parameters enforced by the auction factory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketParams {
    /// Minimum length of the bidding window (seconds)
    pub min_bidding_duration: u64,
    /// Minimum length of the reveal window (seconds)
    pub min_reveal_duration: u64,
}

/// An asset record seeded at genesis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisAsset {
    pub owner: Address,
    pub metadata: AssetMetadata,
}

/// Initial configuration for the marketplace.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MarketGenesisConfig {
    pub params: MarketParams,
    pub initial_assets: Vec<GenesisAsset>,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            min_bidding_duration: 600,
            min_reveal_duration: 600,
        }
    }
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenesisValidationError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl MarketGenesisConfig {
    /// Validate the genesis configuration.
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        if self.params.min_bidding_duration == 0 {
            return Err(GenesisValidationError::InvalidParams(
                "minimum bidding duration cannot be zero".into(),
            ));
        }
        if self.params.min_reveal_duration == 0 {
            return Err(GenesisValidationError::InvalidParams(
                "minimum reveal duration cannot be zero".into(),
            ));
        }
        Ok(())
    }

    /// Seed a fresh state with the configured assets.
    pub fn apply(&self, state: &mut MarketState) {
        for asset in &self.initial_assets {
            let asset_id = state
                .assets
                .register(asset.owner, asset.metadata.clone(), 0);
            state.emit(market_types::MarketEvent::AssetRegistered {
                asset_id,
                creator: asset.owner,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MarketGenesisConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_durations_rejected() {
        let mut config = MarketGenesisConfig::default();
        config.params.min_bidding_duration = 0;
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::InvalidParams(_))
        ));

        let mut config = MarketGenesisConfig::default();
        config.params.min_reveal_duration = 0;
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_apply_seeds_assets() {
        let config = MarketGenesisConfig {
            params: MarketParams::default(),
            initial_assets: vec![GenesisAsset {
                owner: [1u8; 32],
                metadata: AssetMetadata::default(),
            }],
        };

        let mut state = MarketState::new();
        config.apply(&mut state);

        assert_eq!(state.assets.len(), 1);
        assert_eq!(state.events.len(), 1);
    }
}
