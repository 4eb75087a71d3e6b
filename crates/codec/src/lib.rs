//! Sealed-bid commitment construction and verification.
//!
//! A commitment is a deterministic SHA-256 hash over the ordered tuple
//! (value, decoy flag, secret) under a domain-separation tag. Bidders compute
//! commitments off-ledger before submitting; the ledger never sees the
//! plaintext value or secret until the reveal phase. This layer is pure: no
//! side effects, no stored state.

use market_types::{Commitment, Secret};
use sha2::{Digest, Sha256};

const COMMIT_DOMAIN: &[u8] = b"SEALED_BID_COMMIT_V1:";
const SECRET_DOMAIN: &[u8] = b"SEALED_BID_SECRET_V1:";

/// Build the commitment for a bid.
///
/// The value is hashed even for decoy bids. A decoy's value never affects the
/// auction outcome, but binding it prevents the claimed value from being
/// tampered with after the fact.
pub fn commit(value: u64, is_decoy: bool, secret: &Secret) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update(COMMIT_DOMAIN);
    hasher.update(value.to_le_bytes());
    hasher.update([is_decoy as u8]);
    hasher.update(secret.0);
    Commitment(hasher.finalize().into())
}

/// Recompute and compare. Returns false for any mismatch in value, decoy
/// flag, or secret.
pub fn verify(commitment: &Commitment, value: u64, is_decoy: bool, secret: &Secret) -> bool {
    commit(value, is_decoy, secret) == *commitment
}

/// Derive a 32-byte opening secret from a user-chosen passphrase.
pub fn secret_from_passphrase(phrase: &str) -> Secret {
    let mut hasher = Sha256::new();
    hasher.update(SECRET_DOMAIN);
    hasher.update(phrase.as_bytes());
    Secret(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_is_deterministic() {
        let secret = Secret([7u8; 32]);
        assert_eq!(commit(100, false, &secret), commit(100, false, &secret));
    }

    #[test]
    fn test_commit_binds_every_field() {
        let secret = Secret([7u8; 32]);
        let base = commit(100, false, &secret);

        assert_ne!(base, commit(101, false, &secret));
        assert_ne!(base, commit(100, true, &secret));
        assert_ne!(base, commit(100, false, &Secret([8u8; 32])));
    }

    #[test]
    fn test_decoy_value_is_still_bound() {
        // A decoy's value is irrelevant to the outcome but must not be
        // malleable after submission.
        let secret = Secret([3u8; 32]);
        assert_ne!(commit(5, true, &secret), commit(6, true, &secret));
    }

    #[test]
    fn test_verify_round_trip() {
        let secret = secret_from_passphrase("hunter2");
        let commitment = commit(250, false, &secret);

        assert!(verify(&commitment, 250, false, &secret));
        assert!(!verify(&commitment, 250, true, &secret));
        assert!(!verify(&commitment, 251, false, &secret));
        assert!(!verify(
            &commitment,
            250,
            false,
            &secret_from_passphrase("hunter3")
        ));
    }

    #[test]
    fn test_passphrase_derivation_is_stable() {
        assert_eq!(secret_from_passphrase("a"), secret_from_passphrase("a"));
        assert_ne!(secret_from_passphrase("a"), secret_from_passphrase("b"));
    }
}
