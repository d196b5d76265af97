//! Randomness oracle contract
//!
//! Resolution is message passing: the ledger issues a request tagged with a
//! [`RequestToken`] and returns immediately. The oracle answers later, in any
//! order, by delivering one random value per token through the
//! `FulfillRandomness` instruction.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use sha3::{Digest, Keccak256};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::constants::REQUEST_TOKEN_DOMAIN;

/// Correlates a resolution request with its callback
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestToken(pub [u8; 32]);

impl RequestToken {
    /// keccak256(domain || ledger || bet_id_le || bettor)
    pub fn derive(ledger: &Pubkey, bet_id: u64, bettor: &Pubkey) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(REQUEST_TOKEN_DOMAIN);
        hasher.update(ledger.as_ref());
        hasher.update(bet_id.to_le_bytes());
        hasher.update(bettor.as_ref());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for RequestToken {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

/// Consumed by the ledger when a bet is placed.
pub trait RandomnessOracle {
    /// Issue a request for one random value resolving `bet_id`.
    /// Must not wait for the answer.
    fn request_resolution(&mut self, bet_id: u64, bettor: &Pubkey) -> Result<RequestToken, ProgramError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_deterministic_and_unique() {
        let ledger = Pubkey::new_unique();
        let bettor = Pubkey::new_unique();

        let token = RequestToken::derive(&ledger, 7, &bettor);
        assert_eq!(token, RequestToken::derive(&ledger, 7, &bettor));
        assert_ne!(token, RequestToken::derive(&ledger, 8, &bettor));
        assert_ne!(token, RequestToken::derive(&ledger, 7, &Pubkey::new_unique()));
        assert_ne!(token, RequestToken::derive(&Pubkey::new_unique(), 7, &bettor));
    }

    #[test]
    fn test_token_display_is_base58() {
        let token = RequestToken([0u8; 32]);
        assert_eq!(token.to_string(), "11111111111111111111111111111111");
    }
}
