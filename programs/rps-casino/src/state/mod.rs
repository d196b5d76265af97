pub mod bet;
pub mod bettor_bets;
pub mod config;
pub mod ledger_state;
pub mod resolution_request;

pub use bet::*;
pub use bettor_bets::*;
pub use config::*;
pub use ledger_state::*;
pub use resolution_request::*;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{entrypoint::ProgramResult, msg, program_error::ProgramError};

/// Borsh account layout prefixed with an 8-byte discriminator
pub trait CasinoAccount: BorshSerialize + BorshDeserialize {
    const DISCRIMINATOR: [u8; 8];

    /// Deserialize, tolerating trailing padding
    fn load(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() < Self::DISCRIMINATOR.len() || data[..8] != Self::DISCRIMINATOR {
            msg!("Invalid account discriminator");
            return Err(ProgramError::InvalidAccountData);
        }
        let mut cursor: &[u8] = data;
        Self::deserialize(&mut cursor).map_err(|_| ProgramError::InvalidAccountData)
    }

    fn save(&self, data: &mut [u8]) -> ProgramResult {
        self.serialize(&mut &mut data[..])
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }
}
