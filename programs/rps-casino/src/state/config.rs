use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{constants::discriminators, error::CasinoError};

use super::CasinoAccount;

/// Kill-switch over bet placement and claim settlement.
/// Liquidity operations ignore it.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreaker {
    Active,
    Paused,
}

/// Access control and circuit breaker for the casino.
/// Handed to the ledger engine on construction.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct CasinoConfig {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Owner: withdraws liquidity, toggles the breaker, rotates the oracle
    pub owner: Pubkey,

    /// Only signer allowed to deliver randomness
    pub oracle_authority: Pubkey,

    pub circuit_breaker: CircuitBreaker,

    /// Unix timestamp of the last breaker transition
    pub last_breaker_change: i64,

    /// Ledger PDA governed by this config
    pub ledger: Pubkey,

    pub bump: u8,
}

impl CasinoAccount for CasinoConfig {
    const DISCRIMINATOR: [u8; 8] = discriminators::CASINO_CONFIG;
}

impl CasinoConfig {
    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        32 + // owner
        32 + // oracle_authority
        1 + // circuit_breaker
        8 + // last_breaker_change
        32 + // ledger
        1 + // bump
        64; // padding for growth

    pub fn new(owner: Pubkey, oracle_authority: Pubkey, ledger: Pubkey, bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            owner,
            oracle_authority,
            circuit_breaker: CircuitBreaker::Active,
            last_breaker_change: 0,
            ledger,
            bump,
        }
    }

    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }
        if !self.is_initialized {
            return Err(CasinoError::NotInitialized.into());
        }
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.circuit_breaker == CircuitBreaker::Paused
    }

    pub fn require_active(&self) -> Result<(), CasinoError> {
        if self.is_paused() {
            msg!("Circuit breaker engaged");
            return Err(CasinoError::Paused);
        }
        Ok(())
    }

    pub fn require_owner(&self, caller: &Pubkey) -> Result<(), CasinoError> {
        if *caller != self.owner {
            msg!("Caller {} is not the owner", caller);
            return Err(CasinoError::Unauthorized);
        }
        Ok(())
    }

    pub fn require_oracle(&self, caller: &Pubkey) -> Result<(), CasinoError> {
        if *caller != self.oracle_authority {
            msg!("Caller {} is not the oracle authority", caller);
            return Err(CasinoError::Unauthorized);
        }
        Ok(())
    }

    pub fn pause(&mut self, caller: &Pubkey, now: i64) -> Result<(), CasinoError> {
        self.require_owner(caller)?;
        if self.is_paused() {
            return Err(CasinoError::AlreadyPaused);
        }
        self.circuit_breaker = CircuitBreaker::Paused;
        self.last_breaker_change = now;
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Pubkey, now: i64) -> Result<(), CasinoError> {
        self.require_owner(caller)?;
        if !self.is_paused() {
            return Err(CasinoError::NotPaused);
        }
        self.circuit_breaker = CircuitBreaker::Active;
        self.last_breaker_change = now;
        Ok(())
    }

    /// Returns the previous owner
    pub fn transfer_ownership(&mut self, caller: &Pubkey, new_owner: Pubkey) -> Result<Pubkey, CasinoError> {
        self.require_owner(caller)?;
        if new_owner == Pubkey::default() {
            return Err(CasinoError::Unauthorized);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    /// Returns the previous oracle authority
    pub fn set_oracle_authority(&mut self, caller: &Pubkey, oracle_authority: Pubkey) -> Result<Pubkey, CasinoError> {
        self.require_owner(caller)?;
        Ok(std::mem::replace(&mut self.oracle_authority, oracle_authority))
    }
}
