use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError};

use crate::{
    constants::{discriminators, MAX_PAYOUT_MULTIPLIER},
    error::CasinoError,
};

use super::CasinoAccount;

/// Ledger scalars. The ledger PDA's lamports above its rent reserve back
/// `available_balance`.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Sum of stakes over all unclaimed bets
    pub total_bet_locked: u64,

    /// Most the unclaimed bets can still pay out: the top multiplier for
    /// pending bets, the settled payout for resolved ones, nothing for losses
    pub outstanding_exposure: u64,

    /// Deposits - withdrawals - payouts + stakes received
    pub available_balance: u64,

    /// Identifier assigned to the next placed bet
    pub next_bet_id: u64,

    /// Requests issued to the oracle and not yet fulfilled
    pub pending_requests: u64,

    /// Stats
    pub total_deposited: u64,
    pub total_withdrawn: u64,
    pub total_paid_out: u64,
    pub total_claims: u64,

    pub bump: u8,
}

impl CasinoAccount for LedgerState {
    const DISCRIMINATOR: [u8; 8] = discriminators::LEDGER;
}

impl LedgerState {
    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        8 + // total_bet_locked
        8 + // outstanding_exposure
        8 + // available_balance
        8 + // next_bet_id
        8 + // pending_requests
        8 * 4 + // stats
        1 + // bump
        64; // padding for growth

    pub fn new(bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            total_bet_locked: 0,
            outstanding_exposure: 0,
            available_balance: 0,
            next_bet_id: 0,
            pending_requests: 0,
            total_deposited: 0,
            total_withdrawn: 0,
            total_paid_out: 0,
            total_claims: 0,
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

    /// Largest stake admissible right now: available / 2 - locked, floored at zero
    pub fn max_bettable_amount(&self) -> u64 {
        (self.available_balance / MAX_PAYOUT_MULTIPLIER).saturating_sub(self.total_bet_locked)
    }

    /// Worst case still owed on unclaimed bets. Never above twice the locked total.
    pub fn max_exposure(&self) -> u64 {
        self.outstanding_exposure
    }

    /// Balance backing neither locked stakes nor what they may still pay
    pub fn free_liquidity(&self) -> u64 {
        let reserved = self.total_bet_locked.max(self.outstanding_exposure);
        self.available_balance.saturating_sub(reserved)
    }

    pub fn check_solvency(&self) -> Result<(), CasinoError> {
        if self.total_bet_locked > self.available_balance || self.outstanding_exposure > self.available_balance {
            msg!(
                "Solvency violated: locked {}, exposure {}, available {}",
                self.total_bet_locked,
                self.outstanding_exposure,
                self.available_balance
            );
            return Err(CasinoError::SolvencyViolation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_bettable_amount() {
        let mut state = LedgerState::new(254);
        assert_eq!(state.max_bettable_amount(), 0);

        state.available_balance = 1_000_000_000;
        assert_eq!(state.max_bettable_amount(), 500_000_000);

        state.total_bet_locked = 100_000_000;
        assert_eq!(state.max_bettable_amount(), 400_000_000);

        // Locked stakes beyond half the balance clamp to zero
        state.total_bet_locked = 600_000_000;
        assert_eq!(state.max_bettable_amount(), 0);
    }

    #[test]
    fn test_free_liquidity_and_solvency() {
        let mut state = LedgerState::new(254);
        state.available_balance = 1_000_000_000;
        state.total_bet_locked = 100_000_000;
        state.outstanding_exposure = 200_000_000;

        assert_eq!(state.max_exposure(), 200_000_000);
        assert_eq!(state.free_liquidity(), 800_000_000);
        assert!(state.check_solvency().is_ok());

        state.available_balance = 150_000_000;
        assert_eq!(state.free_liquidity(), 0);
        assert_eq!(state.check_solvency(), Err(CasinoError::SolvencyViolation));

        // Resolved losses owe nothing, but their stakes stay reserved
        state.available_balance = 1_000_000_000;
        state.outstanding_exposure = 0;
        assert_eq!(state.free_liquidity(), 900_000_000);

        state.available_balance = 90_000_000;
        assert_eq!(state.check_solvency(), Err(CasinoError::SolvencyViolation));
    }

    #[test]
    fn test_layout_fits_len() {
        let mut state = LedgerState::new(253);
        state.total_bet_locked = u64::MAX;
        state.next_bet_id = 42;

        let mut data = vec![0u8; LedgerState::LEN];
        state.save(&mut data).unwrap();
        assert_eq!(LedgerState::load(&data).unwrap(), state);
    }
}
