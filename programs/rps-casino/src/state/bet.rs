use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::discriminators,
    oracle::RequestToken,
    outcome::{Choice, Outcome},
};

use super::CasinoAccount;

/// Derived lifecycle of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetStatus {
    /// Waiting for the oracle callback
    Pending,
    Won,
    Drawn,
    /// Terminal, never claimable
    Lost,
    Claimed,
}

/// A single stake. Never deleted; kept as an audit trail after settlement.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Bet {
    /// Account discriminator
    pub discriminator: [u8; 8],

    pub id: u64,
    pub bettor: Pubkey,

    /// Stake in lamports
    pub amount: u64,

    pub bettor_choice: Choice,

    /// Set once by the oracle callback
    pub platform_choice: Option<Choice>,

    /// Set once by a successful claim
    pub claimed: bool,

    /// Token of the resolution request issued at placement
    pub request_token: RequestToken,

    pub placed_at: i64,

    /// Zero until resolved
    pub resolved_at: i64,

    pub bump: u8,
}

impl CasinoAccount for Bet {
    const DISCRIMINATOR: [u8; 8] = discriminators::BET;
}

impl Bet {
    pub const LEN: usize = 8 + // discriminator
        8 + // id
        32 + // bettor
        8 + // amount
        1 + // bettor_choice
        2 + // platform_choice (option tag + value)
        1 + // claimed
        32 + // request_token
        8 + // placed_at
        8 + // resolved_at
        1; // bump

    pub fn new(
        id: u64,
        bettor: Pubkey,
        amount: u64,
        bettor_choice: Choice,
        request_token: RequestToken,
        placed_at: i64,
    ) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            id,
            bettor,
            amount,
            bettor_choice,
            platform_choice: None,
            claimed: false,
            request_token,
            placed_at,
            resolved_at: 0,
            bump: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.platform_choice.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.platform_choice
            .map(|platform| Outcome::determine(self.bettor_choice, platform))
    }

    /// What a claim would pay right now; zero when the bet is not claimable
    pub fn claimable_amount(&self) -> u64 {
        if self.claimed {
            return 0;
        }
        self.outcome()
            .and_then(|outcome| outcome.payout(self.amount).ok())
            .unwrap_or(0)
    }

    pub fn status(&self) -> BetStatus {
        if self.claimed {
            return BetStatus::Claimed;
        }
        match self.outcome() {
            None => BetStatus::Pending,
            Some(Outcome::Win) => BetStatus::Won,
            Some(Outcome::Draw) => BetStatus::Drawn,
            Some(Outcome::Loss) => BetStatus::Lost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet(choice: Choice) -> Bet {
        Bet::new(3, Pubkey::new_unique(), 100_000_000, choice, RequestToken([9u8; 32]), 1_700_000_000)
    }

    #[test]
    fn test_status_and_claimable_amount() {
        let mut paper = bet(Choice::Paper);
        assert_eq!(paper.status(), BetStatus::Pending);
        assert_eq!(paper.claimable_amount(), 0);

        paper.platform_choice = Some(Choice::Rock);
        assert_eq!(paper.status(), BetStatus::Won);
        assert_eq!(paper.claimable_amount(), 200_000_000);

        paper.claimed = true;
        assert_eq!(paper.status(), BetStatus::Claimed);
        assert_eq!(paper.claimable_amount(), 0);

        let mut rock = bet(Choice::Rock);
        rock.platform_choice = Some(Choice::Rock);
        assert_eq!(rock.status(), BetStatus::Drawn);
        assert_eq!(rock.claimable_amount(), 100_000_000);

        let mut scissors = bet(Choice::Scissors);
        scissors.platform_choice = Some(Choice::Rock);
        assert_eq!(scissors.status(), BetStatus::Lost);
        assert_eq!(scissors.claimable_amount(), 0);
    }

    #[test]
    fn test_layout_fits_len() {
        let mut resolved = bet(Choice::Scissors);
        resolved.platform_choice = Some(Choice::Paper);
        resolved.resolved_at = 1_700_000_100;

        let mut data = vec![0u8; Bet::LEN];
        resolved.save(&mut data).unwrap();
        assert_eq!(Bet::load(&data).unwrap(), resolved);

        // An unresolved bet serializes shorter; the trailing byte is padding
        let pending = bet(Choice::Rock);
        let mut data = vec![0u8; Bet::LEN];
        pending.save(&mut data).unwrap();
        assert_eq!(Bet::load(&data).unwrap(), pending);
    }
}
