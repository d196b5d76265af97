use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::constants::discriminators;

use super::CasinoAccount;

/// Append-only index of the bets placed by one bettor, in placement order.
/// The account grows by one id per bet.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct BettorBets {
    /// Account discriminator
    pub discriminator: [u8; 8],

    pub bettor: Pubkey,

    pub bump: u8,

    /// Must stay last so appends only extend the tail
    pub bet_ids: Vec<u64>,
}

impl CasinoAccount for BettorBets {
    const DISCRIMINATOR: [u8; 8] = discriminators::BETTOR_BETS;
}

impl BettorBets {
    pub const BASE_LEN: usize = 8 + // discriminator
        32 + // bettor
        1 + // bump
        4; // bet_ids length prefix

    pub fn space_for(count: usize) -> usize {
        Self::BASE_LEN + 8 * count
    }

    pub fn new(bettor: Pubkey, bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            bettor,
            bump,
            bet_ids: Vec::new(),
        }
    }

    pub fn push(&mut self, bet_id: u64) {
        self.bet_ids.push(bet_id);
    }

    pub fn len(&self) -> usize {
        self.bet_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bet_ids.is_empty()
    }

    pub fn bet_ids(&self) -> &[u64] {
        &self.bet_ids
    }

    /// Indexed lookup, oldest first
    pub fn bet_id_at(&self, index: usize) -> Option<u64> {
        self.bet_ids.get(index).copied()
    }
}
