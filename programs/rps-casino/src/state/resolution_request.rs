use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{constants::discriminators, oracle::RequestToken};

use super::CasinoAccount;

/// Outstanding oracle request. The account exists exactly while the token is
/// pending and is closed by the callback that fulfills it.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    /// Account discriminator
    pub discriminator: [u8; 8],

    pub token: RequestToken,
    pub bet_id: u64,

    /// Funded the account; receives the rent back on fulfillment
    pub bettor: Pubkey,

    pub requested_slot: u64,
    pub requested_at: i64,

    /// Out-of-band resends issued for a stuck request
    pub resend_count: u32,

    pub bump: u8,
}

impl CasinoAccount for ResolutionRequest {
    const DISCRIMINATOR: [u8; 8] = discriminators::RESOLUTION_REQUEST;
}

impl ResolutionRequest {
    pub const LEN: usize = 8 + // discriminator
        32 + // token
        8 + // bet_id
        32 + // bettor
        8 + // requested_slot
        8 + // requested_at
        4 + // resend_count
        1; // bump

    pub fn new(
        token: RequestToken,
        bet_id: u64,
        bettor: Pubkey,
        requested_slot: u64,
        requested_at: i64,
        bump: u8,
    ) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            token,
            bet_id,
            bettor,
            requested_slot,
            requested_at,
            resend_count: 0,
            bump,
        }
    }

    /// Seconds this request has been waiting, for monitoring
    pub fn age(&self, now: i64) -> i64 {
        now.saturating_sub(self.requested_at).max(0)
    }
}
