//! Seeds, discriminators and payout constants

/// PDA seed constants
pub mod seeds {
    pub const CASINO_CONFIG: &[u8] = b"casino_config";
    pub const LEDGER: &[u8] = b"ledger";
    pub const BET: &[u8] = b"bet";
    pub const BETTOR_BETS: &[u8] = b"bettor_bets";
    pub const REQUEST: &[u8] = b"request";
}

/// Account discriminators (8 bytes, ASCII)
pub mod discriminators {
    pub const CASINO_CONFIG: [u8; 8] = *b"RPS_CONF";
    pub const LEDGER: [u8; 8] = *b"RPS_LEDG";
    pub const BET: [u8; 8] = *b"RPS_BET_";
    pub const BETTOR_BETS: [u8; 8] = *b"RPS_BIDX";
    pub const RESOLUTION_REQUEST: [u8; 8] = *b"RPS_RQST";
}

/// Domain tag mixed into every request token
pub const REQUEST_TOKEN_DOMAIN: &[u8] = b"rps-casino:resolution-request:v1";

/// Payout multipliers, in whole multiples of the stake
pub const WIN_MULTIPLIER: u64 = 2;
pub const DRAW_MULTIPLIER: u64 = 1;
pub const LOSS_MULTIPLIER: u64 = 0;

/// Largest multiplier any outcome can pay. Bounds the worst-case obligation of a bet.
pub const MAX_PAYOUT_MULTIPLIER: u64 = WIN_MULTIPLIER;
