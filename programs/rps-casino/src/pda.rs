//! Program Derived Address (PDA) derivation functions

use solana_program::pubkey::Pubkey;

use crate::{constants::seeds, oracle::RequestToken};

pub fn find_config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::CASINO_CONFIG], program_id)
}

/// The ledger PDA also custodies the casino's lamports
pub fn find_ledger_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::LEDGER], program_id)
}

pub fn find_bet_address(program_id: &Pubkey, bet_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::BET, &bet_id.to_le_bytes()], program_id)
}

pub fn find_bettor_bets_address(program_id: &Pubkey, bettor: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::BETTOR_BETS, bettor.as_ref()], program_id)
}

pub fn find_request_address(program_id: &Pubkey, token: &RequestToken) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::REQUEST, token.as_ref()], program_id)
}

/// Token and request PDA for a bet, as the program derives them at placement
pub fn find_request_for_bet(program_id: &Pubkey, bet_id: u64, bettor: &Pubkey) -> (RequestToken, Pubkey, u8) {
    let (ledger, _) = find_ledger_address(program_id);
    let token = RequestToken::derive(&ledger, bet_id, bettor);
    let (address, bump) = find_request_address(program_id, &token);
    (token, address, bump)
}
