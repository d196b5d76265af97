use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::{
    oracle::RequestToken,
    pda::{
        find_bet_address, find_bettor_bets_address, find_config_address, find_ledger_address,
        find_request_address, find_request_for_bet,
    },
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum CasinoInstruction {
    /// Create the casino config and the ledger
    /// Accounts:
    /// 0. `[signer, writable]` Owner (payer)
    /// 1. `[writable]` Casino config PDA
    /// 2. `[writable]` Ledger PDA
    /// 3. `[]` System program
    Initialize {
        oracle_authority: Pubkey,
    },

    /// Stake lamports on a choice and request resolution
    /// Accounts:
    /// 0. `[signer, writable]` Bettor
    /// 1. `[]` Casino config PDA
    /// 2. `[writable]` Ledger PDA
    /// 3. `[writable]` Bet PDA for the ledger's next bet id
    /// 4. `[writable]` Bettor bets index PDA
    /// 5. `[writable]` Resolution request PDA
    /// 6. `[]` System program
    PlaceBet {
        choice: u8, // 0=Rock, 1=Paper, 2=Scissors
        stake: u64,
    },

    /// Oracle callback delivering the random value for one request
    /// Accounts:
    /// 0. `[signer]` Oracle authority
    /// 1. `[]` Casino config PDA
    /// 2. `[writable]` Ledger PDA
    /// 3. `[writable]` Resolution request PDA
    /// 4. `[writable]` Bet PDA
    /// 5. `[writable]` Bettor (receives the request rent)
    FulfillRandomness {
        random_value: [u8; 32],
    },

    /// Settle a resolved win or draw
    /// Accounts:
    /// 0. `[signer, writable]` Bettor
    /// 1. `[]` Casino config PDA
    /// 2. `[writable]` Ledger PDA
    /// 3. `[writable]` Bet PDA
    ClaimBet {
        bet_id: u64,
    },

    /// Add liquidity
    /// Accounts:
    /// 0. `[signer, writable]` Depositor
    /// 1. `[]` Casino config PDA
    /// 2. `[writable]` Ledger PDA
    /// 3. `[]` System program
    Deposit {
        amount: u64,
    },

    /// Remove free liquidity
    /// Accounts:
    /// 0. `[signer, writable]` Owner
    /// 1. `[]` Casino config PDA
    /// 2. `[writable]` Ledger PDA
    Withdraw {
        amount: u64,
    },

    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Casino config PDA
    Pause,

    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Casino config PDA
    Unpause,

    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Casino config PDA
    TransferOwnership {
        new_owner: Pubkey,
    },

    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Casino config PDA
    SetOracleAuthority {
        oracle_authority: Pubkey,
    },

    /// Re-announce a request the oracle has not answered
    /// Accounts:
    /// 0. `[signer]` Owner or bettor
    /// 1. `[]` Casino config PDA
    /// 2. `[]` Bet PDA
    /// 3. `[writable]` Resolution request PDA
    ResendResolutionRequest {
        bet_id: u64,
    },
}

impl CasinoInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| ProgramError::InvalidInstructionData)
    }

    /// Tag byte followed by the borsh payload. Serializing into a `Vec` only
    /// fails on allocation, and empty data is rejected by `unpack`.
    pub fn pack(&self) -> Vec<u8> {
        self.try_to_vec().unwrap_or_default()
    }
}

// Helper functions to create instructions

pub fn initialize(program_id: &Pubkey, owner: &Pubkey, oracle_authority: &Pubkey) -> Instruction {
    let (config, _) = find_config_address(program_id);
    let (ledger, _) = find_ledger_address(program_id);

    let accounts = vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new(config, false),
        AccountMeta::new(ledger, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    let data = CasinoInstruction::Initialize {
        oracle_authority: *oracle_authority,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// `bet_id` must be the ledger's current `next_bet_id`
pub fn place_bet(program_id: &Pubkey, bettor: &Pubkey, bet_id: u64, choice: u8, stake: u64) -> Instruction {
    let (config, _) = find_config_address(program_id);
    let (ledger, _) = find_ledger_address(program_id);
    let (bet, _) = find_bet_address(program_id, bet_id);
    let (bettor_bets, _) = find_bettor_bets_address(program_id, bettor);
    let (_, request, _) = find_request_for_bet(program_id, bet_id, bettor);

    let accounts = vec![
        AccountMeta::new(*bettor, true),
        AccountMeta::new_readonly(config, false),
        AccountMeta::new(ledger, false),
        AccountMeta::new(bet, false),
        AccountMeta::new(bettor_bets, false),
        AccountMeta::new(request, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    let data = CasinoInstruction::PlaceBet { choice, stake }.pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn fulfill_randomness(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    token: &RequestToken,
    bet_id: u64,
    bettor: &Pubkey,
    random_value: [u8; 32],
) -> Instruction {
    let (config, _) = find_config_address(program_id);
    let (ledger, _) = find_ledger_address(program_id);
    let (request, _) = find_request_address(program_id, token);
    let (bet, _) = find_bet_address(program_id, bet_id);

    let accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new_readonly(config, false),
        AccountMeta::new(ledger, false),
        AccountMeta::new(request, false),
        AccountMeta::new(bet, false),
        AccountMeta::new(*bettor, false),
    ];
    let data = CasinoInstruction::FulfillRandomness { random_value }.pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn claim_bet(program_id: &Pubkey, bettor: &Pubkey, bet_id: u64) -> Instruction {
    let (config, _) = find_config_address(program_id);
    let (ledger, _) = find_ledger_address(program_id);
    let (bet, _) = find_bet_address(program_id, bet_id);

    let accounts = vec![
        AccountMeta::new(*bettor, true),
        AccountMeta::new_readonly(config, false),
        AccountMeta::new(ledger, false),
        AccountMeta::new(bet, false),
    ];
    let data = CasinoInstruction::ClaimBet { bet_id }.pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn deposit(program_id: &Pubkey, depositor: &Pubkey, amount: u64) -> Instruction {
    let (config, _) = find_config_address(program_id);
    let (ledger, _) = find_ledger_address(program_id);

    let accounts = vec![
        AccountMeta::new(*depositor, true),
        AccountMeta::new_readonly(config, false),
        AccountMeta::new(ledger, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    let data = CasinoInstruction::Deposit { amount }.pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn withdraw(program_id: &Pubkey, owner: &Pubkey, amount: u64) -> Instruction {
    let (config, _) = find_config_address(program_id);
    let (ledger, _) = find_ledger_address(program_id);

    let accounts = vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new_readonly(config, false),
        AccountMeta::new(ledger, false),
    ];
    let data = CasinoInstruction::Withdraw { amount }.pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

fn owner_instruction(program_id: &Pubkey, owner: &Pubkey, instruction: CasinoInstruction) -> Instruction {
    let (config, _) = find_config_address(program_id);

    let accounts = vec![
        AccountMeta::new_readonly(*owner, true),
        AccountMeta::new(config, false),
    ];
    let data = instruction.pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn pause(program_id: &Pubkey, owner: &Pubkey) -> Instruction {
    owner_instruction(program_id, owner, CasinoInstruction::Pause)
}

pub fn unpause(program_id: &Pubkey, owner: &Pubkey) -> Instruction {
    owner_instruction(program_id, owner, CasinoInstruction::Unpause)
}

pub fn transfer_ownership(program_id: &Pubkey, owner: &Pubkey, new_owner: &Pubkey) -> Instruction {
    owner_instruction(
        program_id,
        owner,
        CasinoInstruction::TransferOwnership { new_owner: *new_owner },
    )
}

pub fn set_oracle_authority(program_id: &Pubkey, owner: &Pubkey, oracle_authority: &Pubkey) -> Instruction {
    owner_instruction(
        program_id,
        owner,
        CasinoInstruction::SetOracleAuthority {
            oracle_authority: *oracle_authority,
        },
    )
}

pub fn resend_resolution_request(program_id: &Pubkey, caller: &Pubkey, bet_id: u64, bettor: &Pubkey) -> Instruction {
    let (config, _) = find_config_address(program_id);
    let (bet, _) = find_bet_address(program_id, bet_id);
    let (_, request, _) = find_request_for_bet(program_id, bet_id, bettor);

    let accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new_readonly(config, false),
        AccountMeta::new_readonly(bet, false),
        AccountMeta::new(request, false),
    ];
    let data = CasinoInstruction::ResendResolutionRequest { bet_id }.pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_matches_wire_tags() {
        let place = CasinoInstruction::PlaceBet { choice: 1, stake: 100_000_000 };
        let data = place.try_to_vec().unwrap();
        assert_eq!(data[0], 1);
        assert_eq!(CasinoInstruction::unpack(&data).unwrap(), place);

        assert_eq!(CasinoInstruction::unpack(&[6]).unwrap(), CasinoInstruction::Pause);
        assert_eq!(CasinoInstruction::unpack(&[7]).unwrap(), CasinoInstruction::Unpause);

        assert_eq!(CasinoInstruction::unpack(&[]), Err(ProgramError::InvalidInstructionData));
        assert_eq!(CasinoInstruction::unpack(&[42]), Err(ProgramError::InvalidInstructionData));
        // Truncated payload
        assert_eq!(CasinoInstruction::unpack(&[5, 1, 2]), Err(ProgramError::InvalidInstructionData));
    }

    #[test]
    fn test_place_bet_targets_derived_accounts() {
        let program_id = Pubkey::new_unique();
        let bettor = Pubkey::new_unique();
        let ix = place_bet(&program_id, &bettor, 3, 2, 50);

        let (bet, _) = find_bet_address(&program_id, 3);
        let (_, request, _) = find_request_for_bet(&program_id, 3, &bettor);
        assert_eq!(ix.accounts[0].pubkey, bettor);
        assert!(ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[3].pubkey, bet);
        assert_eq!(ix.accounts[5].pubkey, request);
        assert_eq!(
            CasinoInstruction::unpack(&ix.data).unwrap(),
            CasinoInstruction::PlaceBet { choice: 2, stake: 50 }
        );
    }

    #[test]
    fn test_resend_touches_only_bet_and_request() {
        let program_id = Pubkey::new_unique();
        let caller = Pubkey::new_unique();
        let bettor = Pubkey::new_unique();
        let ix = resend_resolution_request(&program_id, &caller, 4, &bettor);

        let (ledger, _) = find_ledger_address(&program_id);
        let (bet, _) = find_bet_address(&program_id, 4);
        let (_, request, _) = find_request_for_bet(&program_id, 4, &bettor);
        assert_eq!(ix.accounts.len(), 4);
        assert!(ix.accounts.iter().all(|meta| meta.pubkey != ledger));
        assert_eq!(ix.accounts[2].pubkey, bet);
        assert!(!ix.accounts[2].is_writable);
        assert_eq!(ix.accounts[3].pubkey, request);
        assert!(ix.accounts[3].is_writable);
        assert_eq!(ix.data, vec![10, 4, 0, 0, 0, 0, 0, 0, 0]);
    }
}
