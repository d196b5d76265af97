// Rock-paper-scissors wagering ledger
// Native Solana implementation - NO ANCHOR

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    pubkey::Pubkey,
};

pub mod constants;
pub mod error;
pub mod events;
pub mod instruction;
pub mod ledger;
pub mod oracle;
pub mod outcome;
pub mod pda;
pub mod processor;
pub mod state;

solana_program::declare_id!("RpsCasino1111111111111111111111111111111111");

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data)
}
