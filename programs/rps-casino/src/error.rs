use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq, Eq)]
pub enum CasinoError {
    #[error("Casino is paused")]
    Paused = 0,

    #[error("Stake is zero or exceeds the max bettable amount")]
    InvalidStake = 1,

    #[error("Choice must be rock (0), paper (1) or scissors (2)")]
    InvalidChoice = 2,

    #[error("Unauthorized")]
    Unauthorized = 3,

    /// Returned alike for unresolved, claimed, foreign and losing bets
    #[error("Bet is not claimable")]
    NotClaimable = 4,

    #[error("Insufficient free liquidity")]
    InsufficientLiquidity = 5,

    #[error("Casino is already paused")]
    AlreadyPaused = 6,

    #[error("Casino is not paused")]
    NotPaused = 7,

    #[error("Amount must be greater than zero")]
    InvalidAmount = 8,

    #[error("Unknown or already fulfilled resolution request")]
    UnknownRequest = 9,

    #[error("Account already initialized")]
    AlreadyInitialized = 10,

    #[error("Account not initialized")]
    NotInitialized = 11,

    #[error("Invalid PDA")]
    InvalidPda = 12,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 13,

    #[error("Ledger solvency violated")]
    SolvencyViolation = 14,
}

impl PrintProgramError for CasinoError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("CasinoError: {}", self);
    }
}

impl From<CasinoError> for ProgramError {
    fn from(e: CasinoError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for CasinoError {
    fn type_of() -> &'static str {
        "CasinoError"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn test_custom_codes_round_trip() {
        let err: ProgramError = CasinoError::NotClaimable.into();
        assert_eq!(err, ProgramError::Custom(4));

        if let ProgramError::Custom(code) = err {
            assert_eq!(CasinoError::from_u32(code), Some(CasinoError::NotClaimable));
        }
        assert_eq!(CasinoError::from_u32(99), None);
    }
}
