//! Outcome resolution
//!
//! Maps oracle randomness to the platform's choice and scores a bettor's
//! choice against it. Stateless.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    constants::{DRAW_MULTIPLIER, LOSS_MULTIPLIER, WIN_MULTIPLIER},
    error::CasinoError,
};

/// The three hands. Each hand beats the one cyclically before it:
/// paper beats rock, scissors beats paper, rock beats scissors.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    Rock = 0,
    Paper = 1,
    Scissors = 2,
}

impl Choice {
    pub const COUNT: u8 = 3;
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// The hand this one defeats
    pub fn beats(self) -> Choice {
        Self::ALL[((self.index() + Self::COUNT - 1) % Self::COUNT) as usize]
    }

    /// Reduce a 256-bit big-endian random value modulo the number of hands
    pub fn from_random_value(random_value: &[u8; 32]) -> Choice {
        let count = Self::COUNT as u32;
        let remainder = random_value
            .iter()
            .fold(0u32, |acc, byte| (acc * 256 + *byte as u32) % count);
        Self::ALL[remainder as usize]
    }
}

impl TryFrom<u8> for Choice {
    type Error = CasinoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(CasinoError::InvalidChoice)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Score the bettor against the platform by cyclic distance
    pub fn determine(bettor: Choice, platform: Choice) -> Outcome {
        let distance = (bettor.index() + Choice::COUNT - platform.index()) % Choice::COUNT;
        match distance {
            0 => Outcome::Draw,
            1 => Outcome::Win,
            _ => Outcome::Loss,
        }
    }

    pub fn multiplier(self) -> u64 {
        match self {
            Outcome::Win => WIN_MULTIPLIER,
            Outcome::Draw => DRAW_MULTIPLIER,
            Outcome::Loss => LOSS_MULTIPLIER,
        }
    }

    pub fn payout(self, stake: u64) -> Result<u64, CasinoError> {
        stake
            .checked_mul(self.multiplier())
            .ok_or(CasinoError::ArithmeticOverflow)
    }

    pub fn is_claimable(self) -> bool {
        self.multiplier() > 0
    }
}
