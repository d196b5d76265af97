//! Event logging for native Solana
//!
//! Each event is logged as a marker line, its type, and the borsh payload
//! encoded in base58, so indexers can pick them out of transaction logs.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::{
    oracle::RequestToken,
    outcome::{Choice, Outcome},
};

pub const EVENT_MARKER: &str = "RPS_CASINO_EVENT";

/// Event type discriminator
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    BetPlaced = 1,
    RandomnessRequested = 2,
    BetResolved = 3,
    BetClaimed = 4,
    FundsDeposited = 10,
    FundsWithdrawn = 11,
    CircuitBreakerChanged = 20,
    OwnershipTransferred = 21,
    OracleAuthorityChanged = 22,
}

pub trait Event: BorshSerialize {
    fn event_type() -> EventType;

    fn emit(&self) {
        msg!(EVENT_MARKER);
        msg!("TYPE:{:?}", Self::event_type());
        if let Ok(data) = self.try_to_vec() {
            msg!("DATA:{}", bs58::encode(&data).into_string());
        }
    }
}

/// Recover an event payload from the `DATA:` log line
pub fn decode_event<T: Event + BorshDeserialize>(data_line: &str) -> Option<T> {
    let encoded = data_line
        .trim_start_matches("Program log: ")
        .strip_prefix("DATA:")?;
    let bytes = bs58::decode(encoded).into_vec().ok()?;
    T::try_from_slice(&bytes).ok()
}

macro_rules! define_event {
    ($name:ident { $($field:ident: $type:ty),* $(,)? }) => {
        #[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: $type,)*
        }

        impl Event for $name {
            fn event_type() -> EventType {
                EventType::$name
            }
        }
    };
}

// === Bet lifecycle ===

define_event!(BetPlaced {
    bet_id: u64,
    bettor: Pubkey,
    amount: u64,
    choice: Choice,
});

define_event!(RandomnessRequested {
    token: RequestToken,
    bet_id: u64,
    slot: u64,
    resend_count: u32,
});

define_event!(BetResolved {
    bet_id: u64,
    platform_choice: Choice,
    outcome: Outcome,
});

define_event!(BetClaimed {
    bet_id: u64,
    payout: u64,
});

// === Liquidity ===

define_event!(FundsDeposited {
    depositor: Pubkey,
    amount: u64,
});

define_event!(FundsWithdrawn {
    owner: Pubkey,
    amount: u64,
});

// === Administration ===

define_event!(CircuitBreakerChanged {
    paused: bool,
});

define_event!(OwnershipTransferred {
    previous_owner: Pubkey,
    new_owner: Pubkey,
});

define_event!(OracleAuthorityChanged {
    previous_authority: Pubkey,
    new_authority: Pubkey,
});
