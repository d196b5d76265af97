//! Bet ledger engine
//!
//! Pure state transitions over the casino config, the ledger scalars and
//! individual bets. Every operation validates all of its preconditions and
//! stages the new ledger state before committing anything, so a rejected call
//! leaves no partial mutation behind. Account I/O and lamport movement live in
//! the processor, which persists the result before moving any value out.

use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::MAX_PAYOUT_MULTIPLIER,
    error::CasinoError,
    oracle::RandomnessOracle,
    outcome::{Choice, Outcome},
    state::{Bet, CasinoConfig, LedgerState, ResolutionRequest},
};

pub struct BetLedger<'a> {
    config: &'a CasinoConfig,
    state: &'a mut LedgerState,
}

impl<'a> BetLedger<'a> {
    pub fn new(config: &'a CasinoConfig, state: &'a mut LedgerState) -> Self {
        Self { config, state }
    }

    pub fn state(&self) -> &LedgerState {
        self.state
    }

    pub fn max_bettable_amount(&self) -> u64 {
        self.state.max_bettable_amount()
    }

    pub fn total_bet_locked(&self) -> u64 {
        self.state.total_bet_locked
    }

    /// Admit a stake, lock it, and ask the oracle to resolve it.
    ///
    /// The cap is evaluated against the balance before the stake is credited,
    /// so the worst-case payout of every open bet stays covered afterwards.
    pub fn place_bet<O: RandomnessOracle>(
        &mut self,
        oracle: &mut O,
        bettor: Pubkey,
        choice: u8,
        stake: u64,
        now: i64,
    ) -> Result<Bet, ProgramError> {
        self.config.require_active()?;

        if stake == 0 {
            msg!("Stake must be greater than zero");
            return Err(CasinoError::InvalidStake.into());
        }

        let choice = Choice::try_from(choice)?;

        let cap = self.state.max_bettable_amount();
        if stake > cap {
            msg!("Stake {} exceeds max bettable amount {}", stake, cap);
            return Err(CasinoError::InvalidStake.into());
        }

        let exposure = stake
            .checked_mul(MAX_PAYOUT_MULTIPLIER)
            .ok_or(CasinoError::ArithmeticOverflow)?;

        let bet_id = self.state.next_bet_id;
        let mut next = self.state.clone();
        next.next_bet_id = checked_add(bet_id, 1)?;
        next.total_bet_locked = checked_add(next.total_bet_locked, stake)?;
        next.outstanding_exposure = checked_add(next.outstanding_exposure, exposure)?;
        next.available_balance = checked_add(next.available_balance, stake)?;
        next.pending_requests = checked_add(next.pending_requests, 1)?;
        next.check_solvency()?;

        let token = oracle.request_resolution(bet_id, &bettor)?;

        *self.state = next;
        Ok(Bet::new(bet_id, bettor, stake, choice, token, now))
    }

    /// Apply the oracle's answer to the bet its request was issued for and
    /// return the platform's hand with the outcome. A request that does not
    /// match a pending bet is rejected untouched.
    ///
    /// Exposure drops from the top multiplier to the settled payout, which
    /// releases the house's share of draws and losses for withdrawal.
    pub fn fulfill_randomness(
        &mut self,
        oracle_authority: &Pubkey,
        request: &ResolutionRequest,
        bet: &mut Bet,
        random_value: &[u8; 32],
        now: i64,
    ) -> Result<(Choice, Outcome), ProgramError> {
        self.config.require_oracle(oracle_authority)?;

        if request.bet_id != bet.id || request.token != bet.request_token || bet.is_resolved() {
            msg!("Request {} does not resolve a pending bet", request.token);
            return Err(CasinoError::UnknownRequest.into());
        }

        let platform_choice = Choice::from_random_value(random_value);
        let outcome = Outcome::determine(bet.bettor_choice, platform_choice);
        let exposure = bet
            .amount
            .checked_mul(MAX_PAYOUT_MULTIPLIER)
            .ok_or(CasinoError::ArithmeticOverflow)?;
        let released = checked_sub(exposure, outcome.payout(bet.amount)?)?;

        let mut next = self.state.clone();
        next.pending_requests = next
            .pending_requests
            .checked_sub(1)
            .ok_or(CasinoError::UnknownRequest)?;
        next.outstanding_exposure = checked_sub(next.outstanding_exposure, released)?;
        next.check_solvency()?;

        bet.platform_choice = Some(platform_choice);
        bet.resolved_at = now;
        *self.state = next;

        Ok((platform_choice, outcome))
    }

    /// Settle a resolved win or draw for its bettor and return the payout.
    ///
    /// Unresolved, already claimed, foreign and losing bets all fail with the
    /// same `NotClaimable` error. The bet is marked claimed and the stake
    /// unlocked here, before the caller moves any lamports.
    pub fn claim_bet(&mut self, caller: &Pubkey, bet: &mut Bet) -> Result<u64, ProgramError> {
        self.config.require_active()?;

        let outcome = match bet.outcome() {
            Some(outcome) if !bet.claimed && bet.bettor == *caller && outcome.is_claimable() => outcome,
            _ => {
                msg!("Bet {} is not claimable", bet.id);
                return Err(CasinoError::NotClaimable.into());
            }
        };
        let payout = outcome.payout(bet.amount)?;

        let mut next = self.state.clone();
        next.total_bet_locked = checked_sub(next.total_bet_locked, bet.amount)?;
        next.outstanding_exposure = checked_sub(next.outstanding_exposure, payout)?;
        next.available_balance = next
            .available_balance
            .checked_sub(payout)
            .ok_or(CasinoError::SolvencyViolation)?;
        next.total_paid_out = checked_add(next.total_paid_out, payout)?;
        next.total_claims = checked_add(next.total_claims, 1)?;
        next.check_solvency()?;

        bet.claimed = true;
        *self.state = next;
        Ok(payout)
    }

    /// Anyone may add liquidity; it only widens the solvency margin
    pub fn deposit(&mut self, amount: u64) -> Result<(), ProgramError> {
        if amount == 0 {
            return Err(CasinoError::InvalidAmount.into());
        }

        let mut next = self.state.clone();
        next.available_balance = checked_add(next.available_balance, amount)?;
        next.total_deposited = checked_add(next.total_deposited, amount)?;

        *self.state = next;
        Ok(())
    }

    /// Owner-only. Never touches balance backing locked stakes or what
    /// unclaimed bets may still pay.
    pub fn withdraw(&mut self, caller: &Pubkey, amount: u64) -> Result<(), ProgramError> {
        self.config.require_owner(caller)?;

        if amount == 0 {
            return Err(CasinoError::InvalidAmount.into());
        }

        let free = self.state.free_liquidity();
        if amount > free {
            msg!("Withdrawal {} exceeds free liquidity {}", amount, free);
            return Err(CasinoError::InsufficientLiquidity.into());
        }

        let mut next = self.state.clone();
        next.available_balance = checked_sub(next.available_balance, amount)?;
        next.total_withdrawn = checked_add(next.total_withdrawn, amount)?;
        next.check_solvency()?;

        *self.state = next;
        Ok(())
    }
}

/// Out-of-band resend for a request the oracle never answered, by the owner
/// or the bettor. Leaves the ledger untouched; returns the new resend count.
pub fn resend_request(
    config: &CasinoConfig,
    caller: &Pubkey,
    request: &mut ResolutionRequest,
    bet: &Bet,
) -> Result<u32, ProgramError> {
    if *caller != bet.bettor {
        config.require_owner(caller)?;
    }

    if request.bet_id != bet.id || request.token != bet.request_token || bet.is_resolved() {
        return Err(CasinoError::UnknownRequest.into());
    }

    request.resend_count = request
        .resend_count
        .checked_add(1)
        .ok_or(CasinoError::ArithmeticOverflow)?;
    Ok(request.resend_count)
}

fn checked_add(a: u64, b: u64) -> Result<u64, CasinoError> {
    a.checked_add(b).ok_or(CasinoError::ArithmeticOverflow)
}

fn checked_sub(a: u64, b: u64) -> Result<u64, CasinoError> {
    a.checked_sub(b).ok_or(CasinoError::ArithmeticOverflow)
}
