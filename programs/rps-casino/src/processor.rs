use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::Sysvar,
};

use crate::{
    constants::seeds,
    error::CasinoError,
    events::{
        BetClaimed, BetPlaced, BetResolved, CircuitBreakerChanged, Event, FundsDeposited, FundsWithdrawn,
        OracleAuthorityChanged, OwnershipTransferred, RandomnessRequested,
    },
    instruction::CasinoInstruction,
    ledger::{resend_request, BetLedger},
    oracle::{RandomnessOracle, RequestToken},
    pda::{find_bet_address, find_bettor_bets_address, find_config_address, find_ledger_address, find_request_address},
    state::{Bet, BettorBets, CasinoAccount, CasinoConfig, LedgerState, ResolutionRequest},
};

pub struct Processor;

impl Processor {
    pub fn process(program_id: &Pubkey, accounts: &[AccountInfo], instruction_data: &[u8]) -> ProgramResult {
        let instruction = CasinoInstruction::unpack(instruction_data)?;

        match instruction {
            CasinoInstruction::Initialize { oracle_authority } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts, oracle_authority)
            }
            CasinoInstruction::PlaceBet { choice, stake } => {
                msg!("Instruction: PlaceBet");
                Self::process_place_bet(program_id, accounts, choice, stake)
            }
            CasinoInstruction::FulfillRandomness { random_value } => {
                msg!("Instruction: FulfillRandomness");
                Self::process_fulfill_randomness(program_id, accounts, random_value)
            }
            CasinoInstruction::ClaimBet { bet_id } => {
                msg!("Instruction: ClaimBet");
                Self::process_claim_bet(program_id, accounts, bet_id)
            }
            CasinoInstruction::Deposit { amount } => {
                msg!("Instruction: Deposit");
                Self::process_deposit(program_id, accounts, amount)
            }
            CasinoInstruction::Withdraw { amount } => {
                msg!("Instruction: Withdraw");
                Self::process_withdraw(program_id, accounts, amount)
            }
            CasinoInstruction::Pause => {
                msg!("Instruction: Pause");
                Self::process_set_paused(program_id, accounts, true)
            }
            CasinoInstruction::Unpause => {
                msg!("Instruction: Unpause");
                Self::process_set_paused(program_id, accounts, false)
            }
            CasinoInstruction::TransferOwnership { new_owner } => {
                msg!("Instruction: TransferOwnership");
                Self::process_transfer_ownership(program_id, accounts, new_owner)
            }
            CasinoInstruction::SetOracleAuthority { oracle_authority } => {
                msg!("Instruction: SetOracleAuthority");
                Self::process_set_oracle_authority(program_id, accounts, oracle_authority)
            }
            CasinoInstruction::ResendResolutionRequest { bet_id } => {
                msg!("Instruction: ResendResolutionRequest");
                Self::process_resend_resolution_request(program_id, accounts, bet_id)
            }
        }
    }

    fn process_initialize(program_id: &Pubkey, accounts: &[AccountInfo], oracle_authority: Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let ledger_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        require_signer(owner_info)?;
        require_system_program(system_program_info)?;

        let (config_pubkey, config_bump) = find_config_address(program_id);
        let (ledger_pubkey, ledger_bump) = find_ledger_address(program_id);
        if *config_info.key != config_pubkey || *ledger_info.key != ledger_pubkey {
            return Err(CasinoError::InvalidPda.into());
        }

        if !config_info.data_is_empty() || !ledger_info.data_is_empty() {
            return Err(CasinoError::AlreadyInitialized.into());
        }

        create_pda_account(
            owner_info,
            config_info,
            system_program_info,
            program_id,
            CasinoConfig::LEN,
            &[seeds::CASINO_CONFIG, &[config_bump]],
        )?;
        create_pda_account(
            owner_info,
            ledger_info,
            system_program_info,
            program_id,
            LedgerState::LEN,
            &[seeds::LEDGER, &[ledger_bump]],
        )?;

        let config = CasinoConfig::new(*owner_info.key, oracle_authority, ledger_pubkey, config_bump);
        config.save(&mut config_info.try_borrow_mut_data()?[..])?;

        let ledger_state = LedgerState::new(ledger_bump);
        ledger_state.save(&mut ledger_info.try_borrow_mut_data()?[..])?;

        msg!("Casino initialized, owner {}, oracle {}", owner_info.key, oracle_authority);
        Ok(())
    }

    fn process_place_bet(program_id: &Pubkey, accounts: &[AccountInfo], choice: u8, stake: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let bettor_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let ledger_info = next_account_info(account_info_iter)?;
        let bet_info = next_account_info(account_info_iter)?;
        let bettor_bets_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        require_signer(bettor_info)?;
        require_system_program(system_program_info)?;

        let config = load_config(program_id, config_info)?;
        let mut ledger_state = load_ledger(program_id, ledger_info)?;
        let clock = Clock::get()?;

        let (bet_pubkey, bet_bump) = find_bet_address(program_id, ledger_state.next_bet_id);
        if *bet_info.key != bet_pubkey {
            msg!("Bet account does not match next bet id {}", ledger_state.next_bet_id);
            return Err(CasinoError::InvalidPda.into());
        }

        let mut oracle = RequestAccountOracle {
            program_id,
            ledger: ledger_info.key,
            payer: bettor_info,
            request_info,
            system_program: system_program_info,
            clock: &clock,
        };

        let mut bet = BetLedger::new(&config, &mut ledger_state).place_bet(
            &mut oracle,
            *bettor_info.key,
            choice,
            stake,
            clock.unix_timestamp,
        )?;
        bet.bump = bet_bump;

        create_pda_account(
            bettor_info,
            bet_info,
            system_program_info,
            program_id,
            Bet::LEN,
            &[seeds::BET, &bet.id.to_le_bytes(), &[bet_bump]],
        )?;
        bet.save(&mut bet_info.try_borrow_mut_data()?[..])?;

        append_bettor_bet(program_id, bettor_info, bettor_bets_info, system_program_info, bet.id)?;

        invoke(
            &system_instruction::transfer(bettor_info.key, ledger_info.key, stake),
            &[bettor_info.clone(), ledger_info.clone(), system_program_info.clone()],
        )?;

        ledger_state.save(&mut ledger_info.try_borrow_mut_data()?[..])?;

        BetPlaced {
            bet_id: bet.id,
            bettor: bet.bettor,
            amount: bet.amount,
            choice: bet.bettor_choice,
        }
        .emit();

        msg!("Bet {} placed: {} lamports", bet.id, stake);
        Ok(())
    }

    fn process_fulfill_randomness(program_id: &Pubkey, accounts: &[AccountInfo], random_value: [u8; 32]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let ledger_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let bet_info = next_account_info(account_info_iter)?;
        let bettor_info = next_account_info(account_info_iter)?;

        require_signer(oracle_info)?;

        let config = load_config(program_id, config_info)?;
        let mut ledger_state = load_ledger(program_id, ledger_info)?;
        let request = load_request(program_id, request_info)?;

        let mut bet = load_bet(program_id, bet_info, request.bet_id)?;
        if *bettor_info.key != request.bettor {
            return Err(ProgramError::InvalidArgument);
        }

        let clock = Clock::get()?;
        let (platform_choice, outcome) = BetLedger::new(&config, &mut ledger_state).fulfill_randomness(
            oracle_info.key,
            &request,
            &mut bet,
            &random_value,
            clock.unix_timestamp,
        )?;

        bet.save(&mut bet_info.try_borrow_mut_data()?[..])?;
        ledger_state.save(&mut ledger_info.try_borrow_mut_data()?[..])?;
        close_account(request_info, bettor_info)?;

        BetResolved {
            bet_id: bet.id,
            platform_choice,
            outcome,
        }
        .emit();

        msg!("Bet {} resolved: {:?}", bet.id, outcome);
        Ok(())
    }

    fn process_claim_bet(program_id: &Pubkey, accounts: &[AccountInfo], bet_id: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let bettor_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let ledger_info = next_account_info(account_info_iter)?;
        let bet_info = next_account_info(account_info_iter)?;

        require_signer(bettor_info)?;

        let config = load_config(program_id, config_info)?;
        let mut ledger_state = load_ledger(program_id, ledger_info)?;
        let mut bet = load_bet(program_id, bet_info, bet_id)?;

        let payout = BetLedger::new(&config, &mut ledger_state).claim_bet(bettor_info.key, &mut bet)?;

        // Commit before any value leaves the ledger
        bet.save(&mut bet_info.try_borrow_mut_data()?[..])?;
        ledger_state.save(&mut ledger_info.try_borrow_mut_data()?[..])?;

        transfer_from_ledger(ledger_info, bettor_info, payout)?;

        BetClaimed { bet_id, payout }.emit();

        msg!("Bet {} claimed: {} lamports", bet_id, payout);
        Ok(())
    }

    fn process_deposit(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let depositor_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let ledger_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        require_signer(depositor_info)?;
        require_system_program(system_program_info)?;

        let config = load_config(program_id, config_info)?;
        let mut ledger_state = load_ledger(program_id, ledger_info)?;

        BetLedger::new(&config, &mut ledger_state).deposit(amount)?;

        invoke(
            &system_instruction::transfer(depositor_info.key, ledger_info.key, amount),
            &[depositor_info.clone(), ledger_info.clone(), system_program_info.clone()],
        )?;

        ledger_state.save(&mut ledger_info.try_borrow_mut_data()?[..])?;

        FundsDeposited {
            depositor: *depositor_info.key,
            amount,
        }
        .emit();

        Ok(())
    }

    fn process_withdraw(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let ledger_info = next_account_info(account_info_iter)?;

        require_signer(owner_info)?;

        let config = load_config(program_id, config_info)?;
        let mut ledger_state = load_ledger(program_id, ledger_info)?;

        BetLedger::new(&config, &mut ledger_state).withdraw(owner_info.key, amount)?;

        ledger_state.save(&mut ledger_info.try_borrow_mut_data()?[..])?;

        transfer_from_ledger(ledger_info, owner_info, amount)?;

        FundsWithdrawn {
            owner: *owner_info.key,
            amount,
        }
        .emit();

        Ok(())
    }

    fn process_set_paused(program_id: &Pubkey, accounts: &[AccountInfo], paused: bool) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;

        require_signer(owner_info)?;

        let mut config = load_config(program_id, config_info)?;
        let now = Clock::get()?.unix_timestamp;

        if paused {
            config.pause(owner_info.key, now)?;
        } else {
            config.unpause(owner_info.key, now)?;
        }

        config.save(&mut config_info.try_borrow_mut_data()?[..])?;

        CircuitBreakerChanged { paused }.emit();

        Ok(())
    }

    fn process_transfer_ownership(program_id: &Pubkey, accounts: &[AccountInfo], new_owner: Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;

        require_signer(owner_info)?;

        let mut config = load_config(program_id, config_info)?;
        let previous_owner = config.transfer_ownership(owner_info.key, new_owner)?;

        config.save(&mut config_info.try_borrow_mut_data()?[..])?;

        OwnershipTransferred {
            previous_owner,
            new_owner,
        }
        .emit();

        Ok(())
    }

    fn process_set_oracle_authority(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        oracle_authority: Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;

        require_signer(owner_info)?;

        let mut config = load_config(program_id, config_info)?;
        let previous_authority = config.set_oracle_authority(owner_info.key, oracle_authority)?;

        config.save(&mut config_info.try_borrow_mut_data()?[..])?;

        OracleAuthorityChanged {
            previous_authority,
            new_authority: oracle_authority,
        }
        .emit();

        Ok(())
    }

    fn process_resend_resolution_request(program_id: &Pubkey, accounts: &[AccountInfo], bet_id: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let bet_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;

        require_signer(caller_info)?;

        let config = load_config(program_id, config_info)?;
        let bet = load_bet(program_id, bet_info, bet_id)?;
        let mut request = load_request(program_id, request_info)?;

        let resend_count = resend_request(&config, caller_info.key, &mut request, &bet)?;

        request.save(&mut request_info.try_borrow_mut_data()?[..])?;

        RandomnessRequested {
            token: request.token,
            bet_id,
            slot: Clock::get()?.slot,
            resend_count,
        }
        .emit();

        Ok(())
    }
}

/// Oracle seam backed by request PDAs. Each request becomes an account keyed
/// by its token; the off-chain oracle watches for `RandomnessRequested`.
struct RequestAccountOracle<'a, 'b> {
    program_id: &'b Pubkey,
    ledger: &'b Pubkey,
    payer: &'b AccountInfo<'a>,
    request_info: &'b AccountInfo<'a>,
    system_program: &'b AccountInfo<'a>,
    clock: &'b Clock,
}

impl RandomnessOracle for RequestAccountOracle<'_, '_> {
    fn request_resolution(&mut self, bet_id: u64, bettor: &Pubkey) -> Result<RequestToken, ProgramError> {
        let token = RequestToken::derive(self.ledger, bet_id, bettor);
        let (request_pubkey, request_bump) = find_request_address(self.program_id, &token);
        if *self.request_info.key != request_pubkey {
            msg!("Request account does not match token {}", token);
            return Err(CasinoError::InvalidPda.into());
        }

        create_pda_account(
            self.payer,
            self.request_info,
            self.system_program,
            self.program_id,
            ResolutionRequest::LEN,
            &[seeds::REQUEST, token.as_ref(), &[request_bump]],
        )?;

        let request = ResolutionRequest::new(
            token,
            bet_id,
            *bettor,
            self.clock.slot,
            self.clock.unix_timestamp,
            request_bump,
        );
        request.save(&mut self.request_info.try_borrow_mut_data()?[..])?;

        RandomnessRequested {
            token,
            bet_id,
            slot: self.clock.slot,
            resend_count: 0,
        }
        .emit();

        Ok(token)
    }
}

fn require_signer(info: &AccountInfo) -> ProgramResult {
    if !info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}

fn require_system_program(info: &AccountInfo) -> ProgramResult {
    if *info.key != system_program::id() {
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

fn load_config(program_id: &Pubkey, config_info: &AccountInfo) -> Result<CasinoConfig, ProgramError> {
    let (config_pubkey, _) = find_config_address(program_id);
    if *config_info.key != config_pubkey {
        return Err(CasinoError::InvalidPda.into());
    }
    if config_info.owner != program_id || config_info.data_is_empty() {
        return Err(CasinoError::NotInitialized.into());
    }

    let config = CasinoConfig::load(&config_info.try_borrow_data()?)?;
    config.validate()?;
    Ok(config)
}

fn load_ledger(program_id: &Pubkey, ledger_info: &AccountInfo) -> Result<LedgerState, ProgramError> {
    let (ledger_pubkey, _) = find_ledger_address(program_id);
    if *ledger_info.key != ledger_pubkey {
        return Err(CasinoError::InvalidPda.into());
    }
    if ledger_info.owner != program_id || ledger_info.data_is_empty() {
        return Err(CasinoError::NotInitialized.into());
    }

    let ledger_state = LedgerState::load(&ledger_info.try_borrow_data()?)?;
    ledger_state.validate()?;
    Ok(ledger_state)
}

fn load_bet(program_id: &Pubkey, bet_info: &AccountInfo, bet_id: u64) -> Result<Bet, ProgramError> {
    let (bet_pubkey, _) = find_bet_address(program_id, bet_id);
    if *bet_info.key != bet_pubkey {
        return Err(CasinoError::InvalidPda.into());
    }
    if bet_info.owner != program_id {
        return Err(ProgramError::IllegalOwner);
    }

    let bet = Bet::load(&bet_info.try_borrow_data()?)?;
    bet.validate()?;
    Ok(bet)
}

/// Anything that is not a live request account owned by this program is an
/// unknown request, including one already closed by its callback.
fn load_request(program_id: &Pubkey, request_info: &AccountInfo) -> Result<ResolutionRequest, ProgramError> {
    if request_info.owner != program_id {
        msg!("No pending request at {}", request_info.key);
        return Err(CasinoError::UnknownRequest.into());
    }

    let request = ResolutionRequest::load(&request_info.try_borrow_data()?)
        .map_err(|_| ProgramError::from(CasinoError::UnknownRequest))?;

    let (request_pubkey, _) = find_request_address(program_id, &request.token);
    if *request_info.key != request_pubkey {
        return Err(CasinoError::UnknownRequest.into());
    }
    Ok(request)
}

/// Create a program-owned PDA. An address someone already funded with a
/// plain transfer cannot take `create_account`, so it is topped up to the
/// rent minimum and then allocated and assigned in place.
fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    target: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    program_id: &Pubkey,
    space: usize,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let required = Rent::get()?.minimum_balance(space);
    let current = target.lamports();

    if current == 0 {
        return invoke_signed(
            &system_instruction::create_account(payer.key, target.key, required, space as u64, program_id),
            &[payer.clone(), target.clone(), system_program.clone()],
            &[signer_seeds],
        );
    }

    let shortfall = required.saturating_sub(current);
    if shortfall > 0 {
        invoke(
            &system_instruction::transfer(payer.key, target.key, shortfall),
            &[payer.clone(), target.clone(), system_program.clone()],
        )?;
    }
    invoke_signed(
        &system_instruction::allocate(target.key, space as u64),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(target.key, program_id),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )
}

/// Record `bet_id` in the bettor's index, creating the account on first use
/// and growing it by one slot afterwards.
fn append_bettor_bet<'a>(
    program_id: &Pubkey,
    bettor_info: &AccountInfo<'a>,
    bettor_bets_info: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    bet_id: u64,
) -> ProgramResult {
    let (bettor_bets_pubkey, bettor_bets_bump) = find_bettor_bets_address(program_id, bettor_info.key);
    if *bettor_bets_info.key != bettor_bets_pubkey {
        return Err(CasinoError::InvalidPda.into());
    }

    let mut index = if bettor_bets_info.data_is_empty() {
        create_pda_account(
            bettor_info,
            bettor_bets_info,
            system_program_info,
            program_id,
            BettorBets::space_for(1),
            &[seeds::BETTOR_BETS, bettor_info.key.as_ref(), &[bettor_bets_bump]],
        )?;
        BettorBets::new(*bettor_info.key, bettor_bets_bump)
    } else {
        if bettor_bets_info.owner != program_id {
            return Err(ProgramError::IllegalOwner);
        }
        let index = BettorBets::load(&bettor_bets_info.try_borrow_data()?)?;

        let new_len = BettorBets::space_for(index.len() + 1);
        let required = Rent::get()?.minimum_balance(new_len);
        let shortfall = required.saturating_sub(bettor_bets_info.lamports());
        if shortfall > 0 {
            invoke(
                &system_instruction::transfer(bettor_info.key, bettor_bets_info.key, shortfall),
                &[bettor_info.clone(), bettor_bets_info.clone(), system_program_info.clone()],
            )?;
        }
        bettor_bets_info.realloc(new_len, false)?;
        index
    };

    index.push(bet_id);
    index.save(&mut bettor_bets_info.try_borrow_mut_data()?[..])
}

/// Direct debit of the program-owned ledger. Never dips into its rent reserve.
fn transfer_from_ledger(ledger_info: &AccountInfo, recipient: &AccountInfo, amount: u64) -> ProgramResult {
    let rent_reserve = Rent::get()?.minimum_balance(ledger_info.data_len());
    let remaining = ledger_info
        .lamports()
        .checked_sub(amount)
        .filter(|remaining| *remaining >= rent_reserve)
        .ok_or(CasinoError::SolvencyViolation)?;
    let credited = recipient
        .lamports()
        .checked_add(amount)
        .ok_or(CasinoError::ArithmeticOverflow)?;

    **ledger_info.try_borrow_mut_lamports()? = remaining;
    **recipient.try_borrow_mut_lamports()? = credited;
    Ok(())
}

/// Drain a program-owned account into `receiver` and wipe its data
fn close_account(info: &AccountInfo, receiver: &AccountInfo) -> ProgramResult {
    let credited = receiver
        .lamports()
        .checked_add(info.lamports())
        .ok_or(CasinoError::ArithmeticOverflow)?;

    **info.try_borrow_mut_lamports()? = 0;
    **receiver.try_borrow_mut_lamports()? = credited;
    info.try_borrow_mut_data()?.fill(0);
    Ok(())
}
