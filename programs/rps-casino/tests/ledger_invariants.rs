use proptest::prelude::*;
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use rps_casino::{
    ledger::BetLedger,
    oracle::{RandomnessOracle, RequestToken},
    state::{Bet, CasinoConfig, LedgerState, ResolutionRequest},
};

const NOW: i64 = 1_700_000_000;

struct DerivingOracle {
    ledger: Pubkey,
}

impl RandomnessOracle for DerivingOracle {
    fn request_resolution(&mut self, bet_id: u64, bettor: &Pubkey) -> Result<RequestToken, ProgramError> {
        Ok(RequestToken::derive(&self.ledger, bet_id, bettor))
    }
}

#[derive(Debug, Clone)]
enum Op {
    Deposit(u64),
    Place { bettor: usize, choice: u8, stake: u64 },
    Fulfill { bet: usize, random: u8 },
    Claim { bet: usize, as_bettor: bool },
    Withdraw(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..5_000_000_000).prop_map(Op::Deposit),
        (0usize..3, 0u8..4, 0u64..2_000_000_000).prop_map(|(bettor, choice, stake)| Op::Place {
            bettor,
            choice,
            stake
        }),
        (any::<usize>(), any::<u8>()).prop_map(|(bet, random)| Op::Fulfill { bet, random }),
        (any::<usize>(), any::<bool>()).prop_map(|(bet, as_bettor)| Op::Claim { bet, as_bettor }),
        (0u64..5_000_000_000).prop_map(Op::Withdraw),
    ]
}

proptest! {
    #[test]
    fn test_ledger_stays_solvent(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let owner = Pubkey::new_unique();
        let oracle_authority = Pubkey::new_unique();
        let ledger_key = Pubkey::new_unique();
        let bettors = [Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()];

        let config = CasinoConfig::new(owner, oracle_authority, ledger_key, 255);
        let mut state = LedgerState::new(254);
        let mut oracle = DerivingOracle { ledger: ledger_key };
        let mut bets: Vec<Bet> = Vec::new();

        // Independent bookkeeping of value in and out
        let mut inflow: u128 = 0;
        let mut outflow: u128 = 0;

        for op in ops {
            let mut ledger = BetLedger::new(&config, &mut state);
            match op {
                Op::Deposit(amount) => {
                    if ledger.deposit(amount).is_ok() {
                        inflow += amount as u128;
                    }
                }
                Op::Place { bettor, choice, stake } => {
                    let cap = ledger.max_bettable_amount();
                    let result = ledger.place_bet(&mut oracle, bettors[bettor], choice, stake, NOW);
                    prop_assert_eq!(result.is_ok(), stake > 0 && stake <= cap && choice < 3);
                    if let Ok(bet) = result {
                        inflow += stake as u128;
                        bets.push(bet);
                    }
                }
                Op::Fulfill { bet, random } => {
                    if bets.is_empty() {
                        continue;
                    }
                    let index = bet % bets.len();
                    let target = &mut bets[index];
                    let was_resolved = target.is_resolved();
                    let request = ResolutionRequest::new(target.request_token, target.id, target.bettor, 0, NOW, 255);
                    let mut random_value = [0u8; 32];
                    random_value[31] = random;

                    let result = ledger.fulfill_randomness(&oracle_authority, &request, target, &random_value, NOW);
                    prop_assert_eq!(result.is_ok(), !was_resolved);
                }
                Op::Claim { bet, as_bettor } => {
                    if bets.is_empty() {
                        continue;
                    }
                    let index = bet % bets.len();
                    let target = &mut bets[index];
                    let expected = target.claimable_amount();
                    let caller = if as_bettor { target.bettor } else { owner };

                    match ledger.claim_bet(&caller, target) {
                        Ok(payout) => {
                            prop_assert_eq!(payout, expected);
                            outflow += payout as u128;
                        }
                        Err(_) => prop_assert!(expected == 0 || !as_bettor),
                    }
                }
                Op::Withdraw(amount) => {
                    let free = ledger.state().free_liquidity();
                    let result = ledger.withdraw(&owner, amount);
                    prop_assert_eq!(result.is_ok(), amount > 0 && amount <= free);
                    if result.is_ok() {
                        outflow += amount as u128;
                    }
                }
            }

            let locked: u64 = bets.iter().filter(|bet| !bet.claimed).map(|bet| bet.amount).sum();
            prop_assert_eq!(state.total_bet_locked, locked);
            prop_assert!(state.total_bet_locked <= state.available_balance);

            // Pending bets may still pay double; settled ones owe exactly their payout
            let exposure: u64 = bets
                .iter()
                .filter(|bet| !bet.claimed)
                .map(|bet| match bet.outcome() {
                    Some(outcome) => outcome.payout(bet.amount).unwrap(),
                    None => 2 * bet.amount,
                })
                .sum();
            prop_assert_eq!(state.outstanding_exposure, exposure);
            prop_assert!(state.outstanding_exposure <= state.available_balance);
            prop_assert!(state.check_solvency().is_ok());
            prop_assert_eq!(state.available_balance as u128, inflow - outflow);
            prop_assert_eq!(state.next_bet_id, bets.len() as u64);
        }
    }
}
