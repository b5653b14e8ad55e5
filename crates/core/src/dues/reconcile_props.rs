//! Property-based tests for dues reconciliation.
//!
//! - remaining always equals owed minus the payment sum, whatever the order
//! - after applying the chosen action the record is promoted iff complete
//! - reconciling twice without a payment change is a no-op

use dernek_shared::types::{DuesRecordId, IncomeId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reconcile::{reconcile_action, recompute, PromotionState, ReconcileAction};

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..200_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A payment history step: add a payment, or remove the payment at an index.
#[derive(Debug, Clone)]
enum Step {
    Add(Decimal),
    Remove(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => amount().prop_map(Step::Add),
        1 => (0usize..16).prop_map(Step::Remove),
    ]
}

/// Ledger stand-in: the promotion state plus the amount of the linked income.
struct Ledger {
    state: PromotionState,
    linked_amount: Option<Decimal>,
    next_income: i32,
    mutations: usize,
}

impl Ledger {
    fn new() -> Self {
        Self {
            state: PromotionState::UNPROMOTED,
            linked_amount: None,
            next_income: 1,
            mutations: 0,
        }
    }

    fn apply(&mut self, action: ReconcileAction) {
        match action {
            ReconcileAction::Promote { amount } => {
                self.state = PromotionState::promoted(IncomeId(self.next_income));
                self.linked_amount = Some(amount);
                self.next_income += 1;
                self.mutations += 1;
            }
            ReconcileAction::Demote { .. } => {
                self.state = PromotionState::UNPROMOTED;
                self.linked_amount = None;
                self.mutations += 1;
            }
            ReconcileAction::Nothing => {}
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_remaining_is_order_independent(
        owed in amount(),
        mut payments in prop::collection::vec(amount(), 0..12),
    ) {
        let forward = recompute(owed, &payments);
        payments.reverse();
        let backward = recompute(owed, &payments);

        let sum: Decimal = payments.iter().copied().sum();
        prop_assert_eq!(forward.remaining, owed - sum);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_promoted_iff_complete_after_every_step(
        owed in amount(),
        steps in prop::collection::vec(step(), 1..30),
    ) {
        let record = DuesRecordId(1);
        let mut payments: Vec<Decimal> = Vec::new();
        let mut ledger = Ledger::new();

        for step in steps {
            match step {
                Step::Add(a) => payments.push(a),
                Step::Remove(i) => {
                    if payments.is_empty() {
                        continue;
                    }
                    let idx = i % payments.len();
                    payments.remove(idx);
                }
            }

            let totals = recompute(owed, &payments);
            let action = reconcile_action(record, owed, &totals, ledger.state).unwrap();
            ledger.apply(action);

            prop_assert_eq!(totals.status.is_complete(), ledger.state.flag.is_promoted());
            prop_assert_eq!(totals.status.is_complete(), ledger.linked_amount.is_some());
            if let Some(linked) = ledger.linked_amount {
                prop_assert_eq!(linked, owed);
            }
        }
    }

    #[test]
    fn prop_reconcile_is_idempotent(
        owed in amount(),
        payments in prop::collection::vec(amount(), 0..8),
    ) {
        let record = DuesRecordId(1);
        let mut ledger = Ledger::new();
        let totals = recompute(owed, &payments);

        let first = reconcile_action(record, owed, &totals, ledger.state).unwrap();
        ledger.apply(first);
        let after_first = ledger.mutations;

        let second = reconcile_action(record, owed, &totals, ledger.state).unwrap();
        prop_assert_eq!(second, ReconcileAction::Nothing);
        ledger.apply(second);
        prop_assert_eq!(ledger.mutations, after_first);
    }
}
