// Structural checks over every document workflow

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use proptest::prelude::*;

use tradeflow::core::{AppError, StatusFlow};
use tradeflow::modules::enquiries::EnquiryStatus;
use tradeflow::modules::material_receipts::ReceiptStatus;
use tradeflow::modules::purchase_invoices::PurchaseInvoiceStatus;
use tradeflow::modules::quotations::QuotationStatus;
use tradeflow::modules::receipt_returns::ReturnStatus;
use tradeflow::modules::sales_orders::SalesOrderStatus;
use tradeflow::modules::stock_issues::IssueStatus;
use tradeflow::modules::supplier_lpos::LpoStatus;
use tradeflow::modules::supplier_quotes::SupplierQuoteStatus;

/// States reachable from `start`, including itself
fn reachable<S: StatusFlow + Eq + Hash>(start: S) -> HashSet<S> {
    let mut seen = HashSet::from([start]);
    let mut pending = vec![start];
    while let Some(state) = pending.pop() {
        for &next in state.next_states() {
            if seen.insert(next) {
                pending.push(next);
            }
        }
    }
    seen
}

fn check_workflow<S>(initial: S, all: &[S])
where
    S: StatusFlow + Eq + Hash + Debug,
{
    let reached = reachable(initial);
    for &state in all {
        assert!(reached.contains(&state), "{:?} unreachable from {:?}", state, initial);
        assert!(
            !state.can_transition_to(state),
            "{:?} transitions to itself",
            state
        );
    }

    let terminal: Vec<&S> = all.iter().filter(|s| s.is_terminal()).collect();
    assert!(!terminal.is_empty(), "{} has no terminal state", S::DOCUMENT);
    for state in terminal {
        for &next in all {
            assert!(matches!(
                state.ensure_transition(next),
                Err(AppError::InvalidTransition(_))
            ));
        }
    }
}

#[test]
fn test_every_workflow_is_connected_and_terminates() {
    check_workflow(EnquiryStatus::New, EnquiryStatus::ALL);
    check_workflow(SupplierQuoteStatus::Pending, SupplierQuoteStatus::ALL);
    check_workflow(QuotationStatus::Draft, QuotationStatus::ALL);
    check_workflow(SalesOrderStatus::Draft, SalesOrderStatus::ALL);
    check_workflow(LpoStatus::Draft, LpoStatus::ALL);
    check_workflow(ReceiptStatus::Draft, ReceiptStatus::ALL);
    check_workflow(ReturnStatus::Draft, ReturnStatus::ALL);
    check_workflow(IssueStatus::Draft, IssueStatus::ALL);
    check_workflow(PurchaseInvoiceStatus::Draft, PurchaseInvoiceStatus::ALL);
}

#[test]
fn test_cancelled_is_reachable_before_completion() {
    assert!(LpoStatus::Draft.can_transition_to(LpoStatus::Cancelled));
    assert!(LpoStatus::SentToSupplier.can_transition_to(LpoStatus::Cancelled));
    assert!(!LpoStatus::Confirmed.can_transition_to(LpoStatus::Cancelled));
    assert!(SalesOrderStatus::Processing.can_transition_to(SalesOrderStatus::Cancelled));
    assert!(!SalesOrderStatus::Delivered.can_transition_to(SalesOrderStatus::Cancelled));
}

#[test]
fn test_invalid_transition_message_names_both_states() {
    let err = QuotationStatus::Draft
        .ensure_transition(QuotationStatus::Accepted)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Quotation"));
    assert!(message.contains("draft"));
    assert!(message.contains("accepted"));
}

proptest! {
    /// Property: ensure_transition agrees with the lookup table for any pair
    #[test]
    fn test_ensure_transition_matches_table(
        from in 0usize..LpoStatus::ALL.len(),
        to in 0usize..LpoStatus::ALL.len()
    ) {
        let (from, to) = (LpoStatus::ALL[from], LpoStatus::ALL[to]);
        prop_assert_eq!(
            from.ensure_transition(to).is_ok(),
            from.next_states().contains(&to)
        );
    }

    /// Property: stored text parses back to the same status
    #[test]
    fn test_status_text_is_stable(idx in 0usize..SalesOrderStatus::ALL.len()) {
        let status = SalesOrderStatus::ALL[idx];
        prop_assert_eq!(status.as_str().parse::<SalesOrderStatus>(), Ok(status));
    }
}
