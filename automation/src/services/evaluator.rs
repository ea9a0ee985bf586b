//! Loan Due-Date Evaluator
//!
//! 순수 함수. I/O 없음, 상태 없음
//!
//! ```text
//! next_due = start_timestamp + installment_interval * installments_paid
//! is_due   = now >= next_due + due_buffer
//! ```
//!
//! 비활성 대출은 타임스탬프와 무관하게 항상 `is_due = false`.
//! 입력 검증은 하지 않음 (컨트랙트가 대출 생성 시점에 보장)

use crate::types::{DueEvaluation, Loan};

/// 다음 상환 예정 시각
pub fn next_due_timestamp(loan: &Loan) -> u64 {
    loan.start_timestamp
        .saturating_add(loan.installment_interval.saturating_mul(loan.installments_paid))
}

/// 대출의 다음 할부가 수금 가능한지 평가
///
/// buffer를 늘리면 수금이 늦어질 뿐 앞당겨지지 않음
pub fn evaluate(loan: &Loan, now: u64, due_buffer_secs: u64) -> DueEvaluation {
    let next_due = next_due_timestamp(loan);
    let is_due = loan.active && now >= next_due.saturating_add(due_buffer_secs);

    DueEvaluation {
        loan_id: loan.loan_id,
        next_due_timestamp: next_due,
        is_due,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoanId;

    fn loan(active: bool) -> Loan {
        Loan {
            loan_id: LoanId(1),
            active,
            start_timestamp: 1000,
            installment_interval: 100,
            installments_paid: 2,
            total_installments: 10,
        }
    }

    #[test]
    fn test_due_at_buffered_boundary() {
        // nextDue = 1200, 1210 >= 1200 + 10
        let eval = evaluate(&loan(true), 1210, 10);
        assert_eq!(eval.next_due_timestamp, 1200);
        assert!(eval.is_due);
        assert_eq!(eval.loan_id, LoanId(1));
    }

    #[test]
    fn test_not_due_one_second_before_boundary() {
        let eval = evaluate(&loan(true), 1209, 10);
        assert_eq!(eval.next_due_timestamp, 1200);
        assert!(!eval.is_due);
    }

    #[test]
    fn test_inactive_loan_never_due() {
        for now in [0, 1200, 1210, u64::MAX] {
            assert!(!evaluate(&loan(false), now, 0).is_due);
        }
    }

    #[test]
    fn test_first_installment_due_at_start() {
        let mut fresh = loan(true);
        fresh.installments_paid = 0;
        assert!(evaluate(&fresh, 1000, 0).is_due);
        assert!(!evaluate(&fresh, 999, 0).is_due);
    }

    #[test]
    fn test_wider_buffer_only_delays() {
        let l = loan(true);
        for now in 1150..1300 {
            for buffer in 0..50 {
                let narrow = evaluate(&l, now, buffer).is_due;
                let wide = evaluate(&l, now, buffer + 1).is_due;
                assert!(!wide || narrow, "now={} buffer={}", now, buffer);
            }
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let l = loan(true);
        assert_eq!(evaluate(&l, 1234, 10), evaluate(&l, 1234, 10));
    }

    #[test]
    fn test_huge_values_saturate() {
        let mut l = loan(true);
        l.installment_interval = u64::MAX;
        let eval = evaluate(&l, u64::MAX - 1, 10);
        assert_eq!(eval.next_due_timestamp, u64::MAX);
        assert!(!eval.is_due);
    }
}
