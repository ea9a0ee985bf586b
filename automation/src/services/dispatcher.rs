//! Collection Dispatcher
//!
//! 주어진 대출 ID 목록에 대해 평가-수금 pass를 정확히 한 번 실행.
//!
//! # Flow
//!
//! ```text
//! for loan_id in ids (순차):
//!     read_loan ──실패──▶ 로그, 다음 대출
//!        │
//!     inactive ─────────▶ 건너뜀
//!        │
//!     evaluate ──not due─▶ 건너뜀 (호출 없음)
//!        │
//!     submit_collection ──실패──▶ 로그, 다음 대출 (재시도는 다음 사이클)
//! ```
//!
//! 대출 간 처리가 순차적이므로 한 pass 안에서 같은 대출에 대한
//! 제출이 동시에 진행되지 않음
//!
//! # Design Decision
//!
//! Q: 제출 후 receipt를 기다리나?
//! A: 기다리지 않음. 노드가 수락한 해시만 기록하고, 실패한 수금은 다음 사이클의
//!    평가에서 다시 due로 판정됨
//!
//! Q: 건너뛴 대출도 로그에 남기나?
//! A: 비활성/미도래 모두 `info`. 기본 필터에서 대출별 결과가 빠짐없이 보임

use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::chain_client::LoanRegistry;
use super::clock::Clock;
use super::evaluator;
use crate::error::{ReadError, SubmitError};
use crate::types::{LoanId, TxHandle};

/// 대출 1건의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoanOutcome {
    Inactive,
    NotDue {
        next_due: u64,
    },
    Submitted {
        tx_hash: TxHandle,
    },
    ReadFailed {
        #[serde(serialize_with = "serialize_display")]
        error: ReadError,
    },
    SubmitFailed {
        #[serde(serialize_with = "serialize_display")]
        error: SubmitError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanReport {
    pub loan_id: LoanId,
    #[serde(flatten)]
    pub outcome: LoanOutcome,
}

/// pass 결과 집계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub loans: Vec<LoanReport>,
    pub submitted: usize,
    pub not_due: usize,
    pub inactive: usize,
    pub read_failed: usize,
    pub submit_failed: usize,
}

impl PassReport {
    fn record(&mut self, loan_id: LoanId, outcome: LoanOutcome) {
        match outcome {
            LoanOutcome::Inactive => self.inactive += 1,
            LoanOutcome::NotDue { .. } => self.not_due += 1,
            LoanOutcome::Submitted { .. } => self.submitted += 1,
            LoanOutcome::ReadFailed { .. } => self.read_failed += 1,
            LoanOutcome::SubmitFailed { .. } => self.submit_failed += 1,
        }
        self.loans.push(LoanReport { loan_id, outcome });
    }

    /// 제출된 대출 ID (처리 순서)
    pub fn submitted_ids(&self) -> Vec<LoanId> {
        self.loans
            .iter()
            .filter(|r| matches!(r.outcome, LoanOutcome::Submitted { .. }))
            .map(|r| r.loan_id)
            .collect()
    }
}

fn serialize_display<T: std::fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub struct Dispatcher {
    registry: Arc<dyn LoanRegistry>,
    clock: Arc<dyn Clock>,
    due_buffer_secs: u64,
}

impl Dispatcher {
    pub fn new(registry: Arc<dyn LoanRegistry>, clock: Arc<dyn Clock>, due_buffer_secs: u64) -> Self {
        Self {
            registry,
            clock,
            due_buffer_secs,
        }
    }

    /// 대출 목록에 대해 한 번의 pass 실행
    ///
    /// 개별 대출의 실패는 pass를 중단시키지 않음
    pub async fn run_pass(&self, loan_ids: &[LoanId]) -> PassReport {
        let mut report = PassReport::default();

        for &loan_id in loan_ids {
            let outcome = self.process_loan(loan_id).await;
            report.record(loan_id, outcome);
        }

        tracing::info!(
            loans = loan_ids.len(),
            submitted = report.submitted,
            not_due = report.not_due,
            inactive = report.inactive,
            read_failed = report.read_failed,
            submit_failed = report.submit_failed,
            "pass completed"
        );

        report
    }

    async fn process_loan(&self, loan_id: LoanId) -> LoanOutcome {
        let loan = match self.registry.read_loan(loan_id).await {
            Ok(loan) => loan,
            Err(error) => {
                tracing::warn!(%loan_id, %error, "failed to read loan, skipping");
                return LoanOutcome::ReadFailed { error };
            }
        };

        if !loan.active {
            tracing::info!(%loan_id, "loan is not active");
            return LoanOutcome::Inactive;
        }

        let evaluation = evaluator::evaluate(&loan, self.clock.now(), self.due_buffer_secs);
        if !evaluation.is_due {
            tracing::info!(
                %loan_id,
                next_due = evaluation.next_due_timestamp,
                "next installment not due yet"
            );
            return LoanOutcome::NotDue {
                next_due: evaluation.next_due_timestamp,
            };
        }

        tracing::info!(
            %loan_id,
            installment = loan.installments_paid + 1,
            of = loan.total_installments,
            "collecting installment"
        );

        match self.registry.submit_collection(loan_id).await {
            Ok(tx_hash) => {
                tracing::info!(%loan_id, %tx_hash, "collection transaction sent");
                LoanOutcome::Submitted { tx_hash }
            }
            Err(error) => {
                tracing::error!(%loan_id, %error, "collectInstallment failed");
                LoanOutcome::SubmitFailed { error }
            }
        }
    }
}
