//! 테스트용 in-memory `LoanRegistry`

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::TxHash;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

use super::chain_client::LoanRegistry;
use super::clock::Clock;
use crate::error::{ReadError, SubmitError};
use crate::types::{Loan, LoanId, TxHandle};

/// 고정 시각
pub(crate) struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// 바이너리 기본 필터로 로그를 수집하는 writer
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// 현재 스레드에만 적용되는 subscriber 설치
    pub fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(crate::DEFAULT_LOG_FILTER))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        tracing::callsite::rebuild_interest_cache();
        guard
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockRegistry {
    loans: Mutex<HashMap<LoanId, Loan>>,
    active_ids: Vec<LoanId>,
    enumeration_error: Option<ReadError>,
    enumeration_delay: Option<Duration>,
    panicking_enumerations: AtomicUsize,
    failing_reads: HashSet<LoanId>,
    failing_submits: HashMap<LoanId, SubmitError>,

    in_flight: Mutex<HashSet<LoanId>>,
    overlapping_submit: AtomicBool,

    enumerations: AtomicUsize,
    reads: Mutex<Vec<LoanId>>,
    submissions: Mutex<Vec<LoanId>>,
}

/// 시작 1000, 간격 100, 총 10회짜리 활성 대출
pub(crate) fn loan(id: u64, installments_paid: u64) -> Loan {
    Loan {
        loan_id: LoanId(id),
        active: true,
        start_timestamp: 1000,
        installment_interval: 100,
        installments_paid,
        total_installments: 10,
    }
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 대출 추가. 활성 대출이면 enumeration 결과에도 포함
    pub fn with_loan(mut self, loan: Loan) -> Self {
        if loan.active {
            self.active_ids.push(loan.loan_id);
        }
        self.loans.get_mut().unwrap().insert(loan.loan_id, loan);
        self
    }

    pub fn with_failing_read(mut self, id: u64) -> Self {
        self.failing_reads.insert(LoanId(id));
        self
    }

    pub fn with_failing_submit(mut self, id: u64, error: SubmitError) -> Self {
        self.failing_submits.insert(LoanId(id), error);
        self
    }

    pub fn with_enumeration_error(mut self, error: ReadError) -> Self {
        self.enumeration_error = Some(error);
        self
    }

    pub fn with_enumeration_delay(mut self, delay: Duration) -> Self {
        self.enumeration_delay = Some(delay);
        self
    }

    /// 처음 `count`번의 enumeration 호출이 panic
    pub fn with_panicking_enumerations(self, count: usize) -> Self {
        self.panicking_enumerations.store(count, Ordering::SeqCst);
        self
    }

    pub fn enumeration_count(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<LoanId> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn read_ids(&self) -> Vec<LoanId> {
        self.reads.lock().unwrap().clone()
    }

    pub fn saw_overlapping_submit(&self) -> bool {
        self.overlapping_submit.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoanRegistry for MockRegistry {
    async fn read_loan(&self, loan_id: LoanId) -> Result<Loan, ReadError> {
        self.reads.lock().unwrap().push(loan_id);
        if self.failing_reads.contains(&loan_id) {
            return Err(ReadError::Rpc(format!("execution reverted reading loan {}", loan_id)));
        }
        self.loans
            .lock()
            .unwrap()
            .get(&loan_id)
            .cloned()
            .ok_or_else(|| ReadError::Malformed(format!("unknown loan {}", loan_id)))
    }

    async fn list_active_loan_ids(&self) -> Result<Vec<LoanId>, ReadError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.enumeration_delay {
            tokio::time::sleep(delay).await;
        }
        let should_panic = self
            .panicking_enumerations
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_panic {
            panic!("unexpected enumeration failure");
        }
        match &self.enumeration_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.active_ids.clone()),
        }
    }

    async fn submit_collection(&self, loan_id: LoanId) -> Result<TxHandle, SubmitError> {
        if !self.in_flight.lock().unwrap().insert(loan_id) {
            self.overlapping_submit.store(true, Ordering::SeqCst);
        }
        tokio::task::yield_now().await;
        self.in_flight.lock().unwrap().remove(&loan_id);

        self.submissions.lock().unwrap().push(loan_id);
        if let Some(err) = self.failing_submits.get(&loan_id) {
            return Err(err.clone());
        }

        // 컨트랙트처럼 성공 시 installmentsPaid 증가, 완납 시 비활성화
        if let Some(loan) = self.loans.lock().unwrap().get_mut(&loan_id) {
            loan.installments_paid += 1;
            if loan.installments_paid >= loan.total_installments {
                loan.active = false;
            }
        }
        Ok(TxHandle(TxHash::from_low_u64_be(loan_id.get())))
    }
}
