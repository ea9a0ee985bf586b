//! Services Module
//!
//! 수금 자동화 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `LoanRegistry` / `EthersLoanRegistry`: 컨트랙트 RPC 어댑터
//! - `evaluator`: due 여부 계산 (순수 함수)
//! - `Dispatcher`: 대출별 평가 및 수금 트랜잭션 제출
//! - `Discovery`: 사이클마다 평가할 대출 목록
//! - `Automation`: discovery + dispatch 한 사이클
//! - `Scheduler`: 고정 간격 드라이버

mod automation;
mod chain_client;
mod clock;
mod discovery;
mod dispatcher;
pub mod evaluator;
mod scheduler;

#[cfg(test)]
pub(crate) mod mock;

pub use automation::{Automation, CycleOutcome};
pub use chain_client::{EthersLoanRegistry, LoanRegistry};
pub use clock::{Clock, SystemClock};
pub use discovery::Discovery;
pub use dispatcher::{Dispatcher, LoanOutcome, LoanReport, PassReport};
pub use scheduler::Scheduler;
