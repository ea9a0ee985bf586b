//! Installment Collection Automation Library
//!
//! # Overview
//!
//! InstallmentLoan 레지스트리를 주기적으로 조회하여 상환 기일이 도래한 할부를
//! `collectInstallment` 트랜잭션으로 수금하는 백그라운드 봇.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  tick   ┌────────────┐  loan ids  ┌─────────────┐
//! │ Scheduler  │ ──────▶ │ Discovery  │ ─────────▶ │ Dispatcher  │
//! └────────────┘         └─────┬──────┘            └──────┬──────┘
//!                              │                          │ read / evaluate / submit
//!                              ▼                          ▼
//!                     ┌──────────────────────────────────────────┐
//!                     │      LoanRegistry (ethers, JSON-RPC)     │
//!                     └──────────────────────────────────────────┘
//!                                        │
//!                                        ▼
//!                              InstallmentLoan contract
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 분류
//! - `services`: 체인 어댑터, 평가기, 디스패처, 스케줄러
//! - `types`: 대출 스냅샷 등 공통 타입
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use installment_automation::{Automation, Config, EthersLoanRegistry, Scheduler, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let registry = Arc::new(EthersLoanRegistry::new(&config)?);
//!     let automation = Automation::from_config(&config, registry, Arc::new(SystemClock));
//!     let scheduler = Scheduler::new(Arc::new(automation), config.poll_interval, config.overlap_policy);
//!
//!     let (_tx, rx) = tokio::sync::broadcast::channel(1);
//!     scheduler.run(rx).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::{Config, OverlapPolicy};
pub use error::{ConfigError, DiscoveryError, ReadError, SubmitError};
pub use services::{
    Automation, CycleOutcome, EthersLoanRegistry, LoanRegistry, PassReport, Scheduler, SystemClock,
};
pub use types::{DueEvaluation, Loan, LoanId, TxHandle};

/// `RUST_LOG`이 없을 때 사용하는 필터. 대출별 처리 결과가 모두 출력되는 수준
pub const DEFAULT_LOG_FILTER: &str = "installment_automation=info";
