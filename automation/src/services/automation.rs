//! Automation Cycle
//!
//! 시작 시 한 번 구성되는 컨텍스트 객체. discovery → dispatch 한 사이클을 실행

use std::sync::Arc;

use super::chain_client::LoanRegistry;
use super::clock::Clock;
use super::discovery::Discovery;
use super::dispatcher::{Dispatcher, PassReport};
use crate::config::Config;
use crate::error::DiscoveryError;

/// 사이클 결과
#[derive(Debug)]
pub enum CycleOutcome {
    /// discovery 실패로 아무 대출도 처리하지 않음
    Skipped(DiscoveryError),
    Completed(PassReport),
}

pub struct Automation {
    discovery: Discovery,
    dispatcher: Dispatcher,
}

impl Automation {
    pub fn new(discovery: Discovery, dispatcher: Dispatcher) -> Self {
        Self {
            discovery,
            dispatcher,
        }
    }

    pub fn from_config(
        config: &Config,
        registry: Arc<dyn LoanRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let discovery = Discovery::from_config(config.static_loan_ids.clone(), registry.clone());
        let dispatcher = Dispatcher::new(registry, clock, config.due_buffer_secs);
        Self::new(discovery, dispatcher)
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    /// 한 사이클 실행
    pub async fn run_cycle(&self) -> CycleOutcome {
        let loan_ids = match self.discovery.discover().await {
            Ok(ids) => ids,
            Err(error) => {
                tracing::error!(%error, "loan discovery failed, skipping this cycle");
                return CycleOutcome::Skipped(error);
            }
        };

        tracing::debug!(count = loan_ids.len(), "loans discovered");
        CycleOutcome::Completed(self.dispatcher.run_pass(&loan_ids).await)
    }
}
