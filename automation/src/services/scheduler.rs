//! Polling Scheduler
//!
//! 고정 간격으로 한 사이클을 실행하는 드라이버.
//!
//! ```text
//!            tick (interval)
//!   ┌──────┐ ───────────────▶ ┌─────────┐
//!   │ Idle │                  │ Running │  (pass = 별도 tokio 태스크)
//!   └──────┘ ◀─────────────── └─────────┘
//!            pass 종료 (성공/실패/panic 무관)
//! ```
//!
//! - pass 안의 panic은 `JoinError`로 관찰하고 로그만 남김. 다음 tick은 계속 발생
//! - `SkipWhileRunning`: 1-permit 세마포어, 실행 중이면 tick을 버림
//! - shutdown 시 새 tick 중단, 진행 중인 pass는 끝까지 실행
//!
//! # Design Decision
//!
//! Q: tick이 밀리면?
//! A: `MissedTickBehavior::Delay`. 밀린 tick을 몰아서 실행하지 않고 간격을 다시 맞춤
//!
//! Q: shutdown 시 진행 중인 pass를 취소하나?
//! A: 취소하지 않음. 이미 전송한 트랜잭션과 로그가 끝까지 남도록 `JoinSet`이 빌 때까지 대기

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::Instrument;
use uuid::Uuid;

use super::automation::Automation;
use crate::config::OverlapPolicy;

pub struct Scheduler {
    automation: Arc<Automation>,
    interval: Duration,
    policy: OverlapPolicy,
}

impl Scheduler {
    pub fn new(automation: Arc<Automation>, interval: Duration, policy: OverlapPolicy) -> Self {
        Self {
            automation,
            interval,
            policy,
        }
    }

    /// shutdown 신호를 받을 때까지 실행. 첫 tick은 즉시 발생
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let gate = Arc::new(Semaphore::new(1));
        let mut passes: JoinSet<()> = JoinSet::new();

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            policy = ?self.policy,
            "scheduler started"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::info!("shutdown requested, no further ticks");
                    break;
                }
                Some(joined) = passes.join_next(), if !passes.is_empty() => {
                    log_pass_exit(joined);
                }
                _ = ticker.tick() => {
                    self.on_tick(&gate, &mut passes);
                }
            }
        }

        if !passes.is_empty() {
            tracing::info!(in_flight = passes.len(), "waiting for running passes to finish");
        }
        while let Some(joined) = passes.join_next().await {
            log_pass_exit(joined);
        }
        tracing::info!("scheduler stopped");
    }

    fn on_tick(&self, gate: &Arc<Semaphore>, passes: &mut JoinSet<()>) {
        let permit = match self.policy {
            OverlapPolicy::Allow => None,
            OverlapPolicy::SkipWhileRunning => match gate.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!("previous pass still running, skipping this tick");
                    return;
                }
            },
        };

        let automation = self.automation.clone();
        let span = tracing::info_span!("pass", pass_id = %Uuid::new_v4());

        passes.spawn(
            async move {
                // 태스크 종료 시 (panic 포함) permit 반환
                let _permit = permit;
                automation.run_cycle().await;
            }
            .instrument(span),
        );
    }
}

fn log_pass_exit(joined: Result<(), JoinError>) {
    let Err(err) = joined else {
        return;
    };

    if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::error!(error = %message, "pass aborted by unexpected error");
    } else {
        tracing::warn!(error = %err, "pass task cancelled");
    }
}
