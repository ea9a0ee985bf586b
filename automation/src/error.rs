//! Error Handling Module
//!
//! 자동화 봇의 에러 분류. 각 에러는 자신이 정의된 범위를 넘어서 전파되지 않음
//!
//! | 에러 | 범위 | 처리 |
//! |------|------|------|
//! | `ConfigError` | 시작 시점 | 프로세스 종료 (non-zero exit) |
//! | `ReadError` | 대출 1건 | 로그 후 다음 대출로 |
//! | `DiscoveryError` | 사이클 1회 | 로그 후 다음 tick 대기 |
//! | `SubmitError` | 대출 1건 | 로그 후 다음 사이클에서 재평가 |
//!
//! 예상하지 못한 에러(panic)는 스케줄러가 pass 태스크의 `JoinError`로 관찰함

use std::time::Duration;

use thiserror::Error;

/// 설정 에러 (치명적, 시작 시점 전용)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {key}")]
    Missing { key: &'static str },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// 체인 읽기 실패 (`loans`, `getActiveLoanIds`)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("RPC read timed out after {0:?}")]
    Timeout(Duration),

    #[error("RPC read failed: {0}")]
    Rpc(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// 활성 대출 목록 조회 실패. 해당 사이클 전체를 건너뜀
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("active loan enumeration failed: {0}")]
    Enumeration(#[from] ReadError),
}

/// `collectInstallment` 트랜잭션 제출 실패
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("submission timed out after {0:?}")]
    Timeout(Duration),

    /// 노드가 트랜잭션을 거부 (nonce, gas, 연결 문제 등)
    #[error("node rejected transaction: {0}")]
    Rejected(String),

    /// 컨트랙트 비즈니스 룰에 의한 revert (아직 due 아님, 이미 완료된 대출 등)
    #[error("contract reverted: {0}")]
    Reverted(String),
}
