//! Configuration Module
//!
//! 환경변수에서 한 번 로드되어 `Arc`로 공유되는 읽기 전용 설정.
//! 필수 값이 없거나 잘못되면 스케줄러를 시작하지 않고 즉시 실패함

use std::env;
use std::fmt;
use std::time::Duration;

use ethers::types::Address;

use crate::error::ConfigError;
use crate::types::LoanId;

/// Flow EVM testnet
pub const DEFAULT_CHAIN_ID: u64 = 545;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
/// 호스트 시계와 블록 타임스탬프 차이를 흡수하는 due buffer 기본값
pub const DEFAULT_DUE_BUFFER_SECS: u64 = 10;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 15;

/// 서명용 private key
///
/// `Debug`/`Display` 모두 값을 출력하지 않음
#[derive(Clone, PartialEq, Eq)]
pub struct SignerKey(String);

impl SignerKey {
    /// 32바이트 hex 문자열 검증 (`0x` / `0X` 접두사 허용)
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits)
            .map_err(|_| ConfigError::invalid("SIGNER_PRIVATE_KEY", "not a hex string"))?;
        if bytes.len() != 32 {
            return Err(ConfigError::invalid(
                "SIGNER_PRIVATE_KEY",
                format!("expected 32 bytes, got {}", bytes.len()),
            ));
        }
        Ok(Self(digits.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignerKey(<redacted>)")
    }
}

/// 이전 pass가 끝나지 않았을 때의 tick 처리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// 실행 중인 pass가 있으면 해당 tick을 버림
    #[default]
    SkipWhileRunning,
    /// 고정 간격 타이머 그대로, pass가 겹칠 수 있음 (컨트랙트 revert에 의존)
    Allow,
}

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 체인 노드 JSON-RPC URL
    pub rpc_url: String,

    /// InstallmentLoan 컨트랙트 주소
    pub contract_address: Address,

    pub signer_key: SignerKey,

    pub chain_id: u64,

    pub poll_interval: Duration,

    pub due_buffer_secs: u64,

    /// 모든 RPC 호출에 적용되는 타임아웃
    pub rpc_timeout: Duration,

    /// 설정되면 live enumeration 대신 사용
    pub static_loan_ids: Option<Vec<LoanId>>,

    pub overlap_policy: OverlapPolicy,
}

/// 기존 스크립트 배포(`.env`)에서 쓰던 이름. 새 이름이 없을 때만 읽음
const LEGACY_RPC_URL: &str = "FLOWEVM_RPC";
const LEGACY_CONTRACT_ADDRESS: &str = "INSTALLMENT_LOAN_CONTRACT_ADDRESS";
const LEGACY_SIGNER_KEY: &str = "TEST_ACCOUNT_PRIVATE_KEY";
/// 밀리초 단위
const LEGACY_REFRESH_INTERVAL_MS: &str = "AUTOMATION_REFRESH_INTERVAL";

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Required Environment Variables
    ///
    /// - `RPC_URL` (이전 이름: `FLOWEVM_RPC`)
    /// - `INSTALLMENT_LOAN_ADDRESS` (이전 이름: `INSTALLMENT_LOAN_CONTRACT_ADDRESS`)
    /// - `SIGNER_PRIVATE_KEY` (이전 이름: `TEST_ACCOUNT_PRIVATE_KEY`)
    ///
    /// # Optional Environment Variables
    ///
    /// - `CHAIN_ID` (기본값: 545)
    /// - `POLL_INTERVAL_SECS` (기본값: 30). 없으면 `AUTOMATION_REFRESH_INTERVAL` (밀리초)
    /// - `DUE_BUFFER_SECS` (기본값: 10)
    /// - `RPC_TIMEOUT_SECS` (기본값: 15)
    /// - `STATIC_LOAN_IDS`: `1,2,3` 형태
    /// - `ALLOW_OVERLAPPING_PASSES`: true | false
    ///
    /// # Design Decision
    ///
    /// 새 이름과 이전 이름이 모두 있으면 새 이름이 우선.
    /// 에러 메시지에는 항상 새 이름을 사용
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 key → value 조회 함수로 설정 생성
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str, legacy: &str| {
            get(key)
                .or_else(|| get(legacy))
                .ok_or(ConfigError::Missing { key })
        };

        let rpc_url = required("RPC_URL", LEGACY_RPC_URL)?;
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ConfigError::invalid("RPC_URL", "must be an http(s) URL"));
        }

        let contract_address = required("INSTALLMENT_LOAN_ADDRESS", LEGACY_CONTRACT_ADDRESS)?
            .parse::<Address>()
            .map_err(|e| ConfigError::invalid("INSTALLMENT_LOAN_ADDRESS", e.to_string()))?;

        let signer_key = SignerKey::parse(&required("SIGNER_PRIVATE_KEY", LEGACY_SIGNER_KEY)?)?;

        let chain_id = parse_u64(get("CHAIN_ID"), "CHAIN_ID", DEFAULT_CHAIN_ID)?;

        let poll_interval = match (get("POLL_INTERVAL_SECS"), get(LEGACY_REFRESH_INTERVAL_MS)) {
            (None, Some(millis)) => Duration::from_millis(parse_u64(
                Some(millis),
                LEGACY_REFRESH_INTERVAL_MS,
                0,
            )?),
            (secs, _) => Duration::from_secs(parse_u64(
                secs,
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
        };
        if poll_interval.is_zero() {
            return Err(ConfigError::invalid(
                "POLL_INTERVAL_SECS",
                "must be greater than zero",
            ));
        }

        let due_buffer_secs = parse_u64(
            get("DUE_BUFFER_SECS"),
            "DUE_BUFFER_SECS",
            DEFAULT_DUE_BUFFER_SECS,
        )?;

        let rpc_timeout_secs = parse_u64(
            get("RPC_TIMEOUT_SECS"),
            "RPC_TIMEOUT_SECS",
            DEFAULT_RPC_TIMEOUT_SECS,
        )?;
        if rpc_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "RPC_TIMEOUT_SECS",
                "must be greater than zero",
            ));
        }

        let static_loan_ids = get("STATIC_LOAN_IDS")
            .map(|raw| parse_loan_ids(&raw))
            .transpose()?;

        let overlap_policy = match get("ALLOW_OVERLAPPING_PASSES")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("0" | "false" | "no" | "off") => OverlapPolicy::SkipWhileRunning,
            Some("1" | "true" | "yes" | "on") => OverlapPolicy::Allow,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "ALLOW_OVERLAPPING_PASSES",
                    format!("'{}' is not a boolean", other),
                ))
            }
        };

        Ok(Config {
            rpc_url,
            contract_address,
            signer_key,
            chain_id,
            poll_interval,
            due_buffer_secs,
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),
            static_loan_ids,
            overlap_policy,
        })
    }

    /// 로그용 RPC 호스트. 사용자 정보, 경로, 쿼리는 제외
    pub fn rpc_host(&self) -> &str {
        let rest = self
            .rpc_url
            .split_once("://")
            .map_or(self.rpc_url.as_str(), |(_, rest)| rest);
        let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        authority.rsplit('@').next().unwrap_or(authority)
    }
}

fn parse_u64(raw: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::invalid(key, format!("'{}' is not a non-negative integer", v))),
    }
}

fn parse_loan_ids(raw: &str) -> Result<Vec<LoanId>, ConfigError> {
    let ids = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<LoanId>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| ConfigError::invalid("STATIC_LOAN_IDS", reason))?;

    if ids.is_empty() {
        return Err(ConfigError::invalid("STATIC_LOAN_IDS", "no loan ids given"));
    }
    Ok(ids)
}
