//! Common Types Module
//!
//! 체인에서 읽은 대출 스냅샷과 평가 결과 타입

use std::fmt;
use std::str::FromStr;

use ethers::types::TxHash;
use serde::Serialize;

/// 대출 식별자 (레지스트리 내에서 유일한 양의 정수)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl LoanId {
    pub fn new(id: u64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LoanId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a loan id", s.trim()))?;
        LoanId::new(id).ok_or_else(|| "loan id must be positive".to_string())
    }
}

/// 한 번의 읽기로 얻은 대출 스냅샷
///
/// 사이클마다 새로 읽고 평가 직후 버림. 로컬에 보관하지 않음
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub loan_id: LoanId,
    pub active: bool,
    /// 대출 시작 시각 (unix seconds)
    pub start_timestamp: u64,
    /// 상환 간격 (seconds)
    pub installment_interval: u64,
    pub installments_paid: u64,
    pub total_installments: u64,
}

/// Due 평가 결과 (저장하지 않는 파생 값)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueEvaluation {
    pub loan_id: LoanId,
    pub next_due_timestamp: u64,
    pub is_due: bool,
}

/// 노드가 수락한 collection 트랜잭션 해시 (finalize 여부는 추적하지 않음)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TxHandle(pub TxHash);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_id_rejects_zero() {
        assert!(LoanId::new(0).is_none());
        assert_eq!(LoanId::new(7), Some(LoanId(7)));
    }

    #[test]
    fn test_loan_id_parse() {
        assert_eq!(" 12 ".parse::<LoanId>(), Ok(LoanId(12)));
        assert!("0".parse::<LoanId>().is_err());
        assert!("-3".parse::<LoanId>().is_err());
        assert!("abc".parse::<LoanId>().is_err());
    }

    #[test]
    fn test_tx_handle_display_is_full_hex() {
        let handle = TxHandle(TxHash::from_low_u64_be(0xabcd));
        let shown = handle.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.len(), 66);
        assert!(shown.ends_with("abcd"));
    }
}
