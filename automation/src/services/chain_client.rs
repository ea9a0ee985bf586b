//! Chain Client Adapter
//!
//! InstallmentLoan 컨트랙트에 대한 읽기/쓰기 RPC 래퍼.
//!
//! # Features
//! - `loans(loanId)` 조회 → 타입 검증된 `Loan` 스냅샷
//! - `getActiveLoanIds()` 조회
//! - `collectInstallment(loanId)` 트랜잭션 전송 (노드 수락 시 해시 반환, receipt 대기 없음)
//!
//! 모든 호출에 호출자 타임아웃이 적용됨. 재시도는 하지 않음

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::{
    contract::abigen,
    middleware::SignerMiddleware,
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, U256},
};

use crate::config::Config;
use crate::error::{ReadError, SubmitError};
use crate::types::{Loan, LoanId, TxHandle};

abigen!(
    InstallmentLoan,
    r#"[
        function loans(uint256 loanId) external view returns (address lender, address borrower, address token, uint256 principal, uint256 totalInstallments, uint256 installmentInterval, uint256 startTimestamp, uint256 installmentsPaid, bool active)
        function getActiveLoanIds() external view returns (uint256[])
        function collectInstallment(uint256 loanId) external
    ]"#
);

/// 대출 레지스트리 인터페이스
///
/// 테스트에서는 mock 구현으로 교체
#[async_trait]
pub trait LoanRegistry: Send + Sync {
    async fn read_loan(&self, loan_id: LoanId) -> Result<Loan, ReadError>;

    async fn list_active_loan_ids(&self) -> Result<Vec<LoanId>, ReadError>;

    async fn submit_collection(&self, loan_id: LoanId) -> Result<TxHandle, SubmitError>;
}

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// ethers 기반 `LoanRegistry`
///
/// 읽기는 서명 없는 provider, 쓰기는 `SignerMiddleware`를 통해 전송
pub struct EthersLoanRegistry {
    reader: InstallmentLoan<Provider<Http>>,
    writer: InstallmentLoan<SignerClient>,
    timeout: Duration,
}

impl EthersLoanRegistry {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())?;
        let wallet = config
            .signer_key
            .expose()
            .parse::<LocalWallet>()?
            .with_chain_id(config.chain_id);

        tracing::info!(
            contract = ?config.contract_address,
            signer = ?wallet.address(),
            chain_id = config.chain_id,
            "chain client configured"
        );

        let signer_client = Arc::new(SignerMiddleware::new(provider.clone(), wallet));

        Ok(Self {
            reader: InstallmentLoan::new(config.contract_address, Arc::new(provider)),
            writer: InstallmentLoan::new(config.contract_address, signer_client),
            timeout: config.rpc_timeout,
        })
    }

    pub fn contract_address(&self) -> Address {
        self.reader.address()
    }
}

#[async_trait]
impl LoanRegistry for EthersLoanRegistry {
    async fn read_loan(&self, loan_id: LoanId) -> Result<Loan, ReadError> {
        let call = self.reader.loans(U256::from(loan_id.get()));
        let raw = with_timeout(self.timeout, call.call())
            .await
            .ok_or(ReadError::Timeout(self.timeout))?
            .map_err(|e| ReadError::Rpc(e.to_string()))?;

        let (_lender, _borrower, _token, _principal, total, interval, start, paid, active) = raw;
        loan_from_fields(loan_id, active, start, interval, paid, total)
    }

    async fn list_active_loan_ids(&self) -> Result<Vec<LoanId>, ReadError> {
        let call = self.reader.get_active_loan_ids();
        let raw = with_timeout(self.timeout, call.call())
            .await
            .ok_or(ReadError::Timeout(self.timeout))?
            .map_err(|e| ReadError::Rpc(e.to_string()))?;

        raw.into_iter().map(loan_id_from_u256).collect()
    }

    async fn submit_collection(&self, loan_id: LoanId) -> Result<TxHandle, SubmitError> {
        let call = self.writer.collect_installment(U256::from(loan_id.get()));
        let pending = with_timeout(self.timeout, call.send())
            .await
            .ok_or(SubmitError::Timeout(self.timeout))?
            .map_err(|e| {
                if e.is_revert() {
                    SubmitError::Reverted(e.to_string())
                } else {
                    SubmitError::Rejected(e.to_string())
                }
            })?;

        Ok(TxHandle(pending.tx_hash()))
    }
}

/// 타임아웃 시 `None`
async fn with_timeout<F: Future>(limit: Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(limit, fut).await.ok()
}

fn u256_to_u64(value: U256, field: &str) -> Result<u64, ReadError> {
    if value > U256::from(u64::MAX) {
        return Err(ReadError::Malformed(format!(
            "{} = {} does not fit in u64",
            field, value
        )));
    }
    Ok(value.as_u64())
}

fn loan_id_from_u256(raw: U256) -> Result<LoanId, ReadError> {
    let id = u256_to_u64(raw, "loanId")?;
    LoanId::new(id).ok_or_else(|| ReadError::Malformed("loanId 0 in active list".to_string()))
}

/// 체인 응답 필드를 `Loan`으로 변환 (경계에서 검증)
fn loan_from_fields(
    loan_id: LoanId,
    active: bool,
    start: U256,
    interval: U256,
    paid: U256,
    total: U256,
) -> Result<Loan, ReadError> {
    let loan = Loan {
        loan_id,
        active,
        start_timestamp: u256_to_u64(start, "startTimestamp")?,
        installment_interval: u256_to_u64(interval, "installmentInterval")?,
        installments_paid: u256_to_u64(paid, "installmentsPaid")?,
        total_installments: u256_to_u64(total, "totalInstallments")?,
    };

    if loan.active && loan.installment_interval == 0 {
        return Err(ReadError::Malformed(format!(
            "loan {} is active with zero installmentInterval",
            loan_id
        )));
    }
    Ok(loan)
}
