//! Active-Loan Discovery
//!
//! 이번 사이클에 평가할 대출 ID 목록을 결정
//!
//! - `Static`: 운영자가 지정한 고정 목록 (테스트용 제한 운영)
//! - `Live`: 체인의 `getActiveLoanIds()` 조회. 실패 시 이전 목록을 재사용하지 않음

use std::collections::HashSet;
use std::sync::Arc;

use super::chain_client::LoanRegistry;
use crate::error::DiscoveryError;
use crate::types::LoanId;

pub enum Discovery {
    Static(Vec<LoanId>),
    Live(Arc<dyn LoanRegistry>),
}

impl Discovery {
    /// 설정된 정적 목록이 있으면 우선 사용
    pub fn from_config(static_ids: Option<Vec<LoanId>>, registry: Arc<dyn LoanRegistry>) -> Self {
        match static_ids {
            Some(ids) => Discovery::Static(ids),
            None => Discovery::Live(registry),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Discovery::Static(ids) => format!("static list of {} loans", ids.len()),
            Discovery::Live(_) => "live enumeration".to_string(),
        }
    }

    /// 대출 ID 목록 (중복 제거, 순서 유지)
    pub async fn discover(&self) -> Result<Vec<LoanId>, DiscoveryError> {
        let ids = match self {
            Discovery::Static(ids) => ids.clone(),
            Discovery::Live(registry) => registry.list_active_loan_ids().await?,
        };

        let mut seen = HashSet::with_capacity(ids.len());
        Ok(ids.into_iter().filter(|id| seen.insert(*id)).collect())
    }
}
