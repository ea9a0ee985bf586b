//! 현재 시각 (unix seconds)

use chrono::Utc;

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// 호스트 시스템 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // epoch 이전 시각은 0으로 취급
        Utc::now().timestamp().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2024() {
        assert!(SystemClock.now() > 1_704_067_200);
    }
}
