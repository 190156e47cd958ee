//! 방출 세션.
//!
//! 시뮬레이션 사용자 한 명이 소유하는 카운터. 생성 시 0에서 시작하고
//! 매 방출 직전에 1씩 증가한다 (increment-then-classify). 따라서 첫 호출은
//! 카운터 1(정상)이고 이상 구간은 10, 20, 30번째 호출에 나타난다.

use rand::RngExt;

use crate::models::metric::Emission;
use crate::pattern::TrafficPattern;

/// 사용자 세션 (전용 카운터 + 패턴)
#[derive(Debug, Clone)]
pub struct EmissionSession {
    user_id: usize,
    counter: u64,
    pattern: TrafficPattern,
}

impl EmissionSession {
    /// 새 세션 생성 (카운터 0)
    pub fn new(user_id: usize, pattern: TrafficPattern) -> Self {
        Self {
            user_id,
            counter: 0,
            pattern,
        }
    }

    pub fn user_id(&self) -> usize {
        self.user_id
    }

    /// 지금까지 방출한 횟수
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// 카운터 증가 후 레짐 분류, 페이로드 생성
    pub fn next_emission<R: RngExt + ?Sized>(&mut self, rng: &mut R) -> Emission {
        self.counter += 1;
        let regime = self.pattern.regime_for(self.counter);
        Emission {
            counter: self.counter,
            regime,
            payload: self.pattern.sample(regime, rng),
        }
    }
}
