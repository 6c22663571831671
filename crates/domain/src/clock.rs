//! # Clock（時刻プロバイダ）
//!
//! エンティティの生成・遷移メソッドは時刻を常に引数で受け取り、
//! `Utc::now()` をドメイン・ユースケース層から直接呼ばない。
//! ユースケースにはこのトレイトを注入し、テストでは固定時刻に差し替える。

use chrono::{DateTime, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
