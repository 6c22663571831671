//! # インフラ層エラー定義
//!
//! 永続化ポートの実装が報告するエラーを表現する。
//!
//! 種別は 2 つに絞る。楽観的ロックの不一致（[`InfraErrorKind::Conflict`]）は
//! ユースケース層でリトライ可能な競合に昇格させ、それ以外
//! （[`InfraErrorKind::Unexpected`]）は呼び出し側で回復できない
//! 内部エラーとして扱う。
//!
//! 型の構造は `std::io::Error` に倣い、種別 enum を [`SpanTrace`] 付きの
//! ラッパー struct で包む。コンストラクタ経由で生成した時点の
//! スパン情報（呼び出し経路）が自動的に記録される。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層のエラー
///
/// 種別（[`InfraErrorKind`]）と生成時点の [`SpanTrace`] を保持する。
/// 種別ごとの分岐には [`kind()`](InfraError::kind) を使う。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 楽観的ロックの不一致
    ///
    /// 更新時に期待したバージョンとストア上のバージョンが食い違った場合。
    /// 先行する書き込みが割り込んだことを意味する。
    #[error("更新が競合しました: {entity}(id={id})")]
    Conflict {
        /// エンティティ名（例: "Locker"）
        entity: String,
        /// 対象エンティティの識別子
        id:     String,
    },

    /// ストアへの接続失敗など、呼び出し側で回復できないエラー
    #[error("インフラエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    /// エラー種別から新しいエラーを作成する（SpanTrace を捕捉）
    pub fn new(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    /// 楽観的ロック競合エラーを作成する
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Conflict {
            entity: entity.into(),
            id:     id.into(),
        })
    }

    /// 予期しないエラーを作成する
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Unexpected(message.into()))
    }

    /// エラー種別への参照を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// エラー生成時点のスパン情報を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }
}

impl From<InfraErrorKind> for InfraError {
    fn from(kind: InfraErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &format_args!("{}", self.span_trace))
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}
