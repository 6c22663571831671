//! # Observability 基盤
//!
//! 構造化ログの初期化を提供する。運用環境では JSON、開発環境では
//! 人間可読の Pretty 形式を使い分け、切り替えは環境変数 `LOG_FORMAT` で行う。
//! ログレベルは `RUST_LOG`（EnvFilter 記法）で制御する。
//!
//! このクレート自体はログを初期化しない。初期化は外側のバイナリが
//! 起動時に一度だけ [`init_tracing`] を呼ぶ契約とする。

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON 形式。`jq` で機械的に調査できる（本番環境向け）
    Json,
    /// 人間が読みやすい形式（開発環境向け）
    #[default]
    Pretty,
}

impl LogFormat {
    /// ラベル文字列に対応する形式を返す
    ///
    /// `"json"` / `"pretty"` のみを受け付け、それ以外は `None`。
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }

    /// 環境変数 `LOG_FORMAT` から形式を決定する
    ///
    /// 未設定なら Pretty。設定されているが不正な値の場合も Pretty に
    /// フォールバックし、stderr に警告を出す（この時点ではまだ
    /// トレーシングが初期化されていないため）。
    pub fn from_env() -> Self {
        let Ok(label) = std::env::var("LOG_FORMAT") else {
            return Self::default();
        };
        Self::from_label(&label).unwrap_or_else(|| {
            eprintln!("WARNING: unknown LOG_FORMAT={label:?}, falling back to pretty");
            Self::default()
        })
    }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` 未設定時のデフォルトフィルタは `"info,campusflow=debug"`。
/// JSON モードではイベントフィールドをトップレベルにフラット化するため、
/// `event.category` などのドット記法フィールドがそのままキーになる。
///
/// 初期化完了時に `service` フィールド付きの info イベントを 1 件出力する。
#[cfg(feature = "observability")]
pub fn init_tracing(service_name: &str, format: LogFormat) {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,campusflow=debug".into());

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!(service = %service_name, "トレーシングを初期化しました");
}

/// 環境変数から形式を読み取ってトレーシングを初期化する
///
/// [`LogFormat::from_env`] + [`init_tracing`] のショートハンド。
#[cfg(feature = "observability")]
pub fn init_tracing_from_env(service_name: &str) {
    init_tracing(service_name, LogFormat::from_env());
}
