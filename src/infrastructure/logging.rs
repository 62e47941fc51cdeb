/// ログ基盤モジュール
///
/// Lambda環境向けの構造化ログ設定を提供する。
/// tracingクレートを使用し、JSON形式で出力する。
/// タイムスタンプは設定で指定したタイムゾーンで記録する。
use std::sync::Once;

use chrono::{SecondsFormat, Utc};
use chrono_tz::Tz;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use super::DispatcherConfig;

/// ログサブスクライバー初期化用の同期プリミティブ
static INIT: Once = Once::new();

/// 固定タイムゾーンでタイムスタンプを出力するタイマー
#[derive(Debug, Clone, Copy)]
pub struct ZonedTimer {
    timezone: Tz,
}

impl ZonedTimer {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// 現在時刻をRFC 3339形式（オフセット付き）で取得
    pub fn now_rfc3339(&self) -> String {
        Utc::now()
            .with_timezone(&self.timezone)
            .to_rfc3339_opts(SecondsFormat::Millis, false)
    }
}

impl FormatTime for ZonedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", self.now_rfc3339())
    }
}

/// 設定に応じたフィルターを生成
fn build_filter(config: &DispatcherConfig) -> EnvFilter {
    EnvFilter::new(config.log_level().as_str().to_lowercase())
}

/// JSON形式のサブスクライバーを構築する（グローバルには登録しない）
fn json_subscriber<W>(config: DispatcherConfig, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    // JSON形式のログレイヤー（Lambda/CloudWatch向け）
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(writer)
        .with_timer(ZonedTimer::new(config.timezone()))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .flatten_event(true)
        .with_current_span(false);

    tracing_subscriber::registry()
        .with(build_filter(&config))
        .with(json_layer)
}

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// JSON形式での構造化ログ出力を設定する。最低ログレベルは
/// `DispatcherConfig::log_level`（infoまたはdebug）に従う。
///
/// この関数は複数回呼び出しても安全で、最初の呼び出しのみ初期化を実行する。
pub fn init_logging(config: &DispatcherConfig) {
    INIT.call_once(|| {
        // サブスクライバーを構築して初期化
        json_subscriber(*config, std::io::stdout).init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
///
/// # 注意
/// この関数はテスト専用であり、本番環境では`init_logging`を使用すること。
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_timer(ZonedTimer::new(super::DEFAULT_TIMEZONE))
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("debug"))
            .with(fmt_layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::Value;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// 書き込まれたログを保持するバッファ
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = SharedBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// JSONサブスクライバー経由で出力されたログ行を返す
    fn capture_json(config: DispatcherConfig, f: impl FnOnce()) -> Vec<Value> {
        let buffer = SharedBuffer::default();
        let subscriber = json_subscriber(config, buffer.clone());

        tracing::subscriber::with_default(subscriber, f);

        buffer.lines()
    }

    #[test]
    fn test_init_logging_idempotent() {
        // 複数回呼び出してもパニックしない
        init_test_logging();
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_zoned_timer_uses_configured_offset() {
        let timer = ZonedTimer::new(chrono_tz::Europe::Rome);

        let parsed = DateTime::parse_from_rfc3339(&timer.now_rfc3339()).unwrap();

        // ローマは冬時間+01:00、夏時間+02:00
        let offset = parsed.offset().local_minus_utc();
        assert!(offset == 3600 || offset == 7200, "offset = {}", offset);
    }

    #[test]
    fn test_zoned_timer_utc() {
        let timer = ZonedTimer::new(chrono_tz::UTC);

        let parsed = DateTime::parse_from_rfc3339(&timer.now_rfc3339()).unwrap();

        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_filter_follows_debug_flag() {
        let info = build_filter(&DispatcherConfig::new(false, chrono_tz::UTC));
        let debug = build_filter(&DispatcherConfig::new(true, chrono_tz::UTC));

        assert_eq!(info.max_level_hint(), Some(tracing::level_filters::LevelFilter::INFO));
        assert_eq!(debug.max_level_hint(), Some(tracing::level_filters::LevelFilter::DEBUG));
    }

    /// JSON行にフィールドが平坦化され、タイムスタンプは設定したゾーンで出力される
    #[test]
    fn test_json_subscriber_output() {
        let lines = capture_json(DispatcherConfig::new(false, chrono_tz::Europe::Rome), || {
            tracing::error!(error = "失敗", "イベント処理中に想定外のエラーが発生");
        });

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["level"], "ERROR");
        assert_eq!(line["error"], "失敗");
        assert_eq!(line["message"], "イベント処理中に想定外のエラーが発生");

        let timestamp = DateTime::parse_from_rfc3339(line["timestamp"].as_str().unwrap()).unwrap();
        let offset = timestamp.offset().local_minus_utc();
        assert!(offset == 3600 || offset == 7200, "offset = {}", offset);
    }

    #[test]
    fn test_json_subscriber_hides_debug_by_default() {
        let lines = capture_json(DispatcherConfig::new(false, chrono_tz::UTC), || {
            tracing::debug!("詳細");
            tracing::info!("通常");
        });

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "INFO");
    }

    #[test]
    fn test_json_subscriber_shows_debug_when_enabled() {
        let lines = capture_json(DispatcherConfig::new(true, chrono_tz::UTC), || {
            tracing::debug!("詳細");
            tracing::trace!("さらに詳細");
        });

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "DEBUG");
    }
}
