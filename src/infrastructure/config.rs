/// ディスパッチャー設定
///
/// プロセス起動時に一度だけ環境変数から読み込み、
/// ログ初期化とディスパッチャーに明示的に渡す。
use chrono_tz::Tz;
use tracing::Level;

/// デバッグログを有効にする環境変数
pub const DEBUG_ENV: &str = "DEBUG";

/// ログのタイムスタンプに使うタイムゾーン（ホストの既定値に依存しない）
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Rome;

/// ディスパッチャー設定
///
/// 以下の環境変数から読み込む:
/// - DEBUG: "1"の場合のみデバッグレベルのログを有効化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// デバッグレベルのログを出力するか
    debug: bool,
    /// ログのタイムスタンプに使うタイムゾーン
    timezone: Tz,
}

impl DispatcherConfig {
    /// 環境変数から設定を読み込む
    ///
    /// DEBUGが"1"と完全一致する場合のみデバッグを有効にする。
    /// 未設定やそれ以外の値（"true"、" 1"等）は無効として扱う。
    pub fn from_env() -> Self {
        let debug = std::env::var(DEBUG_ENV).is_ok_and(|v| v == "1");

        Self {
            debug,
            timezone: DEFAULT_TIMEZONE,
        }
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(debug: bool, timezone: Tz) -> Self {
        Self { debug, timezone }
    }

    /// デバッグが有効かどうか
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// タイムスタンプ用のタイムゾーンを取得
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// 最低ログレベルを取得
    pub fn log_level(&self) -> Level {
        if self.debug { Level::DEBUG } else { Level::INFO }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new(false, DEFAULT_TIMEZONE)
    }
}
