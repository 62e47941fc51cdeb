/// イベントディスパッチャー
///
/// Lambdaが受け取ったイベントを発生元ごとの固定レスポンスに振り分ける。
/// 想定外の失敗はすべてここで捕捉し、エラーログを1件出力したうえで
/// 500レスポンスに変換する。呼び出し元にエラーが伝播することはない。
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, UnwindSafe};
use std::sync::Once;

use lambda_runtime::Context;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info_span};

use crate::domain::{EventSource, Response};
use crate::infrastructure::DispatcherConfig;

/// ディスパッチ中に発生した想定外の内部エラー
#[derive(Debug, Error)]
#[error("想定外の内部エラー: {message}")]
pub struct DispatchError {
    message: String,
    /// 作成時点のスタックトレース
    stack_trace: String,
}

impl DispatchError {
    /// メッセージと現在のスタックトレースからエラーを作成
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: Backtrace::force_capture().to_string(),
        }
    }

    /// 捕捉したパニックのペイロードからエラーを作成
    ///
    /// パニックフックが発生地点を記録していればその位置とスタックトレースを使う。
    fn from_panic(payload: Box<dyn Any + Send>, site: Option<PanicSite>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "不明なパニック".to_string());

        match site {
            Some(site) => Self {
                message: format!("パニック: {} ({})", message, site.location),
                stack_trace: site.stack_trace,
            },
            None => Self::new(format!("パニック: {}", message)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }
}

/// JSON値の種別名（エラーメッセージ用）
fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// イベントを発生元に応じたレスポンスに振り分ける
///
/// イベントがJSONオブジェクトでない場合はエラーを返す。
pub fn route(event: &Value) -> Result<Response, DispatchError> {
    let fields = event.as_object().ok_or_else(|| {
        DispatchError::new(format!(
            "イベントがオブジェクトではありません: {}",
            kind_name(event)
        ))
    })?;

    Ok(EventSource::classify(fields).response())
}

/// パニック発生地点の情報
#[derive(Debug)]
struct PanicSite {
    location: String,
    stack_trace: String,
}

thread_local! {
    /// catch_failureの内側で実行中かどうか
    static CATCHING: Cell<bool> = const { Cell::new(false) };
    /// フックが記録した直近のパニック発生地点
    static PANIC_SITE: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// ディスパッチ境界用のパニックフックを設定する
///
/// catch_failureの内側で起きたパニックは標準エラーに出力せず、
/// 発生地点とスタックトレースだけを記録する。それ以外のパニックは
/// 元のフックに委譲する。複数回呼び出しても設定は一度だけ行われる。
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CATCHING.with(Cell::get) {
                let site = PanicSite {
                    location: info
                        .location()
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                    stack_trace: Backtrace::force_capture().to_string(),
                };
                PANIC_SITE.with(|s| *s.borrow_mut() = Some(site));
            } else {
                previous(info);
            }
        }));
    });
}

/// 処理中のパニックを捕捉してエラーに変換する
fn catch_failure<F>(f: F) -> Result<Response, DispatchError>
where
    F: FnOnce() -> Result<Response, DispatchError> + UnwindSafe,
{
    let was_catching = CATCHING.with(|c| c.replace(true));
    let result = panic::catch_unwind(f);
    CATCHING.with(|c| c.set(was_catching));

    result.unwrap_or_else(|payload| {
        let site = PANIC_SITE.with(|s| s.borrow_mut().take());
        Err(DispatchError::from_panic(payload, site))
    })
}

/// Lambda呼び出しごとにイベントを処理するディスパッチャー
///
/// 状態を持たないため、同じイベントに対しては常に同じレスポンスを返す。
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    config: DispatcherConfig,
}

impl EventDispatcher {
    /// 新しいEventDispatcherを作成
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// イベントを処理してレスポンスを返す
    ///
    /// # 処理フロー
    /// 1. `resource`キーの値が真ならAPI Gatewayレスポンス（200）
    /// 2. それ以外はAWS Eventsレスポンス（200）
    /// 3. 想定外の失敗時はエラーログを出力し500レスポンス
    pub fn dispatch(&self, event: &Value, context: &Context) -> Response {
        self.dispatch_with(event, context, || route(event))
    }

    fn dispatch_with<F>(&self, event: &Value, context: &Context, f: F) -> Response
    where
        F: FnOnce() -> Result<Response, DispatchError> + UnwindSafe,
    {
        let span = info_span!("invocation", request_id = %context.request_id);
        let _guard = span.enter();

        match catch_failure(f) {
            Ok(response) => response,
            Err(err) => {
                self.report_failure(event, &err);
                Response::internal_server_error()
            }
        }
    }

    /// 失敗内容をエラーレベルで1件だけ記録する
    fn report_failure(&self, event: &Value, err: &DispatchError) {
        if self.config.debug() {
            error!(
                error = %err,
                stack_trace = err.stack_trace(),
                event = %event,
                "イベント処理中に想定外のエラーが発生"
            );
        } else {
            error!(
                error = %err,
                stack_trace = err.stack_trace(),
                "イベント処理中に想定外のエラーが発生"
            );
        }
    }
}
