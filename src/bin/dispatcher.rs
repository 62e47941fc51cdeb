/// イベントディスパッチャーLambda
///
/// API Gateway経由の呼び出しとそれ以外のトリガー（EventBridge等）を判別し、
/// それぞれ固定のレスポンスを返す。
///
/// 環境変数:
/// - DEBUG: "1"の場合デバッグレベルのログを有効化
use event_dispatcher::application::{EventDispatcher, install_panic_hook};
use event_dispatcher::handler;
use event_dispatcher::infrastructure::{DispatcherConfig, init_logging};
use lambda_runtime::{Error, service_fn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 設定は起動時に一度だけ読み込む
    let config = DispatcherConfig::from_env();

    // 構造化ログを初期化
    init_logging(&config);

    // ディスパッチ境界内のパニックはエラーログ1件にまとめる
    install_panic_hook();

    let dispatcher = EventDispatcher::new(config);

    // Lambda関数を初期化して実行
    let func = service_fn(|event| handler(&dispatcher, event));
    lambda_runtime::run(func).await?;
    Ok(())
}
