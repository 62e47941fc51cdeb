use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;

// Domain layer modules
pub mod domain;

// Application layer modules
pub mod application;

// Infrastructure layer modules
pub mod infrastructure;

use application::EventDispatcher;
use domain::Response;

/// Lambdaランタイムからのイベントをディスパッチャーに渡す
///
/// ディスパッチャーがすべての失敗を500レスポンスに変換するため、
/// このハンドラーは常に`Ok`を返す。
pub async fn handler(
    dispatcher: &EventDispatcher,
    event: LambdaEvent<Value>,
) -> Result<Response, Error> {
    let (payload, context) = event.into_parts();
    Ok(dispatcher.dispatch(&payload, &context))
}
