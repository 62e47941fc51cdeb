// イベント発生元の判定
//
// Lambdaに届いたイベントの構造から、API Gateway経由の呼び出しか
// それ以外のトリガー（EventBridge等）かを判定する。

use serde_json::{Map, Value};

use super::Response;

/// API Gatewayイベントを識別するキー
pub const RESOURCE_KEY: &str = "resource";

/// イベントの発生元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// API Gateway経由の呼び出し
    ApiGateway,
    /// それ以外のトリガー
    AwsEvents,
}

impl EventSource {
    /// イベントオブジェクトから発生元を判定
    ///
    /// `resource`キーの値が真と評価される場合のみAPI Gatewayとみなす。
    /// キーが存在しても値が偽（空文字、null等）であればAwsEventsとなる。
    pub fn classify(event: &Map<String, Value>) -> Self {
        match event.get(RESOURCE_KEY) {
            Some(resource) if is_truthy(resource) => EventSource::ApiGateway,
            _ => EventSource::AwsEvents,
        }
    }

    /// 発生元に対応するレスポンスを生成
    pub fn response(self) -> Response {
        match self {
            EventSource::ApiGateway => Response::api_gateway(),
            EventSource::AwsEvents => Response::aws_events(),
        }
    }
}

/// JSON値の真偽を評価
///
/// null、false、0、空文字、空配列、空オブジェクトを偽とし、それ以外を真とする。
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
