/// Lambdaレスポンス
///
/// ホストプラットフォームへ返却するHTTP形式のレスポンスを表す。
/// 呼び出しごとに新しく生成され、呼び出しを越えて保持されることはない。
use serde::{Deserialize, Serialize};

/// API Gateway経由の呼び出しに対するボディ
pub const API_GATEWAY_BODY: &str = "Api Gateway";

/// API Gateway以外のトリガー（EventBridge等）に対するボディ
pub const AWS_EVENTS_BODY: &str = "AWS Events";

/// 想定外の失敗時のボディ
pub const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

/// ステータスコードと文字列ボディからなるレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// HTTPステータスコード
    pub status_code: u16,
    /// レスポンスボディ
    pub body: String,
}

impl Response {
    /// 新しいResponseを作成
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// API Gateway呼び出しへの200レスポンス
    pub fn api_gateway() -> Self {
        Self::new(200, API_GATEWAY_BODY)
    }

    /// その他のトリガーへの200レスポンス
    pub fn aws_events() -> Self {
        Self::new(200, AWS_EVENTS_BODY)
    }

    /// 想定外の失敗を表す500レスポンス
    pub fn internal_server_error() -> Self {
        Self::new(500, INTERNAL_SERVER_ERROR_BODY)
    }
}
