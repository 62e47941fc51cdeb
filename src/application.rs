// アプリケーション層モジュール
pub mod event_dispatcher;

// 再エクスポート
pub use event_dispatcher::{DispatchError, EventDispatcher, install_panic_hook};
