//! Ports - ローダーが外部に依存する部分の抽象化
//!
//! ローダー本体はネットワークやグローバル名前空間を直接触りません。
//! 各 trait が境界を定義し、`impls` にインメモリ実装があります。
//!
//! - **ResourceFetcher**: URL を取得し、中のコードを実行する（非同期）
//! - **ModuleRegistrar**: 取得されたコードが `define` を呼ぶための窓口
//! - **GlobalScope**: `exports` 指定のレガシーモジュール用の値参照
//! - **EventBus**: `moduleRegister` / `scriptLoaded` 通知

pub mod event_bus;
pub mod global_scope;
pub mod registrar;
pub mod resource_fetcher;

pub use self::event_bus::{EventBus, Listen, Listener};
pub use self::global_scope::GlobalScope;
pub use self::registrar::ModuleRegistrar;
pub use self::resource_fetcher::{FetchError, ResourceFetcher};
