//! Impls - ports のインメモリ実装（開発用・テスト用）
//!
//! - **InMemoryEventBus**: プロセス内 publish/subscribe
//! - **InMemoryGlobals** / **NoGlobals**: グローバル名前空間
//! - **ScriptedFetcher**: URL ごとに応答を決めておける ResourceFetcher

pub mod event_bus;
pub mod globals;
pub mod scripted_fetch;

pub use self::event_bus::InMemoryEventBus;
pub use self::globals::{InMemoryGlobals, NoGlobals};
pub use self::scripted_fetch::{Script, ScriptedFetcher};
