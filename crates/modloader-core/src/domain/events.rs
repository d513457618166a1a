//! Notifications published on the loader's event bus.

use serde::Serialize;

/// LoaderEvent は EventBus に流れるイベント
///
/// - `ModuleRegister`: `define` がモジュールを登録した直後
/// - `ScriptLoaded`: 1 回の fetch が完了し、その中のコードが実行された後
///   （そのリクエストに含まれていたモジュール名の一覧を持つ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum LoaderEvent {
    ModuleRegister(String),
    ScriptLoaded(Vec<String>),
}

impl LoaderEvent {
    /// Does this event announce `name`?
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            LoaderEvent::ModuleRegister(registered) => registered == name,
            LoaderEvent::ScriptLoaded(modules) => modules.iter().any(|m| m == name),
        }
    }
}
