//! InMemoryEventBus - プロセス内の EventBus
//!
//! # 実装詳細
//! - 購読者は登録順の Vec で保持
//! - `emit` はロック中にスナップショットを取り、ロック外でリスナーを呼ぶ
//!   （リスナーの中から `on` / `off` / `emit` を呼んでもデッドロックしない）
//! - `Listen::Detach` を返したリスナーは配送後に取り除く

use parking_lot::Mutex;

use crate::domain::{ListenerId, LoaderEvent};
use crate::ports::{EventBus, Listen, Listener};

#[derive(Default)]
pub struct InMemoryEventBus {
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl EventBus for InMemoryEventBus {
    fn on(&self, listener: Listener) -> ListenerId {
        let id = ListenerId::generate();
        self.listeners.lock().push((id, listener));
        id
    }

    fn off(&self, id: ListenerId) {
        self.listeners.lock().retain(|(registered, _)| *registered != id);
    }

    fn emit(&self, event: &LoaderEvent) {
        let snapshot: Vec<(ListenerId, Listener)> = self.listeners.lock().clone();

        let detached: Vec<ListenerId> = snapshot
            .into_iter()
            .filter_map(|(id, listener)| (listener(event) == Listen::Detach).then_some(id))
            .collect();

        if !detached.is_empty() {
            self.listeners.lock().retain(|(id, _)| !detached.contains(id));
        }
    }
}
