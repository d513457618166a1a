//! EventBus port - 通知の publish/subscribe
//!
//! `emit` は emit 時点の購読者に、登録順に同期的に配送します。

use std::sync::Arc;

use crate::domain::{ListenerId, LoaderEvent};

/// What a listener wants after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listen {
    Keep,
    Detach,
}

pub type Listener = Arc<dyn Fn(&LoaderEvent) -> Listen + Send + Sync>;

pub trait EventBus: Send + Sync {
    fn on(&self, listener: Listener) -> ListenerId;

    fn off(&self, id: ListenerId);

    fn emit(&self, event: &LoaderEvent);
}
