//! Delivery - モジュール定義の到着待ち
//!
//! モジュール名ごとに slot を 1 つ持ち、並行する待ち手全員で共有します。
//! slot は `Delivered` か、一度だけ確定する watch channel のどちらか。
//! 成功すると `Delivered` に置き換わり、失敗は channel に残るので
//! 後から来た待ち手も同じエラーを受け取ります。

use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use super::loader::Loader;
use crate::domain::{LoaderEvent, is_truthy};
use crate::error::LoaderError;
use crate::ports::Listen;

type Settlement = Option<Result<(), LoaderError>>;

pub(crate) enum DeliverySlot {
    Delivered,
    Pending(watch::Sender<Settlement>),
}

impl Loader {
    /// `name` が delivery されたら完了する Future を返す
    ///
    /// - `exports` 付きモジュール: グローバル値が見えた時点（即時、または自分を含む `scriptLoaded` の後）
    /// - それ以外: 自分の `moduleRegister` 通知
    ///
    /// slot はこの呼び出しの時点で開きます（Future を poll する前）。
    pub(crate) fn wait_for_module(&self, name: &str) -> BoxFuture<'static, Result<(), LoaderError>> {
        let mut receiver = {
            let mut slots = self.inner.deliveries.lock();
            match slots.get(name) {
                Some(DeliverySlot::Delivered) => return future::ready(Ok(())).boxed(),
                Some(DeliverySlot::Pending(sender)) => sender.subscribe(),
                None => match self.open_slot(name) {
                    Some(sender) => {
                        let receiver = sender.subscribe();
                        slots.insert(name.to_string(), DeliverySlot::Pending(sender));
                        receiver
                    }
                    None => {
                        slots.insert(name.to_string(), DeliverySlot::Delivered);
                        return future::ready(Ok(())).boxed();
                    }
                },
            }
        };

        let name = name.to_string();
        async move {
            let settlement = match receiver.wait_for(Option::is_some).await {
                Ok(settled) => settled.clone(),
                Err(_) => None,
            };
            settlement.unwrap_or_else(|| Err(LoaderError::Abandoned(name)))
        }
        .boxed()
    }

    /// `name` の定義を記録。待ち手は続く `moduleRegister` 通知で確定します。
    pub(crate) fn mark_registered(&self, name: &str) {
        self.inner
            .deliveries
            .lock()
            .entry(name.to_string())
            .or_insert(DeliverySlot::Delivered);
    }

    /// レガシーモジュールが公開したグローバル値（存在し truthy な場合のみ）
    pub(crate) fn exported_value(&self, key: &str) -> Option<Value> {
        self.inner.globals.lookup_global(key).filter(is_truthy)
    }

    /// `name` の slot を確定させるリスナーを登録
    ///
    /// 既に delivery 済みなら `None`。slot map をロックした状態で呼ばれるので、
    /// slot ができる前に確定が割り込むことはありません。
    fn open_slot(&self, name: &str) -> Option<watch::Sender<Settlement>> {
        let exports = self
            .inner
            .registry
            .lock()
            .module(name)
            .and_then(|module| module.exports.clone());

        if let Some(key) = &exports
            && self.exported_value(key).is_some()
        {
            return None;
        }

        let (sender, _) = watch::channel(None);
        let loader = self.downgrade();
        let module = name.to_string();

        match exports {
            Some(key) => {
                self.inner.events.on(Arc::new(move |event: &LoaderEvent| {
                    if !matches!(event, LoaderEvent::ScriptLoaded(_)) || !event.mentions(&module) {
                        return Listen::Keep;
                    }
                    if let Some(loader) = Loader::upgrade(&loader) {
                        let result = match loader.exported_value(&key) {
                            Some(_) => Ok(()),
                            None => Err(LoaderError::MissingExport {
                                module: module.clone(),
                                exports: key.clone(),
                            }),
                        };
                        loader.settle(&module, result);
                    }
                    Listen::Detach
                }));
            }
            None => {
                self.inner.events.on(Arc::new(move |event: &LoaderEvent| {
                    if !matches!(event, LoaderEvent::ModuleRegister(_)) || !event.mentions(&module) {
                        return Listen::Keep;
                    }
                    if let Some(loader) = Loader::upgrade(&loader) {
                        loader.settle(&module, Ok(()));
                    }
                    Listen::Detach
                }));
            }
        }

        Some(sender)
    }

    fn settle(&self, name: &str, result: Result<(), LoaderError>) {
        debug!(module = %name, ok = result.is_ok(), "delivery settled");
        let mut slots = self.inner.deliveries.lock();
        if let Some(DeliverySlot::Pending(sender)) = slots.get(name) {
            sender.send_replace(Some(result.clone()));
        }
        if result.is_ok() {
            slots.insert(name.to_string(), DeliverySlot::Delivered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModuleDefinition, ModuleOptions};
    use crate::impls::{InMemoryGlobals, ScriptedFetcher};
    use serde_json::json;
    use std::time::Duration;

    fn loader_with_globals(globals: Arc<InMemoryGlobals>) -> Loader {
        Loader::builder()
            .fetcher(Arc::new(ScriptedFetcher::new()))
            .globals(globals)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn defined_module_is_delivered_immediately() {
        let loader = loader_with_globals(Arc::new(InMemoryGlobals::new()));
        loader.define(ModuleDefinition::named("a", json!(1)));

        loader.wait_for_module("a").await.unwrap();
    }

    #[tokio::test]
    async fn waiters_share_one_slot_and_settle_on_register() {
        let loader = loader_with_globals(Arc::new(InMemoryGlobals::new()));

        let first = loader.wait_for_module("a");
        let second = loader.wait_for_module("a");

        loader.define(ModuleDefinition::named("a", json!(1)));

        first.await.unwrap();
        second.await.unwrap();
        assert!(matches!(
            loader.inner.deliveries.lock().get("a"),
            Some(DeliverySlot::Delivered)
        ));
    }

    #[tokio::test]
    async fn present_global_delivers_without_waiting() {
        let globals = Arc::new(InMemoryGlobals::new());
        globals.set("$", json!({ "jquery": true }));
        let loader = loader_with_globals(Arc::clone(&globals));
        loader.add_module(ModuleOptions::named("jquery").with_exports("$"));

        loader.wait_for_module("jquery").await.unwrap();
    }

    #[tokio::test]
    async fn missing_global_after_script_loaded_is_an_error() {
        let loader = loader_with_globals(Arc::new(InMemoryGlobals::new()));
        loader.add_module(ModuleOptions::named("jquery").with_exports("$"));

        let waiting = loader.wait_for_module("jquery");
        loader
            .inner
            .events
            .emit(&LoaderEvent::ScriptLoaded(vec!["jquery".into()]));

        let err = waiting.await.unwrap_err();
        assert_eq!(
            err,
            LoaderError::MissingExport {
                module: "jquery".into(),
                exports: "$".into()
            }
        );

        // the failure is memoized
        let again = loader.wait_for_module("jquery").await.unwrap_err();
        assert_eq!(again, err);
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_notifications_do_not_settle() {
        let loader = loader_with_globals(Arc::new(InMemoryGlobals::new()));
        let waiting = loader.wait_for_module("a");

        loader.define(ModuleDefinition::named("b", json!(1)));
        loader
            .inner
            .events
            .emit(&LoaderEvent::ScriptLoaded(vec!["a".into()]));

        let outcome = tokio::time::timeout(Duration::from_secs(1), waiting).await;
        assert!(outcome.is_err());
    }
}
