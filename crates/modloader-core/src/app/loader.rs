//! Loader - define / require のオーケストレーション
//!
//! # require パイプライン
//! 1. 名前を `maps` で写像
//! 2. DependencyBuilder で依存順の全リストを得る
//! 3. 未要求のモジュールを UrlBuilder でリクエストにまとめ、並行に fetch
//! 4. 全モジュールの登録（delivery）を待つ
//! 5. まだ登録されていない依存があれば再帰的に require
//! 6. 依存順にインスタンス化し、写像後の名前順で実装を返す
//!
//! 2〜6 はタイムアウトと競争します（`waitTimeout`、0 なら無効）。
//! 負けた側は中断せず放置するので、遅れて届いた定義も registry に入ります。
//!
//! # ロック
//! registry / delivery slot のロックは同期区間でのみ取り、`.await` を
//! またいで保持しません。ファクトリ呼び出しとイベント送出もロック外です。

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, try_join_all};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use super::builder::LoaderBuilder;
use super::delivery::DeliverySlot;
use crate::domain::{
    LoaderConfig, LoaderEvent, Module, ModuleDefinition, ModuleOptions, ModuleRequest, RequireId,
    RequireRequest, is_reserved,
};
use crate::error::{LoaderError, RequireFailure};
use crate::ports::{EventBus, GlobalScope, ModuleRegistrar, ResourceFetcher};
use crate::registry::{ConfigParser, UrlBuilder};
use crate::resolve::{DependencyBuilder, PathResolver};

/// Loader はモジュールローダーのハンドル
///
/// clone は安価で、clone 同士は同じ registry を共有します。
#[derive(Clone)]
pub struct Loader {
    pub(crate) inner: Arc<LoaderInner>,
}

pub(crate) struct LoaderInner {
    pub(crate) registry: Mutex<ConfigParser>,
    pub(crate) path_resolver: PathResolver,
    pub(crate) dependency_builder: DependencyBuilder,
    pub(crate) url_builder: UrlBuilder,
    pub(crate) fetcher: Arc<dyn ResourceFetcher>,
    pub(crate) globals: Arc<dyn GlobalScope>,
    pub(crate) events: Arc<dyn EventBus>,
    pub(crate) deliveries: Mutex<HashMap<String, DeliverySlot>>,
    /// インスタンス化パスを直列化
    pub(crate) instantiation: Mutex<()>,
}

impl Loader {
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::new()
    }

    pub(crate) fn from_parts(
        registry: ConfigParser,
        fetcher: Arc<dyn ResourceFetcher>,
        globals: Arc<dyn GlobalScope>,
        events: Arc<dyn EventBus>,
    ) -> Self {
        let path_resolver = PathResolver::new();
        Self {
            inner: Arc::new(LoaderInner {
                registry: Mutex::new(registry),
                path_resolver,
                dependency_builder: DependencyBuilder::new(path_resolver),
                url_builder: UrlBuilder::new(),
                fetcher,
                globals,
                events,
                deliveries: Mutex::new(HashMap::new()),
                instantiation: Mutex::new(()),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<LoaderInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<LoaderInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    // ========================================
    // Registry アクセス
    // ========================================

    /// モジュール記述を upsert（実装は登録しない）
    pub fn add_module(&self, options: ModuleOptions) -> Module {
        self.inner.registry.lock().add_module(options).clone()
    }

    /// registry のスナップショット
    pub fn modules(&self) -> HashMap<String, Module> {
        self.inner.registry.lock().modules().clone()
    }

    pub fn module(&self, name: &str) -> Option<Module> {
        self.inner.registry.lock().module(name).cloned()
    }

    /// 条件付きインデックス（trigger -> dependents）のスナップショット
    pub fn conditional_modules(&self) -> HashMap<String, Vec<String>> {
        self.inner.registry.lock().conditional_modules().clone()
    }

    pub fn config(&self) -> LoaderConfig {
        self.inner.registry.lock().config().clone()
    }

    pub fn map_module(&self, name: &str) -> String {
        self.inner.registry.lock().map_module(name)
    }

    /// `moduleRegister` / `scriptLoaded` を運ぶイベントバス
    pub fn events(&self) -> Arc<dyn EventBus> {
        Arc::clone(&self.inner.events)
    }

    // ========================================
    // define
    // ========================================

    /// define はモジュール定義を登録し、`moduleRegister` を送出
    ///
    /// 依存はモジュール名からの相対パスとして解決してから保存します。
    /// 無名・不完全な定義は無視され、`false` を返します。
    pub fn define(&self, definition: ModuleDefinition) -> bool {
        let Some(definition) = definition.normalize() else {
            debug!("ignoring anonymous or incomplete definition");
            return false;
        };

        let name = definition.name;
        let dependencies: Vec<String> = definition
            .dependencies
            .iter()
            .map(|dependency| self.inner.path_resolver.resolve(&name, dependency))
            .collect();

        let mut options = definition.options;
        options.name = name.clone();
        options.dependencies = Some(dependencies);
        options.pending_implementation = Some(definition.implementation);

        self.inner.registry.lock().add_module(options);
        self.mark_registered(&name);

        debug!(module = %name, "module registered");
        self.inner.events.emit(&LoaderEvent::ModuleRegister(name));
        true
    }

    // ========================================
    // require
    // ========================================

    /// require は要求モジュールとその依存を全てロード
    ///
    /// 写像後の名前の実装を要求順で返します。
    /// コールバックがあれば、戻る前に呼び出します。
    pub async fn require(&self, request: impl Into<RequireRequest>) -> Result<Vec<Value>, RequireFailure> {
        let (modules, on_success, on_failure) = request.into().into_parts();
        let outcome = self.require_modules(modules).await;
        match &outcome {
            Ok(implementations) => {
                if let Some(callback) = on_success {
                    callback(implementations.clone());
                }
            }
            Err(failure) => {
                if let Some(callback) = on_failure {
                    callback(failure.clone());
                }
            }
        }
        outcome
    }

    pub(crate) fn require_modules(&self, modules: Vec<String>) -> BoxFuture<'static, Result<Vec<Value>, RequireFailure>> {
        let loader = self.clone();
        let request_id = RequireId::generate();
        let span = info_span!("require", %request_id);

        async move {
            let mapped = loader.inner.registry.lock().map_modules(&modules);
            debug!(?modules, ?mapped, "require started");

            let resolution = {
                let mut registry = loader.inner.registry.lock();
                loader
                    .inner
                    .dependency_builder
                    .resolve_dependencies(&mut registry, &mapped)
            };
            let dependencies = match resolution {
                Ok(dependencies) => dependencies,
                Err(error) => {
                    warn!(%error, "dependency resolution failed");
                    return Err(loader.failure(error, Vec::new(), mapped, modules));
                }
            };

            let pipeline = loader.load_modules(dependencies.clone());
            let wait_timeout = loader.inner.registry.lock().config().wait_timeout();
            let outcome = match wait_timeout {
                Some(limit) => tokio::time::timeout(limit, pipeline)
                    .await
                    .unwrap_or_else(|_| Err(LoaderError::Timeout(modules.clone()))),
                None => pipeline.await,
            };

            match outcome {
                Ok(()) => {
                    info!(modules = ?mapped, "require fulfilled");
                    Ok(loader.implementations(&mapped))
                }
                Err(error) => {
                    warn!(%error, "require failed");
                    Err(loader.failure(error, dependencies, mapped, modules))
                }
            }
        }
        .instrument(span)
        .boxed()
    }

    /// 未要求のモジュールを fetch し、`names` 全体の delivery を待つ
    ///
    /// delivery slot は fetch 開始前に開く。fetch 中に届く
    /// `moduleRegister` / `scriptLoaded` を取りこぼさないため。
    fn load_modules(&self, names: Vec<String>) -> BoxFuture<'static, Result<(), LoaderError>> {
        let loader = self.clone();
        async move {
            let waits: Vec<_> = names.iter().map(|name| loader.wait_for_module(name)).collect();

            let requests = {
                let mut registry = loader.inner.registry.lock();
                let not_requested: Vec<String> = names
                    .iter()
                    .filter(|name| !is_reserved(name))
                    .filter(|name| !registry.module(name).is_some_and(|module| module.requested))
                    .cloned()
                    .collect();
                if not_requested.is_empty() {
                    Vec::new()
                } else {
                    loader.inner.url_builder.build(&mut registry, &not_requested)
                }
            };

            if !requests.is_empty() {
                let fetches = requests.into_iter().map(|request| {
                    let url = request.url.clone();
                    let modules = request.modules.clone();
                    let handle = loader.spawn_fetch(request);
                    async move {
                        handle.await.unwrap_or_else(|join_error| {
                            Err(LoaderError::Fetch {
                                url,
                                modules,
                                reason: join_error.to_string(),
                            })
                        })
                    }
                });
                try_join_all(fetches).await?;
            }

            loader.wait_for_modules(names, waits).await
        }
        .boxed()
    }

    /// fetch は spawn して切り離す（タイムアウトで負けても中断されない）
    fn spawn_fetch(&self, request: ModuleRequest) -> JoinHandle<Result<(), LoaderError>> {
        let loader = self.clone();
        tokio::spawn(async move {
            debug!(url = %request.url, modules = ?request.modules, "fetching resource");
            let fetcher = Arc::clone(&loader.inner.fetcher);
            match fetcher.load_resource(&request.url, &loader).await {
                Ok(()) => {
                    loader
                        .inner
                        .events
                        .emit(&LoaderEvent::ScriptLoaded(request.modules));
                    Ok(())
                }
                Err(error) => {
                    warn!(url = %request.url, %error, "resource fetch failed");
                    Err(LoaderError::Fetch {
                        url: request.url,
                        modules: request.modules,
                        reason: error.to_string(),
                    })
                }
            }
        })
    }

    /// delivery を待ち、足りない依存を再帰的に require してから
    /// 依存順にインスタンス化する
    fn wait_for_modules(
        &self,
        names: Vec<String>,
        waits: Vec<BoxFuture<'static, Result<(), LoaderError>>>,
    ) -> BoxFuture<'static, Result<(), LoaderError>> {
        let loader = self.clone();
        async move {
            try_join_all(waits).await?;

            let missing = loader.missing_dependencies(&names);
            if !missing.is_empty() {
                debug!(?missing, "requiring missing dependencies");
                loader
                    .require_modules(missing)
                    .await
                    .map_err(|failure| failure.error)?;
            }

            loader.set_module_implementations(&names);
            Ok(())
        }
        .boxed()
    }

    /// `names` の依存（写像後）のうち、まだ定義が登録されていないもの
    fn missing_dependencies(&self, names: &[String]) -> Vec<String> {
        let registry = self.inner.registry.lock();
        let mut missing: Vec<String> = Vec::new();
        for name in names {
            let Some(module) = registry.module(name) else {
                continue;
            };
            for dependency in registry.map_modules(&module.dependencies) {
                if is_reserved(&dependency) {
                    continue;
                }
                let delivered = registry
                    .module(&dependency)
                    .is_some_and(|module| module.pending_implementation.is_some());
                if !delivered && !missing.contains(&dependency) {
                    missing.push(dependency);
                }
            }
        }
        missing
    }

    fn implementations(&self, names: &[String]) -> Vec<Value> {
        let registry = self.inner.registry.lock();
        names
            .iter()
            .map(|name| {
                registry
                    .module(name)
                    .and_then(|module| module.implementation.clone())
                    .unwrap_or(Value::Null)
            })
            .collect()
    }

    fn failure(
        &self,
        error: LoaderError,
        dependencies: Vec<String>,
        mapped_modules: Vec<String>,
        modules: Vec<String>,
    ) -> RequireFailure {
        let registry = self.inner.registry.lock();
        let missing_dependencies = dependencies
            .iter()
            .filter(|name| registry.module(name).is_none_or(|module| !module.is_implemented()))
            .cloned()
            .collect();
        RequireFailure {
            error,
            dependencies,
            mapped_modules,
            missing_dependencies,
            modules,
        }
    }
}

impl ModuleRegistrar for Loader {
    fn define(&self, definition: ModuleDefinition) -> bool {
        Loader::define(self, definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Condition, ConditionTest, DEFAULT_WAIT_TIMEOUT_MS, ModuleMaps, PendingImplementation,
    };
    use crate::impls::{InMemoryGlobals, ScriptedFetcher};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn loader_with(config: LoaderConfig, fetcher: &Arc<ScriptedFetcher>) -> Loader {
        Loader::builder()
            .config(config)
            .fetcher(Arc::clone(fetcher) as Arc<dyn ResourceFetcher>)
            .build()
            .unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_require_loads_dependency_chain() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("a.js", |registrar| {
            registrar.define(ModuleDefinition::new(
                "a",
                ["b"],
                PendingImplementation::factory(|args| json!({ "fromB": args[0]["value"].clone() })),
            ));
        });
        fetcher.serve("b.js", |registrar| {
            registrar.define(ModuleDefinition::new(
                "b",
                ["exports"],
                PendingImplementation::factory(|args| {
                    args[0]["value"] = json!(1);
                    Value::Null
                }),
            ));
        });
        let loader = loader_with(LoaderConfig::default(), &fetcher);

        let implementations = loader.require("a").await.unwrap();

        assert_eq!(implementations, vec![json!({ "fromB": 1 })]);
        assert_eq!(fetcher.requested_urls(), vec!["a.js", "b.js"]);
        assert_eq!(loader.module("b").unwrap().implementation, Some(json!({ "value": 1 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_require_times_out_and_late_definition_still_lands() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.hang("slow.js");
        let loader = loader_with(LoaderConfig::default().with_wait_timeout(50), &fetcher);

        let started = tokio::time::Instant::now();
        let failure = loader.require("slow").await.unwrap_err();

        assert_eq!(failure.error, LoaderError::Timeout(names(&["slow"])));
        assert_eq!(failure.to_string(), "Load timeout for modules: slow");
        assert_eq!(failure.dependencies, names(&["slow"]));
        assert_eq!(failure.missing_dependencies, names(&["slow"]));
        assert!(started.elapsed() >= Duration::from_millis(50));

        loader.define(ModuleDefinition::named("slow", json!("late")));
        let implementations = loader.require("slow").await.unwrap();

        assert_eq!(implementations, vec![json!("late")]);
        assert_eq!(fetcher.request_count("slow.js"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_wait_timeout_disables_the_race() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve_after("a.js", Duration::from_secs(60), |registrar| {
            registrar.define(ModuleDefinition::named("a", json!("a")));
        });
        let loader = loader_with(LoaderConfig::default().with_wait_timeout(0), &fetcher);

        let implementations = loader.require("a").await.unwrap();

        assert_eq!(implementations, vec![json!("a")]);
    }

    #[tokio::test]
    async fn test_combined_request_delivers_every_module() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("/combo?mods/a.js&mods/b.js", |registrar| {
            registrar.define(ModuleDefinition::named("a", json!("a")));
            registrar.define(ModuleDefinition::named("b", json!("b")));
        });
        let config = LoaderConfig::default()
            .with_url("/combo?")
            .with_base_path("mods")
            .with_combine(true);
        let loader = loader_with(config, &fetcher);

        let implementations = loader.require(["a", "b"]).await.unwrap();

        assert_eq!(implementations, vec![json!("a"), json!("b")]);
        assert_eq!(fetcher.requested_urls(), vec!["/combo?mods/a.js&mods/b.js"]);
    }

    #[tokio::test]
    async fn test_cycle_fails_before_any_fetch() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let loader = loader_with(LoaderConfig::default(), &fetcher);
        loader.add_module(ModuleOptions::named("a").with_dependencies(["b"]));
        loader.add_module(ModuleOptions::named("b").with_dependencies(["a"]));

        let failure = loader.require("a").await.unwrap_err();

        assert!(matches!(failure.error, LoaderError::Cycle(_)));
        assert!(failure.dependencies.is_empty());
        assert_eq!(failure.modules, names(&["a"]));
        assert!(fetcher.requested_urls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let loader = loader_with(LoaderConfig::default(), &fetcher);

        let failure = loader.require("missing").await.unwrap_err();

        assert!(matches!(
            failure.error,
            LoaderError::Fetch { ref url, ref modules, .. }
                if url == "missing.js" && *modules == names(&["missing"])
        ));
        assert_eq!(failure.missing_dependencies, names(&["missing"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_legacy_module_without_global_fails() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("jquery.js", |_| {});
        let loader = loader_with(LoaderConfig::default(), &fetcher);
        loader.add_module(ModuleOptions::named("jquery").with_exports("$"));

        let started = tokio::time::Instant::now();
        let failure = loader.require("jquery").await.unwrap_err();

        assert_eq!(
            failure.error,
            LoaderError::MissingExport {
                module: "jquery".into(),
                exports: "$".into()
            }
        );
        assert_eq!(
            failure.to_string(),
            "Module jquery does not export the specified value: $"
        );
        assert!(started.elapsed() < Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS));
    }

    #[tokio::test(start_paused = true)]
    async fn test_legacy_module_without_global_fails_after_slow_fetch() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve_after("jquery.js", Duration::from_millis(20), |_| {});
        let loader = loader_with(LoaderConfig::default().with_wait_timeout(1000), &fetcher);
        loader.add_module(ModuleOptions::named("jquery").with_exports("$"));

        let failure = loader.require("jquery").await.unwrap_err();

        assert!(matches!(failure.error, LoaderError::MissingExport { .. }));
        assert_eq!(failure.missing_dependencies, names(&["jquery"]));
    }

    #[tokio::test]
    async fn test_panicking_fetch_keeps_request_details() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("a.js", |_| panic!("script crashed"));
        let loader = loader_with(LoaderConfig::default(), &fetcher);

        let failure = loader.require("a").await.unwrap_err();

        assert!(matches!(
            failure.error,
            LoaderError::Fetch { ref url, ref modules, .. }
                if url == "a.js" && *modules == names(&["a"])
        ));
    }

    #[tokio::test]
    async fn test_legacy_module_resolves_to_its_global() {
        let globals = Arc::new(InMemoryGlobals::new());
        let fetcher = Arc::new(ScriptedFetcher::new());
        let published = Arc::clone(&globals);
        fetcher.serve("jquery.js", move |_| {
            published.set("$", json!({ "version": "2.1" }));
        });
        let loader = Loader::builder()
            .fetcher(Arc::clone(&fetcher) as Arc<dyn ResourceFetcher>)
            .globals(globals)
            .build()
            .unwrap();
        loader.add_module(ModuleOptions::named("jquery").with_exports("$"));

        let implementations = loader.require("jquery").await.unwrap();

        assert_eq!(implementations, vec![json!({ "version": "2.1" })]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requires_share_fetch_and_instantiation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve_after("a.js", Duration::from_millis(10), move |registrar| {
            let counter = Arc::clone(&counter);
            registrar.define(ModuleDefinition::new(
                "a",
                Vec::<String>::new(),
                PendingImplementation::factory(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    json!("a")
                }),
            ));
        });
        let loader = loader_with(LoaderConfig::default(), &fetcher);

        let (first, second) = tokio::join!(loader.require("a"), loader.require("a"));

        assert_eq!(first.unwrap(), vec![json!("a")]);
        assert_eq!(second.unwrap(), vec![json!("a")]);
        assert_eq!(fetcher.request_count("a.js"), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_conditional_module_follows_its_trigger() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("a.js", |registrar| {
            registrar.define(ModuleDefinition::named("a", json!("a")));
        });
        fetcher.serve("a-patch.js", |registrar| {
            registrar.define(ModuleDefinition::named("a-patch", json!("patch")));
        });
        let loader = loader_with(LoaderConfig::default(), &fetcher);
        loader.add_module(
            ModuleOptions::named("a-patch")
                .with_condition(Condition::new("a", ConditionTest::predicate(|| true))),
        );

        let implementations = loader.require("a").await.unwrap();

        assert_eq!(implementations, vec![json!("a")]);
        assert_eq!(fetcher.request_count("a-patch.js"), 1);
        assert!(loader.module("a-patch").unwrap().is_implemented());
    }

    #[tokio::test]
    async fn test_maps_rename_requested_modules() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("jquery-2.js", |registrar| {
            registrar.define(ModuleDefinition::named("jquery-2", json!("jq2")));
        });
        let config = LoaderConfig::default().with_maps(ModuleMaps::new().with_rule("jquery", "jquery-2"));
        let loader = loader_with(config, &fetcher);

        let implementations = loader.require("jquery").await.unwrap();

        assert_eq!(implementations, vec![json!("jq2")]);
    }

    #[tokio::test]
    async fn test_callbacks_receive_outcome() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("a.js", |registrar| {
            registrar.define(ModuleDefinition::named("a", json!("a")));
        });
        let loader = loader_with(LoaderConfig::default(), &fetcher);
        let received = Arc::new(Mutex::new(None));
        let failed = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&received);
        let request = RequireRequest::new(["a"]).on_success(move |values| {
            *sink.lock() = Some(values);
        });
        loader.require(request).await.unwrap();

        let sink = Arc::clone(&failed);
        let request = RequireRequest::new(["b"]).on_failure(move |failure| {
            *sink.lock() = Some(failure.modules);
        });
        loader.require(request).await.unwrap_err();

        assert_eq!(*received.lock(), Some(vec![json!("a")]));
        assert_eq!(*failed.lock(), Some(names(&["b"])));
    }

    #[test]
    fn test_define_resolves_relative_dependencies() {
        let loader = loader_with(LoaderConfig::default(), &Arc::new(ScriptedFetcher::new()));

        assert!(loader.define(ModuleDefinition::new("pkg/a", ["./b", "../c", "exports"], json!(1))));

        assert_eq!(
            loader.module("pkg/a").unwrap().dependencies,
            names(&["pkg/b", "c", "exports"])
        );
    }

    #[test]
    fn test_anonymous_definition_is_ignored() {
        let loader = loader_with(LoaderConfig::default(), &Arc::new(ScriptedFetcher::new()));

        assert!(!loader.define(ModuleDefinition::anonymous(["b"], json!(1))));
        assert!(loader.modules().is_empty());
    }

    #[tokio::test]
    async fn test_notifications_are_emitted() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.serve("a.js", |registrar| {
            registrar.define(ModuleDefinition::named("a", json!("a")));
        });
        let loader = loader_with(LoaderConfig::default(), &fetcher);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        loader.events().on(Arc::new(move |event: &LoaderEvent| {
            sink.lock().push(event.clone());
            crate::ports::Listen::Keep
        }));

        loader.require("a").await.unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                LoaderEvent::ModuleRegister("a".into()),
                LoaderEvent::ScriptLoaded(names(&["a"])),
            ]
        );
    }
}
