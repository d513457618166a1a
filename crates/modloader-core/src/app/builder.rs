//! LoaderBuilder - ローダーの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンで ports の実装を差し込む
//! - 起動時検証（Fail-fast 設計）

use std::sync::Arc;

use super::loader::Loader;
use crate::domain::LoaderConfig;
use crate::impls::{InMemoryEventBus, NoGlobals};
use crate::ports::{EventBus, GlobalScope, ResourceFetcher};
use crate::registry::ConfigParser;

/// LoaderBuilder は Loader を構築
///
/// # 使用例
/// ```ignore
/// let loader = LoaderBuilder::new()
///     .config(LoaderConfig::from_path("loader.json")?)
///     .fetcher(Arc::new(ScriptedFetcher::new()))
///     .expect_modules(&["aui-core"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - fetcher は必須（未設定なら BuildError::MissingFetcher）
/// - expect_modules() で設定ファイルに宣言されているべきモジュールを指定
/// - build() 時に「期待集合 ⊆ 宣言済み集合」をチェック
pub struct LoaderBuilder {
    config: LoaderConfig,
    fetcher: Option<Arc<dyn ResourceFetcher>>,
    globals: Option<Arc<dyn GlobalScope>>,
    events: Option<Arc<dyn EventBus>>,
    expected_modules: Option<Vec<String>>,
}

/// BuildError はローダー構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no resource fetcher configured")]
    MissingFetcher,

    #[error("Missing modules: {0:?}. These modules were expected in the configuration but not declared.")]
    MissingModules(Vec<String>),
}

impl LoaderBuilder {
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
            fetcher: None,
            globals: None,
            events: None,
            expected_modules: None,
        }
    }

    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// 省略時は `NoGlobals`
    pub fn globals(mut self, globals: Arc<dyn GlobalScope>) -> Self {
        self.globals = Some(globals);
        self
    }

    /// 省略時は `InMemoryEventBus`
    pub fn events(mut self, events: Arc<dyn EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn expect_modules(mut self, names: &[&str]) -> Self {
        self.expected_modules = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    /// # 検証
    /// - fetcher が設定されているか
    /// - expect_modules() のモジュールが設定の `modules` に全て宣言されているか
    pub fn build(self) -> Result<Loader, BuildError> {
        let fetcher = self.fetcher.ok_or(BuildError::MissingFetcher)?;
        let registry = ConfigParser::new(self.config);

        if let Some(expected_modules) = &self.expected_modules {
            let missing_modules: Vec<String> = expected_modules
                .iter()
                .filter(|name| registry.module(name).is_none())
                .cloned()
                .collect();
            if !missing_modules.is_empty() {
                return Err(BuildError::MissingModules(missing_modules));
            }
        }

        let globals = self.globals.unwrap_or_else(|| Arc::new(NoGlobals));
        let events = self
            .events
            .unwrap_or_else(|| Arc::new(InMemoryEventBus::new()));

        Ok(Loader::from_parts(registry, fetcher, globals, events))
    }
}

impl Default for LoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
