//! modloader-core
//!
//! AMD スタイルのモジュールローダー。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（module, config, events, request, state, ids, value）
//! - **resolve**: PathResolver（相対パス解決）と DependencyBuilder（依存順の決定）
//! - **registry**: ConfigParser（モジュール登録簿・名前写像）と UrlBuilder（リクエスト計画）
//! - **ports**: 抽象化レイヤー（ResourceFetcher, ModuleRegistrar, GlobalScope, EventBus）
//! - **impls**: ports のインメモリ実装（開発用・テスト用）
//! - **app**: Loader 本体（define / require）と LoaderBuilder
//! - **error**: エラー型

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod registry;
pub mod resolve;

pub use app::{BuildError, Loader, LoaderBuilder, RegistryCounts};
pub use domain::{LoaderConfig, ModuleDefinition, ModuleOptions, RequireRequest};
pub use error::{LoaderError, RequireFailure};
