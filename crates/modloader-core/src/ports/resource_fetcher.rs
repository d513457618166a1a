//! ResourceFetcher port - リソース取得
//!
//! 取得したリソースのコードは `registrar` を通じて自分自身を登録します。
//! Future が完了した時点で、そのコードの実行も終わっている必要があります。

use async_trait::async_trait;
use thiserror::Error;

use super::registrar::ModuleRegistrar;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Loads one resource and runs the code it contains.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn load_resource(&self, url: &str, registrar: &dyn ModuleRegistrar) -> Result<(), FetchError>;
}
