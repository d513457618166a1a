//! ScriptedFetcher - 開発・テスト用の ResourceFetcher
//!
//! URL ごとに「取得したら何が起きるか」を登録しておきます。
//!
//! - `serve`: 取得後にスクリプト（`define` を呼ぶクロージャ）を実行
//! - `fail`: 取得エラー
//! - `hang`: 永遠に応答しない（タイムアウトの検証用）
//!
//! 登録のない URL は `FetchError::NotFound` になります。
//! 実際に要求された URL は順番に記録されます。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::ports::{FetchError, ModuleRegistrar, ResourceFetcher};

/// Code "contained" in a resource.
pub type Script = Arc<dyn Fn(&dyn ModuleRegistrar) + Send + Sync>;

#[derive(Clone)]
enum Response {
    Script(Script),
    Fail(String),
    Hang,
}

#[derive(Clone)]
struct Route {
    response: Response,
    delay: Option<Duration>,
}

#[derive(Default)]
pub struct ScriptedFetcher {
    routes: RwLock<HashMap<String, Route>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve<F>(&self, url: impl Into<String>, script: F) -> &Self
    where
        F: Fn(&dyn ModuleRegistrar) + Send + Sync + 'static,
    {
        self.route(url, Response::Script(Arc::new(script)), None)
    }

    /// Like [`ScriptedFetcher::serve`], answering only after `delay`.
    pub fn serve_after<F>(&self, url: impl Into<String>, delay: Duration, script: F) -> &Self
    where
        F: Fn(&dyn ModuleRegistrar) + Send + Sync + 'static,
    {
        self.route(url, Response::Script(Arc::new(script)), Some(delay))
    }

    pub fn fail(&self, url: impl Into<String>, reason: impl Into<String>) -> &Self {
        self.route(url, Response::Fail(reason.into()), None)
    }

    pub fn hang(&self, url: impl Into<String>) -> &Self {
        self.route(url, Response::Hang, None)
    }

    /// URLs in the order they were requested.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requested.lock().iter().filter(|u| *u == url).count()
    }

    fn route(&self, url: impl Into<String>, response: Response, delay: Option<Duration>) -> &Self {
        self.routes.write().insert(url.into(), Route { response, delay });
        self
    }
}

#[async_trait]
impl ResourceFetcher for ScriptedFetcher {
    async fn load_resource(&self, url: &str, registrar: &dyn ModuleRegistrar) -> Result<(), FetchError> {
        self.requested.lock().push(url.to_string());
        let route = self.routes.read().get(url).cloned();
        let Some(route) = route else {
            return Err(FetchError::NotFound(url.to_string()));
        };

        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }

        match route.response {
            Response::Script(script) => {
                debug!(%url, "running scripted resource");
                script(registrar);
                Ok(())
            }
            Response::Fail(reason) => Err(FetchError::Transport(reason)),
            Response::Hang => {
                futures::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}
