//! UrlBuilder - モジュールをネットワークリクエストにまとめる

use super::config_parser::ConfigParser;
use crate::domain::ModuleRequest;

const URL_PREFIXES: [&str; 4] = ["http://", "https://", "//", "www."];

fn looks_like_url(path: &str) -> bool {
    URL_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// 結合リクエスト 1 つ分のパス
#[derive(Debug, Default)]
struct Bucket {
    modules: Vec<String>,
    paths: Vec<String>,
}

impl Bucket {
    fn push(&mut self, module: &str, path: String) {
        self.modules.push(module.to_string());
        self.paths.push(path);
    }
}

/// UrlBuilder は設定が許す最小のリクエスト集合を作る
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlBuilder;

impl UrlBuilder {
    pub fn new() -> Self {
        Self
    }

    /// `names` のリクエストを作り、全モジュールを requested にする
    ///
    /// # 出力順
    /// 1. 単独リクエスト（出現順）
    /// 2. ルート相対の結合リクエスト
    /// 3. basePath 相対の結合リクエスト
    pub fn build(&self, parser: &mut ConfigParser, names: &[String]) -> Vec<ModuleRequest> {
        let base_path = parser.config().normalized_base_path();
        let url = parser.config().url.clone();
        let combine = parser.config().combine;

        let mut requests = Vec::new();
        let mut root_bucket = Bucket::default();
        let mut base_bucket = Bucket::default();

        for name in names {
            let module = parser.ensure_module(name);
            module.requested = true;
            let full_path = module.full_path.clone();
            let raw_path = module.path.clone().unwrap_or_else(|| name.clone());

            if let Some(full_path) = full_path {
                requests.push(ModuleRequest::new(vec![name.clone()], full_path));
                continue;
            }

            let path = module_path(&parser.config().paths, &raw_path);
            let absolute = path.starts_with('/');

            if looks_like_url(&path) {
                requests.push(ModuleRequest::new(vec![name.clone()], path));
            } else if combine && absolute {
                root_bucket.push(name, path);
            } else if combine {
                base_bucket.push(name, path);
            } else {
                let prefix = if absolute { "" } else { base_path.as_str() };
                requests.push(ModuleRequest::new(vec![name.clone()], format!("{url}{prefix}{path}")));
            }
        }

        if !root_bucket.paths.is_empty() {
            let combined = format!("{url}{}", root_bucket.paths.join("&"));
            requests.push(ModuleRequest::new(root_bucket.modules, combined));
        }
        if !base_bucket.paths.is_empty() {
            let separator = format!("&{base_path}");
            let combined = format!("{url}{base_path}{}", base_bucket.paths.join(&separator));
            requests.push(ModuleRequest::new(base_bucket.modules, combined));
        }

        requests
    }
}

/// 最初に一致した path エイリアスと `.js` 拡張子を適用
fn module_path(aliases: &[(String, String)], raw_path: &str) -> String {
    let mut path = raw_path.to_string();
    for (prefix, replacement) in aliases {
        if let Some(rest) = raw_path.strip_prefix(prefix.as_str())
            && (rest.is_empty() || rest.starts_with('/'))
        {
            path = format!("{replacement}{rest}");
            break;
        }
    }
    if !looks_like_url(&path) && !path.ends_with(".js") {
        path.push_str(".js");
    }
    path
}
