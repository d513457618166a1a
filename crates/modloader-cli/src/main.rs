//! modloader CLI - 設定ファイルとモジュール名を受け取り、require の結果を JSON で出力
//!
//! ネットワークの代わりに DemoFetcher（プロセス内のデモモジュール集）を使います。
//!
//! ```text
//! RUST_LOG=modloader_core=debug modloader-cli --config loader.json aui-dialog
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use modloader_core::domain::PendingImplementation;
use modloader_core::ports::{FetchError, ModuleRegistrar, ResourceFetcher};
use modloader_core::{Loader, LoaderConfig, ModuleDefinition, RegistryCounts};

#[derive(Parser)]
#[command(name = "modloader-cli", about = "Resolve and load AMD-style modules")]
struct Cli {
    /// Loader configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail when a require takes longer than this many milliseconds (0 disables)
    #[arg(long)]
    wait_timeout: Option<u64>,

    /// Modules to require
    #[arg(default_values_t = [String::from("aui-dialog")])]
    modules: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    modules: Vec<String>,
    implementations: Vec<Value>,
    requested_urls: Vec<String>,
    counts: RegistryCounts,
}

/// Serves a fixed set of modules. A URL delivers every demo module whose
/// `<name>.js` appears in one of its `&`-separated parts.
#[derive(Default)]
struct DemoFetcher {
    requested: Mutex<Vec<String>>,
}

impl DemoFetcher {
    fn definitions() -> Vec<ModuleDefinition> {
        vec![
            ModuleDefinition::new(
                "aui-base",
                ["exports"],
                PendingImplementation::factory(|args| {
                    args[0]["name"] = json!("aui-base");
                    Value::Null
                }),
            ),
            ModuleDefinition::new(
                "aui-node",
                ["aui-base"],
                PendingImplementation::factory(|args| {
                    json!({ "name": "aui-node", "base": args[0]["name"].clone() })
                }),
            ),
            ModuleDefinition::new(
                "aui-dialog",
                ["aui-node", "module"],
                PendingImplementation::factory(|args| {
                    args[1]["exports"] = json!({ "name": "aui-dialog", "node": args[0].clone() });
                    Value::Null
                }),
            ),
        ]
    }

    fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl ResourceFetcher for DemoFetcher {
    async fn load_resource(&self, url: &str, registrar: &dyn ModuleRegistrar) -> Result<(), FetchError> {
        self.requested.lock().push(url.to_string());

        let mut served = 0;
        for definition in Self::definitions() {
            let Some(name) = definition.name.clone() else {
                continue;
            };
            let file = format!("{name}.js");
            if url.split('&').any(|part| part.ends_with(&file)) {
                registrar.define(definition);
                served += 1;
            }
        }

        if served == 0 {
            return Err(FetchError::NotFound(url.to_string()));
        }
        Ok(())
    }
}

fn load_config(cli: &Cli) -> Result<LoaderConfig, modloader_core::error::ConfigError> {
    let config = match &cli.config {
        Some(path) => LoaderConfig::from_path(path)?,
        None => LoaderConfig::default(),
    };
    Ok(match cli.wait_timeout {
        Some(millis) => config.with_wait_timeout(millis),
        None => config,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to read configuration");
            return ExitCode::FAILURE;
        }
    };

    let fetcher = Arc::new(DemoFetcher::default());
    let loader = match Loader::builder()
        .config(config)
        .fetcher(Arc::clone(&fetcher) as Arc<dyn ResourceFetcher>)
        .build()
    {
        Ok(loader) => loader,
        Err(e) => {
            error!(error = %e, "failed to build loader");
            return ExitCode::FAILURE;
        }
    };

    info!(modules = ?cli.modules, "requiring");
    match loader.require(cli.modules.clone()).await {
        Ok(implementations) => {
            let report = Report {
                modules: cli.modules,
                implementations,
                requested_urls: fetcher.requested_urls(),
                counts: loader.counts_by_state(),
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!(error = %e, "failed to encode report");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!(error = %failure, "require failed");
            if let Ok(json) = serde_json::to_string_pretty(&failure) {
                eprintln!("{json}");
            }
            ExitCode::FAILURE
        }
    }
}
