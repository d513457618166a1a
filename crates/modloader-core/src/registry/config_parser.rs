//! ConfigParser - モジュール登録簿と設定の所有者

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::domain::{LoaderConfig, Module, ModuleOptions};

/// ConfigParser は registry（name -> module）、条件付きインデックス
/// （trigger -> dependents）、グローバル設定を所有
///
/// registry の変更は全て [`ConfigParser::add_module`] を通ります。
#[derive(Debug)]
pub struct ConfigParser {
    config: LoaderConfig,
    modules: HashMap<String, Module>,
    conditional_modules: HashMap<String, Vec<String>>,
}

impl ConfigParser {
    /// `config` を所有し、`modules` シードを registry に移す
    pub fn new(mut config: LoaderConfig) -> Self {
        let seed = std::mem::take(&mut config.modules);
        let mut parser = Self {
            config,
            modules: HashMap::new(),
            conditional_modules: HashMap::new(),
        };
        for options in seed {
            parser.add_module(options);
        }
        parser
    }

    /// Upsert: 既存モジュールに指定フィールドをマージ、なければ挿入
    pub fn add_module(&mut self, options: ModuleOptions) -> &Module {
        if let Some(condition) = &options.condition {
            let dependents = self
                .conditional_modules
                .entry(condition.trigger.clone())
                .or_default();
            if !dependents.contains(&options.name) {
                debug!(module = %options.name, trigger = %condition.trigger, "conditional module registered");
                dependents.push(options.name.clone());
            }
        }

        match self.modules.entry(options.name.clone()) {
            Entry::Occupied(entry) => {
                let module = entry.into_mut();
                module.merge(options);
                module
            }
            Entry::Vacant(entry) => entry.insert(Module::from_options(options)),
        }
    }

    /// モジュールを返す（未知ならプレースホルダーを挿入）
    pub fn ensure_module(&mut self, name: &str) -> &mut Module {
        self.modules
            .entry(name.to_string())
            .or_insert_with(|| Module::from_options(ModuleOptions::placeholder(name)))
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn modules(&self) -> &HashMap<String, Module> {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    pub fn conditional_modules(&self) -> &HashMap<String, Vec<String>> {
        &self.conditional_modules
    }

    /// 設定の `maps` を名前 1 つに適用
    ///
    /// # ルール
    /// - 宣言順で最初に一致したルールが勝つ（名前と完全一致、または先頭セグメント一致）
    /// - どのルールにも一致しなければ wildcard 変換（設定されている場合）
    pub fn map_module(&self, name: &str) -> String {
        let maps = &self.config.maps;
        for (from, to) in maps.rules() {
            if let Some(rest) = name.strip_prefix(from.as_str())
                && (rest.is_empty() || rest.starts_with('/'))
            {
                return format!("{to}{rest}");
            }
        }
        match maps.wildcard() {
            Some(wildcard) => wildcard(name),
            None => name.to_string(),
        }
    }

    pub fn map_modules(&self, names: &[String]) -> Vec<String> {
        names.iter().map(|name| self.map_module(name)).collect()
    }
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}
