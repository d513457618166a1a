use serde::{Serialize, Serializer};
use thiserror::Error;

/// Failure of one stage of the load pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("Error processing module: {0}. The provided configuration is not Directed Acyclic Graph.")]
    Cycle(String),

    #[error("Load timeout for modules: {}", .0.join(","))]
    Timeout(Vec<String>),

    #[error("failed to load {url}: {reason}")]
    Fetch {
        url: String,
        modules: Vec<String>,
        reason: String,
    },

    #[error("Module {module} does not export the specified value: {exports}")]
    MissingExport { module: String, exports: String },

    #[error("delivery of module {0} was abandoned")]
    Abandoned(String),
}

/// Report handed to a failed `require`.
///
/// Field names in the serialized form match the report consumers already
/// parse, including the historical `dependecies` spelling.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{error}")]
pub struct RequireFailure {
    #[serde(serialize_with = "as_message")]
    pub error: LoaderError,
    /// Full resolution order, empty when resolution itself failed.
    #[serde(rename = "dependecies")]
    pub dependencies: Vec<String>,
    pub mapped_modules: Vec<String>,
    /// Entries of `dependencies` that still lack an implementation.
    pub missing_dependencies: Vec<String>,
    /// Names as the caller supplied them.
    pub modules: Vec<String>,
}

fn as_message<S: Serializer>(error: &LoaderError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_match_the_established_wording() {
        assert_eq!(
            LoaderError::Cycle("a".into()).to_string(),
            "Error processing module: a. The provided configuration is not Directed Acyclic Graph."
        );
        assert_eq!(
            LoaderError::Timeout(vec!["a".into(), "b".into()]).to_string(),
            "Load timeout for modules: a,b"
        );
        assert_eq!(
            LoaderError::MissingExport {
                module: "jquery".into(),
                exports: "$".into()
            }
            .to_string(),
            "Module jquery does not export the specified value: $"
        );
    }

    #[test]
    fn failure_serializes_with_report_field_names() {
        let failure = RequireFailure {
            error: LoaderError::Timeout(vec!["a".into()]),
            dependencies: vec!["b".into(), "a".into()],
            mapped_modules: vec!["a".into()],
            missing_dependencies: vec!["a".into()],
            modules: vec!["a".into()],
        };

        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            value,
            json!({
                "error": "Load timeout for modules: a",
                "dependecies": ["b", "a"],
                "mappedModules": ["a"],
                "missingDependencies": ["a"],
                "modules": ["a"]
            })
        );
    }
}
