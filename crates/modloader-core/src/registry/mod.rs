//! Registry ownership and request planning.
//!
//! - **config_parser**: module registry, conditional index, name mapping
//! - **url**: grouping of not-yet-requested modules into requests

pub mod config_parser;
pub mod url;

pub use self::config_parser::ConfigParser;
pub use self::url::UrlBuilder;
