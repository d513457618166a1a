//! Name resolution: relative specifiers and dependency ordering.

pub mod dependency;
pub mod path;

pub use self::dependency::DependencyBuilder;
pub use self::path::PathResolver;
