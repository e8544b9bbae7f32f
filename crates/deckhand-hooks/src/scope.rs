//! Scope tags attached to hook registrations.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A tag identifying where a registration was made.
///
/// Registrations carry the set of scopes active on the context stack when
/// they were created. Scopes are later used to restrict which callbacks run
/// and to retract everything a plugin declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Core declarations.
    Global,
    /// An application or service, e.g. `app:lms`.
    App(String),
    /// A plugin, e.g. `plugin:minio`.
    Plugin(String),
    /// Any other free-form tag.
    Custom(String),
}

impl Scope {
    /// Creates an application scope.
    pub fn app(name: impl Into<String>) -> Self {
        Self::App(name.into())
    }

    /// Creates a plugin scope.
    pub fn plugin(name: impl Into<String>) -> Self {
        Self::Plugin(name.into())
    }

    /// Creates a free-form scope.
    pub fn custom(tag: impl Into<String>) -> Self {
        Self::Custom(tag.into())
    }

    /// Parses the textual form produced by `Display`.
    ///
    /// `global`, `app:<name>` and `plugin:<name>` map to their variants;
    /// anything else becomes `Custom`.
    pub fn parse(tag: &str) -> Self {
        if tag == "global" {
            return Self::Global;
        }
        if let Some(name) = tag.strip_prefix("app:") {
            return Self::App(name.to_string());
        }
        if let Some(name) = tag.strip_prefix("plugin:") {
            return Self::Plugin(name.to_string());
        }
        Self::Custom(tag.to_string())
    }

    /// Interprets a command-line `--limit` value.
    ///
    /// A bare name (`lms`, `minio`) limits to the application scope of that
    /// name. Values containing a colon are parsed as full scope tags.
    pub fn from_limit(limit: &str) -> Self {
        if limit.contains(':') || limit == "global" {
            Self::parse(limit)
        } else {
            Self::App(limit.to_string())
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::App(name) => write!(f, "app:{name}"),
            Self::Plugin(name) => write!(f, "plugin:{name}"),
            Self::Custom(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for Scope {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_round_trip() {
        for scope in [
            Scope::Global,
            Scope::app("lms"),
            Scope::plugin("minio"),
            Scope::custom("tests"),
        ] {
            assert_eq!(Scope::parse(&scope.to_string()), scope);
        }
    }

    #[test]
    fn test_from_limit() {
        assert_eq!(Scope::from_limit("lms"), Scope::app("lms"));
        assert_eq!(Scope::from_limit("plugin:minio"), Scope::plugin("minio"));
        assert_eq!(Scope::from_limit("global"), Scope::Global);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Scope::app("cms"), Scope::App("cms".to_string()));
        assert_ne!(Scope::app("cms"), Scope::plugin("cms"));
    }
}
