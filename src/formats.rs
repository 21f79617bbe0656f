use std::collections::BTreeSet;

use lazy_static::lazy_static;

lazy_static! {
    static ref BUILTIN_FORMATS: [&'static str; 11] = [
        "date-time",
        "email",
        "hostname",
        "ipv4",
        "ipv6",
        "uri",
        "date",
        "time",
        "uuid",
        "uri-reference",
        "regex",
    ];
}

/// Names of the `format` values the loader accepts without complaint.
///
/// Generation never validates instances, so every registered format is
/// always-accepting; registering a custom format only tells the loader the
/// name is expected.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    names: BTreeSet<String>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        FormatRegistry {
            names: BUILTIN_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl FormatRegistry {
    /// Built-in formats plus the given custom ones.
    pub fn with_custom<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = FormatRegistry::default();
        for name in custom {
            registry.register(name);
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
