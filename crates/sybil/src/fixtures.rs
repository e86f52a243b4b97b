//! Fixture values a host binds into namespaces.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use sybil_script::{Namespace, Value};

use crate::errors::ConfigError;

/// Builds a fresh fixture value for one example.
pub type FixtureFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Named fixture factories, shared by every worker of a host.
#[derive(Clone, Default)]
pub struct FixtureRegistry {
    factories: FxHashMap<String, FixtureFactory>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Bind a fresh value for each of `names` into `namespace`.
    ///
    /// Stops at the first name with no factory.
    pub fn inject(&self, names: &[String], namespace: &Namespace) -> Result<(), ConfigError> {
        for name in names {
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| ConfigError::UnknownFixture { name: name.clone() })?;
            namespace.insert(name.as_str(), factory());
        }
        Ok(())
    }
}

impl fmt::Debug for FixtureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FixtureRegistry")
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn injects_fresh_values() {
        let registry = FixtureRegistry::new()
            .register("session_fixture", || Value::str("s"))
            .register("items", || Value::list(vec![]));
        let namespace = Namespace::new();
        let names = vec!["session_fixture".to_string(), "items".to_string()];

        assert_eq!(registry.inject(&names, &namespace), Ok(()));
        assert_eq!(namespace.get("session_fixture"), Some(Value::str("s")));

        let first = namespace.get("items");
        assert_eq!(registry.inject(&names, &namespace), Ok(()));
        let second = namespace.get("items");
        assert!(!first.zip(second).is_some_and(|(a, b)| a.is_identical(&b)));
    }

    #[test]
    fn unknown_fixture_is_a_config_error() {
        let registry = FixtureRegistry::new();
        let namespace = Namespace::new();
        assert_eq!(
            registry.inject(&["missing".to_string()], &namespace),
            Err(ConfigError::UnknownFixture {
                name: "missing".to_string()
            })
        );
    }
}
