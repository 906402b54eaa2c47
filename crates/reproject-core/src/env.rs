//! Environment variables as an explicit input
//!
//! The resolver never reads the process environment directly. Callers take a
//! snapshot with [`Environment::from_process`] (or build one by hand in tests)
//! and pass it down.

use std::collections::HashMap;

/// Variable that names the project, preferred over [`JOB_NAME`].
pub const PROJECT_NAME: &str = "PROJECT_NAME";

/// Fallback project name, as set by CI job runners.
pub const JOB_NAME: &str = "JOB_NAME";

/// An owned snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Look up a variable by its exact, case-sensitive name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Like [`get`](Self::get), but treats an empty value as unset.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Project name from `PROJECT_NAME`, falling back to `JOB_NAME`.
    pub fn project_name(&self) -> Option<&str> {
        self.non_empty(PROJECT_NAME)
            .or_else(|| self.non_empty(JOB_NAME))
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
