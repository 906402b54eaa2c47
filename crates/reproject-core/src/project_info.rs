//! Run-time facts about the project, addressed as `${CATEGORY:name}`

use std::collections::BTreeMap;

use crate::Result;
use crate::revision::{RevisionReader, remote_project_name};

/// Category holding facts about the current checkout.
pub const THIS: &str = "THIS";

/// Key of the revision count within [`THIS`].
pub const GIT_REVISION: &str = "gitrevision";

/// Key of the repository name derived from the `origin` remote.
pub const PROJECT_NAME_KEY: &str = "projectname";

/// Lookup table of category -> key -> value.
///
/// Categories are stored upper-cased and keys lower-cased, so lookups are
/// case-insensitive on both parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    categories: BTreeMap<String, BTreeMap<String, String>>,
}

impl ProjectInfo {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with only `THIS.gitrevision` set.
    pub fn with_revision(revision: impl Into<String>) -> Self {
        let mut info = Self::new();
        info.insert(THIS, GIT_REVISION, revision);
        info
    }

    pub fn insert(
        &mut self,
        category: &str,
        key: &str,
        value: impl Into<String>,
    ) -> Option<String> {
        self.categories
            .entry(category.to_uppercase())
            .or_default()
            .insert(key.to_lowercase(), value.into())
    }

    pub fn get(&self, category: &str, key: &str) -> Option<&str> {
        self.categories
            .get(&category.to_uppercase())?
            .get(&key.to_lowercase())
            .map(String::as_str)
    }

    /// The revision count, if it has been gathered.
    pub fn revision(&self) -> Option<&str> {
        self.get(THIS, GIT_REVISION)
    }

    /// Repository name taken from the `origin` remote, if one was found.
    pub fn project_name(&self) -> Option<&str> {
        self.get(THIS, PROJECT_NAME_KEY)
    }

    /// Collect the project facts using `reader`.
    ///
    /// The revision count is required; the remote-derived project name is
    /// best-effort and simply absent when there is no usable `origin`.
    pub async fn gather(reader: &RevisionReader) -> Result<Self> {
        Self::gather_with_remote(reader, true).await
    }

    /// Like [`gather`](Self::gather), asking for the `origin` remote only
    /// when `lookup_remote` is set.
    pub async fn gather_with_remote(reader: &RevisionReader, lookup_remote: bool) -> Result<Self> {
        let remote = async {
            if lookup_remote {
                reader.remote_url().await
            } else {
                Ok(None)
            }
        };
        let (revision, remote) = tokio::join!(reader.read(), remote);

        let mut info = Self::with_revision(revision?);
        tracing::debug!(revision = ?info.revision(), "Read revision count");

        match remote {
            Ok(None) => {}
            Ok(Some(url)) => match remote_project_name(&url) {
                Some(name) => {
                    tracing::debug!(%url, %name, "Derived project name from remote");
                    info.insert(THIS, PROJECT_NAME_KEY, name);
                }
                None => tracing::debug!(%url, "Remote URL does not name a repository"),
            },
            Err(e) => tracing::debug!(error = %e, "No origin remote"),
        }

        Ok(info)
    }
}
