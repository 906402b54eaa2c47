//! Template-to-manifest pipeline
//!
//! 1. Gather [`ProjectInfo`] and load the template concurrently.
//! 2. Take the repository sub-object (`pbrepo`) out of the manifest.
//! 3. Set `name` from the environment (see [`Assembler::project_name`]).
//! 4. Resolve placeholders in `scripts`.
//! 5. Resolve placeholders in the repository sub-object.
//! 6. Copy each top-level key of the sub-object onto the manifest.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::env::Environment;
use crate::manifest::{
    DEFAULT_OUTPUT, DEFAULT_REPO_KEY, DEFAULT_TEMPLATE, Manifest, NAME_KEY, SCRIPTS_KEY, kind_of,
    load_template, write_manifest,
};
use crate::project_info::ProjectInfo;
use crate::resolver::{ArrayPolicy, LookupContext, MissingPolicy, Visitor, resolve_str};
use crate::revision::RevisionReader;
use crate::{Error, Result};

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Working directory; relative paths and the VCS command resolve here.
    pub dir: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    pub reader: RevisionReader,
    pub env: Environment,
    pub missing: MissingPolicy,
    pub arrays: ArrayPolicy,
    /// Key of the sub-object merged onto the top level.
    pub repo_key: String,
}

impl AssemblerConfig {
    /// Defaults for `dir`: `package.in.json` in, `package.json` out, `git`.
    pub fn new(dir: impl Into<PathBuf>, env: Environment) -> Self {
        let dir = dir.into();
        Self {
            reader: RevisionReader::default().in_dir(&dir),
            dir,
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            env,
            missing: MissingPolicy::default(),
            arrays: ArrayPolicy::default(),
            repo_key: DEFAULT_REPO_KEY.to_string(),
        }
    }

    /// Template path, relative paths taken against `dir`.
    pub fn template_path(&self) -> PathBuf {
        self.dir.join(&self.template)
    }

    /// Output path, relative paths taken against `dir`.
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(&self.output)
    }
}

/// The result of a successful assembly.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub manifest: Manifest,
    pub info: ProjectInfo,
}

pub struct Assembler {
    config: AssemblerConfig,
}

impl Assembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Build the manifest without writing it.
    pub async fn assemble(&self) -> Result<Assembled> {
        let template_path = self.config.template_path();
        tracing::debug!(?template_path, vcs = self.config.reader.program(), "Assembling");

        // The remote only matters when the environment does not name the project.
        let lookup_remote = self.config.env.project_name().is_none();
        let (info, manifest) = tokio::try_join!(
            ProjectInfo::gather_with_remote(&self.config.reader, lookup_remote),
            load_template(&template_path),
        )?;

        let manifest = self.apply(&info, manifest)?;
        Ok(Assembled { manifest, info })
    }

    /// Assemble and pretty-print, without writing.
    pub async fn render(&self) -> Result<String> {
        self.assemble().await?.manifest.to_pretty_string()
    }

    /// Write `rendered` to the output path. Returns the written path.
    pub fn write(&self, rendered: &str) -> Result<PathBuf> {
        let output_path = self.config.output_path();
        write_manifest(&output_path, rendered.as_bytes())?;
        tracing::info!(path = %output_path.display(), "Wrote manifest");
        Ok(output_path)
    }

    /// Steps 2 to 6, on already-loaded inputs.
    pub fn apply(&self, info: &ProjectInfo, mut manifest: Manifest) -> Result<Manifest> {
        let ctx = LookupContext::new(info, &self.config.env).with_missing(self.config.missing);
        let visitor = Visitor::new(ctx).with_arrays(self.config.arrays);

        let mut repo = self.take_repo(&mut manifest)?;

        let name = self.project_name(info, &manifest)?;
        manifest.insert(NAME_KEY, Value::String(name));

        if let Some(scripts) = manifest.get_mut(SCRIPTS_KEY) {
            resolve_scripts(&ctx, &visitor, scripts)?;
        } else {
            tracing::debug!("Template has no scripts");
        }

        visitor.visit_object(&mut repo)?;

        for (key, value) in repo {
            if manifest.insert(key.clone(), value).is_some() {
                tracing::debug!(%key, "Repository field overrides template field");
            }
        }

        Ok(manifest)
    }

    fn take_repo(&self, manifest: &mut Manifest) -> Result<Map<String, Value>> {
        let key = self.config.repo_key.as_str();
        match manifest.remove(key) {
            Some(Value::Object(repo)) => Ok(repo),
            Some(other) => Err(Error::invalid(format!(
                "`{key}` must be an object, found {}",
                kind_of(&other)
            ))),
            None => {
                tracing::warn!(key, "Template has no repository section");
                Ok(Map::new())
            }
        }
    }

    /// Name for the output manifest.
    ///
    /// `PROJECT_NAME`, then `JOB_NAME`, then the repository name from the
    /// `origin` remote, then whatever string `name` the template already has.
    pub fn project_name(&self, info: &ProjectInfo, manifest: &Manifest) -> Result<String> {
        if let Some(name) = self.config.env.project_name() {
            return Ok(name.to_string());
        }
        if let Some(name) = info.project_name() {
            tracing::warn!(%name, "PROJECT_NAME and JOB_NAME unset, using remote name");
            return Ok(name.to_string());
        }
        if let Some(name) = manifest.name() {
            tracing::warn!(%name, "PROJECT_NAME and JOB_NAME unset, keeping template name");
            return Ok(name.to_string());
        }
        Err(Error::MissingProjectName)
    }
}

/// Resolve each entry of the `scripts` mapping.
fn resolve_scripts(
    ctx: &LookupContext<'_>,
    visitor: &Visitor<'_>,
    scripts: &mut Value,
) -> Result<()> {
    let kind = kind_of(scripts);
    let Value::Object(entries) = scripts else {
        return Err(Error::invalid(format!(
            "`{SCRIPTS_KEY}` must be an object, found {kind}"
        )));
    };

    for (key, value) in entries.iter_mut() {
        match value {
            Value::String(command) => {
                let resolved = resolve_str(ctx, command)?;
                tracing::debug!(script = %key, command = %resolved, "Resolved script");
                *command = resolved;
            }
            other => visitor.visit_value(other)?,
        }
    }
    Ok(())
}
