//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use reproject_core::manifest::{DEFAULT_OUTPUT, DEFAULT_REPO_KEY, DEFAULT_TEMPLATE};
use reproject_core::revision::DEFAULT_VCS;
use reproject_core::{ArrayPolicy, AssemblerConfig, Environment, MissingPolicy, RevisionReader};

/// Render package.json from package.in.json, filling in `${CATEGORY:name}` placeholders
#[derive(Parser, Debug)]
#[command(name = "reproject")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to run in; the template, output and VCS command resolve here
    #[arg(short = 'C', long, default_value = ".")]
    pub dir: PathBuf,

    /// Template manifest to read
    #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
    pub template: PathBuf,

    /// Manifest to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Version-control executable used for `rev-list --count HEAD`
    #[arg(long, env = "REPROJECT_VCS", default_value = DEFAULT_VCS)]
    pub vcs: String,

    /// Template key whose fields are merged onto the top level
    #[arg(long, default_value = DEFAULT_REPO_KEY)]
    pub repo_key: String,

    /// What to substitute for placeholders that have no value
    #[arg(long, value_enum, default_value_t = MissingArg::Strict)]
    pub missing: MissingArg,

    /// Also resolve placeholders inside arrays
    #[arg(long)]
    pub traverse_arrays: bool,

    /// Print the manifest instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Show a line diff against the current output file
    #[arg(long)]
    pub diff: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Missing-value policies as command-line values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingArg {
    /// Fail the run
    Strict,
    /// Substitute the text `undefined`
    Undefined,
    /// Substitute nothing
    Empty,
    /// Leave the placeholder as written
    Keep,
}

impl From<MissingArg> for MissingPolicy {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::Strict => MissingPolicy::Strict,
            MissingArg::Undefined => MissingPolicy::Undefined,
            MissingArg::Empty => MissingPolicy::Empty,
            MissingArg::Keep => MissingPolicy::Keep,
        }
    }
}

impl Cli {
    /// Build the pipeline configuration from the arguments and `env`.
    pub fn to_config(&self, env: Environment) -> AssemblerConfig {
        let mut config = AssemblerConfig::new(&self.dir, env);
        config.template = self.template.clone();
        config.output = self.output.clone();
        config.reader = RevisionReader::new(&self.vcs).in_dir(&self.dir);
        config.repo_key = self.repo_key.clone();
        config.missing = self.missing.into();
        config.arrays = if self.traverse_arrays {
            ArrayPolicy::Traverse
        } else {
            ArrayPolicy::Skip
        };
        config
    }
}
