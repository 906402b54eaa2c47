//! Manifest template resolution
//!
//! Turns a template manifest (`package.in.json`) into a concrete one
//! (`package.json`) by substituting `${CATEGORY:name}` placeholders with
//! environment variables and project facts such as the revision count.
//!
//! - [`revision`] - runs the version-control command
//! - [`project_info`] - the `${THIS:...}` lookup table
//! - [`env`] - environment variables as an explicit input
//! - [`resolver`] - placeholder substitution over strings and JSON values
//! - [`manifest`] - template loading and atomic output writing
//! - [`assembler`] - the pipeline tying them together

pub mod assembler;
pub mod env;
pub mod error;
pub mod manifest;
pub mod project_info;
pub mod resolver;
pub mod revision;

pub use assembler::{Assembled, Assembler, AssemblerConfig};
pub use env::Environment;
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use project_info::ProjectInfo;
pub use resolver::{ArrayPolicy, LookupContext, MissingPolicy, Visitor, resolve_str};
pub use revision::RevisionReader;
