//! Placeholder substitution
//!
//! Strings may embed tokens of the form `${CATEGORY:name}`:
//!
//! - `${ENV:NAME}` reads the environment variable `NAME` (exact case).
//! - Any other category reads `ProjectInfo[CATEGORY][name]`, ignoring case.
//!
//! The category itself is matched case-insensitively, so `${env:HOME}` and
//! `${ENV:HOME}` are the same token. Tokens do not nest and have no escape.
//!
//! [`resolve_str`] handles a single string; [`Visitor`] walks a JSON value and
//! resolves every string it is allowed to reach.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::env::Environment;
use crate::project_info::ProjectInfo;
use crate::{Error, Result};

/// `${CATEGORY:name}`: category without `:`, name without `}`.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^:]+):([^}]+)\}").expect("Invalid placeholder regex"));

/// Category that reads from the environment instead of [`ProjectInfo`].
pub const ENV_CATEGORY: &str = "ENV";

/// Text substituted for a missing value under [`MissingPolicy::Undefined`].
pub const UNDEFINED: &str = "undefined";

/// What to do with a placeholder that has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Fail with [`Error::UndefinedLookup`].
    #[default]
    Strict,
    /// Substitute the literal text `undefined`.
    Undefined,
    /// Substitute nothing.
    Empty,
    /// Leave the token in place.
    Keep,
}

/// Whether the object walk descends into arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayPolicy {
    /// Arrays and everything inside them are left untouched.
    #[default]
    Skip,
    /// Strings in arrays, and objects nested in arrays, are resolved too.
    Traverse,
}

/// Everything a placeholder can be resolved against.
#[derive(Debug, Clone, Copy)]
pub struct LookupContext<'a> {
    pub info: &'a ProjectInfo,
    pub env: &'a Environment,
    pub missing: MissingPolicy,
}

impl<'a> LookupContext<'a> {
    /// Context with the default strict missing-value policy.
    pub fn new(info: &'a ProjectInfo, env: &'a Environment) -> Self {
        Self {
            info,
            env,
            missing: MissingPolicy::default(),
        }
    }

    pub fn with_missing(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }

    /// Value for one `category`/`name` pair, before the missing policy applies.
    pub fn lookup(&self, category: &str, name: &str) -> Option<&'a str> {
        if category.eq_ignore_ascii_case(ENV_CATEGORY) {
            self.env.get(name)
        } else {
            self.info.get(category, name)
        }
    }
}

/// Replace every placeholder in `text`, scanning left to right.
///
/// Strings without placeholders come back unchanged.
pub fn resolve_str(ctx: &LookupContext<'_>, text: &str) -> Result<String> {
    let mut failed: Option<Error> = None;

    let replaced = PLACEHOLDER_REGEX.replace_all(text, |caps: &Captures<'_>| {
        let token = &caps[0];
        match ctx.lookup(&caps[1], &caps[2]) {
            Some(value) => Cow::Borrowed(value),
            None => match ctx.missing {
                MissingPolicy::Undefined => Cow::Borrowed(UNDEFINED),
                MissingPolicy::Empty => Cow::Borrowed(""),
                MissingPolicy::Keep => Cow::Owned(token.to_string()),
                MissingPolicy::Strict => {
                    if failed.is_none() {
                        failed = Some(Error::UndefinedLookup {
                            token: token.to_string(),
                        });
                    }
                    Cow::Borrowed("")
                }
            },
        }
    });

    match failed {
        Some(err) => Err(err),
        None => Ok(replaced.into_owned()),
    }
}

/// In-place resolver over the JSON value variants.
#[derive(Debug, Clone, Copy)]
pub struct Visitor<'a> {
    ctx: LookupContext<'a>,
    arrays: ArrayPolicy,
}

impl<'a> Visitor<'a> {
    pub fn new(ctx: LookupContext<'a>) -> Self {
        Self {
            ctx,
            arrays: ArrayPolicy::default(),
        }
    }

    pub fn with_arrays(mut self, arrays: ArrayPolicy) -> Self {
        self.arrays = arrays;
        self
    }

    /// Resolve every reachable string inside `value`.
    pub fn visit_value(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::String(s) => self.visit_string(s),
            Value::Object(map) => self.visit_object(map),
            Value::Array(items) => match self.arrays {
                ArrayPolicy::Skip => Ok(()),
                ArrayPolicy::Traverse => items.iter_mut().try_for_each(|v| self.visit_value(v)),
            },
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
        }
    }

    /// Resolve every field of `map` in key order, recursing into objects.
    pub fn visit_object(&self, map: &mut Map<String, Value>) -> Result<()> {
        map.values_mut().try_for_each(|v| self.visit_value(v))
    }

    fn visit_string(&self, s: &mut String) -> Result<()> {
        if PLACEHOLDER_REGEX.is_match(s) {
            *s = resolve_str(&self.ctx, s)?;
        }
        Ok(())
    }
}

/// Shorthand for walking `value` with the default (skip) array policy.
pub fn resolve_value(ctx: &LookupContext<'_>, value: &mut Value) -> Result<()> {
    Visitor::new(*ctx).visit_value(value)
}

/// Shorthand for walking `map` with the default (skip) array policy.
pub fn resolve_object(ctx: &LookupContext<'_>, map: &mut Map<String, Value>) -> Result<()> {
    Visitor::new(*ctx).visit_object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn fixtures() -> (ProjectInfo, Environment) {
        (
            ProjectInfo::with_revision("42"),
            Environment::new().with("X", "5").with("FOO", "bar"),
        )
    }

    #[rstest]
    #[case("${ENV:FOO}", "bar")]
    #[case("${env:FOO}", "bar")]
    #[case("echo ${ENV:FOO} done", "echo bar done")]
    #[case("${THIS:gitrevision}", "42")]
    #[case("${this:GITREVISION}", "42")]
    #[case("v1.${THIS:gitrevision}.${ENV:X}", "v1.42.5")]
    #[case("no tokens here", "no tokens here")]
    #[case("${ENV:}", "${ENV:}")]
    #[case("${:FOO}", "${:FOO}")]
    #[case("$ENV:FOO", "$ENV:FOO")]
    fn test_resolve_str(#[case] input: &str, #[case] expected: &str) {
        let (info, env) = fixtures();
        let ctx = LookupContext::new(&info, &env);
        assert_eq!(resolve_str(&ctx, input).unwrap(), expected);
    }

    #[test]
    fn test_env_names_are_case_sensitive() {
        let (info, env) = fixtures();
        let ctx = LookupContext::new(&info, &env).with_missing(MissingPolicy::Keep);
        assert_eq!(resolve_str(&ctx, "${ENV:foo}").unwrap(), "${ENV:foo}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let info = ProjectInfo::new();
        let env = Environment::new()
            .with("A", "${ENV:B}")
            .with("B", "nope");
        let ctx = LookupContext::new(&info, &env);
        assert_eq!(resolve_str(&ctx, "${ENV:A}").unwrap(), "${ENV:B}");
    }

    #[test]
    fn test_strict_reports_first_missing_token() {
        let (info, env) = fixtures();
        let ctx = LookupContext::new(&info, &env);
        let err = resolve_str(&ctx, "${ENV:NOPE} ${THIS:other}").unwrap_err();
        match err {
            Error::UndefinedLookup { token } => assert_eq!(token, "${ENV:NOPE}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case(MissingPolicy::Undefined, "a-undefined-b")]
    #[case(MissingPolicy::Empty, "a--b")]
    #[case(MissingPolicy::Keep, "a-${ENV:NOPE}-b")]
    fn test_missing_policies(#[case] policy: MissingPolicy, #[case] expected: &str) {
        let (info, env) = fixtures();
        let ctx = LookupContext::new(&info, &env).with_missing(policy);
        assert_eq!(resolve_str(&ctx, "a-${ENV:NOPE}-b").unwrap(), expected);
    }

    #[test]
    fn test_object_walk_skips_arrays_by_default() {
        let (info, env) = fixtures();
        let ctx = LookupContext::new(&info, &env);
        let mut value = json!({
            "a": { "b": "${ENV:X}" },
            "c": ["${ENV:X}"],
            "n": 1,
            "t": true,
            "z": null
        });

        resolve_value(&ctx, &mut value).unwrap();

        assert_eq!(
            value,
            json!({
                "a": { "b": "5" },
                "c": ["${ENV:X}"],
                "n": 1,
                "t": true,
                "z": null
            })
        );
    }

    #[test]
    fn test_object_walk_traverses_arrays_when_asked() {
        let (info, env) = fixtures();
        let ctx = LookupContext::new(&info, &env);
        let mut value = json!({
            "files": ["dist-${THIS:gitrevision}", { "name": "${ENV:FOO}" }, 3]
        });

        Visitor::new(ctx)
            .with_arrays(ArrayPolicy::Traverse)
            .visit_value(&mut value)
            .unwrap();

        assert_eq!(value, json!({ "files": ["dist-42", { "name": "bar" }, 3] }));
    }

    #[test]
    fn test_skipped_arrays_never_trip_strict_policy() {
        let (info, env) = fixtures();
        let ctx = LookupContext::new(&info, &env);
        let mut map = json!({ "keywords": ["${ENV:MISSING}"] })
            .as_object()
            .cloned()
            .unwrap();
        resolve_object(&ctx, &mut map).unwrap();
        assert_eq!(map["keywords"], json!(["${ENV:MISSING}"]));
    }
}
