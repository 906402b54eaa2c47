//! Pipeline tests against real files and a real or fake VCS command.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use reproject_core::env::{JOB_NAME, PROJECT_NAME};
use reproject_core::{Assembler, AssemblerConfig, Environment, Error, MissingPolicy, RevisionReader};
use reproject_test_utils::TestProject;
use reproject_test_utils::git::git_available;
use serde_json::{Value, json};

const TEMPLATE: &str = r#"{
  "name": "placeholder",
  "scripts": { "test": "echo ${ENV:FOO}" },
  "pbrepo": { "version": "${THIS:gitrevision}" }
}"#;

fn read_json(project: &TestProject, file: &str) -> Value {
    let text = project.read(file).expect("output should exist");
    serde_json::from_str(&text).expect("output should be valid JSON")
}

/// Render and write, as the binary does outside `--dry-run`.
async fn render_and_write(config: AssemblerConfig) -> reproject_core::Result<PathBuf> {
    let assembler = Assembler::new(config);
    let rendered = assembler.render().await?;
    assembler.write(&rendered)
}

#[cfg(unix)]
fn fake_vcs(output: &str) -> RevisionReader {
    RevisionReader::new("sh").with_args(["-c".to_string(), format!("printf '{output}\\n'")])
}

#[tokio::test]
async fn test_end_to_end_with_real_git() {
    if !git_available() {
        eprintln!("skipping: git not available");
        return;
    }

    let project = TestProject::with_commits(7).with_template(TEMPLATE);
    let env = Environment::new()
        .with("FOO", "bar")
        .with(PROJECT_NAME, "myapp");

    let written = render_and_write(AssemblerConfig::new(project.path(), env))
        .await
        .unwrap();

    assert_eq!(written, project.path().join("package.json"));
    assert_eq!(
        read_json(&project, "package.json"),
        json!({ "name": "myapp", "scripts": { "test": "echo bar" }, "version": "7" })
    );
}

#[tokio::test]
async fn test_output_is_pretty_printed_in_template_order() {
    if !git_available() {
        eprintln!("skipping: git not available");
        return;
    }

    let project = TestProject::with_commits(3).with_template(TEMPLATE);
    let env = Environment::new()
        .with("FOO", "bar")
        .with(PROJECT_NAME, "myapp");

    render_and_write(AssemblerConfig::new(project.path(), env))
        .await
        .unwrap();

    assert_eq!(
        project.read("package.json").unwrap(),
        "{\n  \"name\": \"myapp\",\n  \"scripts\": {\n    \"test\": \"echo bar\"\n  },\n  \"version\": \"3\"\n}\n"
    );
}

#[tokio::test]
async fn test_remote_supplies_name_when_env_is_silent() {
    if !git_available() {
        eprintln!("skipping: git not available");
        return;
    }

    let project = TestProject::with_commits(1)
        .with_origin("https://example.com/org/widget.git")
        .with_template(r#"{ "pbrepo": { "version": "1.0.${THIS:gitrevision}" } }"#);

    let assembled = Assembler::new(AssemblerConfig::new(project.path(), Environment::new()))
        .assemble()
        .await
        .unwrap();

    assert_eq!(assembled.manifest.name(), Some("widget"));
    assert_eq!(assembled.info.revision(), Some("1"));
    assert_eq!(assembled.manifest.get("version"), Some(&json!("1.0.1")));
}

#[tokio::test]
async fn test_remote_is_not_consulted_when_env_names_the_project() {
    if !git_available() {
        eprintln!("skipping: git not available");
        return;
    }

    let project = TestProject::with_commits(2)
        .with_origin("https://example.com/org/widget.git")
        .with_template(r#"{ "pbrepo": { "version": "${THIS:gitrevision}" } }"#);
    let env = Environment::new().with(PROJECT_NAME, "myapp");

    let assembled = Assembler::new(AssemblerConfig::new(project.path(), env))
        .assemble()
        .await
        .unwrap();

    assert_eq!(assembled.manifest.name(), Some("myapp"));
    assert_eq!(assembled.info.project_name(), None);
    assert_eq!(assembled.info.revision(), Some("2"));
}

#[tokio::test]
async fn test_outside_a_repository_fails_with_process_exit() {
    if !git_available() {
        eprintln!("skipping: git not available");
        return;
    }

    // A fresh temp dir may still sit inside some repository on the host,
    // so point git at a directory that cannot be a work tree.
    let project = TestProject::empty().with_template(TEMPLATE);
    let env = Environment::new().with(PROJECT_NAME, "app").with("FOO", "x");
    let mut config = AssemblerConfig::new(project.path(), env);
    config.reader = RevisionReader::default()
        .with_args(["--git-dir", "does-not-exist", "rev-list", "--count", "HEAD"])
        .in_dir(project.path());

    let err = render_and_write(config).await.unwrap_err();

    assert!(matches!(err, Error::ProcessExit { .. }), "got {err}");
    assert!(project.read("package.json").is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_missing_template_is_io_error_and_writes_nothing() {
    let project = TestProject::empty();
    let mut config = AssemblerConfig::new(project.path(), Environment::new());
    config.reader = fake_vcs("5");

    let err = render_and_write(config).await.unwrap_err();

    assert!(matches!(err, Error::Io { .. }), "got {err}");
    assert_eq!(err.exit_code(), 2);
    assert!(project.read("package.json").is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failed_run_leaves_existing_output_untouched() {
    let project = TestProject::empty().with_template(r#"{ "pbrepo": { "v": "${ENV:UNSET}" } }"#);
    project.write("package.json", "previous\n");
    let mut config = AssemblerConfig::new(project.path(), Environment::new().with(JOB_NAME, "ci"));
    config.reader = fake_vcs("5");

    let err = render_and_write(config).await.unwrap_err();

    assert!(matches!(err, Error::UndefinedLookup { .. }));
    assert_eq!(project.read("package.json").as_deref(), Some("previous\n"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_malformed_template_is_parse_error() {
    let project = TestProject::empty().with_template("{ \"pbrepo\": ");
    let mut config = AssemblerConfig::new(project.path(), Environment::new());
    config.reader = fake_vcs("5");

    let err = render_and_write(config).await.unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got {err}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_custom_paths_and_legacy_missing_values() {
    let project = TestProject::empty();
    std::fs::create_dir(project.path().join("tpl")).unwrap();
    project.write(
        "tpl/manifest.json",
        r#"{ "scripts": { "go": "run ${ENV:NOPE}" }, "pbrepo": { "build": "${THIS:gitrevision}" } }"#,
    );

    let mut config = AssemblerConfig::new(project.path(), Environment::new().with(JOB_NAME, "ci"));
    config.reader = fake_vcs("12");
    config.template = "tpl/manifest.json".into();
    config.output = "out.json".into();
    config.missing = MissingPolicy::Undefined;

    render_and_write(config).await.unwrap();

    assert_eq!(
        read_json(&project, "out.json"),
        json!({ "scripts": { "go": "run undefined" }, "name": "ci", "build": "12" })
    );
}
