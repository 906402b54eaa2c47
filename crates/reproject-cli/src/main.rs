//! reproject CLI
//!
//! Renders the project manifest from its template and writes it next to it.

mod cli;
mod error;
mod logging;

use std::io::{ErrorKind, Write};
use std::path::Path;

use clap::Parser;
use colored::Colorize;
use reproject_core::{Assembler, Environment};
use similar::{ChangeTag, TextDiff};

use cli::Cli;
use error::{CliError, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose).map_err(|e| CliError::Logging(e.to_string()))?;
    tracing::debug!(?cli, "Parsed arguments");

    let assembler = Assembler::new(cli.to_config(Environment::from_process()));
    let rendered = assembler.render().await?;
    let output_path = assembler.config().output_path();

    if cli.diff {
        print_diff(&output_path, &rendered)?;
    }

    if cli.dry_run {
        std::io::stdout().write_all(rendered.as_bytes())?;
        return Ok(());
    }

    assembler.write(&rendered)?;
    Ok(())
}

/// Print a unified-style line diff between the current output and `rendered`.
fn print_diff(output_path: &Path, rendered: &str) -> Result<()> {
    let current = match std::fs::read_to_string(output_path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    let mut stdout = std::io::stdout().lock();

    if current == rendered {
        writeln!(stdout, "{} is up to date", output_path.display())?;
        return Ok(());
    }

    writeln!(stdout, "{}", format!("--- {}", output_path.display()).bold())?;
    writeln!(stdout, "{}", "+++ rendered".bold())?;

    let diff = TextDiff::from_lines(current.as_str(), rendered);
    for change in diff.iter_all_changes() {
        let line = change.to_string_lossy();
        match change.tag() {
            ChangeTag::Delete => write!(stdout, "{}", format!("-{line}").red())?,
            ChangeTag::Insert => write!(stdout, "{}", format!("+{line}").green())?,
            ChangeTag::Equal => write!(stdout, " {line}")?,
        }
        if change.missing_newline() {
            writeln!(stdout)?;
        }
    }
    Ok(())
}
