use anyhow::Context;
use clap::{Parser, Subcommand};
use schemars::{Schema, schema_for};
use std::fs;
use std::path::{Path, PathBuf};
use uibench_types::{CONFIG_SCHEMA_V1, TABLE_SCHEMA_V1};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Repo automation for uibench")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// (Re)generate JSON Schemas for reports, tables and config.
    Schema {
        /// Output directory
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,

        /// Fail instead of writing when a checked-in schema is stale.
        #[arg(long, default_value_t = false)]
        check: bool,
    },

    /// Run the usual repo checks (fmt, clippy, test, schema).
    Ci,

    /// Run mutation testing via cargo-mutants (must be installed).
    Mutants {
        /// Extra args forwarded to cargo-mutants
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Schema { out_dir, check } => cmd_schema(&out_dir, check),
        Command::Ci => cmd_ci(),
        Command::Mutants { args } => cmd_mutants(args),
    }
}

fn cmd_ci() -> anyhow::Result<()> {
    run("cargo", &["fmt", "--all", "--", "--check"])?;
    run(
        "cargo",
        &["clippy", "--all-targets", "--all-features", "--", "-D", "warnings"],
    )?;
    run("cargo", &["test", "--workspace"])?;
    run("cargo", &["run", "-p", "xtask", "--", "schema"])?;
    Ok(())
}

fn cmd_mutants(args: Vec<String>) -> anyhow::Result<()> {
    let mut cmd = std::process::Command::new("cargo");
    cmd.arg("mutants")
        .args(["--package", "uibench-domain", "--package", "uibench-app"])
        .args(args);
    let status = cmd.status().context("running cargo mutants")?;
    if !status.success() {
        anyhow::bail!("cargo mutants failed: {status}");
    }
    Ok(())
}

fn run(bin: &str, args: &[&str]) -> anyhow::Result<()> {
    let status = std::process::Command::new(bin)
        .args(args)
        .status()
        .with_context(|| format!("running {bin} {}", args.join(" ")))?;
    if !status.success() {
        anyhow::bail!("{bin} {} failed: {status}", args.join(" "));
    }
    Ok(())
}

fn schemas() -> Vec<(String, Schema)> {
    vec![
        (
            "uibench.message.v1.schema.json".to_string(),
            schema_for!(uibench_types::HarnessMessage),
        ),
        (
            "uibench.report.v1.schema.json".to_string(),
            schema_for!(uibench_types::Report),
        ),
        (
            format!("{TABLE_SCHEMA_V1}.schema.json"),
            schema_for!(uibench_types::ComparisonOutcome),
        ),
        (
            format!("{CONFIG_SCHEMA_V1}.schema.json"),
            schema_for!(uibench_types::ConfigFile),
        ),
    ]
}

fn cmd_schema(out_dir: &Path, check: bool) -> anyhow::Result<()> {
    if !check {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("create dir {}", out_dir.display()))?;
    }

    let mut stale = Vec::new();
    for (name, schema) in schemas() {
        let path = out_dir.join(&name);
        let mut json = serde_json::to_vec_pretty(&schema)?;
        json.push(b'\n');

        if check {
            let current = fs::read(&path).unwrap_or_default();
            if current != json {
                stale.push(name);
            }
        } else {
            fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        }
    }

    if !stale.is_empty() {
        anyhow::bail!(
            "schemas out of date (run `cargo run -p xtask -- schema`): {}",
            stale.join(", ")
        );
    }
    Ok(())
}
