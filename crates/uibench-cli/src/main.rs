use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use uibench_adapters::{FsBundleProbe, JsonLinesSource};
use uibench_app::{
    BundleSizeUseCase, ExportFormat, ExportUseCase, LaunchUseCase, ResultsSession, TableFormat,
    load_config, render,
};
use uibench_domain::{ChangeEvent, ResultSet, build_table};
use uibench_types::{ConfigFile, LaunchOptions};

#[derive(Debug, Parser)]
#[command(
    name = "uibench",
    version,
    about = "Compare UI library benchmark reports side by side"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the comparison table from recorded harness messages.
    Table {
        /// JSON-lines files of harness messages (glob patterns allowed). Repeatable.
        #[arg(long, required = true, num_args = 1..)]
        reports: Vec<String>,

        /// Only show test cases whose name contains this (case-sensitive)
        #[arg(long, default_value = "")]
        filter: String,

        /// Output format: markdown, html or json
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Output file path (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Read harness messages as they arrive and re-render the table after each report.
    Watch {
        /// JSON-lines input (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, default_value = "")]
        filter: String,

        /// Output format: markdown, html or json
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Rewritten atomically after every report (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Flatten the comparison into one record per test case and contestant.
    Export {
        /// JSON-lines files of harness messages (glob patterns allowed). Repeatable.
        #[arg(long, required = true, num_args = 1..)]
        reports: Vec<String>,

        #[arg(long, default_value = "")]
        filter: String,

        /// Output format: csv or jsonl
        #[arg(long, default_value = "csv")]
        format: String,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the harness URL to open for every contestant.
    Launch {
        /// Contestant catalogue (TOML)
        #[arg(long)]
        config: PathBuf,

        /// Iterations per test case (overrides the config default)
        #[arg(long)]
        iterations: Option<u32>,

        #[arg(long, default_value_t = false)]
        disable_scu: bool,

        #[arg(long, default_value_t = false)]
        enable_dom_recycling: bool,

        #[arg(long, default_value_t = false)]
        mobile: bool,

        /// Only run test cases whose name contains this
        #[arg(long)]
        test_filter: Option<String>,

        /// Launch this URL instead of the catalogue
        #[arg(long)]
        url: Option<String>,
    },

    /// Print each contestant's total bundle size.
    Sizes {
        /// Contestant catalogue (TOML)
        #[arg(long)]
        config: PathBuf,

        /// Directory relative bundle paths resolve against (defaults to the config's)
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    if let Err(err) = real_main() {
        eprintln!("{err:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Table {
            reports,
            filter,
            format,
            out,
            pretty,
        } => {
            let format = parse_table_format(&format)?;
            let session = load_reports(&reports)?;
            let text = render(&session.table(&filter), format, pretty)?;
            emit(out.as_deref(), &text)
        }

        Command::Watch {
            input,
            filter,
            format,
            out,
        } => {
            let format = parse_table_format(&format)?;
            let reader: Box<dyn BufRead> = match &input {
                Some(path) => Box::new(BufReader::new(
                    fs::File::open(path).with_context(|| format!("open {}", path.display()))?,
                )),
                None => Box::new(BufReader::new(std::io::stdin())),
            };

            let mut session = ResultsSession::new();
            // Show the empty state until the first report arrives.
            emit(out.as_deref(), &render(&session.table(&filter), format, false)?)?;
            session.subscribe(
                move |event: &ChangeEvent, results: &ResultSet| -> anyhow::Result<()> {
                    let text = render(&build_table(results, &filter), format, false)?;
                    debug!(report = event.report_index, "re-rendering table");
                    emit(out.as_deref(), &text)
                },
            );
            let stats = session.consume(JsonLinesSource::new(reader))?;
            info!(
                ingested = stats.ingested,
                ignored = stats.ignored,
                rejected = stats.rejected,
                "input closed"
            );
            Ok(())
        }

        Command::Export {
            reports,
            filter,
            format,
            out,
        } => {
            let format = ExportFormat::from_str(&format)
                .with_context(|| format!("unknown export format {format:?} (csv|jsonl)"))?;
            let session = load_reports(&reports)?;
            let text = ExportUseCase::export(&session.table(&filter), format)?;
            emit(out.as_deref(), &text)
        }

        Command::Launch {
            config,
            iterations,
            disable_scu,
            enable_dom_recycling,
            mobile,
            test_filter,
            url,
        } => {
            let catalogue = read_config(&config)?;
            let options = LaunchOptions {
                iterations: iterations.unwrap_or(catalogue.defaults.iterations),
                disable_scu: disable_scu || catalogue.defaults.disable_scu,
                enable_dom_recycling: enable_dom_recycling
                    || catalogue.defaults.enable_dom_recycling,
                mobile_mode: mobile || catalogue.defaults.mobile_mode,
                test_filter: test_filter.or_else(|| catalogue.defaults.test_filter.clone()),
            };
            if options.iterations == 0 {
                anyhow::bail!("--iterations must be at least 1");
            }

            let plan = LaunchUseCase::plan(&catalogue, &options, url.as_deref())?;
            let mut text = String::new();
            for launch in plan {
                text.push_str(&format!("{}\t{}\n", launch.name, launch.url));
            }
            emit(None, &text)
        }

        Command::Sizes { config, base_dir } => {
            let catalogue = read_config(&config)?;
            let base_dir = base_dir.unwrap_or_else(|| {
                config
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."))
            });
            let sizes = BundleSizeUseCase::new(FsBundleProbe::with_base_dir(base_dir))
                .execute(&catalogue.contestants);

            let mut text = String::new();
            for size in sizes {
                let shown = size.display().unwrap_or_else(|| "-".to_string());
                text.push_str(&format!("{}\t{}\n", size.name, shown));
            }
            emit(None, &text)
        }
    }
}

fn parse_table_format(s: &str) -> anyhow::Result<TableFormat> {
    TableFormat::from_str(s)
        .with_context(|| format!("unknown table format {s:?} (markdown|html|json)"))
}

/// Expand `patterns` and feed every matching file, in order, into one session.
fn load_reports(patterns: &[String]) -> anyhow::Result<ResultsSession> {
    let mut session = ResultsSession::new();
    for path in expand_patterns(patterns)? {
        let file = fs::File::open(&path).with_context(|| format!("open {}", path.display()))?;
        let stats = session
            .consume(JsonLinesSource::new(BufReader::new(file)))
            .with_context(|| format!("read {}", path.display()))?;
        debug!(path = %path.display(), ingested = stats.ingested, "loaded reports");
    }
    Ok(session)
}

fn expand_patterns(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid pattern {pattern:?}"))? {
            paths.push(entry.with_context(|| format!("expand {pattern}"))?);
        }
        if paths.len() == before {
            anyhow::bail!("no report files match {pattern}");
        }
    }
    Ok(paths)
}

fn read_config(path: &Path) -> anyhow::Result<ConfigFile> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    load_config(&text).with_context(|| format!("load {}", path.display()))
}

fn emit(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => write_text(path, text),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }

    atomic_write(path, text.as_bytes())
}

fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));

    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create temp {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp {}", tmp.display()))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
