//! CLI entry point for auditgate.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `auditgate-app` crate.

use anyhow::Context;
use auditgate_app::{
    AuditInput, ExplainOutput, check_config, format_config_check, format_explanation,
    format_not_found, parse_report_json, render_annotations, render_markdown, run_audit,
    run_explain, runtime_error_report, verdict_exit_code, write_report, write_text,
};
use auditgate_repo::{CargoAudit, GitWorkspace, GithubSource, RepoFilter};
use auditgate_settings::{EffectiveConfig, Overrides};
use auditgate_types::parse_iso_date;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use time::{Date, OffsetDateTime};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "AUDITGATE_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "auditgate",
    version,
    about = "Run cargo-audit across an organization's Rust repositories with time-bounded exceptions"
)]
struct Cli {
    /// Path to auditgate config TOML.
    #[arg(long, global = true, default_value = "auditgate.toml")]
    config: Utf8PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Audit every selected repository and write artifacts.
    Run {
        /// File holding a GitHub API token.
        #[arg(long)]
        token_file: Utf8PathBuf,

        /// Only audit the repository with this name.
        repo: Option<String>,

        /// Evaluate exception expiry against this date (YYYY-MM-DD) instead of today (UTC).
        #[arg(long, value_parser = parse_date_arg)]
        today: Option<Date>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/auditgate/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/auditgate/comment.md")]
        markdown_out: Utf8PathBuf,

        /// Override the checkout directory.
        #[arg(long)]
        work_dir: Option<String>,

        /// Override the cargo binary.
        #[arg(long)]
        cargo: Option<String>,

        /// Fail the run when an exception matched nothing.
        #[arg(long)]
        fail_on_unused_exceptions: bool,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/auditgate/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/auditgate/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// The check_id (e.g., "audit.exceptions") or code (e.g., "expired_exception") to explain.
        identifier: String,
    },

    /// Validate the config and list exceptions with their status.
    CheckConfig {
        /// Evaluate exception expiry against this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date_arg)]
        today: Option<Date>,
    },

    /// Install cargo-audit with `cargo install`.
    InstallScanner {
        /// The cargo binary to install with.
        #[arg(long, default_value = "cargo")]
        cargo: String,
    },
}

fn parse_date_arg(s: &str) -> Result<Date, String> {
    parse_iso_date(s).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.cmd {
        Commands::Run {
            token_file,
            repo,
            today,
            report_out,
            write_markdown,
            markdown_out,
            work_dir,
            cargo,
            fail_on_unused_exceptions,
        } => {
            let args = RunArgs {
                token_file,
                repo,
                today: today.unwrap_or_else(|| OffsetDateTime::now_utc().date()),
                report_out,
                write_markdown,
                markdown_out,
                overrides: Overrides {
                    work_dir,
                    cargo,
                    api_url: None,
                    fail_on_unused_exceptions: fail_on_unused_exceptions.then_some(true),
                },
            };
            cmd_run(&cli.config, args)
        }
        Commands::Md { report, output } => cmd_md(&report, output.as_deref()),
        Commands::Annotations { report, max } => cmd_annotations(&report, max),
        Commands::Explain { identifier } => cmd_explain(&identifier),
        Commands::CheckConfig { today } => cmd_check_config(
            &cli.config,
            today.unwrap_or_else(|| OffsetDateTime::now_utc().date()),
        ),
        Commands::InstallScanner { cargo } => CargoAudit::new(cargo).install(),
    }
}

struct RunArgs {
    token_file: Utf8PathBuf,
    repo: Option<String>,
    today: Date,
    report_out: Utf8PathBuf,
    write_markdown: bool,
    markdown_out: Utf8PathBuf,
    overrides: Overrides,
}

fn load_config(path: &Utf8Path, overrides: Overrides) -> anyhow::Result<EffectiveConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read config: {}", path))?;
    let cfg = auditgate_settings::parse_config_toml(&text).context("parse config")?;
    let resolved = auditgate_settings::resolve_config(cfg, overrides).context("resolve config")?;
    Ok(resolved.effective)
}

fn read_token(path: &Utf8Path) -> anyhow::Result<String> {
    let token = std::fs::read_to_string(path)
        .with_context(|| format!("read token file: {}", path))?
        .trim()
        .to_string();
    if token.is_empty() {
        anyhow::bail!("token file {} is empty", path);
    }
    Ok(token)
}

fn cmd_run(config_path: &Utf8Path, args: RunArgs) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let config = load_config(config_path, args.overrides.clone())?;
        let token = read_token(&args.token_file)?;

        let source = GithubSource::new(
            &config.api_url,
            token,
            RepoFilter {
                accounts: config.accounts.clone(),
                language: config.language.clone(),
                skip_repos: config.skip_repos.clone(),
            },
        )?;
        let workspace = GitWorkspace::new(config.work_dir.as_str());
        let scanner = CargoAudit::new(&config.cargo);

        let output = run_audit(
            AuditInput {
                config: &config,
                today: args.today,
                single_repo: args.repo.as_deref(),
            },
            &source,
            &workspace,
            &scanner,
        )?;

        write_report(&args.report_out, &output.report).context("write report json")?;
        if args.write_markdown {
            write_text(&args.markdown_out, &render_markdown(&output.report))
                .context("write markdown")?;
        }

        if !output.unused_exceptions.is_empty() {
            println!("Unnecessary exceptions (matched no advisory):");
            for rule in &output.unused_exceptions {
                println!("  {}", rule.key);
            }
        }
        if !output.failing_repositories.is_empty() {
            println!("\nThe following repositories have problems:");
            for name in &output.failing_repositories {
                println!("    {name}");
            }
        }

        Ok(verdict_exit_code(output.report.verdict))
    })();

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"), args.today);
            if let Err(write_err) = write_report(&args.report_out, &report) {
                tracing::warn!("could not write error report: {write_err:#}");
            }
            eprintln!("auditgate error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&report);

    match output {
        Some(out_path) => write_text(out_path, &md).context("write markdown output")?,
        None => print!("{}", md),
    }

    Ok(())
}

fn cmd_annotations(report_path: &Utf8Path, max: usize) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;

    for annotation in render_annotations(&report, max) {
        println!("{}", annotation);
    }

    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                format_not_found(&identifier, available_check_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}

fn cmd_check_config(config_path: &Utf8Path, today: Date) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("read config: {}", config_path))?;
    let check = check_config(&text, today)?;
    print!("{}", format_config_check(&check));
    Ok(())
}
