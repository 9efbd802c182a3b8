//! kolink CLI: draw which callee functions each caller file uses.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use kolink_core::config::{RequestDef, RunConfig, DEFAULT_CONFIG_FILE};
use kolink_core::languages::GoAnalyser;
use kolink_core::output::{write_reports, DotFileBackend, GraphvizBackend, RenderBackend};
use kolink_core::pipeline::{self, JobReport};

#[derive(Parser)]
#[command(
    name = "kolink",
    about = "kolink - Graph which exported functions of one Go tree another tree calls"
)]
struct Cli {
    /// Run configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output format of the rendered graphs
    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// Graphviz executable used for PNG output
    #[arg(long, default_value = "dot")]
    dot_binary: PathBuf,

    /// Print one JSON report per job instead of the summary
    #[arg(long)]
    json: bool,

    /// Also write all job reports to this JSON file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Show per-phase timing breakdown and debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Dot,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Run every configured job. Returns whether all of them fully succeeded.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = RunConfig::load(&cli.config)
        .with_context(|| format!("cannot load {}", cli.config.display()))?;
    log::info!("repository: {}", config.repository_name);

    let backend: Box<dyn RenderBackend> = match cli.format {
        Format::Png => Box::new(GraphvizBackend::with_binary(&cli.dot_binary)),
        Format::Dot => Box::new(DotFileBackend),
    };
    let analyser = GoAnalyser::new();

    let mut all_ok = true;
    let mut reports = Vec::new();
    for (i, request) in config.request_defs.iter().enumerate() {
        let outcome = if cli.quiet || cli.json {
            pipeline::run_job(request, &analyser, backend.as_ref(), None)
        } else {
            run_with_progress(request, &analyser, backend.as_ref())
        };

        match outcome {
            Ok(report) => {
                all_ok &= report.is_success();
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else if !cli.quiet {
                    print_summary(request, &report, cli.verbose);
                } else {
                    for failure in &report.failures {
                        eprintln!("{}: {}", failure.target.display(), failure.message);
                    }
                }
                reports.push(report);
            }
            Err(e) => {
                all_ok = false;
                eprintln!(
                    "{} job {} ({}) failed: {e}",
                    style("✗").red().bold(),
                    i + 1,
                    request.out_dir.display()
                );
            }
        }
    }

    if let Some(path) = &cli.report {
        write_reports(&reports, path)
            .with_context(|| format!("cannot write report {}", path.display()))?;
    }
    Ok(all_ok)
}

fn run_with_progress(
    request: &RequestDef,
    analyser: &GoAnalyser,
    backend: &dyn RenderBackend,
) -> kolink_core::Result<JobReport> {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(spinner.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message("Initialising...");
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    let progress: pipeline::ProgressCallback = {
        let pb = pb.clone();
        Box::new(move |_name, label| {
            pb.set_message(label.to_string());
        })
    };

    let start = Instant::now();
    let result = pipeline::run_job(request, analyser, backend, Some(progress));
    pb.finish_and_clear();
    log::debug!("job finished in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    result
}

fn print_summary(request: &RequestDef, report: &JobReport, verbose: bool) {
    let mark = if report.is_success() {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };
    println!(
        "\n{}  {} → {}",
        mark,
        style(request.caller.dir.display()).bold(),
        style(request.callee.dir.display()).bold()
    );
    println!("  {:<14} {}", "Callee files:", report.callee_files);
    println!("  {:<14} {}", "Caller files:", report.caller_files);
    println!("  {:<14} {}", "Edges:", report.edges);
    println!("  {:<14} {}", "Images:", report.rendered.len());

    if verbose {
        println!("\n  Phase Timings:");
        for (phase, secs) in &report.phase_timings {
            println!("    {:<14} {:.1}ms", phase, secs * 1000.0);
        }
    }

    for failure in &report.failures {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            failure.target.display(),
            failure.message
        );
    }
    println!(
        "\n  {} {}",
        style("Output written to:").green(),
        report.out_dir.display()
    );
}
