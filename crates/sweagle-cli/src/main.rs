use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use sweagle_api::TracingListener;
use sweagle_core::{
    logging,
    workspace_root,
    BuildResult,
    RunReport,
    StepFileLoader,
    StepRunner,
};
use tokio_util::sync::CancellationToken;

const DEBUG_ENV: &str = "SWEAGLE_DEBUG";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    step_file: Option<PathBuf>,
    json: bool,
    check_only: bool,
}

fn usage(program: &str) -> String {
    format!("Usage: {program} [--check] [--json] [STEP_FILE]")
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let program = args.first().map(String::as_str).unwrap_or("sweagle-step");
    let mut parsed = CliArgs::default();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "--check" => parsed.check_only = true,
            "-h" | "--help" => return Err(usage(program)),
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown option {flag}\n{}", usage(program)))
            }
            path if parsed.step_file.is_none() => parsed.step_file = Some(PathBuf::from(path)),
            _ => return Err(usage(program)),
        }
    }

    Ok(parsed)
}

fn is_truthy(value: Option<&String>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
}

fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to render run report")?
        );
        return Ok(());
    }

    for record in &report.records {
        println!(
            "[{}] {} {:?} ({} ms)",
            record.index,
            record.action,
            record.outcome,
            record.duration_ms()
        );
    }
    println!("{}", report.summary());
    Ok(())
}

async fn run(args: CliArgs, env: HashMap<String, String>) -> anyhow::Result<BuildResult> {
    let workspace = workspace_root(&env);
    let path = StepFileLoader::discover_config_path(args.step_file.as_deref(), &env, &workspace);
    tracing::info!("Using step file {}", path.display());

    let config = StepFileLoader::load(&path, &env).context("Failed to load step file")?;

    if args.check_only {
        println!("{}: {}", path.display(), config.validate().summary());
        return Ok(BuildResult::Success);
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling the running step");
            on_signal.cancel();
        }
    });

    let runner = StepRunner::new(&config, &env, Arc::new(TracingListener), cancel)
        .context("Failed to set up Sweagle client")?;
    let report = runner.run(&config.steps).await;

    print_report(&report, args.json)?;
    if let Some(aborted) = report.aborted() {
        tracing::error!("Build failed at step {} ({})", aborted.index, aborted.action);
    }

    Ok(report.result)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let env: HashMap<String, String> = env::vars().collect();
    if let Err(e) = logging::init(is_truthy(env.get(DEBUG_ENV))) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(args, env).await {
        Ok(BuildResult::Success) => ExitCode::SUCCESS,
        Ok(BuildResult::Failure) => ExitCode::from(1),
        Err(e) => {
            eprintln!("✗ {e:#}");
            ExitCode::from(1)
        }
    }
}
