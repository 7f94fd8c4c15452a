use anyhow::Context;
use deprecator_cli::{init_tracing, parse, ArgsError, Invocation, STARTUP_FAILURE};
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();

    let invocation = match parse(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(ArgsError::Clap(e)) => e.exit(),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(STARTUP_FAILURE);
        }
    };

    match run(invocation) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(STARTUP_FAILURE)
        }
    }
}

fn run(invocation: Invocation) -> anyhow::Result<ExitCode> {
    let Invocation { jobs, config, json } = invocation;
    let summary = deprecator_core::run(jobs, config).context("failed to start the worker pool")?;

    if json {
        println!("{}", summary.to_json().context("failed to serialize the run summary")?);
    }
    for failed in summary.jobs.iter().filter(|outcome| !outcome.is_success()) {
        eprintln!(
            "failed: {}: {}",
            failed.input.display(),
            failed.error().unwrap_or_default()
        );
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
