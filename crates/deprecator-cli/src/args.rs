//! Command line parsing
//!
//! `--message` swallows every argument after it, so it is split off before
//! clap sees the rest of the command line.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use deprecator_core::{ArchiveJob, DeprecatorConfig, DeprecatorError};
use deprecator_transform::KindFilter;
use std::ffi::OsString;
use std::path::PathBuf;

/// Flag whose value is every remaining argument
pub const MESSAGE_FLAG: &str = "--message";

/// Why the command line was rejected
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    /// Usage error, help or version request from clap
    #[error(transparent)]
    Clap(#[from] clap::Error),

    /// Well-formed flags that do not describe a runnable set of jobs
    #[error(transparent)]
    Invalid(#[from] DeprecatorError),
}

/// A fully parsed command line
#[derive(Debug, Clone)]
pub struct Invocation {
    pub jobs: Vec<ArchiveJob>,
    pub config: DeprecatorConfig,
    /// Print the run summary as JSON on stdout
    pub json: bool,
}

/// The `deprecator` command, without `--message`
#[must_use]
pub fn command() -> Command {
    Command::new("deprecator")
        .version(deprecator_core::VERSION)
        .about("Marks every declaration in Java archives as deprecated")
        .override_usage("deprecator [OPTIONS] <PATH>... [--message <WORDS>...]")
        .after_help("--message <WORDS>...  Deprecation text for source archives; takes every remaining argument")
        .arg(
            Arg::new("pairs")
                .long("pairs")
                .action(ArgAction::SetTrue)
                .help("Read paths as <input> <output> pairs instead of deriving outputs"),
        )
        .arg(
            Arg::new("parallelism")
                .long("parallelism")
                .value_name("N")
                .value_parser(value_parser!(u64).range(1..))
                .help("Number of archives processed at once [default: 4]"),
        )
        .arg(
            Arg::new("classpath")
                .long("classpath")
                .value_name("ARCHIVE")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("Extra archive consulted for the type hierarchy of compiled archives"),
        )
        .arg(
            Arg::new("kinds")
                .long("kinds")
                .value_name("KINDS")
                .value_parser(|value: &str| value.parse::<KindFilter>())
                .help("Comma-separated declaration kinds to mark in source archives"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the run summary as JSON"),
        )
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("Archives to deprecate"),
        )
}

/// Split `args` at the first `--message`, joining everything after it
///
/// The first element is the program name and is never treated as the flag.
///
/// # Errors
/// Returns an error if `--message` has no words or a word is not UTF-8
pub fn split_message<I, T>(args: I) -> Result<(Vec<OsString>, Option<String>), DeprecatorError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let Some(at) = args.iter().skip(1).position(|arg| arg == MESSAGE_FLAG) else {
        return Ok((args, None));
    };

    let words = args
        .split_off(at + 1)
        .into_iter()
        .skip(1)
        .map(|word| {
            word.into_string().map_err(|word| {
                DeprecatorError::InvalidArgument(format!("message word is not UTF-8: {}", word.to_string_lossy()))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if words.is_empty() {
        return Err(DeprecatorError::InvalidArgument(format!("{MESSAGE_FLAG} requires a value")));
    }
    Ok((args, Some(words.join(" "))))
}

/// Parse a full command line, program name first
///
/// # Errors
/// Returns [`ArgsError::Clap`] for usage errors and help or version requests,
/// [`ArgsError::Invalid`] when the arguments describe no runnable jobs
pub fn parse<I, T>(args: I) -> Result<Invocation, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let (args, message) = split_message(args)?;
    let matches = command().try_get_matches_from(args)?;
    Ok(from_matches(&matches, message)?)
}

fn from_matches(matches: &ArgMatches, message: Option<String>) -> Result<Invocation, DeprecatorError> {
    let mut config = DeprecatorConfig::new();

    if let Some(&parallelism) = matches.get_one::<u64>("parallelism") {
        let parallelism = usize::try_from(parallelism)
            .map_err(|_| DeprecatorError::InvalidArgument(format!("parallelism {parallelism} is too large")))?;
        config = config.with_parallelism(parallelism);
    }
    if let Some(message) = message {
        config = config.with_message(message);
    }
    if let Some(kinds) = matches.get_one::<KindFilter>("kinds") {
        config = config.with_kinds(kinds.clone());
    }
    config = config.with_classpath(path_values(matches, "classpath"));

    let paths = path_values(matches, "paths");
    let jobs = if matches.get_flag("pairs") {
        pair_jobs(paths)?
    } else {
        paths.into_iter().map(ArchiveJob::derived).collect()
    };
    if jobs.is_empty() {
        return Err(DeprecatorError::NoJobs);
    }

    Ok(Invocation {
        jobs,
        config,
        json: matches.get_flag("json"),
    })
}

fn path_values(matches: &ArgMatches, id: &str) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn pair_jobs(paths: Vec<PathBuf>) -> Result<Vec<ArchiveJob>, DeprecatorError> {
    if paths.len() % 2 != 0 {
        return Err(DeprecatorError::InvalidArgument(format!(
            "--pairs expects <input> <output> pairs, got {} paths",
            paths.len()
        )));
    }
    let mut paths = paths.into_iter();
    let mut jobs = Vec::new();
    while let (Some(input), Some(output)) = (paths.next(), paths.next()) {
        jobs.push(ArchiveJob::explicit(input, output));
    }
    Ok(jobs)
}
