//! confmig command-line front end
//!
//! Reads a configuration (file or stdin), runs one migration plan and writes
//! the converted configuration plus its change log. Files are only written
//! once the whole conversion has succeeded.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use confmig_document::{DocumentFormat, Indent};
use confmig_engine::{Migrator, Plan, PlanKind, Settings, Transition};
use tempfile::NamedTempFile;

/// Standard streams used by [`run`]
pub struct Streams<'a> {
    /// Input when no file is given
    pub stdin: &'a mut dyn Read,
    /// Converted output when no file is given
    pub stdout: &'a mut dyn Write,
    /// Change log when no file is given
    pub stderr: &'a mut dyn Write,
}

/// Command-line definition
#[must_use]
pub fn command() -> Command {
    let transitions: Vec<&'static str> = Transition::ALL.iter().map(|t| t.as_str()).collect();

    Command::new("confmig")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate Centrifugo configuration between schema versions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit diagnostics as JSON lines"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a configuration file or env file")
                .arg(
                    Arg::new("transition")
                        .long("transition")
                        .short('t')
                        .value_parser(transitions.clone())
                        .required_unless_present("plan")
                        .help("Built-in migration to run"),
                )
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with("transition")
                        .help("Run a migration plan file instead of a built-in one"),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .value_parser(value_parser!(PathBuf))
                        .help("Input file; stdin when absent or '-'"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(["json", "yaml", "toml"])
                        .help("Document format; detected from the input extension, else JSON"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file; stdout when absent"),
                )
                .arg(
                    Arg::new("log")
                        .long("log")
                        .value_parser(value_parser!(PathBuf))
                        .help("Change log file (JSON array); stderr when absent"),
                )
                .arg(
                    Arg::new("settings")
                        .long("settings")
                        .value_parser(value_parser!(PathBuf))
                        .help("Tool settings TOML file"),
                )
                .arg(
                    Arg::new("tab")
                        .long("tab")
                        .action(ArgAction::SetTrue)
                        .help("Indent JSON output with tabs"),
                ),
        )
        .subcommand(Command::new("transitions").about("List built-in migrations"))
        .subcommand(
            Command::new("show-plan")
                .about("Print the data of a built-in migration")
                .arg(
                    Arg::new("transition")
                        .required(true)
                        .value_parser(transitions)
                        .help("Built-in migration"),
                ),
        )
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default `warn`
pub fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    // A subscriber may already be installed when embedded in tests.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Parse arguments and run
///
/// # Errors
/// Invalid arguments, unreadable files, and failed conversions.
pub fn run<I, T>(args: I, streams: Streams<'_>) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    dispatch(&matches, streams)
}

/// Run already-parsed arguments
///
/// # Errors
/// As [`run`].
pub fn dispatch(matches: &ArgMatches, streams: Streams<'_>) -> Result<()> {
    match matches.subcommand() {
        Some(("convert", args)) => convert(args, streams),
        Some(("transitions", _)) => list_transitions(streams.stdout),
        Some(("show-plan", args)) => {
            let transition = parse_transition(args)?;
            streams.stdout.write_all(transition.source().as_bytes())?;
            Ok(())
        }
        _ => bail!("no subcommand given"),
    }
}

fn parse_transition(args: &ArgMatches) -> Result<Transition> {
    let name = args
        .get_one::<String>("transition")
        .context("transition is required")?;
    Ok(name.parse()?)
}

fn list_transitions(out: &mut dyn Write) -> Result<()> {
    for transition in Transition::ALL {
        let plan = transition.plan()?;
        writeln!(
            out,
            "{:<10} {} -> {} ({}, {} mappings, {} steps)",
            transition.as_str(),
            plan.from,
            plan.to,
            plan.kind,
            plan.mappings.len(),
            plan.steps.len()
        )?;
    }
    Ok(())
}

fn load_settings(args: &ArgMatches) -> Result<Settings> {
    let mut settings = match args.get_one::<PathBuf>("settings") {
        Some(path) => Settings::from_toml_file(path)?,
        None => Settings::default(),
    }
    .with_env_overrides();
    if args.get_flag("tab") {
        settings = settings.with_indent(Indent::Tab);
    }
    Ok(settings)
}

fn load_plan(args: &ArgMatches) -> Result<Plan> {
    match args.get_one::<PathBuf>("plan") {
        Some(path) => Ok(Plan::from_file(path)?),
        None => Ok(parse_transition(args)?.plan()?),
    }
}

fn input_path(args: &ArgMatches) -> Option<&Path> {
    args.get_one::<PathBuf>("input")
        .map(PathBuf::as_path)
        .filter(|p| *p != Path::new("-"))
}

fn detect_format(args: &ArgMatches) -> Result<DocumentFormat> {
    if let Some(name) = args.get_one::<String>("format") {
        return Ok(name.parse()?);
    }
    Ok(input_path(args)
        .and_then(DocumentFormat::from_path)
        .unwrap_or(DocumentFormat::Json))
}

fn convert(args: &ArgMatches, streams: Streams<'_>) -> Result<()> {
    let settings = load_settings(args)?;
    let plan = load_plan(args)?;
    let format = detect_format(args)?;

    let text = match input_path(args) {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?,
        None => {
            let mut text = String::new();
            streams.stdin.read_to_string(&mut text)?;
            text
        }
    };

    let source = match plan.kind {
        PlanKind::Env => "env".to_string(),
        PlanKind::Document => format.to_string(),
    };
    tracing::debug!(plan = %plan.name, %source, "converting");

    let conversion = Migrator::new(settings)
        .convert_with_plan(&text, format, &plan)
        .with_context(|| format!("{} -> {} conversion failed", plan.from, plan.to))?;

    let mut output = conversion.output;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    let log = conversion.log.to_json_pretty() + "\n";

    let output_path = args.get_one::<PathBuf>("output");
    let log_path = args.get_one::<PathBuf>("log");
    let staged_output = output_path.map(|p| stage(p, &output)).transpose()?;
    let staged_log = log_path.map(|p| stage(p, &log)).transpose()?;

    match (log_path, staged_log) {
        (Some(path), Some(file)) => commit(file, path)?,
        _ => streams.stderr.write_all(log.as_bytes())?,
    }
    match (output_path, staged_output) {
        (Some(path), Some(file)) => commit(file, path)?,
        _ => streams.stdout.write_all(output.as_bytes())?,
    }
    Ok(())
}

/// Write `contents` next to `path` without touching `path` itself
fn stage(path: &Path, contents: &str) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).with_context(|| format!("cannot write {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.flush())
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(file)
}

fn commit(file: NamedTempFile, path: &Path) -> Result<()> {
    file.persist(path)
        .map(|_| ())
        .with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn transition_or_plan_required() {
        let err = command()
            .try_get_matches_from(["confmig", "convert"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn transition_and_plan_conflict() {
        let err = command()
            .try_get_matches_from(["confmig", "convert", "-t", "v5-v6", "--plan", "p.toml"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn unknown_transition_rejected() {
        let err = command()
            .try_get_matches_from(["confmig", "convert", "-t", "v1-v2"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn format_detected_from_extension() {
        let matches = command()
            .try_get_matches_from(["confmig", "convert", "-t", "v5-v6", "-i", "config.yaml"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(detect_format(args).unwrap(), DocumentFormat::Yaml);

        let matches = command()
            .try_get_matches_from(["confmig", "convert", "-t", "v5-v6", "-i", "-"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(detect_format(args).unwrap(), DocumentFormat::Json);
    }
}
