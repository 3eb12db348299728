//! Canopy CLI - run one spatial-data primitive
//!
//! Usage: canopy <PRIMITIVE> <inputs> <output> <params>
//!
//! Exactly one JSON envelope is written to stdout; the exit code is 0 on
//! success and 1 on failure. Diagnostics go to stderr.

use std::io::{self, Write};
use std::process;

use clap::error::ErrorKind;
use clap::Parser;

use canopy::application::{execute, lookup, primitive_failure, Envelope, PrimitiveContext};
use canopy::cli::Cli;
use canopy::config::{Config, ConfigWarning};
use canopy::error::CanopyError;
use canopy::infrastructure::LocalGeoEngine;
use canopy::logging;

fn main() {
    let project_root = std::env::current_dir().ok();
    let (config, config_warnings) = Config::load_or_default(project_root.as_deref());
    logging::init(config.output.verbosity);

    let envelope = match Cli::try_parse() {
        Ok(cli) => run(&cli, &config, &config_warnings),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => usage_failure(&err.to_string(), &config_warnings),
    };

    let mut stdout = io::stdout().lock();
    if let Err(err) = envelope.emit(&mut stdout) {
        let _ = writeln!(io::stderr(), "canopy: failed to write envelope: {}", err);
        process::exit(1);
    }
    process::exit(envelope.exit_code());
}

fn run(cli: &Cli, config: &Config, config_warnings: &[ConfigWarning]) -> Envelope {
    let engine = LocalGeoEngine::new();
    let ctx = PrimitiveContext::new(&engine, config).with_config_warnings(config_warnings);

    let name = cli.command.primitive_name();
    match lookup(name) {
        Some(primitive) => execute(primitive.as_ref(), &ctx, &cli.command.invocation().raw_args()),
        None => usage_failure(&format!("unknown primitive '{}'", name), config_warnings),
    }
}

fn usage_failure(message: &str, config_warnings: &[ConfigWarning]) -> Envelope {
    let err = CanopyError::usage(message.trim());
    let warnings: Vec<_> = config_warnings
        .iter()
        .map(|w| canopy::Warning::new(canopy::Level::Warning, w.to_string()))
        .collect();
    primitive_failure(err.code(), err.to_string(), warnings)
}
