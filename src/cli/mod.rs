// SPDX-License-Identifier: Apache-2.0

//! Command line surface.

mod info;
mod run;

use crate::backend::{Backend, BACKENDS};

use std::ops::Deref;
use std::str::FromStr;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use log::info;

/// Host runtime for hardware-isolated keeps
///
/// bailey loads a signed keep image into an isolated execution context,
/// drives calls across the isolation boundary, services the requests
/// the keep makes back to the host, and always tears the keep down
/// again.
#[derive(Parser, Debug)]
#[clap(version)]
pub struct Options {
    /// Logging options
    #[clap(flatten)]
    logger: LogOptions,

    /// Subcommands (with their own options)
    #[clap(subcommand)]
    cmd: Subcommands,
}

impl Options {
    /// Initializes logging and dispatches the chosen subcommand.
    pub fn execute(self) -> anyhow::Result<()> {
        self.logger.init();

        info!("logging initialized!");
        info!("CLI opts: {:?}", self);

        self.cmd.dispatch()
    }
}

/// `bailey` subcommands and their options/arguments.
#[derive(Subcommand, Debug)]
enum Subcommands {
    Run(run::Options),
    Info(info::Options),
}

impl Subcommands {
    fn dispatch(self) -> anyhow::Result<()> {
        match self {
            Self::Run(cmd) => cmd.execute(),
            Self::Info(cmd) => cmd.execute(),
        }
    }
}

/// Common backend options
#[derive(Args, Debug)]
pub struct BackendOptions {
    /// Set which backend to use
    #[clap(long, env = "BAILEY_BACKEND")]
    backend: Option<String>,
}

impl BackendOptions {
    /// Picks the named backend, or the first one the platform supports.
    pub fn pick(&self) -> anyhow::Result<&'static dyn Backend> {
        if let Some(ref name) = self.backend {
            BACKENDS
                .deref()
                .iter()
                .find(|b| b.have() && b.name() == name)
                .ok_or_else(|| anyhow!("Keep backend {:?} is unsupported.", name))
        } else {
            BACKENDS.deref().iter().find(|b| b.have()).ok_or_else(|| {
                anyhow!(
                    "No supported backend found. Please check your machine with `$ bailey info`."
                )
            })
        }
        .map(|b| &**b)
    }
}

/// Common logging / output options
#[derive(Args, Debug)]
pub struct LogOptions {
    /// Increase log verbosity. Pass multiple times for more log output.
    ///
    /// By default we only show error messages. Passing `-v` will show
    /// warnings, `-vv` adds info, `-vvv` for debug, and `-vvvv` for
    /// trace.
    #[clap(long = "verbose", short = 'v', parse(from_occurrences))]
    verbosity: u8,

    /// Set fancier logging filters.
    ///
    /// This is equivalent to the `RUST_LOG` environment variable.
    /// For more info, see the `env_logger` crate documentation.
    #[clap(long = "log-filter", env = "BAILEY_LOG")]
    log_filter: Option<String>,

    /// Set log output target ("stderr", "stdout")
    #[clap(long, default_value = "stderr")]
    log_target: LogTarget,
}

impl LogOptions {
    /// Build & initialize a global logger using env_logger::Builder.
    /// As with Builder::init(), this will panic if called more than
    /// once, or if another library has already initialized a global
    /// logger.
    pub fn init(&self) {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(self.verbosity_level())
            .parse_filters(self.log_filter.as_ref().unwrap_or(&"".to_owned()))
            .target(self.log_target.into())
            .init();
    }

    /// Convert the -vvv.. count into a log level.
    fn verbosity_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Represents targets for debug logging.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
enum LogTarget {
    Stdout,
    Stderr,
}

/// Convert a str to a LogTarget. This is how Clap parses CLI args.
impl FromStr for LogTarget {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(anyhow!("unknown log target {:?}", s)),
        }
    }
}

/// Convert our LogTarget to env_logger's Target
impl From<LogTarget> for env_logger::Target {
    fn from(t: LogTarget) -> Self {
        match t {
            LogTarget::Stdout => Self::Stdout,
            LogTarget::Stderr => Self::Stderr,
        }
    }
}
