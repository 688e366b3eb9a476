// SPDX-License-Identifier: Apache-2.0

use crate::backend::{Datum, BACKENDS};

use std::fmt::{self, Formatter};
use std::ops::Deref;

use clap::Args;
use serde::Serialize;

/// Show details about backend support on this system
#[derive(Args, Debug)]
pub struct Options {
    /// Emit JSON rather than human-readable output
    #[clap(short, long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    version: &'static str,
    backends: Vec<BackendReport>,
}

#[derive(Serialize)]
struct BackendReport {
    name: &'static str,
    data: Vec<Datum>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use colorful::*;

        fn get_icon(is_atty: bool, pass: bool) -> String {
            match is_atty {
                true => match pass {
                    true => "✔".green().to_string(),
                    false => "✗".red().to_string(),
                },
                false => match pass {
                    true => "✔".into(),
                    false => "✗".into(),
                },
            }
        }

        let is_atty = atty::is(atty::Stream::Stdout);

        writeln!(f, "bailey version {}", self.version)?;

        for backend in &self.backends {
            let pass = backend.data.iter().all(|x| x.pass);
            let icon = get_icon(is_atty, pass);

            writeln!(f, "{} Backend: {}", icon, backend.name)?;

            for datum in &backend.data {
                let icon = get_icon(is_atty, datum.pass);
                write!(f, "  {} {}", icon, datum.name)?;

                if let Some(ref info) = datum.info {
                    write!(f, ": {}", info)?;
                }
                writeln!(f)?;
            }

            for datum in &backend.data {
                if let Some(mesg) = datum.mesg.as_ref() {
                    writeln!(f, "\n  {}\n", mesg)?;
                }
            }
        }
        Ok(())
    }
}

impl Options {
    /// Display nicely-formatted info about each backend
    pub fn execute(self) -> anyhow::Result<()> {
        let backends = BACKENDS
            .deref()
            .iter()
            .map(|b| BackendReport {
                name: b.name(),
                data: b.data(),
            })
            .collect();

        let report = Report {
            version: env!("CARGO_PKG_VERSION"),
            backends,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", report);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Options;

    #[test]
    fn info() {
        Options { json: true }.execute().unwrap();
        Options { json: false }.execute().unwrap();
    }
}
