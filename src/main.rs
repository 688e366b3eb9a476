// SPDX-License-Identifier: Apache-2.0

//! Command line entry point for the bailey host runtime.

#![deny(clippy::all)]
#![warn(rust_2018_idioms)]

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let app = bailey::cli::Options::parse();
    app.execute()
}
