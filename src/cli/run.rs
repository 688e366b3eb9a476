// SPDX-License-Identifier: Apache-2.0

use crate::backend::Mode;
use crate::bridge::{Call, Stdout};
use crate::keep::Keep;

use std::path::PathBuf;

use clap::Args;
use log::info;

/// Signature policy fixed at build time.
#[cfg(debug_assertions)]
const MODE: Mode = Mode::Debug;
#[cfg(not(debug_assertions))]
const MODE: Mode = Mode::Production;

/// Load a keep image, exercise the trusted library, tear the keep down.
#[derive(Args, Debug)]
pub struct Options {
    #[clap(flatten)]
    backend: super::BackendOptions,

    /// Path of the signed keep image to load
    #[clap(value_name = "IMAGE", default_value = "keep.img", parse(from_os_str))]
    image: PathBuf,
}

impl Options {
    pub fn execute(self) -> anyhow::Result<()> {
        let backend = self.backend.pick()?;
        let keep = Keep::new(backend);

        let id = match keep.acquire(&self.image, MODE) {
            Ok(id) => id,
            Err(diagnosis) => {
                println!("{}", diagnosis);
                std::process::exit(1);
            }
        };
        info!("keep {} live on {} from {:?}", id, backend.name(), self.image);

        let ok = match keep.invoke(Call::Exercise, &Stdout) {
            Ok(()) => true,
            Err(diagnosis) => {
                println!("{}", diagnosis);
                false
            }
        };

        // The keep is torn down whatever the call did. A destroy
        // failure is a leak warning, not a verdict on completed work,
        // so it is reported without touching the exit code.
        if let Err(diagnosis) = keep.release() {
            println!("{}", diagnosis);
        }

        if ok {
            println!("Info: keep returned successfully.");
        }

        std::process::exit(if ok { 0 } else { 1 });
    }
}
