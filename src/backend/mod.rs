// SPDX-License-Identifier: Apache-2.0

//! The platform seam.
//!
//! A [`Backend`] is the driver for one isolation technology. It is the
//! only component that talks to the platform; everything above it deals
//! in [`KeepId`]s and [`Status`](crate::status::Status) codes.

pub mod probe;
pub mod sim;

use crate::bridge::{Call, Service};
use crate::status::Status;

use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Opaque identifier naming one live keep on a backend.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct KeepId(u64);

impl KeepId {
    /// Wraps a raw identifier handed out by a backend.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for KeepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signature policy a keep is created under.
///
/// Passed explicitly into every create call; nothing fixes it globally.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Relaxed signature checks; the keep may be debugged in process.
    Debug,
    /// Strict signature verification; debugging is refused.
    Production,
}

/// A platform driver for one isolation technology.
pub trait Backend: Sync + Send {
    /// The name of the backend
    fn name(&self) -> &'static str;

    /// Whether or not the platform has support for this backend
    fn have(&self) -> bool {
        !self.data().iter().fold(false, |e, d| e | !d.pass)
    }

    /// The probes that show platform support for the backend
    fn data(&self) -> Vec<Datum>;

    /// Create a keep from the signed image at `image` under `mode`
    fn create(&self, image: &Path, mode: Mode) -> Result<KeepId, Status>;

    /// Transfer control into one of the keep's entry points
    ///
    /// Requests the keep makes while running are serviced through
    /// `service` on the calling thread. The status describes the
    /// boundary transition only, not the trusted function's outcome.
    fn invoke(&self, id: KeepId, call: Call, service: &dyn Service) -> Status;

    /// Destroy a keep and release its protected memory
    fn destroy(&self, id: KeepId) -> Status;
}

/// One support probe shown by `bailey info`.
#[derive(Debug, Serialize)]
pub struct Datum {
    /// The name of this datum.
    pub name: String,

    /// Whether the datum indicates support for the platform or not.
    pub pass: bool,

    /// Short additional information to display to the user.
    pub info: Option<String>,

    /// Longer explanatory message on how to resolve problems.
    pub mesg: Option<String>,
}

/// All compiled-in backends, in preference order.
pub static BACKENDS: Lazy<Vec<Box<dyn Backend>>> =
    Lazy::new(|| vec![Box::new(sim::Backend::default())]);
