// SPDX-License-Identifier: Apache-2.0

//! Keep lifecycle.
//!
//! A [`Keep`] owns the process's one keep slot and walks it through
//! `Uninitialized → Live → Terminated`, a one-way trip. The handle is an
//! explicit value owned by the slot and handed to the backend on every
//! outward call; nothing in this crate stores it globally.

use crate::backend::{Backend, KeepId, Mode};
use crate::bridge::{Call, Service};
use crate::diagnose::{diagnose, Diagnosis};
use crate::status::Status;

use std::path::Path;
use std::sync::RwLock;

use log::{debug, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Live(KeepId),
    Terminated,
}

/// The process's keep slot: at most one live keep, never reused.
///
/// All methods take `&self`; the slot is meant to be shared across
/// threads. Lifecycle transitions hold the write half of the state
/// lock and outward calls the read half, so no call overlaps an
/// acquire or release, acquire never races itself, and every thread
/// observes `Terminated` before a later call can be admitted.
pub struct Keep<'a> {
    backend: &'a dyn Backend,
    state: RwLock<State>,
}

impl<'a> Keep<'a> {
    /// Creates an empty slot on `backend`.
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            state: RwLock::new(State::Uninitialized),
        }
    }

    /// Loads the signed image at `image` under `mode` and brings the
    /// keep live.
    ///
    /// Valid only before any other transition; afterwards it is the
    /// documented misuse error. On failure the slot stays
    /// `Uninitialized`, the platform status is diagnosed, and the
    /// caller must not proceed to any outward call.
    pub fn acquire(&self, image: &Path, mode: Mode) -> Result<KeepId, Diagnosis> {
        let mut state = self.state.write().unwrap();

        if *state != State::Uninitialized {
            return Err(diagnose(Status::INVALID_PARAMETER));
        }

        match self.backend.create(image, mode) {
            Ok(id) => {
                debug!("keep {} live on backend {}", id, self.backend.name());
                *state = State::Live(id);
                Ok(id)
            }
            Err(status) => Err(diagnose(status)),
        }
    }

    /// Transfers control into the live keep at the entry point `call`.
    ///
    /// Requests the trusted side makes while it runs arrive on
    /// `service`, synchronously, before this method returns. A success
    /// means the boundary transition worked; whatever the trusted
    /// function computed is its own, call-specific affair. A failure is
    /// diagnosed and fatal to this call; retrying is caller policy.
    pub fn invoke(&self, call: Call, service: &dyn Service) -> Result<(), Diagnosis> {
        let state = self.state.read().unwrap();

        let id = match *state {
            State::Live(id) => id,
            _ => return Err(diagnose(Status::INVALID_KEEP_ID)),
        };

        match self.backend.invoke(id, call, service) {
            Status::SUCCESS => Ok(()),
            status => Err(diagnose(status)),
        }
    }

    /// Destroys the keep and retires the slot.
    ///
    /// The slot is `Terminated` when this returns, whatever the
    /// platform said: the handle must never be used again even when the
    /// destroy primitive failed. Such a failure is diagnosed and
    /// returned as a leak warning. Before the keep was ever live this
    /// is the documented no-op error and the state does not change.
    pub fn release(&self) -> Result<(), Diagnosis> {
        let mut state = self.state.write().unwrap();

        let id = match *state {
            State::Live(id) => id,
            _ => return Err(diagnose(Status::INVALID_KEEP_ID)),
        };

        *state = State::Terminated;

        match self.backend.destroy(id) {
            Status::SUCCESS => {
                debug!("keep {} destroyed", id);
                Ok(())
            }
            status => {
                warn!("keep {} leaked: destroy reported 0x{:04x}", id, status);
                Err(diagnose(status))
            }
        }
    }
}
