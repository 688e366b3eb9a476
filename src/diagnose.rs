// SPDX-License-Identifier: Apache-2.0

//! The diagnostic catalog.
//!
//! Maps every platform status code to a human-readable message and an
//! optional remediation hint. The catalog is built once, behind a
//! [`Lazy`], and read-only for the life of the process. Lookup is total:
//! a code the catalog does not know degrades to a synthetic entry
//! instead of failing, so the diagnosis path itself can never fail.

use crate::status::Status;

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use once_cell::sync::Lazy;

struct Entry {
    mesg: &'static str,
    hint: Option<&'static str>,
}

const UNKNOWN: &str = "Unknown error occurred.";

/// Every failure class the platform reports while loading or driving a
/// keep. Codes must be unique; `catalog_is_injective` checks.
const TABLE: &[(Status, Entry)] = &[
    (
        Status::UNEXPECTED,
        Entry {
            mesg: "Unexpected error occurred.",
            hint: None,
        },
    ),
    (
        Status::INVALID_PARAMETER,
        Entry {
            mesg: "Invalid parameter.",
            hint: None,
        },
    ),
    (
        Status::OUT_OF_MEMORY,
        Entry {
            mesg: "Out of memory.",
            hint: None,
        },
    ),
    (
        Status::KEEP_LOST,
        Entry {
            mesg: "Power transition occurred.",
            hint: Some("The keep was lost; create it again and retry the call."),
        },
    ),
    (
        Status::INVALID_IMAGE,
        Entry {
            mesg: "Invalid keep image.",
            hint: None,
        },
    ),
    (
        Status::INVALID_KEEP_ID,
        Entry {
            mesg: "Invalid keep identification.",
            hint: None,
        },
    ),
    (
        Status::INVALID_SIGNATURE,
        Entry {
            mesg: "Invalid keep signature.",
            hint: None,
        },
    ),
    (
        Status::NDEBUG_IMAGE,
        Entry {
            mesg: "The image is signed for production and cannot be loaded as debuggable.",
            hint: None,
        },
    ),
    (
        Status::OUT_OF_PROTECTED,
        Entry {
            mesg: "Out of protected memory.",
            hint: None,
        },
    ),
    (
        Status::NO_DEVICE,
        Entry {
            mesg: "No isolation device.",
            hint: Some(
                "Make sure isolation support is enabled in the BIOS and the platform driver is installed.",
            ),
        },
    ),
    (
        Status::MEMORY_MAP_CONFLICT,
        Entry {
            mesg: "Memory map conflicted.",
            hint: None,
        },
    ),
    (
        Status::UNAUTHORIZED,
        Entry {
            mesg: "Keep was not authorized.",
            hint: None,
        },
    ),
    (
        Status::INVALID_METADATA,
        Entry {
            mesg: "Invalid keep metadata.",
            hint: None,
        },
    ),
    (
        Status::DEVICE_BUSY,
        Entry {
            mesg: "Isolation device was busy.",
            hint: None,
        },
    ),
    (
        Status::INVALID_VERSION,
        Entry {
            mesg: "Keep version was invalid.",
            hint: None,
        },
    ),
    (
        Status::IMAGE_FILE_ACCESS,
        Entry {
            mesg: "Can't open keep image file.",
            hint: None,
        },
    ),
    (
        Status::MEMORY_MAP_FAILURE,
        Entry {
            mesg: "Failed to reserve memory for the keep.",
            hint: None,
        },
    ),
];

static CATALOG: Lazy<HashMap<Status, &'static Entry>> =
    Lazy::new(|| TABLE.iter().map(|(status, entry)| (*status, entry)).collect());

/// The catalog entry reported to the caller of a failed operation.
///
/// Constructed per failure by [`diagnose`]; formatting it is a pure
/// function of the entry, so the same diagnosis always renders the same
/// two lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnosis {
    status: Status,
    mesg: &'static str,
    hint: Option<&'static str>,
}

impl Diagnosis {
    /// The status code this diagnosis explains.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The human-readable message.
    pub fn message(&self) -> &'static str {
        self.mesg
    }

    /// The remediation hint, when the catalog has one.
    pub fn suggestion(&self) -> Option<&'static str> {
        self.hint
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(hint) = self.hint {
            writeln!(f, "Info: {}", hint)?;
        }
        write!(f, "Error: {} (0x{:04x})", self.mesg, self.status)
    }
}

impl Error for Diagnosis {}

/// Looks `status` up in the catalog.
///
/// Pure, deterministic and total: codes missing from the catalog yield
/// the synthetic unknown-error entry with no suggestion.
pub fn diagnose(status: Status) -> Diagnosis {
    match CATALOG.get(&status) {
        Some(entry) => Diagnosis {
            status,
            mesg: entry.mesg,
            hint: entry.hint,
        },
        None => Diagnosis {
            status,
            mesg: UNKNOWN,
            hint: None,
        },
    }
}
