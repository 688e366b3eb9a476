// SPDX-License-Identifier: Apache-2.0

//! Platform status codes.

use std::fmt;

/// Result code reported by every platform operation and outward call.
///
/// [`Status::SUCCESS`] is the one distinguished success value; every
/// other code names a failure class. The code space is open on purpose:
/// a backend may surface codes this table does not list, and the
/// diagnostic catalog still resolves them (to its synthetic fallback).
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Status(u32);

impl Status {
    /// The operation completed.
    pub const SUCCESS: Self = Self(0x0000);

    /// Unexpected internal error.
    pub const UNEXPECTED: Self = Self(0x0001);

    /// An argument crossing the boundary was rejected.
    pub const INVALID_PARAMETER: Self = Self(0x0002);

    /// Ordinary (unprotected) memory was exhausted.
    pub const OUT_OF_MEMORY: Self = Self(0x0003);

    /// The keep was lost across a power transition.
    pub const KEEP_LOST: Self = Self(0x0004);

    /// The keep image is malformed.
    pub const INVALID_IMAGE: Self = Self(0x2001);

    /// The handle names no live keep.
    pub const INVALID_KEEP_ID: Self = Self(0x2002);

    /// The image seal does not match its contents.
    pub const INVALID_SIGNATURE: Self = Self(0x2003);

    /// A production-signed image was loaded as debuggable.
    pub const NDEBUG_IMAGE: Self = Self(0x2004);

    /// Protected memory was exhausted.
    pub const OUT_OF_PROTECTED: Self = Self(0x2005);

    /// The isolation device is missing or disabled.
    pub const NO_DEVICE: Self = Self(0x2006);

    /// The keep's memory map conflicts with an existing mapping.
    pub const MEMORY_MAP_CONFLICT: Self = Self(0x2007);

    /// The image requests attributes the platform refuses it.
    pub const UNAUTHORIZED: Self = Self(0x2008);

    /// The image metadata is invalid.
    pub const INVALID_METADATA: Self = Self(0x2009);

    /// The isolation device is busy.
    pub const DEVICE_BUSY: Self = Self(0x200c);

    /// The image container version is not supported.
    pub const INVALID_VERSION: Self = Self(0x200d);

    /// The image file cannot be opened.
    pub const IMAGE_FILE_ACCESS: Self = Self(0x200f);

    /// Memory for the keep could not be reserved.
    pub const MEMORY_MAP_FAILURE: Self = Self(0x2011);

    /// Wraps a raw platform code.
    pub const fn from_raw(code: u32) -> Self {
        Self(code)
    }

    /// The raw numeric code.
    pub const fn code(self) -> u32 {
        self.0
    }

    /// Whether this status reports success.
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status(0x{:04x})", self.0)
    }
}

impl fmt::LowerHex for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod test {
    use super::Status;

    #[test]
    fn success_is_distinguished() {
        assert!(Status::SUCCESS.is_success());
        assert!(!Status::UNEXPECTED.is_success());
        assert!(!Status::from_raw(0x9999).is_success());
    }

    #[test]
    fn raw_round_trip() {
        assert_eq!(Status::from_raw(0x2006), Status::NO_DEVICE);
        assert_eq!(Status::NO_DEVICE.code(), 0x2006);
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{:?}", Status::KEEP_LOST), "Status(0x0004)");
        assert_eq!(format!("{:04x}", Status::NO_DEVICE), "2006");
    }
}
