// SPDX-License-Identifier: Apache-2.0

//! The sealed keep image container.
//!
//! Little-endian layout: magic, container version, attribute flags,
//! payload length, a SHA-256 seal over (version, flags, payload), then
//! the UTF-8 payload. The payload is the trusted code of the simulated
//! platform: the text the keep emits when exercised.

use crate::status::Status;

use bitflags::bitflags;
use sha2::{Digest, Sha256};

/// Container magic.
pub const MAGIC: [u8; 4] = *b"KEEP";

/// Container version this loader understands.
pub const VERSION: u16 = 1;

/// Header length in bytes: magic, version, flags, payload length, seal.
pub const HEADER: usize = 4 + 2 + 2 + 4 + 32;

bitflags! {
    /// Image attribute bits carried in the container header.
    pub struct Flags: u16 {
        /// The image is sealed for debug loading.
        const DEBUG = 1 << 0;
    }
}

/// A parsed and verified keep image.
#[derive(Debug)]
pub struct Image {
    /// Attribute bits the image was sealed with.
    pub flags: Flags,
    /// The trusted payload.
    pub payload: String,
}

impl Image {
    /// Parses and verifies a sealed container.
    ///
    /// Each defect maps to the status a platform loader reports for the
    /// equivalent fault: a short or garbled header is bad metadata, an
    /// unknown container version is a version mismatch, a length
    /// disagreement or non-UTF-8 payload is a bad image, and a seal
    /// mismatch is a bad signature.
    pub fn parse(bytes: &[u8]) -> Result<Self, Status> {
        if bytes.len() < HEADER || bytes[..4] != MAGIC {
            return Err(Status::INVALID_METADATA);
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(Status::INVALID_VERSION);
        }

        let flags = u16::from_le_bytes([bytes[6], bytes[7]]);
        let flags = Flags::from_bits(flags).ok_or(Status::INVALID_METADATA)?;

        let length = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let payload = &bytes[HEADER..];
        if payload.len() != length {
            return Err(Status::INVALID_IMAGE);
        }

        if seal_digest(version, flags, payload)[..] != bytes[12..44] {
            return Err(Status::INVALID_SIGNATURE);
        }

        let payload = std::str::from_utf8(payload)
            .map_err(|_| Status::INVALID_IMAGE)?
            .to_string();

        Ok(Self { flags, payload })
    }

    /// Builds a sealed container around `payload`.
    pub fn seal(payload: &str, flags: Flags) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&flags.bits().to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&seal_digest(VERSION, flags, payload.as_bytes()));
        bytes.extend_from_slice(payload.as_bytes());
        bytes
    }

    /// Whether the image was sealed for debug loading.
    pub fn debug(&self) -> bool {
        self.flags.contains(Flags::DEBUG)
    }
}

fn seal_digest(version: u16, flags: Flags, payload: &[u8]) -> [u8; 32] {
    let mut sha = Sha256::new();
    sha.update(version.to_le_bytes());
    sha.update(flags.bits().to_le_bytes());
    sha.update(payload);
    sha.finalize().into()
}
