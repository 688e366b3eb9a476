// SPDX-License-Identifier: Apache-2.0

//! The call bridge.
//!
//! Two directions cross the isolation boundary. Outward, a [`Call`]
//! names a trusted entry point and control transfers into the keep.
//! Inward, the trusted side requests untrusted services through
//! [`Service`] while its outward call sits suspended; the request runs
//! synchronously on the calling thread's stack and returns nothing
//! across the boundary. [`relay`] is the boundary layer in between: no
//! service ever observes a request buffer it has not validated.

use crate::status::Status;

use std::io::{self, Write};
use std::str;

/// Largest request buffer the boundary accepts from the trusted side,
/// terminator included.
pub const MAX_EMIT: usize = 4096;

/// Trusted entry points every keep image exports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// Exercise the trusted library: run the image payload end to end.
    Exercise,
}

/// Untrusted services the trusted side may request while it runs.
///
/// A service call executes nested inside the suspended outward call, on
/// the same thread. Implementations must return promptly and must not
/// re-enter the keep or take locks the outward caller holds.
pub trait Service: Sync {
    /// Handles an emit request. `text` has already been bounds-checked
    /// and stripped of its terminator by the boundary layer; the
    /// service need not treat it as hostile.
    fn write(&self, text: &str);
}

/// The [`Service`] that forwards emit requests to standard output.
pub struct Stdout;

impl Service for Stdout {
    fn write(&self, text: &str) {
        let mut out = io::stdout();
        out.write_all(text.as_bytes()).and_then(|_| out.flush()).ok();
    }
}

/// Validates a raw request buffer from the trusted side and relays it
/// to `service`.
///
/// The buffer must be non-empty, at most [`MAX_EMIT`] bytes, carry
/// exactly one nul as its final byte, and decode as UTF-8. Anything
/// else is refused with [`Status::INVALID_PARAMETER`] before the
/// service sees it.
pub fn relay(raw: &[u8], service: &dyn Service) -> Status {
    if raw.is_empty() || raw.len() > MAX_EMIT {
        return Status::INVALID_PARAMETER;
    }

    let (term, text) = match raw.split_last() {
        Some(split) => split,
        None => return Status::INVALID_PARAMETER,
    };

    if *term != 0 || text.contains(&0) {
        return Status::INVALID_PARAMETER;
    }

    match str::from_utf8(text) {
        Ok(text) => {
            service.write(text);
            Status::SUCCESS
        }
        Err(_) => Status::INVALID_PARAMETER,
    }
}

#[cfg(test)]
mod test {
    use super::{relay, Service, MAX_EMIT};
    use crate::status::Status;

    use std::sync::Mutex;

    #[derive(Default)]
    struct Sink(Mutex<Vec<String>>);

    impl Service for Sink {
        fn write(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn valid_request_reaches_the_service() {
        let sink = Sink::default();
        assert_eq!(relay(b"from the keep\n\0", &sink), Status::SUCCESS);
        assert_eq!(sink.0.lock().unwrap().as_slice(), ["from the keep\n"]);
    }

    #[test]
    fn empty_request_is_refused() {
        let sink = Sink::default();
        assert_eq!(relay(b"", &sink), Status::INVALID_PARAMETER);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn unterminated_request_is_refused() {
        let sink = Sink::default();
        assert_eq!(relay(b"no terminator", &sink), Status::INVALID_PARAMETER);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn interior_nul_is_refused() {
        let sink = Sink::default();
        assert_eq!(relay(b"split\0half\0", &sink), Status::INVALID_PARAMETER);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn oversized_request_is_refused() {
        let sink = Sink::default();
        let mut raw = vec![b'a'; MAX_EMIT];
        raw.push(0);
        assert_eq!(relay(&raw, &sink), Status::INVALID_PARAMETER);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn largest_admissible_request_passes() {
        let sink = Sink::default();
        let mut raw = vec![b'a'; MAX_EMIT - 1];
        raw.push(0);
        assert_eq!(relay(&raw, &sink), Status::SUCCESS);
    }

    #[test]
    fn invalid_utf8_is_refused() {
        let sink = Sink::default();
        assert_eq!(relay(&[0xff, 0xfe, 0x00], &sink), Status::INVALID_PARAMETER);
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
