// SPDX-License-Identifier: Apache-2.0

//! The trusted side of the simulated platform.

use super::image::Image;
use crate::bridge::{self, Call, Service};
use crate::status::Status;

/// One loaded keep: the trusted code standing behind a handle.
pub struct Guest {
    lines: Vec<Vec<u8>>,
}

impl Guest {
    /// Prepares the trusted side from a verified image.
    pub fn new(image: &Image) -> Self {
        // One raw, nul-terminated request buffer per payload line,
        // exactly what the trusted runtime hands the boundary.
        let lines = image
            .payload
            .lines()
            .map(|line| {
                let mut buf = Vec::with_capacity(line.len() + 2);
                buf.extend_from_slice(line.as_bytes());
                buf.push(b'\n');
                buf.push(0);
                buf
            })
            .collect();

        Self { lines }
    }

    /// Bytes of protected memory this guest occupies.
    pub fn size(&self) -> usize {
        self.lines.iter().map(|line| line.len()).sum()
    }

    /// Runs the trusted entry point named by `call`.
    ///
    /// Requests the guest makes while running go out through the
    /// boundary relay to `service`, on this thread, before this method
    /// returns.
    pub fn enter(&self, call: Call, service: &dyn Service) -> Status {
        match call {
            Call::Exercise => self.exercise(service),
        }
    }

    fn exercise(&self, service: &dyn Service) -> Status {
        for line in &self.lines {
            let status = bridge::relay(line, service);
            if !status.is_success() {
                return status;
            }
        }

        Status::SUCCESS
    }
}

#[cfg(test)]
mod test {
    use super::Guest;
    use crate::backend::sim::image::{Flags, Image};
    use crate::bridge::{Call, Service, MAX_EMIT};
    use crate::status::Status;

    use std::sync::Mutex;

    #[derive(Default)]
    struct Sink(Mutex<String>);

    impl Service for Sink {
        fn write(&self, text: &str) {
            self.0.lock().unwrap().push_str(text);
        }
    }

    fn guest(payload: &str) -> Guest {
        let bytes = Image::seal(payload, Flags::DEBUG);
        Guest::new(&Image::parse(&bytes).unwrap())
    }

    #[test]
    fn exercise_emits_every_line() {
        let sink = Sink::default();
        let status = guest("first\nsecond\nthird").enter(Call::Exercise, &sink);
        assert_eq!(status, Status::SUCCESS);
        assert_eq!(sink.0.lock().unwrap().as_str(), "first\nsecond\nthird\n");
    }

    #[test]
    fn empty_payload_is_a_quiet_success() {
        let sink = Sink::default();
        assert_eq!(guest("").enter(Call::Exercise, &sink), Status::SUCCESS);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn oversized_request_fails_the_call() {
        let sink = Sink::default();
        let status = guest(&"a".repeat(MAX_EMIT)).enter(Call::Exercise, &sink);
        assert_eq!(status, Status::INVALID_PARAMETER);
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
