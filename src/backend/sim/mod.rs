// SPDX-License-Identifier: Apache-2.0

//! The built-in simulated backend.
//!
//! Enforces the full platform contract in ordinary process memory:
//! sealed-image verification, debug/production load policy, a bounded
//! protected-memory arena, and handle bookkeeping. There is no hardware
//! wall; the value is the contract.

mod guest;
pub mod image;

use guest::Guest;
use image::Image;

use super::{Datum, KeepId, Mode};
use crate::bridge::{Call, Service};
use crate::status::Status;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use log::{debug, info};

/// Most keeps the simulated device runs at once.
pub const MAX_KEEPS: usize = 8;

/// Size of the simulated protected memory arena, in bytes.
pub const PROTECTED_SIZE: usize = 4 * 1024 * 1024;

/// The simulated backend.
#[derive(Default)]
pub struct Backend {
    keeps: RwLock<HashMap<KeepId, Guest>>,
    next: AtomicU64,
    used: Mutex<usize>,
}

impl super::Backend for Backend {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn data(&self) -> Vec<Datum> {
        vec![
            super::probe::system_info(),
            Datum {
                name: "Driver".into(),
                pass: true,
                info: Some("built-in".into()),
                mesg: None,
            },
            Datum {
                name: "Protected Memory".into(),
                pass: true,
                info: Some(format!("{} KiB", PROTECTED_SIZE / 1024)),
                mesg: None,
            },
        ]
    }

    fn create(&self, image: &Path, mode: Mode) -> Result<KeepId, Status> {
        let bytes = fs::read(image).map_err(|_| Status::IMAGE_FILE_ACCESS)?;
        let image = Image::parse(&bytes)?;

        // The load policy is symmetric: a production-sealed image may
        // not be loaded as debuggable, and strict mode admits only
        // production-sealed images.
        match mode {
            Mode::Debug if !image.debug() => return Err(Status::NDEBUG_IMAGE),
            Mode::Production if image.debug() => return Err(Status::UNAUTHORIZED),
            _ => (),
        }

        let guest = Guest::new(&image);
        let size = guest.size();

        let mut keeps = self.keeps.write().unwrap();
        if keeps.len() >= MAX_KEEPS {
            return Err(Status::DEVICE_BUSY);
        }

        let mut used = self.used.lock().unwrap();
        if *used + size > PROTECTED_SIZE {
            return Err(Status::OUT_OF_PROTECTED);
        }
        *used += size;

        let id = KeepId::from_raw(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        keeps.insert(id, guest);
        info!("keep {} created, {} bytes of protected memory", id, size);
        Ok(id)
    }

    fn invoke(&self, id: KeepId, call: Call, service: &dyn Service) -> Status {
        let keeps = self.keeps.read().unwrap();

        match keeps.get(&id) {
            Some(guest) => guest.enter(call, service),
            None => Status::INVALID_KEEP_ID,
        }
    }

    fn destroy(&self, id: KeepId) -> Status {
        let mut keeps = self.keeps.write().unwrap();

        match keeps.remove(&id) {
            Some(guest) => {
                *self.used.lock().unwrap() -= guest.size();
                debug!("keep {} destroyed", id);
                Status::SUCCESS
            }
            None => Status::INVALID_KEEP_ID,
        }
    }
}

#[cfg(test)]
mod test {
    use super::image::{Flags, Image};
    use super::{Backend, MAX_KEEPS, PROTECTED_SIZE};
    use crate::backend::{Backend as _, KeepId, Mode};
    use crate::bridge::{Call, Service};
    use crate::status::Status;

    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use tempfile::tempdir;

    #[derive(Default)]
    struct Sink(Mutex<String>);

    impl Service for Sink {
        fn write(&self, text: &str) {
            self.0.lock().unwrap().push_str(text);
        }
    }

    fn sealed(dir: &std::path::Path, name: &str, payload: &str, flags: Flags) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, Image::seal(payload, flags)).unwrap();
        path
    }

    #[test]
    fn create_exercise_destroy() {
        let dir = tempdir().unwrap();
        let path = sealed(dir.path(), "keep.img", "hail from the keep", Flags::DEBUG);

        let backend = Backend::default();
        let id = backend.create(&path, Mode::Debug).unwrap();

        let sink = Sink::default();
        assert_eq!(backend.invoke(id, Call::Exercise, &sink), Status::SUCCESS);
        assert_eq!(sink.0.lock().unwrap().as_str(), "hail from the keep\n");

        assert_eq!(backend.destroy(id), Status::SUCCESS);
        assert_eq!(backend.invoke(id, Call::Exercise, &sink), Status::INVALID_KEEP_ID);
        assert_eq!(backend.destroy(id), Status::INVALID_KEEP_ID);
    }

    #[test]
    fn missing_file_is_an_access_failure() {
        let dir = tempdir().unwrap();
        let backend = Backend::default();
        let status = backend
            .create(&dir.path().join("absent.img"), Mode::Debug)
            .unwrap_err();
        assert_eq!(status, Status::IMAGE_FILE_ACCESS);
    }

    #[test]
    fn production_image_refuses_debug_load() {
        let dir = tempdir().unwrap();
        let path = sealed(dir.path(), "keep.img", "x", Flags::empty());

        let backend = Backend::default();
        let status = backend.create(&path, Mode::Debug).unwrap_err();
        assert_eq!(status, Status::NDEBUG_IMAGE);
    }

    #[test]
    fn debug_image_refuses_production_load() {
        let dir = tempdir().unwrap();
        let path = sealed(dir.path(), "keep.img", "x", Flags::DEBUG);

        let backend = Backend::default();
        let status = backend.create(&path, Mode::Production).unwrap_err();
        assert_eq!(status, Status::UNAUTHORIZED);
    }

    #[test]
    fn device_capacity_is_bounded() {
        let dir = tempdir().unwrap();
        let path = sealed(dir.path(), "keep.img", "x", Flags::DEBUG);

        let backend = Backend::default();
        for _ in 0..MAX_KEEPS {
            backend.create(&path, Mode::Debug).unwrap();
        }

        let status = backend.create(&path, Mode::Debug).unwrap_err();
        assert_eq!(status, Status::DEVICE_BUSY);
    }

    #[test]
    fn protected_memory_is_bounded() {
        let dir = tempdir().unwrap();
        let path = sealed(dir.path(), "big.img", &"a".repeat(PROTECTED_SIZE), Flags::DEBUG);

        let backend = Backend::default();
        let status = backend.create(&path, Mode::Debug).unwrap_err();
        assert_eq!(status, Status::OUT_OF_PROTECTED);
    }

    #[test]
    fn destroy_releases_protected_memory() {
        let dir = tempdir().unwrap();
        let path = sealed(
            dir.path(),
            "half.img",
            &"a".repeat(PROTECTED_SIZE / 2),
            Flags::DEBUG,
        );

        let backend = Backend::default();
        let first = backend.create(&path, Mode::Debug).unwrap();
        let status = backend.create(&path, Mode::Debug).unwrap_err();
        assert_eq!(status, Status::OUT_OF_PROTECTED);

        assert_eq!(backend.destroy(first), Status::SUCCESS);
        backend.create(&path, Mode::Debug).unwrap();
    }

    #[test]
    fn handles_are_never_reused() {
        let dir = tempdir().unwrap();
        let path = sealed(dir.path(), "keep.img", "x", Flags::DEBUG);

        let backend = Backend::default();
        let first = backend.create(&path, Mode::Debug).unwrap();
        assert_eq!(backend.destroy(first), Status::SUCCESS);

        let second = backend.create(&path, Mode::Debug).unwrap();
        assert_ne!(first, second);
        assert_eq!(first, KeepId::from_raw(1));
        assert_eq!(second, KeepId::from_raw(2));
    }
}
