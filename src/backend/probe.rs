// SPDX-License-Identifier: Apache-2.0

//! Host probes shared by every backend's support report.

use super::Datum;

use std::ffi::CStr;
use std::io;
use std::mem::MaybeUninit;
use std::os::raw::c_char;
use std::str::Utf8Error;

use libc::{uname, utsname};

/// Kernel and machine identification for the top of the report.
pub fn system_info() -> Datum {
    fn array_to_str(array: &[c_char; 65]) -> Result<&str, Utf8Error> {
        unsafe { CStr::from_ptr(array.as_ptr()) }.to_str()
    }

    fn render(utsname: utsname) -> Result<String, Utf8Error> {
        Ok(format!(
            "{} {} {}",
            array_to_str(&utsname.sysname)?,
            array_to_str(&utsname.release)?,
            array_to_str(&utsname.machine)?,
        ))
    }

    let mut utsname = MaybeUninit::uninit();

    Datum {
        name: "System Info".to_string(),
        pass: true,
        info: if unsafe { uname(utsname.as_mut_ptr()) } != 0 {
            Some(format!("[{}]", io::Error::last_os_error()))
        } else {
            Some(
                render(unsafe { utsname.assume_init() })
                    .unwrap_or_else(|e| format!("[utf8 error: {}]", e)),
            )
        },
        mesg: None,
    }
}

#[cfg(test)]
mod test {
    use super::system_info;

    #[test]
    fn probe_passes() {
        let datum = system_info();
        assert!(datum.pass);
        assert!(datum.info.is_some());
    }
}
