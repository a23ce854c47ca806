//! Native profile writes through `WritePrivateProfileStringW`.

use std::ffi::OsStr;
use std::io;
use std::iter;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use tracing::warn;
use windows_sys::Win32::Foundation::{ERROR_ACCESS_DENIED, GetLastError};
use windows_sys::Win32::Storage::FileSystem::{
    FILE_ATTRIBUTE_READONLY, GetFileAttributesW, INVALID_FILE_ATTRIBUTES, SetFileAttributesW,
};
use windows_sys::Win32::System::WindowsProgramming::WritePrivateProfileStringW;

use super::{Confirm, READ_ONLY_TITLE, denied, io_error};
use crate::{Denial, ProfileError};

/// Convert to a null-terminated wide string (UTF-16).
fn to_wide(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(iter::once(0)).collect()
}

struct ProfileWrite {
    app_name: Vec<u16>,
    key_name: Vec<u16>,
    value: Vec<u16>,
    file_name: Vec<u16>,
}

impl ProfileWrite {
    /// Returns the thread's last error code on failure.
    fn run(&self) -> Result<(), u32> {
        // SAFETY: every argument is a null-terminated UTF-16 buffer that outlives the call.
        let written = unsafe {
            WritePrivateProfileStringW(
                self.app_name.as_ptr(),
                self.key_name.as_ptr(),
                self.value.as_ptr(),
                self.file_name.as_ptr(),
            )
        };

        if written != 0 {
            Ok(())
        } else {
            // SAFETY: no preconditions.
            Err(unsafe { GetLastError() })
        }
    }
}

pub(super) fn write_private_profile_string(
    app_name: &str,
    key_name: &str,
    value: &str,
    file_name: &Path,
    confirm: &dyn Confirm,
) -> Result<(), ProfileError> {
    let write = ProfileWrite {
        app_name: to_wide(OsStr::new(app_name)),
        key_name: to_wide(OsStr::new(key_name)),
        value: to_wide(OsStr::new(value)),
        file_name: to_wide(file_name.as_os_str()),
    };

    let code = match write.run() {
        Ok(()) => return Ok(()),
        Err(code) => code,
    };

    if code != ERROR_ACCESS_DENIED {
        return Err(native_error(file_name, code));
    }

    // SAFETY: `file_name` is null-terminated.
    let attributes = unsafe { GetFileAttributesW(write.file_name.as_ptr()) };
    if attributes == INVALID_FILE_ATTRIBUTES || attributes & FILE_ATTRIBUTE_READONLY == 0 {
        return Err(native_error(file_name, code));
    }

    let shown = file_name.display();
    let message = format!(
        "Attempting to write to \"{shown}\" which is currently set to read-only. \
         Clear the read-only flag to allow the write?"
    );
    if !confirm.confirm(READ_ONLY_TITLE, &message) {
        warn!("{shown} is read-only.  User denied clearing the read-only flag.");
        return Err(denied(file_name, Denial::Declined));
    }

    warn!("{shown} is read-only.  Attempting to clear read-only flag.");

    // SAFETY: `file_name` is null-terminated.
    let cleared =
        unsafe { SetFileAttributesW(write.file_name.as_ptr(), attributes & !FILE_ATTRIBUTE_READONLY) };
    if cleared == 0 {
        warn!("{shown} is read-only.  Failed to clear read-only flag.");
        return Err(denied(file_name, Denial::ReadOnly));
    }

    write
        .run()
        .map_err(|code| native_error(file_name, code))
}

#[allow(clippy::cast_possible_wrap)]
fn native_error(path: &Path, code: u32) -> ProfileError {
    io_error(path, io::Error::from_raw_os_error(code as i32))
}
