//! Writing single values into private profile (INI) files.
//!
//! Windows has a native primitive for this (`WritePrivateProfileStringW`). Other
//! platforms get the same behavior by loading the file into a
//! [`ConfigStore`], setting the value and saving it back.
//!
//! Both paths may need to relax the permissions of the target file first. The
//! user is asked through a [`Confirm`] implementation before that happens.

mod access;
mod prompt;
#[cfg(windows)]
mod windows;

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{ConfigStore, Denial, ProfileError};

pub use access::{Access, FileAccess, NativeFileAccess};
pub use prompt::{Confirm, TerminalConfirm};

const READ_ONLY_TITLE: &str = "INI file is read-only";
const UNREADABLE_TITLE: &str = "INI file is not readable";

/// Set `key_name` in section `app_name` of the profile at `file_name` to
/// `value`, mimicking `WritePrivateProfileString`.
///
/// # Errors
///
/// Returns [`ProfileError::PermissionDenied`] if the file cannot be made
/// readable and writable, and [`ProfileError::Io`] or
/// [`ProfileError::StreamUnavailable`] if reading or writing it fails.
pub fn write_registry_value(
    app_name: &str,
    key_name: &str,
    value: &str,
    file_name: &Path,
    confirm: &dyn Confirm,
) -> Result<(), ProfileError> {
    #[cfg(windows)]
    {
        windows::write_private_profile_string(app_name, key_name, value, file_name, confirm)
    }

    #[cfg(not(windows))]
    {
        write_profile_value(
            app_name,
            key_name,
            value,
            file_name,
            &NativeFileAccess,
            confirm,
        )
    }
}

/// Portable load, set and save of a single profile value.
///
/// A file that does not exist yet is created, like the native writer does.
///
/// # Errors
///
/// See [`write_registry_value`].
pub fn write_profile_value(
    app_name: &str,
    key_name: &str,
    value: &str,
    path: &Path,
    access: &dyn FileAccess,
    confirm: &dyn Confirm,
) -> Result<(), ProfileError> {
    let mut profile = if path.exists() {
        ensure_access(path, access, confirm)?;
        load_profile(path)?
    } else {
        debug!("{} does not exist and will be created", path.display());
        ConfigStore::new()
    };

    profile.set_string_property(app_name, key_name, value);

    save_profile(&profile, path)
}

/// Write `profile` next to `path` and move it over the target, so a failed
/// write leaves the original file intact.
fn save_profile(profile: &ConfigStore, path: &Path) -> Result<(), ProfileError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir).map_err(|source| io_error(path, source))?;
    profile.save(temp.as_file())?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())
            .map_err(|source| io_error(path, source))?;
    }

    temp.persist(path)
        .map_err(|e| io_error(path, e.error))?;
    Ok(())
}

fn load_profile(path: &Path) -> Result<ConfigStore, ProfileError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    ConfigStore::from_reader(file)
}

fn ensure_access(
    path: &Path,
    access: &dyn FileAccess,
    confirm: &dyn Confirm,
) -> Result<(), ProfileError> {
    let mut current = access
        .access(path)
        .map_err(|source| io_error(path, source))?;
    let shown = path.display();

    if !current.readable {
        warn!("{shown} is not readable by current user.  Attempting to set read flag.");

        let message = format!(
            "Attempting to read \"{shown}\" which is currently not readable. \
             Set the read flag to allow the write?"
        );
        if !confirm.confirm(UNREADABLE_TITLE, &message) {
            warn!("{shown} is not readable by current user.  User denied setting the read flag.");
            return Err(denied(path, Denial::Declined));
        }

        current.readable = true;
        if let Err(e) = access.grant(path, current) {
            warn!("{shown} is not readable by current user.  Failed to set read flag: {e}");
            return Err(denied(path, Denial::Unreadable));
        }
    }

    if !current.writable {
        let message = format!(
            "Attempting to write to \"{shown}\" which is currently set to read-only. \
             Clear the read-only flag to allow the write?"
        );
        if !confirm.confirm(READ_ONLY_TITLE, &message) {
            warn!("{shown} is read-only.  User denied setting the write flag.");
            return Err(denied(path, Denial::Declined));
        }

        warn!("{shown} is read-only.  Attempting to set write flag.");

        current.writable = true;
        if let Err(e) = access.grant(path, current) {
            warn!("{shown} is read-only.  Failed to set write flag: {e}");
            return Err(denied(path, Denial::ReadOnly));
        }
    }

    Ok(())
}

fn io_error(path: &Path, source: io::Error) -> ProfileError {
    ProfileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn denied(path: &Path, reason: Denial) -> ProfileError {
    ProfileError::PermissionDenied {
        path: path.to_path_buf(),
        reason,
    }
}
