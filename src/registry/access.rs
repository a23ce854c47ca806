use std::fs;
use std::io;
use std::path::Path;

/// Whether the current user may read and write a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub readable: bool,
    pub writable: bool,
}

/// Query and relax the permissions of a profile file.
pub trait FileAccess {
    /// Current permissions of `path` for the current user.
    ///
    /// # Errors
    ///
    /// Fails if the file's metadata cannot be read.
    fn access(&self, path: &Path) -> io::Result<Access>;

    /// Give the current user at least `access` on `path`.
    ///
    /// # Errors
    ///
    /// Fails if the permissions cannot be changed.
    fn grant(&self, path: &Path, access: Access) -> io::Result<()>;
}

/// [`FileAccess`] backed by the file system: owner mode bits on Unix, the
/// read-only attribute elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileAccess;

#[cfg(unix)]
const OWNER_READ: u32 = 0o400;
#[cfg(unix)]
const OWNER_WRITE: u32 = 0o200;

impl FileAccess for NativeFileAccess {
    #[cfg(unix)]
    fn access(&self, path: &Path) -> io::Result<Access> {
        use std::os::unix::fs::PermissionsExt;

        let mode = fs::metadata(path)?.permissions().mode();
        Ok(Access {
            readable: mode & OWNER_READ != 0,
            writable: mode & OWNER_WRITE != 0,
        })
    }

    #[cfg(not(unix))]
    fn access(&self, path: &Path) -> io::Result<Access> {
        let permissions = fs::metadata(path)?.permissions();
        Ok(Access {
            readable: true,
            writable: !permissions.readonly(),
        })
    }

    #[cfg(unix)]
    fn grant(&self, path: &Path, access: Access) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = fs::metadata(path)?.permissions();
        let mut mode = permissions.mode();
        if access.readable {
            mode |= OWNER_READ;
        }
        if access.writable {
            mode |= OWNER_WRITE;
        }
        permissions.set_mode(mode);
        fs::set_permissions(path, permissions)
    }

    #[cfg(not(unix))]
    fn grant(&self, path: &Path, access: Access) -> io::Result<()> {
        let mut permissions = fs::metadata(path)?.permissions();
        if access.writable {
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
        }
        fs::set_permissions(path, permissions)
    }
}
