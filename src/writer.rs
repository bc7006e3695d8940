use std::fs::{self, DirBuilder, File};
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use tempfile::Builder;

use crate::error::WriteError;

pub trait Writer: Send + Sync {
    /// Stores `content` at `path`, replacing whatever was there.
    fn write(&self, content: &[u8], path: &Utf8Path) -> Result<(), WriteError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and rewrite the destination under the lock.
    #[default]
    InPlace,
    /// Write a sibling temp file under the lock and rename it over the
    /// destination, so lock-unaware readers never see a partial file.
    AtomicRename,
}

/// Writes cache files under an exclusive advisory lock.
///
/// In-place writes lock the destination itself. Atomic writes lock a hidden
/// sibling `.{name}.lock` file, so a failed write never creates the
/// destination.
#[derive(Debug, Clone, Default)]
pub struct FileWriter {
    mode: WriteMode,
}

impl FileWriter {
    pub fn new(mode: WriteMode) -> Self {
        Self { mode }
    }
}

impl Writer for FileWriter {
    fn write(&self, content: &[u8], path: &Utf8Path) -> Result<(), WriteError> {
        let parent = prepare_parent(path)?;
        match self.mode {
            WriteMode::InPlace => {
                let mut locked = LockedFile::open(path)?;
                rewrite(&mut locked.file, content, path)
            }
            WriteMode::AtomicRename => {
                let _guard = LockedFile::open(&lock_path(&parent, path))?;
                write_replacing(&parent, content, path)
            }
        }
    }
}

/// Open file holding an exclusive lock; unlocks and closes on drop.
struct LockedFile {
    file: File,
}

impl LockedFile {
    fn open(path: &Utf8Path) -> Result<Self, WriteError> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.as_std_path())
            .map_err(|source| WriteError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        lock(&file, path)?;
        Ok(Self { file })
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn lock<F: FileExt>(file: &F, path: &Utf8Path) -> Result<(), WriteError> {
    FileExt::lock_exclusive(file).map_err(|source| WriteError::Locked {
        path: path.to_path_buf(),
        source,
    })
}

fn lock_path(parent: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    parent.join(format!(".{}.lock", path.file_name().unwrap_or("lang-cache")))
}

fn prepare_parent(path: &Utf8Path) -> Result<Utf8PathBuf, WriteError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };

    match fs::metadata(parent.as_std_path()) {
        Ok(meta) if meta.is_dir() => {
            // No write bit at all is refused even for privileged users.
            if meta.permissions().readonly() {
                return Err(WriteError::NotWritable(parent));
            }
            check_writable(&parent)?;
        }
        Ok(_) => {
            return Err(WriteError::CreateDir {
                path: parent,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
            });
        }
        Err(_) => {
            let mut builder = DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o755);
            }
            builder
                .create(parent.as_std_path())
                .map_err(|source| WriteError::CreateDir {
                    path: parent.clone(),
                    source,
                })?;
        }
    }
    Ok(parent)
}

/// Asks the kernel whether the current user may create files in `dir`.
#[cfg(unix)]
fn check_writable(dir: &Utf8Path) -> Result<(), WriteError> {
    use nix::unistd::{AccessFlags, access};

    access_outcome(access(dir.as_std_path(), AccessFlags::W_OK), dir)
}

#[cfg(not(unix))]
fn check_writable(_dir: &Utf8Path) -> Result<(), WriteError> {
    Ok(())
}

#[cfg(unix)]
fn access_outcome(result: nix::Result<()>, dir: &Utf8Path) -> Result<(), WriteError> {
    use nix::errno::Errno;

    match result {
        Ok(()) => Ok(()),
        Err(Errno::EACCES | Errno::EPERM | Errno::EROFS) => {
            Err(WriteError::NotWritable(dir.to_path_buf()))
        }
        Err(errno) => Err(WriteError::Io {
            path: dir.to_path_buf(),
            source: io::Error::from(errno),
        }),
    }
}

/// A destination that can be emptied again after a failed write.
trait Truncate: Write {
    fn truncate(&mut self) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate(&mut self) -> io::Result<()> {
        self.set_len(0)
    }
}

fn rewrite<F: Truncate>(dest: &mut F, content: &[u8], path: &Utf8Path) -> Result<(), WriteError> {
    dest.truncate().map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let result = write_exact(dest, content, path);
    if result.is_err() {
        // A half-written language file is worse than an empty one.
        let _ = dest.truncate();
    }
    result
}

fn write_replacing(parent: &Utf8Path, content: &[u8], path: &Utf8Path) -> Result<(), WriteError> {
    let mut builder = Builder::new();
    builder.prefix(".lang-cache");
    // Same creation mode as an in-place write; the umask still applies.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder
        .tempfile_in(parent.as_std_path())
        .map_err(|source| WriteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    write_exact(temp.as_file_mut(), content, path)?;
    temp.persist(path.as_std_path())
        .map_err(|err| WriteError::Io {
            path: path.to_path_buf(),
            source: err.error,
        })?;
    Ok(())
}

/// Writes all of `content`, flushes, and checks the byte count.
pub(crate) fn write_exact<W: Write>(
    dest: &mut W,
    content: &[u8],
    path: &Utf8Path,
) -> Result<(), WriteError> {
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let written = write_counted(dest, content).map_err(io_err)?;
    dest.flush().map_err(io_err)?;
    if written != content.len() {
        return Err(WriteError::ShortWrite {
            path: path.to_path_buf(),
            written,
            expected: content.len(),
        });
    }
    Ok(())
}

fn write_counted<W: Write>(dest: &mut W, content: &[u8]) -> io::Result<usize> {
    let mut written = 0;
    while written < content.len() {
        match dest.write(&content[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(written)
}
