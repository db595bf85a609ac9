//! Input acquisition and output sinks: `spec.md` §5.
//!
//! Files are preferred via memory-mapping (`memmap2`), falling back to a
//! streamed read when mapping fails or the file is empty (some platforms
//! reject zero-length mappings); stdin is read to EOF with a grow-by-doubling
//! buffer, matching the original tool's own stdin acquisition strategy.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::Error;

/// An acquired input buffer: either a memory-mapped file or an owned `Vec`.
pub enum Input {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Input {
    /// The buffer's bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Input::Mapped(mmap) => mmap,
            Input::Owned(buf) => buf,
        }
    }
}

/// Read `path` preferring a memory mapping, falling back to a streamed read.
pub fn read_file(path: &Path) -> Result<Input, Error> {
    let file = File::open(path).map_err(|e| Error::io(Some(path.to_path_buf()), e))?;
    let len = file
        .metadata()
        .map_err(|e| Error::io(Some(path.to_path_buf()), e))?
        .len();
    if len == 0 {
        return Ok(Input::Owned(Vec::new()));
    }
    // SAFETY: the mapping is read-only and the file is not concurrently
    // truncated by this process; external modification during the mapping's
    // lifetime is a known, accepted risk of memory-mapped file I/O.
    match unsafe { Mmap::map(&file) } {
        Ok(mmap) => Ok(Input::Mapped(mmap)),
        Err(_) => read_streamed(file, path),
    }
}

fn read_streamed(mut file: File, path: &Path) -> Result<Input, Error> {
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .map_err(|e| Error::io(Some(path.to_path_buf()), e))?;
    Ok(Input::Owned(buf))
}

/// Read standard input to EOF using a grow-by-doubling buffer.
pub fn read_stdin() -> Result<Vec<u8>, Error> {
    let mut buf = Vec::with_capacity(8192);
    let mut stdin = io::stdin().lock();
    loop {
        let used = buf.len();
        if buf.capacity() == used {
            buf.reserve(buf.capacity().max(8192));
        }
        let spare = buf.capacity() - used;
        buf.resize(used + spare, 0);
        let read = stdin
            .read(&mut buf[used..])
            .map_err(|e| Error::io(None, e))?;
        buf.truncate(used + read);
        if read == 0 {
            break;
        }
    }
    Ok(buf)
}

/// Where rendered output is written: stdout, or a single opened file (`-o PATH`).
pub enum Sink {
    Stdout(io::Stdout),
    File(File),
}

impl Sink {
    /// Open the sink named by `-o PATH`, or stdout if `path` is `None`.
    pub fn open(path: Option<&PathBuf>) -> Result<Self, Error> {
        match path {
            None => Ok(Sink::Stdout(io::stdout())),
            Some(path) => {
                let file = File::create(path).map_err(|e| Error::io(Some(path.clone()), e))?;
                Ok(Sink::File(file))
            }
        }
    }

    /// Write `bytes` to the sink.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let result = match self {
            Sink::Stdout(stdout) => stdout.write_all(bytes),
            Sink::File(file) => file.write_all(bytes),
        };
        result.map_err(|e| Error::io(None, e))
    }
}
