// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The byte sources a [`Stream`](super::Stream) can wrap.

use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    path::Path,
    str::FromStr,
};

use crate::InvalidArgument;

/// A readable, writable and/or seekable sequence of bytes.
///
/// Whether the resource may be read or written is decided by its
/// [`OpenMode`], not by the implementation.
pub trait Resource: Send + fmt::Debug {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    fn seek(&mut self, position: SeekFrom) -> io::Result<u64>;

    fn tell(&mut self) -> io::Result<u64>;

    /// Whether a previous read hit the end of the resource. Like `feof(3)`,
    /// being positioned at the end isn't enough.
    fn eof(&self) -> bool;

    /// The total size in bytes, if it is known.
    fn size(&self) -> Option<u64>;

    fn is_seekable(&self) -> bool;

    fn mode(&self) -> OpenMode;

    /// A label describing where the bytes come from.
    fn uri(&self) -> &str;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpenModeKind {
    /// `r`: open an existing file.
    Read,

    /// `w`: create or truncate.
    Write,

    /// `a`: create, and write at the end.
    Append,

    /// `x`: create, failing if it already exists.
    CreateNew,

    /// `c`: create, but don't truncate.
    Create,
}

/// An `fopen(3)`-style mode, such as `r`, `w+b` or `c+t`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpenMode {
    kind: OpenModeKind,

    /// `+` or the `rw` form.
    update: bool,
}

impl OpenMode {
    pub const READ: OpenMode = OpenMode { kind: OpenModeKind::Read, update: false };
    pub const READ_WRITE: OpenMode = OpenMode { kind: OpenModeKind::Read, update: true };
    pub const WRITE: OpenMode = OpenMode { kind: OpenModeKind::Write, update: false };
    pub const WRITE_READ: OpenMode = OpenMode { kind: OpenModeKind::Write, update: true };

    /// ```text
    /// mode          = ( "r" / "w" / "a" / "x" / "c" ) [ "+" ] [ "b" / "t" ]
    ///               / ( "r" / "w" / "a" / "x" / "c" ) ( "b" / "t" ) "+"
    ///               / "rw" [ "b" / "t" ]
    /// ```
    pub fn parse(mode: &str) -> Result<Self, InvalidArgument> {
        let mut bytes = mode.bytes();
        let kind = match bytes.next() {
            Some(b'r') => OpenModeKind::Read,
            Some(b'w') => OpenModeKind::Write,
            Some(b'a') => OpenModeKind::Append,
            Some(b'x') => OpenModeKind::CreateNew,
            Some(b'c') => OpenModeKind::Create,
            _ => return Err(InvalidArgument::StreamModeInvalid),
        };

        let mut update = false;
        let mut flavor = false;
        for byte in bytes {
            match byte {
                b'+' if !update => update = true,
                b'w' if kind == OpenModeKind::Read && !update && !flavor => update = true,
                b'b' | b't' if !flavor => flavor = true,
                _ => return Err(InvalidArgument::StreamModeInvalid),
            }
        }

        Ok(Self { kind, update })
    }

    pub fn kind(&self) -> OpenModeKind {
        self.kind
    }

    pub fn is_readable(&self) -> bool {
        self.update || self.kind == OpenModeKind::Read
    }

    pub fn is_writable(&self) -> bool {
        self.update || self.kind != OpenModeKind::Read
    }

    fn to_open_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.is_readable()).write(self.is_writable());

        match self.kind {
            OpenModeKind::Read => (),
            OpenModeKind::Write => {
                options.create(true).truncate(true);
            }
            OpenModeKind::Append => {
                options.append(true).create(true);
            }
            OpenModeKind::CreateNew => {
                options.create_new(true);
            }
            OpenModeKind::Create => {
                options.create(true);
            }
        }

        options
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.kind {
            OpenModeKind::Read => "r",
            OpenModeKind::Write => "w",
            OpenModeKind::Append => "a",
            OpenModeKind::CreateNew => "x",
            OpenModeKind::Create => "c",
        })?;

        if self.update {
            f.write_str("+")?;
        }
        Ok(())
    }
}

impl FromStr for OpenMode {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn not_permitted(what: &str, mode: OpenMode) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, format!("resource opened with mode {mode} isn't {what}"))
}

/// A growable in-memory buffer.
#[derive(Debug)]
pub struct MemoryResource {
    cursor: Cursor<Vec<u8>>,
    mode: OpenMode,
    eof: bool,
}

impl MemoryResource {
    /// An empty buffer that can be read and written.
    pub fn new() -> Self {
        Self::with_mode(OpenMode::READ_WRITE)
    }

    #[must_use]
    pub fn with_mode(mode: OpenMode) -> Self {
        Self {
            cursor: Cursor::new(Vec::new()),
            mode,
            eof: false,
        }
    }

    /// A buffer holding `contents`, positioned at the start.
    #[must_use]
    pub fn with_contents(contents: impl Into<Vec<u8>>, mode: OpenMode) -> Self {
        Self {
            cursor: Cursor::new(contents.into()),
            mode,
            eof: false,
        }
    }
}

impl Default for MemoryResource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource for MemoryResource {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        if !self.mode.is_readable() {
            return Err(not_permitted("readable", self.mode));
        }

        let count = self.cursor.read(buffer)?;
        self.eof = count < buffer.len();
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if !self.mode.is_writable() {
            return Err(not_permitted("writable", self.mode));
        }

        if self.mode.kind() == OpenModeKind::Append {
            self.cursor.seek(SeekFrom::End(0))?;
        }

        self.eof = false;
        self.cursor.write_all(data)?;
        Ok(data.len())
    }

    fn seek(&mut self, position: SeekFrom) -> io::Result<u64> {
        self.eof = false;
        self.cursor.seek(position)
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.cursor.position())
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn size(&self) -> Option<u64> {
        Some(self.cursor.get_ref().len() as u64)
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn uri(&self) -> &str {
        "memory"
    }
}

/// A file on disk.
#[derive(Debug)]
pub struct FileResource {
    file: File,
    mode: OpenMode,
    uri: String,
    eof: bool,
}

impl FileResource {
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> io::Result<Self> {
        let path = path.as_ref();
        let file = mode.to_open_options().open(path)?;
        Ok(Self::from_file(file, mode, path.to_string_lossy()))
    }

    /// Wraps an already opened file. The mode should match the way `file` was
    /// opened.
    pub fn from_file(file: File, mode: OpenMode, uri: impl Into<String>) -> Self {
        Self {
            file,
            mode,
            uri: uri.into(),
            eof: false,
        }
    }
}

impl Resource for FileResource {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        if !self.mode.is_readable() {
            return Err(not_permitted("readable", self.mode));
        }

        let count = self.file.read(buffer)?;
        self.eof = count < buffer.len();
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if !self.mode.is_writable() {
            return Err(not_permitted("writable", self.mode));
        }

        self.eof = false;
        self.file.write_all(data)?;
        Ok(data.len())
    }

    fn seek(&mut self, position: SeekFrom) -> io::Result<u64> {
        self.eof = false;
        self.file.seek(position)
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn size(&self) -> Option<u64> {
        self.file.metadata().ok().map(|metadata| metadata.len())
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn uri(&self) -> &str {
        &self.uri
    }
}

/// A forward-only source of bytes, such as a request body that is still
/// being received. It can't be written, sought or sized.
pub struct ReaderResource<R> {
    reader: R,
    position: u64,
    eof: bool,
}

impl<R: Read + Send> ReaderResource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            position: 0,
            eof: false,
        }
    }
}

impl<R> fmt::Debug for ReaderResource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderResource")
            .field("position", &self.position)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl<R: Read + Send> Resource for ReaderResource<R> {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let count = self.reader.read(buffer)?;
        self.position += count as u64;
        self.eof = count < buffer.len();
        Ok(count)
    }

    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(not_permitted("writable", OpenMode::READ))
    }

    fn seek(&mut self, _: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "reader isn't seekable"))
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn size(&self) -> Option<u64> {
        None
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn mode(&self) -> OpenMode {
        OpenMode::READ
    }

    fn uri(&self) -> &str {
        "input"
    }
}
