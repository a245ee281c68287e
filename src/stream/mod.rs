// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The body of a message: a shared handle to a [`Resource`].
//!
//! Cloning a [`Stream`] clones the handle, not the bytes. Detaching or
//! closing through one handle is observed through every other handle.

pub mod resource;

use std::{
    fmt,
    io::SeekFrom,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub use self::resource::{
    FileResource,
    MemoryResource,
    OpenMode,
    OpenModeKind,
    ReaderResource,
    Resource,
};

use crate::{
    Result,
    RuntimeError,
};

const READ_CHUNK_SIZE: usize = 8192;

#[derive(Debug)]
enum Handle {
    Open(Box<dyn Resource>),

    /// The resource was handed out by [`Stream::detach()`].
    Detached,

    /// The resource was dropped by [`Stream::close()`].
    Closed,
}

#[derive(Debug)]
struct Inner {
    handle: Handle,

    /// Memoized size, cleared by writes.
    size: Option<u64>,
}

impl Inner {
    fn resource(&mut self) -> Result<&mut dyn Resource> {
        match &mut self.handle {
            Handle::Open(resource) => Ok(resource.as_mut()),
            Handle::Detached | Handle::Closed => Err(RuntimeError::StreamDetached.into()),
        }
    }

    fn open_resource(&self) -> Option<&dyn Resource> {
        match &self.handle {
            Handle::Open(resource) => Some(resource.as_ref()),
            Handle::Detached | Handle::Closed => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamMetadata {
    pub uri: String,
    pub mode: OpenMode,
    pub seekable: bool,
}

#[derive(Clone, Debug)]
pub struct Stream {
    inner: Arc<Mutex<Inner>>,
}

impl Stream {
    pub fn new(resource: impl Resource + 'static) -> Self {
        Self::from_boxed(Box::new(resource))
    }

    pub fn from_boxed(resource: Box<dyn Resource>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                handle: Handle::Open(resource),
                size: None,
            })),
        }
    }

    /// An empty in-memory stream that can be read, written and sought.
    pub fn memory() -> Self {
        Self::new(MemoryResource::new())
    }

    /// A readable and writable in-memory stream holding `contents`,
    /// positioned at the start.
    pub fn from_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self::new(MemoryResource::with_contents(contents, OpenMode::READ_WRITE))
    }

    /// Opens the file at `path` with an `fopen(3)`-style mode.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self> {
        let mode = OpenMode::parse(mode)?;
        Ok(Self::new(FileResource::open(path, mode)?))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles refer to the same stream.
    pub fn ptr_eq(&self, other: &Stream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_readable(&self) -> bool {
        self.lock().open_resource().is_some_and(|resource| resource.mode().is_readable())
    }

    pub fn is_writable(&self) -> bool {
        self.lock().open_resource().is_some_and(|resource| resource.mode().is_writable())
    }

    pub fn is_seekable(&self) -> bool {
        self.lock().open_resource().is_some_and(|resource| resource.is_seekable())
    }

    /// The size in bytes, or `None` when it isn't known or the stream has
    /// been detached or closed.
    pub fn size(&self) -> Option<u64> {
        let mut inner = self.lock();
        if inner.size.is_none() {
            inner.size = inner.open_resource().and_then(|resource| resource.size());
        }
        inner.size
    }

    pub fn tell(&self) -> Result<u64> {
        Ok(self.lock().resource()?.tell()?)
    }

    /// Whether a previous read hit the end of the stream.
    pub fn eof(&self) -> Result<bool> {
        Ok(self.lock().resource()?.eof())
    }

    pub fn seek(&self, position: SeekFrom) -> Result<()> {
        let mut inner = self.lock();
        let resource = inner.resource()?;
        if !resource.is_seekable() {
            return Err(RuntimeError::StreamNotSeekable.into());
        }

        resource.seek(position)?;
        Ok(())
    }

    pub fn rewind(&self) -> Result<()> {
        self.seek(SeekFrom::Start(0))
    }

    /// Reads up to `length` bytes. Fewer bytes are returned when the end of
    /// the stream is reached.
    pub fn read(&self, length: usize) -> Result<Vec<u8>> {
        let mut inner = self.lock();
        let resource = inner.resource()?;
        if !resource.mode().is_readable() {
            return Err(RuntimeError::StreamNotReadable.into());
        }

        // `length` is an upper bound, not an allocation size.
        let mut buffer = Vec::new();
        let mut chunk = [0; READ_CHUNK_SIZE];
        while buffer.len() < length {
            let wanted = (length - buffer.len()).min(READ_CHUNK_SIZE);
            let count = resource.read(&mut chunk[..wanted])?;
            if count == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..count]);
        }

        Ok(buffer)
    }

    /// Writes all of `data`, returning the number of bytes written.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        let mut inner = self.lock();
        let resource = inner.resource()?;
        if !resource.mode().is_writable() {
            return Err(RuntimeError::StreamNotWritable.into());
        }

        let written = resource.write(data)?;
        inner.size = None;
        Ok(written)
    }

    /// Reads the remainder of the stream.
    pub fn contents(&self) -> Result<Vec<u8>> {
        let mut inner = self.lock();
        let resource = inner.resource()?;
        if !resource.mode().is_readable() {
            return Err(RuntimeError::StreamNotReadable.into());
        }

        let mut contents = Vec::new();
        let mut chunk = [0; READ_CHUNK_SIZE];
        loop {
            let count = resource.read(&mut chunk)?;
            if count == 0 {
                return Ok(contents);
            }
            contents.extend_from_slice(&chunk[..count]);
        }
    }

    /// Takes the resource out of the stream, leaving the stream unusable.
    /// Returns `None` when it was already detached or closed.
    pub fn detach(&self) -> Option<Box<dyn Resource>> {
        let mut inner = self.lock();
        inner.size = None;

        match std::mem::replace(&mut inner.handle, Handle::Detached) {
            Handle::Open(resource) => {
                tracing::debug!(uri = resource.uri(), "Detached stream");
                Some(resource)
            }
            Handle::Closed => {
                inner.handle = Handle::Closed;
                None
            }
            Handle::Detached => None,
        }
    }

    /// Releases the resource. Does nothing when the resource was detached.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.size = None;

        if let Handle::Open(resource) = &inner.handle {
            tracing::debug!(uri = resource.uri(), "Closing stream");
            inner.handle = Handle::Closed;
        }
    }

    pub fn metadata(&self) -> Option<StreamMetadata> {
        self.lock().open_resource().map(|resource| StreamMetadata {
            uri: resource.uri().to_string(),
            mode: resource.mode(),
            seekable: resource.is_seekable(),
        })
    }

    /// Looks up a single metadata entry: `uri`, `mode` or `seekable`.
    pub fn metadata_entry(&self, key: &str) -> Option<String> {
        let metadata = self.metadata()?;
        match key {
            "uri" => Some(metadata.uri),
            "mode" => Some(metadata.mode.to_string()),
            "seekable" => Some(metadata.seekable.to_string()),
            _ => None,
        }
    }

    fn read_from_start(&self) -> Result<Vec<u8>> {
        if !self.is_readable() {
            return Ok(Vec::new());
        }

        if self.is_seekable() {
            self.rewind()?;
        }
        self.contents()
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::memory()
    }
}

/// Renders the whole stream from the start. Never fails: an unreadable
/// stream, or one that fails while reading, renders as the empty string.
impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.read_from_start() {
            Ok(contents) => f.write_str(&String::from_utf8_lossy(&contents)),
            Err(..) => Ok(()),
        }
    }
}
