// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use strum_macros::AsRefStr;

use crate::{
    stream::Resource,
    InvalidArgument,
    Result,
    RuntimeError,
    Stream,
};

const COPY_CHUNK_SIZE: usize = 8192;

/// The outcome of receiving an uploaded file, using the conventional
/// numeric codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr)]
pub enum UploadErrorStatus {
    Ok = 0,

    /// The file exceeds the size limit of the server.
    IniSize = 1,

    /// The file exceeds the size limit of the form.
    FormSize = 2,

    /// The file was only partially received.
    Partial = 3,

    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,

    /// An extension stopped the upload.
    Extension = 8,
}

impl UploadErrorStatus {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for UploadErrorStatus {
    type Error = InvalidArgument;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            _ => return Err(InvalidArgument::UploadErrorStatusUnknown),
        })
    }
}

/// Where the bytes of an uploaded file are.
#[derive(Debug)]
pub enum UploadSource {
    /// Returned as is by [`UploadedFile::stream()`].
    Stream(Stream),

    /// Wrapped into a [`Stream`] once.
    Resource(Box<dyn Resource>),

    /// A file on disk, opened when the stream is first requested.
    Path(PathBuf),
}

impl From<Stream> for UploadSource {
    fn from(stream: Stream) -> Self {
        Self::Stream(stream)
    }
}

impl From<Box<dyn Resource>> for UploadSource {
    fn from(resource: Box<dyn Resource>) -> Self {
        Self::Resource(resource)
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

#[derive(Debug)]
enum Source {
    Stream(Stream),
    Path {
        path: PathBuf,
        opened: Option<Stream>,
    },
}

#[derive(Debug)]
struct State {
    /// `None` once moved.
    source: Option<Source>,
}

/// A file received as part of a request.
///
/// Clones share the source, so a move through one clone is seen by all.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    state: Arc<Mutex<State>>,
    size: Option<u64>,
    error: UploadErrorStatus,
    client_filename: Option<String>,
    client_media_type: Option<String>,
}

impl UploadedFile {
    pub fn new(source: impl Into<UploadSource>, size: Option<u64>, error: UploadErrorStatus) -> Self {
        let source = match source.into() {
            UploadSource::Stream(stream) => Source::Stream(stream),
            UploadSource::Resource(resource) => Source::Stream(Stream::from_boxed(resource)),
            UploadSource::Path(path) => Source::Path { path, opened: None },
        };

        Self {
            state: Arc::new(Mutex::new(State { source: Some(source) })),
            size,
            error,
            client_filename: None,
            client_media_type: None,
        }
    }

    /// Like [`UploadedFile::new()`], with the numeric error code as received.
    pub fn with_error_code(source: impl Into<UploadSource>, size: Option<u64>, code: i64) -> std::result::Result<Self, InvalidArgument> {
        Ok(Self::new(source, size, UploadErrorStatus::try_from(code)?))
    }

    #[must_use]
    pub fn with_client_filename(self, client_filename: impl Into<String>) -> Self {
        Self {
            client_filename: Some(client_filename.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_client_media_type(self, client_media_type: impl Into<String>) -> Self {
        Self {
            client_media_type: Some(client_media_type.into()),
            ..self
        }
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn error(&self) -> UploadErrorStatus {
        self.error
    }

    /// The file name sent by the client. Don't trust it.
    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    /// The media type sent by the client. Don't trust it.
    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    /// Whether [`UploadedFile::move_to()`] succeeded.
    pub fn is_moved(&self) -> bool {
        self.lock().source.is_none()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_uploaded(&self) -> Result<()> {
        if self.error != UploadErrorStatus::Ok {
            return Err(RuntimeError::UploadFailed(self.error).into());
        }
        Ok(())
    }

    /// Returns the stream of the file. Fails when the upload failed or the
    /// file was moved.
    pub fn stream(&self) -> Result<Stream> {
        self.ensure_uploaded()?;

        let mut state = self.lock();
        match state.source.as_mut() {
            None => Err(RuntimeError::UploadAlreadyMoved.into()),
            Some(Source::Stream(stream)) => Ok(stream.clone()),
            Some(Source::Path { opened: Some(stream), .. }) => Ok(stream.clone()),
            Some(Source::Path { path, opened }) => {
                let stream = Stream::open(path.as_path(), "r")?;
                *opened = Some(stream.clone());
                Ok(stream)
            }
        }
    }

    /// Moves the file to `target`. A file on disk is renamed, a stream is
    /// copied from its start. Afterwards this value no longer refers to the
    /// source, and can't be moved again.
    pub fn move_to(&self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        if target.as_os_str().is_empty() {
            return Err(InvalidArgument::TargetPathEmpty.into());
        }

        self.ensure_uploaded()?;

        let mut state = self.lock();
        match &state.source {
            None => return Err(RuntimeError::UploadAlreadyMoved.into()),
            Some(Source::Path { path, .. }) => move_file(path, target)?,
            Some(Source::Stream(stream)) => copy_stream(stream, target)?,
        }

        tracing::debug!(target = %target.display(), "Moved uploaded file");
        state.source = None;
        Ok(())
    }
}

fn move_file(source: &Path, target: &Path) -> Result<()> {
    if fs::rename(source, target).is_err() {
        // Renaming doesn't work across file systems.
        fs::copy(source, target)?;
        fs::remove_file(source)?;
    }
    Ok(())
}

fn copy_stream(stream: &Stream, target: &Path) -> Result<()> {
    if stream.is_seekable() {
        stream.rewind()?;
    }

    let mut file = File::create(target)?;
    loop {
        let chunk = stream.read(COPY_CHUNK_SIZE)?;
        if chunk.is_empty() {
            break;
        }
        file.write_all(&chunk)?;
    }

    file.flush()?;
    Ok(())
}
