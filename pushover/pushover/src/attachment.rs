use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr as _;

use mime::Mime;
use thiserror::Error;

/// Attachment error.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// Error from [`std::io`].
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    /// Failed to infer MIME type, no extra information.
    #[error("unknown MIME type")]
    Infer,
}

/// Message attachment, one per message. Image in most cases. <https://pushover.net/api#attachments>
///
/// Size is not checked locally, Pushover enforces its limit on the server side.
#[derive(Debug)]
pub struct Attachment<'a> {
    /// Filename.
    pub(crate) filename: Cow<'a, str>,
    /// MIME type, inferred when loaded from path or bytes.
    pub(crate) mime: Mime,
    /// Attachment content.
    pub(crate) content: Vec<u8>,
}

fn infer_mime(content: &[u8]) -> Result<(Mime, &'static str), AttachmentError> {
    let inferred = infer::get(content).ok_or(AttachmentError::Infer)?;
    let mime = Mime::from_str(inferred.mime_type()).map_err(|_e| AttachmentError::Infer)?;
    Ok((mime, inferred.extension()))
}

impl<'a> Attachment<'a> {
    /// Creates an [`Attachment`].
    pub fn new<T>(filename: T, mime: Mime, content: &[u8]) -> Attachment<'a>
    where
        T: 'a + Into<Cow<'a, str>>,
    {
        Self {
            filename: filename.into(),
            mime,
            content: content.to_vec(),
        }
    }

    /// Creates an [`Attachment`] from path.
    pub fn from_path<T>(path: T) -> Result<Attachment<'a>, AttachmentError>
    where
        T: AsRef<Path>,
    {
        let mut buffer = Vec::new();
        let mut handle = File::open(path.as_ref())?;
        handle.read_to_end(&mut buffer)?;
        let filename = path
            .as_ref()
            .file_name()
            .map_or("filename", |t| t.to_str().map_or("filename", |t| t));
        let (mime, _) = infer_mime(&buffer)?;
        Ok(Self {
            filename: filename.to_owned().into(),
            mime,
            content: buffer,
        })
    }

    /// Filename sent to Pushover.
    pub fn filename(&self) -> &str {
        self.filename.as_ref()
    }

    /// MIME type sent to Pushover.
    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    /// Raw content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Creates an [`Attachment`] from bytes e.g. standard input, named after the inferred extension.
impl<'a> TryFrom<Vec<u8>> for Attachment<'a> {
    type Error = AttachmentError;

    fn try_from(content: Vec<u8>) -> Result<Self, Self::Error> {
        let (mime, extension) = infer_mime(&content)?;
        Ok(Self {
            filename: format!("file.{extension}").into(),
            mime,
            content,
        })
    }
}
