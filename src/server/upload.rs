use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// One decoded part of a multipart request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    name: String,
    disposition: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl MultipartPart {
    /// A plain form-data part without a filename.
    #[must_use]
    pub fn new(name: impl Into<String>, body: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            disposition: Some(format!("form-data; name=\"{name}\"")),
            name,
            content_type: None,
            body,
        }
    }

    /// A file part, as a browser sends it.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        filename: &str,
        content_type: impl Into<String>,
        body: Vec<u8>,
    ) -> Self {
        let name = name.into();
        Self {
            disposition: Some(format!("form-data; name=\"{name}\"; filename=\"{filename}\"")),
            name,
            content_type: Some(content_type.into()),
            body,
        }
    }

    /// Replace the raw `Content-Disposition` header value.
    #[must_use]
    pub fn with_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = Some(disposition.into());
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn disposition(&self) -> Option<&str> {
        self.disposition.as_deref()
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Client filename from `Content-Disposition`, without any directory part.
    ///
    /// `C:\docs\cv.pdf` and `/home/me/cv.pdf` both yield `cv.pdf`.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        let disposition = self.disposition.as_deref()?;
        disposition
            .split(';')
            .map(str::trim)
            .find(|token| token.starts_with("filename"))
            .map(|token| {
                let raw = token
                    .split_once('=')
                    .map(|(_, v)| v)
                    .unwrap_or("")
                    .trim()
                    .replace('"', "");
                match raw.rfind(['/', '\\']) {
                    Some(idx) => raw[idx + 1..].to_string(),
                    None => raw,
                }
            })
    }

    /// Convert into an [`UploadedFile`]; `None` when the part carries no filename.
    #[must_use]
    pub fn to_uploaded_file(&self) -> Option<UploadedFile> {
        let file_name = self.filename().filter(|n| !n.is_empty())?;
        Some(UploadedFile::new(
            file_name,
            self.content_type.clone(),
            self.body.clone(),
        ))
    }
}

/// A file received in a multipart request.
///
/// The size is always the length of the content; there is no way to set one
/// without the other.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    content: Vec<u8>,
}

impl UploadedFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            content,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
    }

    pub fn set_content_type(&mut self, content_type: Option<String>) {
        self.content_type = content_type;
    }

    pub fn set_content(&mut self, content: Vec<u8>) {
        self.content = content;
    }

    #[must_use]
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    /// Lower-cased extension without the dot; empty when there is none.
    #[must_use]
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }

    /// Write the content to `dest`, creating missing parent directories.
    pub fn save_to(&self, dest: impl AsRef<Path>) -> io::Result<()> {
        let dest = dest.as_ref();
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, &self.content)
    }

    /// Write the content into `dir` under the original file name.
    pub fn save_to_directory(&self, dir: impl AsRef<Path>) -> io::Result<()> {
        self.save_to(dir.as_ref().join(&self.file_name))
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}
