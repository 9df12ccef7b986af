use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use crate::error::CoreError;

/// Which of the two try-on inputs an image fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageRole {
    Person,
    Garment,
}

impl ImageRole {
    /// Name for display in UI
    pub fn name(&self) -> &str {
        match self {
            Self::Person => "Person",
            Self::Garment => "Garment",
        }
    }

    /// Short identifier used in file names and logs
    pub fn slug(&self) -> &str {
        match self {
            Self::Person => "person",
            Self::Garment => "garment",
        }
    }

    /// Local storage key holding the preview reference
    pub fn storage_key(&self) -> &str {
        match self {
            Self::Person => "person_preview",
            Self::Garment => "garment_preview",
        }
    }

    /// Multipart field name expected by the upload endpoints
    pub fn form_field(&self) -> &str {
        match self {
            Self::Person => "person_image",
            Self::Garment => "clothing_image",
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            Self::Person => "🧍",
            Self::Garment => "👕",
        }
    }

    pub fn all() -> [ImageRole; 2] {
        [Self::Person, Self::Garment]
    }
}

/// How the orchestrator reaches a try-on result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineVariant {
    /// Upload, then process, then feedback: three calls
    #[default]
    Stepwise,
    /// One combined upload+process call, then feedback
    Full,
}

impl PipelineVariant {
    pub fn id(&self) -> &str {
        match self {
            Self::Stepwise => "stepwise",
            Self::Full => "full",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Stepwise => "Upload, process and feedback as separate calls",
            Self::Full => "Combined upload+process call, then feedback",
        }
    }
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PipelineVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stepwise" => Ok(Self::Stepwise),
            "full" => Ok(Self::Full),
            other => Err(CoreError::UnknownPipeline(other.to_string())),
        }
    }
}

/// An image picked by the user. Bytes are shared, cloning is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// Content type for the multipart header. Guessed from the extension only.
    pub fn mime(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            Some("bmp") => "image/bmp",
            _ => "application/octet-stream",
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
