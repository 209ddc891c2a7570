use std::fmt;
use std::sync::Arc;

/// Upload size suggested to users. Larger files are still sent.
pub const SIZE_HINT_BYTES: usize = 5 * 1024 * 1024;

/// The file chosen by the user. Cloning shares the payload.
#[derive(Clone, PartialEq)]
pub struct SelectedImage {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl SelectedImage {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn looks_like_image(&self) -> bool {
        self.mime_type.to_ascii_lowercase().starts_with("image/")
    }

    pub fn exceeds_size_hint(&self) -> bool {
        self.len() > SIZE_HINT_BYTES
    }
}

impl fmt::Debug for SelectedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedImage")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Creates displayable handles for image data.
///
/// A handle is released when it is dropped, so the orchestrator's ownership of
/// the value is the whole release discipline.
pub trait PreviewFactory {
    type Handle;

    fn preview(&self, image: &SelectedImage) -> Self::Handle;

    fn segmentation(&self, bytes: Vec<u8>, mime_type: &str) -> Self::Handle;
}
