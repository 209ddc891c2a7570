use gloo_file::{Blob, ObjectUrl};
use shared::{PreviewFactory, SelectedImage};

/// Object URLs over in-memory blobs; each URL is revoked when dropped.
#[derive(Default)]
pub struct BrowserPreviews;

impl PreviewFactory for BrowserPreviews {
    type Handle = ObjectUrl;

    fn preview(&self, image: &SelectedImage) -> ObjectUrl {
        ObjectUrl::from(Blob::new_with_options(image.bytes(), Some(image.mime_type())))
    }

    fn segmentation(&self, bytes: Vec<u8>, mime_type: &str) -> ObjectUrl {
        ObjectUrl::from(Blob::new_with_options(bytes.as_slice(), Some(mime_type)))
    }
}
