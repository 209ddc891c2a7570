use futures::future::{Either, select};
use gloo_file::Blob;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use shared::wire::{CLASSIFIER_FILE_FIELD, SEGMENTER_FILE_FIELD, SEGMENTER_HINT_FIELD};
use shared::{
    ClassificationResponse, Classifier, ClientConfig, RemoteError, SegmentationResponse,
    SelectedImage, Segmenter,
};
use std::time::Duration;
use wasm_bindgen::JsValue;
use web_sys::FormData;

#[derive(Clone)]
pub struct ClassifierClient {
    url: String,
}

#[derive(Clone)]
pub struct SegmenterClient {
    url: String,
    timeout: Duration,
}

#[derive(Clone)]
pub struct RemoteClients {
    pub classifier: ClassifierClient,
    pub segmenter: SegmenterClient,
}

impl RemoteClients {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            classifier: ClassifierClient {
                url: config.classifier_url(),
            },
            segmenter: SegmenterClient {
                url: config.segmenter_url(),
                timeout: config.segmenter_timeout(),
            },
        }
    }
}

pub async fn fetch_client_config() -> Result<ClientConfig, String> {
    let response = Request::get("/api/config")
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Server error: {} - {}", status, body));
    }

    response
        .json::<ClientConfig>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

fn network_error(e: gloo_net::Error) -> RemoteError {
    RemoteError::Network(e.to_string())
}

fn js_error(value: JsValue) -> RemoteError {
    RemoteError::Network(format!("{:?}", value))
}

fn image_form(field: &str, image: &SelectedImage) -> Result<FormData, RemoteError> {
    let form_data = FormData::new().map_err(js_error)?;
    let blob: web_sys::Blob =
        Blob::new_with_options(image.bytes(), Some(image.mime_type())).into();
    form_data
        .append_with_blob_and_filename(field, &blob, image.name())
        .map_err(js_error)?;
    Ok(form_data)
}

impl Classifier for ClassifierClient {
    async fn classify(&self, image: &SelectedImage) -> Result<ClassificationResponse, RemoteError> {
        let form_data = image_form(CLASSIFIER_FILE_FIELD, image)?;

        let response = Request::post(&self.url)
            .body(form_data)
            .map_err(network_error)?
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        ClassificationResponse::from_http(status, &body)
    }
}

impl SegmenterClient {
    async fn exchange(
        &self,
        image: &SelectedImage,
        tumor_type: Option<&str>,
    ) -> Result<SegmentationResponse, RemoteError> {
        let form_data = image_form(SEGMENTER_FILE_FIELD, image)?;
        if let Some(tumor_type) = tumor_type {
            form_data
                .append_with_str(SEGMENTER_HINT_FIELD, tumor_type)
                .map_err(js_error)?;
        }

        let response = Request::post(&self.url)
            .body(form_data)
            .map_err(network_error)?
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let content_type = response.headers().get("content-type");
        let body = response.binary().await.map_err(network_error)?;
        SegmentationResponse::from_http(status, content_type.as_deref(), body)
    }
}

impl Segmenter for SegmenterClient {
    async fn segment(
        &self,
        image: &SelectedImage,
        tumor_type: Option<&str>,
    ) -> Result<SegmentationResponse, RemoteError> {
        let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
        let exchange = Box::pin(self.exchange(image, tumor_type));
        let deadline = Box::pin(TimeoutFuture::new(millis));

        // The fetch itself keeps running; its answer is simply never read.
        match select(exchange, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => {
                log::warn!("Segmentation exceeded {}s", self.timeout.as_secs());
                Err(RemoteError::Timeout(self.timeout))
            }
        }
    }
}
