use super::super::Model;
use super::super::Msg;
use super::utils::first_file;
use crate::api::{RemoteClients, fetch_client_config};
use gloo_file::File as GlooFile;
use shared::{AnalysisRequest, ClientConfig, SelectedImage, Settlement, ValidationError};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

pub fn load_config(ctx: &Context<Model>) {
    let link = ctx.link().clone();
    spawn_local(async move {
        match fetch_client_config().await {
            Ok(config) => link.send_message(Msg::ConfigLoaded(config)),
            Err(e) => link.send_message(Msg::ConfigFailed(e)),
        }
    });
}

pub fn handle_config_loaded(model: &mut Model, config: ClientConfig) -> bool {
    log::info!(
        "Classifier at {}, segmenter at {} ({} mode)",
        config.classifier_url(),
        config.segmenter_url(),
        config.segmentation_mode
    );
    if !model.orchestrator.set_mode(config.segmentation_mode) {
        log::warn!("Segmentation mode change deferred by a running analysis");
    }
    model.clients = Some(RemoteClients::new(&config));
    true
}

pub fn handle_config_failed(model: &mut Model, error: String) -> bool {
    log::error!("Failed to load client configuration: {}", error);
    model.error = Some(format!("Could not load configuration: {}", error));
    true
}

pub fn handle_file_chosen(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    model.pending_read += 1;
    let token = model.pending_read;
    let link = ctx.link().clone();

    spawn_local(async move {
        match gloo_file::futures::read_as_bytes(&file).await {
            Ok(bytes) => {
                let image = SelectedImage::new(file.name(), file.raw_mime_type(), bytes);
                link.send_message(Msg::FileRead(token, image));
            }
            Err(e) => link.send_message(Msg::SetError(Some(format!(
                "Could not read {}: {}",
                file.name(),
                e
            )))),
        }
    });

    false
}

pub fn handle_file_read(model: &mut Model, token: u64, image: SelectedImage) -> bool {
    if token != model.pending_read {
        log::debug!("Discarding superseded file read of {}", image.name());
        return false;
    }

    model.error = if !image.looks_like_image() {
        Some(format!(
            "{} does not look like an image. It will be sent as is.",
            image.name()
        ))
    } else if image.exceeds_size_hint() {
        Some(format!("{} is larger than 5MB. Analysis may be slow.", image.name()))
    } else {
        None
    };

    model.orchestrator.select_image(image);
    true
}

pub fn handle_remove_file(model: &mut Model) -> bool {
    model.pending_read += 1;
    model.orchestrator.clear();
    model.error = None;
    true
}

pub fn handle_submit(model: &mut Model, ctx: &Context<Model>) -> bool {
    let Some(clients) = model.clients.clone() else {
        model.error = Some("The analysis services are not configured yet.".into());
        return true;
    };

    match model.orchestrator.submit() {
        Ok(requests) => {
            model.error = None;
            dispatch(ctx, &clients, requests);
            true
        }
        Err(ValidationError::NoImageSelected) => true,
        Err(e) => {
            log::warn!("Submit rejected: {}", e);
            false
        }
    }
}

pub fn handle_retry_segmentation(model: &mut Model, ctx: &Context<Model>) -> bool {
    let Some(clients) = model.clients.clone() else {
        return false;
    };

    match model.orchestrator.retry_segmentation() {
        Ok(request) => {
            dispatch(ctx, &clients, vec![request]);
            true
        }
        Err(e) => {
            log::warn!("Retry rejected: {}", e);
            false
        }
    }
}

pub fn handle_settled(model: &mut Model, ctx: &Context<Model>, settlement: Settlement) -> bool {
    let follow_up = model.orchestrator.apply(settlement);

    if let (Some(request), Some(clients)) = (follow_up, model.clients.clone()) {
        dispatch(ctx, &clients, vec![request]);
    }
    true
}

pub fn dispatch(ctx: &Context<Model>, clients: &RemoteClients, requests: Vec<AnalysisRequest>) {
    for request in requests {
        let link = ctx.link().clone();
        let clients = clients.clone();

        spawn_local(async move {
            let settlement = request
                .execute(&clients.classifier, &clients.segmenter)
                .await;
            link.send_message(Msg::Settled(settlement));
        });
    }
}

pub fn handle_toggle_theme(model: &mut Model) -> bool {
    let Some(body) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
    else {
        return false;
    };

    let result = if model.theme == "light" {
        model.theme = "dark".to_string();
        body.class_list().add_1("dark-mode")
    } else {
        model.theme = "light".to_string();
        body.class_list().remove_1("dark-mode")
    };
    if let Err(e) = result {
        log::warn!("Theme class not updated: {:?}", e);
    }

    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file) = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .as_ref()
        .and_then(first_file)
    {
        ctx.link().send_message(Msg::FileChosen(file));
    }

    true
}

pub fn handle_paste(ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(file) = event
        .clipboard_data()
        .and_then(|data_transfer| data_transfer.files())
        .as_ref()
        .and_then(first_file)
    {
        event.prevent_default();
        ctx.link().send_message(Msg::FileChosen(file));
    }
    false
}
