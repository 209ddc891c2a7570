mod api;
mod components;
mod preview;

use api::RemoteClients;
use components::handlers;
use components::header::render_header;
use components::results::render_results;
use components::theme_toggle::render_theme_toggle;
use components::upload_section::render_upload_section;
use components::utils::{alert, render_error_message};
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use preview::BrowserPreviews;
use shared::{ClientConfig, SegmentationMode, SelectedImage, Settlement, UploadOrchestrator};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

// Yew msg components
pub enum Msg {
    // Configuration
    ConfigLoaded(ClientConfig),
    ConfigFailed(String),

    // File operations
    FileChosen(GlooFile),
    FileRead(u64, SelectedImage),
    RemoveFile,

    // Analysis operations
    Submit,
    RetrySegmentation,
    Settled(Settlement),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),
    ToggleTheme,

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Main component
pub struct Model {
    orchestrator: UploadOrchestrator<BrowserPreviews>,
    clients: Option<RemoteClients>,
    error: Option<String>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
    theme: String,
    pending_read: u64,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            orchestrator: UploadOrchestrator::new(BrowserPreviews, SegmentationMode::default()),
            clients: None,
            error: None,
            is_dragging: false,
            paste_listener: None,
            theme: "light".to_string(),
            pending_read: 0,
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        } else {
            log::warn!("No global window, paste support disabled");
        }

        handlers::load_config(ctx);
        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let render = match msg {
            // Configuration
            Msg::ConfigLoaded(config) => handlers::handle_config_loaded(self, config),
            Msg::ConfigFailed(error) => handlers::handle_config_failed(self, error),

            // File operations
            Msg::FileChosen(file) => handlers::handle_file_chosen(self, ctx, file),
            Msg::FileRead(token, image) => handlers::handle_file_read(self, token, image),
            Msg::RemoveFile => handlers::handle_remove_file(self),

            // Analysis operations
            Msg::Submit => handlers::handle_submit(self, ctx),
            Msg::RetrySegmentation => handlers::handle_retry_segmentation(self, ctx),
            Msg::Settled(settlement) => handlers::handle_settled(self, ctx, settlement),

            // UI states
            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::ToggleTheme => handlers::handle_toggle_theme(self),

            // Input events
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(ctx, event),
        };

        if let Some(notification) = self.orchestrator.take_notification() {
            alert(&notification);
        }
        render
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }
                { render_theme_toggle(&self.theme, ctx.link()) }

                <main class="main-content">
                    { render_upload_section(self, ctx) }
                    { render_error_message(self) }
                    { render_results(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"Brain Tumor Detection | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
