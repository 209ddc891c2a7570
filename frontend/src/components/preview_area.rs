use super::super::{Model, Msg};
use super::utils::{debounce, truncate_name};
use shared::RequestPhase;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();
    let submit_disabled = !model.orchestrator.can_submit() || model.clients.is_none();

    html! {
        <div id="preview-container">
            { render_selected_image_preview(model, ctx) }
            <div class="button-container">
                <button
                    class="analyze-btn"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Submit)
                    })}
                    disabled={submit_disabled}
                >
                    { render_analyze_button_content(model) }
                </button>
            </div>
        </div>
    }
}

fn render_selected_image_preview(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    match (model.orchestrator.image(), model.orchestrator.preview()) {
        (Some(image), Some(url)) => html! {
            <div class="preview-item selected">
                <img id="actual-image-preview"
                    src={url.to_string()}
                    alt="Preview" />
                <button
                    class="remove-btn"
                    title="Remove this image"
                    onclick={link.callback(|e: MouseEvent| {
                        e.stop_propagation();
                        Msg::RemoveFile
                    })}
                >
                    <i class="fa-solid fa-times" style="font-size: 10px;"></i>
                </button>
                <p class="preview-filename">{ truncate_name(image.name(), 40) }</p>
            </div>
        },
        _ => html! {
            <div class="select-preview">
                <p>{"Select an MRI scan to preview it here"}</p>
            </div>
        },
    }
}

fn render_analyze_button_content(model: &Model) -> Html {
    if model.orchestrator.phase() == RequestPhase::Submitting {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> }
    } else if model.clients.is_none() {
        html! { <><i class="fa-solid fa-plug"></i>{" Connecting..."}</> }
    } else {
        html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Start Analysis"}</> }
    }
}
