use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-heart-pulse"></i> {" Brain Tumor Detection"}</h1>
            <p class="subtitle">{"Upload MRI scan for instant analysis"}</p>
        </header>
    }
}
