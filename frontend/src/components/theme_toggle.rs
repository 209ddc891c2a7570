use super::super::Model;
use super::super::Msg;
use yew::html::Scope;
use yew::prelude::*;

pub fn render_theme_toggle(theme: &str, link: &Scope<Model>) -> Html {
    let is_light = theme == "light";
    html! {
        <div class="top-right">
            <button
                id="theme-toggle"
                class="theme-toggle"
                onclick={link.callback(|_| Msg::ToggleTheme)}
                title={ if is_light { "Switch to Dark Mode" } else { "Switch to Light Mode" } }
            >
                { if is_light {
                    html! { <i class="fa-solid fa-sun toggle-icon"></i> }
                } else {
                    html! { <i class="fa-solid fa-moon toggle-icon"></i> }
                }}
            </button>
        </div>
    }
}
