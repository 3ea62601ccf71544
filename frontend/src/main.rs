mod api;
mod components;
mod state;
mod storage;

use leptos::mount::mount_to_body;
use leptos::prelude::*;
use support_chat::ChatConfig;

use components::chat::ChatWindow;
use state::AppState;

/// Backend address and storage settings, baked in by `build.rs`.
fn config() -> ChatConfig {
    ChatConfig::from_values(
        option_env!("SUPPORT_CHAT_API_BASE"),
        option_env!("SUPPORT_CHAT_STORAGE_KEY"),
        option_env!("SUPPORT_CHAT_TIMEOUT_MS"),
    )
}

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide(&config());
    on_cleanup(move || state.release());

    view! {
        <div class="app-container">
            <ChatWindow />
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
