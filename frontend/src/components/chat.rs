use leptos::ev;
use leptos::prelude::*;
use support_chat::{EscalationStage, Message, MessageRole};

use crate::state::AppState;

/// Transcript, escalation form, and input bar.
#[component]
pub fn ChatWindow() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="chat-area">
            <div class="chat-header">
                <h1>"AI Customer Support"</h1>
                <p>"Ask anything — chat persists in your browser"</p>
            </div>

            // Messages
            <div class="messages-container">
                {move || {
                    if state.messages.get().is_empty() {
                        view! { <div class="empty-state">"Say hi 👋"</div> }.into_any()
                    } else {
                        view! {
                            <For
                                each=move || state.messages.get()
                                key=|m| m.id.clone()
                                let:msg
                            >
                                <TranscriptEntry msg=msg />
                            </For>
                        }
                            .into_any()
                    }
                }}
            </div>

            {move || {
                (state.escalation.get() == EscalationStage::AwaitingDetails)
                    .then(|| view! { <EscalationForm /> })
            }}

            <ChatInput />
        </main>
    }
}

#[component]
fn TranscriptEntry(msg: Message) -> impl IntoView {
    match msg.role {
        MessageRole::Typing => view! { <TypingIndicator /> }.into_any(),
        role => view! {
            <MessageBubble
                role=role
                text=msg.text.unwrap_or_default()
                escalate_offered=msg.escalate_offered
            />
        }
            .into_any(),
    }
}

/// A single chat message bubble, with escalation buttons when offered.
#[component]
fn MessageBubble(role: MessageRole, text: String, escalate_offered: bool) -> impl IntoView {
    let state = expect_context::<AppState>();
    let css_class = format!("message {role}");

    view! {
        <div class=css_class>
            <div class="role-label">{role.as_str()}</div>
            <div>{text}</div>
            {escalate_offered.then(|| view! {
                <div class="escalate-actions">
                    <button on:click=move |_| state.answer_escalation(true)>
                        "Escalate to support"
                    </button>
                    <button on:click=move |_| state.answer_escalation(false)>
                        "No thanks"
                    </button>
                </div>
            })}
        </div>
    }
}

#[component]
fn TypingIndicator() -> impl IntoView {
    view! {
        <div class="message bot typing">
            <span class="dot"></span>
            <span class="dot"></span>
            <span class="dot"></span>
        </div>
    }
}

/// Collects the free-text query and contact address for an escalation.
#[component]
fn EscalationForm() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (details, set_details) = signal(String::new());

    view! {
        <div class="escalation-form">
            <label>
                "Please type your query and your contact email "
                "(for example: 'Refund not processed — mymail@example.com'):"
            </label>
            <textarea
                rows="2"
                prop:value=details
                on:input=move |ev| set_details.set(event_target_value(&ev))
            />
            <div class="escalation-actions">
                <button on:click=move |_| state.submit_escalation(Some(details.get_untracked()))>
                    "Send to support"
                </button>
                <button on:click=move |_| state.submit_escalation(None)>"Cancel"</button>
            </div>
        </div>
    }
}

/// Chat input with send and clear buttons.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());

    let is_sending = move || state.loading.get();

    let send = move || {
        let text = input.get_untracked().trim().to_string();
        if text.is_empty() || state.loading.get_untracked() {
            return;
        }
        set_input.set(String::new());
        state.send_message(text);
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Type a message... (Enter to send, Shift+Enter for newline)"
                    prop:value=input
                    on:input=move |ev| {
                        set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                />
                <button class="send-btn" on:click=move |_| send() disabled=is_sending>
                    {move || if is_sending() { "Sending..." } else { "Send" }}
                </button>
                <button class="clear-btn" on:click=move |_| state.clear_chat()>
                    "Clear Chat"
                </button>
            </div>
        </div>
    }
}
