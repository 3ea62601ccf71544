use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use support_chat::service::SubscriptionId;
use support_chat::{ChatConfig, EscalationStage, Message, SessionController};

use crate::api::HttpBackend;
use crate::storage::LocalStorageStore;

pub type Controller = SessionController<HttpBackend, LocalStorageStore>;

/// Shared application state, provided via Leptos context.
///
/// The controller owns the transcript; the signals below are a mirror that
/// is refreshed from every controller snapshot.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub messages: ReadSignal<Vec<Message>>,
    pub loading: ReadSignal<bool>,
    pub escalation: ReadSignal<EscalationStage>,

    controller: StoredValue<Rc<Controller>, LocalStorage>,
    subscription: SubscriptionId,
}

impl AppState {
    /// Create the controller, restore the transcript, and provide the state
    /// in the current Leptos context.
    pub fn provide(config: &ChatConfig) -> Self {
        let backend = HttpBackend::new(config);
        let store = LocalStorageStore::new(config.storage_key.clone());
        let controller = Rc::new(SessionController::initialize(backend, store));
        log::info!(
            "Chat session {} using backend {}",
            controller.session_id(),
            config.api_base
        );

        let snapshot = controller.snapshot();
        let (messages, set_messages) = signal(snapshot.transcript);
        let (loading, set_loading) = signal(snapshot.loading);
        let (escalation, set_escalation) = signal(snapshot.escalation);

        let subscription = controller.subscribe(move |snapshot| {
            set_messages.set(snapshot.transcript.clone());
            set_loading.set(snapshot.loading);
            set_escalation.set(snapshot.escalation);
        });

        let state = Self {
            messages,
            loading,
            escalation,
            controller: StoredValue::new_local(controller),
            subscription,
        };

        provide_context(state);
        state
    }

    fn controller(&self) -> Rc<Controller> {
        self.controller.get_value()
    }

    /// Send a chat turn. The controller rejects it while one is pending.
    pub fn send_message(&self, text: String) {
        let controller = self.controller();
        spawn_local(async move {
            let outcome = controller.send_turn(&text, None).await;
            log::debug!("Turn finished: {outcome:?}");
        });
    }

    pub fn clear_chat(&self) {
        self.controller().clear();
    }

    /// The user answered an escalation offer.
    pub fn answer_escalation(&self, consent: bool) {
        let outcome = self.controller().begin_escalation(consent);
        log::debug!("Escalation consent {consent}: {outcome:?}");
    }

    /// Hand over the details typed into the escalation form, or `None` if the
    /// user dismissed it.
    pub fn submit_escalation(&self, details: Option<String>) {
        let controller = self.controller();
        spawn_local(async move {
            let outcome = controller.complete_escalation(details.as_deref()).await;
            log::debug!("Escalation finished: {outcome:?}");
        });
    }

    /// Detach the signal mirror from the controller.
    pub fn release(&self) {
        let subscription = self.subscription;
        let _ = self
            .controller
            .try_with_value(|controller| controller.unsubscribe(subscription));
    }
}
