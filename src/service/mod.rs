pub mod session_controller;

pub use session_controller::{
    EscalationOutcome, EscalationStage, SessionController, SessionSnapshot, SubscriptionId,
    TurnOutcome,
};
