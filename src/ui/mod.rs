pub mod admin;
pub mod buy_credits;
pub mod custom_request;
pub mod dashboard;
pub mod dialogs;
pub mod form_field;
pub mod queue;
pub mod step_indicator;
pub mod summaries;
pub mod terminal_guard;
pub mod toasts;

pub use buy_credits::BuyCreditsScreen;
pub use custom_request::CustomRequestScreen;
pub use dialogs::{HelpDialog, PaymentRequiredChoice, PaymentRequiredDialog};
pub use queue::{QueueScreen, QueuedRequest};
pub use summaries::SummariesScreen;

/// What a wizard screen asks the app to do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    None,
    /// Review step confirmed; the app sends the submission
    Submit,
    /// Esc on the first step, or out of the error placeholder
    Leave,
}
