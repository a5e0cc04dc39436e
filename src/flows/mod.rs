//! The concrete wizards of the dashboard: buying credits and running a
//! custom request over uploaded files.

pub mod buy_credits;
pub mod custom_request;

pub use buy_credits::{
    AmountChoice, AmountForm, BuyCreditsFlow, BuyCreditsPayload, BuyCreditsReview,
    BuyCreditsStep, CardDetails, CreditsSelection, PaymentForm, PaymentMethod,
};
pub use custom_request::{
    ChosenFile, ChosenFiles, CustomRequestFlow, CustomRequestPayload, CustomRequestReview,
    CustomRequestStep, CustomizeForm, Customizations, FileKind, FilesForm, ModeSettings,
};
