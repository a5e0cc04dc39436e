//! Buy credits wizard: amount, payment method, review.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::{
    AddCardRequest, ApiError, CreditPurchaseReceipt, CreditPurchaseRequest, DashboardApi,
};
use crate::config::{CreditPreset, CreditsConfig};
use crate::routes::Route;
use crate::wizard::{
    StepController, StepDefinition, StepForm, SubmissionTarget, ValidationErrors, WizardError,
    WizardFlow, WizardState,
};

/// `MM/YY`
static EXPIRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2})\s*/\s*(\d{2})\s*$").expect("expiry pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyCreditsStep {
    Amount,
    Payment,
    Review,
}

pub const AMOUNT_STEP: u8 = 1;
pub const PAYMENT_STEP: u8 = 2;
pub const REVIEW_STEP: u8 = 3;

/// Credits the user wants to buy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditsSelection {
    pub credits: u32,
    /// Set when the amount came from a preset bundle
    pub preset: Option<CreditPreset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    /// Digits only
    pub card_number: String,
    pub name: String,
    pub exp_month: u8,
    /// Two-digit year
    pub exp_year: u8,
    pub cvc: String,
    pub save_card: bool,
}

impl PaymentMethod {
    pub fn last4(&self) -> &str {
        let len = self.card_number.len();
        &self.card_number[len.saturating_sub(4)..]
    }

    /// `•••• 4242`
    pub fn masked(&self) -> String {
        format!("•••• {}", self.last4())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuyCreditsPayload {
    Amount(CreditsSelection),
    Payment(PaymentMethod),
}

pub struct BuyCreditsFlow {
    steps: [StepDefinition<BuyCreditsStep>; 3],
}

impl BuyCreditsFlow {
    pub fn new() -> Self {
        Self {
            steps: [
                StepDefinition {
                    id: AMOUNT_STEP,
                    label: "Select amount",
                    kind: BuyCreditsStep::Amount,
                },
                StepDefinition {
                    id: PAYMENT_STEP,
                    label: "Payment method",
                    kind: BuyCreditsStep::Payment,
                },
                StepDefinition {
                    id: REVIEW_STEP,
                    label: "Review",
                    kind: BuyCreditsStep::Review,
                },
            ],
        }
    }
}

impl Default for BuyCreditsFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn selection(state: &WizardState<BuyCreditsPayload>) -> Result<&CreditsSelection, WizardError> {
    match state.require(AMOUNT_STEP)? {
        BuyCreditsPayload::Amount(selection) => Ok(selection),
        _ => Err(WizardError::WrongStep(AMOUNT_STEP)),
    }
}

fn payment(state: &WizardState<BuyCreditsPayload>) -> Result<&PaymentMethod, WizardError> {
    match state.require(PAYMENT_STEP)? {
        BuyCreditsPayload::Payment(method) => Ok(method),
        _ => Err(WizardError::WrongStep(PAYMENT_STEP)),
    }
}

impl WizardFlow for BuyCreditsFlow {
    type StepKind = BuyCreditsStep;
    type Payload = BuyCreditsPayload;
    type Submission = CreditPurchaseRequest;

    fn steps(&self) -> &[StepDefinition<BuyCreditsStep>] {
        &self.steps
    }

    fn step_kind_of(payload: &BuyCreditsPayload) -> BuyCreditsStep {
        match payload {
            BuyCreditsPayload::Amount(_) => BuyCreditsStep::Amount,
            BuyCreditsPayload::Payment(_) => BuyCreditsStep::Payment,
        }
    }

    fn build_submission(
        &self,
        state: &WizardState<BuyCreditsPayload>,
    ) -> Result<CreditPurchaseRequest, WizardError> {
        let selection = selection(state)?;
        let method = payment(state)?;
        Ok(CreditPurchaseRequest {
            credits: selection.credits,
            card_number: method.card_number.clone(),
            name: method.name.clone(),
            exp_month: format!("{:02}", method.exp_month),
            exp_year: format!("{:02}", method.exp_year),
            cvc: method.cvc.clone(),
            save_card: method.save_card,
        })
    }
}

#[async_trait]
impl SubmissionTarget for BuyCreditsFlow {
    type Response = CreditPurchaseReceipt;

    async fn send(
        api: &dyn DashboardApi,
        submission: CreditPurchaseRequest,
    ) -> Result<CreditPurchaseReceipt, ApiError> {
        api.buy_credits(&submission).await
    }

    fn success_route() -> Route {
        Route::Dashboard
    }

    fn success_message(receipt: &CreditPurchaseReceipt) -> String {
        format!("Purchased {} credits", receipt.credits)
    }
}

/// What the review step shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyCreditsReview {
    pub credits: u32,
    pub price: Option<String>,
    pub card: String,
    pub name: String,
}

impl BuyCreditsReview {
    pub fn from_controller(
        controller: &StepController<BuyCreditsFlow>,
    ) -> Result<Self, WizardError> {
        let selection = selection(controller.state())?;
        let method = payment(controller.state())?;
        Ok(Self {
            credits: selection.credits,
            price: selection.preset.as_ref().map(|p| p.price.clone()),
            card: method.masked(),
            name: method.name.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountChoice {
    /// Index into the configured presets
    Preset(usize),
    Custom,
}

/// Step 1: pick a bundle or type an amount
#[derive(Debug, Clone)]
pub struct AmountForm {
    pub presets: Vec<CreditPreset>,
    pub choice: Option<AmountChoice>,
    pub custom_amount: String,
    min: u32,
    max: u32,
}

impl AmountForm {
    pub fn new(config: &CreditsConfig, previous: Option<&CreditsSelection>) -> Self {
        let mut form = Self {
            presets: config.presets.clone(),
            choice: None,
            custom_amount: String::new(),
            min: config.min_custom_credits,
            max: config.max_custom_credits,
        };
        if let Some(prev) = previous {
            let preset_idx = prev
                .preset
                .as_ref()
                .and_then(|p| form.presets.iter().position(|q| q == p));
            match preset_idx {
                Some(idx) => form.choice = Some(AmountChoice::Preset(idx)),
                None => {
                    form.choice = Some(AmountChoice::Custom);
                    form.custom_amount = prev.credits.to_string();
                }
            }
        }
        form
    }

    /// Options in display order: presets then "Custom"
    pub fn option_count(&self) -> usize {
        self.presets.len() + 1
    }

    pub fn select(&mut self, index: usize) {
        self.choice = if index < self.presets.len() {
            Some(AmountChoice::Preset(index))
        } else {
            Some(AmountChoice::Custom)
        };
    }

    pub fn bounds(&self) -> (u32, u32) {
        (self.min, self.max)
    }
}

impl StepForm for AmountForm {
    type Payload = CreditsSelection;

    fn validate(&self) -> Result<CreditsSelection, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self.choice {
            None => errors.push("amount", "Select an amount of credits"),
            Some(AmountChoice::Preset(idx)) => match self.presets.get(idx) {
                Some(preset) => {
                    return Ok(CreditsSelection {
                        credits: preset.credits,
                        preset: Some(preset.clone()),
                    })
                }
                None => errors.push("amount", "Select an amount of credits"),
            },
            Some(AmountChoice::Custom) => match self.custom_amount.trim().parse::<u32>() {
                Ok(credits) if (self.min..=self.max).contains(&credits) => {
                    return Ok(CreditsSelection {
                        credits,
                        preset: None,
                    })
                }
                _ => errors.push(
                    "custom_amount",
                    format!("Enter a whole number between {} and {}", self.min, self.max),
                ),
            },
        }
        Err(errors)
    }
}

/// Luhn checksum over a digit string
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    !digits.is_empty() && sum % 10 == 0
}

/// Parse `MM/YY` into (month, year)
pub fn parse_expiry(value: &str) -> Option<(u8, u8)> {
    let caps = EXPIRY_RE.captures(value)?;
    let month: u8 = caps[1].parse().ok()?;
    let year: u8 = caps[2].parse().ok()?;
    (1..=12).contains(&month).then_some((month, year))
}

/// Step 2: card details
#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    pub card_number: String,
    pub name: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvc: String,
    pub save_card: bool,
    /// Account balance shown next to the form
    pub balance: u64,
}

impl PaymentForm {
    pub fn new(balance: u64, previous: Option<&PaymentMethod>) -> Self {
        match previous {
            Some(prev) => Self {
                card_number: prev.card_number.clone(),
                name: prev.name.clone(),
                expiry: format!("{:02}/{:02}", prev.exp_month, prev.exp_year),
                cvc: prev.cvc.clone(),
                save_card: prev.save_card,
                balance,
            },
            None => Self {
                balance,
                ..Self::default()
            },
        }
    }
}

/// Card fields without the holder name; what the backend stores for a saved card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    /// Digits only
    pub card_number: String,
    pub exp_month: u8,
    pub exp_year: u8,
    pub cvc: String,
}

impl CardDetails {
    pub fn to_add_card_request(&self) -> AddCardRequest {
        AddCardRequest {
            exp_month: format!("{:02}", self.exp_month),
            exp_year: format!("{:02}", self.exp_year),
            card_number: self.card_number.clone(),
            cvc: self.cvc.clone(),
        }
    }
}

impl PaymentForm {
    /// Number, expiry and CVC checks shared by the wizard and `add-card`
    pub fn validate_card(&self) -> Result<CardDetails, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let card = self.check_card(&mut errors);
        match card {
            Some(card) if errors.is_empty() => Ok(card),
            _ => Err(errors),
        }
    }

    fn check_card(&self, errors: &mut ValidationErrors) -> Option<CardDetails> {
        let digits: String = self.card_number.chars().filter(|c| !c.is_whitespace()).collect();
        if !(13..=19).contains(&digits.len())
            || !digits.chars().all(|c| c.is_ascii_digit())
            || !luhn_valid(&digits)
        {
            errors.push("card_number", "Enter a valid card number");
        }

        let expiry = parse_expiry(&self.expiry);
        if expiry.is_none() {
            errors.push("expiry", "Use MM/YY");
        }

        let cvc = self.cvc.trim();
        if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
            errors.push("cvc", "CVC must be 3 or 4 digits");
        }

        let (exp_month, exp_year) = expiry?;
        Some(CardDetails {
            card_number: digits,
            exp_month,
            exp_year,
            cvc: cvc.to_string(),
        })
    }
}

impl StepForm for PaymentForm {
    type Payload = PaymentMethod;

    fn validate(&self) -> Result<PaymentMethod, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let card = self.check_card(&mut errors);

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("name", "Name on card is required");
        }

        match card {
            Some(card) if errors.is_empty() => Ok(PaymentMethod {
                card_number: card.card_number,
                name: name.to_string(),
                exp_month: card.exp_month,
                exp_year: card.exp_year,
                cvc: card.cvc,
                save_card: self.save_card,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::wizard::{submit, SubmitOutcome};

    fn payment_form() -> PaymentForm {
        PaymentForm {
            card_number: "4242 4242 4242 4242".into(),
            name: "Ada Lovelace".into(),
            expiry: "12/30".into(),
            cvc: "123".into(),
            save_card: true,
            balance: 20,
        }
    }

    fn reach_review(controller: &mut StepController<BuyCreditsFlow>) {
        let mut amount = AmountForm::new(&CreditsConfig::default(), None);
        amount.select(1);
        controller
            .commit_and_advance(BuyCreditsPayload::Amount(amount.validate().unwrap()))
            .unwrap();
        controller
            .commit_and_advance(BuyCreditsPayload::Payment(payment_form().validate().unwrap()))
            .unwrap();
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4242424242424242"));
        assert!(luhn_valid("4000056655665556"));
        assert!(!luhn_valid("4242424242424241"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("04/27"), Some((4, 27)));
        assert_eq!(parse_expiry("4 / 27"), Some((4, 27)));
        assert_eq!(parse_expiry("13/27"), None);
        assert_eq!(parse_expiry("00/27"), None);
        assert_eq!(parse_expiry("0427"), None);
    }

    #[test]
    fn test_amount_requires_a_choice() {
        let form = AmountForm::new(&CreditsConfig::default(), None);
        let errors = form.validate().unwrap_err();
        assert!(errors.for_field("amount").is_some());
        assert!(!form.can_advance());
    }

    #[test]
    fn test_custom_amount_bounds() {
        let mut form = AmountForm::new(&CreditsConfig::default(), None);
        form.select(form.presets.len());
        form.custom_amount = "50".into();
        assert!(form.validate().is_err());
        form.custom_amount = "250".into();
        assert_eq!(
            form.validate().unwrap(),
            CreditsSelection { credits: 250, preset: None }
        );
        form.custom_amount = "abc".into();
        assert!(form.validate().unwrap_err().for_field("custom_amount").is_some());
    }

    #[test]
    fn test_amount_form_prefills_previous_choice() {
        let config = CreditsConfig::default();
        let preset = config.presets[2].clone();
        let form = AmountForm::new(
            &config,
            Some(&CreditsSelection { credits: preset.credits, preset: Some(preset) }),
        );
        assert_eq!(form.choice, Some(AmountChoice::Preset(2)));

        let custom = AmountForm::new(&config, Some(&CreditsSelection { credits: 777, preset: None }));
        assert_eq!(custom.choice, Some(AmountChoice::Custom));
        assert_eq!(custom.custom_amount, "777");
    }

    #[test]
    fn test_payment_form_reports_each_field() {
        let form = PaymentForm {
            card_number: "1234".into(),
            name: " ".into(),
            expiry: "13/30".into(),
            cvc: "12".into(),
            save_card: false,
            balance: 0,
        };
        let errors = form.validate().unwrap_err();
        for field in ["card_number", "name", "expiry", "cvc"] {
            assert!(errors.for_field(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn test_payment_form_normalizes_card() {
        let method = payment_form().validate().unwrap();
        assert_eq!(method.card_number, "4242424242424242");
        assert_eq!(method.masked(), "•••• 4242");
        assert_eq!((method.exp_month, method.exp_year), (12, 30));

        let again = PaymentForm::new(20, Some(&method));
        assert_eq!(again.expiry, "12/30");
        assert_eq!(again.validate().unwrap(), method);
    }

    #[test]
    fn test_review_shows_credits_and_masked_card() {
        let mut controller = StepController::new(BuyCreditsFlow::new());
        reach_review(&mut controller);

        assert!(controller.is_final_step());
        let review = BuyCreditsReview::from_controller(&controller).unwrap();
        assert_eq!(review.credits, 500);
        assert_eq!(review.card, "•••• 4242");
        assert_eq!(review.price.as_deref(), Some("$5"));
    }

    #[tokio::test]
    async fn test_submit_sends_one_purchase() {
        let api = MockApi::new();
        let mut controller = StepController::new(BuyCreditsFlow::new());
        reach_review(&mut controller);

        let outcome = submit(&mut controller, &api, "en").await.unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Navigated { route: Route::Dashboard, .. }
        ));
        assert_eq!(outcome.toast().message, "Purchased 500 credits");

        let purchases = api.purchases();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].credits, 500);
        assert!(purchases[0].card_number.ends_with("4242"));
        assert_eq!(purchases[0].exp_month, "12");
    }

    #[test]
    fn test_forward_jump_to_review_has_nothing_to_show() {
        let mut controller = StepController::new(BuyCreditsFlow::new());
        controller.go_to_step(REVIEW_STEP);
        assert_eq!(
            BuyCreditsReview::from_controller(&controller),
            Err(WizardError::MissingPayload(AMOUNT_STEP))
        );
    }

    #[test]
    fn test_card_checks_skip_holder_name() {
        let form = PaymentForm {
            card_number: "4242 4242 4242 4242".into(),
            expiry: "3/29".into(),
            cvc: "1234".into(),
            ..PaymentForm::default()
        };
        let card = form.validate_card().unwrap();
        assert_eq!(
            card.to_add_card_request(),
            AddCardRequest {
                exp_month: "03".into(),
                exp_year: "29".into(),
                card_number: "4242424242424242".into(),
                cvc: "1234".into(),
            }
        );
        // The wizard still wants a name
        assert!(form.validate().unwrap_err().for_field("name").is_some());

        let bad = PaymentForm {
            card_number: "4242 4242 4242 4241".into(),
            expiry: "13/29".into(),
            cvc: "12".into(),
            ..PaymentForm::default()
        };
        let errors = bad.validate_card().unwrap_err();
        assert!(errors.for_field("card_number").is_some());
        assert!(errors.for_field("expiry").is_some());
        assert!(errors.for_field("cvc").is_some());
        assert!(errors.for_field("name").is_none());
    }
}
