//! Buy credits wizard screen

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::dialogs::render_dashboard_error;
use super::form_field::{edit_text, edit_toggle, move_selection, InputFilter};
use super::step_indicator::{render_step_indicator, step_for_key};
use super::WizardAction;
use crate::config::CreditsConfig;
use crate::flows::buy_credits::{
    AmountChoice, AmountForm, BuyCreditsFlow, BuyCreditsPayload, BuyCreditsStep, PaymentForm,
    AMOUNT_STEP, PAYMENT_STEP,
};
use crate::wizard::{ActiveStep, StepController, StepForm, StepId, ValidationErrors};

mod amount;
mod payment;
mod review;


/// Focus order on the payment step
pub(crate) const PAYMENT_FIELDS: usize = 5;

pub struct BuyCreditsScreen {
    pub controller: StepController<BuyCreditsFlow>,
    pub(crate) amount: AmountForm,
    pub(crate) payment: PaymentForm,
    /// Highlighted option on the amount step (presets then "Custom")
    pub(crate) amount_cursor: usize,
    pub(crate) focus: usize,
    pub(crate) errors: ValidationErrors,
    credits: CreditsConfig,
    balance: u64,
    /// Step the forms were last loaded for
    loaded_step: StepId,
}

impl BuyCreditsScreen {
    pub fn new(credits: &CreditsConfig, balance: u64) -> Self {
        let controller = StepController::new(BuyCreditsFlow::new());
        let loaded_step = controller.current_step();
        Self {
            controller,
            amount: AmountForm::new(credits, None),
            payment: PaymentForm::new(balance, None),
            amount_cursor: 0,
            focus: 0,
            errors: ValidationErrors::new(),
            credits: credits.clone(),
            balance,
            loaded_step,
        }
    }

    /// Account balance arrived or changed
    pub fn set_balance(&mut self, balance: u64) {
        self.balance = balance;
        self.payment.balance = balance;
    }

    /// Rebuild the form of the step we just landed on from its committed payload
    fn sync_forms(&mut self) {
        let current = self.controller.current_step();
        if current == self.loaded_step {
            return;
        }
        self.loaded_step = current;
        self.focus = 0;
        self.errors = ValidationErrors::new();

        if let Some(BuyCreditsPayload::Amount(prev)) = self.controller.payload(AMOUNT_STEP) {
            self.amount = AmountForm::new(&self.credits, Some(prev));
        }
        if let Some(BuyCreditsPayload::Payment(prev)) = self.controller.payload(PAYMENT_STEP) {
            self.payment = PaymentForm::new(self.balance, Some(prev));
        }
        self.amount_cursor = match self.amount.choice {
            Some(AmountChoice::Preset(i)) => i,
            Some(AmountChoice::Custom) => self.amount.presets.len(),
            None => 0,
        };
    }

    fn current_kind(&self) -> Option<BuyCreditsStep> {
        match self.controller.active_step() {
            ActiveStep::Step(def) => Some(def.kind),
            ActiveStep::Unknown(_) => None,
        }
    }

    fn field_count(&self) -> usize {
        match self.current_kind() {
            Some(BuyCreditsStep::Amount) => {
                if self.amount.choice == Some(AmountChoice::Custom) {
                    2
                } else {
                    1
                }
            }
            Some(BuyCreditsStep::Payment) => PAYMENT_FIELDS,
            _ => 1,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> WizardAction {
        if let Some(step) = step_for_key(key) {
            self.controller.go_to_step(step);
            self.sync_forms();
            return WizardAction::None;
        }

        match key {
            KeyCode::Esc => {
                let current = self.controller.current_step();
                if current <= 1 || current > self.controller.last_step_id() {
                    return WizardAction::Leave;
                }
                self.controller.go_to_step(current - 1);
                self.sync_forms();
                WizardAction::None
            }
            KeyCode::Tab => {
                self.focus = (self.focus + 1) % self.field_count();
                WizardAction::None
            }
            KeyCode::BackTab => {
                let count = self.field_count();
                self.focus = (self.focus + count - 1) % count;
                WizardAction::None
            }
            KeyCode::Enter => self.advance(),
            _ => {
                self.edit(key);
                WizardAction::None
            }
        }
    }

    fn advance(&mut self) -> WizardAction {
        let result = match self.current_kind() {
            Some(BuyCreditsStep::Amount) => self.amount.validate().map(BuyCreditsPayload::Amount),
            Some(BuyCreditsStep::Payment) => {
                self.payment.validate().map(BuyCreditsPayload::Payment)
            }
            Some(BuyCreditsStep::Review) => {
                if self.controller.is_submitting() || self.controller.submission().is_err() {
                    return WizardAction::None;
                }
                return WizardAction::Submit;
            }
            None => return WizardAction::None,
        };

        match result {
            Ok(payload) => {
                if let Err(err) = self.controller.commit_and_advance(payload) {
                    tracing::warn!(error = %err, "commit rejected");
                }
                self.sync_forms();
            }
            Err(errors) => self.errors = errors,
        }
        WizardAction::None
    }

    fn edit(&mut self, key: KeyCode) {
        match self.current_kind() {
            Some(BuyCreditsStep::Amount) => {
                if self.focus == 0 {
                    if let Some(next) =
                        move_selection(self.amount_cursor, self.amount.option_count(), key)
                    {
                        self.amount_cursor = next;
                        self.amount.select(next);
                    }
                } else {
                    edit_text(&mut self.amount.custom_amount, key, InputFilter::Digits, Some(7));
                }
            }
            Some(BuyCreditsStep::Payment) => {
                let payment = &mut self.payment;
                match self.focus {
                    0 => edit_text(&mut payment.card_number, key, InputFilter::CardNumber, Some(23)),
                    1 => edit_text(&mut payment.name, key, InputFilter::Any, Some(64)),
                    2 => edit_text(&mut payment.expiry, key, InputFilter::Expiry, Some(5)),
                    3 => edit_text(&mut payment.cvc, key, InputFilter::Digits, Some(4)),
                    _ => edit_toggle(&mut payment.save_card, key),
                };
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Buy Credits ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Step strip
                Constraint::Length(1),
                Constraint::Min(8),    // Step body
                Constraint::Length(1), // Footer
            ])
            .split(inner);

        render_step_indicator(frame, chunks[0], &self.controller.indicator());

        match self.controller.active_step() {
            ActiveStep::Step(def) => match def.kind {
                BuyCreditsStep::Amount => self.render_amount_step(frame, chunks[2]),
                BuyCreditsStep::Payment => self.render_payment_step(frame, chunks[2]),
                BuyCreditsStep::Review => self.render_review_step(frame, chunks[2]),
            },
            ActiveStep::Unknown(_) => render_dashboard_error(frame, chunks[2]),
        }

        let action = if self.controller.is_final_step() {
            if self.controller.is_submitting() {
                " purchasing..."
            } else {
                " purchase  "
            }
        } else {
            " next  "
        };
        let footer = Paragraph::new(Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(action),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" field  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" back"),
        ]));
        frame.render_widget(footer, chunks[3]);
    }
}
