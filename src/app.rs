use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Frame;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::api::{
    Account, ApiError, CreditPurchaseReceipt, CustomRequestCreated, DashboardApi, SaasStats,
    Summary,
};
use crate::config::Config;
use crate::dashboard::DashboardContext;
use crate::flows::custom_request::CustomRequestReview;
use crate::flows::{BuyCreditsFlow, CustomRequestFlow};
use crate::models::ModelCatalog;
use crate::routes::Route;
use crate::toast::{Toast, Toasts};
use crate::ui::admin::render_admin;
use crate::ui::dashboard::{render_header, render_status_bar, split_page};
use crate::ui::summaries::render_summary_detail;
use crate::ui::terminal_guard::TerminalGuard;
use crate::ui::toasts::render_toasts;
use crate::ui::{
    BuyCreditsScreen, CustomRequestScreen, HelpDialog, PaymentRequiredChoice,
    PaymentRequiredDialog, QueueScreen, QueuedRequest, SummariesScreen, WizardAction,
};
use crate::wizard::{ActiveStep, SubmissionTarget, SubmitOutcome};

/// Results of background work, delivered back to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    AccountLoaded(Result<Account, ApiError>),
    SummariesLoaded(Result<Vec<Summary>, ApiError>),
    StatsLoaded(Result<SaasStats, ApiError>),
    /// `session` is the wizard session that sent the request
    CreditsPurchased {
        session: u64,
        result: Result<CreditPurchaseReceipt, ApiError>,
    },
    CustomRequestSent {
        session: u64,
        result: Result<CustomRequestCreated, ApiError>,
    },
}

pub struct App {
    config: Config,
    api: Arc<dyn DashboardApi>,
    catalog: ModelCatalog,
    context: DashboardContext,
    route: Route,
    toasts: Toasts,
    help_dialog: HelpDialog,
    payment_required: PaymentRequiredDialog,
    summaries: SummariesScreen,
    queue: QueueScreen,
    buy_credits: Option<BuyCreditsScreen>,
    custom_request: Option<CustomRequestScreen>,
    /// Bumped whenever a wizard is opened or discarded; responses tagged with
    /// an older session are dropped
    session: u64,
    /// Background tasks not yet reported back
    pending: usize,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn DashboardApi>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let catalog = ModelCatalog::new(&config.models);
        let toasts = Toasts::new(Duration::from_millis(config.ui.toast_duration_ms));
        Self {
            config,
            api,
            catalog,
            context: DashboardContext::new(),
            route: Route::Dashboard,
            toasts,
            help_dialog: HelpDialog::new(),
            payment_required: PaymentRequiredDialog::new(),
            summaries: SummariesScreen::new(),
            queue: QueueScreen::new(),
            buy_credits: None,
            custom_request: None,
            session: 0,
            pending: 0,
            events_tx,
            events_rx,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut guard = TerminalGuard::enter()?;
        self.refresh();

        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            guard.terminal().draw(|f| self.draw(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }

            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_event(event);
            }
            self.toasts.expire(Instant::now());
        }

        guard.restore()?;
        tracing::info!("dashboard closed");
        Ok(())
    }

    fn locale(&self) -> String {
        self.config.ui.locale.clone()
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            // The receiver only goes away when the app is shutting down
            let _ = tx.send(work.await);
        });
    }

    /// Reload the account and summaries (and stats on the admin screen)
    fn refresh(&mut self) {
        let api = self.api.clone();
        self.spawn(async move { AppEvent::AccountLoaded(api.account().await) });
        let api = self.api.clone();
        self.spawn(async move { AppEvent::SummariesLoaded(api.summaries().await) });
        if self.route == Route::Admin {
            self.load_stats();
        }
    }

    fn load_stats(&mut self) {
        let api = self.api.clone();
        self.spawn(async move { AppEvent::StatsLoaded(api.admin_stats().await) });
    }

    /// Switch screens. Wizard state is discarded on every navigation.
    fn navigate(&mut self, route: Route) {
        if route.requires_admin() && !self.context.is_admin() {
            tracing::warn!(path = %route.path(&self.config.ui.locale), "admin route refused");
            self.toasts.push(Toast::error("Admin access required"));
            return;
        }

        if self.buy_credits.is_some() || self.custom_request.is_some() {
            self.session += 1;
        }
        self.buy_credits = None;
        self.custom_request = None;

        match route {
            Route::BuyCredits => {
                self.session += 1;
                self.buy_credits = Some(BuyCreditsScreen::new(
                    &self.config.credits,
                    self.context.usage_credits(),
                ));
            }
            Route::CustomRequest => {
                self.session += 1;
                self.custom_request = Some(CustomRequestScreen::new(
                    &self.config.uploads,
                    &self.catalog,
                    self.context.usage_credits(),
                ));
            }
            Route::Admin if self.context.stats.is_none() => self.load_stats(),
            _ => {}
        }

        tracing::info!(path = %route.path(&self.config.ui.locale), "navigate");
        self.route = route;
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.help_dialog.visible {
            self.help_dialog.visible = false;
            return;
        }

        if self.payment_required.visible {
            if let Some(PaymentRequiredChoice::AddPaymentMethod) =
                self.payment_required.handle_key(key)
            {
                self.navigate(Route::BuyCredits);
            }
            return;
        }

        if self.on_error_placeholder() && key == KeyCode::Char('d') {
            self.navigate(Route::Dashboard);
            return;
        }

        if let Some(screen) = self.buy_credits.as_mut() {
            match screen.handle_key(key) {
                WizardAction::Submit => self.submit_buy_credits(),
                WizardAction::Leave => self.navigate(Route::Dashboard),
                WizardAction::None => {}
            }
            return;
        }

        if let Some(screen) = self.custom_request.as_mut() {
            match screen.handle_key(key) {
                WizardAction::Submit => self.submit_custom_request(),
                WizardAction::Leave => self.navigate(Route::Dashboard),
                WizardAction::None => {}
            }
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.help_dialog.toggle(),
            KeyCode::Char('d') => self.navigate(Route::Dashboard),
            KeyCode::Char('b') => self.navigate(Route::BuyCredits),
            KeyCode::Char('c') => self.navigate(Route::CustomRequest),
            KeyCode::Char('u') => self.navigate(Route::Queue),
            KeyCode::Char('a') => self.navigate(Route::Admin),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Esc if self.route == Route::Summary => self.navigate(Route::Dashboard),
            KeyCode::Enter if self.route == Route::Dashboard => {
                if self.summaries.open_selected(&mut self.context).is_some() {
                    self.navigate(Route::Summary);
                }
            }
            _ if self.route == Route::Dashboard => {
                self.summaries.handle_key(key, self.context.summaries.len());
            }
            _ => {}
        }
    }

    fn on_error_placeholder(&self) -> bool {
        let unknown_buy = self
            .buy_credits
            .as_ref()
            .map(|s| matches!(s.controller.active_step(), ActiveStep::Unknown(_)));
        let unknown_custom = self
            .custom_request
            .as_ref()
            .map(|s| matches!(s.controller.active_step(), ActiveStep::Unknown(_)));
        unknown_buy.or(unknown_custom).unwrap_or(false)
    }

    fn submit_buy_credits(&mut self) {
        let Some(screen) = self.buy_credits.as_mut() else {
            return;
        };
        let submission = match screen.controller.begin_submit() {
            Ok(submission) => submission,
            Err(e) => {
                tracing::warn!(error = %e, "buy credits submit refused");
                return;
            }
        };
        tracing::info!(credits = submission.credits, "submitting credit purchase");
        let api = self.api.clone();
        let session = self.session;
        self.spawn(async move {
            let result = BuyCreditsFlow::send(api.as_ref(), submission).await;
            AppEvent::CreditsPurchased { session, result }
        });
    }

    fn submit_custom_request(&mut self) {
        let Some(screen) = self.custom_request.as_mut() else {
            return;
        };
        let submission = match screen.controller.begin_submit() {
            Ok(submission) => submission,
            Err(e) => {
                tracing::warn!(error = %e, "custom request submit refused");
                return;
            }
        };
        tracing::info!(
            files = submission.files.len(),
            mode = ?submission.customizations.mode,
            "submitting custom request"
        );
        let api = self.api.clone();
        let session = self.session;
        self.spawn(async move {
            let result = CustomRequestFlow::send(api.as_ref(), submission).await;
            AppEvent::CustomRequestSent { session, result }
        });
    }

    fn is_stale(&self, session: u64) -> bool {
        if session != self.session {
            tracing::debug!(session, current = self.session, "dropping stale response");
            return true;
        }
        false
    }

    fn handle_event(&mut self, event: AppEvent) {
        self.pending = self.pending.saturating_sub(1);
        let locale = self.locale();

        match event {
            AppEvent::AccountLoaded(Ok(account)) => {
                tracing::debug!(
                    credits = account.usage_credits,
                    admin = account.is_admin,
                    "account loaded"
                );
                if let Some(screen) = self.buy_credits.as_mut() {
                    screen.set_balance(account.usage_credits);
                }
                if let Some(screen) = self.custom_request.as_mut() {
                    screen.set_usage_credits(account.usage_credits);
                }
                self.context.account = Some(account);
            }
            AppEvent::SummariesLoaded(Ok(summaries)) => {
                self.context.set_summaries(summaries);
                self.summaries.clamp(self.context.summaries.len());
            }
            AppEvent::StatsLoaded(Ok(stats)) => {
                self.context.stats = Some(stats);
            }
            AppEvent::AccountLoaded(Err(e))
            | AppEvent::SummariesLoaded(Err(e))
            | AppEvent::StatsLoaded(Err(e)) => {
                tracing::warn!(error = %e, "load failed");
                self.toasts.push(Toast::error(e.user_message()));
            }
            AppEvent::CreditsPurchased { session, result } => {
                if self.is_stale(session) {
                    return;
                }
                let Some(screen) = self.buy_credits.as_mut() else {
                    return;
                };
                if let (Ok(receipt), Some(account)) = (&result, self.context.account.as_mut()) {
                    account.usage_credits = receipt.usage_credits;
                }
                let outcome = screen.controller.finish_submit(result, &locale);
                self.apply_outcome(outcome);
            }
            AppEvent::CustomRequestSent { session, result } => {
                if self.is_stale(session) {
                    return;
                }
                let Some(screen) = self.custom_request.as_mut() else {
                    return;
                };
                if let Ok(created) = &result {
                    let review = CustomRequestReview::from_controller(&screen.controller);
                    self.queue.push(QueuedRequest {
                        id: created.id,
                        file_names: review.file_names,
                        mode: review.mode,
                        model: review.model,
                        submitted_at: Local::now(),
                    });
                }
                let outcome = screen.controller.finish_submit(result, &locale);
                self.apply_outcome(outcome);
            }
        }
    }

    fn apply_outcome(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Navigated { route, toast, .. } => {
                self.toasts.push(toast);
                self.navigate(route);
                self.refresh();
            }
            SubmitOutcome::Failed {
                toast,
                payment_required,
            } => {
                if payment_required {
                    self.payment_required.show(toast.message.clone());
                }
                self.toasts.push(toast);
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [header, body, status] = split_page(frame.area());
        render_header(frame, header, self.route, &self.config.ui.locale, &self.context);

        match self.route {
            Route::Dashboard => self.summaries.render(frame, body, &self.context),
            Route::Summary => render_summary_detail(frame, body, &self.context),
            Route::Queue => self.queue.render(frame, body),
            Route::Admin => render_admin(frame, body, self.context.stats.as_ref()),
            Route::BuyCredits => {
                if let Some(screen) = &self.buy_credits {
                    screen.render(frame, body);
                }
            }
            Route::CustomRequest => {
                if let Some(screen) = self.custom_request.as_mut() {
                    screen.render(frame, body);
                }
            }
        }

        let in_wizard = self.buy_credits.is_some() || self.custom_request.is_some();
        render_status_bar(frame, status, in_wizard, self.pending);
        self.payment_required.render(frame);
        self.help_dialog.render(frame);
        render_toasts(frame, &self.toasts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::models::ScanningMode;
    use crate::toast::ToastKind;
    use tempfile::TempDir;

    fn app_with(api: Arc<MockApi>) -> App {
        App::new(Config::default(), api)
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            app.handle_key(*key);
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    async fn settle(app: &mut App) {
        while app.pending > 0 {
            let event = app.events_rx.recv().await.unwrap();
            app.handle_event(event);
        }
    }

    fn last_toast(app: &App) -> Toast {
        app.toasts.visible().last().cloned().unwrap()
    }

    fn walk_buy_credits_to_review(app: &mut App) {
        press(app, &[KeyCode::Char('b'), KeyCode::Down, KeyCode::Enter]);
        type_text(app, "4242 4242 4242 4242");
        app.handle_key(KeyCode::Tab);
        type_text(app, "Ada Lovelace");
        app.handle_key(KeyCode::Tab);
        type_text(app, "12/30");
        app.handle_key(KeyCode::Tab);
        type_text(app, "123");
        app.handle_key(KeyCode::Enter);
    }

    #[tokio::test]
    async fn test_refresh_fills_context() {
        let mut mock = MockApi::new();
        mock.account = Account {
            id: 1,
            email: "ada@example.com".into(),
            usage_credits: 30,
            ..Account::default()
        };
        mock.summaries = vec![Summary {
            id: 4,
            original_char_count: 100,
            condensed_char_count: 10,
        }];
        let api = Arc::new(mock);
        let mut app = app_with(api.clone());
        app.refresh();
        settle(&mut app).await;

        assert_eq!(app.context.usage_credits(), 30);
        assert_eq!(app.context.summaries.len(), 1);
        assert_eq!(app.summaries.state.selected(), Some(0));

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.route, Route::Summary);
        assert_eq!(app.context.selected_summary().map(|s| s.id), Some(4));
    }

    #[tokio::test]
    async fn test_admin_route_requires_admin() {
        let mut app = app_with(Arc::new(MockApi::new()));
        app.handle_key(KeyCode::Char('a'));

        assert_eq!(app.route, Route::Dashboard);
        let toast = last_toast(&app);
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Admin access required");
    }

    #[tokio::test]
    async fn test_admin_route_loads_stats() {
        let mut mock = MockApi::new();
        mock.account.is_admin = true;
        let api = Arc::new(mock);
        let mut app = app_with(api.clone());
        app.refresh();
        settle(&mut app).await;

        app.handle_key(KeyCode::Char('a'));
        settle(&mut app).await;
        assert_eq!(app.route, Route::Admin);
        assert!(app.context.stats.is_some());
        assert!(api.calls().contains(&"admin_stats".to_string()));
    }

    #[tokio::test]
    async fn test_buy_credits_success_navigates_home() {
        let api = Arc::new(MockApi::new());
        let mut app = app_with(api.clone());
        walk_buy_credits_to_review(&mut app);
        app.handle_key(KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(app.route, Route::Dashboard);
        assert!(app.buy_credits.is_none());
        assert_eq!(last_toast(&app).message, "Purchased 500 credits");
        assert_eq!(api.purchases().len(), 1);
    }

    #[tokio::test]
    async fn test_double_enter_sends_once() {
        let api = Arc::new(MockApi::new());
        let mut app = app_with(api.clone());
        walk_buy_credits_to_review(&mut app);
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(api.purchases().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_required_opens_modal() {
        let api = Arc::new(MockApi::failing(ApiError::PaymentRequired {
            message: "Add a card first".into(),
        }));
        let mut app = app_with(api.clone());
        walk_buy_credits_to_review(&mut app);
        app.handle_key(KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(app.route, Route::BuyCredits);
        assert!(app.payment_required.visible);
        assert_eq!(last_toast(&app).message, "Add a card first");
        // State kept for a retry
        let screen = app.buy_credits.as_ref().unwrap();
        assert!(!screen.controller.is_submitting());
        assert!(screen.controller.is_final_step());

        app.handle_key(KeyCode::Enter);
        assert!(!app.payment_required.visible);
        assert_eq!(app.route, Route::BuyCredits);
        assert_eq!(app.buy_credits.as_ref().unwrap().controller.current_step(), 1);
    }

    #[tokio::test]
    async fn test_stale_response_is_dropped() {
        let api = Arc::new(MockApi::new());
        let mut app = app_with(api.clone());
        walk_buy_credits_to_review(&mut app);
        app.handle_key(KeyCode::Enter);
        app.navigate(Route::Queue);
        settle(&mut app).await;

        assert_eq!(app.route, Route::Queue);
        assert!(app.toasts.is_empty());
    }

    #[tokio::test]
    async fn test_custom_request_lands_on_queue() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let api = Arc::new(MockApi::new());
        let mut app = app_with(api.clone());
        app.handle_key(KeyCode::Char('c'));
        type_text(&mut app, path.to_str().unwrap());
        press(&mut app, &[KeyCode::Enter, KeyCode::Enter, KeyCode::Tab, KeyCode::Tab]);
        type_text(&mut app, "Summarize");
        press(&mut app, &[KeyCode::Enter, KeyCode::Enter]);
        settle(&mut app).await;

        assert_eq!(app.route, Route::Queue);
        assert_eq!(last_toast(&app).message, "Custom request is processing");
        assert_eq!(app.queue.requests.len(), 1);
        assert_eq!(app.queue.requests[0].file_names, vec!["report.pdf"]);
        assert_eq!(app.queue.requests[0].mode, Some(ScanningMode::Overall));
        assert_eq!(api.custom_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_error_placeholder_returns_home() {
        let mut app = app_with(Arc::new(MockApi::new()));
        press(&mut app, &[KeyCode::Char('b'), KeyCode::F(4)]);
        assert!(app.on_error_placeholder());

        app.handle_key(KeyCode::Char('d'));
        assert_eq!(app.route, Route::Dashboard);
        assert!(app.buy_credits.is_none());
    }

    #[tokio::test]
    async fn test_backend_error_toast_keeps_step() {
        let api = Arc::new(MockApi::failing(ApiError::Backend {
            status: 500,
            message: "Card declined".into(),
        }));
        let mut app = app_with(api.clone());
        walk_buy_credits_to_review(&mut app);
        app.handle_key(KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(app.route, Route::BuyCredits);
        assert!(!app.payment_required.visible);
        assert_eq!(last_toast(&app).message, "Card declined");

        api.recover();
        app.handle_key(KeyCode::Enter);
        settle(&mut app).await;
        assert_eq!(app.route, Route::Dashboard);
    }
}
