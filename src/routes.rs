//! Dashboard screens and their locale-prefixed route paths

/// A screen of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Summaries overview (landing screen)
    Dashboard,
    BuyCredits,
    CustomRequest,
    /// Where queued custom requests show up
    Queue,
    /// Detail of the summary picked in the summaries table
    Summary,
    Admin,
}

impl Route {
    pub fn all() -> &'static [Route] {
        &[
            Route::Dashboard,
            Route::BuyCredits,
            Route::CustomRequest,
            Route::Queue,
            Route::Summary,
            Route::Admin,
        ]
    }

    /// Path below `/{locale}`
    fn suffix(&self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::BuyCredits => "/dashboard/buy-credits",
            Route::CustomRequest => "/dashboard/custom-request",
            Route::Queue => "/dashboard/queue",
            Route::Summary => "/dashboard/summary",
            Route::Admin => "/dashboard/admin",
        }
    }

    /// Full route path, e.g. `/en/dashboard/queue`
    pub fn path(&self, locale: &str) -> String {
        format!("/{}{}", locale, self.suffix())
    }

    /// Resolve a path produced by [`Route::path`], ignoring the locale segment
    pub fn from_path(path: &str) -> Option<Route> {
        let rest = path.strip_prefix('/')?;
        let (_, suffix) = rest.split_once('/')?;
        let suffix = format!("/{}", suffix.trim_end_matches('/'));
        Route::all().iter().copied().find(|r| r.suffix() == suffix)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Dashboard => "Summaries",
            Route::BuyCredits => "Buy Credits",
            Route::CustomRequest => "Custom Request",
            Route::Queue => "Queue",
            Route::Summary => "Summary",
            Route::Admin => "Admin",
        }
    }

    /// Screens only administrators can open
    pub fn requires_admin(&self) -> bool {
        matches!(self, Route::Admin)
    }
}
