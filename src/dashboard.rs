//! Page-level dashboard data and the number formatting its screens share.

use crate::api::{Account, SaasStats, Summary};

/// State owned by the dashboard page and handed to the screens that need it.
///
/// Created when the dashboard opens and reset when the session ends; nothing
/// outside the page holds onto it.
#[derive(Debug, Clone, Default)]
pub struct DashboardContext {
    pub account: Option<Account>,
    pub summaries: Vec<Summary>,
    pub stats: Option<SaasStats>,
    selected_summary: Option<u64>,
}

impl DashboardContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_admin(&self) -> bool {
        self.account.as_ref().map(|a| a.is_admin).unwrap_or(false)
    }

    pub fn usage_credits(&self) -> u64 {
        self.account.as_ref().map(|a| a.usage_credits).unwrap_or(0)
    }

    /// Replace the summaries, dropping a selection that no longer exists
    pub fn set_summaries(&mut self, summaries: Vec<Summary>) {
        self.summaries = summaries;
        if let Some(id) = self.selected_summary {
            if !self.summaries.iter().any(|s| s.id == id) {
                self.selected_summary = None;
            }
        }
    }

    /// Select a summary by id; unknown ids clear the selection
    pub fn select_summary(&mut self, id: u64) -> bool {
        let found = self.summaries.iter().any(|s| s.id == id);
        self.selected_summary = found.then_some(id);
        found
    }

    pub fn selected_summary(&self) -> Option<&Summary> {
        let id = self.selected_summary?;
        self.summaries.iter().find(|s| s.id == id)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `original / condensed` rounded to one decimal, `None` when nothing was condensed
pub fn compression_ratio(summary: &Summary) -> Option<f64> {
    if summary.condensed_char_count == 0 {
        return None;
    }
    Some(round_to(
        summary.original_char_count as f64 / summary.condensed_char_count as f64,
        1,
    ))
}

pub fn format_ratio(summary: &Summary) -> String {
    compression_ratio(summary)
        .map(|r| format!("{r:.1}"))
        .unwrap_or_else(|| "-".to_string())
}

/// OpenAI spend with five decimals; missing amounts show as zero
pub fn format_openai_amount(stats: &SaasStats) -> String {
    format!("{:.5}", stats.total_open_ai_charges.sum.amount.unwrap_or(0.0))
}

/// Average rating (0..=1) as a percentage with two decimals
pub fn format_rating(stats: &SaasStats) -> String {
    format!("{:.2}%", stats.average_rating * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChargeAmount, ChargeSum};

    fn summary(id: u64, original: u64, condensed: u64) -> Summary {
        Summary {
            id,
            original_char_count: original,
            condensed_char_count: condensed,
        }
    }

    #[test]
    fn test_compression_ratio_rounds_to_one_decimal() {
        assert_eq!(compression_ratio(&summary(1, 1000, 300)), Some(3.3));
        assert_eq!(compression_ratio(&summary(1, 1000, 400)), Some(2.5));
        assert_eq!(format_ratio(&summary(1, 900, 300)), "3.0");
    }

    #[test]
    fn test_zero_condensed_renders_dash() {
        assert_eq!(compression_ratio(&summary(1, 1000, 0)), None);
        assert_eq!(format_ratio(&summary(1, 1000, 0)), "-");
    }

    #[test]
    fn test_stat_formatting() {
        let stats = SaasStats {
            total_open_ai_charges: ChargeSum {
                sum: ChargeAmount {
                    amount: Some(12.3456789),
                },
            },
            average_rating: 0.8734,
            ..SaasStats::default()
        };
        assert_eq!(format_openai_amount(&stats), "12.34568");
        assert_eq!(format_rating(&stats), "87.34%");
        assert_eq!(format_openai_amount(&SaasStats::default()), "0.00000");
    }

    #[test]
    fn test_selection_follows_summaries() {
        let mut ctx = DashboardContext::new();
        ctx.set_summaries(vec![summary(1, 10, 5), summary(2, 20, 5)]);

        assert!(ctx.select_summary(2));
        assert_eq!(ctx.selected_summary().map(|s| s.id), Some(2));

        assert!(!ctx.select_summary(9));
        assert!(ctx.selected_summary().is_none());

        ctx.select_summary(1);
        ctx.set_summaries(vec![summary(2, 20, 5)]);
        assert!(ctx.selected_summary().is_none());
    }

    #[test]
    fn test_reset_clears_account() {
        let mut ctx = DashboardContext::new();
        ctx.account = Some(Account {
            is_admin: true,
            usage_credits: 40,
            ..Account::default()
        });
        assert!(ctx.is_admin());
        assert_eq!(ctx.usage_credits(), 40);
        ctx.reset();
        assert!(!ctx.is_admin());
    }
}
