use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use docdash::api::{AccessGroupRemoval, DashboardApi, HttpDashboardClient};
use docdash::app::App;
use docdash::config::Config;
use docdash::dashboard::{format_openai_amount, format_rating, format_ratio};
use docdash::flows::{ChosenFile, PaymentForm};
use docdash::logging;
use docdash::ui::terminal_guard::install_panic_hook;

#[derive(Parser)]
#[command(name = "docdash")]
#[command(about = "Terminal dashboard for credits, custom requests and document summaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in account
    Account,

    /// Show admin statistics
    Stats,

    /// List document summaries
    Summaries,

    /// Upload files for later requests
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Add a card to the account
    AddCard {
        /// Card number, spaces allowed
        #[arg(long)]
        number: String,

        /// Expiry as MM/YY
        #[arg(long)]
        exp: String,

        #[arg(long)]
        cvc: String,
    },

    /// Manage access groups of custom requests
    AccessGroup {
        #[command(subcommand)]
        action: AccessGroupAction,
    },
}

#[derive(Subcommand)]
enum AccessGroupAction {
    /// Remove a custom request from an access group
    Remove {
        #[arg(long)]
        custom_request: u64,

        #[arg(long)]
        group: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = cli.command.is_none();

    // File-based for TUI, stderr for CLI
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    let client =
        HttpDashboardClient::new(&config.api).context("Failed to create backend client")?;
    tracing::debug!(base_url = %client.base_url(), "backend client ready");

    match cli.command {
        Some(Commands::Account) => cmd_account(&client).await?,
        Some(Commands::Stats) => cmd_stats(&client).await?,
        Some(Commands::Summaries) => cmd_summaries(&client).await?,
        Some(Commands::Upload { files }) => cmd_upload(&config, &client, files).await?,
        Some(Commands::AddCard { number, exp, cvc }) => {
            cmd_add_card(&client, &number, &exp, &cvc).await?;
        }
        Some(Commands::AccessGroup {
            action:
                AccessGroupAction::Remove {
                    custom_request,
                    group,
                },
        }) => cmd_remove_access_group(&client, custom_request, group).await?,
        None => run_tui(config, client, logging_handle.log_file_path).await?,
    }

    Ok(())
}

async fn run_tui(
    config: Config,
    client: HttpDashboardClient,
    log_file_path: Option<PathBuf>,
) -> Result<()> {
    install_panic_hook();

    let mut app = App::new(config, Arc::new(client));
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

async fn cmd_account(api: &dyn DashboardApi) -> Result<()> {
    let account = api.account().await.context("Failed to load account")?;

    println!("{}", account.email);
    println!("{}", "─".repeat(40));
    println!("  Usage credits:   {}", account.usage_credits);
    println!(
        "  Payment method:  {}",
        if account.has_payment_method { "yes" } else { "no" }
    );
    if account.is_admin {
        println!("  Role:            admin");
    }
    if !account.access_groups.is_empty() {
        println!("  Access groups:");
        for group in &account.access_groups {
            println!("    {} {}", group.id, group.name);
        }
    }
    Ok(())
}

async fn cmd_stats(api: &dyn DashboardApi) -> Result<()> {
    let stats = api.admin_stats().await.context("Failed to load statistics")?;

    println!("Accounts");
    println!("  Total:            {}", stats.total_accounts);
    println!("  Paid:             {}", stats.paid_accounts_count);
    println!("  Verified:         {}", stats.verified_accounts_count);
    println!("  Monthly active:   {}", stats.monthly_active_users);
    println!();
    println!("3rd party charges");
    println!("  OpenAI:           {}", format_openai_amount(&stats));
    println!();
    println!("Features");
    println!("  Summaries:        {}", stats.total_summaries);
    println!("  Summaries v1:     {}", stats.total_summaries_v1);
    println!("  Summaries v2:     {}", stats.total_summaries_v2);
    println!("  Searches:         {}", stats.total_searches);
    println!("  Custom requests:  {}", stats.total_custom_requests);
    println!();
    println!("Ratings");
    println!("  Average:          {}", format_rating(&stats));
    Ok(())
}

async fn cmd_summaries(api: &dyn DashboardApi) -> Result<()> {
    let summaries = api.summaries().await.context("Failed to load summaries")?;

    if summaries.is_empty() {
        println!("no documents yet");
        return Ok(());
    }

    println!("{:>8} {:>12} {:>12} {:>6}", "ID", "Original", "Condensed", "Ratio");
    println!("{}", "─".repeat(41));
    for summary in &summaries {
        println!(
            "{:>8} {:>12} {:>12} {:>6}",
            summary.id,
            summary.original_char_count,
            summary.condensed_char_count,
            format_ratio(summary)
        );
    }
    Ok(())
}

async fn cmd_upload(config: &Config, api: &dyn DashboardApi, files: Vec<PathBuf>) -> Result<()> {
    // Same limits as the custom request wizard
    for path in &files {
        if let Err(message) = ChosenFile::inspect(path, &config.uploads) {
            bail!(message);
        }
    }

    let uploaded = api.upload_files(&files).await.context("Upload failed")?;
    for file in &uploaded {
        println!("{:>6} {}", file.id, file.name);
    }
    println!("Uploaded {} file(s)", uploaded.len());
    Ok(())
}

async fn cmd_add_card(api: &dyn DashboardApi, number: &str, exp: &str, cvc: &str) -> Result<()> {
    // Same checks as the payment step of the buy credits wizard
    let form = PaymentForm {
        card_number: number.to_string(),
        expiry: exp.to_string(),
        cvc: cvc.to_string(),
        ..PaymentForm::default()
    };
    let card = form.validate_card().context("Invalid card")?;

    api.add_stripe_card(&card.to_add_card_request())
        .await
        .context("Failed to add card")?;
    println!("Card ending in {} added", last4(&card.card_number));
    Ok(())
}

fn last4(digits: &str) -> &str {
    &digits[digits.len().saturating_sub(4)..]
}

async fn cmd_remove_access_group(
    api: &dyn DashboardApi,
    custom_request_id: u64,
    access_group_id: u64,
) -> Result<()> {
    api.remove_custom_request_from_access_group(AccessGroupRemoval {
        custom_request_id,
        access_group_id,
    })
    .await
    .context("Failed to remove custom request from access group")?;
    println!("Removed custom request {custom_request_id} from access group {access_group_id}");
    Ok(())
}
