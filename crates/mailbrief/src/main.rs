//! `MailBrief` - terminal front-end for the email-triage backend.
//!
//! Wires an HTTP client into a triage session and drives it from stdin
//! commands. The heavy lifting (filter state, deep links, pagination
//! cursor, debounced reports) lives in `mailbrief-core`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailbrief_api::ApiClient;
use mailbrief_core::{
    ActionRequired, AttachmentFilter, Category, CursorMode, DateRange, FilterChange, Location,
    MemoryLocation, Priority, ReportPhase, SenderType, SessionConfig, SyncOutcome, TriageSession,
};

const HELP: &str = "\
commands:
  category <primary|social|promotions|updates|forums|clear>
  priority <high|medium|low|clear>
  sender   <person|company|newsletter|automated|clear>
  date     <today|week|month|clear>
  action              toggle the action-required filter
  attachments         toggle the has-attachments filter
  search <text|clear> set the search text
  limit <n|clear>     cap the number of results
  clear               reset all filters
  show                print the current listing
  report              regenerate the report immediately
  sync                fetch the next batch from the mailbox
  reset               reset the sync cursor to newest
  stats               print aggregate mailbox statistics
  link                print the shareable deep link
  quit";

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailbrief=info,mailbrief_core=info,mailbrief_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let base_url = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
    let initial_query = args.next().unwrap_or_default();

    info!(%base_url, "starting MailBrief");

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?
        .block_on(run(&base_url, initial_query))
}

async fn run(base_url: &str, initial_query: String) -> anyhow::Result<()> {
    let client = ApiClient::new(base_url)
        .context("constructing API client")?
        .into_shared();
    let location: Arc<dyn Location> = Arc::new(MemoryLocation::new(initial_query));
    let mut session = TriageSession::new(client, location, SessionConfig::default());

    spawn_printers(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");
    prompt().await?;

    while let Some(line) = lines.next_line().await? {
        if !dispatch(&mut session, line.trim()).await? {
            break;
        }
        prompt().await?;
    }
    Ok(())
}

/// Print listing and report updates as the watch channels change.
fn spawn_printers<C>(session: &TriageSession<C>)
where
    C: mailbrief_core::SummariesClient
        + mailbrief_core::MailboxClient
        + mailbrief_core::ReportClient
        + mailbrief_core::StatsClient,
{
    let mut listing = session.listing();
    tokio::spawn(async move {
        while listing.changed().await.is_ok() {
            let status = listing.borrow_and_update().clone();
            if status.loading {
                continue;
            }
            if let Some(error) = &status.error {
                println!("\n[listing] error: {error}");
            } else {
                println!("\n[listing] {} of {}", status.items.len(), status.total);
                for item in &status.items {
                    let flag = if item.action_required { "!" } else { " " };
                    println!(
                        "  {flag} [{}/{}] {} - {}",
                        item.category.as_str(),
                        item.priority.as_str(),
                        item.subject,
                        item.summary
                    );
                }
            }
        }
    });

    let mut report = session.report();
    tokio::spawn(async move {
        while report.changed().await.is_ok() {
            let status = report.borrow_and_update().clone();
            match status.phase {
                ReportPhase::InFlight => println!("\n[report] generating..."),
                ReportPhase::Idle => {
                    if let Some(error) = &status.error {
                        println!("\n[report] error: {error}");
                    } else if let Some(text) = &status.report {
                        let count = status.email_count.unwrap_or_default();
                        println!("\n[report] covering {count} emails\n{text}");
                    }
                }
                ReportPhase::PendingDebounce => {}
            }
        }
    });
}

async fn prompt() -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"> ").await?;
    stdout.flush().await?;
    Ok(())
}

/// Handle one command line. Returns `false` on quit.
async fn dispatch<C>(session: &mut TriageSession<C>, line: &str) -> anyhow::Result<bool>
where
    C: mailbrief_core::SummariesClient
        + mailbrief_core::MailboxClient
        + mailbrief_core::ReportClient
        + mailbrief_core::StatsClient,
{
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "help" => println!("{HELP}"),
        "quit" | "exit" => return Ok(false),
        "category" => {
            let value = if rest == "clear" { None } else { Category::parse(rest) };
            if value.is_none() && rest != "clear" {
                println!("unknown category {rest:?}");
            } else {
                session.apply(FilterChange::Category(value));
            }
        }
        "priority" => {
            let value = if rest == "clear" { None } else { Priority::parse(rest) };
            if value.is_none() && rest != "clear" {
                println!("unknown priority {rest:?}");
            } else {
                session.apply(FilterChange::Priority(value));
            }
        }
        "sender" => {
            let value = if rest == "clear" { None } else { SenderType::parse(rest) };
            if value.is_none() && rest != "clear" {
                println!("unknown sender type {rest:?}");
            } else {
                session.apply(FilterChange::SenderType(value));
            }
        }
        "date" => {
            let value = if rest == "clear" { None } else { DateRange::parse(rest) };
            if value.is_none() && rest != "clear" {
                println!("unknown date range {rest:?}");
            } else {
                session.apply(FilterChange::DateRange(value));
            }
        }
        "action" => {
            // The store treats a repeated set as a toggle.
            session.apply(FilterChange::ActionRequired(ActionRequired::Required));
        }
        "attachments" => {
            session.apply(FilterChange::HasAttachments(AttachmentFilter::WithAttachments));
        }
        "search" => {
            let value = if rest == "clear" || rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            };
            session.apply(FilterChange::SearchText(value));
        }
        "limit" => {
            let value = if rest == "clear" {
                None
            } else {
                match rest.parse() {
                    Ok(limit) => Some(limit),
                    Err(_) => {
                        println!("limit must be a positive integer");
                        return Ok(true);
                    }
                }
            };
            session.apply(FilterChange::ResultLimit(value));
        }
        "clear" => session.clear_filters(),
        "show" => {
            let status = session.listing_now();
            println!("[listing] {} of {}", status.items.len(), status.total);
        }
        "report" => session.regenerate_report(),
        "sync" => match session.sync_next().await {
            Ok(SyncOutcome::Synced { mode }) => match mode {
                CursorMode::Continuing => println!("synced, more available"),
                CursorMode::Fresh => println!("synced, mailbox window exhausted"),
            },
            Ok(SyncOutcome::Collapsed) => println!("a sync is already running"),
            Err(err) => println!("sync failed: {err}"),
        },
        "reset" => {
            session.reset_to_newest();
            println!("cursor reset to newest");
        }
        "stats" => match session.stats().await {
            Ok(stats) => {
                println!(
                    "total {} / action required {} / with attachments {}",
                    stats.total, stats.action_required, stats.with_attachments
                );
                for (category, count) in &stats.by_category {
                    println!("  {category}: {count}");
                }
            }
            Err(err) => println!("stats failed: {err}"),
        },
        "link" => {
            let query = session.deep_link();
            if query.is_empty() {
                println!("?");
            } else {
                println!("?{query}");
            }
        }
        _ => println!("unknown command {command:?} (try `help`)"),
    }

    Ok(true)
}
