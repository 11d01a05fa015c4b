use anyhow::Context;
use clap::{Parser, Subcommand};
use rating_trail_core::config::Settings;
use rating_trail_core::ingest::{HttpRatingProvider, RatingProviderClient};
use rating_trail_core::pipeline::{self, RunOptions};
use rating_trail_core::report::{relative_lines, CsvReportSink, ReportRow, ReportSink};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "rating_trail_worker")]
struct Args {
    /// Reference date (YYYY-MM-DD) that closes the 30-day window. Defaults to today's UTC date.
    #[arg(long, global = true)]
    reference_date: Option<String>,

    /// Rating category, e.g. classical or blitz. Overrides RATING_CATEGORY.
    #[arg(long, global = true)]
    category: Option<String>,

    /// Leaderboard size. Overrides LEADERBOARD_SIZE.
    #[arg(long, global = true)]
    count: Option<usize>,

    /// Maximum in-flight history fetches. Overrides FETCH_CONCURRENCY.
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print leaderboard usernames in rank order.
    Top,
    /// Print the last 30 days of ratings for the rank-1 player.
    TopPlayer,
    /// Write the 30-day rating CSV for the whole leaderboard.
    Report {
        /// Output path. Overrides REPORT_PATH.
        #[arg(long)]
        output: Option<String>,
    },
    /// Run top, top-player and report in sequence.
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    apply_overrides(&mut settings, &args);

    let res = run(&settings, &args).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "rating run failed");
    }
    res
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(category) = &args.category {
        settings.rating_category = category.clone();
    }
    if let Some(count) = args.count {
        settings.leaderboard_size = count;
    }
    if let Some(concurrency) = args.concurrency {
        settings.fetch_concurrency = concurrency;
    }
    if let Some(Command::Report {
        output: Some(output),
    }) = &args.command
    {
        settings.report_path = output.clone();
    }
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let options = RunOptions::from_settings(settings)?;
    let reference_date = rating_trail_core::time::resolve_reference_date(
        args.reference_date.as_deref(),
        chrono::Utc::now(),
    )?;
    let provider: Arc<dyn RatingProviderClient> =
        Arc::new(HttpRatingProvider::from_settings(settings)?);

    tracing::info!(
        %reference_date,
        category = %options.category,
        leaderboard_size = options.leaderboard_size,
        concurrency = options.concurrency,
        provider = provider.provider_name(),
        "starting rating run"
    );

    match args.command.as_ref().unwrap_or(&Command::All) {
        Command::Top => print_top(provider.as_ref(), &options).await,
        Command::TopPlayer => print_top_player(provider, &options, reference_date).await,
        Command::Report { .. } => {
            write_report(provider, &options, reference_date, &settings.report_path).await?
        }
        Command::All => {
            println!("\nTop {} {} players:\n", options.leaderboard_size, options.category);
            print_top(provider.as_ref(), &options).await;
            println!("\nLast 30 days for the top player:\n");
            print_top_player(Arc::clone(&provider), &options, reference_date).await;
            println!("\nGenerating CSV report:\n");
            write_report(provider, &options, reference_date, &settings.report_path).await?;
        }
    }

    Ok(())
}

async fn print_top(provider: &dyn RatingProviderClient, options: &RunOptions) {
    let players = pipeline::top_players(provider, options).await;
    if players.is_empty() {
        println!("no players found");
        return;
    }
    for player in players {
        println!("{}", player.entity);
    }
}

async fn print_top_player(
    provider: Arc<dyn RatingProviderClient>,
    options: &RunOptions,
    reference_date: chrono::NaiveDate,
) {
    let Some((top, series)) = pipeline::top_player_series(provider, options, reference_date).await
    else {
        println!("no players found");
        return;
    };

    println!("{}:", top.entity);
    for line in relative_lines(&series) {
        println!("  {line}");
    }
}

async fn write_report(
    provider: Arc<dyn RatingProviderClient>,
    options: &RunOptions,
    reference_date: chrono::NaiveDate,
    path: &str,
) -> anyhow::Result<()> {
    // Create lazily so a failed leaderboard leaves no empty file behind.
    let mut sink = LazyCsvSink::new(path);
    let summary = pipeline::generate_report(provider, &mut sink, options, reference_date).await?;

    if summary.rows == 0 {
        println!("no players found");
        return Ok(());
    }

    println!(
        "wrote {} rows to {} ({} fetch failures, {} without {} history)",
        summary.rows, path, summary.fetch_failures, summary.no_history, options.category
    );
    Ok(())
}

struct LazyCsvSink<'a> {
    path: &'a str,
}

impl<'a> LazyCsvSink<'a> {
    fn new(path: &'a str) -> Self {
        Self { path }
    }
}

impl ReportSink for LazyCsvSink<'_> {
    fn write(&mut self, header: &[chrono::NaiveDate], rows: &[ReportRow]) -> anyhow::Result<()> {
        let mut sink = CsvReportSink::from_path(self.path)
            .with_context(|| format!("open report output {}", self.path))?;
        sink.write(header, rows)
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_out_of_range_env_values() {
        let mut settings = Settings {
            leaderboard_size: 0,
            fetch_concurrency: 0,
            ..Settings::default()
        };
        assert!(RunOptions::from_settings(&settings).is_err());

        let args = Args::try_parse_from([
            "rating_trail_worker",
            "--count",
            "20",
            "--concurrency",
            "4",
            "--category",
            "ultraBullet",
            "report",
            "--output",
            "out.csv",
        ])
        .unwrap();
        apply_overrides(&mut settings, &args);

        let options = RunOptions::from_settings(&settings).unwrap();
        assert_eq!(options.leaderboard_size, 20);
        assert_eq!(options.concurrency, 4);
        assert_eq!(options.category.leaderboard_key(), "ultraBullet");
        assert_eq!(settings.report_path, "out.csv");
    }
}
