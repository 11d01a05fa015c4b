pub mod aggregate;
pub mod domain;
pub mod ingest;
pub mod pipeline;
pub mod reconstruct;
pub mod report;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_BASE_URL: &str = "https://lichess.org/api";
    pub const DEFAULT_CATEGORY: &str = "classical";
    pub const DEFAULT_LEADERBOARD_SIZE: usize = 50;
    pub const DEFAULT_CONCURRENCY: usize = 10;
    pub const DEFAULT_REPORT_PATH: &str = "ratings.csv";

    /// Upper bound accepted by the leaderboard endpoint.
    pub const MAX_LEADERBOARD_SIZE: usize = 200;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub rating_api_base_url: String,
        pub rating_api_timeout_secs: Option<u64>,
        pub rating_category: String,
        pub leaderboard_size: usize,
        pub fetch_concurrency: usize,
        pub report_path: String,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                rating_api_base_url: DEFAULT_BASE_URL.to_string(),
                rating_api_timeout_secs: None,
                rating_category: DEFAULT_CATEGORY.to_string(),
                leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
                fetch_concurrency: DEFAULT_CONCURRENCY,
                report_path: DEFAULT_REPORT_PATH.to_string(),
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        /// Reads settings from the environment. Values are parsed but not
        /// range-checked; call `validate` once CLI overrides are applied.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let defaults = Self::default();
            let var = |key: &str| {
                lookup(key)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            };

            let leaderboard_size = match var("LEADERBOARD_SIZE") {
                Some(s) => s
                    .parse::<usize>()
                    .with_context(|| format!("LEADERBOARD_SIZE must be an integer (got {s})"))?,
                None => defaults.leaderboard_size,
            };

            let fetch_concurrency = match var("FETCH_CONCURRENCY") {
                Some(s) => s
                    .parse::<usize>()
                    .with_context(|| format!("FETCH_CONCURRENCY must be an integer (got {s})"))?,
                None => defaults.fetch_concurrency,
            };

            let rating_api_timeout_secs = match var("RATING_API_TIMEOUT_SECS") {
                Some(s) => Some(s.parse::<u64>().with_context(|| {
                    format!("RATING_API_TIMEOUT_SECS must be an integer (got {s})")
                })?),
                None => defaults.rating_api_timeout_secs,
            };

            Ok(Self {
                rating_api_base_url: var("RATING_API_BASE_URL")
                    .unwrap_or(defaults.rating_api_base_url),
                rating_api_timeout_secs,
                rating_category: var("RATING_CATEGORY").unwrap_or(defaults.rating_category),
                leaderboard_size,
                fetch_concurrency,
                report_path: var("REPORT_PATH").unwrap_or(defaults.report_path),
                sentry_dsn: var("SENTRY_DSN"),
            })
        }

        pub fn validate(&self) -> anyhow::Result<()> {
            anyhow::ensure!(
                (1..=MAX_LEADERBOARD_SIZE).contains(&self.leaderboard_size),
                "leaderboard size must be 1..={MAX_LEADERBOARD_SIZE} (got {})",
                self.leaderboard_size
            );
            anyhow::ensure!(
                self.fetch_concurrency >= 1,
                "fetch concurrency must be >= 1 (got {})",
                self.fetch_concurrency
            );
            anyhow::ensure!(
                !self.rating_api_base_url.trim().is_empty(),
                "RATING_API_BASE_URL must be non-empty"
            );
            Ok(())
        }
    }

}
