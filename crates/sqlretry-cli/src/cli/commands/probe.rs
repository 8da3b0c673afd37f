//! `sqlretry probe` – check a database is reachable, retrying transient failures.

use anyhow::Result;
use sqlretry_core::config::SqlRetryConfig;
use sqlretry_core::retry::RetryPolicyBuilder;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;
use std::time::Instant;

const FALLBACK_URL: &str = "sqlite::memory:";

/// Pick the URL: command line, then config file, then in-memory SQLite.
pub(crate) fn resolve_url<'a>(flag: Option<&'a str>, cfg: &'a SqlRetryConfig) -> &'a str {
    flag.or(cfg.database_url.as_deref()).unwrap_or(FALLBACK_URL)
}

pub fn run_probe(cfg: &SqlRetryConfig, url: Option<&str>, timeout: Option<f64>) -> Result<()> {
    let url = resolve_url(url, cfg);
    let mut builder = RetryPolicyBuilder::<sqlx::Error>::from_config(&cfg.retry_or_default());
    if let Some(secs) = timeout {
        builder = builder.timeout_secs(secs);
    }
    let retry = builder
        .span(tracing::info_span!("probe", url = %url))
        .build()?;

    let rt = tokio::runtime::Runtime::new()?;
    let pool = {
        let _guard = rt.enter();
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_lazy(url)?
    };

    let start = Instant::now();
    let mut attempts = 0u32;
    let one: i64 = retry.call(|| {
        attempts += 1;
        rt.block_on(sqlx::query("SELECT 1 AS one").fetch_one(&pool))
            .map(|row| row.get("one"))
    })?;

    println!(
        "{url}: ok (SELECT 1 = {one}) after {attempts} attempt(s) in {:.3}s",
        start.elapsed().as_secs_f64()
    );
    rt.block_on(pool.close());
    Ok(())
}
