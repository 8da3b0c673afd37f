//! `sqlretry config` – print where the config lives and what it resolves to.

use anyhow::Result;
use sqlretry_core::config::{self, SqlRetryConfig};

pub fn run_show_config(cfg: &SqlRetryConfig) -> Result<()> {
    let retry = cfg.retry_or_default();
    println!("config file:   {}", config::config_path()?.display());
    println!(
        "database url:  {}",
        cfg.database_url.as_deref().unwrap_or("-")
    );
    println!("timeout:       {}s", retry.timeout_secs);
    println!("initial delay: {}s", retry.initial_delay_secs);
    println!("max delay:     {}s", retry.max_delay_secs);
    match &retry.retryable_kinds {
        Some(kinds) => {
            let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
            println!("retry kinds:   {}", names.join(", "));
        }
        None => println!("retry kinds:   any driver error with a socket-level cause"),
    }
    Ok(())
}
