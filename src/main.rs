use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

mod analysis;
mod app;
mod catalog;
mod config;
mod error;
mod meals;
mod state;

use crate::config::AppConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "healthtracker=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env();
    let path = config
        .as_ref()
        .map(|c| c.diagnostic_log.clone())
        .unwrap_or_else(|_| PathBuf::from("log.txt"));

    if let Err(e) = run(config).await {
        tracing::error!(error = ?e, "health tracker stopped");
        if let Err(io) = write_diagnostic(&path, &e) {
            tracing::error!(error = %io, path = %path.display(), "could not write diagnostic log");
        }
        std::process::exit(1);
    }
}

async fn run(config: anyhow::Result<AppConfig>) -> anyhow::Result<()> {
    let app_state = state::AppState::init(config?)?;
    let (host, port) = (app_state.config.host.clone(), app_state.config.port);
    app::serve(app::build_app(app_state), &host, port).await
}

/// Append a timestamped report with the full cause chain.
fn write_diagnostic(path: &Path, err: &anyhow::Error) -> std::io::Result<()> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown time".into());
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "[{now}] {err}")?;
    for cause in err.chain().skip(1) {
        writeln!(f, "    caused by: {cause}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn diagnostic_log_keeps_cause_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let err = Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
            .context("load catalog ./files/MyFoodData.csv")
            .unwrap_err();

        write_diagnostic(&path, &err).unwrap();
        write_diagnostic(&path, &err).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("load catalog").count(), 2);
        assert!(text.contains("caused by: no such file"));
    }
}
