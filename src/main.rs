//! Olympiad registration - operator CLI
//!
//! ```text
//! olympiad-registration --help
//! olympiad-registration --decode 3010721001
//! olympiad-registration --encode SCPSC 7 Math male
//! olympiad-registration --subjects 9
//! olympiad-registration [--env prod] --init-schema
//! olympiad-registration [--env prod] --profile 3010721001
//! olympiad-registration [--env prod] --approve 3010721001
//! olympiad-registration [--env prod] --reject 3010721001
//! olympiad-registration [--env prod] --paid 3010721001 <payment-reference>
//! ```
//!
//! The first three modes are offline; the rest connect to PostgreSQL using
//! `config/<env>.yaml`.

use std::sync::Arc;

use anyhow::{Context, bail};
use olympiad_registration::config::AppConfig;
use olympiad_registration::registration::{
    LocalMediaStore, PgRegistrationRepository, RegistrationService,
};
use olympiad_registration::registration_number::CodeTable;
use olympiad_registration::{
    Database, RegistrationRequest, available_subjects, encode_prefix, parse,
};

const USAGE: &str = "\
Usage:
  olympiad-registration --decode <NUMBER>
  olympiad-registration --encode <INSTITUTION> <GRADE> <SUBJECT> <SEX>
  olympiad-registration --subjects <GRADE>
  olympiad-registration [--env <ENV>] --init-schema
  olympiad-registration [--env <ENV>] --profile <NUMBER>
  olympiad-registration [--env <ENV>] --approve <NUMBER>
  olympiad-registration [--env <ENV>] --reject <NUMBER>
  olympiad-registration [--env <ENV>] --paid <NUMBER> <PAYMENT_REFERENCE>";

// ============================================================
// ARGUMENTS
// ============================================================

/// Values following `flag`, if present with at least `n` of them
fn get_args_after(flag: &str, n: usize) -> Option<Vec<String>> {
    let args: Vec<String> = std::env::args().collect();
    let i = args.iter().position(|a| a == flag)?;
    let values = args.get(i + 1..i + 1 + n)?;
    Some(values.to_vec())
}

fn get_arg(flag: &str) -> Option<String> {
    get_args_after(flag, 1).and_then(|mut v| v.pop())
}

fn get_env() -> String {
    get_arg("--env")
        .or_else(|| get_arg("-e"))
        .unwrap_or_else(|| "dev".to_string())
}

// ============================================================
// OFFLINE MODES
// ============================================================

fn run_offline() -> anyhow::Result<bool> {
    if std::env::args().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(true);
    }

    if let Some(number) = get_arg("--decode") {
        match parse(&number) {
            Some(parsed) => println!("{}", serde_json::to_string_pretty(&parsed)?),
            None => bail!("'{}' is not a 10-digit registration number", number),
        }
        return Ok(true);
    }

    if let Some(args) = get_args_after("--encode", 4) {
        let request = RegistrationRequest::new(&args[0], &args[1], &args[2], &args[3]);
        match encode_prefix(&request) {
            Ok(prefix) => println!("{}", prefix),
            Err(e) => match e.field() {
                Some(field) => bail!("[{}] {}: {}", e.code(), field, e),
                None => bail!("[{}] {}", e.code(), e),
            },
        }
        return Ok(true);
    }

    if let Some(grade) = get_arg("--subjects") {
        let subjects: Vec<&str> = available_subjects(&grade)
            .into_iter()
            .map(|s| s.label())
            .collect();
        if subjects.is_empty() {
            println!("No subjects offered for grade {}", grade);
        } else {
            println!("{}", subjects.join(", "));
        }
        return Ok(true);
    }

    Ok(false)
}

// ============================================================
// DATABASE MODES
// ============================================================

async fn run_admin(config: &AppConfig) -> anyhow::Result<()> {
    let url = config
        .postgres_url
        .as_deref()
        .context("postgres_url is not configured")?;
    let db = Database::connect(url, config.postgres_max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.health_check().await.context("PostgreSQL health check failed")?;

    let repository = Arc::new(PgRegistrationRepository::new(db.pool().clone()));

    if std::env::args().any(|a| a == "--init-schema") {
        repository.init_schema().await?;
        println!("Schema ready");
        return Ok(());
    }

    let reg = &config.registration;
    let media = Arc::new(LocalMediaStore::new(
        &reg.media_dir,
        &reg.media_base_url,
        reg.max_upload_bytes,
    ));
    let service = RegistrationService::new(repository, media, reg.clone());

    let registration = if let Some(number) = get_arg("--profile") {
        let profile = service.profile(&number).await?;
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    } else if let Some(number) = get_arg("--approve") {
        service.approve(&number).await?
    } else if let Some(number) = get_arg("--reject") {
        service.reject(&number).await?
    } else if let Some(args) = get_args_after("--paid", 2) {
        service.record_payment(&args[0], &args[1]).await?
    } else {
        bail!("No mode given\n{}", USAGE);
    };

    println!(
        "{} status={:?} approved={} paid={}",
        registration.registration_number,
        registration.approval_status,
        registration.is_approved(),
        registration.is_paid()
    );
    Ok(())
}

// ============================================================
// MAIN
// ============================================================

fn main() -> anyhow::Result<()> {
    if run_offline()? {
        return Ok(());
    }

    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = olympiad_registration::logging::init_logging(&app_config);

    tracing::info!("Starting olympiad registration admin in {} mode", env);

    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let result = rt.block_on(run_admin(&app_config));
    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}
