//! Report how many registration numbers remain at the configured width.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;

use ledger_backend::config::RegistrationSettings;
use ledger_backend::domain::ports::PayerRepository;
use ledger_backend::domain::{NumberWidth, RegistrationNumber};
use ledger_backend::outbound::persistence::{DbPool, DieselPayerRepository};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Remaining capacity of the registration number space.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Headroom {
    highest: Option<String>,
    next: Option<String>,
    remaining: u64,
}

fn headroom(highest: Option<&RegistrationNumber>, width: NumberWidth) -> Headroom {
    let issued = highest.map_or(0, RegistrationNumber::value);
    let next = match highest {
        None => Some(RegistrationNumber::first(width)),
        Some(number) => number.successor().ok(),
    };
    Headroom {
        highest: highest.map(|number| number.as_str().to_owned()),
        next: next.map(String::from),
        remaining: width.max_value().saturating_sub(issued),
    }
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        eprintln!("tracing subscriber already installed: {error}");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let settings = RegistrationSettings::load_from_iter(env::args_os())
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let width = settings
        .number_width()
        .map_err(|error| io::Error::other(format!("invalid settings: {error}")))?;
    let pool_config = settings.pool_config().ok_or_else(|| {
        io::Error::other("REGISTRATION_DATABASE_URL or --database-url is required")
    })?;

    let pool = DbPool::new(pool_config)
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let repository = DieselPayerRepository::new(pool, width);

    let highest = repository
        .max_registration_number()
        .await
        .map_err(|error| io::Error::other(format!("read highest number: {error}")))?;
    let report = headroom(highest.as_ref(), width);

    info!(
        width = width.get(),
        remaining = report.remaining,
        "registration headroom computed"
    );
    if report.next.is_none() {
        warn!(width = width.get(), "registration number space exhausted");
    }

    println!("width={}", width.get());
    println!("highest={}", report.highest.as_deref().unwrap_or("none"));
    println!("next={}", report.next.as_deref().unwrap_or("exhausted"));
    println!("remaining={}", report.remaining);

    Ok(())
}
