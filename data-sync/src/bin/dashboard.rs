//! Dashboard demo binary
//!
//! Loads one delegation's books through instrumented loaders, prints the
//! enriched transactions and balances, then dumps the telemetry window.

use anyhow::Context;
use books_core::{account_balances, category_breakdown, enrich, totals};
use data_sync::{
    AccountsLoader, CategoriesLoader, Config, DataProvider, Fixtures, InMemoryProvider,
    InstrumentedProvider, TransactionsLoader,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use telemetry::TelemetryRecorder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        None => Config::from_env()?,
    };
    tracing::info!("Starting {} v{}", config.service_name, config.service_version);

    let recorder = if config.telemetry.capacity == telemetry::DEFAULT_CAPACITY {
        telemetry::global().clone()
    } else {
        TelemetryRecorder::with_capacity(config.telemetry.capacity)
    };

    let recorded = Arc::new(AtomicUsize::new(0));
    let subscription = {
        let recorded = Arc::clone(&recorded);
        recorder.subscribe(move || {
            recorded.fetch_add(1, Ordering::Relaxed);
        })
    };

    let fixtures = match &config.dashboard.fixtures_path {
        Some(path) => Fixtures::from_file(path)
            .with_context(|| format!("loading fixtures from {}", path.display()))?,
        None => Fixtures::sample(),
    };

    let provider: Arc<dyn DataProvider> = Arc::new(InstrumentedProvider::from_config(
        InMemoryProvider::new(fixtures),
        recorder.clone(),
        &config.provider,
    ));

    let accounts = AccountsLoader::with_config(Arc::clone(&provider), &config.loader);
    let categories = CategoriesLoader::with_config(Arc::clone(&provider), &config.loader);
    let transactions = TransactionsLoader::with_config(provider, &config.loader);

    let requests = [
        accounts.bind(config.dashboard.delegation_id.as_str()),
        categories.bind(config.dashboard.organization_id.as_str()),
        transactions.bind(config.dashboard.delegation_id.as_str()),
    ];
    for request in requests.into_iter().flatten() {
        request.await.context("loader task failed")?;
    }

    for (entity, error) in [
        ("accounts", accounts.error()),
        ("categories", categories.error()),
        ("transactions", transactions.error()),
    ] {
        if let Some(error) = error {
            tracing::warn!("{} unavailable: {}", entity, error);
        }
    }

    let accounts = accounts.data();
    let categories = categories.data();
    let transactions = transactions.data();

    println!("Transactions");
    for row in enrich(&transactions, &accounts, &categories) {
        let icon = row.account.as_ref().map(|a| a.icon().symbol()).unwrap_or(" ");
        println!(
            "  {:>12}  {} {:<24} {}",
            row.transaction.amount,
            icon,
            row.account_label().unwrap_or_else(|| "(unknown account)".to_string()),
            row.category_label().unwrap_or("(uncategorized)"),
        );
    }

    println!("Balances");
    for balance in account_balances(&transactions, &accounts) {
        println!("  {:<28} {:>12}", balance.account.display_name(), balance.balance());
    }

    println!("Categories");
    let breakdown = category_breakdown(&transactions, &categories);
    for entry in &breakdown.categories {
        println!("  {:<28} {:>12}", entry.category.name, entry.totals.net);
    }
    if breakdown.uncategorized.count > 0 {
        println!("  {:<28} {:>12}", "(uncategorized)", breakdown.uncategorized.net);
    }

    let overall = totals(&transactions);
    println!(
        "Totals: in {} / out {} / net {} ({} movements)",
        overall.inflow, overall.outflow, overall.net, overall.count
    );

    subscription.unsubscribe();
    tracing::info!("{} telemetry events observed", recorded.load(Ordering::Relaxed));
    println!("{}", serde_json::to_string_pretty(&recorder.get_metrics())?);

    Ok(())
}
