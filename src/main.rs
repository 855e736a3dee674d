// ===============================
// src/main.rs
// ===============================
mod amount;
mod cart;
mod catalog;
mod checkout;
mod config;
mod domain;
mod metrics;
mod pricing;
mod recorder;
mod session;
mod ui;

use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::domain::{CartSnapshot, Event, Notice, UiEvent};

/// Menu ordering & cart engine: loads a product catalog, prices configured
/// products, aggregates a cart and submits orders over HTTP.
#[derive(Parser, Debug)]
#[command(name = "order_engine_rust")]
struct Cli {
    /// Catalog source: mock | remote (overrides CATALOG_MODE)
    #[arg(long)]
    catalog: Option<String>,

    /// JSONL event log path (overrides RECORD_FILE)
    #[arg(long)]
    record_file: Option<String>,

    /// Metrics port (overrides METRICS_PORT)
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Run the scripted demo against the mock menu and exit
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() {
    // ---- Logging ----
    tracing_subscriber::fmt().with_env_filter("info").init();

    // ---- Load config & limits, apply CLI overrides ----
    let cli = Cli::parse();
    let (mut args, limits) = config::load();
    if let Some(mode) = cli.catalog.as_deref().and_then(config::CatalogMode::parse_one) {
        args.catalog_mode = mode;
    }
    if cli.record_file.is_some() {
        args.record_file = cli.record_file.clone();
    }
    if let Some(port) = cli.metrics_port {
        args.metrics_port = port;
    }
    if cli.demo {
        // The demo script references mock product ids.
        args.catalog_mode = config::CatalogMode::Mock;
    }

    // ---- Metrics ----
    metrics::init();
    tokio::spawn(metrics::serve_metrics(args.metrics_port));

    info!(
        catalog_mode = %args.catalog_mode.as_str(),
        base_url = %args.base_url,
        delivery_fee = limits.delivery_fee,
        amount_min = limits.amount.min,
        amount_max = limits.amount.max,
        "startup config"
    );
    metrics::CONFIG_CATALOG_MODE
        .with_label_values(&[args.catalog_mode.as_str()])
        .set(1);

    // ---- Recorder (optional) ----
    let (rec_tx, rec_rx) = mpsc::channel::<Event>(8192);
    let recorder_handle = match args.record_file.clone() {
        Some(path) => tokio::spawn(recorder::run(rec_rx, path)),
        // No record file: drain so senders never back up.
        None => tokio::spawn(async move {
            let mut rx = rec_rx;
            while rx.recv().await.is_some() {}
        }),
    };

    // ---- Catalog ----
    let http = reqwest::Client::new();
    let products = match args.catalog_mode {
        config::CatalogMode::Mock => catalog::mock_products(),
        config::CatalogMode::Remote => {
            match catalog::fetch_products(&http, &args.products_url()).await {
                Ok(products) => products,
                Err(e) => {
                    // No retry and no fallback menu, the failure is only logged.
                    error!(%e, "catalog fetch failed, starting with an empty menu");
                    Vec::new()
                }
            }
        }
    };
    metrics::CATALOG_PRODUCTS.set(products.len() as i64);
    let _ = rec_tx
        .send(Event::CatalogLoaded {
            mode: args.catalog_mode.as_str().to_string(),
            count: products.len(),
        })
        .await;

    // ---- Buses ----
    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(256);
    let (notice_tx, notice_rx) = mpsc::channel::<Notice>(1024);
    let (snap_tx, _snap_rx) = watch::channel::<CartSnapshot>(CartSnapshot::default());

    // ---- Session ----
    tokio::spawn(session::run(
        ui_rx,
        notice_tx,
        snap_tx,
        rec_tx,
        products,
        args.orders_url(),
        limits,
    ));

    // ---- UI ----
    if cli.demo {
        ui::run_demo(ui_tx, notice_rx).await;
    } else {
        ui::run_repl(ui_tx, notice_rx).await;
    }

    // The session drops its recorder sender once it stops; wait for the
    // final flush so the audit file is complete.
    let _ = recorder_handle.await;
}
