// ===============================
// src/metrics.rs
// ===============================
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

// Single custom registry (we register everything here)
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

// -------- Ordering metrics --------
pub static CATALOG_PRODUCTS: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("catalog_products_loaded", "products in the loaded catalog").unwrap());

pub static CART_ADDS: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("cart_adds_total", "lines added to the cart").unwrap());

pub static CART_REMOVES: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("cart_removes_total", "lines removed from the cart").unwrap());

pub static ORDERS_SUBMITTED: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("orders_submitted_total", "orders accepted by the endpoint").unwrap());

pub static ORDERS_FAILED: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("orders_failed_total", "order submissions that failed").unwrap());

pub static CART_LINES: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("cart_lines", "current cart line count").unwrap());

pub static CART_TOTAL_NUMBER: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("cart_total_number", "current cart item count").unwrap());

pub static CART_SUBTOTAL: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("cart_subtotal", "current cart subtotal (minor units)").unwrap());

// ---- Config visibility ----
pub static CONFIG_CATALOG_MODE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("config_catalog_mode", "catalog mode (label: mode)"),
        &["mode"],
    )
    .unwrap()
});

pub fn init() {
    // Register all metrics to the custom registry
    for m in [
        REGISTRY.register(Box::new(CATALOG_PRODUCTS.clone())),
        REGISTRY.register(Box::new(CART_ADDS.clone())),
        REGISTRY.register(Box::new(CART_REMOVES.clone())),
        REGISTRY.register(Box::new(ORDERS_SUBMITTED.clone())),
        REGISTRY.register(Box::new(ORDERS_FAILED.clone())),
        REGISTRY.register(Box::new(CART_LINES.clone())),
        REGISTRY.register(Box::new(CART_TOTAL_NUMBER.clone())),
        REGISTRY.register(Box::new(CART_SUBTOTAL.clone())),
        REGISTRY.register(Box::new(CONFIG_CATALOG_MODE.clone())),
    ] {
        let _ = m;
    }
}

// Encode all metrics in Prometheus text format
fn encode_metrics() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buf = Vec::new();
    if encoder.encode(&families, &mut buf).is_err() || buf.is_empty() {
        buf.extend_from_slice(b"# no metrics\n");
    }
    buf
}

// Serve one HTTP request (GET / or /metrics) — tiny HTTP 1.1 responder
fn handle_client(mut stream: TcpStream) {
    // Read a bit to consume headers (no full parse)
    let mut _req_buf = [0u8; 1024];
    let _ = stream.read(&mut _req_buf);

    let body = encode_metrics();
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

// Run the metrics server in a dedicated OS thread (keeps the runtime clean)
pub async fn serve_metrics(port: u16) {
    thread::spawn(move || {
        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr)
            .unwrap_or_else(|e| panic!("metrics bind {} failed: {}", addr, e));
        eprintln!("metrics listening on http://{addr}/ (and /metrics)");

        for conn in listener.incoming() {
            match conn {
                Ok(stream) => handle_client(stream),
                Err(e) => eprintln!("metrics accept error: {}", e),
            }
        }
    });
}
