// ===============================
// src/config.rs
// ===============================
use std::env;

use dotenvy::dotenv;

use crate::amount::AmountBounds;

/// Where the product catalog comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogMode {
    Mock,
    Remote,
}

impl CatalogMode {
    pub fn parse_one(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(CatalogMode::Mock),
            "remote" | "http" => Some(CatalogMode::Remote),
            _ => None,
        }
    }

    pub fn from_env(key: &str, default_mode: CatalogMode) -> CatalogMode {
        env::var(key)
            .ok()
            .and_then(|s| Self::parse_one(&s))
            .unwrap_or(default_mode)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogMode::Mock => "mock",
            CatalogMode::Remote => "remote",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Args {
    // catalog / order endpoints
    pub catalog_mode: CatalogMode,
    pub base_url: String,
    pub products_path: String,
    pub orders_path: String,

    // files/metrics
    pub record_file: Option<String>,
    pub metrics_port: u16,
}

impl Args {
    pub fn products_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.products_path)
    }

    pub fn orders_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.orders_path)
    }
}

#[derive(Clone, Debug)]
pub struct Limits {
    pub delivery_fee: i64,
    pub amount: AmountBounds,
}

pub fn load() -> (Args, Limits) {
    // Make sure .env is read (RECORD_FILE, BASE_URL, etc.)
    let _ = dotenv();

    // ===== Endpoints =====
    let catalog_mode = CatalogMode::from_env("CATALOG_MODE", CatalogMode::Mock);
    let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3131".to_string());
    let products_path = env::var("PRODUCTS_PATH").unwrap_or_else(|_| "products".to_string());
    let orders_path = env::var("ORDERS_PATH").unwrap_or_else(|_| "orders".to_string());

    // ===== Files / metrics =====
    let record_file = env::var("RECORD_FILE").ok();
    let metrics_port = env::var("METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9898);

    let args = Args {
        catalog_mode,
        base_url,
        products_path,
        orders_path,
        record_file,
        metrics_port,
    };

    // ===== Limits =====
    // Delivery fee in minor units; 2000 = 20.00
    let delivery_fee = env::var("DELIVERY_FEE")
        .ok()
        .and_then(|x| x.parse().ok())
        .unwrap_or(2_000);
    let amount_default = env::var("AMOUNT_DEFAULT").ok().and_then(|x| x.parse().ok()).unwrap_or(1);
    let amount_min = env::var("AMOUNT_MIN").ok().and_then(|x| x.parse().ok()).unwrap_or(1);
    let amount_max = env::var("AMOUNT_MAX").ok().and_then(|x| x.parse().ok()).unwrap_or(10);

    let limits = Limits {
        delivery_fee,
        amount: AmountBounds {
            default: amount_default,
            min: amount_min,
            max: amount_max,
        },
    };
    (args, limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_mode_parses_known_tokens() {
        assert_eq!(CatalogMode::parse_one("mock"), Some(CatalogMode::Mock));
        assert_eq!(CatalogMode::parse_one(" Remote "), Some(CatalogMode::Remote));
        assert_eq!(CatalogMode::parse_one("http"), Some(CatalogMode::Remote));
        assert_eq!(CatalogMode::parse_one("ftp"), None);
    }

    #[test]
    fn endpoint_urls_join_without_double_slash() {
        let args = Args {
            catalog_mode: CatalogMode::Remote,
            base_url: "http://localhost:3131/".to_string(),
            products_path: "products".to_string(),
            orders_path: "orders".to_string(),
            record_file: None,
            metrics_port: 9898,
        };
        assert_eq!(args.products_url(), "http://localhost:3131/products");
        assert_eq!(args.orders_url(), "http://localhost:3131/orders");
    }
}
