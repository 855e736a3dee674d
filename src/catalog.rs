// ===============================
// src/catalog.rs
// ===============================
//
// Catalog adapters:
// - mock_products : built-in sample menu, no network
// - fetch_products: GET a JSON array of product records from the
//                   configured endpoint
//
// A failed fetch surfaces as a CatalogError instead of being dropped;
// the caller decides what menu (if any) to start with.
//

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

use crate::domain::{OptionDef, ParamDef, ProductDef};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("bad catalog url: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("catalog endpoint returned {code}: {body}")]
    Status { code: reqwest::StatusCode, body: String },
}

pub async fn fetch_products(
    http: &reqwest::Client,
    products_url: &str,
) -> Result<Vec<ProductDef>, CatalogError> {
    let url = Url::parse(products_url)?;
    tracing::info!(%url, "fetching catalog");

    let rsp = http.get(url).send().await?;
    if !rsp.status().is_success() {
        let code = rsp.status();
        let body = rsp.text().await.unwrap_or_default();
        return Err(CatalogError::Status { code, body });
    }

    let products = rsp.json::<Vec<ProductDef>>().await?;
    tracing::info!(count = products.len(), "catalog loaded");
    Ok(products)
}

fn opt(label: &str, price: i64, default: bool) -> OptionDef {
    OptionDef { label: label.to_string(), price, default }
}

fn param(label: &str, options: Vec<(&str, OptionDef)>) -> ParamDef {
    ParamDef {
        label: label.to_string(),
        options: options.into_iter().map(|(id, o)| (id.to_string(), o)).collect(),
    }
}

/// Sample menu used in mock mode and by the demo script. Prices are minor
/// units (2000 = 20.00).
pub fn mock_products() -> Vec<ProductDef> {
    let mut pizza_params = HashMap::new();
    pizza_params.insert(
        "toppings".to_string(),
        param(
            "Toppings",
            vec![
                ("olives", opt("Olives", 200, true)),
                ("mushrooms", opt("Mushrooms", 200, false)),
                ("basil", opt("Fresh basil", 100, false)),
            ],
        ),
    );
    pizza_params.insert(
        "crust".to_string(),
        param(
            "Crust",
            vec![
                ("standard", opt("Standard", 0, true)),
                ("thin", opt("Thin & crispy", 200, false)),
            ],
        ),
    );

    let mut salad_params = HashMap::new();
    salad_params.insert(
        "ingredients".to_string(),
        param(
            "Ingredients",
            vec![
                ("cucumber", opt("Cucumber", 100, true)),
                ("feta", opt("Feta cheese", 200, false)),
                ("olives", opt("Olives", 150, false)),
            ],
        ),
    );

    let mut sticks_params = HashMap::new();
    sticks_params.insert(
        "sauce".to_string(),
        param(
            "Dipping sauce",
            vec![
                ("garlic", opt("Garlic", 50, true)),
                ("spicy", opt("Spicy tomato", 50, false)),
            ],
        ),
    );

    vec![
        ProductDef {
            id: "pizza".to_string(),
            name: "Margherita pizza".to_string(),
            price: 2_000,
            params: pizza_params,
        },
        ProductDef {
            id: "salad".to_string(),
            name: "Greek salad".to_string(),
            price: 1_000,
            params: salad_params,
        },
        ProductDef {
            id: "breadsticks".to_string(),
            name: "Breadsticks".to_string(),
            price: 700,
            params: sticks_params,
        },
        ProductDef {
            id: "lemonade".to_string(),
            name: "Homemade lemonade".to_string(),
            price: 500,
            params: HashMap::new(),
        },
    ]
}
