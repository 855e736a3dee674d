// ===============================
// src/checkout.rs
// ===============================
//
// Builds the order payload from a cart snapshot and POSTs it to the orders
// endpoint. The wire format keeps the upstream field names (camelCase).
// Failures come back as a SubmitError; there is no retry.
//

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::domain::{money, CartSnapshot, LineParams};

#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub id: String,
    pub amount: i64,
    #[serde(with = "money")]
    pub price: i64,
    #[serde(rename = "priceSingle", with = "money")]
    pub price_single: i64,
    pub name: String,
    pub params: BTreeMap<String, LineParams>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub address: String,
    pub phone: String,
    #[serde(rename = "totalPrice", with = "money")]
    pub total_price: i64,
    #[serde(rename = "subtotalPrice", with = "money")]
    pub subtotal_price: i64,
    #[serde(rename = "totalNumber")]
    pub total_number: i64,
    #[serde(rename = "deliveryFee", with = "money")]
    pub delivery_fee: i64,
    pub products: Vec<OrderLine>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("bad orders url: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("order request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("order endpoint returned {code}: {body}")]
    Status { code: reqwest::StatusCode, body: String },
}

pub fn build_payload(snapshot: &CartSnapshot, phone: &str, address: &str) -> OrderPayload {
    OrderPayload {
        address: address.to_string(),
        phone: phone.to_string(),
        total_price: snapshot.totals.total,
        subtotal_price: snapshot.totals.subtotal,
        total_number: snapshot.totals.total_number,
        delivery_fee: snapshot.totals.delivery_fee,
        products: snapshot
            .lines
            .iter()
            .map(|l| OrderLine {
                id: l.id.clone(),
                amount: l.amount,
                price: l.price,
                price_single: l.price_single,
                name: l.name.clone(),
                params: l.params.clone(),
            })
            .collect(),
    }
}

pub async fn submit(
    http: &reqwest::Client,
    orders_url: &str,
    payload: &OrderPayload,
) -> Result<(), SubmitError> {
    let url = Url::parse(orders_url)?;

    let rsp = http.post(url).json(payload).send().await?;
    if !rsp.status().is_success() {
        let code = rsp.status();
        let body = rsp.text().await.unwrap_or_default();
        return Err(SubmitError::Status { code, body });
    }

    tracing::info!(total = payload.total_price, items = payload.total_number, "order sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CartLine, CartTotals};

    fn snapshot() -> CartSnapshot {
        let mut params = BTreeMap::new();
        params.insert(
            "toppings".to_string(),
            LineParams {
                label: "Toppings".to_string(),
                options: BTreeMap::from([("olives".to_string(), "Olives".to_string())]),
            },
        );
        CartSnapshot {
            lines: vec![CartLine {
                line_id: "LN-1".to_string(),
                id: "pizza".to_string(),
                name: "Margherita pizza".to_string(),
                amount: 3,
                price_single: 2_500,
                price: 7_500,
                params,
            }],
            totals: CartTotals {
                total_number: 3,
                subtotal: 7_500,
                delivery_fee: 2_000,
                total: 9_500,
            },
        }
    }

    #[test]
    fn payload_copies_totals_and_delivery_fields() {
        let p = build_payload(&snapshot(), "123-456-789", "1 Main St");
        assert_eq!(p.phone, "123-456-789");
        assert_eq!(p.address, "1 Main St");
        assert_eq!(p.subtotal_price, 7_500);
        assert_eq!(p.delivery_fee, 2_000);
        assert_eq!(p.total_price, 9_500);
        assert_eq!(p.total_number, 3);
        assert_eq!(p.products.len(), 1);
        assert_eq!(p.products[0].price_single, 2_500);
    }

    #[test]
    fn payload_serializes_with_wire_field_names() {
        let p = build_payload(&snapshot(), "123", "addr");
        let v: serde_json::Value = serde_json::from_str(&serde_json::to_string(&p).unwrap()).unwrap();
        assert_eq!(v["totalPrice"], 95);
        assert_eq!(v["subtotalPrice"], 75);
        assert_eq!(v["deliveryFee"], 20);
        assert_eq!(v["totalNumber"], 3);
        let line = &v["products"][0];
        assert_eq!(line["priceSingle"], 25);
        assert_eq!(line["amount"], 3);
        assert_eq!(line["params"]["toppings"]["label"], "Toppings");
        assert_eq!(line["params"]["toppings"]["options"]["olives"], "Olives");
    }
}
