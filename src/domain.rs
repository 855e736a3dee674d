// ===============================
// src/domain.rs
// ===============================
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Prices are i64 minor units (2 decimals). The wire format uses plain JSON
/// numbers, so scaling happens here at the serde boundary.
pub mod money {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &i64, s: S) -> Result<S::Ok, S::Error> {
        if v % 100 == 0 {
            s.serialize_i64(v / 100)
        } else {
            s.serialize_f64(*v as f64 / 100.0)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let raw = f64::deserialize(d)?;
        Ok((raw * 100.0).round() as i64)
    }
}

pub fn fmt_money(v: i64) -> String {
    format!("{}.{:02}", v / 100, (v % 100).abs())
}

// ---- Catalog (immutable after load) ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDef {
    pub label: String,
    #[serde(with = "money")]
    pub price: i64,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub label: String,
    pub options: HashMap<String, OptionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDef {
    pub id: String,
    pub name: String,
    #[serde(with = "money")]
    pub price: i64,
    #[serde(default)]
    pub params: HashMap<String, ParamDef>,
}

// ---- Selection state (one product instance in the menu) ----

/// Which option ids are currently picked, per param category. An option
/// absent from the map counts as not selected.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    picked: HashMap<String, HashSet<String>>,
}

impl Selection {
    pub fn is_picked(&self, param: &str, option: &str) -> bool {
        self.picked.get(param).map_or(false, |set| set.contains(option))
    }

    pub fn set(&mut self, param: &str, option: &str, on: bool) {
        let set = self.picked.entry(param.to_string()).or_default();
        if on {
            set.insert(option.to_string());
        } else {
            set.remove(option);
        }
    }

    /// Flip one option, returning its new state.
    pub fn toggle(&mut self, param: &str, option: &str) -> bool {
        let on = !self.is_picked(param, option);
        self.set(param, option, on);
        on
    }
}

// ---- Quotes & cart ----

/// Resolved labels of one param category for display and the order payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineParams {
    pub label: String,
    pub options: BTreeMap<String, String>,
}

/// Selected flag per option, for whatever surface renders the menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionIndicator {
    pub param: String,
    pub option: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(with = "money")]
    pub price_single: i64,
    #[serde(with = "money")]
    pub price: i64,
    pub params: BTreeMap<String, LineParams>,
    pub indicators: Vec<OptionIndicator>,
}

/// One snapshot of a configured product, owned by the cart once added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub line_id: String,
    pub id: String,
    pub name: String,
    pub amount: i64,
    #[serde(with = "money")]
    pub price_single: i64,
    #[serde(with = "money")]
    pub price: i64,
    pub params: BTreeMap<String, LineParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub total_number: i64,
    #[serde(with = "money")]
    pub subtotal: i64,
    #[serde(with = "money")]
    pub delivery_fee: i64,
    #[serde(with = "money")]
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

// ---- Messages between the UI adapter and the session ----

#[derive(Debug, Clone)]
pub enum UiEvent {
    ShowMenu,
    ShowItem { product: String },
    ToggleOption { product: String, param: String, option: String },
    SetAmount { product: String, raw: String },
    Increment { product: String },
    Decrement { product: String },
    AddToCart { product: String },
    ShowCart,
    RemoveLine { line_id: String },
    SetLineAmount { line_id: String, raw: String },
    Checkout { phone: String, address: String },
    Quit,
}

#[derive(Debug, Clone)]
pub struct MenuRow {
    pub id: String,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone)]
pub enum Notice {
    Menu(Vec<MenuRow>),
    ItemQuote { product: String, name: String, quote: Quote },
    Cart(CartSnapshot),
    LineAmount { line_id: String, amount: i64, price: i64 },
    OrderAccepted { total: i64 },
    OrderFailed { reason: String },
    Unknown(String),
}

// ---- Recorder events (JSONL audit) ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CatalogLoaded { mode: String, count: usize },
    Quoted { product: String, price_single: i64, price: i64 },
    LineAdded(CartLine),
    LineRemoved { line_id: String },
    LineAmount { line_id: String, amount: i64, price: i64 },
    Totals(CartTotals),
    OrderSent { total: i64, total_number: i64 },
    OrderFailed { reason: String },
    Note(String),
}
