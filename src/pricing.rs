// ===============================
// src/pricing.rs
// ===============================
//
// Unit price = base price adjusted by option deltas:
// - picked option that is not a default  -> add its price
// - default option that is not picked    -> subtract its price
// Default options are already priced into the base, so only deviations from
// the defaults move the number. The whole option grid is walked on every
// change; nothing is patched incrementally.
//

use std::collections::BTreeMap;

use crate::amount::{AmountBounds, AmountControl};
use crate::domain::{CartLine, LineParams, OptionIndicator, ProductDef, Quote, Selection};

pub fn quote(def: &ProductDef, selection: &Selection, amount: i64) -> Quote {
    let mut price = def.price;
    let mut params = BTreeMap::new();
    let mut indicators = Vec::new();

    for (param_id, param) in &def.params {
        let mut picked = BTreeMap::new();
        for (option_id, option) in &param.options {
            let selected = selection.is_picked(param_id, option_id);
            if selected && !option.default {
                price += option.price;
            }
            if !selected && option.default {
                price -= option.price;
            }
            indicators.push(OptionIndicator {
                param: param_id.clone(),
                option: option_id.clone(),
                selected,
            });
            if selected {
                picked.insert(option_id.clone(), option.label.clone());
            }
        }
        params.insert(
            param_id.clone(),
            LineParams { label: param.label.clone(), options: picked },
        );
    }

    Quote {
        price_single: price,
        price: price * amount,
        params,
        indicators,
    }
}

/// One product instance on the menu: the immutable definition plus the
/// mutable selection and amount the user is editing.
#[derive(Debug, Clone)]
pub struct MenuItem {
    pub def: ProductDef,
    pub selection: Selection,
    pub amount: AmountControl,
}

impl MenuItem {
    /// Options flagged `default` start out selected, so the initial selection
    /// agrees with the base price.
    pub fn new(def: ProductDef, bounds: AmountBounds) -> Self {
        let mut selection = Selection::default();
        for (param_id, param) in &def.params {
            for (option_id, option) in &param.options {
                if option.default {
                    selection.set(param_id, option_id, true);
                }
            }
        }
        Self { def, selection, amount: AmountControl::new(bounds) }
    }

    /// Flip an option; None when the catalog has no such param/option.
    pub fn toggle_option(&mut self, param: &str, option: &str) -> Option<bool> {
        let known = self
            .def
            .params
            .get(param)
            .map_or(false, |p| p.options.contains_key(option));
        if !known {
            return None;
        }
        Some(self.selection.toggle(param, option))
    }

    pub fn quote(&self) -> Quote {
        quote(&self.def, &self.selection, self.amount.value())
    }

    /// Snapshot the current configuration as a cart line.
    pub fn to_cart_line(&self, line_id: String) -> CartLine {
        let q = self.quote();
        CartLine {
            line_id,
            id: self.def.id.clone(),
            name: self.def.name.clone(),
            amount: self.amount.value(),
            price_single: q.price_single,
            price: q.price,
            params: q.params,
        }
    }
}
