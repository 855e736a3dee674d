// ===============================
// src/cart.rs
// ===============================
//
// Ordered cart lines plus derived totals. Totals are recomputed wholesale
// inside every mutating call, never patched from a delta, so they are
// consistent with the lines before control returns to the dispatcher.
//

use crate::amount::{AmountBounds, AmountControl};
use crate::domain::{CartLine, CartSnapshot, CartTotals};

#[derive(Debug)]
pub struct Cart {
    lines: Vec<CartLine>,
    totals: CartTotals,
    delivery_fee: i64,
    bounds: AmountBounds,
}

impl Cart {
    pub fn new(delivery_fee: i64, bounds: AmountBounds) -> Self {
        Self {
            lines: Vec::new(),
            totals: CartTotals::default(),
            delivery_fee,
            bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    pub fn add(&mut self, line: CartLine) {
        self.lines.push(line);
        self.recompute_totals();
    }

    /// Remove by line id. Unknown ids are a no-op, not an error.
    pub fn remove(&mut self, line_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);
        let removed = self.lines.len() != before;
        self.recompute_totals();
        removed
    }

    /// Re-clamp a line's amount from raw input and reprice it.
    /// None when the line id is unknown.
    pub fn set_line_amount(&mut self, line_id: &str, raw: &str) -> Option<(i64, i64)> {
        let (amount, price) = {
            let line = self.lines.iter_mut().find(|l| l.line_id == line_id)?;
            let mut ctl = AmountControl::new(self.bounds);
            line.amount = ctl.set_value(raw);
            line.price = line.price_single * line.amount;
            (line.amount, line.price)
        };
        self.recompute_totals();
        Some((amount, price))
    }

    /// Wholesale pass over the current lines.
    pub fn recompute_totals(&mut self) {
        let total_number: i64 = self.lines.iter().map(|l| l.amount).sum();
        let subtotal: i64 = self.lines.iter().map(|l| l.price).sum();
        let delivery_fee = if subtotal > 0 { self.delivery_fee } else { 0 };
        self.totals = CartTotals {
            total_number,
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        };
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            totals: self.totals.clone(),
        }
    }
}
