// ===============================
// src/amount.rs
// ===============================
//
// Quantity control for menu items and cart lines:
// - raw text input parses as an integer; garbage falls back to the
//   configured default (not the previous value)
// - parsed values clamp to [min, max] inclusive
// - increment/decrement go through set(), so they clamp the same way
//

#[derive(Debug, Clone, Copy)]
pub struct AmountBounds {
    pub default: i64,
    pub min: i64,
    pub max: i64,
}

impl Default for AmountBounds {
    fn default() -> Self {
        Self { default: 1, min: 1, max: 10 }
    }
}

#[derive(Debug, Clone)]
pub struct AmountControl {
    value: i64,
    bounds: AmountBounds,
}

impl AmountControl {
    pub fn new(bounds: AmountBounds) -> Self {
        Self { value: bounds.default, bounds }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Apply a raw text edit. Returns the applied value; the owner announces
    /// every successful call by requoting its price.
    pub fn set_value(&mut self, raw: &str) -> i64 {
        match raw.trim().parse::<i64>() {
            Ok(n) => self.set(n),
            Err(_) => self.set(self.bounds.default),
        }
    }

    pub fn set(&mut self, n: i64) -> i64 {
        self.value = n.clamp(self.bounds.min, self.bounds.max);
        self.value
    }

    pub fn increment(&mut self) -> i64 {
        self.set(self.value + 1)
    }

    pub fn decrement(&mut self) -> i64 {
        self.set(self.value - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> AmountControl {
        AmountControl::new(AmountBounds::default())
    }

    #[test]
    fn values_inside_range_pass_through() {
        let mut c = control();
        for n in 1..=10 {
            assert_eq!(c.set(n), n);
        }
    }

    #[test]
    fn values_outside_range_clamp_to_bounds() {
        let mut c = control();
        assert_eq!(c.set(0), 1);
        assert_eq!(c.set(-7), 1);
        assert_eq!(c.set(11), 10);
        assert_eq!(c.set(9_999), 10);
    }

    #[test]
    fn raw_text_parses_and_clamps() {
        let mut c = control();
        assert_eq!(c.set_value("3"), 3);
        assert_eq!(c.set_value(" 42 "), 10);
        assert_eq!(c.set_value("-1"), 1);
    }

    #[test]
    fn garbage_input_falls_back_to_default_not_previous() {
        let mut c = control();
        c.set(7);
        assert_eq!(c.set_value("abc"), 1);
        c.set(5);
        assert_eq!(c.set_value(""), 1);
        c.set(9);
        assert_eq!(c.set_value("2.5"), 1);
    }

    #[test]
    fn increment_and_decrement_inherit_clamping() {
        let mut c = control();
        c.set(10);
        assert_eq!(c.increment(), 10);
        c.set(1);
        assert_eq!(c.decrement(), 1);
        c.set(4);
        assert_eq!(c.increment(), 5);
        assert_eq!(c.decrement(), 4);
    }

    #[test]
    fn custom_bounds_apply() {
        let mut c = AmountControl::new(AmountBounds { default: 2, min: 2, max: 5 });
        assert_eq!(c.value(), 2);
        assert_eq!(c.set(1), 2);
        assert_eq!(c.set(6), 5);
        assert_eq!(c.set_value("x"), 2);
    }
}
