//! Lot and decimal conversions.
//!
//! On-chain prices and quantities are quantized into lots; turning them into
//! human-readable decimal numbers needs the market's lot sizes and the two
//! token mints' decimals. That metadata lives in the market state account and
//! is loaded by a collaborator outside this crate; the decoders only consume
//! it through [`ConversionContext`].

/// The market parameters needed to convert between lots and decimal numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionContext {
    /// Base quantity per size lot, in native base units
    pub base_lot_size: u64,
    /// Quote quantity per price lot, in native quote units
    pub quote_lot_size: u64,
    /// Decimals of the base token mint
    pub base_decimals: u8,
    /// Decimals of the quote token mint
    pub quote_decimals: u8,
}

impl ConversionContext {
    /// Native base units per whole base token
    pub fn base_multiplier(&self) -> u64 {
        10u64.pow(self.base_decimals as u32)
    }

    /// Native quote units per whole quote token
    pub fn quote_multiplier(&self) -> u64 {
        10u64.pow(self.quote_decimals as u32)
    }

    /// Convert a price in lots to a decimal price.
    pub fn price_lots_to_number(&self, price_lots: u64) -> f64 {
        (price_lots as u128 * self.quote_lot_size as u128 * self.base_multiplier() as u128) as f64
            / (self.base_lot_size as u128 * self.quote_multiplier() as u128) as f64
    }

    /// Convert a decimal price to the nearest price in lots.
    pub fn price_number_to_lots(&self, price: f64) -> u64 {
        ((price * self.quote_multiplier() as f64 * self.base_lot_size as f64)
            / (self.base_multiplier() as f64 * self.quote_lot_size as f64))
            .round() as u64
    }

    /// Convert a base size in lots to a decimal quantity.
    pub fn base_size_lots_to_number(&self, size_lots: u64) -> f64 {
        (size_lots as u128 * self.base_lot_size as u128) as f64 / self.base_multiplier() as f64
    }

    /// Convert a decimal base quantity to size lots, rounding down.
    pub fn base_size_number_to_lots(&self, size: f64) -> u64 {
        (size * self.base_multiplier() as f64).floor() as u64 / self.base_lot_size
    }

    /// Convert a quote size in lots to a decimal quantity.
    pub fn quote_size_lots_to_number(&self, size_lots: u64) -> f64 {
        (size_lots as u128 * self.quote_lot_size as u128) as f64 / self.quote_multiplier() as f64
    }

    /// Convert a decimal quote quantity to lots, rounding down.
    pub fn quote_size_number_to_lots(&self, size: f64) -> u64 {
        (size * self.quote_multiplier() as f64).floor() as u64 / self.quote_lot_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ConversionContext {
        ConversionContext {
            base_lot_size: 100,
            quote_lot_size: 10,
            base_decimals: 6,
            quote_decimals: 6,
        }
    }

    #[test]
    fn price_conversions() {
        let ctx = context();
        assert_eq!(ctx.price_lots_to_number(117_446), 11_744.6);
        assert_eq!(ctx.price_number_to_lots(11_744.6), 117_446);
    }

    #[test]
    fn size_conversions() {
        let ctx = context();
        assert_eq!(ctx.base_size_lots_to_number(40_632), 4.0632);
        assert_eq!(ctx.base_size_number_to_lots(4.0632), 40_632);
        assert_eq!(ctx.quote_size_lots_to_number(1_000_000), 10.0);
        assert_eq!(ctx.quote_size_number_to_lots(10.0), 1_000_000);
    }
}
