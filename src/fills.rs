//! Interpretation of fill events into economically meaningful fill records.
//!
//! A fill event only carries native released/paid/fee quantities; which side
//! of the trade they describe depends on the order's side and on whether the
//! owner was the maker. The four-way sign table in [`parse_fill`] is exact
//! maker/taker economics and must not be collapsed into a simpler formula.

use crate::market::ConversionContext;
use crate::state::queue::{Event, EventFlag};
use crate::state::Side;

/// A fill derived from an event record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilledOrder {
    #[allow(missing_docs)]
    pub order_id: u128,
    #[allow(missing_docs)]
    pub side: Side,
    /// Trade price, fees excluded, as a decimal number
    pub price: f64,
    /// Traded base quantity as a decimal number
    pub size: f64,
    /// Native fee paid, positive for a maker rebate and negative for a taker
    /// fee
    pub fee_cost: i64,
}

/// Interpret a single fill event.
///
/// Only meaningful for events with the fill flag set and a nonzero
/// `native_quantity_paid`; [`parse_fills`] applies that filter.
pub fn parse_fill(event: &Event, context: &ConversionContext) -> FilledOrder {
    let flags = event.flags();
    let maker = flags.contains(EventFlag::Maker);
    let released = event.native_quantity_released as i128;
    let fee = event.native_fee_or_rebate as i128;

    // A bid releases base and pays quote; an ask the other way around. The
    // maker's released quantity is net of the rebate where the taker's is
    // net of the fee, hence the sign flip between the four cases.
    let (side, price_before_fees) = match (event.side(), maker) {
        (Side::Bid, true) => (Side::Bid, released + fee),
        (Side::Bid, false) => (Side::Bid, released - fee),
        (Side::Ask, true) => (Side::Ask, released - fee),
        (Side::Ask, false) => (Side::Ask, released + fee),
    };

    let paid = event.native_quantity_paid;
    let price = (price_before_fees * context.base_multiplier() as i128) as f64
        / (context.quote_multiplier() as u128 * paid as u128) as f64;
    let size = paid as f64 / context.base_multiplier() as f64;
    FilledOrder {
        order_id: event.order_id,
        side,
        price,
        size,
        fee_cost: event.native_fee_or_rebate as i64 * if maker { 1 } else { -1 },
    }
}

/// Interpret the fills among a decoded batch of events, skipping non-fill
/// events and zero-quantity fills.
pub fn parse_fills(events: &[Event], context: &ConversionContext) -> Vec<FilledOrder> {
    events
        .iter()
        .filter(|event| {
            event.flags().contains(EventFlag::Fill) && event.native_quantity_paid > 0
        })
        .map(|event| parse_fill(event, context))
        .collect()
}
