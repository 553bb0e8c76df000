//! Price-ordered views over a decoded slab: the full order list and the
//! depth-aggregated (L2) book.

use solana_program::pubkey::Pubkey;
use std::convert::TryInto;

use crate::error::{SerumError, SerumResult};
use crate::market::ConversionContext;
use crate::state::slab::{LeafNode, Slab};
use crate::state::{decode_account_flags, AccountFlag, AccountFlags, Side};

/// A resting order, with lot values converted to decimal numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    #[allow(missing_docs)]
    pub order_id: u128,
    #[allow(missing_docs)]
    pub client_id: u64,
    /// The open-orders account which owns the order
    pub open_order_address: Pubkey,
    /// The order's slot in its open-orders account
    pub open_order_slot: u8,
    #[allow(missing_docs)]
    pub fee_tier: u8,
    #[allow(missing_docs)]
    pub side: Side,
    #[allow(missing_docs)]
    pub price: f64,
    #[allow(missing_docs)]
    pub size: f64,
    #[allow(missing_docs)]
    pub price_lots: u64,
    #[allow(missing_docs)]
    pub size_lots: u64,
}

/// One L2 price level: a distinct price and the summed size resting at it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderInfo {
    #[allow(missing_docs)]
    pub price: f64,
    #[allow(missing_docs)]
    pub size: f64,
    #[allow(missing_docs)]
    pub price_lots: u64,
    #[allow(missing_docs)]
    pub size_lots: u64,
}

/// One side of an orderbook: a decoded slab plus the side flag and the lot
/// conversion context.
#[derive(Debug)]
pub struct OrderBook {
    slab: Slab,
    side: Side,
    context: ConversionContext,
}

impl OrderBook {
    /// Wrap a decoded slab, checking that the account flags describe an
    /// initialized book side: exactly one of bids/asks must be set.
    pub fn new(
        slab: Slab,
        account_flags: AccountFlags,
        context: ConversionContext,
    ) -> SerumResult<Self> {
        let is_bids = account_flags.contains(AccountFlag::Bids);
        let is_asks = account_flags.contains(AccountFlag::Asks);
        if !account_flags.contains(AccountFlag::Initialized) || !(is_bids ^ is_asks) {
            return Err(SerumError::InvalidOrderBookFlags);
        }
        Ok(Self {
            slab,
            side: if is_bids { Side::Bid } else { Side::Ask },
            context,
        })
    }

    /// Decode a full orderbook account:
    /// `pad(5) | account_flags(8) | slab | pad(7)`.
    pub fn from_buffer(buf: &[u8], context: ConversionContext) -> SerumResult<Self> {
        if buf.len() < 13 {
            return Err(SerumError::TruncatedBuffer);
        }
        let raw = u64::from_le_bytes(buf[5..13].try_into().unwrap());
        let account_flags =
            decode_account_flags(raw).map_err(|_| SerumError::InvalidOrderBookFlags)?;
        let slab = Slab::from_buffer(&buf[13..])?;
        Self::new(slab, account_flags, context)
    }

    #[allow(missing_docs)]
    pub fn side(&self) -> Side {
        self.side
    }

    #[allow(missing_docs)]
    pub fn slab(&self) -> &Slab {
        &self.slab
    }

    fn order_from_leaf(&self, leaf: LeafNode) -> Order {
        let price_lots = leaf.price();
        let size_lots = leaf.quantity;
        Order {
            order_id: leaf.order_id(),
            client_id: leaf.client_order_id,
            open_order_address: leaf.owner(),
            open_order_slot: leaf.owner_slot,
            fee_tier: leaf.fee_tier,
            side: self.side,
            price: self.context.price_lots_to_number(price_lots),
            size: self.context.base_size_lots_to_number(size_lots),
            price_lots,
            size_lots,
        }
    }

    /// All resting orders in ascending key order.
    pub fn orders(&self) -> impl Iterator<Item = SerumResult<Order>> + '_ {
        self.slab
            .items(false)
            .map(move |leaf| leaf.map(|leaf| self.order_from_leaf(leaf)))
    }

    /// The book's L2 view: up to `depth` distinct price levels in priority
    /// order (highest bid first / lowest ask first), with quantities at equal
    /// prices summed.
    pub fn get_l2(&self, depth: usize) -> SerumResult<Vec<OrderInfo>> {
        let descending = self.side == Side::Bid;
        let mut levels: Vec<(u64, u64)> = Vec::new();
        for leaf in self.slab.items(descending) {
            let leaf = leaf?;
            let price_lots = leaf.price();
            let quantity = leaf.quantity;
            match levels.last_mut() {
                Some(level) if level.0 == price_lots => level.1 += quantity,
                _ => {
                    if levels.len() == depth {
                        break;
                    }
                    levels.push((price_lots, quantity));
                }
            }
        }
        Ok(levels
            .into_iter()
            .map(|(price_lots, size_lots)| OrderInfo {
                price: self.context.price_lots_to_number(price_lots),
                size: self.context.base_size_lots_to_number(size_lots),
                price_lots,
                size_lots,
            })
            .collect())
    }
}
