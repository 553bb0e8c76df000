#![warn(missing_docs)]
/*!
Read-only decoding of Serum DEX market accounts.

## Overview

This library parses raw snapshots of a market's on-chain accounts into typed,
queryable structures. It covers the two account families with real structure:

- the orderbook sides (bids and asks), each stored as a **slab**: a flat array
  of fixed-size nodes encoding a critbit tree whose leaves are resting orders.
  See [`state::slab::Slab`].
- the **request and event queues**: fixed-capacity circular buffers of pending
  requests or fill/cancel events. See [`state::queue`].

On top of the raw slab, [`orderbook::OrderBook`] exposes the decoded orders in
price/time priority and a depth-aggregated (L2) view, converting on-chain lot
quantities to decimal numbers through a [`market::ConversionContext`].
[`fills`] derives economically meaningful fill records (side, price, signed
fee) from decoded queue events.

Everything here is a pure function from bytes to values: decoding performs no
I/O, holds no shared state, and never mutates its input. Fetching the account
bytes is the job of a [`ChainClient`] implementation, which this crate only
specifies as a trait.

## Decoding an orderbook side

```no_run
use serum_orderbook::{market::ConversionContext, orderbook::OrderBook};

let context = ConversionContext {
    base_lot_size: 100,
    quote_lot_size: 10,
    base_decimals: 6,
    quote_decimals: 6,
};
let data: Vec<u8> = unimplemented!("fetched through a ChainClient");
let book = OrderBook::from_buffer(&data, context).unwrap();
for level in book.get_l2(10).unwrap() {
    println!("{} @ {}", level.size, level.price);
}
```
*/

pub mod error;
/// Interpretation of fill events into filled-order records
pub mod fills;
/// Lot and decimal conversion context supplied by market metadata
pub mod market;
/// Price-ordered views over a decoded slab
pub mod orderbook;
/// The different account data structures and their decoders
pub mod state;

pub use error::{SerumError, SerumResult};

use solana_program::pubkey::Pubkey;

/// The seam through which account snapshots reach the decoders.
///
/// Implementations (RPC clients, local replayers, test harnesses) live outside
/// this crate; the core's contract is simply "given bytes, produce a value or
/// a typed decode error".
pub trait ChainClient {
    /// The transport's own error type. Retry and backoff policy belong to the
    /// implementation, not to the decoders.
    type Error;

    /// Fetch the raw data of the account at `address`.
    fn get_account_info(&self, address: &Pubkey) -> Result<Vec<u8>, Self::Error>;
}
