//! Typed views over the different Serum account data structures.
//!
//! Every account kind starts with the same 64-bit flag bitset which both
//! identifies the structure stored in the account and marks it as
//! initialized. Decoders check these flags before interpreting any payload.

use enumflags2::{bitflags, BitFlags};

use crate::error::{SerumError, SerumResult};

/// Ring-buffer queues of pending requests and of fill/out events
pub mod queue;
/// The critbit slab backing one orderbook side
pub mod slab;

/// The account flag bitset. Bits 7..64 are reserved and must be zero.
#[bitflags]
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountFlag {
    #[allow(missing_docs)]
    Initialized = 1 << 0,
    #[allow(missing_docs)]
    Market = 1 << 1,
    #[allow(missing_docs)]
    OpenOrders = 1 << 2,
    #[allow(missing_docs)]
    RequestQueue = 1 << 3,
    #[allow(missing_docs)]
    EventQueue = 1 << 4,
    #[allow(missing_docs)]
    Bids = 1 << 5,
    #[allow(missing_docs)]
    Asks = 1 << 6,
}

#[allow(missing_docs)]
pub type AccountFlags = BitFlags<AccountFlag>;

/// Decode a raw little-endian flag word, rejecting reserved bits.
pub fn decode_account_flags(raw: u64) -> SerumResult<AccountFlags> {
    AccountFlags::from_bits(raw).map_err(|_| SerumError::InvalidAccountKind)
}

/// An orderbook side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Buy side. Order keys carry a bit-complemented sequence number so that
    /// earlier bids sort higher.
    Bid,
    /// Sell side.
    Ask,
}
