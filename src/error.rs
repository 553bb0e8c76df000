//! Decode errors. Every error is fatal to the decode call that raised it:
//! there are no partial results and no internal retries.

use thiserror::Error;

#[allow(missing_docs)]
pub type SerumResult<T = ()> = Result<T, SerumError>;

/// Reasons an account snapshot can fail to decode.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerumError {
    /// The buffer is shorter than the lengths declared in its own header.
    #[error("account data is shorter than its declared contents")]
    TruncatedBuffer,
    /// A slab node carries a tag outside the five known variants.
    #[error("unknown slab node tag {0}")]
    UnknownNodeTag(u32),
    /// The account flags don't match the structure the caller asked for.
    #[error("account flags do not match the expected account kind")]
    InvalidAccountKind,
    /// An orderbook side must be initialized and flagged as exactly one of
    /// bids or asks.
    #[error("invalid orderbook flags: not initialized, or not exactly one of bids/asks")]
    InvalidOrderBookFlags,
    /// Tree traversal reached a node kind that is invalid for its position.
    #[error("slab tree structure is corrupted")]
    StructuralCorruption,
}
