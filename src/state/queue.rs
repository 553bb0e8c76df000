//! Decoding of the request and event queue accounts.
//!
//! Both queues share the same shape: a header followed by a circular buffer
//! of fixed-size records. The capacity is never stored; it is derived from
//! the buffer length. `head` points at the oldest live record and `count`
//! records follow it, wrapping modulo the capacity. Decoding either yields
//! the live records oldest-first, or walks a bounded history backward from
//! the most recently written slot (which may include already-consumed
//! records still sitting in the buffer).

use bytemuck::{Pod, Zeroable};
use enumflags2::{bitflags, BitFlags};
use solana_program::pubkey::Pubkey;
use std::mem::size_of;

use crate::error::{SerumError, SerumResult};
use crate::state::{decode_account_flags, AccountFlag, Side};

/// The queue header. Matches the on-chain byte layout.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
pub struct QueueHeader {
    _pad0: [u8; 5],
    /// Raw account flag word; decoded and checked by the queue decoders
    pub account_flags: u64,
    /// Index of the oldest live record
    pub head: u32,
    _pad1: [u8; 4],
    /// Number of live records
    pub count: u32,
    _pad2: [u8; 4],
    /// Sequence number the next pushed record will take
    pub next_seq_num: u32,
    _pad3: [u8; 4],
}

impl QueueHeader {
    #[allow(missing_docs)]
    pub const LEN: usize = std::mem::size_of::<Self>();
}

/// Flag bits of a request record.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum RequestFlag {
    NewOrder = 1 << 0,
    CancelOrder = 1 << 1,
    Bid = 1 << 2,
    PostOnly = 1 << 3,
    Ioc = 1 << 4,
}

/// A pending request, waiting to be matched by a crank.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Request {
    /// Raw [`RequestFlag`] bits
    pub request_flags: u8,
    #[allow(missing_docs)]
    pub open_order_slot: u8,
    #[allow(missing_docs)]
    pub fee_tier: u8,
    _padding: [u8; 5],
    /// Max base quantity for a new order, or the id of the order to cancel
    pub max_base_size_or_cancel_id: u64,
    #[allow(missing_docs)]
    pub native_quote_quantity_locked: u64,
    #[allow(missing_docs)]
    pub order_id: u128,
    /// The open-orders account this request acts on behalf of
    pub open_orders: [u8; 32],
    #[allow(missing_docs)]
    pub client_order_id: u64,
}

impl Request {
    /// Decoded flag bits. Unknown bits are ignored.
    pub fn flags(&self) -> BitFlags<RequestFlag> {
        BitFlags::from_bits_truncate(self.request_flags)
    }
}

/// Flag bits of an event record.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum EventFlag {
    Fill = 1 << 0,
    Out = 1 << 1,
    Bid = 1 << 2,
    Maker = 1 << 3,
}

/// A fill or out (order removal) event emitted by the matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Event {
    /// Raw [`EventFlag`] bits
    pub event_flags: u8,
    #[allow(missing_docs)]
    pub open_order_slot: u8,
    #[allow(missing_docs)]
    pub fee_tier: u8,
    _padding: [u8; 5],
    /// Quantity credited to the owner, in native units
    pub native_quantity_released: u64,
    /// Quantity debited from the owner, in native units
    pub native_quantity_paid: u64,
    /// Fee paid (taker) or rebate received (maker), in native quote units
    pub native_fee_or_rebate: u64,
    #[allow(missing_docs)]
    pub order_id: u128,
    /// The open-orders account this event settles into
    pub public_key: [u8; 32],
    #[allow(missing_docs)]
    pub client_order_id: u64,
}

impl Event {
    /// Decoded flag bits. Unknown bits are ignored.
    pub fn flags(&self) -> BitFlags<EventFlag> {
        BitFlags::from_bits_truncate(self.event_flags)
    }

    /// The side of the order this event belongs to
    pub fn side(&self) -> Side {
        if self.flags().contains(EventFlag::Bid) {
            Side::Bid
        } else {
            Side::Ask
        }
    }

    /// The open-orders account address this event settles into
    pub fn public_key(&self) -> Pubkey {
        Pubkey::new_from_array(self.public_key)
    }
}

/// A fixed-size queue record, tied to the account flag that marks a queue of
/// its kind.
pub trait QueueItem: Pod {
    /// [`AccountFlag::RequestQueue`] or [`AccountFlag::EventQueue`]
    const KIND: AccountFlag;
}

impl QueueItem for Request {
    const KIND: AccountFlag = AccountFlag::RequestQueue;
}

impl QueueItem for Event {
    const KIND: AccountFlag = AccountFlag::EventQueue;
}

fn decode_queue<I: QueueItem>(
    buf: &[u8],
    history: Option<u32>,
) -> SerumResult<(QueueHeader, Vec<I>)> {
    if buf.len() < QueueHeader::LEN {
        return Err(SerumError::TruncatedBuffer);
    }
    let header: QueueHeader = bytemuck::pod_read_unaligned(&buf[..QueueHeader::LEN]);
    let flags = decode_account_flags(header.account_flags)?;
    if !flags.contains(AccountFlag::Initialized) || !flags.contains(I::KIND) {
        return Err(SerumError::InvalidAccountKind);
    }

    let item_len = size_of::<I>();
    let alloc_len = (buf.len() - QueueHeader::LEN) / item_len;
    let head = header.head as usize;
    let count = header.count as usize;
    if alloc_len == 0 && count > 0 {
        return Err(SerumError::TruncatedBuffer);
    }

    let read = |slot: usize| -> I {
        let offset = QueueHeader::LEN + slot * item_len;
        bytemuck::pod_read_unaligned(&buf[offset..offset + item_len])
    };
    let items = match history {
        // newest-first, walking backward from the most recently written slot
        Some(h) => (0..(h as usize).min(alloc_len))
            .map(|i| read((head + count + alloc_len - 1 - i) % alloc_len))
            .collect(),
        // live records only, oldest-first
        None => (0..count).map(|i| read((head + i) % alloc_len)).collect(),
    };
    Ok((header, items))
}

/// Decode a request queue account.
///
/// With `history = None`, yields the `count` live records oldest-first. With
/// `history = Some(h)`, yields `min(h, capacity)` records newest-first.
pub fn decode_request_queue(
    buf: &[u8],
    history: Option<u32>,
) -> SerumResult<(QueueHeader, Vec<Request>)> {
    decode_queue(buf, history)
}

/// Decode an event queue account. Same history semantics as
/// [`decode_request_queue`].
pub fn decode_event_queue(
    buf: &[u8],
    history: Option<u32>,
) -> SerumResult<(QueueHeader, Vec<Event>)> {
    decode_queue(buf, history)
}

/////////////////////////////////////
// Tests
