//! Binary fixture builders: serialize a critbit slab from a sorted leaf list
//! and assemble queue/orderbook account buffers, byte-compatible with the
//! on-chain layouts the crate decodes.

use serum_orderbook::state::slab::{SlabHeader, SLAB_NODE_LEN};
use serum_orderbook::state::queue::QueueHeader;

pub const INITIALIZED: u64 = 1 << 0;
pub const EVENT_QUEUE: u64 = 1 << 4;
pub const BIDS: u64 = 1 << 5;
pub const ASKS: u64 = 1 << 6;

#[derive(Clone, Copy)]
pub struct LeafSpec {
    pub key: u128,
    pub owner_slot: u8,
    pub fee_tier: u8,
    pub owner: [u8; 32],
    pub quantity: u64,
    pub client_order_id: u64,
}

impl LeafSpec {
    pub fn new(key: u128, quantity: u64) -> Self {
        Self {
            key,
            owner_slot: 1,
            fee_tier: 0,
            owner: [13; 32],
            quantity,
            client_order_id: 0,
        }
    }
}

fn leaf_record(leaf: &LeafSpec) -> Vec<u8> {
    let mut record = Vec::with_capacity(SLAB_NODE_LEN);
    record.extend_from_slice(&2u32.to_le_bytes());
    record.push(leaf.owner_slot);
    record.push(leaf.fee_tier);
    record.extend_from_slice(&[0; 2]);
    record.extend_from_slice(&leaf.key.to_le_bytes());
    record.extend_from_slice(&leaf.owner);
    record.extend_from_slice(&leaf.quantity.to_le_bytes());
    record.extend_from_slice(&leaf.client_order_id.to_le_bytes());
    record
}

fn inner_record(prefix_len: u32, key: u128, children: [u32; 2]) -> Vec<u8> {
    let mut record = Vec::with_capacity(SLAB_NODE_LEN);
    record.extend_from_slice(&1u32.to_le_bytes());
    record.extend_from_slice(&prefix_len.to_le_bytes());
    record.extend_from_slice(&key.to_le_bytes());
    record.extend_from_slice(&children[0].to_le_bytes());
    record.extend_from_slice(&children[1].to_le_bytes());
    record.extend_from_slice(&[0; 40]);
    record
}

// Leaves must be sorted by key and unique: the subtree sharing a prefix then
// splits cleanly on the first bit where its lowest and highest keys differ.
fn build_subtree(records: &mut Vec<Vec<u8>>, leaves: &[LeafSpec]) -> u32 {
    if leaves.len() == 1 {
        records.push(leaf_record(&leaves[0]));
        return (records.len() - 1) as u32;
    }
    let first = leaves[0].key;
    let last = leaves[leaves.len() - 1].key;
    let prefix_len = (first ^ last).leading_zeros();
    let crit_bit_mask = 1u128 << (127 - prefix_len);
    let split = leaves
        .iter()
        .position(|leaf| leaf.key & crit_bit_mask != 0)
        .unwrap();

    let index = records.len();
    records.push(vec![0; SLAB_NODE_LEN]); // reserve the inner node's slot
    let left = build_subtree(records, &leaves[..split]);
    let right = build_subtree(records, &leaves[split..]);
    records[index] = inner_record(prefix_len, first, [left, right]);
    index as u32
}

/// Serialize a slab (header + node arena) holding exactly `leaves`, which
/// must be sorted by key and free of duplicates.
pub fn build_slab(leaves: &[LeafSpec]) -> Vec<u8> {
    assert!(leaves.windows(2).all(|w| w[0].key < w[1].key));
    let mut records: Vec<Vec<u8>> = Vec::new();
    let root = if leaves.is_empty() {
        0
    } else {
        build_subtree(&mut records, leaves)
    };

    let mut buf = Vec::with_capacity(SlabHeader::LEN + records.len() * SLAB_NODE_LEN);
    buf.extend_from_slice(&(records.len() as u32).to_le_bytes()); // bump_index
    buf.extend_from_slice(&[0; 4]);
    buf.extend_from_slice(&[0; 8]); // empty free list
    buf.extend_from_slice(&[0; 4]);
    buf.extend_from_slice(&root.to_le_bytes());
    buf.extend_from_slice(&(leaves.len() as u32).to_le_bytes());
    buf.extend_from_slice(&[0; 4]);
    for record in &records {
        assert_eq!(record.len(), SLAB_NODE_LEN);
        buf.extend_from_slice(record);
    }
    buf
}

/// Assemble a full orderbook account: `pad(5) | flags | slab | pad(7)`.
pub fn build_order_book_account(flags: u64, leaves: &[LeafSpec]) -> Vec<u8> {
    let mut buf = vec![0u8; 5];
    buf.extend_from_slice(&flags.to_le_bytes());
    buf.extend_from_slice(&build_slab(leaves));
    buf.extend_from_slice(&[0; 7]);
    buf
}

pub const EVENT_RECORD_LEN: usize = 88;

pub const EVENT_FILL: u8 = 1 << 0;
pub const EVENT_OUT: u8 = 1 << 1;
pub const EVENT_BID: u8 = 1 << 2;
pub const EVENT_MAKER: u8 = 1 << 3;

pub fn event_record(
    flags: u8,
    released: u64,
    paid: u64,
    fee: u64,
    order_id: u128,
    client_order_id: u64,
) -> Vec<u8> {
    let mut record = Vec::with_capacity(EVENT_RECORD_LEN);
    record.push(flags);
    record.push(0); // open_order_slot
    record.push(0); // fee_tier
    record.extend_from_slice(&[0; 5]);
    record.extend_from_slice(&released.to_le_bytes());
    record.extend_from_slice(&paid.to_le_bytes());
    record.extend_from_slice(&fee.to_le_bytes());
    record.extend_from_slice(&order_id.to_le_bytes());
    record.extend_from_slice(&[7; 32]); // public_key
    record.extend_from_slice(&client_order_id.to_le_bytes());
    record
}

/// Assemble an event queue account with `capacity` slots, placing each record
/// at the slot paired with it.
pub fn build_event_queue(
    head: u32,
    count: u32,
    capacity: usize,
    records: &[(usize, Vec<u8>)],
) -> Vec<u8> {
    let mut buf = vec![0u8; 5];
    buf.extend_from_slice(&(INITIALIZED | EVENT_QUEUE).to_le_bytes());
    buf.extend_from_slice(&head.to_le_bytes());
    buf.extend_from_slice(&[0; 4]);
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&[0; 4]);
    buf.extend_from_slice(&(head + count).to_le_bytes()); // next_seq_num
    buf.extend_from_slice(&[0; 4]);
    assert_eq!(buf.len(), QueueHeader::LEN);
    buf.resize(QueueHeader::LEN + capacity * EVENT_RECORD_LEN, 0);
    for (slot, record) in records {
        assert_eq!(record.len(), EVENT_RECORD_LEN);
        let offset = QueueHeader::LEN + slot * EVENT_RECORD_LEN;
        buf[offset..offset + EVENT_RECORD_LEN].copy_from_slice(record);
    }
    buf
}
