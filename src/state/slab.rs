//! Decoding and read-only traversal of orderbook slabs.
//!
//! A slab account holds a header and a flat array of fixed-size node slots
//! encoding a critbit tree over the orders of one book side. Nodes reference
//! each other through `u32` slot indices rather than pointers, so the decoded
//! form keeps the same arena layout: a `Vec` of tagged nodes addressed by
//! index. Leaf keys are `(price << 64) | sequence`, with the sequence number
//! bit-complemented on the bid side, so plain unsigned ordering of the key
//! yields price/time priority for both sides.

use bytemuck::{Pod, Zeroable};
use num_enum::TryFromPrimitive;
use solana_program::pubkey::Pubkey;
use std::convert::{TryFrom, TryInto};

use crate::error::{SerumError, SerumResult};

/// Serialized size of a slab node record: a 4-byte tag followed by a 68-byte
/// payload slot shared by all variants.
pub const SLAB_NODE_LEN: usize = 72;

/// The slab header. Field order and padding match the on-chain layout, so the
/// struct can be read straight out of the account buffer.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
pub struct SlabHeader {
    /// Number of allocated node slots, free ones included. The node array's
    /// length is exactly this value.
    pub bump_index: u32,
    _pad0: [u8; 4],
    #[allow(missing_docs)]
    pub free_list_length: u32,
    _pad1: [u8; 4],
    #[allow(missing_docs)]
    pub free_list_head: u32,
    /// Index of the tree root. Meaningless when `leaf_count == 0`.
    pub root: u32,
    /// Number of live leaf nodes reachable from `root`.
    pub leaf_count: u32,
    _pad2: [u8; 4],
}

impl SlabHeader {
    #[allow(missing_docs)]
    pub const LEN: usize = std::mem::size_of::<Self>();
}

#[derive(TryFromPrimitive, Debug, Clone, Copy, PartialEq)]
#[repr(u32)]
enum NodeTag {
    Uninitialized = 0,
    Inner = 1,
    Leaf = 2,
    Free = 3,
    LastFree = 4,
}

/// An internal critbit branch. The top `prefix_len` bits of `key` are shared
/// by every leaf below this node; the next bit selects the child.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct InnerNode {
    #[allow(missing_docs)]
    pub prefix_len: u32,
    #[allow(missing_docs)]
    pub key: u128,
    #[allow(missing_docs)]
    pub children: [u32; 2],
}

impl InnerNode {
    const LEN: usize = std::mem::size_of::<Self>();
}

/// A resting order.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct LeafNode {
    /// The slot of this order in its owner's open-orders account
    pub owner_slot: u8,
    #[allow(missing_docs)]
    pub fee_tier: u8,
    _padding: [u8; 2],
    /// The order id: `(price << 64) | sequence`
    pub key: u128,
    /// The open-orders account which owns this order
    pub owner: [u8; 32],
    /// Order quantity in base lots
    pub quantity: u64,
    #[allow(missing_docs)]
    pub client_order_id: u64,
}

impl LeafNode {
    const LEN: usize = std::mem::size_of::<Self>();

    /// Parse the leaf's price in lots out of its key
    pub fn price(&self) -> u64 {
        (self.key >> 64) as u64
    }

    /// Get the associated order id
    pub fn order_id(&self) -> u128 {
        self.key
    }

    /// The owning open-orders account address
    pub fn owner(&self) -> Pubkey {
        Pubkey::new_from_array(self.owner)
    }
}

/// A decoded node slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlabNode {
    /// A slot which was never allocated
    Uninitialized,
    #[allow(missing_docs)]
    Inner(InnerNode),
    #[allow(missing_docs)]
    Leaf(LeafNode),
    /// A freed slot, chained into the free list
    Free {
        /// Index of the next free slot
        next: u32,
    },
    /// The tail of the free list
    LastFree,
}

/// An immutable, decoded slab snapshot.
#[derive(Debug)]
pub struct Slab {
    header: SlabHeader,
    nodes: Vec<SlabNode>,
}

impl Slab {
    /// Decode a raw slab buffer into a header and its node arena.
    ///
    /// Fails with [`SerumError::TruncatedBuffer`] if the buffer cannot hold
    /// the header plus the `bump_index` node records it declares, and with
    /// [`SerumError::UnknownNodeTag`] on an unrecognized node tag. No
    /// structural validation is performed beyond that; tree well-formedness
    /// is checked lazily by the read operations.
    pub fn from_buffer(buf: &[u8]) -> SerumResult<Self> {
        if buf.len() < SlabHeader::LEN {
            return Err(SerumError::TruncatedBuffer);
        }
        let header: SlabHeader = bytemuck::pod_read_unaligned(&buf[..SlabHeader::LEN]);
        let nodes_len = header.bump_index as usize * SLAB_NODE_LEN;
        if buf.len() - SlabHeader::LEN < nodes_len {
            return Err(SerumError::TruncatedBuffer);
        }

        let mut nodes = Vec::with_capacity(header.bump_index as usize);
        for record in buf[SlabHeader::LEN..SlabHeader::LEN + nodes_len].chunks_exact(SLAB_NODE_LEN)
        {
            let tag = u32::from_le_bytes(record[..4].try_into().unwrap());
            let payload = &record[4..];
            let node = match NodeTag::try_from(tag).map_err(|_| SerumError::UnknownNodeTag(tag))? {
                NodeTag::Uninitialized => SlabNode::Uninitialized,
                NodeTag::Inner => {
                    SlabNode::Inner(bytemuck::pod_read_unaligned(&payload[..InnerNode::LEN]))
                }
                NodeTag::Leaf => {
                    SlabNode::Leaf(bytemuck::pod_read_unaligned(&payload[..LeafNode::LEN]))
                }
                NodeTag::Free => SlabNode::Free {
                    next: u32::from_le_bytes(payload[..4].try_into().unwrap()),
                },
                NodeTag::LastFree => SlabNode::LastFree,
            };
            nodes.push(node);
        }
        Ok(Self { header, nodes })
    }

    #[allow(missing_docs)]
    pub fn header(&self) -> &SlabHeader {
        &self.header
    }

    /// The decoded node arena, indexed exactly like the on-chain slot array
    pub fn nodes(&self) -> &[SlabNode] {
        &self.nodes
    }

    fn root(&self) -> Option<u32> {
        if self.header.leaf_count == 0 {
            None
        } else {
            Some(self.header.root)
        }
    }

    fn node(&self, index: u32) -> SerumResult<&SlabNode> {
        self.nodes
            .get(index as usize)
            .ok_or(SerumError::StructuralCorruption)
    }

    /// Critbit point lookup: the leaf whose key equals `search_key`, if any.
    ///
    /// Reaching a free or uninitialized slot mid-descent means the tree
    /// indices are inconsistent and fails with
    /// [`SerumError::StructuralCorruption`].
    pub fn get(&self, search_key: u128) -> SerumResult<Option<LeafNode>> {
        let mut index = match self.root() {
            Some(root) => root,
            None => return Ok(None),
        };
        loop {
            match self.node(index)? {
                SlabNode::Leaf(leaf) => {
                    let key = leaf.key;
                    return Ok(if key == search_key { Some(*leaf) } else { None });
                }
                SlabNode::Inner(inner) => {
                    let prefix_len = inner.prefix_len;
                    let key = inner.key;
                    if prefix_len >= 128 {
                        return Err(SerumError::StructuralCorruption);
                    }
                    if prefix_len > 0 && (key ^ search_key) >> (128 - prefix_len) != 0 {
                        return Ok(None);
                    }
                    let crit_bit = (search_key >> (127 - prefix_len)) & 1;
                    let children = inner.children;
                    index = children[crit_bit as usize];
                }
                _ => return Err(SerumError::StructuralCorruption),
            }
        }
    }

    /// A lazy iterator over the slab's leaves in strictly ascending (or
    /// descending) key order.
    ///
    /// The traversal is an explicit-stack DFS, so its depth cost is bounded
    /// by the stack vector rather than the call stack. No sorting happens:
    /// the critbit's bit-split order is numeric key order.
    pub fn items(&self, descending: bool) -> SlabIterator<'_> {
        SlabIterator {
            slab: self,
            search_stack: self.root().into_iter().collect(),
            descending,
        }
    }

    fn find_min_max(&self, find_max: bool) -> SerumResult<Option<LeafNode>> {
        let mut index = match self.root() {
            Some(root) => root,
            None => return Ok(None),
        };
        loop {
            match self.node(index)? {
                SlabNode::Leaf(leaf) => return Ok(Some(*leaf)),
                SlabNode::Inner(inner) => {
                    let children = inner.children;
                    index = children[find_max as usize];
                }
                _ => return Err(SerumError::StructuralCorruption),
            }
        }
    }

    /// The leaf with the lowest key (best ask on the ask side)
    pub fn find_min(&self) -> SerumResult<Option<LeafNode>> {
        self.find_min_max(false)
    }

    /// The leaf with the highest key (best bid on the bid side)
    pub fn find_max(&self) -> SerumResult<Option<LeafNode>> {
        self.find_min_max(true)
    }
}

/// See [`Slab::items`]. Yields a single `Err` and fuses if the tree structure
/// turns out to be corrupted mid-traversal.
pub struct SlabIterator<'a> {
    slab: &'a Slab,
    search_stack: Vec<u32>,
    descending: bool,
}

impl<'a> Iterator for SlabIterator<'a> {
    type Item = SerumResult<LeafNode>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.search_stack.pop() {
            let node = match self.slab.nodes.get(current as usize) {
                Some(node) => node,
                None => {
                    self.search_stack.clear();
                    return Some(Err(SerumError::StructuralCorruption));
                }
            };
            match node {
                SlabNode::Inner(inner) => {
                    let children = inner.children;
                    // children[0] must pop first when ascending
                    self.search_stack.push(children[!self.descending as usize]);
                    self.search_stack.push(children[self.descending as usize]);
                }
                SlabNode::Leaf(leaf) => return Some(Ok(*leaf)),
                _ => {
                    self.search_stack.clear();
                    return Some(Err(SerumError::StructuralCorruption));
                }
            }
        }
        None
    }
}

/////////////////////////////////////
// Tests
