//! Chain index: the accepted-block table the retargeting engine walks.
//!
//! Entries live in an append-only arena and point at their parent by
//! [`BlockId`]. Nothing owns its parent, so walking backwards is a series of
//! table lookups. Consensus code only ever reads through [`ChainLookup`], which
//! lets a node plug in its own index as long as it can resolve ids.

use crate::types::{BlockId, CoreError};
use tracing::warn;

/// One accepted block's position in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndex {
    /// Height of the block; 0 at genesis.
    pub height: u64,
    /// Header timestamp, seconds since the Unix epoch.
    pub time: i64,
    /// Compact difficulty target (`nBits`) from the header.
    pub bits: u32,
    /// Parent entry; `None` iff `height == 0`.
    pub prev: Option<BlockId>,
}

impl BlockIndex {
    /// A parentless height-0 entry.
    pub const fn genesis(time: i64, bits: u32) -> Self {
        Self {
            height: 0,
            time,
            bits,
            prev: None,
        }
    }
}

/// Read access to a chain index.
pub trait ChainLookup {
    /// Resolve an id to its entry.
    fn entry(&self, id: BlockId) -> Option<&BlockIndex>;

    /// Walk from `start` (inclusive) back towards genesis.
    fn ancestors<'a>(&'a self, start: &'a BlockIndex) -> Ancestors<'a, Self>
    where
        Self: Sized,
    {
        Ancestors {
            chain: self,
            next: Some(start),
        }
    }
}

/// Newest-first iterator over an entry and its ancestors.
///
/// Heights strictly decrease by one per step. A broken link (missing parent,
/// unresolvable id, or a parent at the wrong height) ends the walk early and
/// is logged; it is a bug in the index, not something to panic over.
pub struct Ancestors<'a, C> {
    chain: &'a C,
    next: Option<&'a BlockIndex>,
}

impl<'a, C: ChainLookup> Iterator for Ancestors<'a, C> {
    type Item = &'a BlockIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = match current.prev {
            Some(id) => match self.chain.entry(id) {
                Some(parent) if parent.height.checked_add(1) == Some(current.height) => {
                    Some(parent)
                }
                Some(parent) => {
                    warn!(
                        height = current.height,
                        parent_height = parent.height,
                        %id,
                        "chain index parent at unexpected height, stopping walk"
                    );
                    None
                }
                None => {
                    warn!(
                        height = current.height,
                        %id,
                        "chain index parent not found, stopping walk"
                    );
                    None
                }
            },
            None if current.height > 0 => {
                warn!(
                    height = current.height,
                    "chain index entry above genesis has no parent, stopping walk"
                );
                None
            }
            None => None,
        };
        Some(current)
    }
}

/// Append-only arena of [`BlockIndex`] entries.
///
/// Inserts are checked so that every entry satisfies the parent/height
/// invariant. Forks are allowed: several entries may share a parent.
#[derive(Debug, Clone, Default)]
pub struct ChainIndex {
    entries: Vec<BlockIndex>,
    genesis: Option<BlockId>,
}

impl ChainIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no block has been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The height-0 entry, if inserted.
    pub fn genesis(&self) -> Option<BlockId> {
        self.genesis
    }

    /// Entry lookup by id.
    pub fn get(&self, id: BlockId) -> Option<&BlockIndex> {
        self.entries.get(id.0)
    }

    /// Insert a fully specified entry after checking it against its parent.
    pub fn insert(&mut self, entry: BlockIndex) -> Result<BlockId, CoreError> {
        match entry.prev {
            None => {
                if entry.height != 0 {
                    return Err(CoreError::HeightMismatch {
                        parent: 0,
                        child: entry.height,
                    });
                }
                if self.genesis.is_some() {
                    return Err(CoreError::DuplicateGenesis);
                }
            }
            Some(prev) => {
                let parent = self.get(prev).ok_or(CoreError::UnknownParent(prev))?;
                if parent.height.checked_add(1) != Some(entry.height) {
                    return Err(CoreError::HeightMismatch {
                        parent: parent.height,
                        child: entry.height,
                    });
                }
            }
        }

        let id = BlockId(self.entries.len());
        self.entries.push(entry);
        if entry.prev.is_none() {
            self.genesis = Some(id);
        }
        Ok(id)
    }

    /// Insert a child of `parent`, deriving its height.
    pub fn push_child(&mut self, parent: BlockId, time: i64, bits: u32) -> Result<BlockId, CoreError> {
        let height = self
            .get(parent)
            .ok_or(CoreError::UnknownParent(parent))?
            .height
            .saturating_add(1);
        self.insert(BlockIndex {
            height,
            time,
            bits,
            prev: Some(parent),
        })
    }

}

impl ChainLookup for ChainIndex {
    fn entry(&self, id: BlockId) -> Option<&BlockIndex> {
        self.get(id)
    }
}
