use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

/// Deepest branch nesting a coding tree can need: 256 byte leaves plus the
/// sentinel arranged as a single spine.
pub const MAX_TREE_DEPTH: usize = 256;

/// Every byte value plus the sentinel.
pub const MAX_TREE_LEAVES: usize = 257;

/// A Huffman coding tree over byte symbols.
///
/// A leaf holding `None` is the end-of-message sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tree {
    Leaf(Option<u8>),
    Branch { left: Box<Tree>, right: Box<Tree> },
}

impl Tree {
    pub fn leaf(byte: u8) -> Self {
        Tree::Leaf(Some(byte))
    }

    pub fn end_of_message() -> Self {
        Tree::Leaf(None)
    }

    pub fn branch(left: Tree, right: Tree) -> Self {
        Tree::Branch {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of bits `write_tree` emits for this tree.
    pub fn description_bits(&self) -> u64 {
        match self {
            Tree::Leaf(Some(_)) => 10,
            Tree::Leaf(None) => 2,
            Tree::Branch { left, right } => 1 + left.description_bits() + right.description_bits(),
        }
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Tree::Leaf(_) => 0,
            Tree::Branch { left, right } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Tree::Leaf(_) => 1,
            Tree::Branch { left, right } => left.leaf_count() + right.leaf_count(),
        }
    }

    pub fn contains(&self, symbol: Option<u8>) -> bool {
        match self {
            Tree::Leaf(value) => *value == symbol,
            Tree::Branch { left, right } => left.contains(symbol) || right.contains(symbol),
        }
    }

    /// Checks that the tree can drive a codec: exactly one sentinel leaf and
    /// no byte value on more than one leaf.
    pub fn validate(&self) -> Result<()> {
        fn walk(node: &Tree, seen: &mut HashSet<Option<u8>>) -> Result<()> {
            match node {
                Tree::Leaf(value) => {
                    if !seen.insert(*value) {
                        return Err(match value {
                            Some(byte) => {
                                Error::malformed(format!("byte 0x{byte:02x} appears on two leaves"))
                            }
                            None => Error::malformed("more than one end-of-message leaf"),
                        });
                    }
                    Ok(())
                }
                Tree::Branch { left, right } => {
                    walk(left, seen)?;
                    walk(right, seen)
                }
            }
        }

        let mut seen = HashSet::new();
        walk(self, &mut seen)?;

        if !seen.contains(&None) {
            return Err(Error::malformed("no end-of-message leaf"));
        }

        Ok(())
    }
}

/// Maps every symbol of a tree (bytes and the sentinel) to its bit path,
/// `false` for left and `true` for right.
#[derive(Debug, Clone, Default)]
pub struct EncodingTable {
    paths: HashMap<Option<u8>, BitBox>,
}

impl EncodingTable {
    pub fn get(&self, symbol: Option<u8>) -> Option<&BitSlice> {
        self.paths.get(&symbol).map(|path| path.as_bitslice())
    }

    pub fn end_of_message(&self) -> Option<&BitSlice> {
        self.get(None)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<u8>, &BitSlice)> {
        self.paths.iter().map(|(k, v)| (*k, v.as_bitslice()))
    }
}

/// Flattens `tree` into a symbol to bit-path table.
///
/// A tree that is a single leaf maps that leaf to the empty path.
pub fn make_encoding_table(tree: &Tree) -> EncodingTable {
    fn traverse(node: &Tree, v: &mut BitVec, paths: &mut HashMap<Option<u8>, BitBox>) {
        match node {
            Tree::Leaf(value) => {
                paths.insert(*value, v.clone().into_boxed_bitslice());
            }
            Tree::Branch { left, right } => {
                v.push(false);
                traverse(left, v, paths);
                v.pop();

                v.push(true);
                traverse(right, v, paths);
                v.pop();
            }
        }
    }

    let mut bv = BitVec::new();
    let mut paths = HashMap::new();
    traverse(tree, &mut bv, &mut paths);

    EncodingTable { paths }
}
