use derivative::Derivative;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use total_float_wrap::TotalF64;
use tracing::trace;

use crate::tree::Tree;

/// Heap entry for the greedy merge. Ordered by probability, then by creation
/// order so equal weights merge deterministically.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
struct Node {
    probability: TotalF64,

    seq: usize,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    tree: Tree,
}

impl Node {
    fn new(symbol: Option<u8>, p: f64, seq: usize) -> Self {
        Self {
            probability: TotalF64(p),
            seq,
            tree: Tree::Leaf(symbol),
        }
    }

    fn from_children(left: Node, right: Node, seq: usize) -> Self {
        Self {
            probability: TotalF64(left.probability.0 + right.probability.0),
            seq,
            tree: Tree::branch(left.tree, right.tree),
        }
    }
}

/// Builds a coding tree from per-byte counts. The end-of-message sentinel is
/// always added with a count of one.
pub fn from_frequencies(freq: &BTreeMap<u8, u64>) -> Tree {
    let total = freq.values().sum::<u64>() + 1;

    let leaves = freq
        .iter()
        .map(|(&s, &count)| (Some(s), count))
        .chain(std::iter::once((None, 1)));

    let mut seq = 0;
    let mut pq: BinaryHeap<_> = leaves
        .map(|(s, count)| {
            seq += 1;
            Reverse(Node::new(s, count as f64 / total as f64, seq))
        })
        .collect();

    while pq.len() > 1 {
        let (Some(Reverse(left)), Some(Reverse(right))) = (pq.pop(), pq.pop()) else {
            break;
        };
        seq += 1;
        pq.push(Reverse(Node::from_children(left, right, seq)));
    }

    let tree = pq
        .pop()
        .map(|r| r.0.tree)
        .unwrap_or_else(Tree::end_of_message);

    trace!(
        symbols = freq.len(),
        depth = tree.depth(),
        "built huffman tree"
    );

    tree
}

/// Counts `symbols` and builds their coding tree.
pub fn huffman(symbols: impl IntoIterator<Item = u8>) -> Tree {
    let mut freq: BTreeMap<u8, u64> = BTreeMap::new();
    for s in symbols {
        *freq.entry(s).or_default() += 1;
    }

    from_frequencies(&freq)
}

pub fn build_tree(input: &[u8]) -> Tree {
    huffman(input.iter().copied())
}
