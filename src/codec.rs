//! Bit-level tree description and symbol decoding.
//!
//! The tree is written pre-order:
//!
//! ```text
//! Branch           ::= '1' Tree Tree
//! Leaf-with-symbol ::= '0' '1' <8 bits, MSB first>
//! Leaf-sentinel    ::= '0' '0'
//! ```
//!
//! Bit order follows the stream's endianness; the crate always uses
//! `bitstream_io::BigEndian`.

use bitstream_io::{BitRead, BitWrite};

use crate::error::{Error, Result};
use crate::tree::{Tree, MAX_TREE_DEPTH, MAX_TREE_LEAVES};

/// Writes the description of `tree`. The writer is not flushed or aligned.
pub fn write_tree<W: BitWrite + ?Sized>(tree: &Tree, writer: &mut W) -> Result<()> {
    match tree {
        Tree::Branch { left, right } => {
            writer.write_bit(true)?;
            write_tree(left, writer)?;
            write_tree(right, writer)?;
        }
        Tree::Leaf(Some(byte)) => {
            writer.write_bit(false)?;
            writer.write_bit(true)?;
            writer.write(8, *byte)?;
        }
        Tree::Leaf(None) => {
            writer.write_bit(false)?;
            writer.write_bit(false)?;
        }
    }

    Ok(())
}

/// Reads a tree description, leaving `reader` on the first bit after it.
pub fn read_tree<R: BitRead + ?Sized>(reader: &mut R) -> Result<Tree> {
    fn read_node<R: BitRead + ?Sized>(
        reader: &mut R,
        depth: usize,
        leaves: &mut usize,
    ) -> Result<Tree> {
        if read_bit(reader, "tree")? {
            if depth >= MAX_TREE_DEPTH {
                return Err(Error::malformed(format!(
                    "branches nested deeper than {MAX_TREE_DEPTH}"
                )));
            }
            let left = read_node(reader, depth + 1, leaves)?;
            let right = read_node(reader, depth + 1, leaves)?;
            return Ok(Tree::branch(left, right));
        }

        *leaves += 1;
        if *leaves > MAX_TREE_LEAVES {
            return Err(Error::malformed(format!(
                "more than {MAX_TREE_LEAVES} leaves"
            )));
        }

        if read_bit(reader, "tree")? {
            let byte = reader
                .read::<u8>(8)
                .map_err(|e| Error::from_read(e, "tree"))?;
            Ok(Tree::leaf(byte))
        } else {
            Ok(Tree::end_of_message())
        }
    }

    let mut leaves = 0;
    read_node(reader, 0, &mut leaves)
}

/// Walks `tree` from the root, consuming one bit per branch, and returns the
/// leaf reached. `None` is the end-of-message sentinel.
pub fn decode_symbol<R: BitRead + ?Sized>(tree: &Tree, reader: &mut R) -> Result<Option<u8>> {
    let mut node = tree;
    loop {
        match node {
            Tree::Leaf(value) => return Ok(*value),
            Tree::Branch { left, right } => {
                node = if read_bit(reader, "payload")? { right } else { left };
            }
        }
    }
}

fn read_bit<R: BitRead + ?Sized>(reader: &mut R, context: &'static str) -> Result<bool> {
    reader.read_bit().map_err(|e| Error::from_read(e, context))
}
