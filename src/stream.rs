use bitstream_io::{BigEndian, BitReader, BitWrite, BitWriter};
use bitvec::slice::BitSlice;
use std::io::{BufReader, BufWriter, Read, Write};
use tracing::debug;

use crate::build::build_tree;
use crate::codec::{decode_symbol, read_tree, write_tree};
use crate::error::{Error, Result};
use crate::tree::{make_encoding_table, Tree};

/// Bit counts for one `compress` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressStats {
    pub input_bytes: u64,
    pub tree_bits: u64,
    /// Symbol paths including the end-of-message path.
    pub payload_bits: u64,
    pub padding_bits: u32,
}

impl CompressStats {
    pub fn output_bytes(&self) -> u64 {
        (self.tree_bits + self.payload_bits + self.padding_bits as u64) / 8
    }
}

/// Writes the description of `tree` followed by every byte of `input` coded
/// with it, the end-of-message code and zero padding to a byte boundary.
///
/// `output` is flushed once, after everything is written. On error the
/// contents of `output` are unspecified.
pub fn compress<R: Read, W: Write>(tree: &Tree, input: R, output: W) -> Result<CompressStats> {
    tree.validate()?;
    let table = make_encoding_table(tree);
    // unreachable after validate()
    let end = table
        .end_of_message()
        .ok_or_else(|| Error::malformed("no end-of-message leaf"))?;

    let mut out = BufWriter::new(output);
    let mut writer = BitWriter::endian(&mut out, BigEndian);

    write_tree(tree, &mut writer)?;

    let mut stats = CompressStats {
        tree_bits: tree.description_bits(),
        ..Default::default()
    };

    for byte in BufReader::new(input).bytes() {
        let byte = byte?;
        let path = table
            .get(Some(byte))
            .ok_or(Error::EncodingError { byte })?;
        write_path(&mut writer, path)?;
        stats.input_bytes += 1;
        stats.payload_bits += path.len() as u64;
    }

    write_path(&mut writer, end)?;
    stats.payload_bits += end.len() as u64;

    stats.padding_bits = ((8 - (stats.tree_bits + stats.payload_bits) % 8) % 8) as u32;
    if stats.padding_bits > 0 {
        writer.write(stats.padding_bits, 0u8)?;
    }
    debug_assert!(writer.byte_aligned());

    drop(writer);
    out.flush()?;

    debug!(
        input_bytes = stats.input_bytes,
        tree_bits = stats.tree_bits,
        payload_bits = stats.payload_bits,
        padding_bits = stats.padding_bits,
        "compressed"
    );

    Ok(stats)
}

/// Reads a tree description from `input` and decodes symbols with it into
/// `output` until the end-of-message code. Returns the number of bytes
/// written.
pub fn decompress<R: Read, W: Write>(input: R, output: W) -> Result<u64> {
    let mut reader = BitReader::endian(BufReader::new(input), BigEndian);
    let tree = read_tree(&mut reader)?;
    tree.validate()?;

    let mut out = BufWriter::new(output);
    let mut written = 0u64;
    while let Some(byte) = decode_symbol(&tree, &mut reader)? {
        out.write_all(&[byte])?;
        written += 1;
    }
    out.flush()?;

    debug!(
        output_bytes = written,
        leaves = tree.leaf_count(),
        depth = tree.depth(),
        "decompressed"
    );

    Ok(written)
}

/// Compresses `input` with a tree built from its own byte frequencies.
pub fn compress_bytes(input: &[u8]) -> Result<Vec<u8>> {
    let tree = build_tree(input);
    let mut out = Vec::new();
    compress(&tree, input, &mut out)?;
    Ok(out)
}

pub fn decompress_bytes(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(input, &mut out)?;
    Ok(out)
}

fn write_path<W: BitWrite + ?Sized>(writer: &mut W, path: &BitSlice) -> Result<()> {
    for bit in path.iter().by_vals() {
        writer.write_bit(bit)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream_io::BitRead;

    // A = 011, B = 00, C = 010, EOM = 1
    fn sample() -> Tree {
        Tree::branch(
            Tree::branch(Tree::leaf(b'B'), Tree::branch(Tree::leaf(b'C'), Tree::leaf(b'A'))),
            Tree::end_of_message(),
        )
    }

    #[test]
    fn test_encode_decode() {
        let s = String::from(
            "This is a really long message, I sure do hope it encodes and decodes properly.",
        );
        let compressed = compress_bytes(s.as_bytes()).unwrap();
        let dec = String::from_utf8(decompress_bytes(&compressed).unwrap()).unwrap();

        assert_eq!(dec, s);
    }

    #[test]
    fn roundtrip_with_given_tree() {
        let input = b"ABBACAB";
        let mut out = Vec::new();
        compress(&sample(), &input[..], &mut out).unwrap();

        let mut restored = Vec::new();
        let n = decompress(&out[..], &mut restored).unwrap();
        assert_eq!(n, input.len() as u64);
        assert_eq!(restored, input);
    }

    #[test]
    fn roundtrip_all_byte_values() {
        let input: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let compressed = compress_bytes(&input).unwrap();
        assert_eq!(decompress_bytes(&compressed).unwrap(), input);
    }

    #[test]
    fn single_symbol_payload() {
        let mut out = Vec::new();
        let stats = compress(&sample(), &b"A"[..], &mut out).unwrap();

        assert_eq!(stats.tree_bits, 35);
        assert_eq!(stats.payload_bits, 4);
        assert_eq!(stats.padding_bits, 1);
        assert_eq!(out.len(), 5);

        let mut reader = BitReader::endian(&out[..], BigEndian);
        assert_eq!(read_tree(&mut reader).unwrap(), sample());
        assert_eq!(reader.read::<u8>(4).unwrap(), 0b0111);
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn padding_is_zero_and_aligned() {
        let inputs: [&[u8]; 5] = [b"", b"a", b"ab", b"hello world", b"zzzzzzzzzzzzzzzzzzzzzzzzzzzzzy"];

        for input in inputs {
            let tree = build_tree(input);
            let mut out = Vec::new();
            let stats = compress(&tree, input, &mut out).unwrap();

            assert!(stats.padding_bits < 8);
            assert_eq!((stats.tree_bits + stats.payload_bits + stats.padding_bits as u64) % 8, 0);
            assert_eq!(out.len() as u64, stats.output_bytes());

            let mut reader = BitReader::endian(&out[..], BigEndian);
            for _ in 0..stats.tree_bits + stats.payload_bits {
                reader.read_bit().unwrap();
            }
            for _ in 0..stats.padding_bits {
                assert!(!reader.read_bit().unwrap());
            }
        }
    }

    #[test]
    fn degenerate_tree_empty_input() {
        let mut out = Vec::new();
        let stats = compress(&Tree::end_of_message(), &b""[..], &mut out).unwrap();

        assert_eq!(stats.payload_bits, 0);
        assert_eq!(stats.padding_bits, 6);
        assert_eq!(out, vec![0]);
        assert!(decompress_bytes(&out).unwrap().is_empty());
    }

    #[test]
    fn deepest_valid_tree_roundtrip() {
        let tree = (0..255u8).rev().fold(
            Tree::branch(Tree::leaf(255), Tree::end_of_message()),
            |rest, b| Tree::branch(Tree::leaf(b), rest),
        );
        assert_eq!(tree.depth(), crate::MAX_TREE_DEPTH);

        let input: Vec<u8> = (0..=255u8).chain(0..=255u8).collect();
        let mut out = Vec::new();
        compress(&tree, &input[..], &mut out).unwrap();

        assert_eq!(decompress_bytes(&out).unwrap(), input);
    }

    #[test]
    fn padding_after_sentinel_is_ignored() {
        let mut out = compress_bytes(b"abc").unwrap();
        out.push(0xff);
        assert_eq!(decompress_bytes(&out).unwrap(), b"abc");
    }

    #[test]
    fn byte_missing_from_tree() {
        let mut out = Vec::new();
        let err = compress(&sample(), &b"ABZ"[..], &mut out).unwrap_err();
        assert!(matches!(err, Error::EncodingError { byte: b'Z' }), "{err:?}");
    }

    #[test]
    fn tree_without_sentinel_is_rejected() {
        let tree = Tree::branch(Tree::leaf(b'a'), Tree::leaf(b'b'));
        let mut out = Vec::new();
        let err = compress(&tree, &b"ab"[..], &mut out).unwrap_err();
        assert!(matches!(err, Error::MalformedTree { .. }), "{err:?}");

        // lone byte leaf: 01 01100001 then padding
        let err = decompress_bytes(&[0b0101_1000, 0b0100_0000]).unwrap_err();
        assert!(matches!(err, Error::MalformedTree { .. }), "{err:?}");
    }

    #[test]
    fn truncated_tree_description() {
        let out = compress_bytes(b"the quick brown fox").unwrap();
        let err = decompress_bytes(&out[..3]).unwrap_err();
        assert!(matches!(err, Error::StreamTruncated { context: "tree" }), "{err:?}");
    }

    #[test]
    fn truncated_payload() {
        let input = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let tree = build_tree(&input);
        let mut out = Vec::new();
        let stats = compress(&tree, &input[..], &mut out).unwrap();

        // cut well past the tree but before the sentinel
        let cut = (stats.tree_bits / 8 + 4) as usize;
        assert!(cut < out.len() - 1);
        let err = decompress_bytes(&out[..cut]).unwrap_err();
        assert!(matches!(err, Error::StreamTruncated { context: "payload" }), "{err:?}");
    }

    #[test]
    fn empty_input_compresses_to_small_output() {
        let out = compress_bytes(b"").unwrap();
        assert_eq!(out, vec![0]);
        assert_eq!(decompress_bytes(&out).unwrap(), b"");
    }
}
