//! Byte-oriented Huffman compression with a self-describing bit stream.
//!
//! A compressed stream is the pre-order description of the coding tree,
//! followed by the code of every input byte, the end-of-message code and zero
//! padding to a byte boundary. All multi-bit fields are MSB first.
//!
//! ```
//! let packed = huffcode::compress_bytes(b"abracadabra").unwrap();
//! assert_eq!(huffcode::decompress_bytes(&packed).unwrap(), b"abracadabra");
//! ```

pub mod build;
pub mod codec;
pub mod error;
pub mod stream;
pub mod tree;

pub use build::{build_tree, from_frequencies, huffman};
pub use codec::{decode_symbol, read_tree, write_tree};
pub use error::{Error, Result};
pub use stream::{compress, compress_bytes, decompress, decompress_bytes, CompressStats};
pub use tree::{make_encoding_table, EncodingTable, Tree, MAX_TREE_DEPTH, MAX_TREE_LEAVES};
