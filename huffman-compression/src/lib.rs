//! Whole-file Huffman compression of UTF-8 text.
//!
//! Encoding counts symbol frequencies, builds a prefix tree by repeatedly
//! merging the two lightest nodes, derives one bit code per symbol and writes a
//! textual header (the code table and the number of payload bits) followed by
//! the packed payload. Decoding parses the header and matches payload bits
//! against the table until exactly the declared number of bits is consumed.

pub mod bits;
pub mod decoder;
pub mod encode_decode;
pub mod error;
pub mod frequency;
pub mod header;
pub mod prefix_code_table;
pub mod tree;

pub use encode_decode::{decode, encode};
pub use error::{CodecError, Result};
