use bit_vec::BitVec;
use log::{trace, warn};

use crate::{
    error::{CodecError, Result},
    prefix_code_table::CodeTable,
};

/// Packed payload and the number of meaningful bits in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    pub bytes: Vec<u8>,
    pub encoded_size: usize,
}

/// Concatenates the code of every symbol of `content` and packs the bits
/// MSB-first, zero padding the last byte.
pub fn pack(content: &str, table: &CodeTable) -> Result<Packed> {
    let mut bits = BitVec::new();
    for ch in content.chars() {
        let code = table.get(ch).ok_or(CodecError::UnknownSymbol(ch))?;
        bits.extend(code.iter());
    }
    let encoded_size = bits.len();
    let bytes = bits.to_bytes();
    trace!("packed {encoded_size} bits into {} bytes", bytes.len());
    Ok(Packed {
        bytes,
        encoded_size,
    })
}

/// Reads `encoded_size` bits back out of `bytes`, failing when the buffer is too short.
pub fn unpack(bytes: &[u8], encoded_size: usize) -> Result<Bits<'_>> {
    let needed = encoded_size.div_ceil(8);
    if bytes.len() < needed {
        return Err(CodecError::TruncatedPayload(format!(
            "expected {needed} bytes to hold {encoded_size} bits but found {}",
            bytes.len()
        )));
    }
    if bytes.len() > needed {
        warn!(
            "ignoring {} trailing bytes after the payload",
            bytes.len() - needed
        );
    }
    Ok(Bits {
        bytes: &bytes[..needed],
        position: 0,
        len: encoded_size,
    })
}

/// Lazy MSB-first view over a packed buffer. Clone it to start over.
#[derive(Debug, Clone)]
pub struct Bits<'a> {
    bytes: &'a [u8],
    position: usize,
    len: usize,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.len {
            return None;
        }
        let byte = self.bytes[self.position / 8];
        let bit = byte & (0x80 >> (self.position % 8)) != 0;
        self.position += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Bits<'_> {}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{pack, unpack};
    use crate::{error::CodecError, prefix_code_table::generate_codes};

    #[test]
    fn test_packing_is_msb_first_and_padded() {
        let table = generate_codes("aaab");
        let packed = pack("aaab", &table).unwrap();
        assert_eq!(packed.encoded_size, 4);
        assert_eq!(packed.bytes.len(), 1);
        // b is the lighter symbol so it takes the left branch
        assert_eq!(packed.bytes, vec![0b1110_0000]);
    }

    #[test]
    fn test_pack_empty() {
        let packed = pack("", &generate_codes("")).unwrap();
        assert_eq!(packed.encoded_size, 0);
        assert!(packed.bytes.is_empty());
    }

    #[test]
    fn test_pack_unknown_symbol() {
        let err = pack("ab", &generate_codes("a")).unwrap_err();
        assert!(matches!(err, CodecError::UnknownSymbol('b')));
    }

    #[rstest]
    #[case(&[0b1010_0000], 3, vec![true, false, true])]
    #[case(&[0b1111_1111, 0b0000_0001], 16, [vec![true; 8], vec![false; 7], vec![true]].concat())]
    #[case(&[0b1000_0001], 1, vec![true])]
    #[case(&[], 0, vec![])]
    fn test_unpack_stops_at_encoded_size(
        #[case] bytes: &[u8],
        #[case] size: usize,
        #[case] expected: Vec<bool>,
    ) {
        let bits = unpack(bytes, size).unwrap();
        assert_eq!(bits.len(), size);
        assert_eq!(bits.collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_unpack_is_restartable() {
        let bits = unpack(&[0b0110_0000], 4).unwrap();
        let first = bits.clone().collect::<Vec<_>>();
        let second = bits.collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unpack_rejects_short_buffer() {
        let err = unpack(&[0xff], 9).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedPayload(_)));
    }
}
