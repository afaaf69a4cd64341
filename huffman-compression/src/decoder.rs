use std::{collections::HashMap, io::Write};

use bit_vec::BitVec;
use log::trace;

use crate::{
    bits::Bits,
    error::{CodecError, Result},
    prefix_code_table::{code_to_string, CodeTable},
};

/// Online prefix matcher: accumulates bits until they spell a known code.
pub struct Decoder {
    symbols: HashMap<BitVec, char>,
    longest_code: usize,
}

impl Decoder {
    pub fn new(table: &CodeTable) -> Self {
        let longest_code = table.iter().map(|(_, code)| code.len()).max().unwrap_or(0);
        Self {
            symbols: table.inverse(),
            longest_code,
        }
    }

    /// Writes every decoded symbol to `writer` and returns how many were decoded.
    pub fn decode<W: Write>(&self, bits: Bits<'_>, writer: &mut W) -> Result<usize> {
        let mut accumulator = BitVec::new();
        let mut decoded = 0;
        let mut buf = [0; 4];

        for bit in bits {
            accumulator.push(bit);
            if let Some(&ch) = self.symbols.get(&accumulator) {
                writer.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
                accumulator = BitVec::new();
                decoded += 1;
            } else if accumulator.len() >= self.longest_code {
                return Err(CodecError::TruncatedPayload(format!(
                    "bits {} after {decoded} symbols match no code",
                    code_to_string(&accumulator)
                )));
            }
        }

        if !accumulator.is_empty() {
            return Err(CodecError::TruncatedPayload(format!(
                "payload ends inside a code, {} leftover bits",
                accumulator.len()
            )));
        }
        trace!("decoded {decoded} symbols");
        Ok(decoded)
    }
}
