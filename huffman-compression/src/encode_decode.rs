use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;

use crate::{
    bits,
    decoder::Decoder,
    error::Result,
    frequency,
    header::Header,
    prefix_code_table::CodeTable,
    tree::Tree,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    pub input_bytes: usize,
    pub distinct_symbols: usize,
    pub encoded_bits: usize,
    pub header_bytes: usize,
    pub payload_bytes: usize,
}

impl EncodeSummary {
    pub fn output_bytes(&self) -> usize {
        self.header_bytes + self.payload_bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    pub symbols: usize,
    pub encoded_bits: usize,
}

/// Writes the header followed by the packed payload for `content` to `writer`.
pub fn encode<W: Write>(content: &str, writer: &mut W) -> Result<EncodeSummary> {
    let frequencies = frequency::count(content);
    let table = CodeTable::from_tree(&Tree::build(&frequencies));
    let packed = bits::pack(content, &table)?;
    debug_assert_eq!(packed.encoded_size, table.encoded_size(&frequencies));

    let header = Header {
        table,
        encoded_size: packed.encoded_size,
    };
    let mut header_bytes = Vec::new();
    header.serialize(&mut header_bytes)?;

    writer.write_all(&header_bytes)?;
    writer.write_all(&packed.bytes)?;

    let summary = EncodeSummary {
        input_bytes: content.len(),
        distinct_symbols: frequencies.len(),
        encoded_bits: packed.encoded_size,
        header_bytes: header_bytes.len(),
        payload_bytes: packed.bytes.len(),
    };
    debug!("{summary:?}");
    Ok(summary)
}

/// Reverses [`encode`], writing the original content to `writer`.
pub fn decode<W: Write>(compressed: &[u8], writer: &mut W) -> Result<DecodeSummary> {
    let (header, payload_offset) = Header::parse(compressed)?;
    let bits = bits::unpack(&compressed[payload_offset..], header.encoded_size)?;
    let symbols = Decoder::new(&header.table).decode(bits, writer)?;

    Ok(DecodeSummary {
        symbols,
        encoded_bits: header.encoded_size,
    })
}

pub fn encode_file(
    input_file: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
) -> Result<EncodeSummary> {
    let content = fs::read_to_string(input_file.as_ref())?;
    let mut writer = BufWriter::new(File::create(output_file.as_ref())?);
    let summary = encode(&content, &mut writer)?;
    writer.flush()?;
    Ok(summary)
}

pub fn decode_file(
    input_file: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
) -> Result<DecodeSummary> {
    let compressed = fs::read(input_file.as_ref())?;
    let mut writer = BufWriter::new(File::create(output_file.as_ref())?);
    let summary = decode(&compressed, &mut writer)?;
    writer.flush()?;
    Ok(summary)
}

/// Compresses `input_file` into `encoded_file` and decompresses that into `output_file`.
pub fn encode_and_decode(
    input_file: impl AsRef<Path>,
    encoded_file: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
) -> Result<(EncodeSummary, DecodeSummary)> {
    let encoded = encode_file(input_file, encoded_file.as_ref())?;
    let decoded = decode_file(encoded_file, output_file)?;
    Ok((encoded, decoded))
}
