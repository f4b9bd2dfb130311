//! Random access to UCSC .2bit genomes, used as a [`SequenceSlicer`].

use crate::libs::seq::SequenceSlicer;
use anyhow::{anyhow, Context, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

const TWOBIT_MAGIC: u32 = 0x1A412743;
const TWOBIT_MAGIC_SWAPPED: u32 = 0x4327411A;

#[derive(Debug)]
pub struct TwoBitFile<R> {
    reader: RefCell<R>,
    sequence_offsets: HashMap<String, u64>,
    is_swapped: bool,
}

impl TwoBitFile<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("could not open {}", path.display()))?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> TwoBitFile<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        let magic = u32::from_ne_bytes(buf);

        let is_swapped = if magic == TWOBIT_MAGIC {
            false
        } else if magic == TWOBIT_MAGIC_SWAPPED {
            true
        } else {
            return Err(anyhow!("Not a valid 2bit file (magic: {:x})", magic));
        };

        // version 1 only widens the index offsets to 64 bits
        let version = read_u32(&mut reader, is_swapped)?;
        if version > 1 {
            return Err(anyhow!("Unsupported 2bit version: {}", version));
        }

        let seq_count = read_u32(&mut reader, is_swapped)?;
        let _reserved = read_u32(&mut reader, is_swapped)?;

        let mut sequence_offsets = HashMap::new();
        for _ in 0..seq_count {
            let mut len_buf = [0u8; 1];
            reader.read_exact(&mut len_buf)?;
            let mut name_buf = vec![0u8; len_buf[0] as usize];
            reader.read_exact(&mut name_buf)?;
            let name = String::from_utf8(name_buf)?;

            let offset = if version == 1 {
                read_u64(&mut reader, is_swapped)?
            } else {
                read_u32(&mut reader, is_swapped)? as u64
            };
            sequence_offsets.insert(name, offset);
        }

        Ok(Self {
            reader: RefCell::new(reader),
            sequence_offsets,
            is_swapped,
        })
    }

    pub fn sequence_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sequence_offsets.keys().cloned().collect();
        names.sort();
        names
    }

    /// Reads `[start, end)` (0-based) of a sequence. N blocks are applied,
    /// soft masking is not. `None` for an unknown name or a range past the end.
    pub fn read_range(&self, name: &str, range: Range<usize>) -> Result<Option<Vec<u8>>> {
        let offset = match self.sequence_offsets.get(name) {
            Some(offset) => *offset,
            None => return Ok(None),
        };

        let mut reader = self.reader.borrow_mut();
        reader.seek(SeekFrom::Start(offset))?;

        let dna_size = read_u32(&mut *reader, self.is_swapped)? as usize;
        if range.start >= range.end || range.end > dna_size {
            return Ok(None);
        }

        let n_blocks = read_blocks(&mut *reader, self.is_swapped)?;
        let _mask_blocks = read_blocks(&mut *reader, self.is_swapped)?;
        let _reserved = read_u32(&mut *reader, self.is_swapped)?;

        let packed_dna_start = reader.stream_position()?;

        // 4 bases per byte
        let first_byte_idx = range.start / 4;
        let last_byte_idx = (range.end - 1) / 4;
        reader.seek(SeekFrom::Start(packed_dna_start + first_byte_idx as u64))?;
        let mut packed_buf = vec![0u8; last_byte_idx - first_byte_idx + 1];
        reader.read_exact(&mut packed_buf)?;

        let table = [b'T', b'C', b'A', b'G'];
        let mut seq = Vec::with_capacity(range.len());
        for i in range.clone() {
            let byte = packed_buf[i / 4 - first_byte_idx];
            let bit_offset = 6 - 2 * (i % 4);
            seq.push(table[((byte >> bit_offset) & 3) as usize]);
        }

        for block in n_blocks.iter() {
            let s = block.start.max(range.start);
            let e = block.end.min(range.end);
            if s < e {
                seq[s - range.start..e - range.start].fill(b'N');
            }
        }

        Ok(Some(seq))
    }
}

impl<R: Read + Seek> SequenceSlicer for TwoBitFile<R> {
    fn slice(&self, region: &str, start: u64, end: u64) -> Result<Option<String>> {
        if start == 0 || start > end {
            return Ok(None);
        }
        let bytes = self.read_range(region, (start - 1) as usize..end as usize)?;
        Ok(bytes.map(|b| String::from_utf8_lossy(&b).to_string()))
    }
}

fn read_blocks<R: Read>(reader: &mut R, is_swapped: bool) -> Result<Vec<Range<usize>>> {
    let count = read_u32(reader, is_swapped)? as usize;
    let mut starts = Vec::with_capacity(count);
    for _ in 0..count {
        starts.push(read_u32(reader, is_swapped)? as usize);
    }
    let mut blocks = Vec::with_capacity(count);
    for start in starts {
        let size = read_u32(reader, is_swapped)? as usize;
        blocks.push(start..start + size);
    }
    Ok(blocks)
}

fn read_u32<R: Read>(reader: &mut R, is_swapped: bool) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    let val = u32::from_ne_bytes(buf);
    if is_swapped {
        Ok(val.swap_bytes())
    } else {
        Ok(val)
    }
}

fn read_u64<R: Read>(reader: &mut R, is_swapped: bool) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    let val = u64::from_ne_bytes(buf);
    if is_swapped {
        Ok(val.swap_bytes())
    } else {
        Ok(val)
    }
}
