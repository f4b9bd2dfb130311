//! PSL records, the flat exchange format between the aligners and this
//! crate. A PSL line becomes an [`AlignmentRecord`] (pseudogene input), an
//! [`EvidenceItem`] (EST evidence) or a [`Transcript`] (gene model).

use crate::libs::error::GarError;
use crate::libs::locus::{EvidenceBlock, EvidenceItem, Exon, Transcript};
use crate::libs::record::{AlignedBlock, AlignmentRecord, Strand, SupportFeature};

#[derive(Debug, Clone, Default)]
pub struct Psl {
    pub match_count: u32,
    pub mismatch_count: u32,
    pub rep_match: u32,
    pub n_count: u32,
    pub q_num_insert: u32,
    pub q_base_insert: i32,
    pub t_num_insert: u32,
    pub t_base_insert: i32,
    pub strand: String, // "+", "-", "++", "+-"
    pub q_name: String,
    pub q_size: u32,
    pub q_start: i32,
    pub q_end: i32,
    pub t_name: String,
    pub t_size: u32,
    pub t_start: i32,
    pub t_end: i32,
    pub block_count: u32,
    pub block_sizes: Vec<u32>,
    pub q_starts: Vec<u32>,
    pub t_starts: Vec<u32>,
}

impl Psl {
    pub fn calc_aligned(&self) -> u32 {
        self.match_count + self.mismatch_count + self.rep_match + self.n_count
    }

    pub fn calc_match(&self) -> u32 {
        self.match_count + self.rep_match
    }

    pub fn calc_ident(&self) -> f32 {
        let aligned = self.calc_aligned();
        if aligned == 0 {
            0.0
        } else {
            self.calc_match() as f32 / aligned as f32
        }
    }

    pub fn calc_q_cover(&self) -> f32 {
        if self.q_size == 0 {
            0.0
        } else {
            self.calc_aligned() as f32 / self.q_size as f32
        }
    }

    /// Orientation of the query on the forward target strand
    pub fn genomic_strand(&self) -> Strand {
        let q = Strand::from_symbol(&self.strand).unwrap_or(Strand::Forward);
        let t = Strand::from_symbol(self.strand.get(1..).unwrap_or("")).unwrap_or(Strand::Forward);
        q.relative(t)
    }

    /// Blocks as 1-based inclusive target spans paired with 1-based inclusive
    /// spans on the forward query strand
    fn block_spans(&self) -> Vec<((u64, u64), (u64, u64))> {
        let reverse = self.genomic_strand() == Strand::Reverse;
        (0..self.block_count as usize)
            .map(|i| {
                let size = self.block_sizes[i] as u64;
                let t_start = self.t_starts[i] as u64 + 1;
                let q_start = if reverse {
                    self.q_size as u64 - (self.q_starts[i] as u64 + size) + 1
                } else {
                    self.q_starts[i] as u64 + 1
                };
                ((t_start, t_start + size - 1), (q_start, q_start + size - 1))
            })
            .collect()
    }

    /// Each block carries the alignment-wide query coverage and identity as
    /// percentages
    pub fn to_alignment_record(&self) -> Result<AlignmentRecord, GarError> {
        let strand = self.genomic_strand();
        let score = self.calc_q_cover() as f64 * 100.0;
        let percent_id = self.calc_ident() as f64 * 100.0;

        let blocks = self
            .block_spans()
            .into_iter()
            .map(|((start, end), (hit_start, hit_end))| AlignedBlock {
                start,
                end,
                strand,
                support: SupportFeature {
                    score,
                    percent_id,
                    hit_start,
                    hit_end,
                },
            })
            .collect();

        AlignmentRecord::new(&self.q_name, &self.t_name, blocks)
    }

    pub fn to_evidence_item(&self) -> Result<EvidenceItem, GarError> {
        let strand = self.genomic_strand();
        let blocks = self
            .block_spans()
            .into_iter()
            .map(|((start, end), (hit_start, hit_end))| EvidenceBlock {
                start,
                end,
                strand,
                hit_start,
                hit_end,
            })
            .collect();

        EvidenceItem::new(
            &self.q_name,
            &self.t_name,
            self.calc_q_cover() as f64 * 100.0,
            blocks,
        )
    }

    /// An mRNA alignment read as a transcript model; each block is an exon
    pub fn to_transcript(&self, translatable: bool) -> Result<Transcript, GarError> {
        let strand = self.genomic_strand();
        let exons = self
            .block_spans()
            .into_iter()
            .map(|((start, end), _)| Exon::new(start, end, strand))
            .collect();

        Transcript::new(&self.q_name, &self.t_name, strand, exons, translatable)
    }
}

// one tab-separated column, parsed
fn column<T: std::str::FromStr>(fields: &[&str], idx: usize, name: &str) -> anyhow::Result<T> {
    fields[idx]
        .trim()
        .parse::<T>()
        .map_err(|_| {
            anyhow::anyhow!(
                "PSL column {} ({}) is not a number: {}",
                idx + 1,
                name,
                fields[idx]
            )
        })
}

// comma-separated block column, trailing comma allowed
fn block_column(fields: &[&str], idx: usize, name: &str) -> anyhow::Result<Vec<u32>> {
    fields[idx]
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<u32>().map_err(|_| {
                anyhow::anyhow!("PSL column {} ({}) has a bad value: {}", idx + 1, name, v)
            })
        })
        .collect()
}

impl std::str::FromStr for Psl {
    type Err = anyhow::Error;

    /// The 21 psLayout columns. Block arrays shorter than `blockCount`, and
    /// blocks running past either sequence end, are fatal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end().split('\t').collect();
        if fields.len() < 21 {
            return Err(anyhow::anyhow!(
                "PSL line with {} columns, 21 expected",
                fields.len()
            ));
        }

        let psl = Psl {
            match_count: column(&fields, 0, "matches")?,
            mismatch_count: column(&fields, 1, "misMatches")?,
            rep_match: column(&fields, 2, "repMatches")?,
            n_count: column(&fields, 3, "nCount")?,
            q_num_insert: column(&fields, 4, "qNumInsert")?,
            q_base_insert: column(&fields, 5, "qBaseInsert")?,
            t_num_insert: column(&fields, 6, "tNumInsert")?,
            t_base_insert: column(&fields, 7, "tBaseInsert")?,
            strand: fields[8].to_string(),
            q_name: fields[9].to_string(),
            q_size: column(&fields, 10, "qSize")?,
            q_start: column(&fields, 11, "qStart")?,
            q_end: column(&fields, 12, "qEnd")?,
            t_name: fields[13].to_string(),
            t_size: column(&fields, 14, "tSize")?,
            t_start: column(&fields, 15, "tStart")?,
            t_end: column(&fields, 16, "tEnd")?,
            block_count: column(&fields, 17, "blockCount")?,
            block_sizes: block_column(&fields, 18, "blockSizes")?,
            q_starts: block_column(&fields, 19, "qStarts")?,
            t_starts: block_column(&fields, 20, "tStarts")?,
        };

        let n = psl.block_count as usize;
        if psl.block_sizes.len() < n || psl.q_starts.len() < n || psl.t_starts.len() < n {
            return Err(anyhow::anyhow!(
                "{}: fewer block values than blockCount {}",
                psl.q_name,
                n
            ));
        }

        for i in 0..n {
            let size = psl.block_sizes[i] as u64;
            if psl.q_starts[i] as u64 + size > psl.q_size as u64 {
                return Err(anyhow::anyhow!(
                    "{}: block {} ends past qSize {}",
                    psl.q_name,
                    i + 1,
                    psl.q_size
                ));
            }
            if psl.t_starts[i] as u64 + size > psl.t_size as u64 {
                return Err(anyhow::anyhow!(
                    "{}: block {} ends past tSize {}",
                    psl.q_name,
                    i + 1,
                    psl.t_size
                ));
            }
        }

        Ok(psl)
    }
}

/// Reads every PSL line of a (possibly gzipped) file
pub fn read_psl(infile: &str) -> anyhow::Result<Vec<Psl>> {
    crate::libs::io::read_data_lines(infile)?
        .iter()
        // psLayout headers
        .filter(|line| line.split('\t').next().map_or(false, |f| f.parse::<u32>().is_ok()))
        .map(|line| line.parse::<Psl>())
        .collect()
}
