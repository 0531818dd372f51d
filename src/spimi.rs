use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::IndexError;

/// Default cap on `(doc_id, term)` pairs held in memory before a block is
/// flushed to disk. See §4.2.
pub const MAX_LINES_TO_HOLD_IN_MEM: usize = 100_000;

/// SPIMI (Single-Pass In-Memory Indexing) block writer.
///
/// Buffers `term -> doc-id list` in RAM up to `memory_limit` accepted pairs,
/// then flushes a sorted block file under `blocks_dir` and starts over.
pub struct SpimiIndexer {
    blocks_dir: PathBuf,
    memory_limit: usize,
    postings: HashMap<String, Vec<u32>>,
    pairs_in_mem: usize,
    block_count: usize,
}

impl SpimiIndexer {
    pub fn new<P: AsRef<Path>>(blocks_dir: P) -> Result<Self, IndexError> {
        Self::with_memory_limit(blocks_dir, MAX_LINES_TO_HOLD_IN_MEM)
    }

    pub fn with_memory_limit<P: AsRef<Path>>(
        blocks_dir: P,
        memory_limit: usize,
    ) -> Result<Self, IndexError> {
        let blocks_dir = blocks_dir.as_ref().to_path_buf();
        if blocks_dir.exists() {
            fs::remove_dir_all(&blocks_dir)?;
        }
        fs::create_dir_all(&blocks_dir)?;

        Ok(SpimiIndexer {
            blocks_dir,
            memory_limit: memory_limit.max(1),
            postings: HashMap::new(),
            pairs_in_mem: 0,
            block_count: 0,
        })
    }

    /// Accepts one normalized `(doc_id, term)` pair, flushing a block first
    /// if the memory cap has already been reached.
    ///
    /// `doc_id` must be non-decreasing across calls so that postings stay
    /// strictly ascending without an explicit sort at flush time.
    pub fn add_term(&mut self, doc_id: u32, term: String) -> Result<(), IndexError> {
        if self.pairs_in_mem >= self.memory_limit {
            self.flush()?;
        }

        let docs = self.postings.entry(term).or_insert_with(Vec::new);
        if docs.last() != Some(&doc_id) {
            docs.push(doc_id);
        }
        self.pairs_in_mem += 1;

        Ok(())
    }

    /// Flushes any remaining buffered pairs and returns the number of block
    /// files written in total.
    pub fn finalize(mut self) -> Result<usize, IndexError> {
        if !self.postings.is_empty() {
            self.flush()?;
        }
        Ok(self.block_count)
    }

    fn flush(&mut self) -> Result<(), IndexError> {
        let block_path = self.blocks_dir.join(self.block_count.to_string());
        let file = File::create(&block_path)?;
        let mut writer = BufWriter::new(file);

        let mut terms: Vec<&String> = self.postings.keys().collect();
        terms.sort();

        for term in terms {
            let doc_ids = &self.postings[term];
            write!(writer, "{}", term)?;
            for doc_id in doc_ids {
                write!(writer, " {}", doc_id)?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;

        self.postings.clear();
        self.pairs_in_mem = 0;
        self.block_count += 1;

        Ok(())
    }
}
