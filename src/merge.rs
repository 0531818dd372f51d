use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::IndexError;
use crate::spimi::MAX_LINES_TO_HOLD_IN_MEM;
use crate::universe::Universe;

/// One line read from a block file: a term and its (already deduped,
/// ascending) doc-ids within that block.
struct BlockEntry {
    term: String,
    doc_ids: Vec<u32>,
}

/// A single open block reader plus how many already-queued lines remain
/// before it needs refilling.
struct BlockSource {
    reader: BufReader<File>,
    lines_in_queue: usize,
    exhausted: bool,
}

/// Queue item ordered by `(term, block_idx)` so ties between blocks break
/// deterministically rather than by hash order.
struct HeapItem {
    key: (String, usize),
    entry: BlockEntry,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for HeapItem {}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap; invert via Reverse to get min-term-first.
        Reverse(&self.key).cmp(&Reverse(&other.key))
    }
}

fn parse_block_line(line: &str) -> Option<BlockEntry> {
    let mut fields = line.split_whitespace();
    let term = fields.next()?.to_string();
    let doc_ids: Vec<u32> = fields.filter_map(|f| f.parse().ok()).collect();
    if doc_ids.is_empty() {
        return None;
    }
    Some(BlockEntry { term, doc_ids })
}

fn refill(
    sources: &mut [BlockSource],
    heap: &mut BinaryHeap<HeapItem>,
    block_idx: usize,
    per_block_batch: usize,
) -> Result<(), IndexError> {
    let source = &mut sources[block_idx];
    if source.exhausted {
        return Ok(());
    }
    let mut line = String::new();
    for _ in 0..per_block_batch {
        line.clear();
        let bytes_read = source.reader.read_line(&mut line)?;
        if bytes_read == 0 {
            source.exhausted = true;
            break;
        }
        let trimmed = line.trim_end_matches('\n');
        if let Some(entry) = parse_block_line(trimmed) {
            let key = (entry.term.clone(), block_idx);
            heap.push(HeapItem { key, entry });
            source.lines_in_queue += 1;
        }
    }
    Ok(())
}

/// Builds the skip-augmented text form for a posting list, per §3/§4.3.
fn encode_postings(doc_ids: &[u32]) -> String {
    let n = doc_ids.len();
    let j = (n as f64).sqrt().ceil() as usize;
    let j = j.max(1);

    let mut parts = Vec::with_capacity(n);
    for (i, doc_id) in doc_ids.iter().enumerate() {
        if i % j == 0 && i + j < n {
            parts.push(format!("{};{}", doc_id, doc_ids[i + j]));
        } else {
            parts.push(doc_id.to_string());
        }
    }
    parts.join(" ")
}

/// Merges `block_count` block files under `blocks_dir` into a final
/// dictionary + postings file pair, plus a frequency-sorted dictionary and
/// the doc-id universe.
///
/// Truncates `dict_path` and `postings_path` before writing.
pub fn merge_blocks<P: AsRef<Path>>(
    blocks_dir: P,
    block_count: usize,
    dict_path: P,
    postings_path: P,
    freq_dict_path: P,
    universe: &Universe,
    universe_path: P,
) -> Result<(), IndexError> {
    let dict_file = File::create(dict_path.as_ref())?;
    let postings_file = File::create(postings_path.as_ref())?;
    let mut dict_writer = BufWriter::new(dict_file);
    let mut postings_writer = BufWriter::new(postings_file);

    universe.save(universe_path)?;

    if block_count == 0 {
        dict_writer.flush()?;
        postings_writer.flush()?;
        File::create(freq_dict_path.as_ref())?;
        return Ok(());
    }

    let per_block_batch = (MAX_LINES_TO_HOLD_IN_MEM / block_count).max(1);

    let mut sources: Vec<BlockSource> = Vec::with_capacity(block_count);
    for i in 0..block_count {
        let path = blocks_dir.as_ref().join(i.to_string());
        let file = File::open(&path)?;
        sources.push(BlockSource {
            reader: BufReader::new(file),
            lines_in_queue: 0,
            exhausted: false,
        });
    }

    let mut heap: BinaryHeap<HeapItem> = BinaryHeap::new();
    for block_idx in 0..block_count {
        refill(&mut sources, &mut heap, block_idx, per_block_batch)?;
    }

    let mut offset: u64 = 0;
    let mut dict_buffer: Vec<(String, usize, u64)> = Vec::new();
    let mut postings_buffer = String::new();
    let mut freq_entries: Vec<(String, usize)> = Vec::new();

    let mut current_term: Option<String> = None;
    let mut accumulator: Vec<u32> = Vec::new();

    let mut emit = |term: &str,
                    doc_ids: &[u32],
                    offset: &mut u64,
                    dict_buffer: &mut Vec<(String, usize, u64)>,
                    postings_buffer: &mut String,
                    freq_entries: &mut Vec<(String, usize)>| {
        let offset_before = *offset;
        let line = format!("{} {}\n", term, encode_postings(doc_ids));
        *offset += line.len() as u64;
        postings_buffer.push_str(&line);
        dict_buffer.push((term.to_string(), doc_ids.len(), offset_before));
        freq_entries.push((term.to_string(), doc_ids.len()));
    };

    while let Some(HeapItem { key, entry }) = heap.pop() {
        let (term, block_idx) = key;

        if let Some(ref cur) = current_term {
            if *cur != term {
                emit(
                    cur,
                    &accumulator,
                    &mut offset,
                    &mut dict_buffer,
                    &mut postings_buffer,
                    &mut freq_entries,
                );
                accumulator.clear();
            }
        }
        current_term = Some(term);

        for doc_id in entry.doc_ids {
            if accumulator.last() != Some(&doc_id) {
                accumulator.push(doc_id);
            }
        }

        sources[block_idx].lines_in_queue -= 1;
        if sources[block_idx].lines_in_queue == 0 {
            refill(&mut sources, &mut heap, block_idx, per_block_batch)?;
        }

        if dict_buffer.len() >= MAX_LINES_TO_HOLD_IN_MEM {
            postings_writer.write_all(postings_buffer.as_bytes())?;
            postings_buffer.clear();
            for (t, len, off) in dict_buffer.drain(..) {
                writeln!(dict_writer, "{} {} {}", t, len, off)?;
            }
        }
    }

    if let Some(cur) = current_term {
        emit(
            &cur,
            &accumulator,
            &mut offset,
            &mut dict_buffer,
            &mut postings_buffer,
            &mut freq_entries,
        );
    }

    postings_writer.write_all(postings_buffer.as_bytes())?;
    for (t, len, off) in dict_buffer.drain(..) {
        writeln!(dict_writer, "{} {} {}", t, len, off)?;
    }
    dict_writer.flush()?;
    postings_writer.flush()?;

    freq_entries.sort_by(|a, b| b.1.cmp(&a.1));
    let freq_file = File::create(freq_dict_path.as_ref())?;
    let mut freq_writer = BufWriter::new(freq_file);
    for (term, freq) in freq_entries {
        writeln!(freq_writer, "{} {}", term, freq)?;
    }
    freq_writer.flush()?;

    Ok(())
}
