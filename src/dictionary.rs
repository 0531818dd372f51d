use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::IndexError;

/// One posting entry: a doc-id and, if present, a skip target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingEntry {
    pub doc_id: u32,
    /// `-1` (represented as `None`) when the entry carries no skip pointer.
    pub next_skip: Option<u32>,
}

/// Loads the dictionary into memory and serves postings lines from disk by
/// byte offset.
///
/// The dictionary maps `term -> (length, offset)`; `length` is the number of
/// doc-ids in the term's posting list, `offset` is the byte position of the
/// corresponding line in the postings file.
pub struct Dictionary {
    entries: HashMap<String, (usize, u64)>,
    postings: File,
}

impl Dictionary {
    /// Loads `dict_path` fully into memory and opens `postings_path` for
    /// random access.
    pub fn load<P: AsRef<Path>>(dict_path: P, postings_path: P) -> Result<Self, IndexError> {
        let file = File::open(dict_path)?;
        let reader = BufReader::new(file);
        let mut entries = HashMap::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let term = fields
                .next()
                .ok_or_else(|| IndexError::InternalInvariant {
                    detail: "dictionary line missing term".to_string(),
                })?
                .to_string();
            let length: usize = fields
                .next()
                .ok_or_else(|| IndexError::InternalInvariant {
                    detail: format!("dictionary line for {} missing length", term),
                })?
                .parse()
                .map_err(|_| IndexError::InternalInvariant {
                    detail: format!("dictionary length for {} is not an integer", term),
                })?;
            let offset: u64 = fields
                .next()
                .ok_or_else(|| IndexError::InternalInvariant {
                    detail: format!("dictionary line for {} missing offset", term),
                })?
                .parse()
                .map_err(|_| IndexError::InternalInvariant {
                    detail: format!("dictionary offset for {} is not an integer", term),
                })?;
            entries.insert(term, (length, offset));
        }

        let postings = File::open(postings_path)?;

        Ok(Dictionary { entries, postings })
    }

    /// Number of doc-ids in `term`'s posting list, or 0 if absent.
    pub fn get_size(&self, term: &str) -> usize {
        self.entries.get(term).map(|(len, _)| *len).unwrap_or(0)
    }

    /// Reads and parses the posting list for `term`, returning the raw
    /// `(doc_id, next_skip)` pairs in file order.
    ///
    /// Returns an empty list if `term` is not in the dictionary.
    pub fn get_postings(&mut self, term: &str) -> Result<Vec<PostingEntry>, IndexError> {
        let Some(&(_, offset)) = self.entries.get(term) else {
            return Ok(Vec::new());
        };

        self.postings.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(&mut self.postings);
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end_matches('\n');

        let mut fields = line.split_whitespace();
        fields.next(); // discard the leading term token

        let mut entries = Vec::new();
        for field in fields {
            entries.push(parse_posting_token(field)?);
        }
        Ok(entries)
    }
}

fn parse_posting_token(token: &str) -> Result<PostingEntry, IndexError> {
    if let Some((doc, skip)) = token.split_once(';') {
        let doc_id = doc.parse().map_err(|_| IndexError::InternalInvariant {
            detail: format!("malformed posting doc-id: {}", token),
        })?;
        let next_skip = skip.parse().map_err(|_| IndexError::InternalInvariant {
            detail: format!("malformed posting skip target: {}", token),
        })?;
        Ok(PostingEntry {
            doc_id,
            next_skip: Some(next_skip),
        })
    } else {
        let doc_id = token.parse().map_err(|_| IndexError::InternalInvariant {
            detail: format!("malformed posting doc-id: {}", token),
        })?;
        Ok(PostingEntry {
            doc_id,
            next_skip: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_blocks;
    use crate::spimi::SpimiIndexer;
    use crate::universe::Universe;
    use tempfile::TempDir;

    fn build_sample(dir: &Path) -> Dictionary {
        let blocks_dir = dir.join("blocks");
        let mut indexer = SpimiIndexer::new(&blocks_dir).unwrap();
        indexer.add_term(0, "cat".to_string()).unwrap();
        indexer.add_term(0, "dog".to_string()).unwrap();
        indexer.add_term(1, "cat".to_string()).unwrap();
        indexer.add_term(2, "cat".to_string()).unwrap();
        let block_count = indexer.finalize().unwrap();

        let dict_path = dir.join("dict.txt");
        let postings_path = dir.join("postings.txt");
        let freq_path = dir.join("freq.txt");
        let universe_path = dir.join("universe.txt");

        let mut universe = Universe::new();
        for id in 0..3 {
            universe.insert(id);
        }

        merge_blocks(
            &blocks_dir,
            block_count,
            &dict_path,
            &postings_path,
            &freq_path,
            &universe,
            &universe_path,
        )
        .unwrap();

        Dictionary::load(dict_path, postings_path).unwrap()
    }

    #[test]
    fn loads_size_and_postings_for_known_term() {
        let dir = TempDir::new().unwrap();
        let mut dict = build_sample(dir.path());

        assert_eq!(dict.get_size("cat"), 3);
        let postings = dict.get_postings("cat").unwrap();
        let doc_ids: Vec<u32> = postings.iter().map(|p| p.doc_id).collect();
        assert_eq!(doc_ids, vec![0, 1, 2]);
    }

    #[test]
    fn unknown_term_yields_empty_postings_not_an_error() {
        let dir = TempDir::new().unwrap();
        let mut dict = build_sample(dir.path());

        assert_eq!(dict.get_size("nonexistent"), 0);
        assert_eq!(dict.get_postings("nonexistent").unwrap(), Vec::new());
    }

    #[test]
    fn parses_skip_pointer_tokens() {
        let entry = parse_posting_token("5;12").unwrap();
        assert_eq!(entry.doc_id, 5);
        assert_eq!(entry.next_skip, Some(12));

        let entry = parse_posting_token("7").unwrap();
        assert_eq!(entry.doc_id, 7);
        assert_eq!(entry.next_skip, None);
    }
}
