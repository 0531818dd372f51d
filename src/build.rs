use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use crate::error::IndexError;
use crate::merge::merge_blocks;
use crate::normalizer::DefaultNormalizer;
use crate::spimi::SpimiIndexer;
use crate::universe::Universe;

/// Walks a corpus directory of one-file-per-document text files, whose
/// names are their doc-ids, and returns them in ascending doc-id order.
fn collect_documents(corpus_dir: &Path) -> Result<Vec<(u32, PathBuf)>, IndexError> {
    let mut docs = Vec::new();
    for entry in WalkDir::new(corpus_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path().to_path_buf();
        let doc_id: u32 = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| IndexError::CorpusIo {
                path: path.clone(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "document filename is not a numeric doc id",
                ),
            })?;
        docs.push((doc_id, path));
    }
    docs.sort_by_key(|(id, _)| *id);
    Ok(docs)
}

/// Builds a dictionary/postings pair from a corpus directory.
///
/// `dict_path` and `postings_path` determine where the sibling
/// `freq_sorted_dict.txt`, `document_id_list.txt`, and the scratch `blocks/`
/// directory live: alongside the dictionary file. No partial index is
/// written if any document fails to read — the error surfaces before a
/// single byte of the final dictionary or postings file is produced.
pub fn build_index<P: AsRef<Path>>(
    corpus_dir: P,
    dict_path: P,
    postings_path: P,
    memory_limit: usize,
) -> Result<(), IndexError> {
    let corpus_dir = corpus_dir.as_ref();
    let dict_path = dict_path.as_ref();
    let postings_path = postings_path.as_ref();
    let sibling_dir = dict_path.parent().unwrap_or_else(|| Path::new("."));
    let blocks_dir = sibling_dir.join("blocks");
    let freq_path = sibling_dir.join("freq_sorted_dict.txt");
    let universe_path = sibling_dir.join("document_id_list.txt");

    let documents = collect_documents(corpus_dir)?;
    println!(
        "Found {} documents in {}",
        documents.len(),
        corpus_dir.display()
    );

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap(),
    );

    let mut indexer = SpimiIndexer::with_memory_limit(&blocks_dir, memory_limit)?;
    let mut normalizer = DefaultNormalizer::new();
    let mut universe = Universe::new();

    for (doc_id, path) in &documents {
        pb.set_message(format!("indexing {}", path.display()));
        let text = fs::read_to_string(path).map_err(|e| IndexError::CorpusIo {
            path: path.clone(),
            source: e,
        })?;
        universe.insert(*doc_id);
        for term in normalizer.terms_in(&text) {
            indexer.add_term(*doc_id, term)?;
        }
        pb.inc(1);
    }
    pb.finish_with_message("corpus scanned");

    let block_count = indexer.finalize()?;
    println!("SPIMI: flushed {} blocks, merging into final index", block_count);

    merge_blocks(
        blocks_dir.as_path(),
        block_count,
        dict_path,
        postings_path,
        freq_path.as_path(),
        &universe,
        universe_path.as_path(),
    )?;

    if blocks_dir.exists() {
        fs::remove_dir_all(&blocks_dir)?;
    }

    println!(
        "Build complete: dictionary at {}, postings at {}",
        dict_path.display(),
        postings_path.display()
    );

    Ok(())
}
