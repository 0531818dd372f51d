use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::dictionary::Dictionary;
use crate::error::IndexError;
use crate::query;
use crate::universe::Universe;

/// Runs every non-blank line of `queries_path` against the dictionary at
/// `dict_path`/`postings_path`, writing one space-joined, ascending doc-id
/// line per query to `output_path`.
///
/// A query that fails to parse is reported to stderr and produces an empty
/// output line; it never aborts the batch.
pub fn run_search<P: AsRef<Path>>(
    dict_path: P,
    postings_path: P,
    queries_path: P,
    output_path: P,
) -> Result<(), IndexError> {
    let dict_path = dict_path.as_ref();
    let universe_path = dict_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("document_id_list.txt");

    let mut dict = Dictionary::load(dict_path, postings_path.as_ref())?;
    let universe = Universe::load(&universe_path)?;

    let queries = fs::read_to_string(queries_path.as_ref())?;
    let out_file = File::create(output_path.as_ref())?;
    let mut writer = BufWriter::new(out_file);

    let start = Instant::now();
    let mut query_num = 0usize;

    for line in queries.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        query_num += 1;

        match query::parse(trimmed) {
            Ok(expr) => match expr.evaluate(&mut dict, &universe, true) {
                Ok(doc_ids) => {
                    let joined = doc_ids
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(" ");
                    writeln!(writer, "{}", joined)?;
                    println!(
                        "Query #{}: {} --> {} results",
                        query_num,
                        trimmed,
                        doc_ids.len()
                    );
                }
                Err(e) => {
                    eprintln!("Query #{} ({}) failed: {}", query_num, trimmed, e);
                    writeln!(writer)?;
                }
            },
            Err(e) => {
                eprintln!("Query #{} ({}) could not be parsed: {}", query_num, trimmed, e);
                writeln!(writer)?;
            }
        }
    }

    writer.flush()?;
    println!(
        "Search complete: {} queries in {:.2?}",
        query_num,
        start.elapsed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_index;
    use tempfile::TempDir;

    #[test]
    fn writes_one_output_line_per_query_and_skips_blanks() {
        let dir = TempDir::new().unwrap();
        let corpus_dir = dir.path().join("corpus");
        fs::create_dir_all(&corpus_dir).unwrap();
        fs::write(corpus_dir.join("0"), "alpha beta").unwrap();
        fs::write(corpus_dir.join("1"), "beta gamma").unwrap();

        let dict_path = dir.path().join("dictionary.txt");
        let postings_path = dir.path().join("postings.txt");
        build_index(&corpus_dir, &dict_path, &postings_path, 100_000).unwrap();

        let queries_path = dir.path().join("queries.txt");
        fs::write(&queries_path, "alpha\n\nbeta\nNOT beta\n").unwrap();
        let output_path = dir.path().join("output.txt");

        run_search(&dict_path, &postings_path, &queries_path, &output_path).unwrap();

        let output = fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec!["0", "0 1", ""]);
    }

    /// Seed corpus giving a -> [0], b -> [0,1], r -> [1], y -> [0,1,2],
    /// z -> [0,1,2], s -> [0,1], bb -> [2], U = {0,1,2,3}.
    #[test]
    fn seed_scenario_worked_queries_match_expected_docs() {
        let dir = TempDir::new().unwrap();
        let corpus_dir = dir.path().join("corpus");
        fs::create_dir_all(&corpus_dir).unwrap();
        fs::write(corpus_dir.join("0"), "a b y z s").unwrap();
        fs::write(corpus_dir.join("1"), "b r y z s").unwrap();
        fs::write(corpus_dir.join("2"), "y z bb").unwrap();
        fs::write(corpus_dir.join("3"), "filler").unwrap();

        let dict_path = dir.path().join("dictionary.txt");
        let postings_path = dir.path().join("postings.txt");
        build_index(&corpus_dir, &dict_path, &postings_path, 100_000).unwrap();

        let queries = [
            "a AND b",
            "a OR z",
            "NOT z",
            "(y AND z) AND NOT (a OR r)",
            "NOT s AND NOT a",
            "z AND NOT NOT bb",
        ];
        let queries_path = dir.path().join("queries.txt");
        fs::write(&queries_path, queries.join("\n")).unwrap();
        let output_path = dir.path().join("output.txt");

        run_search(&dict_path, &postings_path, &queries_path, &output_path).unwrap();

        let output = fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec!["0", "0 1 2", "3", "2", "2 3", "2"]);
    }

    #[test]
    fn malformed_query_produces_empty_line_and_does_not_abort_batch() {
        let dir = TempDir::new().unwrap();
        let corpus_dir = dir.path().join("corpus");
        fs::create_dir_all(&corpus_dir).unwrap();
        fs::write(corpus_dir.join("0"), "alpha").unwrap();

        let dict_path = dir.path().join("dictionary.txt");
        let postings_path = dir.path().join("postings.txt");
        build_index(&corpus_dir, &dict_path, &postings_path, 100_000).unwrap();

        let queries_path = dir.path().join("queries.txt");
        fs::write(&queries_path, "(alpha\nalpha\n").unwrap();
        let output_path = dir.path().join("output.txt");

        run_search(&dict_path, &postings_path, &queries_path, &output_path).unwrap();

        let output = fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec!["", "0"]);
    }
}
