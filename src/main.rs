use clap::{Arg, Command};
use lexicon::{build_index, run_search, IndexError};
use std::process;
use std::time::Instant;

fn required_flag<'a>(
    matches: &'a clap::ArgMatches,
    name: &str,
    flag: &'static str,
) -> Result<&'a String, IndexError> {
    matches
        .get_one::<String>(name)
        .ok_or(IndexError::MissingInput { flag })
}

fn main() {
    let cli = Command::new("lexicon")
        .version("0.1.0")
        .about("SPIMI-based boolean search engine: build an on-disk index, then run boolean AND/OR/NOT queries against it")
        .subcommand_required(true)
        .subcommand(
            Command::new("build")
                .about("Build a dictionary and postings file from a corpus directory")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("DIR")
                        .help("Corpus directory; each file is one document named by its numeric doc-id"),
                )
                .arg(
                    Arg::new("dict")
                        .short('d')
                        .long("dict")
                        .value_name("DICT")
                        .help("Output path for the dictionary file"),
                )
                .arg(
                    Arg::new("postings")
                        .short('p')
                        .long("postings")
                        .value_name("POSTINGS")
                        .help("Output path for the postings file"),
                )
                .arg(
                    Arg::new("memory_limit")
                        .long("memory-limit")
                        .value_name("N")
                        .help("Max (doc_id, term) pairs held in memory per SPIMI block (default 100000)"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Run boolean queries against a built index")
                .arg(
                    Arg::new("dict")
                        .short('d')
                        .long("dict")
                        .value_name("DICT")
                        .help("Dictionary file produced by `build`"),
                )
                .arg(
                    Arg::new("postings")
                        .short('p')
                        .long("postings")
                        .value_name("POSTINGS")
                        .help("Postings file produced by `build`"),
                )
                .arg(
                    Arg::new("queries")
                        .short('q')
                        .long("queries")
                        .value_name("QUERIES")
                        .help("File with one boolean query per line"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("OUTPUT")
                        .help("File to write one result line per query"),
                ),
        );

    let matches = cli.get_matches();

    let result = match matches.subcommand() {
        Some(("build", sub_matches)) => run_build(sub_matches),
        Some(("search", sub_matches)) => run_search_command(sub_matches),
        _ => unreachable!("clap enforces subcommand_required"),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run_build(matches: &clap::ArgMatches) -> Result<(), IndexError> {
    let input = required_flag(matches, "input", "--input")?;
    let dict = required_flag(matches, "dict", "--dict")?;
    let postings = required_flag(matches, "postings", "--postings")?;
    let memory_limit = matches
        .get_one::<String>("memory_limit")
        .map(|s| s.parse().unwrap_or(lexicon::spimi::MAX_LINES_TO_HOLD_IN_MEM))
        .unwrap_or(lexicon::spimi::MAX_LINES_TO_HOLD_IN_MEM);

    println!("Building index from {}", input);
    let start = Instant::now();
    build_index(input.as_str(), dict.as_str(), postings.as_str(), memory_limit)?;
    println!("Total build time: {:.2?}", start.elapsed());

    Ok(())
}

fn run_search_command(matches: &clap::ArgMatches) -> Result<(), IndexError> {
    let dict = required_flag(matches, "dict", "--dict")?;
    let postings = required_flag(matches, "postings", "--postings")?;
    let queries = required_flag(matches, "queries", "--queries")?;
    let output = required_flag(matches, "output", "--output")?;

    run_search(dict.as_str(), postings.as_str(), queries.as_str(), output.as_str())
}
