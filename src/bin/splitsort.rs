//! # SplitSort CLI Entry Point
//!
//! Two subcommands drive the tool's batch workflow:
//!
//! ```bash
//! # Fill the record file with a shuffled permutation of [0, num_keys)
//! splitsort generate <num_keys> <seed>
//!
//! # Sort the record file
//! splitsort sort <num_keys> <num_threads> <num_samples> <num_partitions>
//! ```
//!
//! Both accept `--dir <path>` to override the NVM directory (default
//! `/dcpmm/yida`). A malformed invocation prints usage and exits 0; a
//! mapping or verification failure exits non-zero.

use std::env;
use std::path::PathBuf;

use eyre::{ensure, Result, WrapErr};

use splitsort::config::{default_thread_count, DEFAULT_NVM_DIR, UNSORTED_FILE_NAME};
use splitsort::{generate_records, is_sorted, split_sort, GenerateConfig, RecordFile, SortConfig};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = Vec::new();
    let mut dir = PathBuf::from(DEFAULT_NVM_DIR);

    let mut raw = env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("splitsort {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--dir" => match raw.next() {
                Some(path) => dir = PathBuf::from(path),
                None => {
                    print_usage();
                    return Ok(());
                }
            },
            _ => args.push(arg),
        }
    }

    match args.first().map(String::as_str) {
        Some("generate") => generate(&args[1..], dir),
        Some("sort") => sort(&args[1..], dir),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn generate(args: &[String], dir: PathBuf) -> Result<()> {
    let (Some(num_keys), Some(seed)) = (parse(args, 0), parse(args, 1)) else {
        print_usage();
        return Ok(());
    };
    if args.len() != 2 {
        print_usage();
        return Ok(());
    }

    let cfg = GenerateConfig {
        output_path: dir.join(UNSORTED_FILE_NAME),
        ..GenerateConfig::new(num_keys as usize, seed)
    };

    println!("Hardware concurrency: {}", cfg.num_threads);
    generate_records(&cfg)?;
    println!("Working... Done");
    Ok(())
}

fn sort(args: &[String], dir: PathBuf) -> Result<()> {
    let (Some(num_keys), Some(threads), Some(samples), Some(partitions)) = (
        parse(args, 0),
        parse(args, 1),
        parse(args, 2),
        parse(args, 3),
    ) else {
        print_usage();
        return Ok(());
    };
    if args.len() != 4 {
        print_usage();
        return Ok(());
    }

    let num_keys = num_keys as usize;
    let cfg = SortConfig {
        input_path: dir.join(UNSORTED_FILE_NAME),
        arena_dir: dir,
        num_threads: if threads == 0 {
            default_thread_count()
        } else {
            threads as usize
        },
        num_samples: samples as usize,
        num_partitions: partitions as usize,
        ..SortConfig::default()
    };

    println!("Number of records to sort: {}", num_keys);
    println!("Number of threads used: {}", cfg.num_threads);
    println!("Number of samples taken: {}", cfg.num_samples);
    println!("Number of partitions: {}", cfg.num_partitions);

    println!("Working... Mapping the record file");
    let file = RecordFile::map(&cfg.input_path, num_keys)
        .wrap_err("failed to map the file to sort")?;
    let records = file.records()?;

    let output = split_sort(records, &cfg)?;

    println!("Working... Verifying keys are in sorted order");
    ensure!(
        is_sorted(&output, cfg.num_threads),
        "sorted-output verification failed: keys are not in ascending order"
    );

    println!(
        "Working... Success, {} keys in ascending order ({} dropped as duplicates)",
        output.len(),
        num_keys.saturating_sub(output.len())
    );
    Ok(())
}

fn parse(args: &[String], index: usize) -> Option<u64> {
    args.get(index)?.parse().ok()
}

fn print_usage() {
    println!("SplitSort - pointer sort for NVM record files");
    println!();
    println!("USAGE:");
    println!("    splitsort [--dir <path>] generate <num_keys> <seed>");
    println!("    splitsort [--dir <path>] sort <num_keys> <num_threads> <num_samples> <num_partitions>");
    println!();
    println!("ARGS:");
    println!("    <num_keys>        Records in the unsorted file");
    println!("    <seed>            Shuffle seed for the generated permutation");
    println!("    <num_threads>     Worker count (0 = hardware concurrency)");
    println!("    <num_samples>     Systematic samples (>= num_partitions, <= num_keys)");
    println!("    <num_partitions>  Key-range partitions, one search tree each");
    println!();
    println!("OPTIONS:");
    println!("    --dir <path>      NVM directory (default {})", DEFAULT_NVM_DIR);
    println!("    -h, --help        Print help information");
    println!("    -v, --version     Print version information");
    println!();
    println!("EXAMPLES:");
    println!("    splitsort generate 1000000 42");
    println!("    splitsort sort 1000000 16 10000 64");
}
