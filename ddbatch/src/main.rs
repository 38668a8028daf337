use clap::Parser;
use ddbatch_core::{Seat, Strain};
use ddbatch_dispatch::{Batch, Board, BoardResult, Dispatcher, RunMode, TrickTable, MAX_BOARDS};
use ddbatch_pbn::{format_oneline, parse_any};
use std::fs;
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "ddbatch")]
#[command(about = "Batch double-dummy solver for bridge deals", long_about = None)]
struct Args {
    /// Number of worker threads
    #[arg(short = 't', long = "threads", default_value = "1")]
    threads: usize,

    /// Memory budget in MB for the search workspaces
    #[arg(short = 'm', long = "memory-mb", default_value = "256")]
    memory_mb: usize,

    /// Concurrency backend: basic, thread, hybrid, pool or par-iter
    #[arg(short = 'b', long = "backend")]
    backend: Option<String>,

    /// Operation per deal: solve (one strain and leader) or calc (full
    /// table)
    #[arg(long = "mode", default_value = "solve")]
    mode: String,

    /// Strain for solve mode (C, D, H, S, NT)
    #[arg(long = "strain", default_value = "NT")]
    strain: String,

    /// Opening leader for solve mode (N, E, S, W)
    #[arg(long = "leader", default_value = "N")]
    leader: String,

    /// Print the platform and configuration report, then exit
    #[arg(long = "info")]
    info: bool,

    /// Deal file, one deal per line in oneline or PBN tag format
    /// (stdin when absent)
    file: Option<String>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mode = match args.mode.as_str() {
        "solve" => RunMode::Solve,
        "calc" => RunMode::Calc,
        other => {
            eprintln!("Unknown mode: {} (expected solve or calc)", other);
            std::process::exit(1);
        }
    };
    let strain = Strain::from_label(&args.strain).unwrap_or_else(|| {
        eprintln!("Unknown strain: {}", args.strain);
        std::process::exit(1);
    });
    let leader = args
        .leader
        .chars()
        .next()
        .and_then(Seat::from_char)
        .unwrap_or_else(|| {
            eprintln!("Unknown leader: {}", args.leader);
            std::process::exit(1);
        });

    let mut dispatcher = Dispatcher::new();
    if let Err(e) = dispatcher.register_params(args.threads, args.memory_mb) {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }
    if let Some(label) = &args.backend {
        let backend = ddbatch_dispatch::Backend::from_label(label).unwrap_or_else(|| {
            eprintln!("Unknown backend: {}", label);
            std::process::exit(1);
        });
        if let Err(e) = dispatcher.set_backend(backend) {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }

    if args.info {
        print!("{}", dispatcher.info());
        return;
    }

    let input = match &args.file {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Failed to read stdin: {}", e);
                std::process::exit(1);
            }
            buffer
        }
    };

    let mut deals = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        match parse_any(line) {
            Ok(deal) => deals.push(deal),
            Err(e) => {
                eprintln!("Line {}: {}", line_no + 1, e);
                std::process::exit(1);
            }
        }
    }

    // Run in chunks of the batch ceiling
    let mut batches = 0;
    for chunk in deals.chunks(MAX_BOARDS) {
        let mut batch = Batch::new();
        for deal in chunk {
            let board = Board::new(deal.clone(), strain, leader);
            if let Err(e) = batch.push(board) {
                eprintln!("Batch error: {}", e);
                std::process::exit(1);
            }
        }

        if let Err(e) = dispatcher.run(mode, &batch) {
            eprintln!("Batch failed: {}", e);
            std::process::exit(1);
        }
        batches += 1;

        for (i, deal) in chunk.iter().enumerate() {
            match batch.result(i) {
                Some(BoardResult::Tricks(tricks)) => {
                    println!(
                        "{}  {}/{}: {}",
                        format_oneline(deal),
                        strain.label(),
                        leader.to_char(),
                        tricks
                    );
                }
                Some(BoardResult::Table(table)) => {
                    println!("{}", format_oneline(deal));
                    print_table(table);
                }
                other => {
                    eprintln!("Board {}: unexpected result {:?}", i, other);
                    std::process::exit(1);
                }
            }
        }
    }

    eprintln!("Solved {} deals in {} batches", deals.len(), batches);
}

fn print_table(table: &TrickTable) {
    println!("        N   E   S   W");
    for strain in Strain::ALL {
        print!("  {:<4}", strain.label());
        for seat in Seat::ALL {
            print!("{:>4}", table.get(strain, seat));
        }
        println!();
    }
}
