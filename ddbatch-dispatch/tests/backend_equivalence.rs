//! Every compiled backend must produce identical batch results for the
//! same inputs; the backend choice affects latency only.

use ddbatch_core::{Seat, Strain};
use ddbatch_dispatch::{Backend, Batch, Board, BoardResult, Dispatcher, PlayRecord, RunMode};
use ddbatch_pbn::parse_deal_tag;

const DEALS: &[&str] = &[
    "N:AK... 54... QJ... 32...",
    "N:A.2.. K.3.. 2.4.. 3.5..",
    "N:A3.A2.. K2.43.. Q4.K5.. J5.Q6..",
    "N:AQ2... KJT... 987... 654...",
];

fn solve_batch() -> Batch {
    let mut batch = Batch::new();
    for tag in DEALS {
        let deal = parse_deal_tag(tag).unwrap();
        for leader in [Seat::North, Seat::East] {
            batch
                .push(Board::new(deal.clone(), Strain::NoTrump, leader))
                .unwrap();
            batch
                .push(Board::new(deal.clone(), Strain::Spades, leader))
                .unwrap();
        }
        // A duplicate of the first board of this deal
        batch
            .push(Board::new(deal, Strain::NoTrump, Seat::North))
            .unwrap();
    }
    batch
}

fn calc_batch() -> Batch {
    let mut batch = Batch::new();
    for tag in DEALS {
        let deal = parse_deal_tag(tag).unwrap();
        batch
            .push(Board::new(deal.clone(), Strain::NoTrump, Seat::North))
            .unwrap();
        // Calc ignores strain and leader: this one is a duplicate
        batch
            .push(Board::new(deal, Strain::Hearts, Seat::West))
            .unwrap();
    }
    batch
}

fn results(batch: &Batch) -> Vec<BoardResult> {
    (0..batch.len())
        .map(|i| batch.result(i).cloned().expect("slot populated"))
        .collect()
}

fn run_on(backend: Backend, mode: RunMode, make: impl Fn() -> Batch) -> Vec<BoardResult> {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_params(4, 128).unwrap();
    dispatcher.set_backend(backend).unwrap();
    let batch = make();
    dispatcher.run(mode, &batch).unwrap();
    results(&batch)
}

#[test]
fn solve_results_identical_across_backends() {
    let reference = run_on(Backend::Basic, RunMode::Solve, solve_batch);
    for backend in Backend::compiled() {
        let got = run_on(backend, RunMode::Solve, solve_batch);
        assert_eq!(got, reference, "backend {} diverged", backend.label());
    }
}

#[test]
fn calc_results_identical_across_backends() {
    let reference = run_on(Backend::Basic, RunMode::Calc, calc_batch);
    for backend in Backend::compiled() {
        let got = run_on(backend, RunMode::Calc, calc_batch);
        assert_eq!(got, reference, "backend {} diverged", backend.label());
    }
}

#[test]
fn play_results_identical_across_backends() {
    let deal = parse_deal_tag("N:A.2.. K.3.. 2.4.. 3.5..").unwrap();
    let lead = deal.hand(Seat::North).cards()[0];

    let run = |backend: Backend| -> Vec<BoardResult> {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_params(2, 64).unwrap();
        dispatcher.set_backend(backend).unwrap();

        let mut batch = Batch::new();
        let plays = vec![
            PlayRecord::new(vec![lead]),
            PlayRecord::new(vec![]),
        ];
        batch
            .push(Board::new(deal.clone(), Strain::NoTrump, Seat::North))
            .unwrap();
        batch
            .push(Board::new(deal.clone(), Strain::NoTrump, Seat::North))
            .unwrap();
        dispatcher.run_with_plays(&batch, &plays).unwrap();
        results(&batch)
    };

    let reference = run(Backend::Basic);
    for backend in Backend::compiled() {
        assert_eq!(run(backend), reference, "backend {} diverged", backend.label());
    }
}

#[test]
fn thread_counts_do_not_change_results() {
    let reference = run_on(Backend::Thread, RunMode::Solve, solve_batch);
    for threads in [1, 2, 8] {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_params(threads, 128).unwrap();
        dispatcher.set_backend(Backend::Thread).unwrap();
        let batch = solve_batch();
        dispatcher.run(RunMode::Solve, &batch).unwrap();
        assert_eq!(results(&batch), reference, "{} threads diverged", threads);
    }
}
