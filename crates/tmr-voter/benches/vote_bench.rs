//! Voting and classification benchmarks.

#![allow(clippy::panic)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use tmr_ringbuf::RingBuffer;
use tmr_voter::{
    READING_SIZE, RESULT_SIZE, Reading, TransitionLog, Voter, VoterConfig, classify,
    majority_vote,
};

fn bench_vote(c: &mut Criterion) {
    let reading = Reading::new(0x1234, 0x1235, 0x9234);

    c.bench_function("majority_vote", |b| {
        b.iter(|| majority_vote(black_box(reading).masked(black_box(0x0FFF))));
    });

    c.bench_function("classify", |b| {
        b.iter(|| classify(black_box(reading), black_box(2)));
    });
}

fn must<T, E: std::fmt::Debug>(r: Result<T, E>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => panic!("must() failed: {:?}", e),
    }
}

fn bench_cycle(c: &mut Criterion) {
    let sensors = Arc::new(must(RingBuffer::for_items(4, READING_SIZE)));
    let monitor = Arc::new(must(RingBuffer::for_items(4, RESULT_SIZE)));
    let mut voter = must(Voter::new(
        VoterConfig::default(),
        Arc::clone(&sensors),
        Arc::clone(&monitor),
        TransitionLog::new(),
    ));
    let payload = Reading::new(100, 101, 100).to_bytes();

    c.bench_function("voter_cycle", |b| {
        b.iter(|| {
            if sensors.try_send(&payload).is_ok() {
                black_box(voter.poll_once());
            }
            while monitor.try_receive().is_some() {}
        });
    });
}

criterion_group!(benches, bench_vote, bench_cycle);
criterion_main!(benches);
