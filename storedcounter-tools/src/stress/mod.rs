//! A tool used to check that concurrent callers see a gap-free sequence.

use std::{path::PathBuf, sync::Arc, thread, time::Instant};

use clap::Parser;
use hdrhistogram::Histogram;
use log::{debug, error, info};
use storedcounter::{FileStore, FileStoreOptions, Store, StoredCounter};

use crate::{Error, Result};

#[derive(Parser, Debug, Clone)]
#[clap(about = "Start stress testing")]
pub(crate) struct Args {
    /// Sets the directory of the file store
    #[clap(long, required = true)]
    dir: PathBuf,

    /// Sets the key of the counter
    #[clap(long, default_value = "/stress")]
    key: String,

    /// Number of concurrent threads to run
    #[clap(short, long, default_value_t = 4)]
    threads: usize,

    /// Number of `next` calls each thread makes
    #[clap(long, default_value_t = 1000)]
    ops: usize,

    /// Skips fsync after each write
    #[clap(long, default_value_t = false)]
    no_sync: bool,

    /// Destroy the existing store before running the test
    #[clap(long, default_value_t = false)]
    destroy_db: bool,
}

/// Values observed by one thread, with the latency of each call in micros.
struct Samples {
    values: Vec<u64>,
    latencies: Vec<u64>,
}

pub(crate) fn run(args: Args) -> Result<()> {
    if args.destroy_db && args.dir.exists() {
        if let Err(err) = std::fs::remove_dir_all(&args.dir) {
            error!("Destroy store {}: {err:?}", args.dir.display());
            std::process::abort();
        }
    }

    let options = FileStoreOptions {
        sync: !args.no_sync,
    };
    let store = FileStore::open(&args.dir, options)?;
    debug!("Open store {} success", args.dir.display());
    let counter = Arc::new(StoredCounter::new(store, args.key.as_str()));

    // The first value handed out is 0 on a fresh key, current + 1 otherwise.
    let start = if counter.store().has(counter.key())? {
        counter.get()?.wrapping_add(1)
    } else {
        0
    };
    info!(
        "Spawn {} threads with {} ops each, starting at {start}",
        args.threads, args.ops
    );

    let begin = Instant::now();
    let handles: Vec<_> = (0..args.threads)
        .map(|_| {
            let counter = counter.clone();
            let ops = args.ops;
            thread::spawn(move || next_task(&counter, ops))
        })
        .collect();
    let mut samples = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.join() {
            Ok(s) => samples.push(s?),
            Err(_) => return Err(Error::Verify("stress thread panicked".to_owned())),
        }
    }
    let elapsed = begin.elapsed();

    let mut hist = Histogram::<u64>::new_with_bounds(1, 60 * 60 * 1000 * 1000, 2)?;
    let mut values = Vec::with_capacity(args.threads * args.ops);
    for s in samples {
        for t in s.latencies {
            hist.saturating_record(t);
        }
        values.extend(s.values);
    }

    verify(start, &mut values)?;
    let total = values.len() as u64;
    let last = counter.get()?;
    if total > 0 && last != start.wrapping_add(total - 1) {
        return Err(Error::Verify(format!(
            "persisted value {last} after {total} ops from {start}"
        )));
    }

    info!(
        "Done {total} ops in {} ms, {:.0} ops/sec",
        elapsed.as_millis(),
        total as f64 / elapsed.as_secs_f64()
    );
    println!(
        "Percentiles : P50: {} us, P75: {} us, P99: {} us, P99.9: {} us, P99.99: {} us",
        hist.value_at_quantile(0.50),
        hist.value_at_quantile(0.75),
        hist.value_at_quantile(0.99),
        hist.value_at_quantile(0.999),
        hist.value_at_quantile(0.9999),
    );
    Ok(())
}

fn next_task(counter: &StoredCounter<FileStore>, ops: usize) -> Result<Samples> {
    let mut samples = Samples {
        values: Vec::with_capacity(ops),
        latencies: Vec::with_capacity(ops),
    };
    for _ in 0..ops {
        let begin = Instant::now();
        samples.values.push(counter.next()?);
        samples.latencies.push(begin.elapsed().as_micros() as u64);
    }
    Ok(samples)
}

/// Checks that `values` is exactly `start, start + 1, ...` in some order,
/// counting past `u64::MAX` as wrapping to 0.
fn verify(start: u64, values: &mut [u64]) -> Result<()> {
    for v in values.iter_mut() {
        *v = v.wrapping_sub(start);
    }
    values.sort_unstable();
    for (i, offset) in values.iter().enumerate() {
        if *offset != i as u64 {
            return Err(Error::Verify(format!(
                "expect {} at position {i}, got {}",
                start.wrapping_add(i as u64),
                start.wrapping_add(*offset)
            )));
        }
    }
    Ok(())
}
