//! Loads a word list into maps of several primary capacities and times
//! `set`/`get` per word.
//!
//! cargo run --release --example dictionary_timing [-- /path/to/words]

use bucketmap::{BucketMap, Xxh3Keys};
use std::time::{Duration, Instant};

const PRIMARY_SIZES: [usize; 9] = [1, 10, 13, 587, 7823, 10000, 175000, 174989, 349999];

fn load_words(path: &str) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/usr/share/dict/words".to_string());
    let words = match load_words(&path) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("cannot read {}: {}", path, e);
            std::process::exit(1);
        }
    };
    println!("{} words from {}", words.len(), path);

    for primary in PRIMARY_SIZES {
        let mut map = match BucketMap::with_hasher(primary, Xxh3Keys) {
            Ok(map) => map,
            Err(e) => {
                eprintln!("create({}) failed: {}", primary, e);
                std::process::exit(1);
            }
        };

        let mut set_time = Duration::ZERO;
        let mut inserted = 0usize;
        for word in &words {
            let start = Instant::now();
            let ret = map.set(word, word.clone());
            set_time += start.elapsed();
            match ret {
                Ok(()) => inserted += 1,
                Err(e) => eprintln!("set {:?}: {}", word, e),
            }
        }

        let mut get_time = Duration::ZERO;
        let mut found = 0usize;
        for word in &words {
            let start = Instant::now();
            let got = map.get(word);
            get_time += start.elapsed();
            match got {
                Ok(Some(v)) if v == word => found += 1,
                other => eprintln!("get {:?} returned {:?}", word, other),
            }
        }

        println!(
            "For size : {:06}\t\tset : {:?} for {:06} items ({:.2} ns/item)",
            primary,
            set_time,
            inserted,
            set_time.as_nanos() as f64 / inserted.max(1) as f64
        );
        println!(
            "For size : {:06}\t\tget : {:?} for {:06} items ({:.2} ns/item)",
            primary,
            get_time,
            found,
            get_time.as_nanos() as f64 / found.max(1) as f64
        );
        println!("  distinct keys stored: {}", map.len());
    }
}
