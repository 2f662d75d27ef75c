#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::expect_used,
    clippy::print_stdout
)]

/// Benchmarks for the percent-encoding engine and the key-value view.
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use urlbuf::UrlStorage;
use urlbuf::percent::{self, Component, UserInfo, decode_sets};

const PLAIN: &str = "a-plain-path-segment-with-nothing-to-escape";
const MIXED: &str = "user names & passwords: 100% of them / need care";
const QUERY_URL: &str =
    "http://example.com/search?q=rust+urls&page=4&num=20&safe=on&lang=en&utm_source=bench";

fn bench_encode(c: &mut Criterion) {
    c.bench_function("encode_passthrough", |b| {
        b.iter(|| {
            percent::utf8_percent_encode(black_box(PLAIN), UserInfo).write_to(|chunk| {
                black_box(chunk);
            })
        });
    });

    c.bench_function("encode_mixed", |b| {
        b.iter(|| percent::utf8_percent_encode(black_box(MIXED), Component).to_string());
    });

    c.bench_function("encoded_length", |b| {
        b.iter(|| percent::encoded_length(black_box(MIXED.as_bytes()), &Component));
    });
}

fn bench_decode(c: &mut Criterion) {
    let encoded = percent::utf8_percent_encode(MIXED, Component).to_string();
    c.bench_function("decode_mixed", |b| {
        b.iter(|| {
            percent::percent_decode(black_box(encoded.as_bytes()), decode_sets::Form)
                .collect_bytes()
        });
    });
}

fn bench_key_value(c: &mut Criterion) {
    let url: UrlStorage = QUERY_URL.parse().unwrap();

    c.bench_function("kv_iterate", |b| {
        b.iter(|| {
            let pairs: Vec<(String, String)> = black_box(&url).query_pairs().iter().collect();
            pairs
        });
    });

    c.bench_function("kv_batched_lookup", |b| {
        b.iter(|| black_box(&url).query_pairs().get_batch(["q", "page", "num"]));
    });

    c.bench_function("kv_set", |b| {
        b.iter(|| {
            let mut url = black_box(&url).clone();
            url.query_pairs_mut().set("page", Some("5")).unwrap();
            url
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_key_value);
criterion_main!(benches);
