//! Performance benchmarks for the probe's CPU-side work
//!
//! Network time dominates a real probe; these keep URL parsing, response
//! scanning, buffering and report formatting out of the measured phases.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use httpprobe::{
    client::{read_body, ResponseBuffer},
    models::{ProbeReport, Timings},
    output::{JsonFormatter, LineFormatter, OutputFormatter},
    probe::validator,
    Target,
};
use std::{hint::black_box, io, time::Duration};

fn sample_report() -> ProbeReport {
    ProbeReport {
        url: "https://example.com/".to_string(),
        peer: "192.0.2.1:443".parse().unwrap(),
        timings: Timings {
            dns: Duration::from_millis(12),
            connect: Duration::from_millis(25),
            first_byte: Duration::from_millis(80),
            total: Duration::from_millis(410),
            tls_handshake: Some(Duration::from_millis(40)),
        },
        content_length: 123_456,
        truncated: false,
        content: Vec::new(),
    }
}

fn benchmark_url_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("url_parsing");
    let urls = [
        ("plain", "http://example.com/index.html?query=1"),
        ("ipv6", "https://[2001:db8::1]/status"),
        ("no_path", "https://example.com"),
    ];
    for (name, url) in urls {
        group.bench_with_input(BenchmarkId::from_parameter(name), url, |b, url| {
            b.iter(|| Target::parse(black_box(url)))
        });
    }
    group.finish();
}

fn benchmark_check_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_string");
    for size in [4 * 1024, 256 * 1024, 4 * 1024 * 1024] {
        let mut response = vec![b'a'; size];
        response.extend_from_slice(b"needle");
        group.throughput(Throughput::Bytes(response.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &response, |b, response| {
            b.iter(|| validator::validate(black_box(response), "needle"))
        });
    }
    group.finish();
}

fn benchmark_body_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("body_read");
    for capacity in [64 * 1024, 4 * 1024 * 1024] {
        group.throughput(Throughput::Bytes(capacity as u64));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            b.iter(|| {
                let mut buffer = ResponseBuffer::with_capacity(capacity);
                read_body(&mut io::repeat(b'x'), &mut buffer)
            })
        });
    }
    group.finish();
}

fn benchmark_report_formatting(c: &mut Criterion) {
    let report = sample_report();
    c.bench_function("format_line", |b| {
        b.iter(|| LineFormatter.format_report(black_box(&report)))
    });
    c.bench_function("format_json", |b| {
        b.iter(|| JsonFormatter.format_report(black_box(&report)))
    });
}

criterion_group!(
    benches,
    benchmark_url_parsing,
    benchmark_check_string,
    benchmark_body_read,
    benchmark_report_formatting
);
criterion_main!(benches);
