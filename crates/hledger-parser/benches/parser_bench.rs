//! Parser performance benchmarks.
//!
//! Run with: cargo bench -p hledger-parser

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use hledger_parser::{journal_lexer, parse};

/// Generate a synthetic journal with N transactions.
fn generate_journal(num_transactions: usize) -> String {
    let mut lines = vec![
        "account assets:Bank:Checking".to_string(),
        "account expenses:Food".to_string(),
        "account expenses:Coffee  ; daily".to_string(),
        "account expenses:Public Transport".to_string(),
        String::new(),
    ];

    let categories = ["Food", "Coffee", "Groceries", "Public Transport"];
    let payees = ["Store A", "Store B", "Cafe", "Gas Station", "Supermarket"];

    for i in 0..num_transactions {
        let category = categories[i % categories.len()];
        let payee = payees[i % payees.len()];
        let amount = format!("{}.{:02} EUR", 10 + i % 100, i % 97);
        let day = i % 28 + 1;

        lines.push(format!("2024-01-{day:02} {payee}  ; transaction {i}"));
        lines.push(format!("    * expenses:{category}      {amount}"));
        lines.push(format!("    (budget:{category})        -{amount}"));
        lines.push("    assets:Bank:Checking".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

fn bench_lex(c: &mut Criterion) {
    let journal = generate_journal(100);

    let mut group = c.benchmark_group("lex");
    group.throughput(Throughput::Bytes(journal.len() as u64));

    group.bench_function("100_transactions", |b| {
        b.iter(|| {
            journal_lexer()
                .lex_string("bench.journal", black_box(journal.as_str()))
                .count()
        });
    });

    group.finish();
}

fn bench_parse_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_scaling");

    for size in [10, 100, 1000] {
        let journal = generate_journal(size);
        group.throughput(Throughput::Bytes(journal.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &journal, |b, journal| {
            b.iter(|| parse("bench.journal", black_box(journal)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lex, bench_parse_scaling);
criterion_main!(benches);
