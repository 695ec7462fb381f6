//! Criterion benchmarks for the hot scoring path.
//!
//! Covers: feature extraction from an event history, the rule-based
//! fallback scorer, and address checksumming under `codec`.

use alloy::primitives::U256;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ghostnet_sentinel::codec;
use ghostnet_sentinel::features::compute_features;
use ghostnet_sentinel::scoring::{rule_based_fallback, ScoringEngine};
use ghostnet_sentinel::types::{EventKind, TxStatus, WalletEvent};

const WALLET: &str = "0x1111111111111111111111111111111111111111";

fn sample_events(count: usize) -> Vec<WalletEvent> {
    (0..count)
        .map(|i| WalletEvent {
            kind: if i % 5 == 0 { EventKind::ContractCall } else { EventKind::Transfer },
            hash: format!("0x{:064x}", i),
            sender: WALLET.to_string(),
            receiver: Some(format!("0x{:040x}", i % 37)),
            value: U256::from((i as u64 + 1) * 1_000_000_000_000_000),
            block_height: 18_000_000 + i as u64,
            block_timestamp_ms: (1_700_000_000_000_u64) + (i as u64) * 3_600_000,
            gas_price: U256::from(20_000_000_000u64),
            gas_used: 21_000 + (i as u64 % 50_000),
            status: if i % 23 == 0 { TxStatus::Failed } else { TxStatus::Success },
            input: vec![],
            contract_address: None,
            token_symbol: None,
            token_value: None,
            method_selector: None,
            nonce: i as u64,
            log_index: None,
        })
        .collect()
}

fn bench_compute_features(c: &mut Criterion) {
    let events = sample_events(500);
    let now_ms = 1_700_000_000_000 + 500 * 3_600_000 + 86_400_000;

    c.bench_function("compute_features_500_events", |b| {
        b.iter(|| compute_features(black_box(&events), black_box(now_ms), black_box(Some(2.5))))
    });
}

fn bench_rule_based_fallback(c: &mut Criterion) {
    let events = sample_events(500);
    let now_ms = 1_700_000_000_000 + 500 * 3_600_000 + 86_400_000;
    let features = compute_features(&events, now_ms, Some(2.5));

    c.bench_function("rule_based_fallback", |b| {
        b.iter(|| rule_based_fallback(black_box(&features), black_box(events.len())))
    });
}

fn bench_scoring_engine_fallback(c: &mut Criterion) {
    let engine = ScoringEngine::fallback_only();
    let events = sample_events(500);
    let now_ms = 1_700_000_000_000 + 500 * 3_600_000 + 86_400_000;
    let features = compute_features(&events, now_ms, Some(2.5));

    c.bench_function("scoring_engine_score_fallback", |b| {
        b.iter(|| {
            engine.score(
                black_box(WALLET),
                black_box(features),
                black_box(events.len()),
                black_box(now_ms / 1000),
            )
        })
    });
}

fn bench_address_normalize(c: &mut Criterion) {
    c.bench_function("codec_normalize", |b| b.iter(|| codec::normalize(black_box(WALLET))));
}

criterion_group!(
    benches,
    bench_compute_features,
    bench_rule_based_fallback,
    bench_scoring_engine_fallback,
    bench_address_normalize,
);
criterion_main!(benches);
