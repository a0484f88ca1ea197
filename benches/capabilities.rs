//! Capability translation and command dispatch benchmarks.
//!
//! Benchmarks the two hot paths of the crate:
//! - Options to capabilities translation at different argument counts
//! - Full command dispatch through the executor seam
//!
//! Run with: cargo bench --bench capabilities
//! Results saved to: target/criterion/

use std::hint::black_box;

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::Value;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use edge_webdriver::protocol::names;
use edge_webdriver::{
    ChromiumOptions, CommandExecutor, CommandResponse, EdgeDriver, EdgeOptions, HttpMethod,
    LegacyOptions, Result, SessionId, WireCommand,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const ARG_COUNTS: &[usize] = &[0, 8, 32];

// ============================================================================
// Benchmark: Capability Translation
// ============================================================================

fn bench_capability_translation(c: &mut Criterion) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let mut group = c.benchmark_group("capability_translation");

    for &count in ARG_COUNTS {
        let options = chromium_options_with_args(count);
        group.bench_with_input(
            BenchmarkId::new("chromium_args", count),
            &options,
            |b, options| {
                b.iter(|| black_box(options.to_capabilities()).unwrap());
            },
        );
    }

    let legacy = EdgeOptions::from(
        LegacyOptions::new()
            .with_host("localhost")
            .with_in_private(true),
    );
    group.bench_function("legacy", |b| {
        b.iter(|| black_box(legacy.to_capabilities()).unwrap());
    });

    let rehydrate = chromium_options_with_args(8)
        .to_capabilities()
        .expect("capabilities");
    group.bench_function("rehydrate_chromium", |b| {
        b.iter(|| black_box(EdgeOptions::from_capabilities(&rehydrate)).unwrap());
    });

    group.finish();
}

// ============================================================================
// Benchmark: Command Dispatch
// ============================================================================

fn bench_command_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("command_dispatch");

    group.bench_function("session_handshake", |b| {
        b.to_async(&rt).iter(|| async {
            EdgeDriver::with_executor(Box::new(NullExecutor), EdgeOptions::chromium())
                .await
                .unwrap()
        });
    });

    let driver = rt
        .block_on(EdgeDriver::with_executor(
            Box::new(NullExecutor),
            EdgeOptions::chromium(),
        ))
        .unwrap();
    group.bench_function("goto", |b| {
        b.to_async(&rt)
            .iter(|| async { driver.goto("https://example.com/").await.unwrap() });
    });

    group.finish();
}

// ============================================================================
// Helper Functions
// ============================================================================

fn chromium_options_with_args(count: usize) -> EdgeOptions {
    let mut chromium = ChromiumOptions::new();
    for i in 0..count {
        chromium = chromium.with_arg(format!("--bench-flag-{i}"));
    }
    EdgeOptions::from(chromium)
}

/// Executor that answers every command instantly, isolating client-side
/// dispatch cost from any network.
struct NullExecutor;

#[async_trait]
impl CommandExecutor for NullExecutor {
    async fn execute(&self, command: WireCommand) -> Result<CommandResponse> {
        let session_id = (command.name == names::NEW_SESSION).then(|| SessionId::new("bench"));
        Ok(CommandResponse {
            session_id,
            value: Value::Null,
            w3c: true,
        })
    }

    fn define_command(&mut self, _name: &str, _method: HttpMethod, _path: &str) -> bool {
        false
    }
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(
    benches,
    bench_capability_translation,
    bench_command_dispatch
);
criterion_main!(benches);
