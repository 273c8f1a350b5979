//! 周期报告基准测试
//!
//! 测试报告聚合与CSV/JSON渲染的开销

use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use internet_vitals::config::{Config, TomlConfigLoader};
use internet_vitals::{CycleReport, ProbeOutcome, ProbeStatus};
use std::hint::black_box;
use std::time::Duration;

fn sample_outcomes(count: usize) -> Vec<ProbeOutcome> {
    (0..count)
        .map(|i| {
            let status = match i % 3 {
                0 => ProbeStatus::Online,
                1 => ProbeStatus::Offline,
                _ => ProbeStatus::Timeout,
            };
            ProbeOutcome::new(
                format!("target-{i}.example"),
                status,
                Duration::from_millis(20 + i as u64),
            )
        })
        .collect()
}

/// 报告聚合基准测试
fn report_aggregation_benchmark(c: &mut Criterion) {
    let outcomes = sample_outcomes(3);
    c.bench_function("cycle_report_new", |b| {
        b.iter(|| {
            let report = CycleReport::new(Utc::now(), black_box(outcomes.clone()));
            black_box(report.overall_online)
        });
    });
}

/// 报告渲染基准测试
fn report_rendering_benchmark(c: &mut Criterion) {
    let report = CycleReport::new(Utc::now(), sample_outcomes(16));

    c.bench_function("cycle_report_to_csv_rows", |b| {
        b.iter(|| black_box(report.to_csv_rows()));
    });

    c.bench_function("cycle_report_to_json", |b| {
        b.iter(|| black_box(report.to_json().unwrap()));
    });
}

/// 配置解析基准测试
fn config_parsing_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let loader = TomlConfigLoader::new(false);
    let content = internet_vitals::config::DEFAULT_CONFIG_TEMPLATE;

    c.bench_function("config_parse_template", |b| {
        b.iter(|| {
            let config: Config = runtime
                .block_on(async {
                    use internet_vitals::config::ConfigLoader;
                    loader.load_from_string(black_box(content)).await
                })
                .unwrap();
            black_box(config)
        });
    });
}

criterion_group!(
    benches,
    report_aggregation_benchmark,
    report_rendering_benchmark,
    config_parsing_benchmark
);
criterion_main!(benches);
