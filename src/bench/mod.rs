use std::collections::BTreeMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

use crate::layout::RowBuilder;
use crate::models::ContentItem;

/// Items per simulated scroll window.
const WINDOW_ITEMS: usize = 180;

#[derive(Debug, Clone)]
pub struct BenchmarkArgs {
    pub runs: usize,
    pub row_widths: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct BenchmarkRun {
    run_index: usize,
    row_width: u32,
    elapsed_ms: f64,
    rows: usize,
    fallback_rows: usize,
    pattern_counts: BTreeMap<String, usize>,
    window_frames: usize,
    window_p50_ms: f64,
    window_p95_ms: f64,
    windows_over_16ms: usize,
}

#[derive(Debug, Serialize)]
struct BenchmarkAggregate {
    runs: usize,
    avg_elapsed_ms: f64,
    min_elapsed_ms: f64,
    max_elapsed_ms: f64,
    avg_window_p95_ms: f64,
    fallback_share: f64,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkReport {
    schema_version: u32,
    generated_at_unix_ms: u64,
    benchmark: String,
    item_count: usize,
    runs_requested: usize,
    results: Vec<BenchmarkRun>,
    aggregate: BenchmarkAggregate,
}

impl BenchmarkReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize benchmark report")
    }

    pub fn run_count(&self) -> usize {
        self.results.len()
    }
}

pub fn run_benchmark(items: &[ContentItem], args: &BenchmarkArgs) -> Result<BenchmarkReport> {
    if args.runs == 0 {
        bail!("--runs must be greater than 0");
    }
    if args.row_widths.is_empty() {
        bail!("Benchmark needs at least one row width");
    }

    let mut results = Vec::with_capacity(args.runs * args.row_widths.len());
    for run_index in 0..args.runs {
        for &row_width in &args.row_widths {
            let run = run_once(items, row_width, run_index)?;
            info!(
                "Run {} width {}: {} rows in {:.2}ms",
                run_index, row_width, run.rows, run.elapsed_ms
            );
            results.push(run);
        }
    }

    let generated_at_unix_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let aggregate = build_aggregate(&results);

    Ok(BenchmarkReport {
        schema_version: 1,
        generated_at_unix_ms,
        benchmark: "row-layout".to_string(),
        item_count: items.len(),
        runs_requested: args.runs,
        results,
        aggregate,
    })
}

fn run_once(items: &[ContentItem], row_width: u32, run_index: usize) -> Result<BenchmarkRun> {
    let builder = RowBuilder::new(row_width);

    let start = Instant::now();
    let rows = builder
        .build(items)
        .with_context(|| format!("Layout failed at row width {}", row_width))?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut pattern_counts = BTreeMap::new();
    for row in &rows {
        *pattern_counts.entry(row.pattern.to_string()).or_insert(0) += 1;
    }
    let fallback_rows = rows.iter().filter(|r| r.is_fallback()).count();

    let frame_times_ms = simulate_scroll_windows(items, &builder)?;

    Ok(BenchmarkRun {
        run_index,
        row_width,
        elapsed_ms,
        rows: rows.len(),
        fallback_rows,
        pattern_counts,
        window_frames: frame_times_ms.len(),
        window_p50_ms: percentile_ms(&frame_times_ms, 0.50),
        window_p95_ms: percentile_ms(&frame_times_ms, 0.95),
        windows_over_16ms: frame_times_ms.iter().filter(|t| **t > 16.67).count(),
    })
}

/// Re-lays out overlapping slices as a scrolling view would.
fn simulate_scroll_windows(items: &[ContentItem], builder: &RowBuilder) -> Result<Vec<f64>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let window_size = WINDOW_ITEMS.min(items.len());
    let step = (window_size / 6).max(1);
    let mut frame_times_ms = Vec::new();

    let mut idx = 0usize;
    while idx < items.len() {
        let end = (idx + window_size).min(items.len());
        let frame_start = Instant::now();
        builder.plan(&items[idx..end])?;
        frame_times_ms.push(frame_start.elapsed().as_secs_f64() * 1000.0);
        if end == items.len() {
            break;
        }
        idx += step;
    }

    Ok(frame_times_ms)
}

fn build_aggregate(runs: &[BenchmarkRun]) -> BenchmarkAggregate {
    let elapsed_values: Vec<f64> = runs.iter().map(|r| r.elapsed_ms).collect();
    let p95_values: Vec<f64> = runs.iter().map(|r| r.window_p95_ms).collect();

    let total_rows: usize = runs.iter().map(|r| r.rows).sum();
    let fallback_rows: usize = runs.iter().map(|r| r.fallback_rows).sum();
    let fallback_share = if total_rows > 0 {
        fallback_rows as f64 / total_rows as f64
    } else {
        0.0
    };

    BenchmarkAggregate {
        runs: runs.len(),
        avg_elapsed_ms: average(&elapsed_values),
        min_elapsed_ms: elapsed_values.iter().copied().reduce(f64::min).unwrap_or(0.0),
        max_elapsed_ms: elapsed_values.iter().copied().reduce(f64::max).unwrap_or(0.0),
        avg_window_p95_ms: average(&p95_values),
        fallback_share,
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn percentile_ms(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let clamped = p.clamp(0.0, 1.0);
    let idx = ((sorted.len() - 1) as f64 * clamped).round() as usize;
    sorted[idx]
}
