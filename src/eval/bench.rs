//! Performance benchmarks
//!
//! Measures response latency across query sizes, generation throughput,
//! streaming responsiveness, and sequential load against a live backend.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;

use super::Grade;
use crate::service::ModelClient;

/// Named queries of increasing size for the latency run
const LATENCY_QUERIES: &[(&str, &str)] = &[
    ("Short query", "What is regress?"),
    ("Medium query", "Explain how to merge two datasets in Stata"),
    (
        "Long query",
        "Explain the difference between fixed effects and random effects models \
         in panel data analysis, and when to use each one in Stata",
    ),
];

const THROUGHPUT_QUERY: &str = "Explain how to perform a multiple regression analysis \
    in Stata, including interpretation of results.";

const STREAMING_QUERY: &str = "Explain Stata's merge command with examples.";

const LOAD_QUERY: &str = "What does summarize do?";

/// Runs per query in the latency benchmark
const LATENCY_RUNS: usize = 3;

/// Sequential requests in the load benchmark
const LOAD_REQUESTS: usize = 5;

/// Summary statistics over a set of duration samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub std_dev_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl SampleStats {
    /// Compute statistics from raw samples. Returns `None` when empty.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut ms: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
        ms.sort_by(|a, b| a.total_cmp(b));

        let mean = ms.iter().sum::<f64>() / ms.len() as f64;
        let median = if ms.len() % 2 == 1 {
            ms[ms.len() / 2]
        } else {
            (ms[ms.len() / 2 - 1] + ms[ms.len() / 2]) / 2.0
        };
        let variance = ms.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / ms.len() as f64;

        Some(Self {
            mean_ms: mean,
            median_ms: median,
            std_dev_ms: variance.sqrt(),
            min_ms: ms[0],
            max_ms: ms[ms.len() - 1],
        })
    }
}

/// Rough token estimate from a word count. Model tokenizers average a bit
/// more than one token per word.
pub fn estimate_tokens(text: &str) -> f64 {
    text.split_whitespace().count() as f64 * 1.3
}

/// Performance grade from mean request latency
pub fn latency_grade(mean_latency: Duration) -> Grade {
    let secs = mean_latency.as_secs_f64();
    if secs < 2.0 {
        Grade::A
    } else if secs < 4.0 {
        Grade::B
    } else if secs < 6.0 {
        Grade::C
    } else if secs < 10.0 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Result of the throughput benchmark
#[derive(Debug, Clone, Copy)]
pub struct ThroughputStats {
    pub total_duration: Duration,
    pub estimated_tokens: f64,
    pub tokens_per_second: f64,
}

/// Result of the streaming benchmark
#[derive(Debug, Clone, Copy)]
pub struct StreamingStats {
    pub time_to_first_chunk: Duration,
    pub total_duration: Duration,
    pub chunk_count: usize,
    pub mean_chunk_gap: Duration,
    pub total_chars: usize,
}

/// Runs the benchmark suite against a live backend
pub struct Benchmark {
    client: ModelClient,
}

impl Benchmark {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }

    /// Run every benchmark and print a summary
    pub async fn run_all(&self) -> Result<()> {
        println!(
            "\nBenchmark: {} ({})\n",
            self.client.model(),
            self.client.host()
        );

        println!("Latency ({} runs per query):", LATENCY_RUNS);
        let mut per_query_means = Vec::new();
        for (name, stats) in self.bench_latency().await? {
            per_query_means.push(stats.mean_ms);
            println!(
                "  {:14} mean {:.0} ms, median {:.0} ms, min {:.0} ms, max {:.0} ms",
                name, stats.mean_ms, stats.median_ms, stats.min_ms, stats.max_ms
            );
        }

        let throughput = self.bench_throughput().await?;
        println!(
            "\nThroughput: {:.1} tokens/sec (~{:.0} tokens in {:.1} s)",
            throughput.tokens_per_second,
            throughput.estimated_tokens,
            throughput.total_duration.as_secs_f64()
        );

        let streaming = self.bench_streaming().await?;
        println!(
            "\nStreaming: first chunk {:.0} ms, {} chunks, mean gap {:.0} ms, total {:.1} s",
            streaming.time_to_first_chunk.as_secs_f64() * 1000.0,
            streaming.chunk_count,
            streaming.mean_chunk_gap.as_secs_f64() * 1000.0,
            streaming.total_duration.as_secs_f64()
        );

        let load = self.bench_load().await?;
        println!(
            "\nLoad ({} sequential requests): mean {:.0} ms, std dev {:.0} ms, min {:.0} ms, max {:.0} ms",
            LOAD_REQUESTS, load.mean_ms, load.std_dev_ms, load.min_ms, load.max_ms
        );

        let overall_mean =
            per_query_means.iter().sum::<f64>() / per_query_means.len().max(1) as f64;
        let grade = latency_grade(Duration::from_secs_f64(overall_mean / 1000.0));
        println!("\nPerformance grade: {}", grade.describe());

        Ok(())
    }

    /// Latency statistics per query size
    pub async fn bench_latency(&self) -> Result<Vec<(&'static str, SampleStats)>> {
        let mut results = Vec::with_capacity(LATENCY_QUERIES.len());

        for (name, query) in LATENCY_QUERIES {
            let mut samples = Vec::with_capacity(LATENCY_RUNS);
            for run in 0..LATENCY_RUNS {
                let started = Instant::now();
                self.client.generate(query).await?;
                let elapsed = started.elapsed();
                info!("{} run {}: {} ms", name, run + 1, elapsed.as_millis());
                samples.push(elapsed);
            }
            // LATENCY_RUNS >= 1, so stats always exist
            if let Some(stats) = SampleStats::from_samples(&samples) {
                results.push((*name, stats));
            }
        }

        Ok(results)
    }

    /// Estimated tokens generated per second for one long response
    pub async fn bench_throughput(&self) -> Result<ThroughputStats> {
        let started = Instant::now();
        let response = self.client.generate(THROUGHPUT_QUERY).await?;
        let total_duration = started.elapsed();

        let estimated_tokens = estimate_tokens(&response);
        let tokens_per_second = if total_duration.is_zero() {
            0.0
        } else {
            estimated_tokens / total_duration.as_secs_f64()
        };

        Ok(ThroughputStats {
            total_duration,
            estimated_tokens,
            tokens_per_second,
        })
    }

    /// Time to first chunk and chunk cadence for one streamed response
    pub async fn bench_streaming(&self) -> Result<StreamingStats> {
        let started = Instant::now();
        let mut chunks = self.client.stream_generate(STREAMING_QUERY);

        let mut first_chunk = None;
        let mut last_chunk = started;
        let mut gaps = Vec::new();
        let mut chunk_count = 0usize;
        let mut total_chars = 0usize;

        while let Some(item) = chunks.recv().await {
            let text = item?;
            let now = Instant::now();
            if first_chunk.is_none() {
                first_chunk = Some(now - started);
            }
            gaps.push(now - last_chunk);
            last_chunk = now;
            chunk_count += 1;
            total_chars += text.chars().count();
        }

        let total_duration = started.elapsed();
        let mean_chunk_gap = if gaps.is_empty() {
            Duration::ZERO
        } else {
            gaps.iter().sum::<Duration>() / gaps.len() as u32
        };

        Ok(StreamingStats {
            time_to_first_chunk: first_chunk.unwrap_or(total_duration),
            total_duration,
            chunk_count,
            mean_chunk_gap,
            total_chars,
        })
    }

    /// Sequential request latency under repeated load
    pub async fn bench_load(&self) -> Result<SampleStats> {
        let mut samples = Vec::with_capacity(LOAD_REQUESTS);

        for run in 0..LOAD_REQUESTS {
            let started = Instant::now();
            self.client.generate(LOAD_QUERY).await?;
            let elapsed = started.elapsed();
            info!("Load request {}: {} ms", run + 1, elapsed.as_millis());
            samples.push(elapsed);
        }

        SampleStats::from_samples(&samples)
            .ok_or_else(|| anyhow::anyhow!("no load samples collected"))
    }
}
