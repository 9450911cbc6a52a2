//! Model quality evaluation
//!
//! Runs the canned case table against a live backend, scores each
//! response by keyword coverage, and writes a timestamped JSON report.

pub mod bench;
pub mod cases;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::enhancer::PromptEnhancer;
use crate::service::ModelClient;

use cases::{EvalCase, CATEGORIES, EVAL_CASES};

/// Letter grade assigned from a pass rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Grade from a pass rate in `[0.0, 1.0]`
    pub fn from_pass_rate(rate: f64) -> Self {
        if rate >= 0.9 {
            Grade::A
        } else if rate >= 0.8 {
            Grade::B
        } else if rate >= 0.7 {
            Grade::C
        } else if rate >= 0.6 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Grade::A => "A (Excellent)",
            Grade::B => "B (Good)",
            Grade::C => "C (Satisfactory)",
            Grade::D => "D (Needs Improvement)",
            Grade::F => "F (Poor)",
        }
    }
}

/// Outcome of scoring one response against a case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseScore {
    /// Fraction of expected keywords found, in `[0.0, 1.0]`
    pub keyword_coverage: f64,
    /// Expected keywords missing from the response
    pub missing_keywords: Vec<String>,
    /// Forbidden keywords present in the response
    pub forbidden_hits: Vec<String>,
    pub passed: bool,
}

/// Score a response against a case by case-insensitive keyword lookup.
///
/// A case passes only when every expected keyword appears and no forbidden
/// keyword does; the coverage fraction is informational.
pub fn score_response(case: &EvalCase, response: &str) -> CaseScore {
    let lowered = response.to_lowercase();

    let mut missing = Vec::new();
    let mut found = 0usize;
    for keyword in case.expected_keywords {
        if lowered.contains(&keyword.to_lowercase()) {
            found += 1;
        } else {
            missing.push(keyword.to_string());
        }
    }

    let forbidden_hits: Vec<String> = case
        .forbidden_keywords
        .iter()
        .filter(|k| lowered.contains(&k.to_lowercase()))
        .map(|k| k.to_string())
        .collect();

    let coverage = if case.expected_keywords.is_empty() {
        1.0
    } else {
        found as f64 / case.expected_keywords.len() as f64
    };

    CaseScore {
        keyword_coverage: coverage,
        passed: missing.is_empty() && forbidden_hits.is_empty(),
        missing_keywords: missing,
        forbidden_hits,
    }
}

/// Result of one evaluated case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub category: String,
    pub name: String,
    pub prompt: String,
    pub response: String,
    pub score: CaseScore,
    pub latency_ms: u64,
    /// Backend error, when the request itself failed
    pub error: Option<String>,
}

/// Aggregate results for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub total: usize,
    pub passed: usize,
    pub pass_rate: f64,
}

/// Full evaluation report, serialized to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub timestamp: String,
    pub model: String,
    pub host: String,
    pub total_cases: usize,
    pub passed_cases: usize,
    pub pass_rate: f64,
    pub avg_latency_ms: u64,
    pub grade: Grade,
    pub categories: BTreeMap<String, CategoryResult>,
    pub cases: Vec<CaseResult>,
}

impl EvalReport {
    fn from_cases(model: &str, host: &str, results: Vec<CaseResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.score.passed).count();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };
        let avg_latency_ms = if total == 0 {
            0
        } else {
            results.iter().map(|r| r.latency_ms).sum::<u64>() / total as u64
        };

        let mut categories = BTreeMap::new();
        for category in CATEGORIES {
            let in_cat: Vec<_> = results.iter().filter(|r| r.category == *category).collect();
            if in_cat.is_empty() {
                continue;
            }
            let cat_passed = in_cat.iter().filter(|r| r.score.passed).count();
            categories.insert(
                category.to_string(),
                CategoryResult {
                    total: in_cat.len(),
                    passed: cat_passed,
                    pass_rate: cat_passed as f64 / in_cat.len() as f64,
                },
            );
        }

        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            model: model.to_string(),
            host: host.to_string(),
            total_cases: total,
            passed_cases: passed,
            pass_rate,
            avg_latency_ms,
            grade: Grade::from_pass_rate(pass_rate),
            categories,
            cases: results,
        }
    }

    /// Categories passing less than 70% of their cases
    pub fn weak_categories(&self) -> Vec<(&str, f64)> {
        self.categories
            .iter()
            .filter(|(_, r)| r.pass_rate < 0.7)
            .map(|(name, r)| (name.as_str(), r.pass_rate))
            .collect()
    }

    /// Write the report as pretty JSON and return the path
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let filename = format!(
            "eval_report_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(path)
    }

    /// Print a human-readable summary to stdout
    pub fn print_summary(&self) {
        println!("\nEvaluation Report");
        println!("=================");
        println!("Model: {} ({})", self.model, self.host);
        println!("Time:  {}", self.timestamp);
        println!();
        for (category, result) in &self.categories {
            println!(
                "  {:18} {}/{} passed ({:.0}%)",
                category,
                result.passed,
                result.total,
                result.pass_rate * 100.0
            );
        }
        println!();
        println!(
            "Overall: {}/{} passed ({:.0}%), avg response {} ms",
            self.passed_cases,
            self.total_cases,
            self.pass_rate * 100.0,
            self.avg_latency_ms
        );
        println!("Grade: {}", self.grade.describe());

        for case in self.cases.iter().filter(|c| !c.score.passed) {
            if let Some(err) = &case.error {
                println!("  FAILED {}: backend error: {}", case.name, err);
            } else {
                println!(
                    "  FAILED {}: missing: {}",
                    case.name,
                    case.score.missing_keywords.join(", ")
                );
            }
        }

        println!("\nRecommendations:");
        let weak = self.weak_categories();
        if weak.is_empty() {
            println!("  Performance is good across all categories");
        } else {
            for (category, rate) in weak {
                println!(
                    "  Focus on improving {} (currently {:.0}%)",
                    category,
                    rate * 100.0
                );
            }
        }
    }
}

/// Runs the case table against a live backend
pub struct Evaluator {
    client: ModelClient,
    enhancer: PromptEnhancer,
}

impl Evaluator {
    pub fn new(client: ModelClient) -> Self {
        Self {
            client,
            enhancer: PromptEnhancer::new(),
        }
    }

    /// Run every case sequentially and build the report
    pub async fn run_all(&self) -> EvalReport {
        let mut results = Vec::with_capacity(EVAL_CASES.len());

        for case in EVAL_CASES {
            info!("Evaluating: {} / {}", case.category, case.name);
            let prompt = self.enhancer.enhance(case.prompt);
            let started = Instant::now();
            let outcome = self.client.generate(&prompt).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            let (response, score, error) = match outcome {
                Ok(text) => {
                    let score = score_response(case, &text);
                    (text, score, None)
                }
                Err(e) => (
                    String::new(),
                    CaseScore {
                        keyword_coverage: 0.0,
                        missing_keywords: case
                            .expected_keywords
                            .iter()
                            .map(|k| k.to_string())
                            .collect(),
                        forbidden_hits: Vec::new(),
                        passed: false,
                    },
                    Some(e.to_string()),
                ),
            };

            results.push(CaseResult {
                category: case.category.to_string(),
                name: case.name.to_string(),
                prompt: case.prompt.to_string(),
                response,
                score,
                latency_ms,
                error,
            });
        }

        EvalReport::from_cases(self.client.model(), self.client.host(), results)
    }
}
