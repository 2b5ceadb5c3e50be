//! urlsup_action library: run the `urlsup` link checker and turn its report into
//! a CI verdict.
//!
//! This library wraps one checker run (or several sharded runs), normalizes
//! whatever report shape the checker printed, decides pass/fail under a
//! tolerance policy, and derives one annotation per failing URL for the
//! GitHub Actions surfaces in [`render`].
//!
//! # Example
//!
//! ```no_run
//! use urlsup_action::{evaluate_exit_code, run, InvocationParameters, SystemExecutor};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let params = InvocationParameters {
//!     files: vec!["docs".to_string(), "README.md".to_string()],
//!     ..Default::default()
//! };
//!
//! let report = run(&params, &SystemExecutor::new()).await?;
//! println!(
//!     "{} URLs, success rate {:.1}%",
//!     report.outcome.report().total_urls(),
//!     report.outcome.success_rate()
//! );
//! std::process::exit(evaluate_exit_code(&report.outcome, true));
//! # }
//! ```
//!
//! # Requirements
//!
//! Runs require a Tokio runtime. Normalizing, classifying and annotating are
//! plain synchronous functions and can be used on a report string directly:
//!
//! ```
//! use urlsup_action::{classify, derive, normalize, TolerancePolicy};
//!
//! let raw = r#"{"status":"failure","urls":{"total_found":2,"unique":2},
//!     "issues":[{"url":"https://example.com/gone","file":"README.md","line":3,"status_code":404}]}"#;
//! let report = normalize(raw).unwrap();
//! let annotations = derive(report.records());
//! let outcome = classify(report, &TolerancePolicy::strict());
//! assert!(!outcome.passed());
//! assert_eq!(annotations.len(), 1);
//! ```

pub mod annotate;
pub mod classify;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod invocation;
pub mod render;
pub mod report;
pub mod run;
pub mod utils;

// Re-export public API
pub use annotate::{derive, Annotation, Cause, Severity};
pub use classify::{classify, Outcome, TolerancePolicy};
pub use config::{Config, FailureThreshold, InvocationParameters, LogFormat, LogLevel, Opt};
pub use error_handling::{ParseError, RunError};
pub use invocation::{Invocation, ProcessExecutor, ProcessOutput, SystemExecutor};
pub use report::{normalize, CanonicalReport, UrlOutcome, UrlRecord};
pub use run::{evaluate_exit_code, exit_code_for_error, run, run_sharded, RunReport};
