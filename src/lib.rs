/*!
 * # dirtrans - Directory Name Translation into CSV Collections
 *
 * A Rust library that groups text files by the name of the folder they live in,
 * translates every folder name into an ASCII label with an LLM, and writes one
 * CSV per label holding the files of that folder.
 *
 * ## Features
 *
 * - Translate folder names using various AI providers:
 *   - OpenAI API
 *   - Anthropic API
 *   - Ollama (local LLM)
 *   - LM Studio (OpenAI-compatible local server)
 * - Single-item warm-up followed by batched requests with a shrinking batch ladder
 * - Idempotent output: an existing CSV is never rewritten
 * - Resume from an index or from a SQLite checkpoint
 * - Heartbeat log lines or a progress bar while the run is going
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `grouper`: Discovery and grouping of input files by parent folder
 * - `translation`: Translation client, batch response parsing and rate-limit backoff
 * - `providers`: Client implementations for various LLM providers
 * - `output`: Label to CSV path resolution
 * - `writer`: Atomic CSV writing
 * - `scheduler`: Warm-up and batch state machine
 * - `reporter`: Heartbeat task
 * - `database`: Checkpoint persistence
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod grouper;
pub mod language_utils;
pub mod output;
pub mod providers;
pub mod reporter;
pub mod scheduler;
pub mod translation;
pub mod writer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, BatchParseError, ProviderError};
pub use grouper::GroupedInput;
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use output::OutputResolver;
pub use scheduler::{BatchScheduler, Phase, RunSummary, SchedulerStatus};
pub use translation::{TranslationClient, Translator};
pub use writer::WriteOutcome;
