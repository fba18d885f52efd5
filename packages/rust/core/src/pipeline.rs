//! End-to-end `build` pipeline: directories → discovery → enrich → assemble → JSON file.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use autodict_discovery::{DiscoveryOptions, DiscoveryResult};
use autodict_shared::{CommandName, DictionaryEntry, PipelineConfig, Result};

use crate::assembler::{self, WriteResult};
use crate::enrichment::{self, DocumentationSource, EnrichmentProgress};

/// Result of the `build` pipeline.
#[derive(Debug)]
pub struct BuildResult {
    /// Unique commands found before filtering.
    pub discovered: usize,
    /// Entries written to the dictionary.
    pub emitted: usize,
    /// Commands without any description.
    pub excluded: usize,
    /// Commands whose processing failed.
    pub failed: usize,
    /// The written file.
    pub output: WriteResult,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once discovery has finished.
    fn discovered(&self, count: usize);
    /// Called after each command is enriched, in output order.
    fn command_enriched(&self, name: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn discovered(&self, _count: usize) {}
    fn command_enriched(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Discovery: list executables in the configured directories
/// 2. Enrichment: summary and manual lookups per command
/// 3. Assemble entries in name order
/// 4. Write the dictionary file
///
/// Only a failure to write the output is returned as an error.
#[instrument(skip_all, fields(output = %config.output.display(), concurrency = config.concurrency))]
pub async fn build_dictionary(
    config: &PipelineConfig,
    source: Arc<dyn DocumentationSource>,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    config.validate()?;
    let start = Instant::now();

    // --- Phase 1: Discovery ---
    progress.phase("Discovering commands");
    let discovery = list_commands(config);
    let discovered = discovery.len();
    progress.discovered(discovered);

    // --- Phase 2: Enrichment ---
    progress.phase("Fetching descriptions");
    let enrich_progress = PipelineEnrichmentProgress { inner: progress };
    let results = enrichment::enrich_all(
        source,
        &discovery.commands,
        config.concurrency,
        &enrich_progress,
    )
    .await;

    // --- Phase 3: Assemble ---
    progress.phase("Assembling dictionary");
    let assembled = assembler::assemble(results, &config.tags);

    // --- Phase 4: Write ---
    progress.phase("Writing dictionary");
    let output = assembler::write_dictionary(&config.output, &assembled.collection)?;

    let result = BuildResult {
        discovered,
        emitted: assembled.collection.len(),
        excluded: assembled.excluded,
        failed: assembled.failed,
        output,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        discovered = result.discovered,
        emitted = result.emitted,
        excluded = result.excluded,
        failed = result.failed,
        sha256 = %result.output.sha256,
        elapsed_ms = result.elapsed.as_millis(),
        "build pipeline complete"
    );

    Ok(result)
}

/// Discovery only.
pub fn list_commands(config: &PipelineConfig) -> DiscoveryResult {
    let opts = DiscoveryOptions {
        directories: config.directories.clone(),
    };
    autodict_discovery::discover(&opts)
}

/// Enrich one command and build its entry, or `None` when no description
/// was found.
pub async fn describe_command(
    source: &dyn DocumentationSource,
    name: &CommandName,
    tags: &[String],
) -> Option<DictionaryEntry> {
    let enrichment = enrichment::enrich(source, name).await;
    assembler::build_entry(name, enrichment, tags)
}

// ---------------------------------------------------------------------------
// Enrichment progress adapter
// ---------------------------------------------------------------------------

/// Adapts a `ProgressReporter` to the `EnrichmentProgress` interface.
struct PipelineEnrichmentProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl EnrichmentProgress for PipelineEnrichmentProgress<'_> {
    fn task_progress(&self, current: usize, total: usize, command: &str) {
        self.inner.command_enriched(command, current, total);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
