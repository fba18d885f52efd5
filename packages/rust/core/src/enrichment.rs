//! Per-command enrichment: documentation lookups and field resolution.
//!
//! Each command is looked up in two documentation services (a one-line
//! summary service and a full manual service). Their output is parsed into a
//! description and a usage example. Lookup failures never propagate; they
//! become [`Lookup`] values that drive the fallback chain.

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, instrument};

use autodict_manpage::{ManualPage, parse_summary};
use autodict_shared::{AutodictError, CommandName, Lookup, PipelineConfig, Result, Unavailable};

// ---------------------------------------------------------------------------
// Documentation sources
// ---------------------------------------------------------------------------

/// Provider of raw documentation text for a command.
#[async_trait]
pub trait DocumentationSource: Send + Sync {
    /// Raw output of the one-line summary service.
    async fn summary(&self, name: &CommandName) -> Lookup;
    /// Raw output of the full manual service.
    async fn manual(&self, name: &CommandName) -> Lookup;
}

/// Runs the documentation services as subprocesses (`<cmd> <name>`).
#[derive(Debug, Clone)]
pub struct SubprocessSource {
    summary_command: String,
    manual_command: String,
    timeout: Duration,
}

impl SubprocessSource {
    pub fn new(
        summary_command: impl Into<String>,
        manual_command: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            summary_command: summary_command.into(),
            manual_command: manual_command.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.summary_command.clone(),
            config.manual_command.clone(),
            config.timeout,
        )
    }
}

#[async_trait]
impl DocumentationSource for SubprocessSource {
    async fn summary(&self, name: &CommandName) -> Lookup {
        run_service(&self.summary_command, name, self.timeout).await
    }

    async fn manual(&self, name: &CommandName) -> Lookup {
        run_service(&self.manual_command, name, self.timeout).await
    }
}

/// Run `<program> <name>` and capture stdout.
///
/// Non-zero exit, spawn failure and timeout all map to
/// [`Lookup::Unavailable`]. The child is killed if the timeout fires.
async fn run_service(program: &str, name: &CommandName, timeout: Duration) -> Lookup {
    let mut cmd = Command::new(program);
    cmd.arg(name.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Err(_) => {
            debug!(program, command = %name, "lookup timed out");
            return Lookup::Unavailable(Unavailable::TimedOut(timeout));
        }
        Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
            return Lookup::Unavailable(Unavailable::NotInstalled);
        }
        Ok(Err(e)) => return Lookup::Unavailable(Unavailable::Spawn(e.to_string())),
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        return Lookup::Unavailable(Unavailable::Exit(output.status.code()));
    }

    Lookup::from_text(String::from_utf8_lossy(&output.stdout))
}

/// In-memory documentation keyed by command name.
///
/// Names without an entry behave like a service that exited with status 16.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    summaries: HashMap<String, String>,
    manuals: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, name: &str, output: &str) -> Self {
        self.summaries.insert(name.to_string(), output.to_string());
        self
    }

    pub fn with_manual(mut self, name: &str, output: &str) -> Self {
        self.manuals.insert(name.to_string(), output.to_string());
        self
    }

    fn lookup(map: &HashMap<String, String>, name: &CommandName) -> Lookup {
        map.get(name.as_str())
            .map(|text| Lookup::from_text(text.as_str()))
            .unwrap_or(Lookup::Unavailable(Unavailable::Exit(Some(16))))
    }
}

#[async_trait]
impl DocumentationSource for StaticSource {
    async fn summary(&self, name: &CommandName) -> Lookup {
        Self::lookup(&self.summaries, name)
    }

    async fn manual(&self, name: &CommandName) -> Lookup {
        Self::lookup(&self.manuals, name)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolved fields for a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    /// `None` means the command is excluded from the dictionary.
    pub description: Option<String>,
    /// Always non-empty.
    pub example: String,
}

/// Pick the description: summary first, then the NAME section.
pub fn resolve_description(summary: &Lookup, name_section: &Lookup) -> Option<String> {
    summary
        .text()
        .or_else(|| name_section.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Pick the example: a matching SYNOPSIS line, else `<name> --help`.
pub fn resolve_example(page: Option<&ManualPage>, name: &CommandName) -> String {
    page.and_then(|page| page.synopsis_example(name))
        .unwrap_or_else(|| name.help_example())
}

/// Look up and resolve one command.
#[instrument(skip_all, fields(command = %name))]
pub async fn enrich(source: &dyn DocumentationSource, name: &CommandName) -> Enrichment {
    let summary = source.summary(name).await.and_then(|out| parse_summary(&out));

    let manual = source.manual(name).await;
    let page = manual.text().map(ManualPage::parse);
    let name_section = match &page {
        Some(page) => page.name_section(),
        None => manual,
    };

    let description = resolve_description(&summary, &name_section);
    let example = resolve_example(page.as_ref(), name);

    debug!(
        ?summary,
        ?name_section,
        described = description.is_some(),
        "command enriched"
    );

    Enrichment {
        description,
        example,
    }
}

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// Enrich every name with at most `concurrency` commands in flight.
///
/// Results come back in the iteration order of `names`. A worker that fails
/// (panics, pool closed) yields an `Err` for its command only.
#[instrument(skip_all, fields(commands = names.len(), concurrency = concurrency))]
pub async fn enrich_all(
    source: Arc<dyn DocumentationSource>,
    names: &BTreeSet<CommandName>,
    concurrency: usize,
    progress: &dyn EnrichmentProgress,
) -> Vec<(CommandName, Result<Enrichment>)> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let total = names.len();

    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            let source = Arc::clone(&source);
            let sem = Arc::clone(&semaphore);
            let name = name.clone();

            tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| AutodictError::command(name.as_str(), e.to_string()))?;
                Ok::<_, AutodictError>(enrich(source.as_ref(), &name).await)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(total);

    for (i, (name, handle)) in names.iter().zip(handles).enumerate() {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) => Err(AutodictError::command(name.as_str(), e.to_string())),
        };

        if let Err(e) = &outcome {
            error!(command = %name, error = %e, "error processing command");
        }

        progress.task_progress(i + 1, total, name.as_str());
        results.push((name.clone(), outcome));
    }

    results
}

// ---------------------------------------------------------------------------
// Progress trait
// ---------------------------------------------------------------------------

/// Progress callback for enrichment operations.
pub trait EnrichmentProgress: Send + Sync {
    /// Called after each command finishes, in output order.
    fn task_progress(&self, current: usize, total: usize, command: &str);
}

/// No-op enrichment progress.
pub struct SilentEnrichmentProgress;

impl EnrichmentProgress for SilentEnrichmentProgress {
    fn task_progress(&self, _current: usize, _total: usize, _command: &str) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const FOO_MANUAL: &str = "FOO(1)\n\nNAME\n     foo - does a thing\n\nSYNOPSIS\n     foo [-x] file\n\n";

    fn names(list: &[&str]) -> BTreeSet<CommandName> {
        list.iter().map(|n| CommandName::new(*n)).collect()
    }

    #[test]
    fn summary_preferred_over_name_section() {
        let summary = Lookup::Found("list directory contents".into());
        let name = Lookup::Found("ls - list directory contents".into());
        assert_eq!(
            resolve_description(&summary, &name).as_deref(),
            Some("list directory contents")
        );
    }

    #[test]
    fn name_section_used_when_summary_missing() {
        let summary = Lookup::Unavailable(Unavailable::NothingAppropriate);
        let name = Lookup::Found("foo - does a thing".into());
        assert_eq!(
            resolve_description(&summary, &name).as_deref(),
            Some("foo - does a thing")
        );
    }

    #[test]
    fn both_missing_excludes() {
        let summary = Lookup::Malformed("no separator".into());
        let name = Lookup::Unavailable(Unavailable::TimedOut(Duration::from_secs(5)));
        assert_eq!(resolve_description(&summary, &name), None);
    }

    #[test]
    fn example_falls_back_to_help() {
        let foo = CommandName::new("foo");
        assert_eq!(resolve_example(None, &foo), "foo --help");

        let page = ManualPage::parse("SYNOPSIS\n     bar [-x]\n");
        assert_eq!(resolve_example(Some(&page), &foo), "foo --help");
    }

    #[tokio::test]
    async fn enrich_uses_summary_and_synopsis() {
        let source = StaticSource::new()
            .with_summary("foo", "foo (1) - summary text")
            .with_manual("foo", FOO_MANUAL);

        let result = enrich(&source, &CommandName::new("foo")).await;
        assert_eq!(result.description.as_deref(), Some("summary text"));
        assert_eq!(result.example, "foo [-x] file");
    }

    #[tokio::test]
    async fn enrich_falls_back_to_name_section() {
        let source = StaticSource::new()
            .with_summary("foo", "nothing appropriate.")
            .with_manual("foo", FOO_MANUAL);

        let result = enrich(&source, &CommandName::new("foo")).await;
        assert_eq!(result.description.as_deref(), Some("foo - does a thing"));
    }

    #[tokio::test]
    async fn enrich_without_documentation() {
        let source = StaticSource::new();
        let result = enrich(&source, &CommandName::new("zzznonexistentcmd")).await;
        assert_eq!(result.description, None);
        assert_eq!(result.example, "zzznonexistentcmd --help");
    }

    /// Answers after a per-name delay so completion order differs from input order.
    struct DelayedSource;

    #[async_trait]
    impl DocumentationSource for DelayedSource {
        async fn summary(&self, name: &CommandName) -> Lookup {
            let delay = match name.as_str() {
                "a" => 60,
                "b" => 30,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Lookup::Found(format!("{name} (1) - command {name}"))
        }

        async fn manual(&self, _name: &CommandName) -> Lookup {
            Lookup::Unavailable(Unavailable::Empty)
        }
    }

    #[tokio::test]
    async fn enrich_all_preserves_input_order() {
        let results = enrich_all(
            Arc::new(DelayedSource),
            &names(&["a", "b", "c"]),
            3,
            &SilentEnrichmentProgress,
        )
        .await;

        let order: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);

        let descriptions: Vec<String> = results
            .into_iter()
            .map(|(_, r)| r.unwrap().description.unwrap())
            .collect();
        assert_eq!(descriptions, ["command a", "command b", "command c"]);
    }

    struct PanickingSource;

    #[async_trait]
    impl DocumentationSource for PanickingSource {
        async fn summary(&self, name: &CommandName) -> Lookup {
            if name.as_str() == "bad" {
                panic!("documentation service exploded");
            }
            Lookup::Found(format!("{name} (1) - fine"))
        }

        async fn manual(&self, _name: &CommandName) -> Lookup {
            Lookup::Unavailable(Unavailable::Empty)
        }
    }

    #[tokio::test]
    async fn enrich_all_isolates_failures() {
        let results = enrich_all(
            Arc::new(PanickingSource),
            &names(&["alpha", "bad", "omega"]),
            2,
            &SilentEnrichmentProgress,
        )
        .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        match &results[1].1 {
            Err(AutodictError::Command { command, .. }) => assert_eq!(command, "bad"),
            other => panic!("expected command error, got {other:?}"),
        }
        assert!(results[2].1.is_ok());
    }

    struct RecordingProgress(Mutex<Vec<(usize, usize, String)>>);

    impl EnrichmentProgress for RecordingProgress {
        fn task_progress(&self, current: usize, total: usize, command: &str) {
            self.0.lock().unwrap().push((current, total, command.to_string()));
        }
    }

    #[tokio::test]
    async fn enrich_all_reports_progress() {
        let progress = RecordingProgress(Mutex::new(Vec::new()));
        enrich_all(
            Arc::new(StaticSource::new()),
            &names(&["x", "y"]),
            1,
            &progress,
        )
        .await;

        let seen = progress.0.into_inner().unwrap();
        assert_eq!(seen, vec![(1, 2, "x".into()), (2, 2, "y".into())]);
    }

    // Real subprocess tests ---------------------------------------------------

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_service_is_not_installed() {
        let lookup = run_service(
            "autodict-no-such-binary-4f2a",
            &CommandName::new("ls"),
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(lookup, Lookup::Unavailable(Unavailable::NotInstalled));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_service_reports_exit_status() {
        let lookup = run_service("false", &CommandName::new("ls"), Duration::from_secs(5)).await;
        assert_eq!(lookup, Lookup::Unavailable(Unavailable::Exit(Some(1))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_service_times_out() {
        let timeout = Duration::from_millis(200);
        let lookup = run_service("sleep", &CommandName::new("5"), timeout).await;
        assert_eq!(lookup, Lookup::Unavailable(Unavailable::TimedOut(timeout)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn service_stdout_is_captured() {
        let source = SubprocessSource::new("echo", "echo", Duration::from_secs(5));
        let lookup = source.manual(&CommandName::new("hello")).await;
        assert_eq!(lookup.text().map(str::trim), Some("hello"));

        // `echo ls` has no " - " separator, so the summary cannot be parsed.
        let result = enrich(&source, &CommandName::new("ls")).await;
        assert_eq!(result.description, None);
        assert_eq!(result.example, "ls --help");
    }
}
