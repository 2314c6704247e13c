use std::collections::HashSet;
use std::path::PathBuf;

use crate::client::TestManagementClient;
use crate::config::{Config, ConfigLoader, SeekerConfig, SeekerKind};
use crate::core::context::{ReportFile, ScanContext};
use crate::core::error::{Error, Result};
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::merge::MergeEngine;
use crate::model::{Attachment, CatalogTestCase};
use crate::report::{ReportParser, parser_for};
use crate::seeker::{KeyIndex, ResultSeeker, coalesce, create_seeker};
use crate::summary::{FileFailure, ScanOutcome, ScanSummary, SeekerFailure};
use crate::util::scan_files;

/// Builder for creating a [`Reconciler`] with a fluent API.
///
/// # Example
///
/// ```no_run
/// use report_reconciler::ReconcilerBuilder;
/// use report_reconciler::config::SeekerKind;
///
/// # fn main() -> report_reconciler::Result<()> {
/// let reconciler = ReconcilerBuilder::new()
///     .base_dir("target/surefire-reports")
///     .seeker(SeekerKind::JunitClassName, "**/TEST-*.xml")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ReconcilerBuilder {
    config: Option<Config>,
    base_dir: Option<PathBuf>,
    custom: Vec<(SeekerConfig, Box<dyn ResultSeeker>)>,
}

impl ReconcilerBuilder {
    /// Create a new builder with no configuration.
    pub fn new() -> Self {
        Self {
            config: None,
            base_dir: None,
            custom: Vec::new(),
        }
    }

    /// Use an explicit configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Load configuration from a TOML file, with profile and env overrides.
    pub fn from_config_file(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        self.config = Some(ConfigLoader::new().config_file(path).load()?);
        Ok(self)
    }

    /// Override the base directory.
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(path.into());
        self
    }

    /// Add a built-in seeker.
    pub fn seeker(mut self, kind: SeekerKind, include: impl Into<String>) -> Self {
        self.config
            .get_or_insert_with(Config::default)
            .seekers
            .push(SeekerConfig::new(kind, include));
        self
    }

    /// Add a seeker implementation of your own. Its format decides which
    /// parser reads the files matched by `settings.include`.
    pub fn custom_seeker<S: ResultSeeker + 'static>(
        mut self,
        settings: SeekerConfig,
        seeker: S,
    ) -> Self {
        self.custom.push((settings, Box::new(seeker)));
        self
    }

    /// Build the reconciler.
    pub fn build(self) -> Result<Reconciler> {
        let mut config = self.config.unwrap_or_default();
        if let Some(base_dir) = self.base_dir {
            config.base_dir = base_dir;
        }
        config.validate()?;

        let mut seekers = Vec::new();
        for settings in &config.seekers {
            seekers.push(ConfiguredSeeker::new(
                settings.clone(),
                create_seeker(settings.kind),
            )?);
        }
        for (settings, seeker) in self.custom {
            seekers.push(ConfiguredSeeker::new(settings, seeker)?);
        }
        if seekers.is_empty() {
            return Err(Error::MissingConfig("seekers".to_string()));
        }

        Ok(Reconciler {
            ctx: ScanContext::new(config),
            seekers,
        })
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct ConfiguredSeeker {
    settings: SeekerConfig,
    seeker: Box<dyn ResultSeeker>,
    parser: Box<dyn ReportParser>,
}

impl ConfiguredSeeker {
    fn new(settings: SeekerConfig, seeker: Box<dyn ResultSeeker>) -> Result<Self> {
        let parser = parser_for(seeker.format())?;
        Ok(Self {
            settings,
            seeker,
            parser,
        })
    }
}

/// Tracks which files did what across all seekers of one scan.
#[derive(Default)]
struct FileTally {
    found: HashSet<PathBuf>,
    matched: HashSet<PathBuf>,
    failed: HashSet<PathBuf>,
    failures: Vec<FileFailure>,
    seeker_failures: Vec<SeekerFailure>,
}

impl FileTally {
    fn fail(&mut self, file: &ReportFile, seeker: SeekerKind, error: &Error) {
        tracing::warn!(
            file = %file.relative.display(),
            seeker = %seeker,
            error = %error,
            "skipping report"
        );
        self.failed.insert(file.relative.clone());
        self.failures.push(FileFailure {
            path: file.relative.clone(),
            seeker,
            message: error.to_string(),
        });
    }
}

/// Configured reconciler, ready to scan.
pub struct Reconciler {
    ctx: ScanContext,
    seekers: Vec<ConfiguredSeeker>,
}

impl Reconciler {
    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    /// Scan the base directory and merge every match against `catalog`.
    ///
    /// Unreadable reports are logged and listed in the summary, as are
    /// seekers whose files cannot be listed. The scan only fails when the
    /// base directory itself is missing or not a directory.
    pub fn scan(&self, catalog: &[CatalogTestCase]) -> Result<ScanOutcome> {
        let base_dir = &self.ctx.base_dir;
        if !base_dir.exists() {
            return Err(Error::FileNotFound(base_dir.clone()));
        }
        if !base_dir.is_dir() {
            return Err(Error::NotADirectory(base_dir.clone()));
        }

        let mut engine = MergeEngine::new();
        let mut tally = FileTally::default();

        for configured in &self.seekers {
            if let Err(e) = self.run_seeker(configured, catalog, &mut engine, &mut tally) {
                tracing::warn!(
                    seeker = configured.seeker.name(),
                    include = %configured.settings.include,
                    error = %e,
                    "seeker skipped"
                );
                tally.seeker_failures.push(SeekerFailure {
                    seeker: configured.seeker.kind(),
                    include: configured.settings.include.clone(),
                    message: e.to_string(),
                });
            }
        }

        let wrappers = engine.finish();
        let mut summary = ScanSummary {
            files_found: tally.found.len(),
            files_matched: tally.matched.len(),
            files_failed: tally.failed.len(),
            failures: tally.failures,
            seeker_failures: tally.seeker_failures,
            ..Default::default()
        };
        summary.count_test_cases(catalog, &wrappers);

        tracing::info!(
            files_found = summary.files_found,
            files_matched = summary.files_matched,
            files_failed = summary.files_failed,
            matched = summary.test_cases_matched,
            unmatched = summary.test_cases_unmatched,
            "scan complete"
        );
        Ok(ScanOutcome { wrappers, summary })
    }

    fn run_seeker(
        &self,
        configured: &ConfiguredSeeker,
        catalog: &[CatalogTestCase],
        engine: &mut MergeEngine,
        tally: &mut FileTally,
    ) -> Result<()> {
        let settings = &configured.settings;
        let files = scan_files(&self.ctx.base_dir, &settings.include)?;
        tally.found.extend(files.iter().cloned());

        let key_field = self.ctx.config.key_field_for(settings);
        let index = KeyIndex::build(catalog, key_field);
        if index.is_empty() {
            tracing::info!(
                seeker = configured.seeker.name(),
                key_field,
                "no test case declares keys; seeker skipped"
            );
            return Ok(());
        }

        tracing::debug!(
            seeker = configured.seeker.name(),
            files = files.len(),
            keys = index.len(),
            "running seeker"
        );

        #[cfg(feature = "progress")]
        let progress = {
            let bar = indicatif::ProgressBar::new(files.len() as u64);
            bar.set_message(configured.seeker.name().to_string());
            bar
        };

        for relative in files {
            let file = self.ctx.report_file(relative);
            if self.process_file(configured, &file, catalog, &index, engine, tally) {
                tally.matched.insert(file.relative.clone());
            }
            #[cfg(feature = "progress")]
            progress.inc(1);
        }

        #[cfg(feature = "progress")]
        progress.finish_and_clear();
        Ok(())
    }

    /// Parse one file and record its matches. Returns whether anything matched.
    fn process_file(
        &self,
        configured: &ConfiguredSeeker,
        file: &ReportFile,
        catalog: &[CatalogTestCase],
        index: &KeyIndex,
        engine: &mut MergeEngine,
        tally: &mut FileTally,
    ) -> bool {
        let kind = configured.seeker.kind();
        let units = configured
            .parser
            .parse(&file.path)
            .and_then(|report| configured.seeker.units(&self.ctx, file, &report));
        let units = match units {
            Ok(units) => coalesce(units),
            Err(e) => {
                tally.fail(file, kind, &e);
                return false;
            }
        };

        let mut report_attachment: Option<Attachment> = None;
        let mut attached_to: HashSet<u32> = HashSet::new();
        let mut matched = false;

        for unit in &units {
            for &position in index.lookup(&unit.identity) {
                let test_case = &catalog[position];
                let mut attachments = unit.attachments.clone();

                if configured.settings.attach_report && attached_to.insert(test_case.id) {
                    if report_attachment.is_none() {
                        report_attachment = self.report_attachment(configured, file);
                    }
                    attachments.extend(report_attachment.clone());
                }

                tracing::debug!(
                    file = %file.relative.display(),
                    key = %unit.identity,
                    test_case = test_case.id,
                    status = %unit.status,
                    "matched"
                );
                engine.record(
                    test_case,
                    &unit.identity,
                    unit.status,
                    &unit.notes,
                    attachments,
                );
                matched = true;
            }
        }
        matched
    }

    fn report_attachment(
        &self,
        configured: &ConfiguredSeeker,
        file: &ReportFile,
    ) -> Option<Attachment> {
        let description = format!(
            "{} report {}",
            configured.seeker.format(),
            file.relative.display()
        );
        match Attachment::from_path(&file.path, file.file_name(), description) {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                tracing::warn!(
                    file = %file.relative.display(),
                    error = %e,
                    "cannot attach report"
                );
                None
            }
        }
    }

    /// Report the outcome of a scan through `client`.
    pub fn dispatch(
        &self,
        outcome: &ScanOutcome,
        client: &dyn TestManagementClient,
    ) -> DispatchReport {
        Dispatcher::new(client, self.ctx.config.dispatch.clone()).dispatch(&outcome.wrappers)
    }
}
