//! Ingestion pipeline.
//!
//! Documents are processed strictly in input order and segments in index
//! order. Each stored segment is written immediately; the dedup table is
//! saved once at the end of the run, or before an aborting error.

use crate::config::AuroraConfig;
use crate::llm::LlmProvider;
use crate::models::{IngestLogEntry, IngestReport, IngestStatus, MemoryItem};
use crate::services::classifier::{Classification, Classifier, MemoryClassifier, Provenance};
use crate::services::deduplication::DedupStore;
use crate::services::segmenter::Segmenter;
use crate::services::validation::{DocumentValidator, ValidDocument, read_data_files};
use crate::storage::{FilesystemStore, IngestLog, MemoryStore};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Orchestrates segmentation, deduplication, classification and storage.
pub struct IngestPipeline {
    store: Arc<dyn MemoryStore>,
    segmenter: Segmenter,
    classifier: Arc<dyn Classifier>,
    validator: DocumentValidator,
    log: IngestLog,
    dedup_path: PathBuf,
    data_dir: PathBuf,
}

impl IngestPipeline {
    /// Creates a pipeline over explicit collaborators.
    ///
    /// The ingest log and dedup table live next to each other under
    /// `memory_dir`, as in [`AuroraConfig`].
    #[must_use]
    pub fn new(
        store: Arc<dyn MemoryStore>,
        segmenter: Segmenter,
        classifier: Arc<dyn Classifier>,
        memory_dir: impl AsRef<Path>,
    ) -> Self {
        let config = AuroraConfig::default().with_memory_dir(memory_dir.as_ref());
        Self {
            store,
            segmenter,
            classifier,
            validator: DocumentValidator,
            log: IngestLog::new(config.ingest_log_path()),
            dedup_path: config.dedup_path(),
            data_dir: config.data_dir,
        }
    }

    /// Creates a filesystem-backed pipeline from configuration.
    ///
    /// `llm` is used for splitting and classification as the feature flags
    /// allow.
    #[must_use]
    pub fn from_config(config: &AuroraConfig, llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self {
            store: Arc::new(FilesystemStore::new(&config.memory_dir)),
            segmenter: Segmenter::from_config(config, llm.clone()),
            classifier: Arc::new(MemoryClassifier::from_config(config, llm)),
            validator: DocumentValidator,
            log: IngestLog::new(config.ingest_log_path()),
            dedup_path: config.dedup_path(),
            data_dir: config.data_dir.clone(),
        }
    }

    /// Sets the directory scanned by [`IngestPipeline::run_from_data_dir`].
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Returns the ingest log.
    #[must_use]
    pub const fn log(&self) -> &IngestLog {
        &self.log
    }

    /// Ingests every valid document found in the data directory.
    ///
    /// # Errors
    ///
    /// See [`IngestPipeline::run`].
    pub fn run_from_data_dir(&self) -> Result<IngestReport> {
        let files = read_data_files(&self.data_dir)?;
        if files.is_empty() {
            tracing::info!(path = %self.data_dir.display(), "No documents to ingest");
        }
        self.run(&files)
    }

    /// Ingests `files` in order.
    ///
    /// Invalid documents are skipped and classification failures degrade to
    /// `unclassified`; neither aborts the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory store cannot be listed or written, or
    /// if the dedup table cannot be saved.
    #[instrument(skip(self, files), fields(documents = files.len()))]
    pub fn run(&self, files: &[PathBuf]) -> Result<IngestReport> {
        let mut dedup = DedupStore::load(&self.dedup_path, self.store.as_ref())?;
        let mut report = IngestReport::default();

        for path in files {
            report.documents_seen += 1;
            let document = match self.validator.validate(path) {
                Ok(document) => document,
                Err(rejection) => {
                    let file = display_name(path);
                    tracing::info!(file = %file, reason = %rejection, "Ignoring document");
                    report.documents_ignored += 1;
                    metrics::counter!("ingest_segments_total", "status" => "ignored").increment(1);
                    self.append_log(
                        &IngestLogEntry::new(file, IngestStatus::Ignored)
                            .with_reason(rejection.to_string()),
                    );
                    continue;
                },
            };

            if let Err(e) = self.ingest_document(&document, &mut dedup, &mut report) {
                if let Err(save_err) = dedup.save() {
                    tracing::warn!(error = %save_err, "Failed to save dedup table after error");
                }
                return Err(e);
            }
        }

        dedup.save()?;
        tracing::info!(
            documents = report.documents_seen,
            ignored = report.documents_ignored,
            stored = report.total_stored(),
            duplicates = report.duplicates,
            errors = report.errors,
            "Ingestion complete"
        );
        Ok(report)
    }

    fn ingest_document(
        &self,
        document: &ValidDocument,
        dedup: &mut DedupStore,
        report: &mut IngestReport,
    ) -> Result<()> {
        let segments = self.segmenter.segment(&document.content);
        let total = segments.len().max(1);

        for (position, segment) in segments.into_iter().enumerate() {
            let index = position + 1;
            let hash = DedupStore::hash(&segment.text);

            if let Some(existing) = dedup.get(&hash) {
                tracing::debug!(file = %document.file_name, segment = index, dup_of = %existing.file, "Duplicate segment");
                report.duplicates += 1;
                metrics::counter!("ingest_segments_total", "status" => "duplicate").increment(1);
                self.append_log(
                    &IngestLogEntry::new(&document.file_name, IngestStatus::Duplicate)
                        .with_segment(index, total)
                        .with_dup_of(existing.clone()),
                );
                continue;
            }

            let classification = match segment.valid_category_hint() {
                Some(category) => Classification::ok(category, Provenance::Splitter),
                None => self.classifier.classify(&segment.text),
            };
            let category = classification.category();

            let speaker = segment.provenance_hint;
            let item = MemoryItem::new(segment.text, category, &document.file_name);
            let file_name = item.file_name(index);
            let path = self.store.write(category, &file_name, &item.text)?;
            let stored_name = path
                .file_name()
                .map_or_else(|| file_name.clone(), |n| n.to_string_lossy().into_owned());
            report.record_stored(category);

            let mut entry = IngestLogEntry::new(&document.file_name, IngestStatus::Ok)
                .with_segment(index, total)
                .with_category(category)
                .with_source(classification.provenance.as_str())
                .with_speaker(speaker);
            if stored_name != file_name {
                entry = entry.with_stored_as(stored_name.as_str());
            }
            dedup.record(hash, stored_name, category);
            match &classification.result {
                Ok(_) => {
                    tracing::debug!(file = %document.file_name, segment = index, category = %category, "Stored segment");
                    metrics::counter!("ingest_segments_total", "status" => "ok").increment(1);
                },
                Err(error) => {
                    tracing::warn!(file = %document.file_name, segment = index, error = %error, "Classification failed, stored as unclassified");
                    report.errors += 1;
                    metrics::counter!("ingest_segments_total", "status" => "error").increment(1);
                    entry.status = IngestStatus::Error;
                    entry = entry.with_error(error.to_string());
                },
            }
            self.append_log(&entry);
        }
        Ok(())
    }

    fn append_log(&self, entry: &IngestLogEntry) {
        if let Err(e) = self.log.append(entry) {
            tracing::warn!(error = %e, path = %self.log.path().display(), "Failed to append ingest log");
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::storage::{InMemoryStore, ManualClock};
    use tempfile::TempDir;

    struct Fixed(Category);

    impl Classifier for Fixed {
        fn classify(&self, _text: &str) -> Classification {
            Classification::ok(self.0, Provenance::Model)
        }
    }

    fn pipeline(dir: &TempDir, classifier: Arc<dyn Classifier>) -> (IngestPipeline, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new(Arc::new(ManualClock::new(10.0))));
        let pipeline = IngestPipeline::new(store.clone(), Segmenter::new(), classifier, dir.path());
        (pipeline, store)
    }

    fn source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_stores_each_segment() {
        let dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline(&dir, Arc::new(Fixed(Category::LongTerm)));
        let doc = source(&dir, "chat_01_02_2024.txt", "primeiro paragrafo\n\nsegundo paragrafo");

        let report = pipeline.run(&[doc]).unwrap();
        assert_eq!(report.stored_in(Category::LongTerm), 2);
        let names: Vec<_> = store
            .list(Category::LongTerm)
            .unwrap()
            .iter()
            .map(crate::storage::StoredFile::file_name)
            .collect();
        assert_eq!(
            names,
            vec!["long_term_chat_01_02_2024_part1.txt", "long_term_chat_01_02_2024_part2.txt"]
        );
    }

    #[test]
    fn test_classification_error_degrades_to_unclassified() {
        let dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline(&dir, Arc::new(MemoryClassifier::heuristic_only()));
        let doc = source(&dir, "chat_01_02_2024.txt", "algo sem categoria clara");

        let report = pipeline.run(&[doc]).unwrap();
        assert_eq!(report.errors, 1);
        assert_eq!(store.list(Category::Unclassified).unwrap().len(), 1);

        let log = pipeline.log().read_all().unwrap();
        assert_eq!(log[0].status, IngestStatus::Error);
        assert_eq!(log[0].category, Some(Category::Unclassified));
        assert_eq!(log[0].error.as_deref(), Some("no_model_configured"));
        assert_eq!(log[0].source.as_deref(), Some("model"));
    }

    #[test]
    fn test_duplicates_within_a_run() {
        let dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline(&dir, Arc::new(Fixed(Category::ShortTerm)));
        let doc = source(
            &dir,
            "chat_01_02_2024.txt",
            "mesmo paragrafo aqui\n\nmesmo paragrafo aqui",
        );

        let report = pipeline.run(&[doc]).unwrap();
        assert_eq!(report.total_stored(), 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(store.len(), 1);

        let log = pipeline.log().read_all().unwrap();
        let dup = log[1].dup_of.as_ref().unwrap();
        assert_eq!(dup.file, "short_term_chat_01_02_2024_part1.txt");
        assert_eq!(dup.category, Category::ShortTerm);
    }

    #[test]
    fn test_invalid_document_logged_and_skipped() {
        let dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline(&dir, Arc::new(Fixed(Category::ShortTerm)));
        let bad = source(&dir, "sem_data.txt", "conteudo valido mas nome ruim");
        let good = source(&dir, "ok_03_04_2024.txt", "conteudo valido aqui");

        let report = pipeline.run(&[bad, good]).unwrap();
        assert_eq!(report.documents_seen, 2);
        assert_eq!(report.documents_ignored, 1);
        assert_eq!(store.len(), 1);

        let log = pipeline.log().read_all().unwrap();
        assert_eq!(log[0].status, IngestStatus::Ignored);
        assert_eq!(log[0].reason.as_deref(), Some("invalid_filename"));
    }

    #[test]
    fn test_dedup_table_saved() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _store) = pipeline(&dir, Arc::new(Fixed(Category::Identity)));
        let doc = source(&dir, "eu_05_06_2024.txt", "meu nome e Carla Dias");

        pipeline.run(&[doc]).unwrap();
        let saved = std::fs::read_to_string(dir.path().join("dedup_index.json")).unwrap();
        assert!(saved.contains(&DedupStore::hash("meu nome e Carla Dias")));
        assert!(saved.contains("identity_eu_05_06_2024_part1.txt"));
    }
}
