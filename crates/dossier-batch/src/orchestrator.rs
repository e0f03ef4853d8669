//! Batch orchestration
//!
//! Drives every file of a batch through Gate → Extraction → Truncation →
//! Analysis with bounded parallelism and per-file failure isolation: one
//! file's failure never aborts the batch, and the batch always returns a
//! report. Results land in pre-sized slots indexed by submission order, so
//! the report order is deterministic no matter how completion interleaves.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::Instant;

use dossier_analyzer::Analyzer;
use dossier_core::{
    AnalysisErrorKind, AnalysisRecord, BatchConfig, BatchFile, BatchReport, DocumentAnalysis,
    DossierError, Relevance, Result, TextExtractor,
};
use dossier_extract::{truncate_text, FormatGate};

use crate::{crossref, overview};

/// Batch processor over the extraction and inference backends
pub struct BatchProcessor {
    gate: FormatGate,
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<Analyzer>,
    config: BatchConfig,
}

impl BatchProcessor {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<Analyzer>,
        config: BatchConfig,
    ) -> Self {
        Self {
            gate: FormatGate::new(config.max_file_size),
            extractor,
            analyzer,
            config,
        }
    }

    /// Process one batch and assemble the report
    ///
    /// The only batch-fatal condition is an empty file list; every per-file
    /// error is recorded in the report instead.
    pub async fn process(&self, files: Vec<BatchFile>) -> Result<BatchReport> {
        if files.is_empty() {
            return Err(DossierError::EmptyBatch);
        }

        let started = std::time::Instant::now();
        let deadline = Instant::now() + Duration::from_secs(self.config.deadline_secs);
        let total_files = files.len();

        tracing::info!(total_files, "batch started");

        // Arena slots indexed by submission order: each worker writes only
        // its own slot, and the report order never depends on completion
        // order.
        let mut slots: Vec<Option<AnalysisRecord>> = Vec::with_capacity(total_files);
        slots.resize_with(total_files, || None);

        let mut stream = futures::stream::iter(
            files.into_iter().enumerate().map(move |(id, file)| async move {
                (id, self.process_file(id, file, deadline).await)
            }),
        )
        .buffer_unordered(self.config.max_parallel.max(1));

        while let Some((id, record)) = stream.next().await {
            slots[id] = Some(record);
        }
        drop(stream);

        let results: Vec<AnalysisRecord> = slots.into_iter().flatten().collect();
        debug_assert_eq!(results.len(), total_files);

        let processed = results.iter().filter(|r| r.success).count();
        let failed = total_files - processed;

        let cross_references = crossref::build_cross_references(&results);
        let overview = overview::build_overview(&results, &cross_references);

        let total_time_sec = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;

        tracing::info!(
            total_files,
            processed,
            failed,
            cross_references = cross_references.len(),
            total_time_sec,
            "batch complete"
        );

        Ok(BatchReport {
            total_files,
            processed,
            failed,
            total_time_sec,
            model: self.analyzer.model().to_string(),
            results,
            cross_references,
            overview,
        })
    }

    /// Per-file state machine: Submitted → Gated → Extracted → Analyzed →
    /// {Succeeded, Failed}. Always returns a record.
    async fn process_file(&self, id: usize, file: BatchFile, deadline: Instant) -> AnalysisRecord {
        let filename = file.filename.clone();

        // Submitted → Gated. Pure and instant, so it runs outside the
        // deadline; rejected files never reach extraction or inference.
        if let Err(error) = self.gate.admit(&filename, file.byte_len()) {
            return record_failure(id, &filename, error);
        }

        match tokio::time::timeout_at(deadline, self.extract_and_analyze(file)).await {
            Ok(Ok((relevance, analysis, truncated))) => {
                AnalysisRecord::succeeded(id, filename, relevance, analysis, truncated)
            }
            Ok(Err(error)) => record_failure(id, &filename, error),
            Err(_elapsed) => record_failure(id, &filename, DossierError::InferenceTimeout),
        }
    }

    async fn extract_and_analyze(
        &self,
        file: BatchFile,
    ) -> Result<(Relevance, DocumentAnalysis, bool)> {
        let BatchFile { filename, bytes } = file;

        // Gated → Extracted, on the blocking pool: the parsers are CPU-bound
        let extractor = self.extractor.clone();
        let extract_name = filename.clone();
        let text = tokio::task::spawn_blocking(move || extractor.extract(&extract_name, &bytes))
            .await
            .map_err(|e| DossierError::ExtractionFailure(format!("extraction task: {e}")))??;

        let bounded = truncate_text(text, self.config.max_text_chars);
        if bounded.truncated {
            tracing::debug!(filename, max_chars = self.config.max_text_chars, "text truncated");
        }

        // Extracted → Analyzed
        let parsed = self.analyzer.analyze_document(&filename, &bounded.text).await?;

        Ok((parsed.relevance, parsed.analysis, bounded.truncated))
    }
}

fn record_failure(id: usize, filename: &str, error: DossierError) -> AnalysisRecord {
    let kind = error.kind().unwrap_or(AnalysisErrorKind::InferenceError);
    tracing::warn!(filename, %kind, error = %error, "file failed");
    AnalysisRecord::failed(id, filename, kind, error.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dossier_core::{config::TokenBudgets, InferenceClient};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Extractor stub: hands the bytes back as text, counting invocations
    struct StubExtractor {
        calls: AtomicUsize,
    }

    impl StubExtractor {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl TextExtractor for StubExtractor {
        fn extract(&self, _filename: &str, bytes: &[u8]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    /// What the stub inference backend does for a given file
    #[derive(Clone)]
    enum Behavior {
        /// Complete with the given entity line after an optional delay
        Companies(&'static str, Duration),
        /// Fail with a timeout
        TimeOut,
        /// Return an uninterpretable completion
        Garbage,
    }

    /// Inference stub keyed on the filename embedded in the prompt
    struct StubClient {
        behaviors: HashMap<&'static str, Behavior>,
        calls: AtomicUsize,
    }

    impl StubClient {
        fn new(behaviors: Vec<(&'static str, Behavior)>) -> Arc<Self> {
            Arc::new(Self {
                behaviors: behaviors.into_iter().collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl InferenceClient for StubClient {
        async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let behavior = self
                .behaviors
                .iter()
                .find(|(filename, _)| prompt.contains(*filename))
                .map(|(_, b)| b.clone())
                .unwrap_or(Behavior::Companies("keine", Duration::ZERO));

            match behavior {
                Behavior::Companies(companies, delay) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(format!(
                        "KATEGORIE: Rechnung\nRELEVANZ: hoch\nZUSAMMENFASSUNG:\nEin Dokument.\n\
                         FIRMEN: {companies}\nPERSONEN: keine\nGELDBETRAEGE: keine\nDATEN: keine\n\
                         IBANS: keine\nSTEUERNUMMERN: keine\nAUFFAELLIGKEITEN: keine"
                    ))
                }
                Behavior::TimeOut => Err(DossierError::InferenceTimeout),
                Behavior::Garbage => Ok("Völlig unbrauchbare Antwort ohne Struktur".to_string()),
            }
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    fn processor(
        extractor: Arc<StubExtractor>,
        client: Arc<StubClient>,
        config: BatchConfig,
    ) -> BatchProcessor {
        let analyzer = Arc::new(Analyzer::new(client, TokenBudgets::default()));
        BatchProcessor::new(extractor, analyzer, config)
    }

    fn txt(filename: &str) -> BatchFile {
        BatchFile::new(filename, format!("Inhalt von {filename}").into_bytes())
    }

    #[tokio::test]
    async fn test_empty_batch_is_fatal() {
        let result = processor(StubExtractor::new(), StubClient::new(vec![]), BatchConfig::default())
            .process(vec![])
            .await;
        assert!(matches!(result, Err(DossierError::EmptyBatch)));
    }

    #[tokio::test]
    async fn test_gated_file_never_reaches_extraction_or_inference() {
        let extractor = StubExtractor::new();
        let client = StubClient::new(vec![]);
        let proc = processor(extractor.clone(), client.clone(), BatchConfig::default());

        let report = proc
            .process(vec![BatchFile::new("malware.exe", vec![0u8; 64])])
            .await
            .unwrap();

        assert_eq!(report.total_files, 1);
        assert_eq!(report.processed, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.results[0].error_kind,
            Some(AnalysisErrorKind::UnsupportedFormat)
        );
        // The whole point of the gate: zero downstream work
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_file_fails_but_batch_continues() {
        let extractor = StubExtractor::new();
        let client = StubClient::new(vec![]);
        let proc = processor(extractor.clone(), client.clone(), BatchConfig::default());

        let oversized = BatchFile::new("dump.pdf", vec![0u8; 40 * 1024 * 1024]);
        let report = proc
            .process(vec![txt("a.txt"), oversized, txt("b.txt")])
            .await
            .unwrap();

        assert_eq!(report.total_files, 3);
        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 1);

        // Results stay in submission order
        assert_eq!(report.results[0].filename, "a.txt");
        assert_eq!(report.results[1].filename, "dump.pdf");
        assert_eq!(report.results[2].filename, "b.txt");

        assert!(report.results[0].success);
        assert_eq!(
            report.results[1].error_kind,
            Some(AnalysisErrorKind::FileTooLarge)
        );
        assert!(report.results[2].success);

        // Only the two admitted files were extracted and analyzed
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_inference_timeout_isolated_to_one_file() {
        let client = StubClient::new(vec![("slow.txt", Behavior::TimeOut)]);
        let proc = processor(StubExtractor::new(), client, BatchConfig::default());

        let files = vec![
            txt("a.txt"),
            txt("b.txt"),
            txt("slow.txt"),
            txt("c.txt"),
            txt("d.txt"),
        ];
        let report = proc.process(files).await.unwrap();

        assert_eq!(report.total_files, 5);
        assert_eq!(report.processed, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.results[2].error_kind,
            Some(AnalysisErrorKind::InferenceTimeout)
        );
        // The overview still synthesizes over the four successes
        assert!(report.overview.contains("4 erfolgreich analysiert"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_recorded_per_file() {
        let client = StubClient::new(vec![("wirr.txt", Behavior::Garbage)]);
        let proc = processor(StubExtractor::new(), client, BatchConfig::default());

        let report = proc.process(vec![txt("wirr.txt"), txt("ok.txt")]).await.unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(
            report.results[0].error_kind,
            Some(AnalysisErrorKind::ParseFailure)
        );
        assert!(report.results[1].success);
    }

    #[tokio::test]
    async fn test_cross_references_for_shared_company() {
        let client = StubClient::new(vec![
            ("eins.txt", Behavior::Companies("ABC GmbH", Duration::ZERO)),
            ("zwei.txt", Behavior::Companies("abc   GMBH", Duration::ZERO)),
            ("drei.txt", Behavior::Companies("Andere AG", Duration::ZERO)),
        ]);
        let proc = processor(StubExtractor::new(), client, BatchConfig::default());

        let report = proc
            .process(vec![txt("eins.txt"), txt("zwei.txt"), txt("drei.txt")])
            .await
            .unwrap();

        assert_eq!(report.cross_references.companies.len(), 1);
        let entry = &report.cross_references.companies[0];
        assert_eq!(entry.value, "abc gmbh");
        assert_eq!(entry.document_ids, vec![0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_order_does_not_affect_result_order() {
        // The first file takes the longest; completion order is reversed
        let client = StubClient::new(vec![
            ("a.txt", Behavior::Companies("keine", Duration::from_secs(30))),
            ("b.txt", Behavior::Companies("keine", Duration::from_secs(20))),
            ("c.txt", Behavior::Companies("keine", Duration::from_secs(10))),
        ]);
        let config = BatchConfig {
            max_parallel: 3,
            ..BatchConfig::default()
        };
        let proc = processor(StubExtractor::new(), client, config);

        let report = proc
            .process(vec![txt("a.txt"), txt("b.txt"), txt("c.txt")])
            .await
            .unwrap();

        let order: Vec<&str> = report.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(order, vec!["a.txt", "b.txt", "c.txt"]);
        for (id, record) in report.results.iter().enumerate() {
            assert_eq!(record.document_id, id);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_deadline_records_unfinished_files_as_timeout() {
        let client = StubClient::new(vec![(
            "langsam.txt",
            Behavior::Companies("keine", Duration::from_secs(3600)),
        )]);
        let config = BatchConfig {
            deadline_secs: 5,
            ..BatchConfig::default()
        };
        let proc = processor(StubExtractor::new(), client, config);

        let report = proc
            .process(vec![txt("schnell.txt"), txt("langsam.txt")])
            .await
            .unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 1);
        assert!(report.results[0].success);
        assert_eq!(
            report.results[1].error_kind,
            Some(AnalysisErrorKind::InferenceTimeout)
        );
    }

    #[tokio::test]
    async fn test_counts_add_up_for_all_outcomes() {
        // All succeed
        let report = processor(StubExtractor::new(), StubClient::new(vec![]), BatchConfig::default())
            .process(vec![txt("a.txt"), txt("b.txt")])
            .await
            .unwrap();
        assert_eq!(report.processed + report.failed, report.total_files);
        assert_eq!(report.failed, 0);

        // All fail
        let report = processor(StubExtractor::new(), StubClient::new(vec![]), BatchConfig::default())
            .process(vec![
                BatchFile::new("a.zip", vec![1]),
                BatchFile::new("b.png", vec![2]),
            ])
            .await
            .unwrap();
        assert_eq!(report.processed + report.failed, report.total_files);
        assert_eq!(report.processed, 0);
    }

    #[tokio::test]
    async fn test_report_carries_model_name() {
        let report = processor(StubExtractor::new(), StubClient::new(vec![]), BatchConfig::default())
            .process(vec![txt("a.txt")])
            .await
            .unwrap();
        assert_eq!(report.model, "stub-model");
    }
}
