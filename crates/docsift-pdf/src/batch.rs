//! Worker pool that fans per-document extraction out across a bounded set of
//! tasks and joins the results into one flat corpus.
//!
//! Each worker owns its document's intermediate state exclusively; results
//! transfer by value over oneshot channels at completion. The join barrier
//! waits for every job: no cancellation, no partial-result early return.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use docsift_core::{CollectionCorpus, HeadingClassifier, PdfBackend};

use crate::config::ExtractionConfig;
use crate::extractor::DocumentExtraction;
use crate::{document_name, extract_document};

/// Progress events emitted while a batch is running.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    DocumentStarted {
        index: usize,
        total: usize,
        document: String,
    },
    DocumentFinished {
        index: usize,
        total: usize,
        document: String,
        headings: usize,
        lines: usize,
    },
    /// The document was skipped; it contributes empty headings and corpus.
    DocumentFailed {
        index: usize,
        total: usize,
        document: String,
        message: String,
    },
}

/// A document extraction job submitted to the pool.
struct DocJob {
    path: PathBuf,
    index: usize,
    total: usize,
    result_tx: oneshot::Sender<DocumentExtraction>,
}

/// A pool of worker tasks running the per-document extraction chain.
pub struct ExtractionPool {
    job_tx: async_channel::Sender<DocJob>,
    pool_handle: JoinHandle<()>,
}

impl ExtractionPool {
    /// Create a new pool with `num_workers` worker tasks.
    pub fn new(
        backend: Arc<dyn PdfBackend>,
        classifier: Arc<dyn HeadingClassifier>,
        config: ExtractionConfig,
        num_workers: usize,
        progress: Arc<dyn Fn(ProgressEvent) + Send + Sync>,
    ) -> Self {
        let (job_tx, job_rx) = async_channel::unbounded::<DocJob>();

        let pool_handle = tokio::spawn(async move {
            let mut handles = Vec::with_capacity(num_workers.max(1));

            for _ in 0..num_workers.max(1) {
                handles.push(tokio::spawn(worker_loop(
                    job_rx.clone(),
                    backend.clone(),
                    classifier.clone(),
                    config.clone(),
                    progress.clone(),
                )));
            }

            // Drop our clone so workers are the last holders
            drop(job_rx);

            for h in handles {
                let _ = h.await;
            }
        });

        Self {
            job_tx,
            pool_handle,
        }
    }

    /// Submit a job to the pool.
    async fn submit(&self, job: DocJob) {
        let _ = self.job_tx.send(job).await;
    }

    /// Close the pool and wait for all workers to finish.
    pub async fn shutdown(self) {
        self.job_tx.close();
        let _ = self.pool_handle.await;
    }
}

async fn worker_loop(
    job_rx: async_channel::Receiver<DocJob>,
    backend: Arc<dyn PdfBackend>,
    classifier: Arc<dyn HeadingClassifier>,
    config: ExtractionConfig,
    progress: Arc<dyn Fn(ProgressEvent) + Send + Sync>,
) {
    while let Ok(job) = job_rx.recv().await {
        let document = document_name(&job.path);
        progress(ProgressEvent::DocumentStarted {
            index: job.index,
            total: job.total,
            document: document.clone(),
        });

        let extraction = {
            let backend = backend.clone();
            let classifier = classifier.clone();
            let config = config.clone();
            let path = job.path.clone();
            tokio::task::spawn_blocking(move || {
                extract_document(&path, backend.as_ref(), classifier.as_ref(), &config)
            })
            .await
        };

        let extraction = match extraction {
            Ok(Ok(extraction)) => {
                progress(ProgressEvent::DocumentFinished {
                    index: job.index,
                    total: job.total,
                    document: document.clone(),
                    headings: extraction.headings.len(),
                    lines: extraction.lines.len(),
                });
                extraction
            }
            Ok(Err(err)) => {
                // Partial-failure tolerance: the document contributes nothing,
                // the rest of the batch continues.
                tracing::warn!(document = %document, error = %err, "document extraction failed");
                progress(ProgressEvent::DocumentFailed {
                    index: job.index,
                    total: job.total,
                    document: document.clone(),
                    message: err.to_string(),
                });
                DocumentExtraction::default()
            }
            Err(join_err) => {
                tracing::warn!(document = %document, error = %join_err, "extraction task panicked");
                progress(ProgressEvent::DocumentFailed {
                    index: job.index,
                    total: job.total,
                    document: document.clone(),
                    message: join_err.to_string(),
                });
                DocumentExtraction::default()
            }
        };

        let _ = job.result_tx.send(extraction);
    }
}

/// Process every document of a collection concurrently and join the results.
///
/// Fan-in concatenates per-document headings and corpora in submission order
/// so downstream stable tie-breaking is deterministic regardless of which
/// worker finished first.
pub async fn process_documents(
    paths: &[PathBuf],
    backend: Arc<dyn PdfBackend>,
    classifier: Arc<dyn HeadingClassifier>,
    config: ExtractionConfig,
    num_workers: usize,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
) -> CollectionCorpus {
    let total = paths.len();
    if total == 0 {
        return CollectionCorpus::default();
    }

    let progress: Arc<dyn Fn(ProgressEvent) + Send + Sync> = Arc::new(progress);
    let pool = ExtractionPool::new(backend, classifier, config, num_workers, progress);

    let mut receivers = Vec::with_capacity(total);
    for (index, path) in paths.iter().enumerate() {
        let (result_tx, result_rx) = oneshot::channel();
        pool.submit(DocJob {
            path: path.clone(),
            index,
            total,
            result_tx,
        })
        .await;
        receivers.push(result_rx);
    }

    let mut corpus = CollectionCorpus::default();
    for rx in receivers {
        if let Ok(extraction) = rx.await {
            corpus.sections.extend(extraction.headings);
            corpus.lines.extend(extraction.lines);
        }
    }

    pool.shutdown().await;

    corpus
}
