//! The poll-and-persist state machine.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use vgen_db::{DbError, DbResult, VideoCatalog};
use vgen_models::{GenerationId, NewVideo, OwnerRef, VideoRecord};
use vgen_stability::{GenerationPoll, StabilityClient, StabilityResult};
use vgen_store::ArtifactStore;

use crate::error::{PipelineError, PipelineResult};
use crate::policy::PollPolicy;

/// Where poll results come from. Seam for driving the loop against
/// scripted responses in tests.
#[async_trait]
pub trait GenerationSource: Send + Sync {
    async fn fetch_result(&self, generation_id: &GenerationId) -> StabilityResult<GenerationPoll>;
}

#[async_trait]
impl GenerationSource for StabilityClient {
    async fn fetch_result(&self, generation_id: &GenerationId) -> StabilityResult<GenerationPoll> {
        StabilityClient::fetch_result(self, generation_id).await
    }
}

/// Where finished videos get catalogued. The orchestrator is the only
/// caller; no other component creates video records.
#[async_trait]
pub trait VideoSink: Send + Sync {
    async fn create(&self, new: &NewVideo) -> DbResult<VideoRecord>;
}

#[async_trait]
impl VideoSink for VideoCatalog {
    async fn create(&self, new: &NewVideo) -> DbResult<VideoRecord> {
        VideoCatalog::create(self, new).await
    }
}

/// Drives one generation from pending to catalogued:
/// `Pending → Ready | Failed | TimedOut`, then save bytes, then create the
/// catalog row. An explicit loop with a fixed attempt budget; only
/// `Pending` is ever retried.
pub struct PollOrchestrator<S, K> {
    source: S,
    store: ArtifactStore,
    sink: K,
    policy: PollPolicy,
}

impl<S: GenerationSource, K: VideoSink> PollOrchestrator<S, K> {
    pub fn new(source: S, store: ArtifactStore, sink: K, policy: PollPolicy) -> Self {
        Self {
            source,
            store,
            sink,
            policy,
        }
    }

    /// Run the full orchestration for one generation.
    ///
    /// `generation_id` is the raw correlation string from the caller;
    /// both it and the owner id must be present before any external call
    /// is made.
    pub async fn run(&self, generation_id: &str, owner: OwnerRef) -> PipelineResult<VideoRecord> {
        let generation_id = GenerationId::new(generation_id)
            .map_err(|_| PipelineError::MissingParameters("generation_id"))?;
        if owner.id() <= 0 {
            return Err(PipelineError::MissingParameters("owner id"));
        }

        let bytes = self.poll_until_ready(&generation_id).await?;
        self.persist(&generation_id, owner, &bytes).await
    }

    /// The bounded poll loop. Suspends between attempts without holding
    /// any catalog connection, so concurrent requests keep progressing.
    async fn poll_until_ready(&self, generation_id: &GenerationId) -> PipelineResult<Vec<u8>> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.source.fetch_result(generation_id).await? {
                GenerationPoll::Ready(bytes) => {
                    info!(
                        generation_id = %generation_id,
                        attempt,
                        size = bytes.len(),
                        "Generation ready"
                    );
                    return Ok(bytes);
                }
                GenerationPoll::Failed { status, body } => {
                    // An explicit rejection outranks any remaining budget.
                    warn!(
                        generation_id = %generation_id,
                        attempt,
                        status,
                        "Generation failed upstream"
                    );
                    return Err(PipelineError::UpstreamFailed {
                        generation_id: generation_id.to_string(),
                        status,
                        body,
                    });
                }
                GenerationPoll::Pending => {
                    if attempt >= self.policy.max_attempts {
                        warn!(
                            generation_id = %generation_id,
                            attempts = attempt,
                            "Retry budget exhausted while still pending"
                        );
                        return Err(PipelineError::UpstreamTimeout {
                            generation_id: generation_id.to_string(),
                            attempts: attempt,
                        });
                    }
                    debug!(
                        generation_id = %generation_id,
                        attempt,
                        delay = ?self.policy.interval,
                        "Generation pending, will retry"
                    );
                    tokio::time::sleep(self.policy.interval).await;
                }
            }
        }
    }

    /// Bytes first, row second: a catalog row must never reference an
    /// artifact that is not durably on disk.
    async fn persist(
        &self,
        generation_id: &GenerationId,
        owner: OwnerRef,
        bytes: &[u8],
    ) -> PipelineResult<VideoRecord> {
        let path = self.store.save(generation_id, bytes).await?;

        let new = NewVideo {
            video_url: generation_id.artifact_name(),
            generation_id: generation_id.clone(),
            owner,
        };

        match self.sink.create(&new).await {
            Ok(record) => Ok(record),
            Err(DbError::DuplicateGeneration(id)) => {
                debug!(
                    generation_id = %id,
                    "Lost the catalog race; an identical artifact was overwritten in place"
                );
                Err(PipelineError::DuplicateGeneration(id))
            }
            Err(source) => {
                warn!(
                    generation_id = %generation_id,
                    orphan = %path.display(),
                    error = %source,
                    "Catalog write failed after artifact write; file left for manual sweep"
                );
                Err(PipelineError::Persistence {
                    generation_id: generation_id.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Utc;

    /// Source that replays a script of poll outcomes and counts calls.
    struct ScriptedSource {
        script: Mutex<Vec<GenerationPoll>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(script: Vec<GenerationPoll>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationSource for &ScriptedSource {
        async fn fetch_result(&self, _: &GenerationId) -> StabilityResult<GenerationPoll> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                Ok(GenerationPoll::Pending)
            } else {
                Ok(script.remove(0))
            }
        }
    }

    /// In-memory sink with the catalog's uniqueness behavior.
    #[derive(Default)]
    struct MemorySink {
        rows: Mutex<HashMap<String, VideoRecord>>,
        fail_writes: bool,
    }

    impl MemorySink {
        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Default::default()
            }
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VideoSink for &MemorySink {
        async fn create(&self, new: &NewVideo) -> DbResult<VideoRecord> {
            if self.fail_writes {
                return Err(DbError::Inconsistent("injected catalog failure".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(new.generation_id.as_str()) {
                return Err(DbError::DuplicateGeneration(new.generation_id.to_string()));
            }
            let record = VideoRecord {
                video_id: rows.len() as i64 + 1,
                video_url: new.video_url.clone(),
                generation_id: new.generation_id.clone(),
                generated_on: Utc::now(),
                owner: new.owner,
            };
            rows.insert(new.generation_id.to_string(), record.clone());
            Ok(record)
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy {
            max_attempts: 10,
            interval: Duration::from_secs(5),
        }
    }

    fn orchestrator<'a>(
        source: &'a ScriptedSource,
        sink: &'a MemorySink,
        root: &std::path::Path,
    ) -> PollOrchestrator<&'a ScriptedSource, &'a MemorySink> {
        PollOrchestrator::new(source, ArtifactStore::new(root), sink, policy())
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_ready_is_one_attempt_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(vec![GenerationPoll::Ready(b"video".to_vec())]);
        let sink = MemorySink::default();

        let record = orchestrator(&source, &sink, dir.path())
            .run("abc123", OwnerRef::Image(1))
            .await
            .unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(record.video_url, "abc123.mp4");
        assert_eq!(
            std::fs::read(dir.path().join("abc123.mp4")).unwrap(),
            b"video"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_ready_waits_the_interval() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(vec![
            GenerationPoll::Pending,
            GenerationPoll::Pending,
            GenerationPoll::Ready(b"video".to_vec()),
        ]);
        let sink = MemorySink::default();

        let started = tokio::time::Instant::now();
        let record = orchestrator(&source, &sink, dir.path())
            .run("abc123", OwnerRef::Image(1))
            .await
            .unwrap();

        assert_eq!(source.calls(), 3);
        // Two suspensions of 5s each on the virtual clock.
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(record.generation_id.as_str(), "abc123");
        assert!(dir.path().join("abc123.mp4").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_pending_times_out_with_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(vec![]);
        let sink = MemorySink::default();

        let err = orchestrator(&source, &sink, dir.path())
            .run("abc123", OwnerRef::User(1))
            .await
            .unwrap_err();

        match err {
            PipelineError::UpstreamTimeout { attempts, .. } => assert_eq!(attempts, 10),
            other => panic!("expected UpstreamTimeout, got {:?}", other),
        }
        assert_eq!(source.calls(), 10);
        assert_eq!(sink.len(), 0);
        assert!(!dir.path().join("abc123.mp4").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_failure_stops_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(vec![
            GenerationPoll::Pending,
            GenerationPoll::Failed {
                status: 500,
                body: "internal error".into(),
            },
        ]);
        let sink = MemorySink::default();

        let err = orchestrator(&source, &sink, dir.path())
            .run("abc123", OwnerRef::Image(1))
            .await
            .unwrap_err();

        match err {
            PipelineError::UpstreamFailed { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("expected UpstreamFailed, got {:?}", other),
        }
        // Failure outranks the remaining eight attempts of budget.
        assert_eq!(source.calls(), 2);
        assert_eq!(sink.len(), 0);
        assert!(!dir.path().join("abc123.mp4").exists());
    }

    #[tokio::test]
    async fn test_blank_generation_id_never_reaches_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(vec![]);
        let sink = MemorySink::default();

        let err = orchestrator(&source, &sink, dir.path())
            .run("  ", OwnerRef::Image(1))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::MissingParameters("generation_id")));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_owner_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(vec![]);
        let sink = MemorySink::default();

        let err = orchestrator(&source, &sink, dir.path())
            .run("abc123", OwnerRef::User(0))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::MissingParameters("owner id")));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_generation_surfaces_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::default();

        let first = ScriptedSource::new(vec![GenerationPoll::Ready(b"video".to_vec())]);
        orchestrator(&first, &sink, dir.path())
            .run("abc123", OwnerRef::Image(1))
            .await
            .unwrap();

        let second = ScriptedSource::new(vec![GenerationPoll::Ready(b"video".to_vec())]);
        let err = orchestrator(&second, &sink, dir.path())
            .run("abc123", OwnerRef::Image(1))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::DuplicateGeneration(_)));
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_failure_leaves_artifact_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(vec![GenerationPoll::Ready(b"video".to_vec())]);
        let sink = MemorySink::failing();

        let err = orchestrator(&source, &sink, dir.path())
            .run("abc123", OwnerRef::Image(1))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Persistence { .. }));
        // Recoverable inconsistency: the bytes stay put for a later run.
        assert!(dir.path().join("abc123.mp4").exists());
    }
}
