//! `TribunalSession`: one claim at a time, observed through a snapshot.
//!
//! The session owns the read model and is its only writer. Each run gets a
//! generation number; every write from a run first checks that its
//! generation is still current, inside the same `send_if_modified` closure
//! that applies the change. A superseded run therefore cannot touch the read
//! model, even if its evaluator answers after the new run started.
//!
//!   start(claim) → validate → bump generation → reset steps → spawn run
//!   run          → Started / Settled / Concluded events → SessionObserver
//!   observer     → generation check → mutate snapshot → notify subscribers

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use tribunal_audit::{AuditLog, InMemoryAuditWriter};
use tribunal_config::TribunalConfig;
use tribunal_contracts::{
    claim::Claim,
    error::{TribunalError, TribunalResult},
    run::{RunId, SessionSnapshot},
    step::StepStatus,
};
use tribunal_core::{
    traits::{RunObserver, StepEvent},
    StepSequencer,
};

use crate::pipeline;

/// Drives the tribunal pipeline for one claim at a time.
///
/// Reads (`snapshot`, `subscribe`, `is_running`) never block on a run.
/// Dropping the session aborts its active run.
pub struct TribunalSession {
    sequencer: Arc<StepSequencer>,
    state: Arc<watch::Sender<SessionSnapshot>>,
    active: Mutex<Option<JoinHandle<()>>>,
    last_audit: Arc<Mutex<Option<AuditLog>>>,
}

impl TribunalSession {
    pub fn new(sequencer: StepSequencer) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::idle(sequencer.pending_views()));
        Self {
            sequencer: Arc::new(sequencer),
            state: Arc::new(state),
            active: Mutex::new(None),
            last_audit: Arc::new(Mutex::new(None)),
        }
    }

    /// A session over the standard five-step pipeline.
    pub fn from_config(config: &TribunalConfig) -> TribunalResult<Self> {
        Ok(Self::new(pipeline::standard(config)?))
    }

    /// Start reviewing `claim`.
    ///
    /// A run still in flight for a different claim is superseded: its task
    /// is aborted and anything it still reports is discarded.
    ///
    /// # Errors
    ///
    /// - `EmptyClaim` if `claim` is empty or whitespace.
    /// - `RunInProgress` if the same claim is already being reviewed.
    /// - `Config` if called outside a Tokio runtime.
    ///
    /// On error the read model is left untouched.
    pub fn start(&self, claim: &str) -> TribunalResult<RunId> {
        let claim = Claim::new(claim)?;
        let runtime = Handle::try_current().map_err(|_| TribunalError::Config {
            reason: "TribunalSession::start must be called within a Tokio runtime".to_string(),
        })?;

        let mut active = lock(&self.active);

        {
            let current = self.state.borrow();
            if current.is_running() && current.claim.as_ref() == Some(&claim) {
                return Err(TribunalError::RunInProgress {
                    claim: claim.to_string(),
                });
            }
        }

        if let Some(previous) = active.take() {
            previous.abort();
        }

        let run_id = RunId::new();
        let steps = self.sequencer.pending_views();
        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            if snapshot.is_running() {
                info!(
                    superseded_run = ?snapshot.run_id,
                    generation = snapshot.generation,
                    "superseding run in flight"
                );
            }
            snapshot.generation += 1;
            snapshot.run_id = Some(run_id);
            snapshot.claim = Some(claim.clone());
            snapshot.steps = steps;
            snapshot.verdict = None;
            snapshot.failure_reason = None;
            generation = snapshot.generation;
        });

        info!(run_id = %run_id, generation, "run accepted");

        let audit = Arc::new(InMemoryAuditWriter::new(run_id));
        let observer = SessionObserver {
            generation,
            state: Arc::clone(&self.state),
            audit: Arc::clone(&audit),
            last_audit: Arc::clone(&self.last_audit),
        };
        let sequencer = Arc::clone(&self.sequencer);

        *active = Some(runtime.spawn(async move {
            match sequencer.run(run_id, &claim, &observer, audit.as_ref()).await {
                Ok(report) => {
                    debug!(run_id = %run_id, verdict = %report.verdict, "run task finished");
                }
                Err(TribunalError::Superseded { generation: current }) => {
                    debug!(run_id = %run_id, generation, current, "stale run discarded");
                }
                Err(err) => {
                    warn!(run_id = %run_id, error = %err, "run ended without a verdict");
                }
            }
        }));

        Ok(run_id)
    }

    /// The current read model.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// A receiver notified after every change to the read model.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running()
    }

    /// Wait until no run is in flight, then return the read model.
    ///
    /// Returns immediately for an idle or concluded session. If the run is
    /// superseded while waiting, this waits for the run that replaced it.
    pub async fn wait_for_verdict(&self) -> SessionSnapshot {
        let mut rx = self.state.subscribe();
        let concluded = rx.wait_for(|snapshot| !snapshot.is_running()).await;
        match concluded {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Transcript of the most recent concluded run that was not superseded.
    pub fn last_audit_log(&self) -> Option<AuditLog> {
        lock(&self.last_audit).clone()
    }
}

impl Drop for TribunalSession {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.active).take() {
            task.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Applies one run's events to the read model, guarded by its generation.
struct SessionObserver {
    generation: u64,
    state: Arc<watch::Sender<SessionSnapshot>>,
    audit: Arc<InMemoryAuditWriter>,
    last_audit: Arc<Mutex<Option<AuditLog>>>,
}

impl RunObserver for SessionObserver {
    fn apply(&self, event: &StepEvent) -> TribunalResult<()> {
        let mut superseded_by = None;

        self.state.send_if_modified(|snapshot| {
            if snapshot.generation != self.generation {
                superseded_by = Some(snapshot.generation);
                return false;
            }

            match event {
                StepEvent::Started { index } => set_status(snapshot, *index, StepStatus::Running),
                StepEvent::Settled { index, status, .. } => set_status(snapshot, *index, *status),
                StepEvent::Concluded {
                    verdict,
                    failure_reason,
                } => {
                    // Published together with the verdict so a reader that
                    // sees the verdict also sees its transcript.
                    *lock(&self.last_audit) = Some(self.audit.export_log());
                    snapshot.failure_reason = failure_reason.clone();
                    snapshot.verdict = Some(*verdict);
                    true
                }
            }
        });

        match superseded_by {
            Some(current) => Err(TribunalError::Superseded {
                generation: current,
            }),
            None => Ok(()),
        }
    }
}

fn set_status(snapshot: &mut SessionSnapshot, index: usize, status: StepStatus) -> bool {
    match snapshot.steps.get_mut(index) {
        Some(step) if step.status != status => {
            step.status = status;
            true
        }
        _ => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use tribunal_contracts::{step::Outcome, verdict::Verdict};
    use tribunal_core::{traits::Evaluator, PlaceholderEvaluator};

    use super::*;

    use StepStatus::{Completed, Failed, Pending, Running, Skipped};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// Completes only once the test releases it. Counts its invocations.
    struct GatedEvaluator {
        gate: Arc<Notify>,
        calls: Arc<AtomicUsize>,
        outcome: Outcome,
    }

    #[async_trait]
    impl Evaluator for GatedEvaluator {
        async fn evaluate(&self, _claim: &Claim) -> TribunalResult<Outcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(self.outcome.clone())
        }
    }

    struct Harness {
        session: TribunalSession,
        gate: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    /// Three steps: immediate placeholder, gated middle step, placeholder.
    fn harness(middle: Outcome) -> Harness {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let sequencer = StepSequencer::builder()
            .step("intake", "Intake", Arc::new(PlaceholderEvaluator::immediate()))
            .step(
                "witness",
                "Witness",
                Arc::new(GatedEvaluator {
                    gate: Arc::clone(&gate),
                    calls: Arc::clone(&calls),
                    outcome: middle,
                }),
            )
            .step("seal", "Seal", Arc::new(PlaceholderEvaluator::immediate()))
            .build()
            .unwrap();
        Harness {
            session: TribunalSession::new(sequencer),
            gate,
            calls,
        }
    }

    async fn wait_until<F>(session: &TribunalSession, predicate: F) -> SessionSnapshot
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut rx = session.subscribe();
        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
            .await
            .expect("condition not reached in time")
            .unwrap()
            .clone();
        snapshot
    }

    /// Keep opening the gate until the session concludes. A superseded
    /// evaluator may still be registered on the gate for a moment after its
    /// run was aborted, so a single notification is not enough.
    async fn release_until_concluded(h: &Harness) -> SessionSnapshot {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                h.gate.notify_one();
                let wait = h.session.wait_for_verdict();
                if let Ok(snapshot) = tokio::time::timeout(Duration::from_millis(20), wait).await {
                    return snapshot;
                }
            }
        })
        .await
        .expect("run did not conclude in time")
    }

    async fn witness_running(session: &TribunalSession) -> SessionSnapshot {
        wait_until(session, |s| {
            s.step("witness").map(|v| v.status) == Some(Running)
        })
        .await
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn new_session_is_idle() {
        let h = harness(Outcome::Completed);
        let snapshot = h.session.snapshot();

        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.run_id, None);
        assert_eq!(snapshot.verdict, None);
        assert_eq!(snapshot.statuses(), vec![Pending, Pending, Pending]);
        assert!(!h.session.is_running());
        assert!(h.session.last_audit_log().is_none());
    }

    #[tokio::test]
    async fn run_reports_progress_then_concludes() {
        let h = harness(Outcome::Completed);
        let run_id = h.session.start("The sky is blue.").unwrap();

        let mid = witness_running(&h.session).await;
        assert_eq!(mid.statuses(), vec![Completed, Running, Pending]);
        assert_eq!(mid.verdict, None, "no verdict while a step is running");
        assert!(h.session.is_running());

        let done = release_until_concluded(&h).await;

        assert_eq!(done.run_id, Some(run_id));
        assert_eq!(done.verdict, Some(Verdict::Proceed));
        assert_eq!(done.statuses(), vec![Completed, Completed, Completed]);
        assert!(!h.session.is_running());
    }

    #[tokio::test]
    async fn failed_step_halts_with_reason() {
        let h = harness(Outcome::failed("Manipulative framing"));
        h.session.start("Act now or lose everything.").unwrap();
        witness_running(&h.session).await;
        h.gate.notify_one();

        let done = h.session.wait_for_verdict().await;
        assert_eq!(done.verdict, Some(Verdict::Halt));
        assert_eq!(done.failure_reason.as_deref(), Some("Manipulative framing"));
        assert_eq!(done.statuses(), vec![Completed, Failed, Skipped]);
    }

    /// Every published snapshot with a verdict has only terminal steps.
    #[tokio::test]
    async fn verdict_is_never_visible_beside_unsettled_steps() {
        let h = harness(Outcome::Completed);
        let mut rx = h.session.subscribe();
        h.session.start("The sky is blue.").unwrap();

        let watcher = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                let concluded = snapshot.verdict.is_some();
                seen.push(snapshot);
                if concluded {
                    break;
                }
            }
            seen
        });

        witness_running(&h.session).await;
        release_until_concluded(&h).await;
        let seen = tokio::time::timeout(Duration::from_secs(5), watcher)
            .await
            .unwrap()
            .unwrap();

        assert!(!seen.is_empty());
        for snapshot in &seen {
            if snapshot.verdict.is_some() {
                assert!(snapshot.steps.iter().all(|s| s.status.is_terminal()));
            }
        }
    }

    #[tokio::test]
    async fn concluded_run_leaves_a_verified_transcript() {
        let h = harness(Outcome::Completed);
        let run_id = h.session.start("The sky is blue.").unwrap();
        witness_running(&h.session).await;
        release_until_concluded(&h).await;

        let log = h.session.last_audit_log().expect("transcript after conclusion");
        assert_eq!(log.run_id, run_id);
        assert_eq!(log.verdict, Some(Verdict::Proceed));
        assert_eq!(log.events.len(), 3);
        assert!(tribunal_audit::verify_chain(&log.events));
        assert_eq!(log.terminal_hash, log.events[2].this_hash);
    }

    // ── Rejections ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn empty_claim_is_rejected_without_state_change() {
        let h = harness(Outcome::Completed);
        let before = h.session.snapshot();

        for claim in ["", "   ", "\n\t"] {
            assert!(matches!(h.session.start(claim), Err(TribunalError::EmptyClaim)));
        }

        assert_eq!(h.session.snapshot(), before);
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn same_claim_while_running_is_rejected() {
        let h = harness(Outcome::Completed);
        let run_id = h.session.start("The sky is blue.").unwrap();
        witness_running(&h.session).await;

        let err = h.session.start("The sky is blue.").unwrap_err();
        assert!(matches!(err, TribunalError::RunInProgress { .. }));

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.run_id, Some(run_id));
        assert_eq!(snapshot.generation, 1);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_outside_a_runtime_is_a_config_error() {
        let h = harness(Outcome::Completed);
        assert!(matches!(
            h.session.start("The sky is blue."),
            Err(TribunalError::Config { .. })
        ));
        assert_eq!(h.session.snapshot().generation, 0);
    }

    // ── Superseding ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn new_claim_supersedes_the_run_in_flight() {
        let h = harness(Outcome::Completed);
        let first = h.session.start("First claim.").unwrap();
        witness_running(&h.session).await;

        let second = h.session.start("Second claim.").unwrap();
        assert_ne!(first, second);

        let reset = h.session.snapshot();
        assert_eq!(reset.generation, 2);
        assert_eq!(reset.run_id, Some(second));
        assert_eq!(reset.claim.as_ref().map(Claim::as_str), Some("Second claim."));

        witness_running(&h.session).await;
        let done = release_until_concluded(&h).await;

        assert_eq!(done.run_id, Some(second));
        assert_eq!(done.verdict, Some(Verdict::Proceed));
        assert_eq!(h.session.last_audit_log().map(|l| l.run_id), Some(second));
    }

    #[tokio::test]
    async fn claim_can_be_resubmitted_after_conclusion() {
        let h = harness(Outcome::Completed);
        h.session.start("The sky is blue.").unwrap();
        witness_running(&h.session).await;
        release_until_concluded(&h).await;

        let again = h.session.start("The sky is blue.").unwrap();
        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.run_id, Some(again));
        assert_eq!(snapshot.verdict, None);
        assert_eq!(snapshot.generation, 2);
    }

    /// A stale observer is refused and leaves the read model untouched.
    #[tokio::test]
    async fn stale_observer_cannot_write() {
        let h = harness(Outcome::Completed);
        let first = h.session.start("First claim.").unwrap();
        let stale = SessionObserver {
            generation: 1,
            state: Arc::clone(&h.session.state),
            audit: Arc::new(InMemoryAuditWriter::new(first)),
            last_audit: Arc::clone(&h.session.last_audit),
        };

        h.session.start("Second claim.").unwrap();
        witness_running(&h.session).await;
        let before = h.session.snapshot();

        let events = [
            StepEvent::Settled {
                index: 1,
                status: Failed,
                reason: Some("late".to_string()),
            },
            StepEvent::Concluded {
                verdict: Verdict::Halt,
                failure_reason: Some("late".to_string()),
            },
        ];
        for event in &events {
            assert!(matches!(
                stale.apply(event),
                Err(TribunalError::Superseded { generation: 2 })
            ));
        }

        assert_eq!(h.session.snapshot(), before);
        assert!(h.session.last_audit_log().is_none());
    }
}
