//! The tribunal step sequencer: the fail-closed state machine.
//!
//! The sequencer enforces the tribunal execution model for one run:
//!
//!   for each step in order: [Evaluator::evaluate] → settle → record → publish
//!   after the last step:    derive verdict → seal transcript → publish once
//!
//! The safety invariant is absolute: once a step has Failed, no evaluator
//! after it is ever invoked. Those steps are Skipped. Errors, panics, and
//! timeouts inside an evaluator are all settled as Failed, so nothing an
//! evaluator does can turn into a PROCEED by default.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tribunal_contracts::{
    claim::Claim,
    error::{TribunalError, TribunalResult},
    run::{RunId, StepRecord},
    step::{Outcome, StepId, StepStatus, StepView},
    verdict::{Verdict, GENERIC_FAILURE_REASON},
};

use crate::traits::{AuditWriter, Evaluator, RunObserver, StepEvent};

/// Ceiling applied to every evaluator invocation unless overridden.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(60);

struct StepDefinition {
    id: StepId,
    label: String,
    evaluator: Arc<dyn Evaluator>,
}

/// The ordered pipeline of steps and the rules for running it.
///
/// Steps are fixed at construction and never reordered. One sequencer can
/// drive any number of runs, one at a time per observer.
pub struct StepSequencer {
    steps: Vec<StepDefinition>,
    step_timeout: Duration,
}

/// Builder for a [`StepSequencer`].
pub struct StepSequencerBuilder {
    steps: Vec<StepDefinition>,
    step_timeout: Duration,
}

impl StepSequencerBuilder {
    /// Append a step. Steps run in the order they are added.
    pub fn step(
        mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        self.steps.push(StepDefinition {
            id: StepId::new(id),
            label: label.into(),
            evaluator,
        });
        self
    }

    /// Override the per-evaluator ceiling.
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Validate and build the sequencer.
    ///
    /// Returns `TribunalError::Config` if two steps share an id or the step
    /// timeout is zero.
    pub fn build(self) -> TribunalResult<StepSequencer> {
        if self.step_timeout.is_zero() {
            return Err(TribunalError::Config {
                reason: "step timeout must be greater than zero".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.0.as_str()) {
                return Err(TribunalError::Config {
                    reason: format!("duplicate step id '{}'", step.id),
                });
            }
        }

        Ok(StepSequencer {
            steps: self.steps,
            step_timeout: self.step_timeout,
        })
    }
}

/// The terminal result of one completed (not superseded) run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: RunId,
    pub steps: Vec<StepView>,
    pub verdict: Verdict,
    pub failure_reason: Option<String>,
}

/// Aborts the spawned evaluator if the run awaiting it is dropped.
struct EvaluatorTask(JoinHandle<TribunalResult<Outcome>>);

impl Drop for EvaluatorTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl StepSequencer {
    pub fn builder() -> StepSequencerBuilder {
        StepSequencerBuilder {
            steps: Vec::new(),
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Number of steps in the pipeline.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Read-model rows for every step, all Pending.
    pub fn pending_views(&self) -> Vec<StepView> {
        self.steps
            .iter()
            .map(|s| StepView::pending(s.id.clone(), s.label.clone()))
            .collect()
    }

    /// Drive one run of the pipeline over `claim`.
    ///
    /// # Algorithm
    ///
    /// 1. Every step starts Pending.
    /// 2. For each step in order:
    ///    - if an earlier step Failed → record and publish Skipped, never
    ///      invoke the evaluator
    ///    - otherwise publish `Started`, invoke the evaluator under the step
    ///      timeout, then record and publish Completed or Failed
    /// 3. Derive the verdict (`Proceed` iff every step Completed), seal the
    ///    transcript, and publish `Concluded` exactly once.
    ///
    /// # Errors
    ///
    /// Returns `TribunalError::Superseded` if `observer` rejects an event
    /// because a newer run replaced this one; no evaluator is invoked after
    /// that. Evaluator failures are never returned as errors.
    pub async fn run(
        &self,
        run_id: RunId,
        claim: &Claim,
        observer: &dyn RunObserver,
        audit: &dyn AuditWriter,
    ) -> TribunalResult<RunReport> {
        let mut views = self.pending_views();
        let mut failure_reason: Option<String> = None;

        info!(run_id = %run_id, steps = self.steps.len(), "run starting");
        if self.steps.is_empty() {
            warn!(run_id = %run_id, "pipeline has no steps; verdict is vacuously PROCEED");
        }

        for (index, step) in self.steps.iter().enumerate() {
            // ── Abort-on-failure: everything after a failure is skipped ─────
            if failure_reason.is_some() {
                debug!(run_id = %run_id, step = %step.id, "skipping step after earlier failure");
                self.write_best_effort(audit, run_id, index, step, StepStatus::Skipped, None);
                observer.apply(&StepEvent::Settled {
                    index,
                    status: StepStatus::Skipped,
                    reason: None,
                })?;
                views[index].status = StepStatus::Skipped;
                continue;
            }

            // ── Suspension point: the evaluator runs in its own task ────────
            observer.apply(&StepEvent::Started { index })?;
            views[index].status = StepStatus::Running;
            debug!(run_id = %run_id, step = %step.id, index, "invoking evaluator");

            let (status, reason) = match self.invoke(step, claim).await {
                Outcome::Completed => {
                    let record = self.record(run_id, index, step, StepStatus::Completed, None);
                    match audit.write(&record) {
                        Ok(()) => (StepStatus::Completed, None),
                        Err(err) => {
                            // A step that cannot be recorded cannot pass.
                            warn!(
                                run_id = %run_id,
                                step = %step.id,
                                error = %err,
                                "transcript rejected completed step; failing it"
                            );
                            let reason = err.to_string();
                            self.write_best_effort(
                                audit,
                                run_id,
                                index,
                                step,
                                StepStatus::Failed,
                                Some(reason.clone()),
                            );
                            (StepStatus::Failed, Some(reason))
                        }
                    }
                }
                Outcome::Failed { reason } => {
                    let reason = reason
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| GENERIC_FAILURE_REASON.to_string());
                    self.write_best_effort(
                        audit,
                        run_id,
                        index,
                        step,
                        StepStatus::Failed,
                        Some(reason.clone()),
                    );
                    (StepStatus::Failed, Some(reason))
                }
            };

            observer.apply(&StepEvent::Settled {
                index,
                status,
                reason: reason.clone(),
            })?;
            views[index].status = status;

            if status == StepStatus::Failed {
                warn!(
                    run_id = %run_id,
                    step = %step.id,
                    reason = reason.as_deref().unwrap_or_default(),
                    "step failed; remaining steps will be skipped"
                );
                failure_reason = reason;
            } else {
                info!(run_id = %run_id, step = %step.id, "step completed");
            }
        }

        // ── Verdict: derived once, published once ───────────────────────────
        let statuses: Vec<StepStatus> = views.iter().map(|v| v.status).collect();
        let verdict = Verdict::derive(&statuses).unwrap_or(Verdict::Halt);

        if let Err(err) = audit.finalize(&run_id, verdict) {
            warn!(run_id = %run_id, error = %err, "failed to seal run transcript");
        }

        observer.apply(&StepEvent::Concluded {
            verdict,
            failure_reason: failure_reason.clone(),
        })?;

        info!(run_id = %run_id, verdict = %verdict, "run concluded");

        Ok(RunReport {
            run_id,
            steps: views,
            verdict,
            failure_reason,
        })
    }

    /// Invoke one evaluator and reduce everything it can do to an `Outcome`.
    async fn invoke(&self, step: &StepDefinition, claim: &Claim) -> Outcome {
        let evaluator = Arc::clone(&step.evaluator);
        let owned = claim.clone();
        let mut task = EvaluatorTask(tokio::spawn(async move {
            evaluator.evaluate(&owned).await
        }));

        let fault = match tokio::time::timeout(self.step_timeout, &mut task.0).await {
            Ok(Ok(Ok(outcome))) => return outcome,
            Ok(Ok(Err(err))) => TribunalError::EvaluatorFault {
                step: step.id.0.clone(),
                reason: err.to_string(),
            },
            Ok(Err(join_err)) => TribunalError::EvaluatorFault {
                step: step.id.0.clone(),
                reason: if join_err.is_panic() {
                    "evaluator panicked".to_string()
                } else {
                    "evaluator task was cancelled".to_string()
                },
            },
            Err(_) => TribunalError::Timeout {
                step: step.id.0.clone(),
                after_ms: self.step_timeout.as_millis() as u64,
            },
        };

        warn!(step = %step.id, error = %fault, "evaluator produced no outcome; failing closed");
        Outcome::failed(fault.to_string())
    }

    fn record(
        &self,
        run_id: RunId,
        index: usize,
        step: &StepDefinition,
        status: StepStatus,
        reason: Option<String>,
    ) -> StepRecord {
        StepRecord {
            run_id,
            index,
            step_id: step.id.clone(),
            label: step.label.clone(),
            status,
            reason,
            timestamp: Utc::now(),
        }
    }

    /// Record a Failed or Skipped step. The status is already unsafe, so a
    /// write failure is logged and otherwise ignored.
    fn write_best_effort(
        &self,
        audit: &dyn AuditWriter,
        run_id: RunId,
        index: usize,
        step: &StepDefinition,
        status: StepStatus,
        reason: Option<String>,
    ) {
        let record = self.record(run_id, index, step, status, reason);
        if let Err(err) = audit.write(&record) {
            warn!(run_id = %run_id, step = %step.id, error = %err, "failed to record step");
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
