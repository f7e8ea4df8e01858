use std::collections::BTreeMap;

use serde_json::Value;

use crate::view_model::{AppViewModel, CategoryRowView};
use crate::Category;

/// Client-side job identifier. Allocated in increasing order, one per
/// submission, and used as the generation of a category slot: a slot only
/// accepts engine events that carry its current id.
pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Submitting,
    Running,
    Completed,
    Failed,
    TimedOut,
}

impl JobPhase {
    pub fn is_loading(self) -> bool {
        matches!(self, JobPhase::Submitting | JobPhase::Running)
    }
}

/// Terminal result of one job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(Value),
    Failed { reason: String },
    TimedOut { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub status: String,
    pub active_tasks: u64,
    pub completed_analyses: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct CategorySlot {
    active_job: Option<JobId>,
    last_job: Option<JobId>,
    phase: JobPhase,
    task_id: Option<String>,
    steps: &'static [&'static str],
    current_step: Option<usize>,
    poll_attempts: u32,
    result: Option<Value>,
    failure_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    slots: BTreeMap<Category, CategorySlot>,
    next_job_id: JobId,
    backend: Option<BackendStatus>,
    pending_queries: usize,
    notices: Vec<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            slots: Category::ALL
                .into_iter()
                .map(|category| (category, CategorySlot::default()))
                .collect(),
            next_job_id: 1,
            backend: None,
            pending_queries: 0,
            notices: Vec::new(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self, category: Category) -> bool {
        self.slot(category).phase.is_loading()
    }

    pub fn any_loading(&self) -> bool {
        self.slots.values().any(|slot| slot.phase.is_loading())
    }

    /// True while a job is in flight or a backend lookup has not answered.
    pub fn is_busy(&self) -> bool {
        self.any_loading() || self.pending_queries > 0
    }

    pub fn phase(&self, category: Category) -> JobPhase {
        self.slot(category).phase
    }

    /// Latest result payload stored for a category.
    pub fn result(&self, category: Category) -> Option<&Value> {
        self.slot(category).result.as_ref()
    }

    pub fn backend_status(&self) -> Option<&BackendStatus> {
        self.backend.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .slots
            .iter()
            .map(|(category, slot)| CategoryRowView {
                category: *category,
                job_id: slot.active_job.or(slot.last_job),
                phase: slot.phase,
                loading: slot.phase.is_loading(),
                task_id: slot.task_id.clone(),
                steps: slot.steps.iter().map(|step| step.to_string()).collect(),
                current_step: slot.current_step,
                poll_attempts: slot.poll_attempts,
                result: slot.result.clone(),
                failure_reason: slot.failure_reason.clone(),
            })
            .collect();

        AppViewModel {
            rows,
            backend: self.backend.clone(),
            notices: self.notices.clone(),
            busy: self.is_busy(),
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Hands over the notices collected so far, leaving none behind.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Starts a new job for `category`. Returns the new id and the id of the
    /// job it supersedes, if one was still in flight.
    pub(crate) fn begin_job(&mut self, category: Category) -> (JobId, Option<JobId>) {
        let job_id = self.next_job_id;
        self.next_job_id += 1;

        let slot = self.slot_mut(category);
        let superseded = slot.active_job.take();
        slot.active_job = Some(job_id);
        slot.last_job = Some(job_id);
        slot.phase = JobPhase::Submitting;
        slot.task_id = None;
        slot.steps = category.progress_steps();
        slot.current_step = None;
        slot.poll_attempts = 0;
        slot.failure_reason = None;
        self.mark_dirty();
        (job_id, superseded)
    }

    pub(crate) fn apply_submitted(&mut self, job_id: JobId, task_id: String) -> bool {
        let Some(slot) = self.active_slot_mut(job_id) else {
            return false;
        };
        slot.phase = JobPhase::Running;
        slot.task_id = Some(task_id);
        self.mark_dirty();
        true
    }

    pub(crate) fn apply_step(&mut self, job_id: JobId, index: usize) -> bool {
        let Some(slot) = self.active_slot_mut(job_id) else {
            return false;
        };
        let Some(last) = slot.steps.len().checked_sub(1) else {
            return true;
        };
        let index = index.min(last);
        if slot.current_step.is_some_and(|current| current >= index) {
            return true;
        }
        slot.current_step = Some(index);
        self.mark_dirty();
        true
    }

    pub(crate) fn apply_poll_attempt(&mut self, job_id: JobId, attempt: u32) -> bool {
        let Some(slot) = self.active_slot_mut(job_id) else {
            return false;
        };
        if attempt > slot.poll_attempts {
            slot.poll_attempts = attempt;
            self.mark_dirty();
        }
        true
    }

    pub(crate) fn apply_finished(&mut self, job_id: JobId, outcome: JobOutcome) -> bool {
        let Some(slot) = self.active_slot_mut(job_id) else {
            return false;
        };
        slot.active_job = None;
        slot.steps = &[];
        slot.current_step = None;
        match outcome {
            JobOutcome::Completed(payload) => {
                slot.phase = JobPhase::Completed;
                slot.result = Some(payload);
                slot.failure_reason = None;
            }
            JobOutcome::Failed { reason } => {
                slot.phase = JobPhase::Failed;
                slot.failure_reason = Some(reason);
            }
            JobOutcome::TimedOut { attempts } => {
                slot.phase = JobPhase::TimedOut;
                slot.poll_attempts = attempts;
            }
        }
        self.mark_dirty();
        true
    }

    /// Drops the in-flight job of `category`, keeping any stored result.
    /// Returns the id of the job that must be cancelled.
    pub(crate) fn discard(&mut self, category: Category) -> Option<JobId> {
        let slot = self.slot_mut(category);
        let job_id = slot.active_job.take()?;
        slot.phase = JobPhase::Idle;
        slot.steps = &[];
        slot.current_step = None;
        self.mark_dirty();
        Some(job_id)
    }

    pub(crate) fn begin_query(&mut self) {
        self.pending_queries += 1;
        self.mark_dirty();
    }

    pub(crate) fn apply_latest(
        &mut self,
        category: Category,
        result: Result<Option<Value>, String>,
    ) {
        self.finish_query();
        match result {
            Ok(Some(payload)) => self.slot_mut(category).result = Some(payload),
            Ok(None) => self
                .notices
                .push(format!("no stored result for {category}")),
            Err(reason) => self
                .notices
                .push(format!("latest {category} result unavailable: {reason}")),
        }
    }

    pub(crate) fn apply_backend_status(&mut self, result: Result<BackendStatus, String>) {
        self.finish_query();
        match result {
            Ok(status) => self.backend = Some(status),
            Err(reason) => self
                .notices
                .push(format!("backend status unavailable: {reason}")),
        }
    }

    /// Stops waiting for outstanding lookups. Answers that still arrive are
    /// applied but no longer keep the store busy.
    pub(crate) fn abandon_queries(&mut self) {
        if self.pending_queries > 0 {
            self.pending_queries = 0;
            self.mark_dirty();
        }
    }

    fn finish_query(&mut self) {
        self.pending_queries = self.pending_queries.saturating_sub(1);
        self.mark_dirty();
    }

    fn slot(&self, category: Category) -> &CategorySlot {
        // Every category is inserted at construction.
        &self.slots[&category]
    }

    fn slot_mut(&mut self, category: Category) -> &mut CategorySlot {
        self.slots.entry(category).or_default()
    }

    fn active_slot_mut(&mut self, job_id: JobId) -> Option<&mut CategorySlot> {
        self.slots
            .values_mut()
            .find(|slot| slot.active_job == Some(job_id))
    }
}
