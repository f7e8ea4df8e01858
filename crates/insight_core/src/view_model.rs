use serde_json::Value;

use crate::{BackendStatus, Category, JobId, JobPhase};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub rows: Vec<CategoryRowView>,
    pub backend: Option<BackendStatus>,
    pub notices: Vec<String>,
    pub busy: bool,
}

impl AppViewModel {
    pub fn row(&self, category: Category) -> Option<&CategoryRowView> {
        self.rows.iter().find(|row| row.category == category)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRowView {
    pub category: Category,
    pub job_id: Option<JobId>,
    pub phase: JobPhase,
    pub loading: bool,
    pub task_id: Option<String>,
    pub steps: Vec<String>,
    pub current_step: Option<usize>,
    pub poll_attempts: u32,
    pub result: Option<Value>,
    pub failure_reason: Option<String>,
}

impl CategoryRowView {
    pub fn current_step_label(&self) -> Option<&str> {
        self.current_step
            .and_then(|index| self.steps.get(index))
            .map(String::as_str)
    }
}
