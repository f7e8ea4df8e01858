use insight_core::{AppViewModel, Category, CategoryRowView, JobPhase};

/// Lines describing what changed between two views, in category order.
///
/// Notices in `next` are always rendered; the caller drains them from the
/// store once printed.
pub fn render_changes(prev: &AppViewModel, next: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    for row in &next.rows {
        let before = prev.row(row.category);
        let new_job = before.map(|b| b.job_id) != Some(row.job_id);
        let phase_changed = before.map(|b| b.phase) != Some(row.phase);

        if phase_changed || (new_job && row.loading) {
            if let Some(line) = phase_line(row, before) {
                lines.push(line);
            }
        }

        let step_changed = before.map(|b| b.current_step) != Some(row.current_step);
        if step_changed || new_job {
            if let (Some(index), Some(label)) = (row.current_step, row.current_step_label()) {
                lines.push(format!(
                    "{}: [{}/{}] {}",
                    row.category,
                    index + 1,
                    row.steps.len(),
                    label
                ));
            }
        }
    }

    if next.backend != prev.backend {
        if let Some(status) = &next.backend {
            lines.push(format!(
                "backend {}: {} active task(s), {} completed analyses",
                status.status, status.active_tasks, status.completed_analyses
            ));
        }
    }

    for notice in &next.notices {
        lines.push(format!("note: {notice}"));
    }

    lines
}

fn phase_line(row: &CategoryRowView, before: Option<&CategoryRowView>) -> Option<String> {
    let category = row.category;
    let line = match row.phase {
        JobPhase::Idle => {
            if before.is_some_and(|b| b.loading) {
                format!("{category}: discarded")
            } else {
                return None;
            }
        }
        JobPhase::Submitting => format!("{category}: submitting analysis"),
        JobPhase::Running => match &row.task_id {
            Some(task_id) => format!("{category}: running as task {task_id}"),
            None => format!("{category}: running"),
        },
        JobPhase::Completed => format!(
            "{category}: completed after {} poll(s)",
            row.poll_attempts
        ),
        JobPhase::Failed => format!(
            "{category}: failed ({})",
            row.failure_reason.as_deref().unwrap_or("unknown reason")
        ),
        JobPhase::TimedOut => format!(
            "{category}: gave up after {} poll(s) without a result",
            row.poll_attempts
        ),
    };
    Some(line)
}

/// Final report for the requested categories.
pub fn summary(view: &AppViewModel, categories: &[Category], print_results: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for category in categories {
        let Some(row) = view.row(*category) else {
            continue;
        };
        let status = match row.phase {
            JobPhase::Completed => "completed".to_string(),
            JobPhase::Failed => format!(
                "failed: {}",
                row.failure_reason.as_deref().unwrap_or("unknown reason")
            ),
            JobPhase::TimedOut => format!("timed out after {} poll(s)", row.poll_attempts),
            JobPhase::Idle => "discarded".to_string(),
            JobPhase::Submitting | JobPhase::Running => "still running".to_string(),
        };
        lines.push(format!("{category}: {status}"));

        if print_results && row.phase == JobPhase::Completed {
            if let Some(result) = &row.result {
                lines.extend(pretty_json(result).lines().map(|line| format!("  {line}")));
            }
        }
    }
    lines
}

pub fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
