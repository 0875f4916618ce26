use std::collections::HashSet;

use crate::{ChecklistStep, StepStatus};

/// Mark one step complete and unlock its successor.
///
/// Pure: returns a new sequence, the input is never mutated. The step
/// immediately after the target transitions from locked to active; no other
/// status changes occur, so an already-completed successor is never downgraded.
/// An unknown target id returns the sequence structurally unchanged.
pub fn apply_completion(steps: &[ChecklistStep], target_step_id: &str) -> Vec<ChecklistStep> {
    let mut out: Vec<ChecklistStep> = steps.to_vec();
    let Some(idx) = out.iter().position(|s| s.id == target_step_id) else {
        return out;
    };
    out[idx].is_completed = true;
    out[idx].status = StepStatus::Completed;
    if let Some(next) = out.get_mut(idx + 1) {
        if next.status == StepStatus::Locked {
            next.status = StepStatus::Active;
        }
    }
    out
}

/// Completion ratio as a percentage in [0, 100].
/// An empty checklist reports 0 rather than dividing by zero.
pub fn progress(steps: &[ChecklistStep]) -> f64 {
    if steps.is_empty() {
        return 0.0;
    }
    let completed = steps.iter().filter(|s| s.is_completed).count();
    100.0 * completed as f64 / steps.len() as f64
}

/// Sanitize draft steps from the content gateway into a fresh checklist:
/// blank or duplicate ids are reassigned, completion flags are cleared, and
/// statuses are forced to [active, locked, locked, ..].
pub fn normalize_checklist(drafts: Vec<ChecklistStep>) -> Vec<ChecklistStep> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut steps = drafts;
    for (i, step) in steps.iter_mut().enumerate() {
        if step.id.trim().is_empty() || !seen.insert(step.id.clone()) {
            let mut n = i + 1;
            step.id = loop {
                let candidate = format!("step-{}", n);
                if seen.insert(candidate.clone()) {
                    break candidate;
                }
                n += 1;
            };
        }
        step.is_completed = false;
        step.status = if i == 0 {
            StepStatus::Active
        } else {
            StepStatus::Locked
        };
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, status: StepStatus) -> ChecklistStep {
        ChecklistStep {
            id: id.to_string(),
            title: format!("Step {}", id),
            description: String::new(),
            required_doc: None,
            is_completed: status == StepStatus::Completed,
            status,
        }
    }

    fn three_steps() -> Vec<ChecklistStep> {
        vec![
            step("a", StepStatus::Active),
            step("b", StepStatus::Locked),
            step("c", StepStatus::Locked),
        ]
    }

    #[test]
    fn completing_the_active_step_unlocks_the_next() {
        let result = apply_completion(&three_steps(), "a");
        assert!(result[0].is_completed);
        assert_eq!(result[0].status, StepStatus::Completed);
        assert_eq!(result[1].status, StepStatus::Active);
        assert!(!result[1].is_completed);
        assert_eq!(result[2].status, StepStatus::Locked);
        assert!((progress(&result) - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn completing_the_last_step_has_no_successor_to_unlock() {
        let mut steps = three_steps();
        steps = apply_completion(&steps, "a");
        steps = apply_completion(&steps, "b");
        steps = apply_completion(&steps, "c");
        assert!(steps.iter().all(|s| s.is_completed));
        assert_eq!(progress(&steps), 100.0);
    }

    #[test]
    fn reapplying_a_completion_never_unsets_later_state() {
        let mut steps = three_steps();
        steps = apply_completion(&steps, "a");
        steps = apply_completion(&steps, "b");
        let again = apply_completion(&steps, "a");
        assert_eq!(again, steps);
        assert!(again[1].is_completed);
        assert_eq!(again[2].status, StepStatus::Active);
    }

    #[test]
    fn a_completed_successor_is_never_downgraded() {
        let steps = vec![
            step("a", StepStatus::Active),
            step("b", StepStatus::Completed),
        ];
        let result = apply_completion(&steps, "a");
        assert_eq!(result[1].status, StepStatus::Completed);
        assert!(result[1].is_completed);
    }

    #[test]
    fn unknown_target_returns_the_sequence_unchanged() {
        let steps = three_steps();
        let result = apply_completion(&steps, "zz");
        assert_eq!(result, steps);
    }

    #[test]
    fn progress_is_the_exact_completion_ratio() {
        let steps = three_steps();
        assert_eq!(progress(&steps), 0.0);
        let one = apply_completion(&steps, "a");
        assert!((progress(&one) - 33.333333333333336).abs() < 1e-9);
    }

    #[test]
    fn progress_of_an_empty_checklist_is_zero() {
        assert_eq!(progress(&[]), 0.0);
    }

    #[test]
    fn normalize_forces_first_active_rest_locked() {
        let drafts = vec![
            step("x", StepStatus::Completed),
            step("y", StepStatus::Active),
            step("z", StepStatus::Completed),
        ];
        let steps = normalize_checklist(drafts);
        assert_eq!(steps[0].status, StepStatus::Active);
        assert_eq!(steps[1].status, StepStatus::Locked);
        assert_eq!(steps[2].status, StepStatus::Locked);
        assert!(steps.iter().all(|s| !s.is_completed));
    }

    #[test]
    fn normalize_reassigns_blank_and_duplicate_ids() {
        let drafts = vec![
            step("step-2", StepStatus::Locked),
            step("step-2", StepStatus::Locked),
            step("", StepStatus::Locked),
        ];
        let steps = normalize_checklist(drafts);
        let ids: HashSet<&str> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(steps[0].id, "step-2");
    }

    #[test]
    fn normalize_accepts_an_empty_draft_set() {
        assert!(normalize_checklist(vec![]).is_empty());
    }
}
