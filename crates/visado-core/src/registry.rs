use crate::{steps, ApplicationInstance, VisaOption};

/// Find the instance matching an option's (country, visaName) identity.
/// The match is a case-sensitive exact comparison.
pub fn find_instance(registry: &[ApplicationInstance], option: &VisaOption) -> Option<usize> {
    registry
        .iter()
        .position(|a| a.visa_option.dedup_key() == option.dedup_key())
}

/// Move an existing instance to the front (most recently touched) and return
/// its id. The instance itself is not otherwise modified.
pub fn resume(registry: &mut Vec<ApplicationInstance>, index: usize) -> String {
    let instance = registry.remove(index);
    let id = instance.id.clone();
    registry.insert(0, instance);
    id
}

/// Generate the next application id by scanning existing instances.
/// Follows the "app-{N}" pattern with N incrementing.
pub fn next_application_id(registry: &[ApplicationInstance]) -> String {
    let max = registry
        .iter()
        .filter_map(|a| a.id.strip_prefix("app-").and_then(|s| s.parse::<u64>().ok()))
        .max()
        .unwrap_or(0);
    format!("app-{}", max + 1)
}

/// Apply a step completion to one instance and recompute its progress.
/// Position in the ordering is unchanged; only start/resume reorders.
/// Returns the new progress percentage.
pub fn record_step_completion(
    registry: &mut [ApplicationInstance],
    instance_id: &str,
    step_id: &str,
) -> Result<f64, String> {
    let instance = registry
        .iter_mut()
        .find(|a| a.id == instance_id)
        .ok_or_else(|| format!("application '{}' not found", instance_id))?;
    if !instance.steps.iter().any(|s| s.id == step_id) {
        return Err(format!(
            "step '{}' not found in application '{}'",
            step_id, instance_id
        ));
    }
    instance.steps = steps::apply_completion(&instance.steps, step_id);
    instance.progress = steps::progress(&instance.steps);
    Ok(instance.progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChecklistStep, Difficulty, Intent, StepStatus};

    fn option(country: &str, visa: &str) -> VisaOption {
        VisaOption {
            id: format!("opt-{}", visa.to_lowercase()),
            country: country.to_string(),
            visa_name: visa.to_string(),
            intent: Intent::Work,
            max_duration: "6 months".to_string(),
            processing_time: "4-8 weeks".to_string(),
            difficulty: Difficulty::Medium,
            requirements_summary: String::new(),
        }
    }

    fn instance(id: &str, country: &str, visa: &str) -> ApplicationInstance {
        let steps = vec![
            ChecklistStep {
                id: "step-1".to_string(),
                title: "Visa Research".to_string(),
                description: String::new(),
                required_doc: None,
                is_completed: false,
                status: StepStatus::Active,
            },
            ChecklistStep {
                id: "step-2".to_string(),
                title: "Gather Documents".to_string(),
                description: String::new(),
                required_doc: None,
                is_completed: false,
                status: StepStatus::Locked,
            },
        ];
        ApplicationInstance {
            id: id.to_string(),
            visa_option: option(country, visa),
            steps,
            started_at: "2026-08-06".to_string(),
            progress: 0.0,
        }
    }

    #[test]
    fn find_matches_on_country_and_visa_name_only() {
        let registry = vec![instance("app-1", "Germany", "Job Seeker Visa")];
        let mut same = option("Germany", "Job Seeker Visa");
        same.id = "opt-something-else".to_string();
        assert_eq!(find_instance(&registry, &same), Some(0));
        assert_eq!(
            find_instance(&registry, &option("Germany", "Student Visa")),
            None
        );
        // Case-sensitive exact match.
        assert_eq!(
            find_instance(&registry, &option("germany", "Job Seeker Visa")),
            None
        );
    }

    #[test]
    fn resume_moves_the_instance_to_the_front() {
        let mut registry = vec![
            instance("app-1", "Germany", "Job Seeker Visa"),
            instance("app-2", "Canada", "Express Entry"),
        ];
        let id = resume(&mut registry, 1);
        assert_eq!(id, "app-2");
        assert_eq!(registry[0].id, "app-2");
        assert_eq!(registry[1].id, "app-1");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn application_ids_increment_past_the_highest_seen() {
        assert_eq!(next_application_id(&[]), "app-1");
        let registry = vec![
            instance("app-3", "Germany", "Job Seeker Visa"),
            instance("app-1", "Canada", "Express Entry"),
        ];
        assert_eq!(next_application_id(&registry), "app-4");
    }

    #[test]
    fn completing_a_step_updates_progress_in_place() {
        let mut registry = vec![
            instance("app-1", "Germany", "Job Seeker Visa"),
            instance("app-2", "Canada", "Express Entry"),
        ];
        let progress = record_step_completion(&mut registry, "app-2", "step-1").unwrap();
        assert_eq!(progress, 50.0);
        // Ordering unchanged: only start/resume reorders.
        assert_eq!(registry[0].id, "app-1");
        assert_eq!(registry[1].progress, 50.0);
        assert_eq!(registry[1].steps[1].status, StepStatus::Active);
    }

    #[test]
    fn unknown_ids_are_reported_not_swallowed() {
        let mut registry = vec![instance("app-1", "Germany", "Job Seeker Visa")];
        assert!(record_step_completion(&mut registry, "app-9", "step-1").is_err());
        assert!(record_step_completion(&mut registry, "app-1", "step-9").is_err());
        // A failed lookup leaves the registry untouched.
        assert_eq!(registry[0].progress, 0.0);
    }
}
