use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use visado_core::{registry, steps, ApplicationInstance, ChecklistStep, VisaOption};

/// Supplies the initial checklist for a new application instance.
#[async_trait]
pub trait StepSource: Send + Sync {
    async fn fetch_checklist(&self, option: &VisaOption) -> Result<Vec<ChecklistStep>, String>;
}

/// Outcome of a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new instance was created with this id.
    Created(String),
    /// An instance for the option already existed; it was moved to the front.
    Resumed(String),
}

impl StartOutcome {
    pub fn instance_id(&self) -> &str {
        match self {
            StartOutcome::Created(id) | StartOutcome::Resumed(id) => id,
        }
    }
}

type OptionKey = (String, String);

/// In-memory binder of application instances, most recently touched first.
///
/// At most one instance exists per (country, visaName) pair. Concurrent starts
/// for the same pair are serialized through a per-key gate: the second caller
/// blocks until the first resolves, then resumes the instance it created.
/// Instances for different pairs are created concurrently without contention.
pub struct Binder {
    state: Mutex<Vec<ApplicationInstance>>,
    starting: Mutex<HashMap<OptionKey, Arc<Mutex<()>>>>,
}

impl Binder {
    pub fn new(registry: Vec<ApplicationInstance>) -> Self {
        Binder {
            state: Mutex::new(registry),
            starting: Mutex::new(HashMap::new()),
        }
    }

    /// Resume the instance for `option` if one exists, otherwise fetch a
    /// checklist and create one. A fetch failure leaves the binder unchanged;
    /// no partial instance is ever inserted.
    pub async fn start_or_resume(
        &self,
        option: &VisaOption,
        source: &dyn StepSource,
    ) -> Result<StartOutcome, String> {
        let key: OptionKey = (option.country.clone(), option.visa_name.clone());

        // Fast path: the option already has an instance.
        {
            let mut state = self.state.lock().await;
            if let Some(idx) = registry::find_instance(&state, option) {
                return Ok(StartOutcome::Resumed(registry::resume(&mut state, idx)));
            }
        }

        // Claim the per-key gate so only one fetch-and-insert runs per pair.
        let gate = {
            let mut starting = self.starting.lock().await;
            starting
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _claim = gate.lock().await;

        // A racing start may have inserted while we waited on the gate.
        {
            let mut state = self.state.lock().await;
            if let Some(idx) = registry::find_instance(&state, option) {
                return Ok(StartOutcome::Resumed(registry::resume(&mut state, idx)));
            }
        }

        // The fetch suspends without holding the state lock, so instances for
        // other keys keep flowing while this one is in flight.
        let drafts = source.fetch_checklist(option).await?;
        let checklist = steps::normalize_checklist(drafts);

        let id = {
            let mut state = self.state.lock().await;
            let instance = ApplicationInstance {
                id: registry::next_application_id(&state),
                visa_option: option.clone(),
                progress: steps::progress(&checklist),
                steps: checklist,
                started_at: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            };
            let id = instance.id.clone();
            state.insert(0, instance);
            id
        };

        // Drop the gate entry only now that the instance is visible; a failed
        // fetch keeps it so retries for the key stay serialized.
        self.starting.lock().await.remove(&key);

        Ok(StartOutcome::Created(id))
    }

    /// Mark a step complete on one instance and return the new progress.
    /// Unknown instance or step ids are reported as errors; the ordering of
    /// the binder is unchanged.
    pub async fn complete_step(&self, instance_id: &str, step_id: &str) -> Result<f64, String> {
        let mut state = self.state.lock().await;
        registry::record_step_completion(&mut state, instance_id, step_id)
    }

    /// Clone of the full registry, most recently touched first.
    pub async fn snapshot(&self) -> Vec<ApplicationInstance> {
        self.state.lock().await.clone()
    }

    /// Look up one instance by id.
    pub async fn application(&self, instance_id: &str) -> Option<ApplicationInstance> {
        self.state
            .lock()
            .await
            .iter()
            .find(|a| a.id == instance_id)
            .cloned()
    }
}
