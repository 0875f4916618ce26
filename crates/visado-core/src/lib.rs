pub mod community;
pub mod registry;
pub mod steps;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// --- Types ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Intent {
    Work,
    Study,
    Tourism,
    Invest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Locked,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// A visa route surfaced by discovery. Identity for deduplication is the
/// (country, visaName) pair, never the generated id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisaOption {
    pub id: String,
    pub country: String,
    pub visa_name: String,
    pub intent: Intent,
    #[serde(default)]
    pub max_duration: String,
    #[serde(default)]
    pub processing_time: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub requirements_summary: String,
}

fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}

impl VisaOption {
    /// The case-sensitive identity pair used for instance deduplication.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.country, &self.visa_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_doc: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default = "default_step_status")]
    pub status: StepStatus,
}

fn default_step_status() -> StepStatus {
    StepStatus::Locked
}

/// One in-progress application. The visa option and step list are a snapshot
/// fixed at creation time; later regeneration of the catalog never alters them.
/// `progress` is derived from the steps and is never set independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInstance {
    pub id: String,
    pub visa_option: VisaOption,
    pub steps: Vec<ChecklistStep>,
    pub started_at: String,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    /// Country of citizenship; drives discovery queries.
    #[serde(default)]
    pub citizenship: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsUpdate {
    pub id: String,
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub date: String,
    pub impact_level: ImpactLevel,
}

/// One turn of an assistant conversation. The caller owns the transcript and
/// passes it back in as history.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: String,
    pub user_name: String,
    pub title: String,
    pub content: String,
    pub likes: u32,
    pub comments: u32,
    pub timestamp: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

// --- Storage ---

/// Resolve the global data directory (~/.visado/).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".visado")
}

fn binder_path() -> PathBuf {
    data_dir().join("binder.json")
}

/// Read the persisted application binder. A missing file is an empty binder.
pub fn read_binder() -> Result<Vec<ApplicationInstance>, String> {
    let path = binder_path();
    if !path.exists() {
        return Ok(vec![]);
    }
    let raw = fs::read_to_string(&path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

/// Write the application binder.
///
/// Uses atomic write (temp file + rename) so a crash mid-save never leaves a
/// truncated binder behind.
pub fn write_binder(registry: &[ApplicationInstance]) -> Result<(), String> {
    let dir = data_dir();
    fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(registry).map_err(|e| e.to_string())?;
    let tmp = dir.join(".binder.json.tmp");
    fs::write(&tmp, json).map_err(|e| e.to_string())?;
    fs::rename(&tmp, binder_path()).map_err(|e| e.to_string())
}

// --- User profile ---

fn profile_path() -> PathBuf {
    data_dir().join("profile.json")
}

pub fn read_profile() -> UserProfile {
    let path = profile_path();
    if !path.exists() {
        return UserProfile::default();
    }
    fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_profile(profile: &UserProfile) -> Result<(), String> {
    let dir = data_dir();
    fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(profile).map_err(|e| e.to_string())?;
    fs::write(profile_path(), json).map_err(|e| e.to_string())
}

// --- AI Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

pub fn read_settings() -> AiSettings {
    let path = settings_path();
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_settings(settings: &AiSettings) -> Result<(), String> {
    let dir = data_dir();
    fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    fs::write(settings_path(), json).map_err(|e| e.to_string())
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}
