use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use std::sync::Arc;

use visado_binder::{Binder, StartOutcome, StepSource};
use visado_core::{ChatTurn, ChecklistStep, Difficulty, Intent, UserProfile, VisaOption};

/// Gateway adapter: the binder asks for checklists, the advise crate answers.
/// Never errors: generation failures already degrade to the default checklist.
struct AdviseSource;

#[async_trait::async_trait]
impl StepSource for AdviseSource {
    async fn fetch_checklist(&self, option: &VisaOption) -> Result<Vec<ChecklistStep>, String> {
        let settings = visado_core::read_settings();
        Ok(visado_advise::fetch_checklist(option, &settings).await)
    }
}

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SetProfileRequest {
    /// Display name for the user
    name: String,
    /// Country of citizenship, e.g. "Mexico". Drives visa discovery.
    citizenship: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SaveAiSettingsRequest {
    /// LLM provider: "openai", "anthropic", "google", "ollama", "groq", "mistral", or "deepseek"
    provider: String,
    /// API key for the provider. Pass an empty string to keep the existing key.
    api_key: String,
    /// Model name, e.g. "gemini-2.5-flash"
    model: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct DiscoverRequest {
    /// Travel intent: "work", "study", "tourism", or "invest"
    intent: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct StartApplicationRequest {
    /// Destination country exactly as discovery returned it, e.g. "Germany"
    country: String,
    /// Exact visa name, e.g. "Job Seeker Visa". Together with country this identifies the application; starting the same pair again resumes it.
    visa_name: String,
    /// Travel intent: "work", "study", "tourism", or "invest"
    intent: String,
    /// Maximum stay duration, e.g. "6 months"
    max_duration: Option<String>,
    /// Typical processing time, e.g. "4-8 weeks"
    processing_time: Option<String>,
    /// Approval difficulty: "low", "medium", or "high"
    difficulty: Option<String>,
    /// Short requirements summary carried into the application snapshot
    requirements_summary: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct CompleteStepRequest {
    /// ID of the application, e.g. "app-3"
    application_id: String,
    /// ID of the step to mark complete, e.g. "step-2"
    step_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetApplicationRequest {
    /// ID of the application to fetch, e.g. "app-3"
    application_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AskAssistantRequest {
    /// The user's message
    message: String,
    /// Prior conversation turns, oldest first. Omit for a fresh conversation.
    history: Option<Vec<ChatTurn>>,
}

// --- Server ---

#[derive(Clone)]
pub struct VisadoServer {
    binder: Arc<Binder>,
    tool_router: ToolRouter<Self>,
}

impl VisadoServer {
    async fn persist(&self) -> Result<(), String> {
        let registry = self.binder.snapshot().await;
        visado_core::write_binder(&registry)
    }
}

#[tool_router]
impl VisadoServer {
    pub fn new() -> Self {
        let registry = visado_core::read_binder().unwrap_or_else(|e| {
            eprintln!("[visado-mcp] failed to read binder: {}", e);
            vec![]
        });
        Self {
            binder: Arc::new(Binder::new(registry)),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get the stored user profile (name and citizenship)")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let profile = visado_core::read_profile();
        if profile.citizenship.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(
                "No profile yet. Use set_profile to store a name and citizenship.",
            )]));
        }
        let json = serde_json::to_string_pretty(&profile)
            .unwrap_or_else(|e| format!("Serialization error: {}", e));
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Store the user profile. Citizenship drives visa discovery.")]
    fn set_profile(
        &self,
        Parameters(req): Parameters<SetProfileRequest>,
    ) -> Result<CallToolResult, McpError> {
        if req.citizenship.trim().is_empty() {
            return Ok(CallToolResult::error(vec![Content::text(
                "Citizenship must not be empty",
            )]));
        }
        let profile = UserProfile {
            name: req.name,
            citizenship: req.citizenship,
        };
        match visado_core::write_profile(&profile) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Profile saved: {} ({})",
                profile.name, profile.citizenship
            ))])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(
        description = "Get the AI settings. The API key is masked — only whether one is set is reported."
    )]
    fn get_ai_settings(&self) -> Result<CallToolResult, McpError> {
        let settings = visado_core::read_settings();
        let configured = visado_core::ai_configured(&settings);
        let json = serde_json::json!({
            "provider": settings.provider,
            "model": settings.model,
            "hasKey": !settings.api_key.is_empty(),
            "configured": configured,
        });
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&json).unwrap_or_default(),
        )]))
    }

    #[tool(
        description = "Save the AI settings. Without them, discovery, checklists, news, and the assistant fall back to built-in content."
    )]
    fn save_ai_settings(
        &self,
        Parameters(req): Parameters<SaveAiSettingsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut settings = visado_core::read_settings();
        settings.provider = req.provider;
        settings.model = req.model;
        // Empty key means "keep existing"
        if !req.api_key.is_empty() {
            settings.api_key = req.api_key;
        }
        match visado_core::write_settings(&settings) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "AI settings saved: {} ({})",
                settings.provider, settings.model
            ))])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(
        description = "Discover visa options for the stored citizenship and a travel intent. Returns a JSON array of options; pass one's country and visa name to start_application to begin tracking it."
    )]
    async fn discover_options(
        &self,
        Parameters(req): Parameters<DiscoverRequest>,
    ) -> Result<CallToolResult, McpError> {
        let intent = parse_intent(&req.intent)?;
        let profile = visado_core::read_profile();
        if profile.citizenship.is_empty() {
            return Ok(CallToolResult::error(vec![Content::text(
                "No citizenship on file. Call set_profile first.",
            )]));
        }

        let settings = visado_core::read_settings();
        let options = visado_advise::discover_options(&profile.citizenship, intent, &settings).await;
        let json = serde_json::to_string_pretty(&options)
            .unwrap_or_else(|e| format!("Serialization error: {}", e));
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Start an application for a visa option, or resume the existing one for the same (country, visa name) pair. A new application gets a freshly generated checklist snapshot with the first step active; resuming moves the application to the front of the binder without touching its steps or progress."
    )]
    async fn start_application(
        &self,
        Parameters(req): Parameters<StartApplicationRequest>,
    ) -> Result<CallToolResult, McpError> {
        let intent = parse_intent(&req.intent)?;
        if req.country.trim().is_empty() || req.visa_name.trim().is_empty() {
            return Ok(CallToolResult::error(vec![Content::text(
                "Both country and visa_name are required",
            )]));
        }

        let option = VisaOption {
            id: make_option_id(&req.country, &req.visa_name),
            country: req.country,
            visa_name: req.visa_name,
            intent,
            max_duration: req.max_duration.unwrap_or_default(),
            processing_time: req.processing_time.unwrap_or_default(),
            difficulty: req
                .difficulty
                .as_deref()
                .map(parse_difficulty)
                .unwrap_or(Difficulty::Medium),
            requirements_summary: req.requirements_summary.unwrap_or_default(),
        };

        let outcome = match self.binder.start_or_resume(&option, &AdviseSource).await {
            Ok(o) => o,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(e)])),
        };
        if let Err(e) = self.persist().await {
            return Ok(CallToolResult::error(vec![Content::text(e)]));
        }

        let message = match &outcome {
            StartOutcome::Created(id) => {
                let steps = self
                    .binder
                    .application(id)
                    .await
                    .map(|a| a.steps.len())
                    .unwrap_or(0);
                format!(
                    "Started application {}: {} — {} ({} steps, first step active)",
                    id, option.visa_name, option.country, steps
                )
            }
            StartOutcome::Resumed(id) => {
                let progress = self
                    .binder
                    .application(id)
                    .await
                    .map(|a| a.progress)
                    .unwrap_or(0.0);
                format!(
                    "Resumed application {}: {} — {} ({:.0}% complete, moved to front)",
                    id, option.visa_name, option.country, progress
                )
            }
        };
        Ok(CallToolResult::success(vec![Content::text(message)]))
    }

    #[tool(
        description = "Mark a checklist step complete. The step after it unlocks and the application's progress is recomputed. Binder ordering is unchanged — only start_application reorders."
    )]
    async fn complete_step(
        &self,
        Parameters(req): Parameters<CompleteStepRequest>,
    ) -> Result<CallToolResult, McpError> {
        let progress = match self
            .binder
            .complete_step(&req.application_id, &req.step_id)
            .await
        {
            Ok(p) => p,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(e)])),
        };
        if let Err(e) = self.persist().await {
            return Ok(CallToolResult::error(vec![Content::text(e)]));
        }
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Marked step '{}' complete — application {} is now at {:.1}%",
            req.step_id, req.application_id, progress
        ))]))
    }

    #[tool(
        description = "List the applications in the binder, most recently touched first. Returns id, country, visa name, progress, and step counts per application."
    )]
    async fn get_binder(&self) -> Result<CallToolResult, McpError> {
        let registry = self.binder.snapshot().await;
        if registry.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(
                "Binder is empty. Use discover_options to find a visa option and \
                 start_application to begin tracking one.",
            )]));
        }

        let summaries: Vec<serde_json::Value> = registry
            .iter()
            .map(|a| {
                serde_json::json!({
                    "id": a.id,
                    "country": a.visa_option.country,
                    "visaName": a.visa_option.visa_name,
                    "progress": a.progress,
                    "startedAt": a.started_at,
                    "completedSteps": a.steps.iter().filter(|s| s.is_completed).count(),
                    "totalSteps": a.steps.len(),
                })
            })
            .collect();
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&summaries).unwrap_or_default(),
        )]))
    }

    #[tool(
        description = "Get one application in full: its visa option snapshot, every checklist step with status, and progress."
    )]
    async fn get_application(
        &self,
        Parameters(req): Parameters<GetApplicationRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.binder.application(&req.application_id).await {
            Some(application) => {
                let json = serde_json::to_string_pretty(&application)
                    .unwrap_or_else(|e| format!("Serialization error: {}", e));
                Ok(CallToolResult::success(vec![Content::text(json)]))
            }
            None => Ok(CallToolResult::error(vec![Content::text(format!(
                "Application '{}' not found",
                req.application_id
            ))])),
        }
    }

    #[tool(
        description = "Get a short digest of recent immigration news and policy changes as a JSON array."
    )]
    async fn latest_news(&self) -> Result<CallToolResult, McpError> {
        let settings = visado_core::read_settings();
        let news = visado_advise::latest_news(&settings).await;
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&news).unwrap_or_default(),
        )]))
    }

    #[tool(
        description = "Ask the immigration assistant a question. Pass prior turns in history to continue a conversation."
    )]
    async fn ask_assistant(
        &self,
        Parameters(req): Parameters<AskAssistantRequest>,
    ) -> Result<CallToolResult, McpError> {
        let settings = visado_core::read_settings();
        let history = req.history.unwrap_or_default();
        let reply = visado_advise::assistant_reply(&history, &req.message, &settings).await;
        Ok(CallToolResult::success(vec![Content::text(reply)]))
    }

    #[tool(description = "Get the seeded community feed as a JSON array of posts")]
    fn community_posts(&self) -> Result<CallToolResult, McpError> {
        let posts = visado_core::community::seeded_posts();
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&posts).unwrap_or_default(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for VisadoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Helpers ---

fn parse_intent(s: &str) -> Result<Intent, McpError> {
    match s.to_ascii_lowercase().as_str() {
        "work" => Ok(Intent::Work),
        "study" => Ok(Intent::Study),
        "tourism" => Ok(Intent::Tourism),
        "invest" => Ok(Intent::Invest),
        _ => Err(McpError::invalid_params(
            format!(
                "Invalid intent '{}'. Must be: work, study, tourism, invest",
                s
            ),
            None,
        )),
    }
}

fn parse_difficulty(s: &str) -> Difficulty {
    match s.to_ascii_lowercase().as_str() {
        "low" => Difficulty::Low,
        "high" => Difficulty::High,
        _ => Difficulty::Medium,
    }
}

/// Generate an option id from country and visa name.
fn make_option_id(country: &str, visa_name: &str) -> String {
    let slug = |s: &str| {
        s.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect::<String>()
    };
    format!("opt-{}-{}", slug(country), slug(visa_name))
}

const INSTRUCTIONS: &str = r#"visado is an immigration exploration companion. It discovers visa routes for a citizenship and intent, then tracks simulated applications as checklists in a binder.

## Workflow
1. `set_profile` stores the user's name and citizenship — citizenship drives discovery.
2. `save_ai_settings` configures the LLM provider. Without it every content tool still works, answering from built-in fallback data.
3. `discover_options` lists visa routes for an intent ("work", "study", "tourism", "invest").
4. `start_application` begins tracking a route. The checklist is generated once and snapshotted; the first step is active, the rest locked.
5. `complete_step` marks the active step done and unlocks the next one.
6. `get_binder` / `get_application` read progress back.

## Binder semantics
- One application per (country, visa name) pair. Starting the same pair again never duplicates it — the existing application is resumed and moved to the front of the binder.
- An application's checklist is a snapshot fixed at creation. Resuming or re-running discovery never rewrites it.
- Progress is derived: 100 × completed steps / total steps.
- Applications are never deleted; the binder persists in ~/.visado/binder.json.

## IDs
Application IDs: "app-N". Step IDs: "step-N", unique within their application. Use get_binder and get_application to discover them."#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle `visado-mcp init` subcommand
    if std::env::args().nth(1).as_deref() == Some("init") {
        return init_project();
    }

    let service = VisadoServer::new()
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| eprintln!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}

/// Write project-scoped MCP config files in the current directory so that
/// Claude Code and/or Codex discover visado-mcp when working in this project.
/// Only writes config for tools that are actually installed.
fn init_project() -> Result<(), Box<dyn std::error::Error>> {
    let binary_path = std::env::current_exe()?
        .canonicalize()?
        .to_string_lossy()
        .to_string();

    let cwd = std::env::current_dir()?;

    let has_claude = which("claude");
    let has_codex = which("codex");

    if !has_claude && !has_codex {
        eprintln!("Neither `claude` nor `codex` found in PATH.");
        eprintln!("Install Claude Code or OpenAI Codex first, then re-run `visado-mcp init`.");
        std::process::exit(1);
    }

    let mut wrote_any = false;

    if has_claude {
        init_claude_code(&cwd, &binary_path)?;
        wrote_any = true;
    }

    if has_codex {
        init_codex(&cwd, &binary_path)?;
        wrote_any = true;
    }

    if wrote_any {
        let tools: Vec<&str> = [
            if has_claude { Some("Claude Code") } else { None },
            if has_codex { Some("Codex") } else { None },
        ]
        .into_iter()
        .flatten()
        .collect();
        eprintln!("\nDone. {} will use visado in this project.", tools.join(" and "));
    }

    Ok(())
}

fn which(name: &str) -> bool {
    // Check PATH for the given binary
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| {
                let candidate = dir.join(name);
                candidate.is_file() || dir.join(format!("{name}.exe")).is_file()
            })
        })
        .unwrap_or(false)
}

/// Write .mcp.json for Claude Code, merging with any existing config.
fn init_claude_code(
    cwd: &std::path::Path,
    binary_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mcp_json_path = cwd.join(".mcp.json");
    let mut root: serde_json::Value = if mcp_json_path.exists() {
        let contents = std::fs::read_to_string(&mcp_json_path)?;
        serde_json::from_str(&contents).unwrap_or_else(|_| serde_json::json!({}))
    } else {
        serde_json::json!({})
    };

    if !root.get("mcpServers").is_some_and(|v| v.is_object()) {
        root["mcpServers"] = serde_json::json!({});
    }
    root["mcpServers"]["visado"] = serde_json::json!({
        "type": "stdio",
        "command": binary_path,
        "args": [],
    });

    std::fs::write(&mcp_json_path, serde_json::to_string_pretty(&root)?)?;
    eprintln!("Wrote {}", mcp_json_path.display());
    Ok(())
}

/// Write .codex/config.toml for OpenAI Codex, merging with any existing config.
fn init_codex(
    cwd: &std::path::Path,
    binary_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let codex_dir = cwd.join(".codex");
    let config_toml_path = codex_dir.join("config.toml");

    let mut doc: toml_edit::DocumentMut = if config_toml_path.exists() {
        std::fs::read_to_string(&config_toml_path)?
            .parse()
            .unwrap_or_default()
    } else {
        toml_edit::DocumentMut::new()
    };

    if !doc.contains_table("mcp_servers") {
        doc["mcp_servers"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    let mut server = toml_edit::Table::new();
    server.insert("command", toml_edit::value(binary_path));
    server.insert("args", toml_edit::value(toml_edit::Array::new()));
    doc["mcp_servers"]["visado"] = toml_edit::Item::Table(server);

    std::fs::create_dir_all(&codex_dir)?;
    std::fs::write(&config_toml_path, doc.to_string())?;
    eprintln!("Wrote {}", config_toml_path.display());
    Ok(())
}
