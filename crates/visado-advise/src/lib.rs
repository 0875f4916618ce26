pub mod engine;
mod fallback;
mod parse;
mod prompt;

use visado_core::{steps, AiSettings, ChatTurn, ChecklistStep, Intent, NewsUpdate, VisaOption};

/// Discover visa routes for a citizenship and intent via the configured LLM.
/// Falls back to seeded routes on failure or when AI is not configured;
/// callers never observe a transport error, only data.
pub async fn discover_options(
    citizenship: &str,
    intent: Intent,
    settings: &AiSettings,
) -> Vec<VisaOption> {
    if !visado_core::ai_configured(settings) {
        return fallback::default_options(intent);
    }

    let system = prompt::discovery_system_prompt();
    let user_msg = prompt::discovery_message(citizenship, intent);

    eprintln!(
        "[visado-advise] discovery via {} ({})",
        settings.provider, settings.model
    );

    match engine::generate(settings, &system, &user_msg).await {
        Ok(raw) => {
            let options = parse::parse_visa_options(&raw, intent);
            eprintln!("[visado-advise] parsed {} visa options", options.len());
            if options.is_empty() {
                fallback::default_options(intent)
            } else {
                options
            }
        }
        Err(e) => {
            eprintln!("[visado-advise] discovery error: {}", e);
            fallback::default_options(intent)
        }
    }
}

/// Generate the application checklist for one visa option. The result is
/// already normalized: first step active, the rest locked, ids unique.
pub async fn fetch_checklist(option: &VisaOption, settings: &AiSettings) -> Vec<ChecklistStep> {
    let drafts = if !visado_core::ai_configured(settings) {
        fallback::default_checklist()
    } else {
        let system = prompt::checklist_system_prompt();
        let user_msg = prompt::checklist_message(&option.visa_name, &option.country);

        eprintln!(
            "[visado-advise] checklist for {} ({}) via {}",
            option.visa_name, option.country, settings.provider
        );

        match engine::generate(settings, &system, &user_msg).await {
            Ok(raw) => {
                let steps = parse::parse_checklist(&raw);
                eprintln!("[visado-advise] parsed {} checklist steps", steps.len());
                if steps.is_empty() {
                    fallback::default_checklist()
                } else {
                    steps
                }
            }
            Err(e) => {
                eprintln!("[visado-advise] checklist error: {}", e);
                fallback::default_checklist()
            }
        }
    };

    steps::normalize_checklist(drafts)
}

/// Fetch a short immigration-policy digest. Falls back to the static digest.
pub async fn latest_news(settings: &AiSettings) -> Vec<NewsUpdate> {
    if !visado_core::ai_configured(settings) {
        return fallback::default_news();
    }

    let system = prompt::news_system_prompt();
    let user_msg = prompt::news_message();

    eprintln!(
        "[visado-advise] news via {} ({})",
        settings.provider, settings.model
    );

    match engine::generate(settings, &system, &user_msg).await {
        Ok(raw) => {
            let news = parse::parse_news(&raw);
            eprintln!("[visado-advise] parsed {} news items", news.len());
            if news.is_empty() {
                fallback::default_news()
            } else {
                news
            }
        }
        Err(e) => {
            eprintln!("[visado-advise] news error: {}", e);
            fallback::default_news()
        }
    }
}

/// Answer one assistant turn in the context of a conversation. Always returns
/// text; failures degrade to a canned reply.
pub async fn assistant_reply(
    history: &[ChatTurn],
    message: &str,
    settings: &AiSettings,
) -> String {
    if !visado_core::ai_configured(settings) {
        return fallback::OFFLINE_REPLY.to_string();
    }

    let system = prompt::assistant_system_prompt();

    match engine::converse(settings, &system, history, message).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("[visado-advise] assistant error: {}", e);
            fallback::ERROR_REPLY.to_string()
        }
    }
}
