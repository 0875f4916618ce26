use serde::de::DeserializeOwned;

use visado_core::{ChecklistStep, Difficulty, ImpactLevel, Intent, NewsUpdate, VisaOption};

#[derive(serde::Deserialize)]
struct LlmVisa {
    country: String,
    visa: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    processing: String,
    difficulty: Option<String>,
    #[serde(default)]
    summary: String,
}

#[derive(serde::Deserialize)]
struct LlmStep {
    title: String,
    #[serde(default)]
    desc: String,
    doc: Option<String>,
}

#[derive(serde::Deserialize)]
struct LlmNews {
    headline: String,
    #[serde(default)]
    summary: String,
    impact: Option<String>,
    #[serde(default)]
    date: String,
    url: Option<String>,
}

/// Parse raw LLM output into visa options. The requested intent is stamped
/// onto every item; entries without a country or visa name are dropped.
/// Returns empty vec on total parse failure (graceful degradation).
pub fn parse_visa_options(raw: &str, intent: Intent) -> Vec<VisaOption> {
    let items: Vec<LlmVisa> = parse_array(raw);
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| {
            if v.country.trim().is_empty() || v.visa.trim().is_empty() {
                return None;
            }
            Some(VisaOption {
                id: format!("opt-{}", i + 1),
                country: v.country,
                visa_name: v.visa,
                intent,
                max_duration: v.duration,
                processing_time: v.processing,
                difficulty: map_difficulty(v.difficulty.as_deref()),
                requirements_summary: v.summary,
            })
        })
        .collect()
}

/// Parse raw LLM output into draft checklist steps. Statuses are left for the
/// caller to normalize; entries without a title are dropped.
pub fn parse_checklist(raw: &str) -> Vec<ChecklistStep> {
    let items: Vec<LlmStep> = parse_array(raw);
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, s)| {
            if s.title.trim().is_empty() {
                return None;
            }
            Some(ChecklistStep {
                id: format!("step-{}", i + 1),
                title: s.title,
                description: s.desc,
                required_doc: s.doc.filter(|d| !d.trim().is_empty()),
                is_completed: false,
                status: visado_core::StepStatus::Locked,
            })
        })
        .collect()
}

/// Parse raw LLM output into news updates.
pub fn parse_news(raw: &str) -> Vec<NewsUpdate> {
    let items: Vec<LlmNews> = parse_array(raw);
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, n)| {
            if n.headline.trim().is_empty() {
                return None;
            }
            Some(NewsUpdate {
                id: format!("news-{}", i + 1),
                headline: n.headline,
                summary: n.summary,
                source_url: n.url.filter(|u| !u.trim().is_empty()),
                date: n.date,
                impact_level: map_impact(n.impact.as_deref()),
            })
        })
        .collect()
}

/// Extract and parse the JSON array from raw LLM output. Tries a full array
/// parse first, then falls back to object-by-object salvage.
fn parse_array<T: DeserializeOwned>(raw: &str) -> Vec<T> {
    let json_str = match extract_json_array(raw) {
        Some(s) => s,
        None => return vec![],
    };

    match serde_json::from_str(&json_str) {
        Ok(items) => items,
        Err(_) => parse_object_by_object(&json_str),
    }
}

/// Extract the JSON array substring from raw LLM output.
fn extract_json_array(raw: &str) -> Option<String> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(raw[start..=end].to_string())
}

/// Try to parse individual objects from a malformed JSON array.
fn parse_object_by_object<T: DeserializeOwned>(json_str: &str) -> Vec<T> {
    let inner = json_str
        .trim()
        .strip_prefix('[')
        .unwrap_or(json_str)
        .strip_suffix(']')
        .unwrap_or(json_str);

    let mut items = Vec::new();
    let mut depth = 0;
    let mut start = None;

    for (i, ch) in inner.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        let obj_str = &inner[s..=i];
                        if let Ok(item) = serde_json::from_str::<T>(obj_str) {
                            items.push(item);
                        }
                    }
                    start = None;
                }
            }
            _ => {}
        }
    }

    items
}

fn map_difficulty(s: Option<&str>) -> Difficulty {
    match s.map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("low") => Difficulty::Low,
        Some("high") => Difficulty::High,
        _ => Difficulty::Medium,
    }
}

fn map_impact(s: Option<&str>) -> ImpactLevel {
    match s.map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("high") => ImpactLevel::High,
        Some("medium") => ImpactLevel::Medium,
        _ => ImpactLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_is_extracted_from_surrounding_prose() {
        let raw = "Here are your routes:\n```json\n[{\"country\":\"Germany\",\
\"visa\":\"Job Seeker Visa\",\"duration\":\"6 months\",\"processing\":\"4-8 weeks\",\
\"difficulty\":\"medium\",\"summary\":\"Degree plus funds.\"}]\n```\nGood luck!";
        let options = parse_visa_options(raw, Intent::Work);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].country, "Germany");
        assert_eq!(options[0].visa_name, "Job Seeker Visa");
        assert_eq!(options[0].intent, Intent::Work);
        assert_eq!(options[0].difficulty, Difficulty::Medium);
    }

    #[test]
    fn malformed_arrays_are_salvaged_object_by_object() {
        // Trailing comma breaks the full parse; both objects should survive.
        let raw = "[{\"headline\":\"Fee increase\",\"summary\":\"Fees rise.\",\
\"impact\":\"medium\",\"date\":\"2026-07-01\"},\
{\"headline\":\"Bulletin moves\",\"summary\":\"Dates advance.\",\
\"impact\":\"high\",\"date\":\"2026-07-15\"},]";
        let news = parse_news(raw);
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].impact_level, ImpactLevel::Medium);
        assert_eq!(news[1].impact_level, ImpactLevel::High);
    }

    #[test]
    fn entries_missing_required_fields_are_dropped() {
        let raw = "[{\"country\":\"\",\"visa\":\"X\"},{\"country\":\"Canada\",\
\"visa\":\"Express Entry\"}]";
        let options = parse_visa_options(raw, Intent::Work);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].country, "Canada");
        // Lenient defaults for omitted fields.
        assert_eq!(options[0].difficulty, Difficulty::Medium);
        assert!(options[0].max_duration.is_empty());
    }

    #[test]
    fn checklist_docs_are_optional_and_blank_docs_dropped() {
        let raw = "[{\"title\":\"Gather documents\",\"desc\":\"Collect papers.\",\
\"doc\":\"Passport\"},{\"title\":\"Book interview\",\"desc\":\"\",\"doc\":\"  \"}]";
        let steps = parse_checklist(raw);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].required_doc.as_deref(), Some("Passport"));
        assert!(steps[1].required_doc.is_none());
        assert_eq!(steps[0].id, "step-1");
    }

    #[test]
    fn no_array_in_output_means_no_items() {
        assert!(parse_news("I could not produce the digest.").is_empty());
        assert!(parse_checklist("]broken[").is_empty());
    }

    #[test]
    fn impact_and_difficulty_mapping_is_case_insensitive_with_defaults() {
        assert_eq!(map_difficulty(Some("LOW")), Difficulty::Low);
        assert_eq!(map_difficulty(Some("unknown")), Difficulty::Medium);
        assert_eq!(map_difficulty(None), Difficulty::Medium);
        assert_eq!(map_impact(Some("High")), ImpactLevel::High);
        assert_eq!(map_impact(None), ImpactLevel::Low);
    }
}
