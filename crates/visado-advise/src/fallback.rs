use visado_core::{
    ChecklistStep, Difficulty, ImpactLevel, Intent, NewsUpdate, StepStatus, VisaOption,
};

pub const OFFLINE_REPLY: &str =
    "I'm having trouble connecting to immigration services right now. Please try again later.";

pub const ERROR_REPLY: &str =
    "I'm sorry, I encountered an error while processing your request.";

fn step(n: usize, title: &str, description: &str, doc: Option<&str>) -> ChecklistStep {
    ChecklistStep {
        id: format!("step-{}", n),
        title: title.to_string(),
        description: description.to_string(),
        required_doc: doc.map(|d| d.to_string()),
        is_completed: false,
        status: StepStatus::Locked,
    }
}

/// Generic five-step checklist used when generation fails.
pub fn default_checklist() -> Vec<ChecklistStep> {
    vec![
        step(
            1,
            "Visa Research",
            "Understand the eligibility rules and confirm this route fits your situation.",
            None,
        ),
        step(
            2,
            "Gather Documents",
            "Collect your passport, birth certificate, and proof of funds.",
            Some("Passport"),
        ),
        step(
            3,
            "Application Form",
            "Fill out the official application form and pay the filing fee.",
            Some("Application form"),
        ),
        step(
            4,
            "Interview Prep",
            "Book the consulate appointment and practice the interview questions.",
            Some("Appointment confirmation"),
        ),
        step(
            5,
            "Travel & Entry",
            "Book flights and prepare your port-of-entry paperwork.",
            None,
        ),
    ]
}

/// Static policy digest used when generation fails.
pub fn default_news() -> Vec<NewsUpdate> {
    vec![
        NewsUpdate {
            id: "mock-1".to_string(),
            headline: "Visa Bulletin Updates".to_string(),
            summary: "The latest visa bulletin shows advancement in employment-based \
                      categories for several countries."
                .to_string(),
            source_url: None,
            date: "2026-07-20".to_string(),
            impact_level: ImpactLevel::High,
        },
        NewsUpdate {
            id: "mock-2".to_string(),
            headline: "Work Visa Lottery Results".to_string(),
            summary: "A second round of lottery selections has been completed for the \
                      upcoming fiscal year's capped work visas."
                .to_string(),
            source_url: None,
            date: "2026-07-15".to_string(),
            impact_level: ImpactLevel::Medium,
        },
    ]
}

fn route(
    n: usize,
    country: &str,
    visa: &str,
    intent: Intent,
    duration: &str,
    processing: &str,
    difficulty: Difficulty,
    summary: &str,
) -> VisaOption {
    VisaOption {
        id: format!("opt-{}", n),
        country: country.to_string(),
        visa_name: visa.to_string(),
        intent,
        max_duration: duration.to_string(),
        processing_time: processing.to_string(),
        difficulty,
        requirements_summary: summary.to_string(),
    }
}

/// Seeded routes per intent, used when discovery fails or AI is unconfigured.
pub fn default_options(intent: Intent) -> Vec<VisaOption> {
    match intent {
        Intent::Work => vec![
            route(
                1,
                "Germany",
                "Job Seeker Visa",
                intent,
                "6 months",
                "4-8 weeks",
                Difficulty::Medium,
                "University degree, proof of funds for the stay, and health insurance. \
                 Converts to a work permit once you sign a contract.",
            ),
            route(
                2,
                "Canada",
                "Express Entry",
                intent,
                "Permanent residence",
                "6 months",
                Difficulty::High,
                "Points-based selection on age, education, language tests, and work \
                 experience. Invitation rounds run roughly every two weeks.",
            ),
        ],
        Intent::Study => vec![
            route(
                1,
                "Germany",
                "Student Visa",
                intent,
                "Duration of study",
                "6-12 weeks",
                Difficulty::Medium,
                "University admission letter and a blocked account covering one year \
                 of living costs.",
            ),
            route(
                2,
                "Australia",
                "Student Visa (Subclass 500)",
                intent,
                "Up to 5 years",
                "4-7 weeks",
                Difficulty::Medium,
                "Confirmed enrollment, health cover, and evidence of genuine student \
                 intent.",
            ),
        ],
        Intent::Tourism => vec![
            route(
                1,
                "Japan",
                "Temporary Visitor Visa",
                intent,
                "90 days",
                "1-2 weeks",
                Difficulty::Low,
                "Itinerary, proof of funds, and a return ticket. Many passports \
                 qualify for visa-free entry instead.",
            ),
            route(
                2,
                "France",
                "Schengen Short-Stay Visa",
                intent,
                "90 days in any 180",
                "2-4 weeks",
                Difficulty::Low,
                "Travel insurance, accommodation bookings, and bank statements for \
                 the trip.",
            ),
        ],
        Intent::Invest => vec![
            route(
                1,
                "Portugal",
                "D2 Entrepreneur Visa",
                intent,
                "2 years, renewable",
                "3-6 months",
                Difficulty::Medium,
                "Viable business plan and funds to establish the company locally.",
            ),
            route(
                2,
                "United Arab Emirates",
                "Golden Visa",
                intent,
                "10 years",
                "2-8 weeks",
                Difficulty::High,
                "Qualifying investment in property or business; thresholds vary by \
                 category.",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_checklist_is_five_ordered_steps() {
        let steps = default_checklist();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].id, "step-1");
        assert!(steps.iter().all(|s| !s.is_completed));
    }

    #[test]
    fn every_intent_has_seeded_routes() {
        for intent in [Intent::Work, Intent::Study, Intent::Tourism, Intent::Invest] {
            let options = default_options(intent);
            assert!(!options.is_empty());
            assert!(options.iter().all(|o| o.intent == intent));
        }
    }
}
