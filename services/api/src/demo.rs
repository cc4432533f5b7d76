use crate::infra::{build_navigator, parse_answer_pair};
use clap::Args;
use service_navigator::config::AppConfig;
use service_navigator::error::AppError;
use service_navigator::telemetry;
use service_navigator::navigator::{
    catalog, intent, FieldKind, NavigatorError, PolicyContext, ServiceId, SubmissionOutcome,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Service identifier (zakat, transport-card, immunization, housing-support)
    #[arg(long)]
    pub(crate) service: String,
    /// Answer in key=value form; repeat for each question
    #[arg(long = "answer", value_parser = parse_answer_pair)]
    pub(crate) answers: Vec<(String, String)>,
    /// Free-text request used to retrieve policy passages
    #[arg(long)]
    pub(crate) query: Option<String>,
    /// Disable the language model and answer with deterministic templates
    #[arg(long)]
    pub(crate) degraded: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Use the configured language model instead of offline templates
    #[arg(long)]
    pub(crate) live: bool,
    /// Directory for generated application summaries (defaults to NAVIGATOR_FORMS_DIR)
    #[arg(long)]
    pub(crate) forms_dir: Option<PathBuf>,
}

struct DemoScenario {
    request: &'static str,
    answers: &'static [(&'static str, &'static str)],
}

const DEMO_SCENARIOS: &[DemoScenario] = &[
    DemoScenario {
        request: "I need zakat for my family",
        answers: &[
            ("monthly_income", "45000"),
            ("is_muslim", "Yes"),
            ("is_needy", "Yes"),
        ],
    },
    DemoScenario {
        request: "Can my father get a free bus card?",
        answers: &[("age", "67"), ("is_senior_citizen", "Yes"), ("has_cnic", "Yes")],
    },
    DemoScenario {
        request: "Where can my son get his vaccination?",
        answers: &[("age_months", "72"), ("is_registered", "Yes")],
    },
    DemoScenario {
        request: "Looking for an LDA housing scheme",
        answers: &[
            ("monthly_income", "75000"),
            ("family_size", "5"),
            ("first_time_applicant", "Yes"),
            ("has_property", "No"),
        ],
    },
];

pub(crate) fn run_classify(text: &str) {
    let intent = intent::classify(text);
    match intent.service {
        Some(service) => {
            println!("Service: {} ({})", service.label(), service);
            println!("Confidence: {}%", intent.confidence);
            println!("Rationale: {}", intent.rationale);
        }
        None => println!(
            "Service not recognized. Try mentioning zakat, transport, immunization or housing."
        ),
    }
}

pub(crate) fn run_questions(service: &str) {
    let questions = catalog::questions_for(service);
    if questions.is_empty() {
        println!("No questions for '{service}'.");
        return;
    }

    for question in questions {
        match question.kind {
            FieldKind::Select => println!(
                "- {} [{}]: {}",
                question.key,
                question.options.join("/"),
                question.label
            ),
            FieldKind::Number | FieldKind::Text => {
                println!("- {}: {}", question.key, question.label)
            }
        }
    }
}

pub(crate) async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let CheckArgs {
        service,
        answers,
        query,
        degraded,
    } = args;

    let mut config = AppConfig::load()?;
    if degraded {
        config.assistant.degraded = true;
    }
    telemetry::init_cli(&config.telemetry, config.environment)?;
    let navigator = build_navigator(&config);

    let raw: BTreeMap<String, String> = answers.into_iter().collect();
    let context = query
        .as_deref()
        .map(|query| navigator.retrieve(query))
        .unwrap_or_else(PolicyContext::empty);

    let Some(service_id) = ServiceId::from_key(&service) else {
        let result = navigator.check_eligibility(&service, &raw, &context)?;
        println!("Decision: {}", result.status_label());
        println!("Reasons: {}", result.reasons.join("; "));
        return Ok(());
    };

    let answers = catalog::parse_answers(service_id, &raw).map_err(NavigatorError::from)?;
    let outcome = navigator.process(service_id, answers, &context).await?;
    render_outcome(service_id, &outcome);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { live, forms_dir } = args;

    let mut config = AppConfig::load()?;
    if !live {
        config.assistant.degraded = true;
    }
    if let Some(forms_dir) = forms_dir {
        config.output.forms_dir = forms_dir;
    }
    telemetry::init_cli(&config.telemetry, config.environment)?;
    let navigator = build_navigator(&config);

    println!("Citizen service navigator demo");
    for scenario in DEMO_SCENARIOS {
        let mut session = navigator.start_session()?;
        println!("\n[{}] \"{}\"", session.id, scenario.request);

        let analysis = match navigator.analyze(&mut session, scenario.request) {
            Ok(analysis) => analysis,
            Err(err) => {
                println!("  Request not routed: {}", err);
                continue;
            }
        };
        println!(
            "  Routed to {} ({}% confidence, {} policy passages)",
            analysis.service_label, analysis.intent.confidence, analysis.policy_passages
        );

        let raw: BTreeMap<String, String> = scenario
            .answers
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        for (key, value) in &raw {
            println!("  {key} = {value}");
        }

        match navigator.submit(&mut session, &raw).await {
            Ok(outcome) => render_outcome(analysis.service, &outcome),
            Err(err) => println!("  Submission rejected: {}", err),
        }
    }

    Ok(())
}

fn render_outcome(service: ServiceId, outcome: &SubmissionOutcome) {
    println!("  Service: {}", service.label());
    println!("  Decision: {}", outcome.result.status_label());
    println!("  Reasons:");
    for reason in &outcome.result.reasons {
        println!("    - {reason}");
    }
    if outcome.result.required_documents.is_empty() {
        println!("  Required documents: none");
    } else {
        println!(
            "  Required documents: {}",
            outcome.result.required_documents.join(", ")
        );
    }
    println!("  Explanation (English):\n    {}", outcome.explanation.english);
    println!("  Explanation (Urdu):\n    {}", outcome.explanation.translated);
    match &outcome.artifact {
        Some(artifact) => println!("  Application summary: {}", artifact.path.display()),
        None => println!("  Application summary: not generated"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_demo_request_routes_to_a_distinct_service() {
        let services: Vec<ServiceId> = DEMO_SCENARIOS
            .iter()
            .filter_map(|scenario| intent::classify(scenario.request).service)
            .collect();
        assert_eq!(services, ServiceId::ordered());
    }

    #[test]
    fn demo_answers_fit_their_forms() {
        for scenario in DEMO_SCENARIOS {
            let service = intent::classify(scenario.request)
                .service
                .expect("demo request routes");
            let raw: BTreeMap<String, String> = scenario
                .answers
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            assert!(catalog::parse_answers(service, &raw).is_ok());
        }
    }
}
