use std::sync::Arc;

use tracing::{debug, warn};

use super::domain::{EligibilityResult, FormAnswers, ServiceId};
use super::model::LanguageModel;

const TEMPLATE_REASON_LIMIT: usize = 3;
const TEMPLATE_DOCUMENT_LIMIT: usize = 4;
const MIN_EXPLANATION_CHARS: usize = 5;

/// Writes the English explanation of a decision.
#[derive(Clone)]
pub struct ExplanationGenerator {
    model: Arc<dyn LanguageModel>,
}

impl ExplanationGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn explain(
        &self,
        service: ServiceId,
        answers: &FormAnswers,
        result: &EligibilityResult,
        degraded: bool,
    ) -> String {
        if degraded || !self.model.is_available() {
            return template_explanation(result);
        }

        let prompt = explanation_prompt(service, answers, result);
        match self.model.complete(&prompt).await {
            Ok(text) => {
                debug!(%service, "explanation generated by language model");
                text.trim().to_string()
            }
            Err(err) => {
                warn!(%service, error = %err, "explanation fell back to template");
                template_explanation(result)
            }
        }
    }
}

pub(crate) fn explanation_prompt(
    service: ServiceId,
    answers: &FormAnswers,
    result: &EligibilityResult,
) -> String {
    format!(
        "You are a government service assistant. Write a concise explanation (<= 120 words) for a citizen about their eligibility result.\n\
         Service: {service}\n\
         Eligibility: {status}\n\
         Key reasons: {reasons:?}\n\
         Required documents: {documents:?}\n\
         Citizen inputs (for reference): {inputs}\n\
         Avoid policy jargon; keep it simple, friendly, and instructional.\n",
        status = result.status_label(),
        reasons = result.reasons,
        documents = result.required_documents,
        inputs = answers.describe(),
    )
}

/// Deterministic explanation: status, up to three reasons, up to four documents.
pub fn template_explanation(result: &EligibilityResult) -> String {
    let reasons = leading(&result.reasons, TEMPLATE_REASON_LIMIT).join("; ");
    let documents = leading(&result.required_documents, TEMPLATE_DOCUMENT_LIMIT).join(", ");

    format!(
        "{}. Reason(s): {reasons}. Required documents: {documents}.",
        result.status_label()
    )
}

/// Replaces an empty or near-empty explanation with the expanded template,
/// which also carries a policy reference line.
pub fn ensure_substantive(explanation: String, result: &EligibilityResult) -> String {
    if explanation.trim().chars().count() >= MIN_EXPLANATION_CHARS {
        return explanation;
    }

    warn!("explanation too short, substituting expanded template");
    expanded_explanation(result)
}

pub fn expanded_explanation(result: &EligibilityResult) -> String {
    let reasons = if result.reasons.is_empty() {
        "No reasons provided.".to_string()
    } else {
        result.reasons.join("; ")
    };

    let mut text = format!(
        "Eligibility check complete.\n\nReason(s): {reasons}\n\nPolicy Reference: Based on available documents.\n\n"
    );
    if !result.required_documents.is_empty() {
        text.push_str("Required documents: ");
        text.push_str(&result.required_documents.join(", "));
    }
    text
}

fn leading(items: &[String], limit: usize) -> &[String] {
    &items[..items.len().min(limit)]
}
