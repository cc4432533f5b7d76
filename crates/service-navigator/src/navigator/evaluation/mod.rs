mod context;
mod rules;

use super::domain::{EligibilityResult, FormAnswers, InputError, PolicyContext, ServiceId};
use tracing::debug;

pub const UNSUPPORTED_SERVICE_REASON: &str = "service not supported";

/// Stateless evaluator dispatching to one pure rule per service.
#[derive(Debug, Default, Clone, Copy)]
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates a raw service identifier. Unknown identifiers are refused without
    /// touching the answers or the policy context.
    pub fn evaluate(
        &self,
        service: &str,
        answers: &FormAnswers,
        policy: &PolicyContext,
    ) -> Result<EligibilityResult, InputError> {
        match ServiceId::from_key(service) {
            Some(service) => self.evaluate_service(service, answers, policy),
            None => {
                debug!(service, "eligibility requested for unsupported service");
                Ok(EligibilityResult {
                    decision: false,
                    reasons: vec![UNSUPPORTED_SERVICE_REASON.to_string()],
                    required_documents: Vec::new(),
                })
            }
        }
    }

    pub fn evaluate_service(
        &self,
        service: ServiceId,
        answers: &FormAnswers,
        policy: &PolicyContext,
    ) -> Result<EligibilityResult, InputError> {
        let verdict = rules::rule_for(service)(answers)?;

        let mut reasons = vec![verdict.reason.to_string()];
        if let Some(reason) = context::policy_reason(policy) {
            reasons.push(reason);
        }

        debug!(%service, eligible = verdict.eligible, "eligibility evaluated");

        Ok(EligibilityResult {
            decision: verdict.eligible,
            reasons,
            required_documents: verdict.documents.iter().map(|d| d.to_string()).collect(),
        })
    }
}
