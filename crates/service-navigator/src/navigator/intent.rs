//! Keyword routing from a citizen's free-text request to a service.
//!
//! Rules are evaluated top to bottom and the first hit wins, so the table order
//! is the precedence order. Transport is checked before housing: a request such
//! as "bus card to my new home" routes to the transport card.

use super::domain::{IntentMatch, ServiceId};

struct IntentRule {
    keywords: &'static [&'static str],
    service: ServiceId,
    confidence: u8,
    rationale: &'static str,
}

const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        keywords: &["zakat", "charity"],
        service: ServiceId::Zakat,
        confidence: 95,
        rationale: "User is asking about Zakat financial support.",
    },
    IntentRule {
        keywords: &["transport", "bus", "card"],
        service: ServiceId::TransportCard,
        confidence: 90,
        rationale: "User is asking about a free senior transport card.",
    },
    IntentRule {
        keywords: &["immunization", "vaccination", "child health"],
        service: ServiceId::Immunization,
        confidence: 90,
        rationale: "User is asking about child vaccination services.",
    },
    IntentRule {
        keywords: &["house", "housing", "home", "lda", "shelter"],
        service: ServiceId::HousingSupport,
        confidence: 88,
        rationale: "User is asking about government housing or LDA schemes.",
    },
];

pub const UNRECOGNIZED_RATIONALE: &str = "not recognized";

/// Services in the order the classifier tests them.
pub fn precedence() -> Vec<ServiceId> {
    INTENT_RULES.iter().map(|rule| rule.service).collect()
}

pub fn classify(text: &str) -> IntentMatch {
    let query = text.to_lowercase();

    INTENT_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| query.contains(keyword)))
        .map(|rule| IntentMatch {
            service: Some(rule.service),
            confidence: rule.confidence,
            rationale: rule.rationale,
        })
        .unwrap_or(IntentMatch {
            service: None,
            confidence: 0,
            rationale: UNRECOGNIZED_RATIONALE,
        })
}
