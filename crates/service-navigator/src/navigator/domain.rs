use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The public services the navigator can route a citizen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceId {
    Zakat,
    TransportCard,
    Immunization,
    HousingSupport,
}

impl ServiceId {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Zakat,
            Self::TransportCard,
            Self::Immunization,
            Self::HousingSupport,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Zakat => "zakat",
            Self::TransportCard => "transport-card",
            Self::Immunization => "immunization",
            Self::HousingSupport => "housing-support",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Zakat => "Zakat Financial Assistance",
            Self::TransportCard => "Senior Citizen Transport Card",
            Self::Immunization => "Child Immunization (EPI)",
            Self::HousingSupport => "Housing Support (LDA)",
        }
    }

    /// Accepts the canonical keys plus the legacy identifiers used by older forms.
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "zakat" => Some(Self::Zakat),
            "transport-card" | "ptc-transport" => Some(Self::TransportCard),
            "immunization" | "health-immunization" => Some(Self::Immunization),
            "housing-support" => Some(Self::HousingSupport),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Select,
    Text,
}

/// Descriptor for one follow-up question presented to the citizen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub options: &'static [&'static str],
}

/// A single submitted value. Numbers arrive from typed inputs, everything else as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(value) => write!(f, "{value}"),
            AnswerValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for AnswerValue {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Raised when a submitted value does not fit the field it was entered into.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("field '{field}' must be a whole number, found '{value}'")]
    NotANumber { field: String, value: String },
    #[error("field '{field}' must not be negative, found {value}")]
    Negative { field: String, value: i64 },
    #[error("field '{field}' must be one of [{}], found '{value}'", .options.join(", "))]
    InvalidOption {
        field: String,
        value: String,
        options: Vec<String>,
    },
    #[error("field '{field}' is not part of the {service} form")]
    UnknownField { field: String, service: ServiceId },
}

/// Answers keyed by question field. Lookups are by key, never by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormAnswers(BTreeMap<String, AnswerValue>);

impl FormAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Integer answer for `key`, or `default` when the key is absent.
    /// Text answers are parsed after trimming; anything else is an input error.
    pub fn integer_or(&self, key: &str, default: i64) -> Result<i64, InputError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(AnswerValue::Number(value)) => Ok(*value),
            Some(AnswerValue::Text(raw)) => {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| InputError::NotANumber {
                        field: key.to_string(),
                        value: raw.clone(),
                    })
            }
        }
    }

    /// Text answer for `key`, or `default` when the key is absent.
    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.0.get(key) {
            Some(AnswerValue::Text(value)) => value.as_str(),
            // a number never equals a select option
            Some(AnswerValue::Number(_)) => "",
            None => default,
        }
    }

    /// Rendering used in prompts and summaries, in key order.
    pub fn describe(&self) -> String {
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        format!("{{{}}}", pairs.join(", "))
    }
}

impl FromIterator<(String, AnswerValue)> for FormAnswers {
    fn from_iter<T: IntoIterator<Item = (String, AnswerValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Decision produced by one evaluation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub decision: bool,
    pub reasons: Vec<String>,
    pub required_documents: Vec<String>,
}

impl EligibilityResult {
    pub fn status_label(&self) -> &'static str {
        if self.decision {
            "Eligible"
        } else {
            "Not eligible"
        }
    }
}

/// Retrieved policy passages, in relevance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyContext(Vec<String>);

impl PolicyContext {
    pub const DEFAULT_TOP_K: usize = 3;

    pub fn new(passages: Vec<String>) -> Self {
        Self(passages)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn passages(&self) -> &[String] {
        &self.0
    }

    pub fn joined(&self) -> String {
        self.0.join("\n\n")
    }
}

/// Bilingual explanation of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub english: String,
    pub translated: String,
}

/// Output of the intent classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentMatch {
    pub service: Option<ServiceId>,
    pub confidence: u8,
    pub rationale: &'static str,
}

impl IntentMatch {
    pub fn is_recognized(&self) -> bool {
        self.service.is_some()
    }
}
