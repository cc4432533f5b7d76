use std::collections::BTreeMap;

use super::domain::{AnswerValue, FieldKind, FormAnswers, InputError, QuestionField, ServiceId};

const YES_NO: &[&str] = &["Yes", "No"];

const fn number(key: &'static str, label: &'static str) -> QuestionField {
    QuestionField {
        key,
        label,
        kind: FieldKind::Number,
        options: &[],
    }
}

const fn yes_no(key: &'static str, label: &'static str) -> QuestionField {
    QuestionField {
        key,
        label,
        kind: FieldKind::Select,
        options: YES_NO,
    }
}

const ZAKAT_FIELDS: &[QuestionField] = &[
    number("monthly_income", "Monthly household income (PKR):"),
    yes_no("is_muslim", "Are you a Muslim?"),
    yes_no("is_needy", "Are you financially needy?"),
];

const TRANSPORT_FIELDS: &[QuestionField] = &[
    number("age", "Your age:"),
    yes_no("is_senior_citizen", "Are you a senior citizen?"),
    yes_no("has_cnic", "Do you have a valid CNIC?"),
];

const IMMUNIZATION_FIELDS: &[QuestionField] = &[
    number("age_months", "Child's age (in months):"),
    yes_no(
        "is_registered",
        "Is the child registered with the EPI program?",
    ),
];

const HOUSING_FIELDS: &[QuestionField] = &[
    number("monthly_income", "Monthly household income (PKR):"),
    number("family_size", "How many people are in your household?"),
    yes_no(
        "first_time_applicant",
        "Is this your first time applying for housing support?",
    ),
    yes_no("has_property", "Do you currently own any property?"),
];

/// Ordered follow-up questions for a service. Order is presentation only.
pub fn fields(service: ServiceId) -> &'static [QuestionField] {
    match service {
        ServiceId::Zakat => ZAKAT_FIELDS,
        ServiceId::TransportCard => TRANSPORT_FIELDS,
        ServiceId::Immunization => IMMUNIZATION_FIELDS,
        ServiceId::HousingSupport => HOUSING_FIELDS,
    }
}

/// Lookup by raw identifier; unknown identifiers have no questions.
pub fn questions_for(service: &str) -> Vec<QuestionField> {
    ServiceId::from_key(service)
        .map(|service| fields(service).to_vec())
        .unwrap_or_default()
}

/// Validates raw form input against the service's descriptors.
///
/// Missing keys stay absent so the evaluator's defaults apply. Blank values are
/// treated as missing.
pub fn parse_answers(
    service: ServiceId,
    raw: &BTreeMap<String, String>,
) -> Result<FormAnswers, InputError> {
    let descriptors = fields(service);
    let mut answers = FormAnswers::new();

    for (key, value) in raw {
        let field = descriptors
            .iter()
            .find(|field| field.key == key.as_str())
            .ok_or_else(|| InputError::UnknownField {
                field: key.clone(),
                service,
            })?;

        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parsed = match field.kind {
            FieldKind::Number => {
                let number = trimmed
                    .parse::<i64>()
                    .map_err(|_| InputError::NotANumber {
                        field: key.clone(),
                        value: value.clone(),
                    })?;
                if number < 0 {
                    return Err(InputError::Negative {
                        field: key.clone(),
                        value: number,
                    });
                }
                AnswerValue::Number(number)
            }
            FieldKind::Select => {
                let option = field
                    .options
                    .iter()
                    .find(|option| option.eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| InputError::InvalidOption {
                        field: key.clone(),
                        value: value.clone(),
                        options: field.options.iter().map(|o| o.to_string()).collect(),
                    })?;
                AnswerValue::Text(option.to_string())
            }
            FieldKind::Text => AnswerValue::Text(trimmed.to_string()),
        };

        answers.insert(key.clone(), parsed);
    }

    Ok(answers)
}
