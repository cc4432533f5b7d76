use super::super::domain::{FormAnswers, InputError, ServiceId};

/// Outcome of a single service rule before policy context is attached.
pub(crate) struct RuleVerdict {
    pub eligible: bool,
    pub reason: &'static str,
    pub documents: &'static [&'static str],
}

impl RuleVerdict {
    fn granted(reason: &'static str, documents: &'static [&'static str]) -> Self {
        Self {
            eligible: true,
            reason,
            documents,
        }
    }

    fn refused(reason: &'static str) -> Self {
        Self {
            eligible: false,
            reason,
            documents: &[],
        }
    }
}

pub(crate) type RuleFn = fn(&FormAnswers) -> Result<RuleVerdict, InputError>;

pub(crate) const ZAKAT_INCOME_CEILING: i64 = 60_000;
pub(crate) const SENIOR_AGE: i64 = 60;
pub(crate) const IMMUNIZATION_MAX_MONTHS: i64 = 60;
pub(crate) const HOUSING_INCOME_CEILING: i64 = 80_000;
pub(crate) const HOUSING_MIN_FAMILY: i64 = 3;

const RULES: [(ServiceId, RuleFn); 4] = [
    (ServiceId::Zakat, zakat),
    (ServiceId::TransportCard, transport_card),
    (ServiceId::Immunization, immunization),
    (ServiceId::HousingSupport, housing_support),
];

pub(crate) fn rule_for(service: ServiceId) -> RuleFn {
    RULES
        .iter()
        .find(|(candidate, _)| *candidate == service)
        .map(|(_, rule)| *rule)
        .unwrap_or(refuse_all)
}

fn refuse_all(_answers: &FormAnswers) -> Result<RuleVerdict, InputError> {
    Ok(RuleVerdict::refused(super::UNSUPPORTED_SERVICE_REASON))
}

pub(crate) fn zakat(answers: &FormAnswers) -> Result<RuleVerdict, InputError> {
    let income = answers.integer_or("monthly_income", 0)?;
    let is_muslim = answers.text_or("is_muslim", "Yes") == "Yes";
    let is_needy = answers.text_or("is_needy", "Yes") == "Yes";

    Ok(if is_muslim && is_needy && income < ZAKAT_INCOME_CEILING {
        RuleVerdict::granted(
            "Meets Zakat criteria (Muslim, needy, income below PKR 60,000).",
            &["CNIC copy", "Income certificate"],
        )
    } else {
        RuleVerdict::refused("Does not meet Zakat eligibility conditions.")
    })
}

pub(crate) fn transport_card(answers: &FormAnswers) -> Result<RuleVerdict, InputError> {
    let age = answers.integer_or("age", 0)?;
    let is_senior = answers.text_or("is_senior_citizen", "No") == "Yes";
    let has_cnic = answers.text_or("has_cnic", "No") == "Yes";

    Ok(if (age >= SENIOR_AGE || is_senior) && has_cnic {
        RuleVerdict::granted(
            "Eligible for free transport card (Senior citizen with valid CNIC).",
            &["CNIC copy", "Proof of age"],
        )
    } else {
        RuleVerdict::refused("Does not meet transport card eligibility.")
    })
}

pub(crate) fn immunization(answers: &FormAnswers) -> Result<RuleVerdict, InputError> {
    let age_months = answers.integer_or("age_months", 0)?;
    let is_registered = answers.text_or("is_registered", "No") == "Yes";

    Ok(if age_months <= IMMUNIZATION_MAX_MONTHS && is_registered {
        RuleVerdict::granted(
            "Eligible for immunization (Child under 5 and registered).",
            &["Birth certificate", "Guardian CNIC"],
        )
    } else {
        RuleVerdict::refused("Does not meet immunization criteria.")
    })
}

pub(crate) fn housing_support(answers: &FormAnswers) -> Result<RuleVerdict, InputError> {
    let income = answers.integer_or("monthly_income", 0)?;
    let family_size = answers.integer_or("family_size", 0)?;
    let first_time = answers.text_or("first_time_applicant", "No") == "Yes";
    // satisfied only by a literal "No"
    let owns_no_property = answers.text_or("has_property", "No") == "No";

    Ok(
        if income <= HOUSING_INCOME_CEILING
            && family_size >= HOUSING_MIN_FAMILY
            && first_time
            && owns_no_property
        {
            RuleVerdict::granted(
                "Eligible for housing support (Low income, large family, first-time applicant, no property).",
                &["CNIC", "Income certificate", "No property certificate"],
            )
        } else {
            RuleVerdict::refused("Does not meet housing support eligibility criteria.")
        },
    )
}
