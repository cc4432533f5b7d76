//! Eligibility behaviour observed through the public catalog and evaluator.

use std::collections::BTreeMap;

use service_navigator::navigator::catalog::{parse_answers, questions_for};
use service_navigator::navigator::intent::{classify, precedence};
use service_navigator::navigator::{
    EligibilityEvaluator, EligibilityResult, FormAnswers, InputError, PolicyContext, ServiceId,
};

fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn evaluate(service: ServiceId, pairs: &[(&str, &str)]) -> EligibilityResult {
    let answers = parse_answers(service, &raw(pairs)).expect("answers valid");
    EligibilityEvaluator::new()
        .evaluate_service(service, &answers, &PolicyContext::empty())
        .expect("evaluation succeeds")
}

#[test]
fn needy_muslim_household_qualifies_for_zakat() {
    let result = evaluate(
        ServiceId::Zakat,
        &[("is_muslim", "Yes"), ("is_needy", "Yes"), ("monthly_income", "50000")],
    );

    assert!(result.decision);
    assert_eq!(
        result.reasons,
        ["Meets Zakat criteria (Muslim, needy, income below PKR 60,000)."]
    );
    assert_eq!(result.required_documents, ["CNIC copy", "Income certificate"]);
}

#[test]
fn sixty_one_year_old_with_cnic_gets_transport_card() {
    let result = evaluate(
        ServiceId::TransportCard,
        &[("age", "61"), ("is_senior_citizen", "No"), ("has_cnic", "Yes")],
    );

    assert!(result.decision);
    assert_eq!(
        result.reasons,
        ["Eligible for free transport card (Senior citizen with valid CNIC)."]
    );
    assert_eq!(result.required_documents, ["CNIC copy", "Proof of age"]);
}

#[test]
fn housing_support_refused_above_income_ceiling() {
    let result = evaluate(
        ServiceId::HousingSupport,
        &[
            ("monthly_income", "90000"),
            ("family_size", "5"),
            ("first_time_applicant", "Yes"),
            ("has_property", "No"),
        ],
    );

    assert!(!result.decision);
    assert_eq!(
        result.reasons,
        ["Does not meet housing support eligibility criteria."]
    );
    assert!(result.required_documents.is_empty());
}

#[test]
fn zakat_income_ceiling_is_exclusive() {
    let below = evaluate(
        ServiceId::Zakat,
        &[("monthly_income", "59999"), ("is_muslim", "Yes"), ("is_needy", "Yes")],
    );
    let at = evaluate(
        ServiceId::Zakat,
        &[("monthly_income", "60000"), ("is_muslim", "Yes"), ("is_needy", "Yes")],
    );

    assert!(below.decision);
    assert!(!at.decision);
    assert_eq!(at.reasons, ["Does not meet Zakat eligibility conditions."]);
    assert!(at.required_documents.is_empty());
}

#[test]
fn transport_card_needs_age_or_status_and_cnic() {
    let by_age = evaluate(ServiceId::TransportCard, &[("age", "60"), ("has_cnic", "Yes")]);
    let by_status = evaluate(
        ServiceId::TransportCard,
        &[("age", "50"), ("is_senior_citizen", "Yes"), ("has_cnic", "Yes")],
    );
    let without_cnic = evaluate(ServiceId::TransportCard, &[("age", "75")]);

    assert!(by_age.decision);
    assert!(by_status.decision);
    assert_eq!(by_status.required_documents, ["CNIC copy", "Proof of age"]);
    assert!(!without_cnic.decision);
}

#[test]
fn immunization_age_ceiling_is_inclusive() {
    let at = evaluate(
        ServiceId::Immunization,
        &[("age_months", "60"), ("is_registered", "Yes")],
    );
    let over = evaluate(
        ServiceId::Immunization,
        &[("age_months", "61"), ("is_registered", "Yes")],
    );

    assert!(at.decision);
    assert_eq!(at.required_documents, ["Birth certificate", "Guardian CNIC"]);
    assert!(!over.decision);
}

#[test]
fn housing_support_boundaries() {
    let base = [
        ("monthly_income", "80000"),
        ("family_size", "3"),
        ("first_time_applicant", "Yes"),
        ("has_property", "No"),
    ];
    let granted = evaluate(ServiceId::HousingSupport, &base);
    assert!(granted.decision);
    assert_eq!(
        granted.required_documents,
        ["CNIC", "Income certificate", "No property certificate"]
    );

    let mut over_income = base;
    over_income[0] = ("monthly_income", "80001");
    assert!(!evaluate(ServiceId::HousingSupport, &over_income).decision);

    let mut small_family = base;
    small_family[1] = ("family_size", "2");
    assert!(!evaluate(ServiceId::HousingSupport, &small_family).decision);

    let mut owner = base;
    owner[3] = ("has_property", "Yes");
    assert!(!evaluate(ServiceId::HousingSupport, &owner).decision);
}

#[test]
fn absent_answers_fall_back_to_rule_defaults() {
    let evaluator = EligibilityEvaluator::new();
    let empty = FormAnswers::new();
    let policy = PolicyContext::empty();

    let zakat = evaluator
        .evaluate_service(ServiceId::Zakat, &empty, &policy)
        .expect("evaluation succeeds");
    let transport = evaluator
        .evaluate_service(ServiceId::TransportCard, &empty, &policy)
        .expect("evaluation succeeds");

    assert!(zakat.decision);
    assert!(!transport.decision);
}

#[test]
fn unknown_service_is_a_refusal_not_an_error() {
    let answers = FormAnswers::new().with("monthly_income", 1);
    let context = PolicyContext::new(vec!["ignored passage".to_string()]);

    let result = EligibilityEvaluator::new()
        .evaluate("foo", &answers, &context)
        .expect("unknown service is a result");

    assert!(!result.decision);
    assert_eq!(result.reasons, ["service not supported"]);
    assert!(result.required_documents.is_empty());
    assert!(questions_for("foo").is_empty());
}

#[test]
fn policy_context_adds_a_truncated_reference() {
    let context = PolicyContext::new(vec!["z".repeat(900)]);
    let answers = FormAnswers::new().with("monthly_income", 10_000);

    let result = EligibilityEvaluator::new()
        .evaluate_service(ServiceId::Zakat, &answers, &context)
        .expect("evaluation succeeds");

    assert_eq!(result.reasons.len(), 2);
    let reference = &result.reasons[1];
    assert!(reference.starts_with("Policy Reference: "));
    assert!(reference.ends_with("..."));
    assert_eq!(
        reference.chars().count(),
        "Policy Reference: ".len() + 700 + 3
    );
}

#[test]
fn malformed_answers_name_the_field() {
    let error = parse_answers(ServiceId::Zakat, &raw(&[("monthly_income", "lots")]))
        .expect_err("non-numeric income rejected");
    assert_eq!(
        error,
        InputError::NotANumber {
            field: "monthly_income".to_string(),
            value: "lots".to_string(),
        }
    );

    let error = parse_answers(ServiceId::Immunization, &raw(&[("is_registered", "maybe")]))
        .expect_err("unknown option rejected");
    assert!(error.to_string().contains("is_registered"));

    let error = parse_answers(ServiceId::TransportCard, &raw(&[("religion", "x")]))
        .expect_err("unknown field rejected");
    assert!(matches!(error, InputError::UnknownField { .. }));
}

#[test]
fn classifier_precedence_and_case() {
    assert_eq!(
        precedence(),
        [
            ServiceId::Zakat,
            ServiceId::TransportCard,
            ServiceId::Immunization,
            ServiceId::HousingSupport,
        ]
    );
    assert_eq!(
        classify("ZAKAT and a bus card").service,
        Some(ServiceId::Zakat)
    );
    assert_eq!(
        classify("bus card to my new home").service,
        Some(ServiceId::TransportCard)
    );
    assert_eq!(classify("").service, None);
}
