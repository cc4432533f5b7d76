use super::common::*;
use std::sync::Arc;

use crate::navigator::explanation::template_explanation;
use crate::navigator::model::DisabledModel;
use crate::navigator::translation::{OFFLINE_NOTICE, UNAVAILABLE_NOTICE};
use crate::navigator::{
    EmptyRetriever, InputError, NavigatorError, PolicyContext, ServiceId, Session, SessionId,
};

fn fresh_session() -> Session {
    Session::new(SessionId("session-test".to_string()))
}

#[test]
fn analyze_routes_request_and_stores_context() {
    let (service, _) = service_with(
        Arc::new(StaticRetriever(vec!["Zakat rules passage", "Nisab passage"])),
        Arc::new(DisabledModel),
        true,
    );
    let mut session = fresh_session();

    let outcome = service
        .analyze(&mut session, "I need zakat help")
        .expect("request recognized");

    assert_eq!(outcome.service, ServiceId::Zakat);
    assert_eq!(outcome.intent.confidence, 95);
    assert_eq!(outcome.questions.len(), 3);
    assert_eq!(outcome.policy_passages, 2);
    assert_eq!(session.query.as_deref(), Some("I need zakat help"));
    assert_eq!(session.context.passages().len(), 2);
    assert!(session.is_analyzed());
}

#[test]
fn analyze_rejects_blank_and_unrecognized_requests() {
    let (service, _) = offline_service();
    let mut session = fresh_session();

    assert!(matches!(
        service.analyze(&mut session, "   "),
        Err(NavigatorError::EmptyQuery)
    ));
    assert!(matches!(
        service.analyze(&mut session, "renew my passport"),
        Err(NavigatorError::ServiceNotRecognized)
    ));
    assert_eq!(session, fresh_session());
}

#[test]
fn retrieval_failure_leaves_context_empty() {
    let (service, _) = service_with(Arc::new(FailingRetriever), Arc::new(DisabledModel), false);
    let mut session = fresh_session();

    let outcome = service
        .analyze(&mut session, "housing scheme for my family")
        .expect("request recognized");

    assert_eq!(outcome.service, ServiceId::HousingSupport);
    assert_eq!(outcome.policy_passages, 0);
    assert!(session.context.is_empty());
}

#[tokio::test]
async fn submit_requires_an_analyzed_session() {
    let (service, _) = offline_service();
    let mut session = fresh_session();

    let result = service.submit(&mut session, &raw(&[("age", "65")])).await;

    assert!(matches!(result, Err(NavigatorError::NotAnalyzed)));
}

#[tokio::test]
async fn eligible_zakat_submission_in_degraded_mode() {
    let (service, emitter) = offline_service();
    let mut session = fresh_session();
    service
        .analyze(&mut session, "zakat")
        .expect("request recognized");

    let outcome = service
        .submit(
            &mut session,
            &raw(&[
                ("monthly_income", "50000"),
                ("is_muslim", "Yes"),
                ("is_needy", "Yes"),
            ]),
        )
        .await
        .expect("submission processed");

    assert!(outcome.result.decision);
    assert_eq!(
        outcome.result.reasons,
        ["Meets Zakat criteria (Muslim, needy, income below PKR 60,000)."]
    );
    assert_eq!(
        outcome.result.required_documents,
        ["CNIC copy", "Income certificate"]
    );
    assert_eq!(
        outcome.explanation.english,
        "Eligible. Reason(s): Meets Zakat criteria (Muslim, needy, income below PKR 60,000).. Required documents: CNIC copy, Income certificate."
    );
    assert_eq!(
        outcome.explanation.translated,
        format!("{OFFLINE_NOTICE}\n\n{}", outcome.explanation.english)
    );
    assert!(outcome.artifact.is_some());
    assert_eq!(emitter.emitted(), 1);
    assert_eq!(session.outcome.as_ref(), Some(&outcome));
}

#[tokio::test]
async fn ineligible_transport_submission_emits_no_summary() {
    let (service, emitter) = offline_service();
    let mut session = fresh_session();
    service
        .analyze(&mut session, "bus card for seniors")
        .expect("request recognized");

    let outcome = service
        .submit(
            &mut session,
            &raw(&[("age", "45"), ("is_senior_citizen", "No"), ("has_cnic", "Yes")]),
        )
        .await
        .expect("submission processed");

    assert!(!outcome.result.decision);
    assert_eq!(
        outcome.result.reasons,
        ["Does not meet transport card eligibility."]
    );
    assert!(outcome.result.required_documents.is_empty());
    assert!(outcome.artifact.is_none());
    assert_eq!(emitter.emitted(), 0);
}

#[tokio::test]
async fn housing_submission_carries_policy_reference() {
    let (service, emitter) = service_with(
        Arc::new(StaticRetriever(vec!["LDA housing scheme clause"])),
        Arc::new(DisabledModel),
        true,
    );
    let mut session = fresh_session();
    service
        .analyze(&mut session, "I want a home")
        .expect("request recognized");

    let outcome = service
        .submit(
            &mut session,
            &raw(&[
                ("monthly_income", "70000"),
                ("family_size", "4"),
                ("first_time_applicant", "yes"),
                ("has_property", "No"),
            ]),
        )
        .await
        .expect("submission processed");

    assert!(outcome.result.decision);
    assert_eq!(outcome.result.reasons.len(), 2);
    assert_eq!(
        outcome.result.reasons[1],
        "Policy Reference: LDA housing scheme clause"
    );
    assert_eq!(outcome.answers.text_or("first_time_applicant", ""), "Yes");

    let documents = emitter.documents.lock().expect("emitter mutex poisoned");
    assert_eq!(documents[0].explanation, outcome.explanation.english);
}

#[tokio::test]
async fn invalid_answers_are_rejected_before_evaluation() {
    let (service, emitter) = offline_service();
    let mut session = fresh_session();
    service
        .analyze(&mut session, "vaccination for my child")
        .expect("request recognized");

    let result = service
        .submit(&mut session, &raw(&[("age_months", "twelve")]))
        .await;

    assert!(matches!(
        result,
        Err(NavigatorError::Input(InputError::NotANumber { .. }))
    ));
    assert!(session.outcome.is_none());
    assert_eq!(emitter.emitted(), 0);
}

#[tokio::test]
async fn model_reply_is_explained_and_translated() {
    let (service, _) = service_with(
        Arc::new(EmptyRetriever),
        Arc::new(ScriptedModel("Your child can be vaccinated at the nearest centre.")),
        false,
    );
    let mut session = fresh_session();
    service
        .analyze(&mut session, "immunization")
        .expect("request recognized");

    let outcome = service
        .submit(
            &mut session,
            &raw(&[("age_months", "24"), ("is_registered", "Yes")]),
        )
        .await
        .expect("submission processed");

    assert_eq!(
        outcome.explanation.english,
        "Your child can be vaccinated at the nearest centre."
    );
    assert_eq!(
        outcome.explanation.translated,
        "Your child can be vaccinated at the nearest centre."
    );
}

#[tokio::test]
async fn unreachable_model_falls_back_to_template_and_short_notice() {
    let (service, _) = service_with(Arc::new(EmptyRetriever), Arc::new(UnreachableModel), false);
    let mut session = fresh_session();
    service
        .analyze(&mut session, "zakat")
        .expect("request recognized");

    let outcome = service
        .submit(&mut session, &raw(&[("monthly_income", "90000")]))
        .await
        .expect("submission processed");

    assert!(!outcome.result.decision);
    assert_eq!(
        outcome.explanation.english,
        template_explanation(&outcome.result)
    );
    assert_eq!(outcome.explanation.translated, UNAVAILABLE_NOTICE);
}

#[tokio::test]
async fn near_empty_model_reply_is_expanded() {
    let (service, _) = service_with(Arc::new(EmptyRetriever), Arc::new(ScriptedModel("ok")), false);
    let mut session = fresh_session();
    service
        .analyze(&mut session, "zakat")
        .expect("request recognized");

    let outcome = service
        .submit(&mut session, &raw(&[]))
        .await
        .expect("submission processed");

    assert!(outcome
        .explanation
        .english
        .starts_with("Eligibility check complete."));
}

#[tokio::test]
async fn summary_failure_keeps_the_decision() {
    let emitter = Arc::new(RecordingEmitter {
        fail: true,
        ..Default::default()
    });
    let service = crate::navigator::NavigatorService::new(
        Arc::new(crate::navigator::InMemorySessionRepository::new()),
        emitter,
        Arc::new(EmptyRetriever),
        Arc::new(DisabledModel),
        crate::navigator::NavigatorSettings::default(),
    );

    let outcome = service
        .process(
            ServiceId::Zakat,
            crate::navigator::FormAnswers::new(),
            &PolicyContext::empty(),
        )
        .await
        .expect("pipeline completes");

    assert!(outcome.result.decision);
    assert!(outcome.artifact.is_none());
}

#[tokio::test]
async fn repository_backed_lifecycle() {
    let (service, _) = offline_service();
    let session = service.start_session().expect("session started");

    service
        .analyze_session(&session.id, "transport card")
        .expect("analyzed");
    service
        .submit_session(&session.id, &raw(&[("age", "70"), ("has_cnic", "Yes")]))
        .await
        .expect("submitted");

    let stored = service.session(&session.id).expect("session stored");
    assert!(stored.outcome.is_some());

    let reset = service.reset_session(&session.id).expect("reset");
    assert!(reset.intent.is_none());
    assert!(service
        .session(&session.id)
        .expect("still stored")
        .outcome
        .is_none());

    assert!(matches!(
        service.session(&SessionId("session-missing".to_string())),
        Err(NavigatorError::UnknownSession(_))
    ));
}

#[test]
fn stateless_check_handles_unknown_services() {
    let (service, _) = offline_service();

    let result = service
        .check_eligibility("foo", &raw(&[("anything", "1")]), &PolicyContext::empty())
        .expect("unknown service is a result");

    assert!(!result.decision);
    assert_eq!(result.reasons, ["service not supported"]);
    assert!(result.required_documents.is_empty());
}
