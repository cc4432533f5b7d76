use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::catalog;
use super::domain::{
    EligibilityResult, Explanation, FormAnswers, InputError, IntentMatch, PolicyContext,
    QuestionField, ServiceId,
};
use super::evaluation::EligibilityEvaluator;
use super::explanation::{ensure_substantive, ExplanationGenerator};
use super::intent;
use super::model::LanguageModel;
use super::retrieval::PolicyRetriever;
use super::session::{
    next_session_id, Session, SessionId, SessionRepository, SessionStoreError, SubmissionOutcome,
};
use super::summary::{SummaryDocument, SummaryEmitter, SummaryError};
use super::translation::Translator;

/// Switches fixed for the lifetime of a service.
#[derive(Debug, Clone, Copy)]
pub struct NavigatorSettings {
    pub degraded: bool,
    pub top_k: usize,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            degraded: false,
            top_k: PolicyContext::DEFAULT_TOP_K,
        }
    }
}

/// Result of routing a free-text request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub service: ServiceId,
    pub service_label: &'static str,
    pub intent: IntentMatch,
    pub questions: Vec<QuestionField>,
    pub policy_passages: usize,
}

/// Service composing intent routing, retrieval, evaluation, explanation and summaries.
pub struct NavigatorService<R, E> {
    sessions: Arc<R>,
    emitter: Arc<E>,
    retriever: Arc<dyn PolicyRetriever>,
    evaluator: EligibilityEvaluator,
    explainer: ExplanationGenerator,
    translator: Translator,
    settings: NavigatorSettings,
}

impl<R, E> NavigatorService<R, E>
where
    R: SessionRepository + 'static,
    E: SummaryEmitter + 'static,
{
    pub fn new(
        sessions: Arc<R>,
        emitter: Arc<E>,
        retriever: Arc<dyn PolicyRetriever>,
        model: Arc<dyn LanguageModel>,
        settings: NavigatorSettings,
    ) -> Self {
        Self {
            sessions,
            emitter,
            retriever,
            evaluator: EligibilityEvaluator::new(),
            explainer: ExplanationGenerator::new(model.clone()),
            translator: Translator::new(model),
            settings,
        }
    }

    pub fn settings(&self) -> NavigatorSettings {
        self.settings
    }

    pub fn classify(&self, text: &str) -> IntentMatch {
        intent::classify(text)
    }

    /// Passages for `query`. Retriever failures degrade to an empty context.
    pub fn retrieve(&self, query: &str) -> PolicyContext {
        match self.retriever.search(query, self.settings.top_k) {
            Ok(passages) => PolicyContext::new(passages),
            Err(err) => {
                warn!(error = %err, "policy retrieval unavailable, continuing without context");
                PolicyContext::empty()
            }
        }
    }

    /// Stateless evaluation for callers that hold their own answers.
    pub fn check_eligibility(
        &self,
        service: &str,
        raw: &BTreeMap<String, String>,
        policy: &PolicyContext,
    ) -> Result<EligibilityResult, NavigatorError> {
        let answers = match ServiceId::from_key(service) {
            Some(service) => catalog::parse_answers(service, raw)?,
            None => FormAnswers::new(),
        };
        Ok(self.evaluator.evaluate(service, &answers, policy)?)
    }

    /// Routes `text` to a service and records the intent and policy context.
    pub fn analyze(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<AnalysisOutcome, NavigatorError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(NavigatorError::EmptyQuery);
        }

        let intent = self.classify(query);
        let service = intent.service.ok_or(NavigatorError::ServiceNotRecognized)?;
        let context = self.retrieve(query);

        info!(
            session = %session.id,
            %service,
            confidence = intent.confidence,
            passages = context.passages().len(),
            "request analyzed"
        );

        let outcome = AnalysisOutcome {
            service,
            service_label: service.label(),
            intent: intent.clone(),
            questions: catalog::fields(service).to_vec(),
            policy_passages: context.passages().len(),
        };

        session.query = Some(query.to_string());
        session.intent = Some(intent);
        session.context = context;
        session.outcome = None;

        Ok(outcome)
    }

    /// Validates, evaluates and explains the answers for an analyzed session.
    pub async fn submit(
        &self,
        session: &mut Session,
        raw: &BTreeMap<String, String>,
    ) -> Result<SubmissionOutcome, NavigatorError> {
        let service = session
            .intent
            .as_ref()
            .and_then(|intent| intent.service)
            .ok_or(NavigatorError::NotAnalyzed)?;

        let answers = catalog::parse_answers(service, raw)?;
        let outcome = self.process(service, answers, &session.context).await?;

        info!(
            session = %session.id,
            %service,
            eligible = outcome.result.decision,
            "submission processed"
        );

        session.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    pub fn reset(&self, session: &mut Session) {
        session.reset();
    }

    /// One pipeline pass: evaluate, explain, translate, and summarize when eligible.
    pub async fn process(
        &self,
        service: ServiceId,
        answers: FormAnswers,
        context: &PolicyContext,
    ) -> Result<SubmissionOutcome, NavigatorError> {
        let degraded = self.settings.degraded;
        let result = self.evaluator.evaluate_service(service, &answers, context)?;

        let english = self
            .explainer
            .explain(service, &answers, &result, degraded)
            .await;
        let english = ensure_substantive(english, &result);
        let translated = self.translator.translate(&english, degraded).await;

        let artifact = if result.decision {
            let document = SummaryDocument {
                service,
                answers: answers.clone(),
                result: result.clone(),
                explanation: english.clone(),
            };
            match self.emitter.emit(&document) {
                Ok(artifact) => Some(artifact),
                Err(err) => {
                    warn!(%service, error = %err, "application summary could not be written");
                    None
                }
            }
        } else {
            None
        };

        Ok(SubmissionOutcome {
            answers,
            result,
            explanation: Explanation {
                english,
                translated,
            },
            artifact,
        })
    }

    pub fn start_session(&self) -> Result<Session, NavigatorError> {
        let session = self.sessions.insert(Session::new(next_session_id()))?;
        info!(session = %session.id, "session started");
        Ok(session)
    }

    pub fn session(&self, id: &SessionId) -> Result<Session, NavigatorError> {
        self.sessions
            .fetch(id)?
            .ok_or_else(|| NavigatorError::UnknownSession(id.clone()))
    }

    pub fn analyze_session(
        &self,
        id: &SessionId,
        text: &str,
    ) -> Result<AnalysisOutcome, NavigatorError> {
        let mut session = self.session(id)?;
        let outcome = self.analyze(&mut session, text)?;
        self.sessions.update(session)?;
        Ok(outcome)
    }

    pub async fn submit_session(
        &self,
        id: &SessionId,
        raw: &BTreeMap<String, String>,
    ) -> Result<SubmissionOutcome, NavigatorError> {
        let mut session = self.session(id)?;
        let outcome = self.submit(&mut session, raw).await?;
        self.sessions.update(session)?;
        Ok(outcome)
    }

    pub fn reset_session(&self, id: &SessionId) -> Result<Session, NavigatorError> {
        let mut session = self.session(id)?;
        self.reset(&mut session);
        self.sessions.update(session.clone())?;
        info!(session = %session.id, "session reset");
        Ok(session)
    }

    pub fn artifact(&self, file_name: &str) -> Result<Option<Vec<u8>>, NavigatorError> {
        Ok(self.emitter.fetch(file_name)?)
    }
}

/// Error raised by the navigator service.
#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    #[error("request text is empty")]
    EmptyQuery,
    #[error("service not recognized, please rephrase the request")]
    ServiceNotRecognized,
    #[error("session has not been analyzed yet")]
    NotAnalyzed,
    #[error("session {0} not found")]
    UnknownSession(SessionId),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}
