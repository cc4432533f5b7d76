//! Citizen service navigation: route a free-text request to a public service, ask its
//! follow-up questions, decide eligibility, and explain the decision in English and Urdu.

pub mod catalog;
pub mod domain;
pub mod evaluation;
pub mod explanation;
pub mod intent;
pub mod model;
pub mod retrieval;
pub mod router;
pub mod service;
pub mod session;
pub mod summary;
pub mod translation;

#[cfg(test)]
mod tests;

pub use domain::{
    AnswerValue, EligibilityResult, Explanation, FieldKind, FormAnswers, InputError, IntentMatch,
    PolicyContext, QuestionField, ServiceId,
};
pub use evaluation::EligibilityEvaluator;
pub use explanation::ExplanationGenerator;
pub use model::{select_model, ChatCompletionsClient, DisabledModel, LanguageModel, ModelError};
pub use retrieval::{
    select_retriever, CorpusRetriever, EmptyRetriever, PolicyRetriever, RetrievalError,
};
pub use router::navigator_router;
pub use service::{AnalysisOutcome, NavigatorError, NavigatorService, NavigatorSettings};
pub use session::{
    InMemorySessionRepository, Session, SessionId, SessionRepository, SessionStoreError,
    SubmissionOutcome,
};
pub use summary::{
    PdfSummaryEmitter, SummaryArtifact, SummaryDocument, SummaryEmitter, SummaryError,
};
pub use translation::Translator;
