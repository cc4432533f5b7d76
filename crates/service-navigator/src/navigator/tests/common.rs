use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::navigator::model::{DisabledModel, LanguageModel, ModelError};
use crate::navigator::retrieval::{EmptyRetriever, PolicyRetriever, RetrievalError};
use crate::navigator::summary::{
    SummaryArtifact, SummaryDocument, SummaryEmitter, SummaryError,
};
use crate::navigator::{
    navigator_router, InMemorySessionRepository, NavigatorService, NavigatorSettings,
};

pub(super) type TestService = NavigatorService<InMemorySessionRepository, RecordingEmitter>;

#[derive(Default)]
pub(super) struct RecordingEmitter {
    pub documents: Mutex<Vec<SummaryDocument>>,
    pub fail: bool,
}

impl SummaryEmitter for RecordingEmitter {
    fn emit(&self, document: &SummaryDocument) -> Result<SummaryArtifact, SummaryError> {
        if self.fail {
            return Err(SummaryError::Render("disk full".to_string()));
        }
        let mut documents = self.documents.lock().expect("emitter mutex poisoned");
        documents.push(document.clone());
        let file_name = format!("{}-{:03}.pdf", document.service, documents.len());
        Ok(SummaryArtifact {
            path: format!("forms/{file_name}").into(),
            file_name,
        })
    }

    fn fetch(&self, file_name: &str) -> Result<Option<Vec<u8>>, SummaryError> {
        let documents = self.documents.lock().expect("emitter mutex poisoned");
        let known = documents
            .iter()
            .enumerate()
            .any(|(index, document)| {
                format!("{}-{:03}.pdf", document.service, index + 1) == file_name
            });
        Ok(known.then(|| b"%PDF-1.3 test".to_vec()))
    }
}

impl RecordingEmitter {
    pub(super) fn emitted(&self) -> usize {
        self.documents.lock().expect("emitter mutex poisoned").len()
    }
}

/// Model that answers every prompt with the same text.
pub(super) struct ScriptedModel(pub &'static str);

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        Ok(self.0.to_string())
    }
}

/// Model that is configured but every call fails.
pub(super) struct UnreachableModel;

#[async_trait]
impl LanguageModel for UnreachableModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Status(502))
    }
}

pub(super) struct StaticRetriever(pub Vec<&'static str>);

impl PolicyRetriever for StaticRetriever {
    fn search(&self, _query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        Ok(self.0.iter().take(k).map(|p| p.to_string()).collect())
    }
}

pub(super) struct FailingRetriever;

impl PolicyRetriever for FailingRetriever {
    fn search(&self, _query: &str, _k: usize) -> Result<Vec<String>, RetrievalError> {
        Err(RetrievalError::Unavailable("index offline".to_string()))
    }
}

pub(super) fn service_with(
    retriever: Arc<dyn PolicyRetriever>,
    model: Arc<dyn LanguageModel>,
    degraded: bool,
) -> (Arc<TestService>, Arc<RecordingEmitter>) {
    let emitter = Arc::new(RecordingEmitter::default());
    let service = NavigatorService::new(
        Arc::new(InMemorySessionRepository::new()),
        emitter.clone(),
        retriever,
        model,
        NavigatorSettings {
            degraded,
            ..NavigatorSettings::default()
        },
    );
    (Arc::new(service), emitter)
}

/// Degraded service without policy context.
pub(super) fn offline_service() -> (Arc<TestService>, Arc<RecordingEmitter>) {
    service_with(Arc::new(EmptyRetriever), Arc::new(DisabledModel), true)
}

pub(super) fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub(super) fn router_for(service: Arc<TestService>) -> axum::Router {
    navigator_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
