use std::sync::Arc;

use tracing::{debug, warn};

use super::model::LanguageModel;

/// Shown ahead of the English text when translation is switched off.
pub const OFFLINE_NOTICE: &str = "آف لائن موڈ: اردو ترجمہ فی الحال دستیاب نہیں۔";
/// Returned alone when a translation request fails.
pub const UNAVAILABLE_NOTICE: &str = "ترجمہ دستیاب نہیں۔";

/// Renders explanations in Urdu.
#[derive(Clone)]
pub struct Translator {
    model: Arc<dyn LanguageModel>,
}

impl Translator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// The offline branch keeps the English text; the failure branch does not.
    pub async fn translate(&self, text: &str, degraded: bool) -> String {
        if degraded || !self.model.is_available() {
            return format!("{OFFLINE_NOTICE}\n\n{text}");
        }

        match self.model.complete(&translation_prompt(text)).await {
            Ok(translated) => {
                debug!("explanation translated to urdu");
                translated.trim().to_string()
            }
            Err(err) => {
                warn!(error = %err, "translation unavailable");
                UNAVAILABLE_NOTICE.to_string()
            }
        }
    }
}

pub(crate) fn translation_prompt(text: &str) -> String {
    format!("Translate this into Urdu. Keep it short, simple and friendly:\n\n{text}")
}
