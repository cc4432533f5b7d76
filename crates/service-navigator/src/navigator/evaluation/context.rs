use super::super::domain::PolicyContext;

pub(crate) const POLICY_EXCERPT_LIMIT: usize = 700;
pub(crate) const POLICY_REFERENCE_PREFIX: &str = "Policy Reference: ";
const ELLIPSIS: &str = "...";

/// Reason line carrying the retrieved policy text, or `None` when nothing was retrieved.
pub(crate) fn policy_reason(context: &PolicyContext) -> Option<String> {
    let joined = context.joined();
    if joined.is_empty() {
        return None;
    }

    Some(format!("{POLICY_REFERENCE_PREFIX}{}", excerpt(&joined)))
}

/// Keeps the first 700 characters and marks the cut; shorter text is returned verbatim.
pub(crate) fn excerpt(text: &str) -> String {
    match text.char_indices().nth(POLICY_EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
