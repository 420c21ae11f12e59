// Context formatting for retrieval-augmented prompts
use crate::types::RetrievedDocument;

/// Substituted when retrieval ran but found nothing
pub const NO_RELEVANT_CONTEXT: &str = "No relevant information found in knowledge base.";

/// Substituted when the caller disabled retrieval
pub const NO_RETRIEVAL_CONTEXT: &str = "No context retrieval requested.";

/// Render retrieved documents as numbered context blocks.
///
/// Each document becomes `[Document i: title]\ntext`, 1-based, in ranking
/// order. An empty slice yields [`NO_RELEVANT_CONTEXT`].
pub fn format_context(documents: &[RetrievedDocument]) -> String {
    if documents.is_empty() {
        return NO_RELEVANT_CONTEXT.to_string();
    }

    documents
        .iter()
        .enumerate()
        .map(|(idx, doc)| format!("[Document {}: {}]\n{}\n", idx + 1, doc.title_or_default(), doc.text))
        .collect::<Vec<_>>()
        .join("\n")
}
