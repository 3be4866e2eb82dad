//! Prompt assembly.

use crate::rag::retrieval::RetrievedChunk;

/// Separator placed between chunk texts in the context block.
pub const CONTEXT_DELIMITER: &str = "\n\n";

/// Join retrieved chunk texts in rank order.
pub fn assemble_context(results: &[RetrievedChunk]) -> String {
    results
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

/// Render the generation prompt. An empty `context` still produces the full
/// template, leaving the backend to answer from its own knowledge.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant. Use the provided context to answer the question.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:"
    )
}
