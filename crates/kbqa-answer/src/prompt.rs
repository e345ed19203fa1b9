const PREAMBLE: &str = "You are a helpful assistant. Answer the user's question based ONLY on the following \
context from the knowledge base. If the answer isn't in the context, say so clearly.\n\n\
Be friendly with the user and answer greetings politely.";

/// Instruction preamble, then the demarcated context, then the question.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!("{PREAMBLE}\n\nContext:\n{context}\n\nQuestion: {question}\n\nAnswer:")
}
