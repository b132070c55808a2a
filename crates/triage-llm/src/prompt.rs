//! Prompt assembly for grounded answer generation.

/// The refusal token the generator is instructed to emit when the supplied
/// snippets cannot answer the question.
pub const INSUFFICIENT_MARKER: &str = "INSUFFICIENT";

/// Secondary refusal token some generator paths emit.
pub const ESCALATE_MARKER: &str = "ESCALATE";

/// Build the strict-grounding answer prompt for a query and its knowledge
/// snippet context. The rules pin the generator to the snippets and give it
/// exactly one way to decline.
pub fn answer_prompt(query: &str, context: &str) -> String {
    format!(
        r#"You are an IT helpdesk assistant. Answer the user's question using ONLY the KB snippets provided below.

CRITICAL RULES - STRICT GROUNDING:
1. Use ONLY the KB SNIPPETS below. Do NOT use any external knowledge, training data, or general information.
2. If the KB snippets do not contain sufficient information to answer the question safely and accurately, respond with exactly: "INSUFFICIENT"
3. Never make assumptions or fill in gaps with external knowledge
4. Be concise and helpful when KB has the answer
5. Include step-by-step instructions when they exist in the KB snippets
6. If you're uncertain whether the KB has enough info, respond with "INSUFFICIENT"

KB SNIPPETS:
{context}

USER QUESTION:
{query}

ANSWER (KB-only, or "INSUFFICIENT"):"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_query_and_context() {
        let p = answer_prompt("How do I reset my password?", "Use the portal link.");
        assert!(p.contains("How do I reset my password?"));
        assert!(p.contains("Use the portal link."));
        assert!(p.contains(INSUFFICIENT_MARKER));
    }
}
