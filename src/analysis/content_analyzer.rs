use super::models::ContentAnalysis;
use crate::content::ContentKind;
use crate::llm::{complete_prompt, CompletionOptions, LlmError, LlmProvider};
use crate::scripts::recover_json;
use crate::server::metrics::record_degraded_result;
use std::sync::Arc;
use tracing::warn;

/// The prompt asks for concrete names, numbers and places so that a listener
/// can recognise the story from the script alone.
pub fn content_prompt(text: &str, kind: ContentKind) -> String {
    format!(
        r#"Analyze the following content and provide a comprehensive analysis for a radio DJ who wants to connect it with song introductions. The analysis MUST capture specific, newsworthy details that make this story identifiable and compelling to listeners.

Content Type: {kind}
Content: {text}

CRITICAL REQUIREMENTS for analysis:
1. Extract SPECIFIC FACTS: names, numbers, locations, dates, exact details
2. Identify what makes this story NEWSWORTHY and unique
3. Capture details that help listeners immediately understand what story is being referenced
4. Include measurable/quantifiable information when available
5. Preserve proper nouns, specific places, exact figures, and concrete details

Provide an analysis that includes:
1. A detailed summary with SPECIFIC facts (who, what, where, when, how much)
2. Key newsworthy points with concrete details
3. Emotional tone and style
4. Relevance score for radio content (1-10)

EXAMPLES of good vs. bad specificity:
BAD: "A celebrity lost weight for a role"
GOOD: "Dwayne 'The Rock' Johnson dramatically slimmed down for his role in 'The Smashing Machine' at the Toronto Film Festival"

BAD: "A suburban area was ranked highly"
GOOD: "Johns Creek, Georgia was ranked America's #1 best place to live by Architectural Digest, beating major metros"

Focus on extracting specific information that would make listeners think "Oh, they're talking about THAT story!"

CRITICAL: Respond with ONLY valid JSON. No explanations, no markdown formatting, no extra text before or after the JSON.

Required JSON format:
{{
  "summary": "detailed summary with specific facts, names, numbers, locations",
  "key_points": ["array", "of", "specific", "newsworthy", "details", "with", "concrete", "facts"],
  "tone": "emotional tone of the content",
  "topics": ["array", "of", "main", "topics"],
  "relevance_score": number_from_1_to_10
}}"#
    )
}

/// Extracts facts from request content. Nothing is cached.
pub struct ContentAnalyzer {
    llm: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl ContentAnalyzer {
    pub fn new(llm: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }

    pub async fn analyze(&self, text: &str, kind: ContentKind) -> Result<ContentAnalysis, LlmError> {
        let response =
            complete_prompt(self.llm.as_ref(), &content_prompt(text, kind), &self.options).await?;

        Ok(match recover_json::<ContentAnalysis>(&response.content) {
            Ok(analysis) => analysis,
            Err(e) => {
                record_degraded_result("content_analysis");
                warn!(
                    kind = %kind,
                    error = %e,
                    response_len = response.content.len(),
                    "Content analysis unparseable, using fallback"
                );
                ContentAnalysis::fallback()
            }
        })
    }
}
