//! Writing style catalogue: style name to prompt directive.

use crate::config::StyleSettings;

const BUILTIN_STYLES: &[(&str, &str)] = &[
    (
        "Conversational",
        "Write conversational scripts that feel like talking to a friend. Use everyday \
         language and relatable references. Be natural and approachable.",
    ),
    (
        "Humorous",
        "Create witty, entertaining scripts with clever observations and light humor. Find \
         the amusing angle or ironic twist. Keep it fun and engaging while being respectful.",
    ),
    (
        "Thoughtful",
        "Develop reflective scripts that connect deeper themes and meanings. Be insightful \
         and contemplative. Explore the human condition and universal truths.",
    ),
    (
        "Casual",
        "Keep the scripts relaxed and easygoing, the way you would mention something to a \
         listener over coffee. Short sentences, no big words, a little warmth.",
    ),
    (
        "Storytelling",
        "Tell it like a story with a beginning and a payoff. Set the scene with the concrete \
         details, build a little suspense, and let the song land as the last line.",
    ),
];

/// Used for unknown style names unless the configuration names another one.
const FALLBACK_STYLE: &str = "Conversational";

#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleEntry {
    name: String,
    directive: String,
}

#[derive(Debug, Clone)]
pub struct StyleDirectives {
    entries: Vec<StyleEntry>,
    default_directive: String,
}

impl StyleDirectives {
    /// Built-in styles, overridden or extended by the configured ones.
    pub fn from_settings(settings: &StyleSettings) -> Self {
        let mut entries: Vec<StyleEntry> = BUILTIN_STYLES
            .iter()
            .map(|(name, directive)| StyleEntry {
                name: name.to_string(),
                directive: directive.to_string(),
            })
            .collect();

        for (name, directive) in &settings.directives {
            match entries
                .iter_mut()
                .find(|entry| entry.name.eq_ignore_ascii_case(name))
            {
                Some(existing) => existing.directive = directive.clone(),
                None => entries.push(StyleEntry {
                    name: name.clone(),
                    directive: directive.clone(),
                }),
            }
        }

        let default_directive = match &settings.default_directive {
            Some(directive) => directive.clone(),
            None => entries
                .iter()
                .find(|entry| entry.name == FALLBACK_STYLE)
                .map(|entry| entry.directive.clone())
                .unwrap_or_default(),
        };

        Self {
            entries,
            default_directive,
        }
    }

    pub fn directive_for(&self, style: &str) -> &str {
        let style = style.trim();
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(style))
            .map(|entry| entry.directive.as_str())
            .unwrap_or(&self.default_directive)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }
}

impl Default for StyleDirectives {
    fn default() -> Self {
        Self::from_settings(&StyleSettings::default())
    }
}
