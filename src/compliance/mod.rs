//! Broadcast-language gate applied to normalized content.

use lazy_static::lazy_static;
use regex::RegexSet;
use serde::Serialize;

/// Matched as whole words only.
const PROHIBITED_WORDS: &[&str] = &[
    "fuck", "shit", "damn", "hell", "bitch", "ass", "bastard", "crap",
];

/// Matched at the start of a word, so inflections are caught too.
const PROHIBITED_STEMS: &[&str] = &["explicit", "sexual", "porn", "nude", "naked"];

lazy_static! {
    static ref PROHIBITED_TERMS: Vec<&'static str> = PROHIBITED_WORDS
        .iter()
        .chain(PROHIBITED_STEMS.iter())
        .copied()
        .collect();
    static ref PROHIBITED_SET: RegexSet = RegexSet::new(
        PROHIBITED_WORDS
            .iter()
            .map(|word| format!(r"(?i)\b{}\b", word))
            .chain(PROHIBITED_STEMS.iter().map(|stem| format!(r"(?i)\b{}", stem)))
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub is_compliant: bool,
    pub issues: Vec<String>,
}

impl ComplianceResult {
    pub fn compliant() -> Self {
        Self {
            is_compliant: true,
            issues: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ComplianceFilter;

impl ComplianceFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, text: &str) -> ComplianceResult {
        let issues: Vec<String> = PROHIBITED_SET
            .matches(text)
            .into_iter()
            .map(|index| PROHIBITED_TERMS[index].to_string())
            .collect();

        if issues.is_empty() {
            ComplianceResult::compliant()
        } else {
            ComplianceResult {
                is_compliant: false,
                issues,
            }
        }
    }
}
