//! Detection rule configuration.
//!
//! A [`PatternCatalog`] is plain data. [`crate::TextClassifier`] compiles it
//! once at construction and never mutates it afterwards, so several
//! classifiers with different catalogs can coexist.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Built-in rules
// ---------------------------------------------------------------------------

const LEXICAL_PHRASES: &[&str] = &[
    "you won't believe",
    "you will not believe",
    "won't believe what",
    "will blow your mind",
    "blow your mind",
    "will shock you",
    "will make you cry",
    "will leave you speechless",
    "will change your life",
    "can't stop laughing",
    "doctors hate",
    "one weird trick",
    "this simple trick",
    "what happened next",
    "what happens next",
    "jaw-dropping",
    "mind-blowing",
    "gone wrong",
    "gone viral",
    "must see",
    "must-see",
    "you need to know",
    "you need to see",
    "everyone is talking about",
    "the internet is losing it",
    "is breaking the internet",
    "shocking truth",
    "the truth about",
    "nobody tells you",
    "they don't want you to know",
    "before it's too late",
    "unbelievable",
    "insane",
];

const MIXED_END_PUNCTUATION: &str = r"[?!]{2,}|\?!|!\?";

const INFORMATION_GAP_LITERALS: &[&str] = &[
    "this one thing",
    "this one trick",
    "the reason why",
    "here's why",
    "here's what",
    "here's how",
    "you'll never guess",
    "find out why",
    "find out what",
    "the secret to",
    "the real reason",
    "no one saw coming",
    "nobody saw coming",
    "wait until you see",
    "wait till you see",
];

const INFORMATION_GAP_PATTERNS: &[&str] = &[
    r"^\d+\s+(reasons|things|ways|secrets|tricks|facts|signs|times|photos|celebrities)\b",
    r"\bnumber\s+\d+\s+will\b",
    r"\d+\s+\w+\s+that\s+will\b",
    r"^(guess|see|watch)\s+(what|who|how)\b",
    r"\s+(is|was|are)\s+not\s+what\s+you\s+think\b",
];

const MIN_QUESTION_MARKS: usize = 2;
const MIN_EXCLAMATION_MARKS: usize = 2;
const TRAILING_QUESTION_MIN_LEN: usize = 15;
const CAPS_RATIO_THRESHOLD: f64 = 0.4;
const CAPS_MIN_WORD_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunctuationRules {
    pub min_question_marks: usize,
    pub min_exclamation_marks: usize,
    pub mixed_end_pattern: String,
    pub trailing_question_min_len: usize,
}

impl Default for PunctuationRules {
    fn default() -> Self {
        Self {
            min_question_marks: MIN_QUESTION_MARKS,
            min_exclamation_marks: MIN_EXCLAMATION_MARKS,
            mixed_end_pattern: MIXED_END_PUNCTUATION.to_string(),
            trailing_question_min_len: TRAILING_QUESTION_MIN_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsHeavyRules {
    pub ratio_threshold: f64,
    pub min_word_count: usize,
}

impl Default for CapsHeavyRules {
    fn default() -> Self {
        Self {
            ratio_threshold: CAPS_RATIO_THRESHOLD,
            min_word_count: CAPS_MIN_WORD_COUNT,
        }
    }
}

/// One information-gap entry: a case-insensitive literal or a regex source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GapPattern {
    Literal { text: String },
    Pattern { source: String },
}

impl GapPattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal { text: text.into() }
    }

    pub fn pattern(source: impl Into<String>) -> Self {
        Self::Pattern {
            source: source.into(),
        }
    }

    /// Classify an untagged entry: digit or whitespace escapes, or a leading
    /// `^` / trailing `$`, make it a regex. Everything else is a literal.
    pub fn sniff(entry: &str) -> Self {
        let looks_like_regex = entry.contains(r"\d")
            || entry.contains(r"\s")
            || entry.starts_with('^')
            || entry.ends_with('$');
        if looks_like_regex {
            Self::pattern(entry)
        } else {
            Self::literal(entry)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGapPattern {
    Tagged(GapPattern),
    Bare(String),
}

fn deserialize_gap_patterns<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<GapPattern>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawGapPattern>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|entry| match entry {
            RawGapPattern::Tagged(pattern) => pattern,
            RawGapPattern::Bare(text) => GapPattern::sniff(&text),
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternCatalog {
    pub lexical_phrases: Vec<String>,
    pub punctuation: PunctuationRules,
    #[serde(deserialize_with = "deserialize_gap_patterns")]
    pub information_gap: Vec<GapPattern>,
    pub caps_heavy: CapsHeavyRules,
}

impl Default for PatternCatalog {
    fn default() -> Self {
        let information_gap = INFORMATION_GAP_LITERALS
            .iter()
            .map(|text| GapPattern::literal(*text))
            .chain(
                INFORMATION_GAP_PATTERNS
                    .iter()
                    .map(|source| GapPattern::pattern(*source)),
            )
            .collect();
        Self {
            lexical_phrases: LEXICAL_PHRASES.iter().map(|p| p.to_string()).collect(),
            punctuation: PunctuationRules::default(),
            information_gap,
            caps_heavy: CapsHeavyRules::default(),
        }
    }
}

impl PatternCatalog {
    /// A catalog with no phrases or gap entries; only the numeric rules apply.
    pub fn empty() -> Self {
        Self {
            lexical_phrases: Vec::new(),
            punctuation: PunctuationRules::default(),
            information_gap: Vec::new(),
            caps_heavy: CapsHeavyRules::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile every regex in the catalog, failing on the first bad one.
    pub fn validate(&self) -> Result<()> {
        compile_pattern(&self.punctuation.mixed_end_pattern)?;
        for entry in &self.information_gap {
            if let GapPattern::Pattern { source } = entry {
                compile_pattern(source)?;
            }
        }
        Ok(())
    }
}

/// Compile a catalog regex. All catalog patterns match case-insensitively.
pub(crate) fn compile_pattern(source: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){source}")).map_err(|e| Error::InvalidPattern {
        source_text: source.to_string(),
        message: e.to_string(),
    })
}
