//! Heuristic clickbait classifier.
//!
//! Four independent checks combined by OR: lexical phrases, punctuation,
//! information-gap patterns and caps-heavy wording. Evaluation stops at the
//! first check that fires; none of them has side effects.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::catalog::{compile_pattern, CapsHeavyRules, GapPattern, PatternCatalog};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Lexical,
    Punctuation,
    InformationGap,
    CapsHeavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub clickbait: bool,
    /// First rule that fired, in evaluation order.
    pub rule: Option<Rule>,
}

impl Classification {
    const CLEAN: Self = Self {
        clickbait: false,
        rule: None,
    };

    fn flagged(rule: Rule) -> Self {
        Self {
            clickbait: true,
            rule: Some(rule),
        }
    }
}

#[derive(Debug)]
enum GapMatcher {
    Literal(String),
    Regex(Regex),
}

#[derive(Debug)]
struct PunctuationMatcher {
    min_question_marks: usize,
    min_exclamation_marks: usize,
    mixed_end: Option<Regex>,
    trailing_question_min_len: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

static TYPOGRAPHIC_APOSTROPHE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2018}\u{2019}]").unwrap());

/// Lowercase and fold curly apostrophes so "won’t" matches "won't".
fn normalize(text: &str) -> String {
    TYPOGRAPHIC_APOSTROPHE_RE
        .replace_all(&text.to_lowercase(), "'")
        .into_owned()
}

fn is_shouted(word: &str) -> bool {
    word.chars().count() > 2
        && word.chars().any(char::is_alphabetic)
        && word == word.to_uppercase()
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Compiled form of a [`PatternCatalog`].
///
/// Regex entries are compiled once here. An entry that fails to compile is
/// logged and left out; classification never fails.
#[derive(Debug)]
pub struct TextClassifier {
    lexical: Vec<String>,
    punctuation: PunctuationMatcher,
    gaps: Vec<GapMatcher>,
    caps: CapsHeavyRules,
}

impl Default for TextClassifier {
    fn default() -> Self {
        Self::new(PatternCatalog::default())
    }
}

impl TextClassifier {
    pub fn new(catalog: PatternCatalog) -> Self {
        let PatternCatalog {
            lexical_phrases,
            punctuation,
            information_gap,
            caps_heavy,
        } = catalog;

        let lexical = lexical_phrases
            .iter()
            .map(|p| normalize(p))
            .filter(|p| !p.is_empty())
            .collect();

        let mixed_end = match compile_pattern(&punctuation.mixed_end_pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(error = %e, "skipping mixed end punctuation pattern");
                None
            }
        };

        let gaps = information_gap
            .into_iter()
            .filter_map(|entry| match entry {
                GapPattern::Literal { text } => {
                    let text = normalize(&text);
                    (!text.is_empty()).then_some(GapMatcher::Literal(text))
                }
                GapPattern::Pattern { source } => match compile_pattern(&source) {
                    Ok(re) => Some(GapMatcher::Regex(re)),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping information gap pattern");
                        None
                    }
                },
            })
            .collect();

        Self {
            lexical,
            punctuation: PunctuationMatcher {
                min_question_marks: punctuation.min_question_marks,
                min_exclamation_marks: punctuation.min_exclamation_marks,
                mixed_end,
                trailing_question_min_len: punctuation.trailing_question_min_len,
            },
            gaps,
            caps: caps_heavy,
        }
    }

    /// `true` when the text looks like clickbait. `None`, empty and
    /// whitespace-only input is never clickbait.
    pub fn classify<'a>(&self, text: impl Into<Option<&'a str>>) -> bool {
        self.evaluate(text).clickbait
    }

    pub fn evaluate<'a>(&self, text: impl Into<Option<&'a str>>) -> Classification {
        let text: Option<&str> = text.into();
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Classification::CLEAN;
        };
        let lowered = normalize(text);

        if self.lexical_match(&lowered) {
            Classification::flagged(Rule::Lexical)
        } else if self.punctuation_match(text) {
            Classification::flagged(Rule::Punctuation)
        } else if self.information_gap_match(text, &lowered) {
            Classification::flagged(Rule::InformationGap)
        } else if self.caps_heavy_match(text) {
            Classification::flagged(Rule::CapsHeavy)
        } else {
            Classification::CLEAN
        }
    }

    fn lexical_match(&self, lowered: &str) -> bool {
        self.lexical.iter().any(|phrase| lowered.contains(phrase.as_str()))
    }

    fn punctuation_match(&self, text: &str) -> bool {
        let rules = &self.punctuation;
        let questions = text.matches('?').count();
        let exclamations = text.matches('!').count();

        if questions >= rules.min_question_marks || exclamations >= rules.min_exclamation_marks {
            return true;
        }
        if rules.mixed_end.as_ref().is_some_and(|re| re.is_match(text)) {
            return true;
        }
        // Rhetorical headline question: long enough not to be a genuine short one.
        text.ends_with('?')
            && !text.ends_with("??")
            && text.chars().count() > rules.trailing_question_min_len
    }

    fn information_gap_match(&self, text: &str, lowered: &str) -> bool {
        self.gaps.iter().any(|gap| match gap {
            GapMatcher::Literal(phrase) => lowered.contains(phrase.as_str()),
            GapMatcher::Regex(re) => re.is_match(text),
        })
    }

    fn caps_heavy_match(&self, text: &str) -> bool {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() || words.len() < self.caps.min_word_count {
            return false;
        }
        let shouted = words.iter().filter(|w| is_shouted(w)).count();
        shouted as f64 / words.len() as f64 > self.caps.ratio_threshold
    }
}
