//! Clickbait detection for headlines, link labels and image captions in a
//! growing content tree.
//!
//! [`classify`] judges a single fragment with the built-in rules. For a
//! tree, build a [`TreeScanner`] (usually through [`ScanConfig`]), wrap the
//! tree in a [`ScanSession`] and feed it [`MutationBatch`]es as content is
//! inserted. Each element is marked at most once.

use once_cell::sync::Lazy;

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod dom;
pub mod error;
pub mod flags;
pub mod scanner;
pub mod session;
pub mod tree;
pub mod watcher;

pub use catalog::{CapsHeavyRules, GapPattern, PatternCatalog, PunctuationRules};
pub use classifier::{Classification, Rule, TextClassifier};
pub use config::ScanConfig;
pub use dom::{default_queries, Document, NodeSpec, StructuralQuery};
pub use error::{Error, Result};
pub use flags::FlagState;
pub use scanner::{ScanReport, ScannerOptions, TreeScanner};
pub use session::{ScanSession, SessionState};
pub use tree::{ContentTree, NodeId, NodeKind};
pub use watcher::{mutation_channel, MutationBatch, MutationSender, MutationWatcher};

static DEFAULT_CLASSIFIER: Lazy<TextClassifier> = Lazy::new(TextClassifier::default);

/// Classify one fragment with the built-in catalog.
pub fn classify<'a>(text: impl Into<Option<&'a str>>) -> bool {
    DEFAULT_CLASSIFIER.classify(text)
}

/// Like [`classify`], also reporting which rule fired.
pub fn evaluate<'a>(text: impl Into<Option<&'a str>>) -> Classification {
    DEFAULT_CLASSIFIER.evaluate(text)
}
