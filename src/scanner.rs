//! Subtree scanning.
//!
//! A scan makes three passes over a subtree, sharing one [`FlagState`]:
//!
//! 1. structural candidates from the configured queries,
//! 2. every link not yet marked,
//! 3. image alt text.
//!
//! Every element whose text is read is recorded as evaluated in the
//! [`FlagState`] and never classified again, and marked targets are never
//! reconsidered. Scanning the same subtree again, or a subtree that changed
//! in place, therefore adds no classifications and no marks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier::TextClassifier;
use crate::flags::FlagState;
use crate::tree::{ContentTree, NodeId};

// Hierarchical schemes, the common opaque ones, and scheme-less `www.` hosts.
// A bare `word:` prefix is left alone so "Breaking: ..." still gets classified.
static URL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*://|(?:mailto|tel|sms|javascript|data):|www\.)").unwrap()
});

const MIN_FALLBACK_TEXT_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerOptions {
    /// Attributes holding a descriptive title, in order of preference.
    pub title_attributes: Vec<String>,
    pub link_tag: String,
    pub image_tag: String,
    /// Link text of this many characters or fewer is ignored by the link pass.
    pub min_fallback_text_len: usize,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            title_attributes: vec!["title".to_string()],
            link_tag: "a".to_string(),
            image_tag: "img".to_string(),
            min_fallback_text_len: MIN_FALLBACK_TEXT_LEN,
        }
    }
}

/// Marks made by one scan, per pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Elements returned by the structural queries.
    pub candidates: usize,
    pub structural: usize,
    pub links: usize,
    pub images: usize,
}

impl ScanReport {
    pub fn marked(&self) -> usize {
        self.structural + self.links + self.images
    }
}

impl std::ops::AddAssign for ScanReport {
    fn add_assign(&mut self, other: Self) {
        self.candidates += other.candidates;
        self.structural += other.structural;
        self.links += other.links;
        self.images += other.images;
    }
}

#[derive(Debug)]
pub struct TreeScanner<Q> {
    classifier: TextClassifier,
    queries: Vec<Q>,
    options: ScannerOptions,
}

impl<Q> TreeScanner<Q> {
    pub fn new(classifier: TextClassifier, queries: Vec<Q>, options: ScannerOptions) -> Self {
        Self {
            classifier,
            queries,
            options,
        }
    }

    pub fn classifier(&self) -> &TextClassifier {
        &self.classifier
    }

    pub fn scan<T>(&self, tree: &mut T, flags: &mut FlagState, root: NodeId) -> ScanReport
    where
        T: ContentTree<Query = Q>,
    {
        let mut report = ScanReport::default();
        if !tree.is_element(root) {
            return report;
        }

        self.scan_structural(tree, flags, root, &mut report);
        self.scan_links(tree, flags, root, &mut report);
        self.scan_images(tree, flags, root, &mut report);

        tracing::debug!(
            root = root.index(),
            candidates = report.candidates,
            structural = report.structural,
            links = report.links,
            images = report.images,
            "scanned subtree"
        );
        report
    }

    fn scan_structural<T>(
        &self,
        tree: &mut T,
        flags: &mut FlagState,
        root: NodeId,
        report: &mut ScanReport,
    ) where
        T: ContentTree<Query = Q>,
    {
        for node in tree.query(root, &self.queries) {
            report.candidates += 1;
            if !flags.set_evaluated(node) {
                continue;
            }
            let (text, target) = match self.title_of(&*tree, node) {
                Some(title) => (title, node),
                None => {
                    let target = tree.closest(node, &self.options.link_tag).unwrap_or(node);
                    (tree.text_content(node), target)
                }
            };
            if self.flag(tree, flags, target, &text) {
                report.structural += 1;
            }
        }
    }

    fn scan_links<T>(
        &self,
        tree: &mut T,
        flags: &mut FlagState,
        root: NodeId,
        report: &mut ScanReport,
    ) where
        T: ContentTree<Query = Q>,
    {
        for link in self.elements_tagged(&*tree, root, &self.options.link_tag) {
            if flags.is_marked(link) || !flags.set_evaluated(link) {
                continue;
            }
            let text = self
                .title_of(&*tree, link)
                .unwrap_or_else(|| tree.text_content(link).trim().to_string());
            if text.chars().count() <= self.options.min_fallback_text_len
                || URL_PREFIX_RE.is_match(&text)
            {
                continue;
            }
            if self.flag(tree, flags, link, &text) {
                report.links += 1;
            }
        }
    }

    fn scan_images<T>(
        &self,
        tree: &mut T,
        flags: &mut FlagState,
        root: NodeId,
        report: &mut ScanReport,
    ) where
        T: ContentTree<Query = Q>,
    {
        for image in self.elements_tagged(&*tree, root, &self.options.image_tag) {
            let Some(alt) = non_empty(tree.attribute(image, "alt")) else {
                continue;
            };
            let link = tree.closest(image, &self.options.link_tag);
            if link.is_some_and(|l| flags.is_marked(l)) || !flags.set_evaluated(image) {
                continue;
            }
            if self.flag(tree, flags, link.unwrap_or(image), &alt) {
                report.images += 1;
            }
        }
    }

    /// Classify `text` and mark `target` on a hit. The caller has already
    /// recorded the element the text came from as evaluated.
    fn flag<T: ContentTree>(
        &self,
        tree: &mut T,
        flags: &mut FlagState,
        target: NodeId,
        text: &str,
    ) -> bool {
        if flags.is_marked(target) {
            return false;
        }
        let verdict = self.classifier.evaluate(text);
        if !verdict.clickbait || !flags.set_marked(target) {
            return false;
        }
        tree.mark(target);
        tracing::trace!(node = target.index(), rule = ?verdict.rule, text, "marked clickbait");
        true
    }

    fn title_of<T: ContentTree>(&self, tree: &T, node: NodeId) -> Option<String> {
        self.options
            .title_attributes
            .iter()
            .find_map(|name| non_empty(tree.attribute(node, name)))
    }

    fn elements_tagged<T: ContentTree>(&self, tree: &T, root: NodeId, tag: &str) -> Vec<NodeId> {
        tree.descendant_elements(root)
            .into_iter()
            .filter(|id| tree.tag_name(*id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
