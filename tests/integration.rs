use std::io::Write;

use baitmark::{
    classify, evaluate, mutation_channel, ContentTree, Document, GapPattern, MutationBatch,
    PatternCatalog, Rule, ScanConfig, ScanSession, SessionState, TextClassifier,
};

fn session_for(doc: Document) -> ScanSession<Document> {
    let root = doc.root();
    ScanSession::new(doc, Some(root), ScanConfig::default().into_scanner())
}

#[test]
fn empty_and_missing_text_is_not_clickbait() {
    assert!(!classify(""));
    assert!(!classify("   "));
    assert!(!classify(None::<&str>));
}

#[test]
fn lexical_match() {
    assert!(classify("You won't believe this trick"));
    assert_eq!(evaluate("You won't believe this trick").rule, Some(Rule::Lexical));
}

#[test]
fn repeated_punctuation() {
    assert!(classify("Wow!!"));
    assert!(classify("Really???"));
}

#[test]
fn trailing_question_heuristic() {
    assert!(classify("Is this the future of technology?"));
    assert!(!classify("Why?"));
}

#[test]
fn caps_heavy_text() {
    assert!(classify("THIS IS AMAZING TODAY"));
    assert!(!classify("This is a calm day"));
}

#[test]
fn classification_is_deterministic() {
    let texts = [
        "You won't believe this trick",
        "This is a calm day",
        "Is this the future of technology?",
        "THIS IS AMAZING TODAY",
    ];
    for text in texts {
        let first = classify(text);
        assert!((0..5).all(|_| classify(text) == first), "unstable result for {text:?}");
    }
}

#[test]
fn independent_classifiers_use_their_own_catalogs() {
    let mut strict = PatternCatalog::empty();
    strict.lexical_phrases = vec!["calm day".to_string()];
    strict.information_gap = vec![GapPattern::sniff(r"^\d+ ways")];
    let strict = TextClassifier::new(strict);

    assert!(strict.classify("This is a calm day"));
    assert!(strict.classify("7 ways to cook rice"));
    assert!(!classify("This is a calm day"));
    assert!(!strict.classify("You won't believe this trick"));
}

#[test]
fn initial_scan_marks_headline_link_once() {
    let mut doc = Document::new();
    let root = doc.root();
    let feed = doc.append_element(root, "section", &[("class", "feed")]);
    let story = doc.append_element(feed, "a", &[("href", "/story/1")]);
    doc.append_with_text(story, "h2", &[], "You won't believe this trick");
    doc.append_element(story, "img", &[("alt", "SHOCKING PHOTO INSIDE NOW")]);
    let calm = doc.append_element(feed, "a", &[("href", "/story/2")]);
    doc.append_with_text(calm, "h2", &[], "Council approves new library budget");

    let mut session = session_for(doc);
    let report = session.start();

    assert_eq!(session.state(), SessionState::Observing);
    assert_eq!(report.marked(), 1);
    assert_eq!(session.tree().mark_count(story), 1);
    assert!(!session.tree().is_marked(calm));
}

#[test]
fn reinserted_subtree_is_not_marked_again() {
    let (tx, watcher) = mutation_channel();
    let mut doc = Document::new();
    let root = doc.root();
    let card = doc.append_element(root, "article", &[]);
    let link = doc.append_element(card, "a", &[("href", "/x")]);
    doc.append_with_text(link, "h3", &[], "Doctors hate this one weird trick");

    let mut session = session_for(doc).with_watcher(watcher);
    assert_eq!(session.start().marked(), 1);

    // The host reports the same subtree, and then its ancestor, as inserted.
    tx.send(vec![card]);
    tx.send(vec![root]);
    let report = session.process_pending();

    assert_eq!(report.marked(), 0);
    assert_eq!(session.tree().mark_count(link), 1);
    assert_eq!(session.flags().marked_count(), 1);
}

#[test]
fn infinite_scroll_batches_are_scanned_in_order() {
    let (tx, watcher) = mutation_channel();
    let doc = Document::new();
    let root = doc.root();
    let mut session = session_for(doc).with_watcher(watcher);
    session.start();

    let mut links = Vec::new();
    for headline in [
        "Here's why the market fell",
        "Local bakery opens second shop downtown",
        "17 reasons to visit Lisbon",
    ] {
        let tree = session.tree_mut();
        let item = tree.append_element(root, "li", &[]);
        let link = tree.append_with_text(item, "a", &[("href", "/n")], headline);
        let text = tree.append_text(root, "loading...");
        links.push(link);
        tx.send(MutationBatch::new(vec![item, text]));
    }

    let report = session.process_pending();
    assert_eq!(report.links, 2);
    assert!(session.tree().is_marked(links[0]));
    assert!(!session.tree().is_marked(links[1]));
    assert!(session.tree().is_marked(links[2]));
}

#[test]
fn attribute_change_after_scan_is_not_reevaluated() {
    let mut doc = Document::new();
    let root = doc.root();
    let feed = doc.append_element(root, "section", &[]);
    let link = doc.append_with_text(feed, "a", &[("href", "/y")], "Quarterly earnings report");

    let (tx, watcher) = mutation_channel();
    let mut session = session_for(doc).with_watcher(watcher);
    assert_eq!(session.start().marked(), 0);
    assert!(session.flags().is_evaluated(link));

    // The link now matches the titled-link query; its container is reported
    // as inserted again.
    session
        .tree_mut()
        .set_attribute(link, "title", "You won't believe these earnings");
    tx.send(vec![feed]);
    tx.send(vec![root]);

    assert_eq!(session.process_pending().marked(), 0);
    assert!(!session.tree().is_marked(link));
    assert_eq!(session.flags().marked_count(), 0);
}

#[test]
fn session_without_root_ignores_batches() {
    let (tx, watcher) = mutation_channel();
    let mut doc = Document::new();
    let root = doc.root();
    let link = doc.append_with_text(root, "a", &[], "You won't believe this trick");
    let mut session = ScanSession::new(doc, None, ScanConfig::default().into_scanner())
        .with_watcher(watcher);

    tx.send(vec![link]);
    assert_eq!(session.process_pending().marked(), 0);
    assert_eq!(session.handle_batch(&MutationBatch::new(vec![root])).marked(), 0);
    assert_eq!(session.state(), SessionState::Init);
    assert!(session.tree().marked_elements().is_empty());
    assert!(session.flags().is_empty());
}

#[tokio::test]
async fn run_without_root_returns_immediately() {
    let (tx, watcher) = mutation_channel();
    let mut doc = Document::new();
    let root = doc.root();
    let link = doc.append_with_text(root, "a", &[], "You won't believe this trick");
    let mut session = ScanSession::new(doc, None, ScanConfig::default().into_scanner())
        .with_watcher(watcher);

    // The sender stays alive; a run that waited on it would never finish.
    tx.send(vec![link]);
    let report = session.run().await;

    assert_eq!(report.marked(), 0);
    assert_eq!(session.state(), SessionState::Init);
    assert!(!session.tree().is_marked(link));
    drop(tx);
}

#[test]
fn session_without_root_scans_nothing() {
    let mut doc = Document::new();
    let root = doc.root();
    doc.append_with_text(root, "a", &[], "You won't believe this trick");
    let mut session = ScanSession::new(doc, None, ScanConfig::default().into_scanner());

    assert_eq!(session.start().marked(), 0);
    assert_eq!(session.state(), SessionState::Init);
    assert!(session.tree().marked_elements().is_empty());
}

#[tokio::test]
async fn run_consumes_until_senders_drop() {
    let (tx, watcher) = mutation_channel();
    let mut doc = Document::new();
    let root = doc.root();
    let first = doc.append_with_text(root, "a", &[], "Is this the future of technology?");
    let late = doc.append_element(root, "div", &[("class", "headline")]);
    doc.append_text(late, "THIS CHANGES EVERYTHING FOREVER");

    let mut session = session_for(doc).with_watcher(watcher);
    tx.send(vec![late]);
    tx.send(vec![late, first]);
    drop(tx);

    let report = session.run().await;
    assert_eq!(session.state(), SessionState::Observing);
    assert_eq!(report.marked(), 2);
    assert_eq!(session.tree().mark_count(first), 1);
    assert_eq!(session.tree().mark_count(late), 1);
}

#[test]
fn config_file_overrides_catalog() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "catalog": {{
                "lexical_phrases": ["budget"],
                "information_gap": ["(\\d+ broken", {{"kind": "literal", "text": "quietly"}}]
            }}
        }}"#
    )
    .unwrap();

    let config = ScanConfig::from_path(file.path()).unwrap();
    assert!(config.validate().is_err());

    let classifier = config.classifier();
    assert!(classifier.classify("Council approves new library budget"));
    assert!(classifier.classify("Market quietly recovers"));
    assert!(!classifier.classify("You won't believe this trick"));

    let mut doc = Document::new();
    let root = doc.root();
    let link = doc.append_with_text(root, "a", &[], "Council approves new library budget");
    let mut session = ScanSession::new(doc, Some(root), config.into_scanner());
    session.start();
    assert!(session.tree().is_marked(link));
    assert_eq!(session.tree().tag_name(link), Some("a"));
}

#[test]
fn json_document_round_through_scanner() {
    let json = r#"{
        "tag": "body",
        "children": [
            {"tag": "a", "attrs": {"href": "/1", "title": "What happened next will shock you"},
             "children": [{"text": "Read"}]},
            {"tag": "a", "attrs": {"href": "/2"}, "children": [{"text": "https://example.com/wow!!"}]},
            {"tag": "a", "attrs": {"href": "/3"}, "children": [
                {"tag": "img", "attrs": {"alt": "Jaw-dropping sunset"}}
            ]}
        ]
    }"#;
    let doc = Document::from_json(json).unwrap();
    let mut session = session_for(doc);
    let report = session.start();

    assert_eq!(report.structural, 1);
    assert_eq!(report.links, 0);
    assert_eq!(report.images, 1);
    assert_eq!(session.tree().marked_elements().len(), 2);
}
