use super::*;

const THRESHOLD: f64 = 0.1;

fn docs(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|d| (*d).to_string()).collect()
}

#[test]
fn build_on_empty_corpus_fails() {
    assert_eq!(
        RetrievalEngine::build(Vec::new(), THRESHOLD).err(),
        Some(EngineError::EmptyCorpus)
    );
}

#[test]
fn build_drops_documents_that_normalize_to_empty() {
    let engine = RetrievalEngine::build(docs(&["?!?", "real content here", "   "]), THRESHOLD)
        .expect("one usable document remains");
    assert_eq!(engine.document_count(), 1);
}

#[test]
fn build_on_all_unusable_documents_fails() {
    assert_eq!(
        RetrievalEngine::build(docs(&["?!?", "...", "\n\t"]), THRESHOLD).err(),
        Some(EngineError::EmptyCorpus)
    );
}

#[test]
fn exact_document_text_is_its_own_best_match() {
    let corpus = [
        "capillary loyalty program overview",
        "capillary api authentication guide",
    ];
    let engine = RetrievalEngine::build(docs(&corpus), THRESHOLD).expect("corpus is usable");

    for doc in corpus {
        match engine.answer(doc, 1000) {
            Answer::Excerpt(text) => assert_eq!(text, doc),
            Answer::NoMatch => panic!("self-query must clear the threshold"),
        }
    }
}

#[test]
fn disjoint_query_yields_no_match() {
    let engine = RetrievalEngine::build(
        docs(&[
            "capillary loyalty program overview",
            "capillary api authentication guide",
        ]),
        THRESHOLD,
    )
    .expect("corpus is usable");

    assert_eq!(
        engine.answer("unrelated gibberish xyzzy plugh", 1000),
        Answer::NoMatch
    );
}

#[test]
fn authentication_query_finds_authentication_document() {
    let corpus = [
        "capillary loyalty program overview",
        "capillary api authentication guide",
    ];
    let engine = RetrievalEngine::build(docs(&corpus), THRESHOLD).expect("corpus is usable");

    match engine.answer("how do I authenticate with the api", 1000) {
        Answer::Excerpt(text) => assert_eq!(text, corpus[1]),
        Answer::NoMatch => panic!("query shares terms with the corpus"),
    }
}

#[test]
fn excerpt_is_raw_text_not_normalized() {
    let raw = "The API: Authentication, step-by-step!";
    let engine = RetrievalEngine::build(docs(&[raw]), THRESHOLD).expect("corpus is usable");

    match engine.answer("api authentication", 1000) {
        Answer::Excerpt(text) => assert_eq!(text, raw),
        Answer::NoMatch => panic!("query matches the only document"),
    }
}

#[test]
fn excerpt_is_truncated_to_requested_length() {
    let raw = "word ".repeat(400);
    let engine =
        RetrievalEngine::build(docs(&[raw.as_str()]), THRESHOLD).expect("corpus is usable");

    match engine.answer("word", 100) {
        Answer::Excerpt(text) => {
            assert_eq!(text.chars().count(), 100);
            assert!(raw.starts_with(text.as_str()));
        }
        Answer::NoMatch => panic!("query matches the only document"),
    }
}

#[test]
fn threshold_is_exclusive_below_only() {
    // With a single document and an exactly-matching query the score is 1.0;
    // a threshold of 1.0 must still accept it (only strictly-below rejects).
    let engine =
        RetrievalEngine::build(docs(&["alpha beta gamma"]), 1.0).expect("corpus is usable");
    assert!(matches!(
        engine.answer("alpha beta gamma", 1000),
        Answer::Excerpt(_)
    ));
}

#[test]
fn tied_documents_resolve_to_lowest_index() {
    // The two raw texts differ but normalize to the same token stream, so
    // both documents reach the same similarity score against the query and
    // the winner must be the lower index.
    let engine = RetrievalEngine::build(
        docs(&["Duplicate entry text!", "duplicate   ENTRY text"]),
        THRESHOLD,
    )
    .expect("corpus is usable");

    for _ in 0..10 {
        match engine.answer("duplicate entry text", 1000) {
            Answer::Excerpt(text) => assert_eq!(text, "Duplicate entry text!"),
            Answer::NoMatch => panic!("query matches both documents"),
        }
    }
}

#[test]
fn answers_are_deterministic_across_builds() {
    let corpus = [
        "points and rewards reference",
        "capillary api authentication guide",
        "loyalty program overview",
    ];
    let first = RetrievalEngine::build(docs(&corpus), THRESHOLD).expect("corpus is usable");
    let second = RetrievalEngine::build(docs(&corpus), THRESHOLD).expect("corpus is usable");

    for query in ["api authentication", "rewards", "program overview", "zzz"] {
        assert_eq!(first.answer(query, 500), second.answer(query, 500));
    }
}

#[test]
fn no_match_reply_rendering() {
    assert_eq!(Answer::NoMatch.into_reply(), NO_MATCH_REPLY);
    assert_eq!(
        Answer::Excerpt("some text".to_string()).into_reply(),
        "some text"
    );
}
