use super::*;
use crate::engine::normalize::normalize;

fn normalized_docs(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|d| normalize(d)).collect()
}

fn fit_docs(raw: &[&str]) -> TfIdfVectorizer {
    let mut vectorizer = TfIdfVectorizer::new();
    vectorizer
        .fit(&normalized_docs(raw))
        .expect("fit should succeed on a non-empty corpus");
    vectorizer
}

#[test]
fn transform_before_fit_is_an_error() {
    let vectorizer = TfIdfVectorizer::new();
    assert!(matches!(
        vectorizer.transform("anything"),
        Err(EngineError::IndexNotBuilt)
    ));
    assert!(matches!(
        vectorizer.fitted(),
        Err(EngineError::IndexNotBuilt)
    ));
}

#[test]
fn fit_on_empty_corpus_is_an_error() {
    let mut vectorizer = TfIdfVectorizer::new();
    assert!(matches!(
        vectorizer.fit(&[]),
        Err(EngineError::EmptyCorpus)
    ));

    // Documents that normalize to nothing contribute no vocabulary either.
    let mut vectorizer = TfIdfVectorizer::new();
    assert!(matches!(
        vectorizer.fit(&normalized_docs(&["?!?", "   "])),
        Err(EngineError::EmptyCorpus)
    ));
}

#[test]
fn document_vectors_are_unit_length() {
    let vectorizer = fit_docs(&[
        "the quick brown fox",
        "the lazy dog",
        "quick quick slow",
    ]);

    let model = vectorizer.fitted().expect("model should be fitted");
    assert_eq!(model.document_count(), 3);
    for vector in model.doc_vectors() {
        let norm: f64 = vector.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9, "norm was {norm}");
    }
}

#[test]
fn sparse_dimensions_are_sorted_and_unique() {
    let vectorizer = fit_docs(&["b a c a b a", "c c d"]);
    let model = vectorizer.fitted().expect("model should be fitted");

    for vector in model.doc_vectors() {
        for pair in vector.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }
}

#[test]
fn unseen_query_tokens_contribute_zero() {
    let vectorizer = fit_docs(&["alpha beta", "beta gamma"]);

    let query = vectorizer
        .transform(&normalize("alpha xyzzy plugh"))
        .expect("transform should succeed after fit");

    // Only "alpha" is in the vocabulary, so the vector has one dimension
    // and unit weight after normalization.
    assert_eq!(query.len(), 1);
    assert!((query[0].1 - 1.0).abs() < 1e-9);

    let disjoint = vectorizer
        .transform(&normalize("xyzzy plugh"))
        .expect("transform should succeed after fit");
    assert!(disjoint.is_empty());
}

#[test]
fn rare_terms_outweigh_common_terms() {
    // "shared" appears in every document, "rare" in one. With equal counts
    // in the same document, the rare term must carry the larger weight.
    let vectorizer = fit_docs(&["shared rare", "shared other", "shared more"]);
    let model = vectorizer.fitted().expect("model should be fitted");

    let first = &model.doc_vectors()[0];
    assert_eq!(first.len(), 2);
    let shared_weight = first[0].1;
    let rare_weight = first[1].1;
    assert!(
        rare_weight > shared_weight,
        "rare {rare_weight} vs shared {shared_weight}"
    );
}

#[test]
fn term_frequency_raises_weight() {
    let vectorizer = fit_docs(&["apple apple banana", "cherry date"]);
    let model = vectorizer.fitted().expect("model should be fitted");

    let first = &model.doc_vectors()[0];
    // Both terms are unique to the document, so IDF is equal and the
    // double-counted "apple" must dominate.
    assert!(first[0].1 > first[1].1);
}

#[test]
fn fit_is_deterministic() {
    let docs = [
        "capillary loyalty program overview",
        "capillary api authentication guide",
        "points and rewards reference",
    ];

    let first = fit_docs(&docs);
    let second = fit_docs(&docs);

    let first = first.fitted().expect("model should be fitted");
    let second = second.fitted().expect("model should be fitted");

    assert_eq!(first.vocabulary_size(), second.vocabulary_size());
    assert_eq!(first.doc_vectors(), second.doc_vectors());

    let q = normalize("how do I authenticate with the api");
    assert_eq!(
        first.embed(&q),
        second.embed(&q),
        "query embedding must be reproducible"
    );
}

#[test]
fn refit_replaces_previous_model() {
    let mut vectorizer = TfIdfVectorizer::new();
    vectorizer
        .fit(&normalized_docs(&["one two"]))
        .expect("first fit should succeed");
    vectorizer
        .fit(&normalized_docs(&["three four five"]))
        .expect("second fit should succeed");

    let model = vectorizer.fitted().expect("model should be fitted");
    assert_eq!(model.document_count(), 1);
    assert_eq!(model.vocabulary_size(), 3);
}

#[test]
fn into_fitted_yields_model() {
    let vectorizer = fit_docs(&["only document"]);
    let model = vectorizer
        .into_fitted()
        .expect("into_fitted should succeed after fit");
    assert_eq!(model.document_count(), 1);
}
