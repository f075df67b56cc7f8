
use super::vectorizer::SparseVector;

/// Dot product of two sorted sparse vectors. Both sides are L2-normalized
/// by the vectorizer, so this is their cosine similarity.
#[inline]
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let mut score = 0.0;
    let mut lhs = a.iter().peekable();
    let mut rhs = b.iter().peekable();

    while let (Some(&&(da, wa)), Some(&&(db, wb))) = (lhs.peek(), rhs.peek()) {
        match da.cmp(&db) {
            std::cmp::Ordering::Less => {
                lhs.next();
            }
            std::cmp::Ordering::Greater => {
                rhs.next();
            }
            std::cmp::Ordering::Equal => {
                score += wa * wb;
                lhs.next();
                rhs.next();
            }
        }
    }

    score
}

/// Score the query against every document vector, in document order.
#[inline]
pub fn score_all(query: &SparseVector, doc_vectors: &[SparseVector]) -> Vec<f64> {
    doc_vectors
        .iter()
        .map(|doc| cosine_similarity(query, doc))
        .collect()
}

/// Index and score of the best-scoring document. Ties resolve to the
/// lowest document index so results are deterministic. `None` only for an
/// empty document list, which a fitted index never produces.
#[inline]
pub fn best_match(query: &SparseVector, doc_vectors: &[SparseVector]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (index, doc) in doc_vectors.iter().enumerate() {
        let score = cosine_similarity(query, doc);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }

    best
}

/// Truncate raw document text to at most `max_chars` characters, respecting
/// char boundaries.
#[inline]
#[expect(clippy::string_slice, reason = "char_indices yields char boundaries")]
pub fn truncate_excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
