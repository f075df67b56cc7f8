#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::EngineError;
use super::normalize::tokenize;

/// Sparse vector over vocabulary dimensions, sorted by dimension index.
pub type SparseVector = Vec<(usize, f64)>;

/// TF-IDF vector index over an ordered corpus of normalized documents.
///
/// Two-phase: construct, then [`fit`](TfIdfVectorizer::fit) on the corpus.
/// Transforming a query before a successful fit is a sequencing error and
/// reports [`EngineError::IndexNotBuilt`].
#[derive(Debug, Default)]
pub struct TfIdfVectorizer {
    model: Option<FittedModel>,
}

/// The immutable result of fitting: vocabulary, IDF weights, and one
/// L2-normalized document vector per corpus document.
#[derive(Debug, Clone)]
pub struct FittedModel {
    /// token -> dimension index, assigned in first-seen corpus order
    vocabulary: HashMap<String, usize>,
    /// smoothed inverse document frequency per dimension
    idf: Vec<f64>,
    doc_vectors: Vec<SparseVector>,
}

impl TfIdfVectorizer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the vocabulary and document vectors from normalized documents.
    ///
    /// Term weight is raw in-document count times the smoothed IDF
    /// `ln((1 + n) / (1 + df)) + 1`; each document vector is then
    /// L2-normalized so cosine similarity reduces to a dot product.
    /// Refitting replaces the previous model wholesale.
    #[inline]
    pub fn fit(&mut self, documents: &[String]) -> Result<(), EngineError> {
        let tokenized: Vec<Vec<&str>> = documents
            .iter()
            .map(|doc| tokenize(doc).collect())
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();

        for tokens in &tokenized {
            let mut seen_dims: HashSet<usize> = HashSet::new();
            for &token in tokens {
                let next_dim = vocabulary.len();
                let dim = *vocabulary.entry(token.to_string()).or_insert(next_dim);
                if dim == doc_freq.len() {
                    doc_freq.push(0);
                }
                if seen_dims.insert(dim) {
                    doc_freq[dim] += 1;
                }
            }
        }

        if vocabulary.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let doc_vectors: Vec<SparseVector> = tokenized
            .iter()
            .map(|tokens| weigh_and_normalize(tokens, &vocabulary, &idf))
            .collect();

        debug!(
            "Fitted TF-IDF index: {} documents, {} terms",
            doc_vectors.len(),
            vocabulary.len()
        );

        self.model = Some(FittedModel {
            vocabulary,
            idf,
            doc_vectors,
        });
        Ok(())
    }

    /// Project a normalized query into the fitted vector space. Tokens
    /// unseen during fit contribute nothing.
    #[inline]
    pub fn transform(&self, normalized_query: &str) -> Result<SparseVector, EngineError> {
        Ok(self.fitted()?.embed(normalized_query))
    }

    #[inline]
    pub fn fitted(&self) -> Result<&FittedModel, EngineError> {
        self.model.as_ref().ok_or(EngineError::IndexNotBuilt)
    }

    /// Consume the vectorizer, yielding the immutable fitted model.
    #[inline]
    pub fn into_fitted(self) -> Result<FittedModel, EngineError> {
        self.model.ok_or(EngineError::IndexNotBuilt)
    }
}

impl FittedModel {
    /// Embed any normalized text with the fixed vocabulary and IDF weights.
    #[inline]
    pub fn embed(&self, normalized_text: &str) -> SparseVector {
        let tokens: Vec<&str> = tokenize(normalized_text).collect();
        weigh_and_normalize(&tokens, &self.vocabulary, &self.idf)
    }

    #[inline]
    pub fn doc_vectors(&self) -> &[SparseVector] {
        &self.doc_vectors
    }

    #[inline]
    pub fn document_count(&self) -> usize {
        self.doc_vectors.len()
    }

    #[inline]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Count tokens, weigh by IDF, and L2-normalize into a sorted sparse vector.
/// Tokens outside the vocabulary are dropped. An all-unknown (or empty)
/// token stream yields the zero vector, represented as an empty sparse vec.
fn weigh_and_normalize(
    tokens: &[&str],
    vocabulary: &HashMap<String, usize>,
    idf: &[f64],
) -> SparseVector {
    let mut counts: HashMap<usize, f64> = HashMap::new();
    for &token in tokens {
        if let Some(&dim) = vocabulary.get(token) {
            *counts.entry(dim).or_insert(0.0) += 1.0;
        }
    }

    let mut vector: SparseVector = counts
        .into_iter()
        .map(|(dim, count)| (dim, count * idf[dim]))
        .collect();
    vector.sort_by_key(|&(dim, _)| dim);

    let norm = vector.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut vector {
            *w /= norm;
        }
    }

    vector
}
