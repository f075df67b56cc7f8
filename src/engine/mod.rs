pub mod normalize;
pub mod retriever;
pub mod vectorizer;

#[cfg(test)]
mod tests;

use thiserror::Error;
use tracing::{debug, info};

pub use self::normalize::normalize;
use self::retriever::{best_match, truncate_excerpt};
use self::vectorizer::{FittedModel, TfIdfVectorizer};

/// Reply rendered by both front ends when no document clears the threshold.
pub const NO_MATCH_REPLY: &str = "Sorry, I couldn't find relevant info in the docs.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// No usable documents remained after ingestion and normalization.
    #[error("corpus contains no usable documents")]
    EmptyCorpus,

    /// A query operation ran before the index was fitted.
    #[error("retrieval index has not been built yet")]
    IndexNotBuilt,
}

/// Outcome of answering a query. `NoMatch` is an ordinary result, not an
/// error: it means no document scored at or above the relevance threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Excerpt(String),
    NoMatch,
}

impl Answer {
    /// Render as the user-facing reply string.
    #[inline]
    pub fn into_reply(self) -> String {
        match self {
            Self::Excerpt(text) => text,
            Self::NoMatch => NO_MATCH_REPLY.to_string(),
        }
    }
}

/// The retrieval core: the ingested documents, the fitted TF-IDF model,
/// and the relevance threshold.
///
/// Built once via [`RetrievalEngine::build`] and immutable afterwards, so
/// concurrent `answer` calls need no synchronization; front ends share it
/// behind an `Arc`. Re-indexing means building a new engine and swapping
/// the shared reference, never mutating in place.
#[derive(Debug)]
pub struct RetrievalEngine {
    /// Raw document texts, index-aligned with the model's document vectors.
    documents: Vec<String>,
    model: FittedModel,
    score_threshold: f64,
}

impl RetrievalEngine {
    /// Normalize the corpus, drop documents that normalize to nothing, and
    /// fit the TF-IDF index over what remains.
    #[inline]
    pub fn build(raw_documents: Vec<String>, score_threshold: f64) -> Result<Self, EngineError> {
        let mut documents = Vec::with_capacity(raw_documents.len());
        let mut normalized = Vec::with_capacity(raw_documents.len());

        for raw in raw_documents {
            let norm = normalize(&raw);
            if norm.is_empty() {
                debug!("Dropping document that normalized to empty text");
            } else {
                documents.push(raw);
                normalized.push(norm);
            }
        }

        if documents.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&normalized)?;
        let model = vectorizer.into_fitted()?;

        info!(
            "Retrieval engine ready: {} documents, {} terms, threshold {}",
            model.document_count(),
            model.vocabulary_size(),
            score_threshold
        );

        Ok(Self {
            documents,
            model,
            score_threshold,
        })
    }

    /// Answer a free-text query with the best-matching document's raw text
    /// truncated to `excerpt_chars`, or [`Answer::NoMatch`] when the best
    /// cosine score falls below the threshold.
    #[inline]
    pub fn answer(&self, query: &str, excerpt_chars: usize) -> Answer {
        let query_vector = self.model.embed(&normalize(query));

        let Some((index, score)) = best_match(&query_vector, self.model.doc_vectors()) else {
            return Answer::NoMatch;
        };

        debug!("Best match for query: document {} (score {:.4})", index, score);

        if score < self.score_threshold {
            return Answer::NoMatch;
        }

        Answer::Excerpt(truncate_excerpt(&self.documents[index], excerpt_chars).to_string())
    }

    #[inline]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn score_threshold(&self) -> f64 {
        self.score_threshold
    }
}
