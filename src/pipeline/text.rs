//! Dictionary-based text featurization
//!
//! Text is lowercased and split on non-alphanumeric characters. Each row is
//! described by word unigram/bigram counts and character trigram counts,
//! L2-normalized per row. The vocabulary comes from the training rows only.

use std::collections::{BTreeSet, HashMap};

use ndarray::ArrayView1;
use polars::prelude::*;

use super::error::{AnalysisError, Result};
use super::matrix::FeatureMatrix;

/// Kind of text term
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TermKind {
    Word,
    Char,
}

impl TermKind {
    fn prefix(&self) -> &'static str {
        match self {
            TermKind::Word => "word",
            TermKind::Char => "char",
        }
    }
}

/// Join the given text columns into one string per row, separated by a space
pub fn concatenate_text(df: &DataFrame, columns: &[String]) -> Result<Vec<String>> {
    let mut merged = vec![String::new(); df.height()];

    for name in columns {
        let column = df
            .column(name)
            .map_err(|_| AnalysisError::ColumnNotFound(name.clone()))?;
        for (row, value) in column.str()?.into_iter().enumerate() {
            let value = value.unwrap_or_default();
            if value.is_empty() {
                continue;
            }
            if !merged[row].is_empty() {
                merged[row].push(' ');
            }
            merged[row].push_str(value);
        }
    }

    Ok(merged)
}

/// Lowercase tokens split on any non-alphanumeric character
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Word unigrams and bigrams, then character trigrams of each token
fn extract_terms(text: &str) -> Vec<(TermKind, String)> {
    let tokens = tokenize(text);
    let mut terms = Vec::new();

    for token in &tokens {
        terms.push((TermKind::Word, token.clone()));
    }
    for pair in tokens.windows(2) {
        terms.push((TermKind::Word, format!("{} {}", pair[0], pair[1])));
    }
    for token in &tokens {
        let marked: Vec<char> = format!("<{}>", token).chars().collect();
        for gram in marked.windows(3) {
            terms.push((TermKind::Char, gram.iter().collect()));
        }
    }

    terms
}

/// Text featurizer fitted on a training corpus
#[derive(Debug, Clone)]
pub struct TextFeaturizer {
    /// Ordered vocabulary: words first, then character grams, each sorted
    terms: Vec<(TermKind, String)>,
    index: HashMap<(TermKind, String), usize>,
}

impl TextFeaturizer {
    /// Build the vocabulary from training documents
    pub fn fit(documents: &[String]) -> Self {
        let vocabulary: BTreeSet<(TermKind, String)> = documents
            .iter()
            .flat_map(|doc| extract_terms(doc))
            .collect();

        let terms: Vec<(TermKind, String)> = vocabulary.into_iter().collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        Self { terms, index }
    }

    /// Number of output slots
    pub fn width(&self) -> usize {
        self.terms.len()
    }

    /// Slot names, e.g. `Text.word:overtime` or `Text.char:<ov`
    pub fn feature_names(&self, prefix: &str) -> Vec<String> {
        self.terms
            .iter()
            .map(|(kind, term)| format!("{}.{}:{}", prefix, kind.prefix(), term))
            .collect()
    }

    /// L2-normalized term counts of one document. Unknown terms are ignored.
    pub fn transform_one(&self, document: &str) -> Vec<f64> {
        let mut counts = vec![0.0; self.terms.len()];
        for term in extract_terms(document) {
            if let Some(&slot) = self.index.get(&term) {
                counts[slot] += 1.0;
            }
        }

        let norm = counts.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm > 0.0 {
            for c in counts.iter_mut() {
                *c /= norm;
            }
        }
        counts
    }

    /// Featurize a batch of documents, one row each
    pub fn transform(&self, documents: &[String]) -> FeatureMatrix {
        let mut matrix = FeatureMatrix::zeros((documents.len(), self.width()));
        for (mut row, document) in matrix.rows_mut().into_iter().zip(documents) {
            row.assign(&ArrayView1::from(&self.transform_one(document)));
        }
        matrix
    }
}
