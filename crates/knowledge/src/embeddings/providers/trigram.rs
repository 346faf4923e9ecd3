//! Offline hashing embedder built from character trigrams and whole words.

use crate::embeddings::provider::EmbeddingProvider;
use pdfqa_core::AppResult;
use std::collections::{HashMap, HashSet};

/// Dimensions matching all-MiniLM-L6-v2, so indices stay interchangeable in size.
pub const DEFAULT_DIMENSIONS: usize = 384;

const MODEL_NAME: &str = "trigram-v1";

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "who", "how", "does", "did",
];

/// Deterministic, content-aware embedder for offline use and tests.
///
/// Each distinct word adds weight to the buckets its trigrams hash to and to
/// one bucket for the whole word. Texts sharing vocabulary end up close in
/// cosine space; no semantics beyond that.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
    stop_words: HashSet<&'static str>,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut frequencies: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !self.stop_words.contains(w))
        {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        let mut embedding = vec![0.0f32; self.dimensions];
        for (word, freq) in &frequencies {
            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let bucket = hash_chars(trigram, 37) % self.dimensions;
                embedding[bucket] += (*freq as f32).sqrt();
            }

            let bucket = hash_chars(&chars, 31) % self.dimensions;
            embedding[bucket] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

impl Default for TrigramProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

fn hash_chars(chars: &[char], multiplier: u64) -> usize {
    chars.iter().fold(0u64, |acc, c| {
        acc.wrapping_mul(multiplier).wrapping_add(*c as u64)
    }) as usize
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_unit_length() {
        let provider = TrigramProvider::default();
        let embedding = provider.embed("The harbor of Atlantis").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = TrigramProvider::default();
        let a = provider.embed("deterministic test").await.unwrap();
        let b = provider.embed("deterministic test").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = TrigramProvider::default();
        let query = provider.embed("What is the secret password?").await.unwrap();
        let related = provider
            .embed("The secret password for the vault is swordfish.")
            .await
            .unwrap();
        let unrelated = provider
            .embed("Harvest yields improved after the irrigation canals opened.")
            .await
            .unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_punctuation_does_not_split_vocabulary() {
        let provider = TrigramProvider::default();
        let plain = provider.embed("atlantis").await.unwrap();
        let punctuated = provider.embed("Atlantis?!").await.unwrap();
        assert_eq!(plain, punctuated);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = TrigramProvider::default();
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_text() {
        let provider = TrigramProvider::new(64);
        let embeddings = provider
            .embed_batch(&["Atlântida é lendária 🌊".to_string(), "ilha".to_string()])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 64);
    }
}
