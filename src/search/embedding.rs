//! Deterministic text embedding via harmonic hashing.
//!
//! Tokens are hashed to an integer and projected onto unit circles over
//! a set of pairwise-coprime moduli; token projections are mean-pooled
//! and L2-normalized. No model file, no network: the same text always
//! produces the same vector, in any process, which is what lets the
//! index builder and the query engine share one fixed oracle.
//!
//! Properties relied on elsewhere:
//! - every non-empty embedding has unit L2 norm (inner product == cosine)
//! - empty text embeds to the zero vector (cosine 0 against anything)

use anyhow::Result;
use std::f64::consts::TAU;

/// Embedding dimension (2 coordinates per modulus).
pub const EMBEDDING_DIM: usize = 256;

const NUM_MODULI: usize = EMBEDDING_DIM / 2;

/// Identifies the embedding scheme and its parameters. Persisted in the
/// index and checked at query time; bump on any change to the math.
pub const MODEL_ID: &str = "harmonic-hash-v1-d256";

#[derive(Debug)]
pub struct EmbeddingModel {
    moduli: Vec<u64>,
}

impl EmbeddingModel {
    pub fn new() -> Self {
        Self {
            moduli: first_primes(NUM_MODULI),
        }
    }

    /// Embed a single text. Empty or punctuation-only input yields the
    /// zero vector.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(vec![0.0; EMBEDDING_DIM]);
        }

        let mut pooled = vec![0.0f64; EMBEDDING_DIM];
        for token in &tokens {
            let hash = fnv1a(token.as_bytes());
            for (slot, &m) in self.moduli.iter().enumerate() {
                let angle = TAU * ((hash % m) as f64) / (m as f64);
                pooled[slot * 2] += angle.sin();
                pooled[slot * 2 + 1] += angle.cos();
            }
        }

        let count = tokens.len() as f64;
        for value in &mut pooled {
            *value /= count;
        }

        let norm: f64 = pooled.iter().map(|x| x * x).sum::<f64>().sqrt();
        let embedding = if norm > 0.0 {
            pooled.iter().map(|x| (*x / norm) as f32).collect()
        } else {
            pooled.iter().map(|x| *x as f32).collect()
        };

        Ok(embedding)
    }

    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

impl Default for EmbeddingModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased word tokens; whitespace and ASCII punctuation separate.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

/// FNV-1a, 64-bit. Stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// First `n` primes, by trial division. n is small (128) so no sieve
/// bound estimation is needed.
fn first_primes(n: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(n);
    let mut candidate: u64 = 2;
    while primes.len() < n {
        if primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0)
        {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Cosine similarity of two vectors. Zero-length or mismatched inputs
/// score 0 rather than panicking; the placeholder (all-zero) embedding
/// therefore matches nothing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}
