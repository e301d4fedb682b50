use anyhow::{Result, bail};

/// Cosine similarity of two embeddings. A zero vector scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        bail!("Embedding dimensions differ: {} vs {}", a.len(), b.len());
    }

    let dot_product: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

/// Similarities for every unordered pair `(i, j)` with `i < j`, in
/// lexicographic pair order.
pub fn pairwise_similarities(embeddings: &[Vec<f32>]) -> Result<Vec<f64>> {
    let n = embeddings.len();
    let mut similarities = Vec::with_capacity(n * n.saturating_sub(1) / 2);

    for i in 0..n {
        for j in (i + 1)..n {
            similarities.push(cosine_similarity(&embeddings[i], &embeddings[j])?);
        }
    }

    Ok(similarities)
}
