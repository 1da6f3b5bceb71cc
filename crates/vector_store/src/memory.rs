use anyhow::Result;
use std::sync::{Mutex, MutexGuard};

use crate::models::{NewPassage, Passage, ScoredPassage};

/// Process-local passage store ranked by cosine similarity. Selected with `memory://`.
#[derive(Default)]
pub struct InMemoryVectorStore {
    passages: Mutex<Vec<Passage>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn passages(&self) -> Result<MutexGuard<'_, Vec<Passage>>> {
        self.passages
            .lock()
            .map_err(|_| anyhow::anyhow!("In-memory vector store lock poisoned"))
    }

    /// Stores a passage, replacing any passage already at the same source and position.
    pub async fn insert_passage(&self, new: NewPassage) -> Result<Passage> {
        let passage = new.stamp();
        let mut passages = self.passages()?;
        match passages
            .iter_mut()
            .find(|p| p.source == passage.source && p.position == passage.position)
        {
            Some(existing) => *existing = passage.clone(),
            None => passages.push(passage.clone()),
        }
        Ok(passage)
    }

    /// Swaps every stored passage of `source` for `passages`.
    pub async fn replace_source(
        &self,
        source: &str,
        passages: Vec<NewPassage>,
    ) -> Result<Vec<Passage>> {
        let stamped: Vec<Passage> = passages.into_iter().map(NewPassage::stamp).collect();
        let mut stored = self.passages()?;
        stored.retain(|p| p.source != source);
        stored.extend(stamped.iter().cloned());
        Ok(stamped)
    }

    /// Best matches first; ties keep insertion order.
    pub async fn search_similar(
        &self,
        query_embedding: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPassage>> {
        let mut scored: Vec<ScoredPassage> = self
            .passages()?
            .iter()
            .map(|passage| ScoredPassage {
                similarity: cosine_similarity(&query_embedding, &passage.embedding),
                passage: passage.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(limit);

        tracing::debug!(hits = scored.len(), "similarity search finished");
        Ok(scored)
    }

    pub async fn passage_count(&self) -> Result<i64> {
        Ok(self.passages()?.len() as i64)
    }
}

/// Zero when either vector has no magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(entries: &[(&str, Vec<f32>)]) -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        for (position, (text, embedding)) in entries.iter().enumerate() {
            store
                .insert_passage(NewPassage::new(
                    "notes.md",
                    position,
                    text.to_string(),
                    embedding.clone(),
                ))
                .await
                .unwrap();
        }
        store
    }

    fn texts(scored: &[ScoredPassage]) -> Vec<&str> {
        scored.iter().map(|s| s.passage.text.as_str()).collect()
    }

    #[test]
    fn should_compute_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn should_return_zero_for_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn should_rank_closest_passages_first() {
        let store = store_with(&[
            ("parking", vec![0.0, 1.0]),
            ("vacation", vec![1.0, 0.1]),
            ("benefits", vec![1.0, 1.0]),
        ])
        .await;

        let scored = store.search_similar(vec![1.0, 0.0], 2).await.unwrap();

        assert_eq!(texts(&scored), vec!["vacation", "benefits"]);
        assert!(scored[0].similarity > scored[1].similarity);
    }

    #[tokio::test]
    async fn should_keep_insertion_order_for_ties() {
        let store = store_with(&[("first", vec![1.0]), ("second", vec![1.0])]).await;

        let scored = store.search_similar(vec![1.0], 5).await.unwrap();

        assert_eq!(texts(&scored), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn should_overwrite_passage_at_same_position() {
        let store = store_with(&[("old wording", vec![1.0])]).await;

        store
            .insert_passage(NewPassage::new("notes.md", 0, "new wording".to_string(), vec![1.0]))
            .await
            .unwrap();

        assert_eq!(store.passage_count().await.unwrap(), 1);
        let scored = store.search_similar(vec![1.0], 5).await.unwrap();
        assert_eq!(texts(&scored), vec!["new wording"]);
    }

    #[tokio::test]
    async fn should_replace_only_the_given_source() {
        let store = store_with(&[("a0", vec![1.0]), ("a1", vec![1.0]), ("a2", vec![1.0])]).await;
        store
            .insert_passage(NewPassage::new("other.md", 0, "b0".to_string(), vec![1.0]))
            .await
            .unwrap();

        let stored = store
            .replace_source(
                "notes.md",
                vec![NewPassage::new("notes.md", 0, "a0'".to_string(), vec![1.0])],
            )
            .await
            .unwrap();

        assert_eq!(stored.len(), 1);
        assert_eq!(store.passage_count().await.unwrap(), 2);
        let scored = store.search_similar(vec![1.0], 5).await.unwrap();
        assert_eq!(texts(&scored), vec!["b0", "a0'"]);
    }

    #[tokio::test]
    async fn should_count_and_search_empty_store() {
        let store = InMemoryVectorStore::new();

        assert!(store.search_similar(vec![1.0], 5).await.unwrap().is_empty());
        assert_eq!(store.passage_count().await.unwrap(), 0);
    }
}
