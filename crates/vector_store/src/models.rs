use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored window of text from one of the user's documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    pub id: Uuid,
    /// File the passage was cut from.
    pub source: String,
    /// Index of the passage within its source.
    pub position: usize,
    pub text: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// An embedded passage that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPassage {
    pub source: String,
    pub position: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl NewPassage {
    pub fn new(source: &str, position: usize, text: String, embedding: Vec<f32>) -> Self {
        Self {
            source: source.to_string(),
            position,
            text,
            embedding,
        }
    }

    /// Assigns identity and insertion time.
    pub fn stamp(self) -> Passage {
        Passage {
            id: Uuid::new_v4(),
            source: self.source,
            position: self.position,
            text: self.text,
            embedding: self.embedding,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub passage: Passage,
    /// Cosine similarity to the query, higher is closer.
    pub similarity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stamp_new_passage_with_identity() {
        let before = Utc::now();

        let passage =
            NewPassage::new("handbook.md", 3, "vacation policy".to_string(), vec![0.5]).stamp();

        assert_eq!(passage.source, "handbook.md");
        assert_eq!(passage.position, 3);
        assert_eq!(passage.text, "vacation policy");
        assert!(!passage.id.is_nil());
        assert!(passage.created_at >= before);
    }

    #[test]
    fn should_give_each_passage_its_own_id() {
        let a = NewPassage::new("a.txt", 0, "x".to_string(), vec![]).stamp();
        let b = NewPassage::new("a.txt", 0, "x".to_string(), vec![]).stamp();

        assert_ne!(a.id, b.id);
    }
}
