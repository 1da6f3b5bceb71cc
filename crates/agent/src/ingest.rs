use anyhow::Context;
use embeddings::{EmbeddingProvider, TextChunker};
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;
use vector_store::{AnyVectorStore, NewPassage};

use crate::errors::AgentError;

const DOCUMENT_EXTENSIONS: [&str; 2] = ["txt", "md"];

fn is_document(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
}

/// Ingests every `.txt` and `.md` file directly under `dir`, in file name order.
/// Returns the total number of chunks stored.
pub async fn ingest_directory(
    dir: &Path,
    chunker: &TextChunker,
    embeddings: &dyn EmbeddingProvider,
    store: &AnyVectorStore,
) -> Result<usize, AgentError> {
    if !dir.exists() {
        warn!("Documents directory does not exist: {}", dir.display());
        return Ok(0);
    }

    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read documents directory {}", dir.display()))
        .map_err(AgentError::Ingest)?;

    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("Failed to read directory entry")
        .map_err(AgentError::Ingest)?
    {
        let path = entry.path();
        if is_document(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut total = 0;
    for path in paths {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AgentError::Ingest(anyhow::anyhow!("Invalid filename: {:?}", path)))?
            .to_string();

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", path))
            .map_err(AgentError::Ingest)?;

        info!("Loading document: {}", file_name);
        total += ingest_text(&file_name, &content, chunker, embeddings, store).await?;
    }

    info!("Loaded {} chunks from {}", total, dir.display());
    Ok(total)
}

/// Splits `content` into overlapping word windows, embeds them in one batch and replaces
/// whatever was stored for `file_name` before, so loading the same file again is a no-op.
pub async fn ingest_text(
    file_name: &str,
    content: &str,
    chunker: &TextChunker,
    embeddings: &dyn EmbeddingProvider,
    store: &AnyVectorStore,
) -> Result<usize, AgentError> {
    let chunks = chunker.chunk_text(content);
    if chunks.is_empty() {
        warn!("Document is empty: {}", file_name);
        replace(store, file_name, Vec::new()).await?;
        return Ok(0);
    }

    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
    let vectors = embeddings
        .embed(texts)
        .await
        .with_context(|| format!("Failed to embed {}", file_name))
        .map_err(AgentError::Embedding)?;

    if vectors.len() != chunks.len() {
        return Err(AgentError::Embedding(anyhow::anyhow!(
            "Expected {} embeddings for {}, got {}",
            chunks.len(),
            file_name,
            vectors.len()
        )));
    }

    let passages: Vec<NewPassage> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, embedding)| NewPassage::new(file_name, chunk.index, chunk.content, embedding))
        .collect();
    let count = replace(store, file_name, passages).await?;

    info!("Stored {} chunks for {}", count, file_name);
    Ok(count)
}

async fn replace(
    store: &AnyVectorStore,
    file_name: &str,
    passages: Vec<NewPassage>,
) -> Result<usize, AgentError> {
    let stored = store
        .replace_source(file_name, passages)
        .await
        .with_context(|| format!("Failed to store passages of {}", file_name))
        .map_err(AgentError::VectorStore)?;
    Ok(stored.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embeddings::{ChunkConfig, FallbackEmbeddingProvider};
    use vector_store::InMemoryVectorStore;

    fn chunker() -> TextChunker {
        TextChunker::new(ChunkConfig {
            chunk_size: 4,
            overlap_size: 1,
        })
    }

    fn store() -> AnyVectorStore {
        AnyVectorStore::InMemory(InMemoryVectorStore::new())
    }

    #[tokio::test]
    async fn should_store_one_document_per_chunk() {
        let store = store();
        let embeddings = FallbackEmbeddingProvider::new(16);

        let stored = ingest_text(
            "notes.txt",
            "one two three four five six seven",
            &chunker(),
            &embeddings,
            &store,
        )
        .await
        .unwrap();

        assert_eq!(stored, 2);
        assert_eq!(store.passage_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn should_skip_empty_documents() {
        let store = store();
        let embeddings = FallbackEmbeddingProvider::new(16);

        let stored = ingest_text("empty.md", "  \n ", &chunker(), &embeddings, &store)
            .await
            .unwrap();

        assert_eq!(stored, 0);
        assert_eq!(store.passage_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_load_text_and_markdown_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha beta gamma").unwrap();
        std::fs::write(dir.path().join("b.md"), "delta epsilon").unwrap();
        std::fs::write(dir.path().join("c.csv"), "ignored,file").unwrap();
        let store = store();
        let embeddings = FallbackEmbeddingProvider::new(16);

        let stored = ingest_directory(dir.path(), &chunker(), &embeddings, &store)
            .await
            .unwrap();

        assert_eq!(stored, 2);
        assert_eq!(store.passage_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn should_not_duplicate_passages_when_loaded_twice() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("handbook.txt"),
            "Employees receive 25 vacation days per year.",
        )
        .unwrap();
        let store = store();
        let embeddings = FallbackEmbeddingProvider::new(16);

        ingest_directory(dir.path(), &chunker(), &embeddings, &store)
            .await
            .unwrap();
        let count_after_first = store.passage_count().await.unwrap();
        ingest_directory(dir.path(), &chunker(), &embeddings, &store)
            .await
            .unwrap();

        assert_eq!(store.passage_count().await.unwrap(), count_after_first);
        let query = embeddings
            .embed(vec!["vacation days".to_string()])
            .await
            .unwrap()
            .remove(0);
        let texts: Vec<String> = store
            .search_similar(query, 5)
            .await
            .unwrap()
            .into_iter()
            .map(|scored| scored.passage.text)
            .collect();
        let mut distinct = texts.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(texts.len() as i64, count_after_first);
        assert_eq!(distinct.len(), texts.len());
    }

    #[tokio::test]
    async fn should_drop_stale_passages_when_document_shrinks() {
        let store = store();
        let embeddings = FallbackEmbeddingProvider::new(16);
        ingest_text(
            "notes.txt",
            "one two three four five six seven",
            &chunker(),
            &embeddings,
            &store,
        )
        .await
        .unwrap();

        let stored = ingest_text("notes.txt", "one two", &chunker(), &embeddings, &store)
            .await
            .unwrap();

        assert_eq!(stored, 1);
        assert_eq!(store.passage_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_warn_and_continue_when_directory_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nowhere");
        let embeddings = FallbackEmbeddingProvider::new(16);

        let stored = ingest_directory(&missing, &chunker(), &embeddings, &store())
            .await
            .unwrap();

        assert_eq!(stored, 0);
    }
}
