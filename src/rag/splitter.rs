use std::collections::VecDeque;

use crate::rag::Document;

/// Split points tried in order, coarsest first
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Recursive character splitter.
///
/// Text is cut on the coarsest separator it contains; pieces still longer
/// than `chunk_size` are cut again on the next separator. Adjacent pieces are
/// merged back into chunks of at most `chunk_size` characters, each starting
/// with up to `chunk_overlap` characters from the end of the previous chunk.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, SEPARATORS)
    }

    /// Split each document, tagging chunks with their index
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .enumerate()
                    .map(move |(i, chunk)| {
                        let mut metadata = doc.metadata.clone();
                        metadata.insert("chunk".to_string(), i.to_string());
                        Document {
                            content: chunk,
                            metadata,
                        }
                    })
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|piece| !piece.is_empty())
                .map(String::from)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut short_pieces: Vec<String> = Vec::new();

        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                short_pieces.push(piece);
                continue;
            }
            if !short_pieces.is_empty() {
                chunks.extend(self.merge(&short_pieces, separator));
                short_pieces.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !short_pieces.is_empty() {
            chunks.extend(self.merge(&short_pieces, separator));
        }
        chunks
    }

    /// Greedily join pieces into chunks, carrying an overlap window forward
    fn merge(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { separator_len };

            if total + len + joiner > self.chunk_size && !window.is_empty() {
                push_chunk(&mut chunks, &window, separator);

                while total > self.chunk_overlap
                    || (total > 0 && total + len + joined_len(&window, separator_len) > self.chunk_size)
                {
                    let Some(first) = window.front() else {
                        break;
                    };
                    let removed = char_len(first)
                        + if window.len() > 1 { separator_len } else { 0 };
                    total = total.saturating_sub(removed);
                    window.pop_front();
                }
            }

            if !window.is_empty() {
                total += separator_len;
            }
            window.push_back(piece);
            total += len;
        }

        push_chunk(&mut chunks, &window, separator);
        chunks
    }
}

/// Separator length the next piece would add to a non-empty window
fn joined_len(window: &VecDeque<&str>, separator_len: usize) -> usize {
    if window.is_empty() { 0 } else { separator_len }
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
