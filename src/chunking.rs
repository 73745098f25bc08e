//! Passage extraction from paginated source text.
//!
//! The source document is treated as a sequence of pages separated by
//! form-feed characters (`\u{0C}`); a document without form feeds is a
//! single page. Each page is split into passages hierarchically:
//! paragraphs first, then sentences, then words, bounded by a maximum
//! passage size with configurable overlap at the lowest level.

use crate::document::Passage;

/// Splits paginated source text into [`Passage`]s.
///
/// Passage IDs are generated as `{document_id}_p{page}_{index}` where
/// `page` is 1-based and `index` counts passages within the page.
#[derive(Debug, Clone)]
pub struct PassageExtractor {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Separators tried in order when a segment exceeds the passage size.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

impl PassageExtractor {
    /// Create a new extractor.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per passage
    /// * `chunk_overlap` — overlap between consecutive character-split passages
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Extract passages from the full source text.
    ///
    /// Pages consisting only of whitespace are skipped. Returns an empty
    /// `Vec` for empty input.
    pub fn extract(&self, document_id: &str, text: &str) -> Vec<Passage> {
        let mut passages = Vec::new();

        for (page_idx, page) in text.split('\u{0C}').enumerate() {
            let page_text = page.trim();
            if page_text.is_empty() {
                continue;
            }

            let pieces =
                split_and_merge(page_text, self.chunk_size, self.chunk_overlap, &SEPARATORS);

            for (i, piece) in pieces.into_iter().enumerate() {
                let text = piece.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                passages.push(Passage {
                    id: format!("{document_id}_p{}_{i}", page_idx + 1),
                    text,
                    document_id: document_id.to_string(),
                    page: page_idx + 1,
                });
            }
        }

        passages
    }
}

/// Split `text` by the first separator, merging segments back together as
/// long as they fit within `chunk_size`. Oversized segments recurse into
/// the next separator level; character-window splitting is the last resort.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }
    let Some((separator, rest)) = separators.split_first() else {
        return split_by_chars(text, chunk_size, chunk_overlap);
    };

    let mut pieces = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, pieces: &mut Vec<String>| {
        if current.is_empty() {
            return;
        }
        let full = std::mem::take(current);
        if full.len() > chunk_size {
            pieces.extend(split_and_merge(&full, chunk_size, chunk_overlap, rest));
        } else {
            pieces.push(full);
        }
    };

    for segment in split_keeping_separator(text, separator) {
        if current.is_empty() || current.len() + segment.len() <= chunk_size {
            current.push_str(segment);
        } else {
            flush(&mut current, &mut pieces);
            current.push_str(segment);
        }
    }
    flush(&mut current, &mut pieces);

    pieces
}

/// Split text at a separator, keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        segments.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
}

/// Character-window splitting with overlap, respecting UTF-8 boundaries.
fn split_by_chars(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_passages() {
        let extractor = PassageExtractor::new(128, 16);
        assert!(extractor.extract("doc", "").is_empty());
        assert!(extractor.extract("doc", "   \n \u{0C}  ").is_empty());
    }

    #[test]
    fn pages_split_on_form_feed() {
        let extractor = PassageExtractor::new(128, 16);
        let passages = extractor.extract("paper", "first page text\u{0C}second page text");
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].page, 1);
        assert_eq!(passages[1].page, 2);
        assert_eq!(passages[0].id, "paper_p1_0");
        assert_eq!(passages[1].id, "paper_p2_0");
    }

    #[test]
    fn whitespace_pages_are_skipped() {
        let extractor = PassageExtractor::new(128, 16);
        let passages = extractor.extract("paper", "content\u{0C}   \u{0C}more content");
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[1].page, 3);
    }

    #[test]
    fn long_page_splits_on_paragraphs() {
        let extractor = PassageExtractor::new(40, 8);
        let text = "A first paragraph of modest size.\n\nA second paragraph of modest size.";
        let passages = extractor.extract("doc", text);
        assert!(passages.len() >= 2);
        for passage in &passages {
            assert!(passage.text.len() <= 40, "passage too long: {}", passage.text.len());
        }
    }

    #[test]
    fn oversized_unbroken_text_falls_back_to_char_windows() {
        let extractor = PassageExtractor::new(10, 2);
        let passages = extractor.extract("doc", &"x".repeat(25));
        assert!(!passages.is_empty());
        for passage in &passages {
            assert!(passage.text.len() <= 10);
        }
    }

    #[test]
    fn char_windows_respect_utf8_boundaries() {
        // Multi-byte characters must not be split mid-codepoint.
        let pieces = split_by_chars(&"é".repeat(30), 8, 2);
        for piece in pieces {
            assert!(piece.chars().count() <= 8);
        }
    }

    #[test]
    fn short_page_is_a_single_passage() {
        let extractor = PassageExtractor::new(512, 100);
        let passages = extractor.extract("doc", "short text");
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, "short text");
    }
}
