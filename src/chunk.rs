//! Sliding-window text chunker.
//!
//! Splits extracted document text into fixed-width overlapping windows that
//! serve as the atomic unit of embedding and retrieval. The chunker is
//! tokenizer-agnostic: windows are measured in characters, boundaries are
//! always valid UTF-8, and the same input always produces the same chunks.

/// Split `text` into windows of `chunk_size` characters, each window starting
/// `chunk_size - overlap` characters after the previous one.
///
/// - Text no longer than `chunk_size` yields exactly one chunk equal to the
///   input (the empty string yields `[""]`).
/// - An `overlap >= chunk_size` is clamped to a full-window stride so windows
///   always advance and never reverse.
/// - Every character of the input is covered by at least one chunk.
///
/// `chunk_size` must be non-zero; configuration validation guarantees this
/// for all callers, and debug builds assert it.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(chunk_size > 0, "chunk_size must be greater than zero");

    // Byte offset of every character boundary, plus the end of the text.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    if char_count <= chunk_size {
        return vec![text.to_string()];
    }

    // The floor keeps the loop finite even for a zero window in release builds.
    let stride = if overlap >= chunk_size {
        chunk_size
    } else {
        chunk_size - overlap
    }
    .max(1);

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        start += stride;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(chunk_text("hello", 1000, 200), vec!["hello"]);
    }

    #[test]
    fn empty_text_yields_one_empty_chunk() {
        assert_eq!(chunk_text("", 1000, 200), vec![""]);
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let text = "a".repeat(2500);
        let chunks = chunk_text(&text, 1000, 200);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[1].len(), 1000);
        assert_eq!(chunks[2].len(), 900);
        assert_eq!(chunks[3].len(), 100);
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text: String = ('a'..='z').cycle().take(30).collect();
        let chunks = chunk_text(&text, 10, 4);
        // Stride of 6: each chunk repeats the last 4 characters of the previous.
        assert_eq!(&chunks[1][..4], &chunks[0][6..]);
    }

    #[test]
    fn every_character_is_covered() {
        let text: String = ('a'..='z').cycle().take(137).collect();
        let chunks = chunk_text(&text, 25, 7);
        let stride = 25 - 7;
        let mut covered_to = 0usize;
        for (index, chunk) in chunks.iter().enumerate() {
            let start = index * stride;
            assert!(start <= covered_to, "gap before chunk {index}");
            covered_to = covered_to.max(start + chunk.chars().count());
        }
        assert_eq!(covered_to, 137);
    }

    #[test]
    fn excessive_overlap_still_advances() {
        let text = "x".repeat(50);
        let chunks = chunk_text(&text, 10, 10);
        assert_eq!(chunks.len(), 5);
        for chunk in &chunks {
            assert_eq!(chunk.len(), 10);
        }
    }

    #[test]
    fn multibyte_characters_never_split() {
        let text = "é".repeat(25);
        let chunks = chunk_text(&text, 10, 3);
        for chunk in &chunks {
            assert!(chunk.chars().all(|c| c == 'é'));
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    #[should_panic(expected = "chunk_size must be greater than zero")]
    fn zero_chunk_size_is_rejected() {
        chunk_text("some text", 0, 0);
    }

    #[test]
    fn chunking_is_deterministic() {
        let text: String = ('a'..='z').cycle().take(500).collect();
        assert_eq!(chunk_text(&text, 64, 16), chunk_text(&text, 64, 16));
    }
}
