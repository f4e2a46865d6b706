//! Fixed-size character chunking.

use std::num::NonZeroUsize;

/// Split `text` into consecutive slices of `chunk_size` characters (Unicode
/// scalar values); the last slice may be shorter. Empty text yields no chunks.
pub fn split_chars(text: &str, chunk_size: NonZeroUsize) -> Vec<&str> {
    let size = chunk_size.get();
    let mut chunks = Vec::with_capacity(text.len() / size + 1);
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    #[test]
    fn splits_on_characters_not_bytes() {
        assert_eq!(split_chars("héllo wörld", size(4)), vec!["héll", "o wö", "rld"]);
        assert_eq!(split_chars("日本語", size(1)), vec!["日", "本", "語"]);
    }

    #[test]
    fn empty_and_exact_inputs() {
        assert!(split_chars("", size(3)).is_empty());
        assert_eq!(split_chars("abcdef", size(3)), vec!["abc", "def"]);
        assert_eq!(split_chars("ab", size(1000)), vec!["ab"]);
    }

    proptest! {
        #[test]
        fn chunk_count_lengths_and_concatenation(text in "\\PC{0,300}", n in 1usize..64) {
            let chunks = split_chars(&text, size(n));
            let len = text.chars().count();

            prop_assert_eq!(chunks.len(), len.div_ceil(n));
            if let Some((last, init)) = chunks.split_last() {
                for chunk in init {
                    prop_assert_eq!(chunk.chars().count(), n);
                }
                prop_assert!(last.chars().count() >= 1 && last.chars().count() <= n);
            }
            prop_assert_eq!(chunks.concat(), text);
        }
    }
}
