use textwrap::{Options, WordSplitter};

/// Splits text into segments of at most `max_len` characters.
///
/// Paragraphs (separated by blank lines) are wrapped independently at word
/// boundaries, lines that still overflow (a single word longer than the
/// limit) are hard-split into fixed-size slices, and the resulting pieces
/// are greedily merged back together: a piece joins the open segment when
/// the combined text still fits, otherwise it opens a new segment. All
/// lengths are counted in characters, not bytes.
pub fn pack(text: &str, max_len: usize) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Vec::new();
    }

    let wrap_options = Options::new(max_len)
        .break_words(false)
        .word_splitter(WordSplitter::NoHyphenation);

    let mut segments: Vec<String> = Vec::new();
    for paragraph in normalized.split("\n\n") {
        // Re-flow the paragraph: interior newlines and whitespace runs
        // collapse to single spaces before wrapping.
        let flowed = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
        if flowed.is_empty() {
            continue;
        }
        for line in textwrap::wrap(&flowed, &wrap_options) {
            for piece in split_overflow(&line, max_len) {
                match segments.last_mut() {
                    Some(open) => {
                        let candidate = format!("{}\n\n{}", open, piece);
                        if candidate.chars().count() <= max_len {
                            *open = candidate;
                        } else {
                            segments.push(piece);
                        }
                    }
                    None => segments.push(piece),
                }
            }
        }
    }

    segments
        .into_iter()
        .map(|segment| truncate_chars(&segment, max_len))
        .collect()
}

/// Hard-splits a line into consecutive `max_len`-character slices. Lines
/// within the limit pass through untouched.
fn split_overflow(line: &str, max_len: usize) -> Vec<String> {
    if line.chars().count() <= max_len {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(max_len)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Final safety clamp: truncates to `max_len` characters.
pub(crate) fn truncate_chars(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        text.chars().take(max_len).collect()
    }
}
