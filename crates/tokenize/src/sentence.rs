/// Characters that always end a sentence.
const SENTENCE_END: &str = "。！？!?；;…";

/// Coarse sentence split.
///
/// Splits after `。！？!?；;…` and at newlines, and after `.` when it is
/// followed by whitespace or the end of the text (so decimals such as `3.14`
/// stay intact). Segments that are empty after trimming are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let end = idx + ch.len_utf8();
        let boundary = if ch == '\n' || SENTENCE_END.contains(ch) {
            true
        } else if ch == '.' {
            chars.peek().is_none_or(|&(_, next)| next.is_whitespace())
        } else {
            false
        };
        if boundary {
            push_segment(&mut out, &text[start..end]);
            start = end;
        }
    }
    push_segment(&mut out, &text[start..]);
    out
}

fn push_segment<'a>(out: &mut Vec<&'a str>, segment: &'a str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        out.push(trimmed);
    }
}
