use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Characters that close a paragraph when they end a line
const PARAGRAPH_TERMINATORS: [char; 5] = ['.', '!', '?', ':', ';'];

/// Rebuild paragraphs from badly wrapped text (PDF page text, hard-wrapped TXT).
///
/// Blank lines are dropped and whitespace runs collapse to one space. A line
/// ending in terminal punctuation closes its paragraph, a trailing hyphen is
/// treated as a split word and glued to the next line, anything else is
/// joined with a single space. Paragraphs are separated by one newline.
///
/// This is a heuristic: a line that happens to end with a colon will always
/// close its paragraph, and real paragraph breaks after an unpunctuated line
/// are merged.
pub fn reconstruct<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paragraphs: Vec<String> = Vec::new();
    let mut buffer = String::new();

    for raw in lines {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let line = WHITESPACE.replace_all(trimmed, " ");

        if buffer.is_empty() {
            buffer.push_str(&line);
            continue;
        }

        if buffer.ends_with(&PARAGRAPH_TERMINATORS[..]) {
            paragraphs.push(std::mem::take(&mut buffer));
            buffer.push_str(&line);
        } else if buffer.ends_with('-') {
            buffer.pop();
            buffer.push_str(&line);
        } else {
            buffer.push(' ');
            buffer.push_str(&line);
        }
    }

    if !buffer.is_empty() {
        paragraphs.push(buffer);
    }

    paragraphs.join("\n")
}

/// Reconstruct a raw extracted document, normalizing carriage returns first
pub fn reconstruct_text(raw: &str) -> String {
    let normalized = raw.replace('\r', "");
    reconstruct(normalized.split('\n'))
}

/// Count whitespace-delimited words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
