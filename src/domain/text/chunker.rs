use once_cell::sync::Lazy;
use regex::Regex;

/// How far back (in bytes) a hard split looks for a space before cutting a word
pub const SPACE_SEARCH_WINDOW: usize = 100;

static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("valid sentence boundary pattern"));

/// Ordered fragment of a text sized for a single provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    /// Size in UTF-8 bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Split paragraph-structured text into chunks of at most `limit` bytes.
///
/// Paragraphs (lines) are packed together while they fit. A paragraph that
/// is too large on its own is packed sentence by sentence, and a sentence
/// that is still too large is cut near the limit, preferring the last space
/// within [`SPACE_SEARCH_WINDOW`] bytes. Empty paragraphs are skipped.
///
/// The only chunks longer than `limit` are single characters wider than the
/// limit itself.
pub fn split(text: &str, limit: usize) -> Vec<Chunk> {
    let mut packer = Packer::new(limit.max(1));

    for paragraph in text.lines() {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        packer.push(paragraph, Level::Paragraph);
    }

    packer
        .finish()
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, text })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Paragraph,
    Sentence,
}

impl Level {
    fn separator(self) -> &'static str {
        match self {
            Level::Paragraph => "\n",
            Level::Sentence => " ",
        }
    }
}

struct Packer {
    limit: usize,
    current: String,
    chunks: Vec<String>,
}

impl Packer {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            current: String::new(),
            chunks: Vec::new(),
        }
    }

    fn push(&mut self, piece: &str, level: Level) {
        let separator = level.separator();

        if self.current.is_empty() {
            if piece.len() <= self.limit {
                self.current.push_str(piece);
                return;
            }
        } else if self.current.len() + separator.len() + piece.len() <= self.limit {
            self.current.push_str(separator);
            self.current.push_str(piece);
            return;
        }

        self.flush();

        if piece.len() <= self.limit {
            self.current.push_str(piece);
            return;
        }

        match level {
            Level::Paragraph => {
                for sentence in sentences(piece) {
                    self.push(sentence, Level::Sentence);
                }
            }
            Level::Sentence => self.hard_split(piece),
        }
    }

    fn hard_split(&mut self, piece: &str) {
        let mut rest = piece;

        while rest.len() > self.limit {
            let (head_end, tail_start) = split_point(rest, self.limit);
            self.chunks.push(rest[..head_end].trim_end().to_string());
            rest = rest[tail_start..].trim_start();
        }

        // The remainder fits, so following sentences may still join it
        if !rest.is_empty() {
            self.current.push_str(rest);
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Sentences of a paragraph, each keeping its terminal punctuation
fn sentences(paragraph: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut last_end = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(paragraph) {
        let sentence = paragraph[last_end..boundary.end()].trim();
        if !sentence.is_empty() {
            result.push(sentence);
        }
        last_end = boundary.end();
    }

    let remaining = paragraph[last_end..].trim();
    if !remaining.is_empty() {
        result.push(remaining);
    }

    result
}

/// Where to cut `text` (longer than `limit`): returns the end of the head and
/// the start of the tail. Prefers a space at or before the limit, within the
/// search window; otherwise cuts at the last char boundary under the limit.
fn split_point(text: &str, limit: usize) -> (usize, usize) {
    let cut = floor_char_boundary(text, limit);

    if text.as_bytes().get(cut) == Some(&b' ') && cut > 0 {
        return (cut, cut + 1);
    }

    let window_start = floor_char_boundary(text, cut.saturating_sub(SPACE_SEARCH_WINDOW));
    if let Some(offset) = text[window_start..cut].rfind(' ') {
        let space = window_start + offset;
        if space > 0 {
            return (space, space + 1);
        }
    }

    if cut == 0 {
        // Limit narrower than the first character: emit that character alone
        let width = text.chars().next().map(char::len_utf8).unwrap_or(text.len());
        return (width, width);
    }

    (cut, cut)
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut boundary = index;
    while !text.is_char_boundary(boundary) {
        boundary -= 1;
    }
    boundary
}
