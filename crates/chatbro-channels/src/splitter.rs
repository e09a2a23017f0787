//! Reply splitting
//!
//! Telegram rejects messages longer than 4096 characters. Long replies are
//! cut inside a window between a preferred and a hard length, at the best
//! boundary found there: paragraph, then line, then sentence, then word.

/// Hard Telegram message limit, in characters
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Default chunk limit
pub const DEFAULT_LIMIT: usize = 4000;

/// Default length from which a boundary is searched
pub const DEFAULT_PREFERRED: usize = 3800;

const SENTENCE_BOUNDARIES: [char; 5] = ['.', '!', '?', ';', ':'];

/// Splits text into chunks that fit a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSplitter {
    limit: usize,
    preferred: usize,
}

impl Default for MessageSplitter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            preferred: DEFAULT_PREFERRED,
        }
    }
}

impl MessageSplitter {
    /// Create a splitter; `limit` is capped at the Telegram limit and
    /// `preferred` at `limit`
    #[must_use]
    pub fn new(limit: usize, preferred: usize) -> Self {
        let limit = limit.clamp(1, TELEGRAM_MESSAGE_LIMIT);
        Self {
            limit,
            preferred: preferred.min(limit),
        }
    }

    /// Chunk limit in characters
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Split `text` into trimmed, non-empty chunks of at most `limit`
    /// characters
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut rest: Vec<char> = text.trim().chars().collect();

        while rest.len() > self.limit {
            let at = self.split_position(&rest);
            let chunk: String = rest[..at].iter().collect();
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }
            let skip = rest[at..]
                .iter()
                .take_while(|c| c.is_whitespace())
                .count();
            rest.drain(..at + skip);
        }

        let tail: String = rest.into_iter().collect();
        if !tail.trim().is_empty() {
            chunks.push(tail.trim().to_string());
        }
        chunks
    }

    /// Where to cut `text`, which is longer than `limit`
    fn split_position(&self, text: &[char]) -> usize {
        let start = self.preferred;
        let end = self.limit;
        if start >= end {
            return end;
        }
        let window = &text[start..end];

        if let Some(i) = window
            .windows(2)
            .rposition(|pair| pair == ['\n', '\n'])
        {
            return start + i + 2;
        }
        if let Some(i) = window.iter().rposition(|&c| c == '\n') {
            return start + i + 1;
        }
        if let Some(i) = window
            .iter()
            .rposition(|c| SENTENCE_BOUNDARIES.contains(c))
        {
            return start + i + 1;
        }
        if let Some(i) = window.iter().rposition(|&c| c == ' ') {
            return start + i;
        }
        end
    }
}
