//! History compaction

use chatbro_llm::{Message, MessageRole};
use tracing::debug;

/// Keeps a session's history at or below a fixed message count.
///
/// Runs after each turn's messages are appended. The oldest messages go
/// first, then the head is advanced to the next user message so that no
/// tool result is left without the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCountingReducer {
    threshold: usize,
}

impl MessageCountingReducer {
    /// Create a reducer keeping at most `threshold` messages
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    /// Configured threshold
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Compact `messages` in place, returning how many were removed
    pub fn reduce(&self, messages: &mut Vec<Message>) -> usize {
        if messages.len() <= self.threshold {
            return 0;
        }

        let mut cut = messages.len() - self.threshold;
        if let Some(offset) = messages[cut..]
            .iter()
            .position(|m| m.role == MessageRole::User)
        {
            cut += offset;
        } else {
            while cut < messages.len() && messages[cut].role == MessageRole::Tool {
                cut += 1;
            }
        }
        messages.drain(..cut);

        debug!(removed = cut, kept = messages.len(), "Reduced session history");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbro_llm::ToolCall;

    fn call(id: &str) -> ToolCall {
        ToolCall::new(id, "documents", "{}")
    }

    #[test]
    fn test_under_threshold_is_untouched() {
        let reducer = MessageCountingReducer::new(4);
        let mut messages = vec![Message::user("a"), Message::assistant("b")];

        assert_eq!(reducer.reduce(&mut messages), 0);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_keeps_newest_messages() {
        let reducer = MessageCountingReducer::new(3);
        let mut messages: Vec<Message> = (0..5)
            .map(|i| Message::user(format!("Message {}", i)))
            .collect();

        assert_eq!(reducer.reduce(&mut messages), 2);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "Message 2");
        assert_eq!(messages[2].content, "Message 4");
    }

    #[test]
    fn test_does_not_leave_orphan_tool_results() {
        let reducer = MessageCountingReducer::new(3);
        let mut messages = vec![
            Message::user("find my invoice"),
            Message::assistant_with_tool_calls(None, vec![call("1"), call("2")]),
            Message::tool_response("1", "documents", "first"),
            Message::tool_response("2", "documents", "second"),
            Message::assistant("Here it is"),
        ];

        reducer.reduce(&mut messages);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Here it is");
    }

    #[test]
    fn test_history_restarts_at_user_message() {
        let reducer = MessageCountingReducer::new(4);
        let mut messages = vec![
            Message::user("first"),
            Message::assistant_with_tool_calls(None, vec![call("1")]),
            Message::tool_response("1", "documents", "result"),
            Message::assistant("answer"),
            Message::user("second"),
            Message::assistant("reply"),
        ];

        assert_eq!(reducer.reduce(&mut messages), 4);
        assert_eq!(messages[0].content, "second");
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        assert_eq!(MessageCountingReducer::new(0).threshold(), 1);
    }
}
