//! Conversation transcript storage
//!
//! The transcript is the ordered list of messages sent to the gateway on
//! every call. It is never reordered or deduplicated; messages are only
//! appended, or removed whole from the end.

use crate::providers::{Message, Role};

/// Ordered, append-only list of role-tagged messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::session::Conversation;
    ///
    /// let conversation = Conversation::new();
    /// assert!(conversation.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a conversation from an existing message list
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Appends a message at the end
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Removes every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Replaces the whole transcript
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript has no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The final message, if any
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Removes and returns the final message if it was written by the assistant
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::providers::Message;
    /// use chatline::session::Conversation;
    ///
    /// let mut conversation = Conversation::new();
    /// conversation.push(Message::user("hi"));
    /// assert!(conversation.pop_last_if_assistant().is_none());
    ///
    /// conversation.push(Message::assistant("hello"));
    /// assert_eq!(conversation.pop_last_if_assistant().unwrap().content, "hello");
    /// assert_eq!(conversation.len(), 1);
    /// ```
    pub fn pop_last_if_assistant(&mut self) -> Option<Message> {
        match self.messages.last() {
            Some(message) if message.role == Role::Assistant => self.messages.pop(),
            _ => None,
        }
    }

    /// Removes the final message if it equals `message`
    ///
    /// Returns whether a message was removed.
    pub(crate) fn pop_last_if_eq(&mut self, message: &Message) -> bool {
        if self.messages.last() == Some(message) {
            self.messages.pop();
            true
        } else {
            false
        }
    }

    /// Content of the most recent assistant message
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// The final `n` messages in original order, or all of them if fewer exist
    pub fn last_n(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Render messages as `"<role>: <content>"` lines
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::providers::Message;
    /// use chatline::session::Conversation;
    ///
    /// let text = Conversation::render(&[Message::user("hi"), Message::assistant("hello")]);
    /// assert_eq!(text, "user: hi\nassistant: hello");
    /// ```
    pub fn render(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Conversation {
        Conversation::from_messages(vec![
            Message::system("be brief"),
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("how are you?"),
        ])
    }

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut conversation = Conversation::new();
        let contents = ["one", "two", "", "three"];
        for content in contents {
            conversation.push(Message::user(content));
        }

        assert_eq!(conversation.len(), contents.len());
        for (message, expected) in conversation.messages().iter().zip(contents) {
            assert_eq!(message.content, expected);
        }
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("same"));
        conversation.push(Message::user("same"));
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_pop_last_if_assistant_only_removes_assistant() {
        let mut conversation = sample();
        assert!(conversation.pop_last_if_assistant().is_none());
        assert_eq!(conversation.len(), 4);

        conversation.push(Message::assistant("fine"));
        let popped = conversation.pop_last_if_assistant().unwrap();
        assert_eq!(popped.content, "fine");
        assert_eq!(conversation.len(), 4);
    }

    #[test]
    fn test_pop_last_if_eq() {
        let mut conversation = sample();
        assert!(!conversation.pop_last_if_eq(&Message::user("hi")));
        assert!(conversation.pop_last_if_eq(&Message::user("how are you?")));
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn test_last_assistant_text_skips_later_user_messages() {
        let conversation = sample();
        assert_eq!(conversation.last_assistant_text(), Some("hello"));
        assert_eq!(Conversation::new().last_assistant_text(), None);
    }

    #[test]
    fn test_last_n() {
        let conversation = sample();
        assert_eq!(conversation.last_n(1), &conversation.messages()[3..]);
        assert_eq!(conversation.last_n(2).len(), 2);
        assert_eq!(conversation.last_n(2)[0].content, "hello");
        assert_eq!(conversation.last_n(100).len(), 4);
        assert!(conversation.last_n(0).is_empty());
    }

    #[test]
    fn test_render_formats_roles() {
        let conversation = sample();
        assert_eq!(
            Conversation::render(conversation.messages()),
            "system: be brief\nuser: hi\nassistant: hello\nuser: how are you?"
        );
        assert_eq!(Conversation::render(&[]), "");
    }

    #[test]
    fn test_clear_and_replace() {
        let mut conversation = sample();
        conversation.clear();
        assert!(conversation.is_empty());

        conversation.replace(vec![Message::user("loaded")]);
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.last().unwrap().content, "loaded");
    }
}
