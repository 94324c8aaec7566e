//! Bounded accumulation of streamed reply fragments

/// Accumulates fragments in arrival order up to a fixed byte capacity
///
/// A fragment that does not fit is truncated at the last character boundary
/// within the capacity, and the buffer is marked as overflowed; later
/// fragments are rejected.
#[derive(Debug)]
pub struct ReplyBuffer {
    text: String,
    capacity: usize,
    overflowed: bool,
}

impl ReplyBuffer {
    /// Create an empty buffer holding at most `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity,
            overflowed: false,
        }
    }

    /// Append a fragment
    ///
    /// Returns the part of the fragment that was accepted, which is the whole
    /// fragment unless the capacity was reached.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::session::ReplyBuffer;
    ///
    /// let mut buffer = ReplyBuffer::new(8);
    /// assert_eq!(buffer.push("Hello"), "Hello");
    /// assert_eq!(buffer.push(", world"), ", w");
    /// assert!(buffer.overflowed());
    /// assert_eq!(buffer.as_str(), "Hello, w");
    /// ```
    pub fn push<'a>(&mut self, fragment: &'a str) -> &'a str {
        if self.overflowed {
            return "";
        }

        let room = self.capacity - self.text.len();
        if fragment.len() <= room {
            self.text.push_str(fragment);
            return fragment;
        }

        let mut cut = room;
        while !fragment.is_char_boundary(cut) {
            cut -= 1;
        }
        let accepted = &fragment[..cut];
        self.text.push_str(accepted);
        self.overflowed = true;
        accepted
    }

    /// Whether a fragment was cut short
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Maximum number of bytes the buffer holds
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Accumulated text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the buffer and return the accumulated text
    pub fn into_string(self) -> String {
        self.text
    }
}
