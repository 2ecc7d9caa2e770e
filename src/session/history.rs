//! Bounded rolling dialogue history.

use super::types::Turn;

/// Ordered sequence of turns with a drop-oldest trim policy.
///
/// In steady state the buffer holds user/assistant pairs in chronological
/// order; it only goes odd-length transiently while an interaction commit is
/// in progress. After every completed interaction `len() <= max_memory`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryBuffer {
    turns: Vec<Turn>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a turn at the tail.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Retain only the last `max_memory` turns, discarding the oldest first.
    ///
    /// Called once per completed interaction, never mid-interaction. Trimmed
    /// turns are dropped silently; there is no archival.
    pub fn trim(&mut self, max_memory: usize) {
        if self.turns.len() > max_memory {
            let excess = self.turns.len() - max_memory;
            self.turns.drain(..excess);
        }
    }

    /// Read-only view in chronological order, used for prompt assembly.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serialize to the persisted format: a JSON array of
    /// `{role, content}` objects in chronological order.
    pub fn serialize(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.turns)
    }

    /// Load from the persisted format.
    ///
    /// A parse failure leaves the buffer empty and is reported, not fatal.
    pub fn load(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Vec<Turn>>(bytes) {
            Ok(turns) => Self { turns },
            Err(e) => {
                tracing::warn!("could not parse saved chat history, starting empty: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<Turn> {
        (1..=n).map(|i| Turn::user(format!("t{i}"))).collect()
    }

    #[test]
    fn append_keeps_chronological_order() {
        let mut buffer = HistoryBuffer::new();
        buffer.append(Turn::user("first"));
        buffer.append(Turn::assistant("second"));
        let contents: Vec<&str> = buffer
            .snapshot()
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(contents, ["first", "second"]);
    }

    #[test]
    fn trim_drops_oldest_first() {
        let mut buffer = HistoryBuffer::new();
        for turn in numbered(6) {
            buffer.append(turn);
        }
        buffer.trim(4);
        // [t1..t6] trimmed to 4 keeps exactly [t3..t6]
        assert_eq!(buffer.snapshot(), &numbered(6)[2..]);
    }

    #[test]
    fn trim_is_noop_when_within_bound() {
        let mut buffer = HistoryBuffer::new();
        for turn in numbered(3) {
            buffer.append(turn);
        }
        let before = buffer.clone();
        buffer.trim(3);
        assert_eq!(buffer, before);
        buffer.trim(10);
        assert_eq!(buffer, before);
    }

    #[test]
    fn trim_to_zero_empties_buffer() {
        let mut buffer = HistoryBuffer::new();
        buffer.append(Turn::user("hello"));
        buffer.trim(0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn serialize_load_roundtrip() {
        let mut buffer = HistoryBuffer::new();
        buffer.append(Turn::user("Eb pets the cat"));
        buffer.append(Turn::assistant("Tinder purrs loudly."));
        let bytes = buffer.serialize().unwrap();
        assert_eq!(HistoryBuffer::load(&bytes), buffer);
    }

    #[test]
    fn persisted_format_is_role_content_array() {
        let mut buffer = HistoryBuffer::new();
        buffer.append(Turn::user("hi"));
        let value: serde_json::Value =
            serde_json::from_slice(&buffer.serialize().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([{"role": "user", "content": "hi"}]));
    }

    #[test]
    fn malformed_document_loads_empty() {
        let buffer = HistoryBuffer::load(b"{ not json");
        assert!(buffer.is_empty());
        let buffer = HistoryBuffer::load(b"{\"role\": \"user\"}");
        assert!(buffer.is_empty());
    }
}
