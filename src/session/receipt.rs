use std::collections::HashMap;

/// Pending, one-shot receipt correlation: receipt id -> caller token.
#[derive(Debug, Clone, Default)]
pub struct PendingReceipts<Token> {
    pending: HashMap<String, Token>,
}

impl<Token> PendingReceipts<Token> {
    pub fn new() -> Self {
        PendingReceipts { pending: HashMap::new() }
    }

    pub fn register(&mut self, receipt_id: String, token: Token) {
        self.pending.insert(receipt_id, token);
    }

    /// Removes and returns the token for a matching `RECEIPT`. Returns
    /// `None` for an unmatched (orphan) receipt id.
    pub fn resolve(&mut self, receipt_id: &str) -> Option<Token> {
        self.pending.remove(receipt_id)
    }

    /// Drains every pending entry, e.g. when the transport reports a
    /// disconnect and each one resolves as cancelled instead of received.
    pub fn drain(&mut self) -> Vec<(String, Token)> {
        self.pending.drain().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
