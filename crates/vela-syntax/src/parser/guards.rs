//! Parser guards to prevent infinite loops

/// Guard against parser loops that stop consuming tokens
///
/// Every list and block loop checks the stream position once per
/// iteration. If nothing was consumed since the previous check the loop
/// would spin forever, so the caller must consume or bail out.
///
/// # Example
///
/// ```ignore
/// let mut guard = LoopGuard::new("block_statements");
/// while !parser.stream.at_end() {
///     if !guard.check(parser.stream.position()) {
///         parser.skip_stray_token();
///     }
///     // ... parse a statement ...
/// }
/// ```
pub struct LoopGuard {
    name: &'static str,
    last: Option<usize>,
}

impl LoopGuard {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self { name, last: None }
    }

    /// Returns false if the stream has not moved since the last check.
    #[inline]
    pub fn check(&mut self, position: usize) -> bool {
        if self.last == Some(position) {
            tracing::trace!(guard = self.name, position, "parser loop stalled");
            return false;
        }
        self.last = Some(position);
        true
    }
}
