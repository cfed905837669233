const DEFAULT_BUFFER_LEN: usize = 1024 * 64;

///
/// Options controlling how a [`Document`](crate::Document) reads and rewrites its stream.
///
/// ## Example
///
/// ```
/// use ebml_tree::DocumentConfig;
///
/// let config = DocumentConfig::default()
///     .with_max_id_width(4)
///     .with_buffer_len(4096);
/// assert_eq!(4, config.max_id_width());
/// ```
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentConfig {
    max_id_width: usize,
    max_size_width: usize,
    buffer_len: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            max_id_width: 8,
            max_size_width: 8,
            buffer_len: DEFAULT_BUFFER_LEN,
        }
    }
}

impl DocumentConfig {

    ///
    /// Sets the widest id (in bytes) an element header may use.  Elements with wider ids are treated as corrupt.  Values are clamped to `1..=8`.
    ///
    pub fn with_max_id_width(mut self, width: usize) -> Self {
        self.max_id_width = width.max(1).min(8);
        self
    }

    ///
    /// Sets the widest size field (in bytes) an element header may use.  Elements with wider size fields are treated as corrupt.  Values are clamped to `1..=8`.
    ///
    pub fn with_max_size_width(mut self, width: usize) -> Self {
        self.max_size_width = width.max(1).min(8);
        self
    }

    ///
    /// Sets the chunk size used when bytes have to be shifted within the stream.
    ///
    pub fn with_buffer_len(mut self, buffer_len: usize) -> Self {
        self.buffer_len = buffer_len.max(1);
        self
    }

    pub fn max_id_width(&self) -> usize {
        self.max_id_width
    }

    pub fn max_size_width(&self) -> usize {
        self.max_size_width
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentConfig;

    #[test]
    fn widths_are_clamped() {
        let config = DocumentConfig::default().with_max_id_width(12).with_max_size_width(0);
        assert_eq!(8, config.max_id_width());
        assert_eq!(1, config.max_size_width());
    }

    #[test]
    fn defaults() {
        let config = DocumentConfig::default();
        assert_eq!(8, config.max_id_width());
        assert_eq!(8, config.max_size_width());
        assert_eq!(64 * 1024, config.buffer_len());
    }
}
