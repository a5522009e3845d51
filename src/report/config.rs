//! Report rendering configuration

/// Layout of a rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Prune subtrees that contain no mismatch
    pub mismatch_only: bool,
    /// Spaces per tree level
    pub indent_width: usize,
    /// Spaces between the expected and actual columns
    pub column_gap: usize,
    /// Print the column titles and a rule above the rows
    pub show_header: bool,
    /// Prefix for mismatching rows; other rows are padded to its width
    pub mismatch_marker: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mismatch_only: false,
            indent_width: 2,
            column_gap: 3,
            show_header: true,
            mismatch_marker: ">> ".to_string(),
        }
    }
}

impl ReportConfig {
    /// Every recorded entry
    pub fn full() -> Self {
        Self::default()
    }

    /// Only mismatching entries and their ancestors
    pub fn mismatches() -> Self {
        Self {
            mismatch_only: true,
            ..Self::default()
        }
    }

    pub(crate) fn marker_width(&self) -> usize {
        self.mismatch_marker.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full() {
        let config = ReportConfig::default();
        assert_eq!(config, ReportConfig::full());
        assert!(!config.mismatch_only);
        assert_eq!(config.indent_width, 2);
    }

    #[test]
    fn test_mismatches_preset() {
        let config = ReportConfig::mismatches();
        assert!(config.mismatch_only);
        assert_eq!(config.marker_width(), 3);
    }
}
