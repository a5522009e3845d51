//! Explain path configuration

/// Configuration for the explain path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainConfig {
    /// Input/output snapshots longer than this many chars are truncated.
    pub max_value_width: usize,
    /// Whether quantifier entries snapshot their unconsumed elements.
    pub record_remaining: bool,
    /// Maximum unconsumed elements captured per quantifier entry.
    pub max_remaining: usize,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            max_value_width: 120,
            record_remaining: true,
            max_remaining: 16,
        }
    }
}

impl ExplainConfig {
    /// Capture everything, no truncation.
    pub fn full() -> Self {
        Self {
            max_value_width: usize::MAX,
            record_remaining: true,
            max_remaining: usize::MAX,
        }
    }

    /// Short snapshots, no remaining-element capture.
    pub fn minimal() -> Self {
        Self {
            max_value_width: 40,
            record_remaining: false,
            max_remaining: 0,
        }
    }

    /// Truncates a rendered value to `max_value_width` chars
    pub fn clip(&self, rendered: String) -> String {
        if rendered.chars().count() <= self.max_value_width {
            return rendered;
        }
        let mut clipped: String = rendered.chars().take(self.max_value_width).collect();
        clipped.push_str("...");
        clipped
    }
}
