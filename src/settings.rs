//! Parse settings
//!
//! Options that change how element trees are matched against the declared
//! property sequence of a complex type.

/// How the parse cursor moves when a child does not match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceMatching {
    /// Advance the cursor by a single property and retry once.
    ///
    /// An absent property can only be skipped when the very next one
    /// matches; two absent properties in a row fail the parse.
    #[default]
    SingleStep,
    /// Advance the cursor as far as needed until a property matches.
    SkipAbsent,
}

impl SequenceMatching {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "single-step" => Some(Self::SingleStep),
            "skip-absent" => Some(Self::SkipAbsent),
            _ => None,
        }
    }
}

impl std::fmt::Display for SequenceMatching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleStep => write!(f, "single-step"),
            Self::SkipAbsent => write!(f, "skip-absent"),
        }
    }
}

/// Configuration for parsing element trees into values
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    /// Cursor movement on mismatch
    matching: SequenceMatching,
}

impl ParseConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the sequence matching mode
    pub fn matching(&self) -> SequenceMatching {
        self.matching
    }

    /// Set the sequence matching mode
    pub fn with_matching(mut self, matching: SequenceMatching) -> Self {
        self.matching = matching;
        self
    }
}
