//! Output format selection.

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Colored, human-readable text.
    Pretty,
    /// One JSON document per result.
    Json,
}

impl OutputFormat {
    pub(crate) fn from_flag(flag: &str) -> Self {
        if flag.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}
