use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by [`parse_hunk_header`](crate::parse_hunk_header).
pub enum UnidiffError {
    #[error("not a hunk header: '{0}'")]
    /// The line does not have the `@@ ... @@` shape.
    NotAHunkHeader(String),

    #[error("missing {side} range in hunk header '{line}'")]
    /// The `-a,b` or `+c,d` part is absent.
    MissingRange {
        /// `"old"` or `"new"`.
        side: &'static str,
        /// The offending header line.
        line: String,
    },

    #[error("invalid range '{range}': {source}")]
    /// A start or length is not a number.
    InvalidRange {
        /// The range text as written.
        range: String,
        /// The integer parse failure.
        #[source]
        source: ParseIntError,
    },
}
