use std::fmt;
use std::str::FromStr;

use crate::NamingError;

/// Separator between path segments. Segments cannot contain it.
pub const SEPARATOR: char = '/';

/// A validated, slash-delimited directory path.
///
/// Always holds at least one segment and never an empty one. Malformed input
/// is rejected rather than collapsed.
///
/// ```rust
/// use scoped_registry::NamePath;
///
/// let path = NamePath::parse("java:comp/env/jdbc").unwrap();
/// assert_eq!(path.segments(), ["java:comp", "env", "jdbc"]);
///
/// assert!(NamePath::parse("a//b").is_err());
/// assert!(NamePath::parse("/a").is_err());
/// assert!(NamePath::parse("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamePath {
    segments: Vec<String>,
}

impl NamePath {
    /// # Errors
    ///
    /// [`NamingError::InvalidPath`] for an empty string, a leading or trailing
    /// separator, or an empty segment.
    pub fn parse(path: &str) -> Result<Self, NamingError> {
        let invalid = |reason| NamingError::InvalidPath {
            path: path.to_owned(),
            reason,
        };

        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if path.starts_with(SEPARATOR) {
            return Err(invalid("leading separator"));
        }
        if path.ends_with(SEPARATOR) {
            return Err(invalid("trailing separator"));
        }

        let segments: Vec<String> = path.split(SEPARATOR).map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(invalid("empty segment"));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments, always at least one.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Splits into the parent segments and the final one.
    pub fn split_last(&self) -> (&[String], &str) {
        match self.segments.split_last() {
            Some((last, parents)) => (parents, last.as_str()),
            None => (&[], ""),
        }
    }
}

impl fmt::Display for NamePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for NamePath {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for NamePath {
    type Error = NamingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
