//! Parameter helpers shared by the endpoint wrappers.
//!
//! The Google APIs take comma-separated lists for metrics, dimensions, and
//! resource parts. [`Names`] lets callers pass either a comma-separated
//! string or a slice, mirroring the flexible inputs the wrappers document.

use crate::error::ApiError;

// ============================================================================
// Names
// ============================================================================

/// One or more API names (metrics, dimensions, parts, IDs).
///
/// Constructed from a comma-separated string or from a slice; whitespace is
/// trimmed and empty entries are dropped.
///
/// ```
/// use ytkit_core::Names;
///
/// let from_str: Names = "views, likes".into();
/// let from_slice: Names = ["views", "likes"].into();
/// assert_eq!(from_str.join(), from_slice.join());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names(Vec<String>);

impl Names {
    /// The names as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// True when no names were given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The first name, if any.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Join back into the comma-separated wire form.
    pub fn join(&self) -> String {
        self.0.join(",")
    }

    /// Iterate over the names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Validate that every name is drawn from `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] naming the offending parameter
    /// and listing the allowed values.
    pub fn validate(&self, param: &str, allowed: &[&str]) -> Result<(), ApiError> {
        match self.iter().find(|name| !allowed.contains(name)) {
            Some(bad) => Err(invalid_argument(param, bad, allowed)),
            None => Ok(()),
        }
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl From<&str> for Names {
    fn from(value: &str) -> Self {
        Self(split_csv(value))
    }
}

impl From<String> for Names {
    fn from(value: String) -> Self {
        Self(split_csv(&value))
    }
}

impl From<&[&str]> for Names {
    fn from(value: &[&str]) -> Self {
        Self(value.iter().map(ToString::to_string).collect())
    }
}

impl From<&[String]> for Names {
    fn from(value: &[String]) -> Self {
        Self(value.to_vec())
    }
}

impl From<Vec<&str>> for Names {
    fn from(value: Vec<&str>) -> Self {
        Self(value.iter().map(ToString::to_string).collect())
    }
}

impl From<Vec<String>> for Names {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(value: [&str; N]) -> Self {
        Self(value.iter().map(ToString::to_string).collect())
    }
}

// ============================================================================
// Invalid-argument messages
// ============================================================================

/// Build the invalid-argument error for an out-of-vocabulary value.
///
/// The allowed values are listed as sorted, de-duplicated bullets so the
/// message stays stable regardless of how the vocabulary is declared.
pub fn invalid_argument(param: &str, value: &str, allowed: &[&str]) -> ApiError {
    let mut sorted: Vec<&str> = allowed.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut message = format!("{param}={value:?} is invalid. Allowed values:");
    for name in sorted {
        message.push_str("\n  \u{2022} ");
        message.push_str(name);
    }
    ApiError::InvalidArgument(message)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_trims_and_drops_empties() {
        let names: Names = " views , likes ,,".into();
        assert_eq!(names.as_slice(), &["views", "likes"]);
    }

    #[test]
    fn test_slice_passthrough() {
        let names: Names = ["deviceType", "operatingSystem"].into();
        assert_eq!(names.len(), 2);
        assert_eq!(names.first(), Some("deviceType"));
    }

    #[test]
    fn test_join_round_trip() {
        let names: Names = "a,b,c".into();
        assert_eq!(names.join(), "a,b,c");
    }

    #[test]
    fn test_validate_accepts_subset() {
        let names: Names = "ageGroup,gender".into();
        assert!(names.validate("demographic", &["ageGroup", "gender"]).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown() {
        let names: Names = "planet".into();
        let err = names
            .validate("geo_dim", &["country", "province", "dma", "city"])
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("geo_dim=\"planet\" is invalid"));
        assert!(text.contains("\u{2022} city"));
    }

    #[test]
    fn test_invalid_argument_sorts_allowed_values() {
        let err = invalid_argument("detail", "nope", &["b", "a", "b"]);
        let text = err.to_string();
        let a_pos = text.find("\u{2022} a").unwrap();
        let b_pos = text.find("\u{2022} b").unwrap();
        assert!(a_pos < b_pos);
        assert_eq!(text.matches("\u{2022} b").count(), 1);
    }
}
