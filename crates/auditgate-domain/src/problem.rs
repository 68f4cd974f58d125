use std::fmt;

/// One distinct advisory surfaced by a scan of a repository.
///
/// `package` and `advisory_id` are `None` when the scanner reported a warning
/// without advisory details. That is a legitimate value, not an error.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Problem {
    pub repository: String,
    pub package: Option<String>,
    pub advisory_id: Option<String>,
}

impl Problem {
    pub fn new(repository: &str, package: Option<&str>, advisory_id: Option<&str>) -> Self {
        Self {
            repository: repository.to_string(),
            package: package.map(str::to_string),
            advisory_id: advisory_id.map(str::to_string),
        }
    }

    /// A problem the scanner reported without any advisory information.
    pub fn unidentified(repository: &str) -> Self {
        Self::new(repository, None, None)
    }

    /// `package/advisory_id`, with `?` standing in for unknown parts.
    pub fn label(&self) -> String {
        format!(
            "{}/{}",
            self.package.as_deref().unwrap_or("?"),
            self.advisory_id.as_deref().unwrap_or("?")
        )
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.repository, self.label())
    }
}
