//! Accession header model.
//!
//! An accession is one row of a dataset. Its position (0-based index) is
//! the membership id used by subset solutions; the header carries the
//! optional display name and unique identifier looked up by that index.

use serde::{Deserialize, Serialize};

/// Name and unique identifier of one accession.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessionHeader {
    /// Unique identifier. Must be unique within a dataset when assigned.
    pub id: Option<String>,
    /// Display name. Need not be unique.
    pub name: Option<String>,
}

impl AccessionHeader {
    /// Creates a header with the given unique identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    /// Creates a header from optional parts.
    pub fn from_parts(id: Option<String>, name: Option<String>) -> Self {
        Self { id, name }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name to show for this accession: the name, else the identifier.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.id.as_deref())
    }

    /// Whether neither a name nor an identifier is assigned.
    pub fn is_blank(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }
}

/// Builds headers from identifiers and optional names.
///
/// When `names` is `None` the identifiers double as names.
pub fn headers_from_ids(ids: &[String], names: Option<&[Option<String>]>) -> Vec<AccessionHeader> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let name = match names {
                Some(names) => names.get(i).cloned().flatten(),
                None => Some(id.clone()),
            };
            AccessionHeader::from_parts(Some(id.clone()), name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_builder() {
        let h = AccessionHeader::new("acc-1").with_name("Alice");
        assert_eq!(h.id.as_deref(), Some("acc-1"));
        assert_eq!(h.display_name(), Some("Alice"));
        assert!(!h.is_blank());
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let h = AccessionHeader::new("acc-2");
        assert_eq!(h.display_name(), Some("acc-2"));
        assert!(AccessionHeader::default().is_blank());
    }

    #[test]
    fn test_headers_from_ids() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let headers = headers_from_ids(&ids, None);
        assert_eq!(headers[1].name.as_deref(), Some("b"));

        let names = vec![Some("Alice".to_string()), None];
        let headers = headers_from_ids(&ids, Some(&names));
        assert_eq!(headers[0].name.as_deref(), Some("Alice"));
        assert_eq!(headers[1].name, None);
    }
}
