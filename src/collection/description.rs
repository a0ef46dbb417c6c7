use itertools::Itertools;
use std::fmt;

/// A concrete, colon-separated collection nesting such as `list:paired`.
///
/// Always holds at least one non-empty segment; construct it through
/// [`CollectionType::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionType {
    segments: Vec<String>,
}

impl CollectionType {
    /// Parses a colon-joined collection type. Returns `None` for an empty
    /// string or for a type with an empty segment (`list::paired`).
    pub fn parse(collection_type: &str) -> Option<Self> {
        let trimmed = collection_type.trim();
        if trimmed.is_empty() {
            return None;
        }
        let segments: Vec<String> = trimmed.split(':').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// Number of nesting levels.
    pub fn rank(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True if `other` is the trailing, segment-aligned part of `self`.
    fn ends_with(&self, other: &CollectionType) -> bool {
        self.segments.ends_with(&other.segments)
    }

    /// True if `other` is the leading, segment-aligned part of `self`.
    fn starts_with(&self, other: &CollectionType) -> bool {
        self.segments.starts_with(&other.segments)
    }

    fn concat(&self, other: &CollectionType) -> CollectionType {
        let segments = self
            .segments
            .iter()
            .chain(other.segments.iter())
            .cloned()
            .collect();
        CollectionType { segments }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.iter().join(":"))
    }
}

/// Describes the collection shape produced or accepted by a terminal.
///
/// `Null` means "not a collection" and matches nothing. `Any` matches every
/// collection shape but can never be mapped over. Descriptors are values:
/// every operation returns a new descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CollectionTypeDescription {
    #[default]
    Null,
    Any,
    Concrete(CollectionType),
}

impl CollectionTypeDescription {
    /// Builds a descriptor from a collection type string. Malformed or empty
    /// strings yield `Null`.
    pub fn new(collection_type: &str) -> Self {
        CollectionType::parse(collection_type)
            .map(Self::Concrete)
            .unwrap_or(Self::Null)
    }

    /// Builds a descriptor from the first entry of a list of collection types.
    pub fn from_first<S: AsRef<str>>(collection_types: &[S]) -> Self {
        collection_types
            .first()
            .map(|t| Self::new(t.as_ref()))
            .unwrap_or(Self::Null)
    }

    pub fn list() -> Self {
        Self::new("list")
    }

    pub fn paired() -> Self {
        Self::new("paired")
    }

    pub fn is_collection(&self) -> bool {
        !matches!(self, Self::Null)
    }

    /// Nesting depth. `Null` has rank 0; `Any` has no fixed rank and also reports 0.
    pub fn rank(&self) -> usize {
        match self {
            Self::Concrete(t) => t.rank(),
            Self::Null | Self::Any => 0,
        }
    }

    /// The colon-joined type string of a concrete descriptor.
    pub fn collection_type(&self) -> Option<String> {
        match self {
            Self::Concrete(t) => Some(t.to_string()),
            Self::Null | Self::Any => None,
        }
    }

    /// True if an output of type `other` can be consumed directly by a
    /// terminal expecting `self`.
    pub fn can_match(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Any, _) | (_, Self::Any) => true,
            (Self::Concrete(a), Self::Concrete(b)) => a == b,
        }
    }

    /// True if `self` is a strictly deeper nesting ending in `other`, so that
    /// a terminal expecting `other` can be run once per element of `self`.
    pub fn can_map_over(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Concrete(outer), Self::Concrete(inner)) => {
                inner.rank() < outer.rank() && outer.ends_with(inner)
            }
            _ => false,
        }
    }

    /// Nests `other` inside `self`: `list.append(paired)` is `list:paired`.
    pub fn append(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Null, _) => other.clone(),
            (Self::Any, _) | (_, Self::Any) => Self::Any,
            (Self::Concrete(_), Self::Null) => self.clone(),
            (Self::Concrete(a), Self::Concrete(b)) => Self::Concrete(a.concat(b)),
        }
    }

    /// The outer nesting left over once `inner` is consumed:
    /// `list:paired` mapped over `paired` is `list`. `Null` if `self` cannot
    /// map over `inner`.
    pub fn effective_map_over(&self, inner: &Self) -> Self {
        match (self, inner) {
            (Self::Concrete(outer), Self::Concrete(inner_type)) if self.can_map_over(inner) => {
                let keep = outer.rank() - inner_type.rank();
                Self::Concrete(CollectionType {
                    segments: outer.segments[..keep].to_vec(),
                })
            }
            _ => Self::Null,
        }
    }

    /// Removes the leading `outer` nesting: `list:paired` without `list` is
    /// `paired`. Stripping `Null` is the identity; anything that does not
    /// start with `outer` (or would leave nothing behind) yields `Null`.
    pub fn strip_outer(&self, outer: &Self) -> Self {
        match (self, outer) {
            (_, Self::Null) => self.clone(),
            (Self::Concrete(full), Self::Concrete(prefix))
                if full.rank() > prefix.rank() && full.starts_with(prefix) =>
            {
                Self::Concrete(CollectionType {
                    segments: full.segments[prefix.rank()..].to_vec(),
                })
            }
            _ => Self::Null,
        }
    }

    /// Identity comparison: same singleton or same concrete type string.
    pub fn equal(&self, other: &Self) -> bool {
        self == other
    }
}

impl From<&str> for CollectionTypeDescription {
    fn from(collection_type: &str) -> Self {
        Self::new(collection_type)
    }
}

impl fmt::Display for CollectionTypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NullCollectionType[]"),
            Self::Any => write!(f, "AnyCollectionType[]"),
            Self::Concrete(t) => write!(f, "CollectionType[{}]", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(CollectionType::parse("").is_none());
        assert!(CollectionType::parse("list::paired").is_none());
        assert!(CollectionType::parse(":list").is_none());
        assert_eq!(CollectionType::parse("list:paired").map(|t| t.rank()), Some(2));
    }

    #[test]
    fn suffix_check_is_segment_aligned() {
        let outer = CollectionTypeDescription::new("list:xpaired");
        assert!(!outer.can_map_over(&CollectionTypeDescription::paired()));
    }

    #[test]
    fn strip_outer_leaves_inner_nesting() {
        let full = CollectionTypeDescription::new("list:list:paired");
        assert_eq!(
            full.strip_outer(&CollectionTypeDescription::list()),
            CollectionTypeDescription::new("list:paired")
        );
        assert_eq!(
            full.strip_outer(&CollectionTypeDescription::paired()),
            CollectionTypeDescription::Null
        );
        assert_eq!(
            CollectionTypeDescription::list().strip_outer(&CollectionTypeDescription::list()),
            CollectionTypeDescription::Null
        );
    }
}
