//! Cache keys and component kind labels.
//!
//! A cache key is `<component type>/<filename>`, or just the filename when no
//! component type is given. The type segment namespaces files so that a
//! reader and a writer may both declare `table.dat` without clashing.

use std::borrow::Borrow;
use std::fmt;

/// Separator between the component type and the filename.
pub const KEY_SEPARATOR: char = '/';

/// Identifier of a registered, downloadable file.
///
/// Keys are only produced by [`generate_key`], which guarantees they are
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Return the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CacheKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CacheKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the cache key for `filename` under `component_type`.
///
/// Returns `None` when there is no filename, which callers treat as
/// "nothing to register". An empty `component_type` is the same as none.
///
/// # Examples
///
/// ```
/// use auxdata_fetcher::key::generate_key;
///
/// let key = generate_key(Some("a.dat"), Some("readers")).expect("filename given");
/// assert_eq!(key.as_str(), "readers/a.dat");
/// assert_eq!(generate_key(Some("a.dat"), None).expect("filename given").as_str(), "a.dat");
/// assert!(generate_key(None, Some("readers")).is_none());
/// ```
#[must_use]
pub fn generate_key(filename: Option<&str>, component_type: Option<&str>) -> Option<CacheKey> {
    let name = filename?;
    let key = match component_type {
        Some(kind) if !kind.is_empty() => format!("{kind}{KEY_SEPARATOR}{name}"),
        _ => name.to_owned(),
    };
    Some(CacheKey(key))
}

/// The family a component belongs to, used as the cache key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    /// File readers.
    Readers,
    /// Output writers.
    Writers,
    /// Compositing rules.
    Composites,
    /// Image enhancements.
    Enhancements,
    /// Anything not covered above.
    Other,
}

/// Substring rules used by [`ComponentKind::infer_from_name`], checked in
/// order.
const NAME_RULES: [(&str, ComponentKind); 3] = [
    ("reader", ComponentKind::Readers),
    ("writer", ComponentKind::Writers),
    ("composit", ComponentKind::Composites),
];

impl ComponentKind {
    /// Namespace label used in cache keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Readers => "readers",
            Self::Writers => "writers",
            Self::Composites => "composites",
            Self::Enhancements => "enhancements",
            Self::Other => "other",
        }
    }

    /// Guess the kind from a type name.
    ///
    /// Module paths and generic arguments are ignored, so
    /// `my_crate::io::MyReaderHandler<T>` is matched on `myreaderhandler`.
    /// Names matching no rule map to [`ComponentKind::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use auxdata_fetcher::key::ComponentKind;
    ///
    /// assert_eq!(ComponentKind::infer_from_name("MyReaderHandler"), ComponentKind::Readers);
    /// assert_eq!(ComponentKind::infer_from_name("GeoTiffWriter"), ComponentKind::Writers);
    /// assert_eq!(ComponentKind::infer_from_name("Palette"), ComponentKind::Other);
    /// ```
    #[must_use]
    pub fn infer_from_name(name: &str) -> Self {
        let lowered = bare_type_name(name).to_lowercase();
        NAME_RULES
            .iter()
            .find(|(needle, _)| lowered.contains(needle))
            .map_or(Self::Other, |(_, kind)| *kind)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strip generic arguments and the module path from a type name.
fn bare_type_name(name: &str) -> &str {
    let without_generics = name.split('<').next().unwrap_or(name);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::namespaced(Some("x.dat"), Some("readers"), Some("readers/x.dat"))]
    #[case::no_component(Some("x.dat"), None, Some("x.dat"))]
    #[case::empty_component(Some("x.dat"), Some(""), Some("x.dat"))]
    #[case::no_filename(None, Some("readers"), None)]
    #[case::nested_filename(Some("luts/x.dat"), Some("writers"), Some("writers/luts/x.dat"))]
    fn generates_expected_keys(
        #[case] filename: Option<&str>,
        #[case] component_type: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let key = generate_key(filename, component_type);
        assert_eq!(key.as_ref().map(CacheKey::as_str), expected);
    }

    #[test]
    fn keys_differ_between_component_types() {
        let reader = generate_key(Some("x"), Some("readers"));
        let writer = generate_key(Some("x"), Some("writers"));
        assert_ne!(reader, writer);
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(
            generate_key(Some("x"), Some("composites")),
            generate_key(Some("x"), Some("composites"))
        );
    }

    #[rstest]
    #[case::reader("MyReaderHandler", ComponentKind::Readers)]
    #[case::writer("NinjoTiffWriter", ComponentKind::Writers)]
    #[case::compositor("StaticImageCompositor", ComponentKind::Composites)]
    #[case::composite("GenericComposite", ComponentKind::Composites)]
    #[case::module_path_ignored("readers::Palette", ComponentKind::Other)]
    #[case::generics_ignored("app::Cache<app::ReaderState>", ComponentKind::Other)]
    #[case::qualified("app::io::FileReader", ComponentKind::Readers)]
    #[case::fallback("Enhancer", ComponentKind::Other)]
    fn infers_kind_from_type_name(#[case] name: &str, #[case] expected: ComponentKind) {
        assert_eq!(ComponentKind::infer_from_name(name), expected);
    }

    #[test]
    fn labels_match_key_namespaces() {
        assert_eq!(ComponentKind::Readers.label(), "readers");
        assert_eq!(ComponentKind::Enhancements.to_string(), "enhancements");
        assert_eq!(ComponentKind::Other.label(), "other");
    }

    #[test]
    fn cache_key_compares_with_str() {
        let key = generate_key(Some("a.dat"), Some("readers")).expect("filename given");
        assert_eq!(key, "readers/a.dat");
        assert_eq!(key.to_string(), "readers/a.dat");
    }
}
