//! Chart loading and `version` lookup. Content is parsed into a generic YAML tree,
//! explicit tags are refused, `<<` merge keys are applied, then one scalar is read.

use std::path::{Path, PathBuf};

use crate::error::ChartError;
use crate::node::Node;

const VERSION_KEY: &str = "version";

/// A chart's version, rendered exactly as the scalar reads. Not parsed as SemVer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartVersion(String);

impl ChartVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChartVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChartVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ChartVersion {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ChartVersion {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A parsed chart descriptor whose top level is known to be a mapping.
#[derive(Debug, Clone)]
pub struct ChartDocument {
    path: PathBuf,
    root: Node,
}

impl ChartDocument {
    /// Read and parse the chart at `path`. The file handle is closed before parsing starts.
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let content = std::fs::read(path).map_err(|source| ChartError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &content)
    }

    /// Parse already-read chart content. `path` only labels error messages.
    pub fn from_yaml(path: &Path, content: &[u8]) -> Result<Self, ChartError> {
        let mut root: Node =
            serde_yaml::from_slice(content).map_err(|source| ChartError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(tag) = root.find_tag() {
            return Err(ChartError::UnsupportedTag {
                path: path.to_path_buf(),
                tag: tag.to_owned(),
            });
        }

        root.apply_merge().map_err(|_| ChartError::InvalidMerge {
            path: path.to_path_buf(),
        })?;

        if !matches!(root, Node::Mapping(_)) {
            return Err(ChartError::NotAMapping {
                path: path.to_path_buf(),
                found: root.kind(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the top-level `version` and render it as a string.
    ///
    /// Integers print with all their digits; floats print in shortest round-trip
    /// form (`1e3` becomes `1000.0`).
    pub fn version(&self) -> Result<ChartVersion, ChartError> {
        let value = self
            .root
            .get(VERSION_KEY)
            .ok_or_else(|| ChartError::MissingVersion {
                path: self.path.clone(),
            })?;

        let rendered = match value {
            Node::String(s) | Node::Int(s) => s.clone(),
            Node::Float(f) => serde_yaml::Number::from(*f).to_string(),
            Node::Bool(b) => b.to_string(),
            other => {
                return Err(ChartError::NotAScalar {
                    path: self.path.clone(),
                    found: other.kind(),
                });
            }
        };

        Ok(ChartVersion(rendered))
    }
}

/// Load the chart at `path` and return its version.
pub fn read_version(path: &Path) -> Result<ChartVersion, ChartError> {
    ChartDocument::load(path)?.version()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<ChartDocument, ChartError> {
        ChartDocument::from_yaml(Path::new("Chart.yaml"), content.as_bytes())
    }

    fn version_of(content: &str) -> Result<ChartVersion, ChartError> {
        parse(content)?.version()
    }

    #[test]
    fn reads_string_version_among_other_keys() {
        let version = version_of(
            "apiVersion: v2\nname: demo\ndescription: A demo chart\nversion: 1.2.3\nappVersion: \"4.5\"\n",
        )
        .unwrap();
        assert_eq!(version, "1.2.3");
    }

    #[test]
    fn integer_version_is_stringified() {
        assert_eq!(version_of("version: 2\n").unwrap(), "2");
    }

    #[test]
    fn wide_integer_version_keeps_all_digits() {
        assert_eq!(
            version_of("version: 99999999999999999999\n").unwrap(),
            "99999999999999999999"
        );
    }

    #[test]
    fn wide_integer_elsewhere_does_not_break_lookup() {
        let content = "\
name: demo
annotations:
  build-id: 123456789012345678901234567890
version: 1.4.0
";
        assert_eq!(version_of(content).unwrap(), "1.4.0");
    }

    #[test]
    fn float_version_is_stringified() {
        assert_eq!(version_of("version: 1.0\n").unwrap(), "1.0");
        assert_eq!(version_of("version: 0.25\n").unwrap(), "0.25");
    }

    #[test]
    fn duplicate_version_keys_last_wins() {
        assert_eq!(
            version_of("version: 1.0.0\nname: demo\nversion: 1.0.1\n").unwrap(),
            "1.0.1"
        );
    }

    #[test]
    fn invalid_merge_is_parse_error() {
        let err = parse("<<: not-a-mapping\nversion: 1.0.0\n").unwrap_err();
        assert!(matches!(err, ChartError::InvalidMerge { .. }));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn quoted_version_is_verbatim() {
        assert_eq!(version_of("version: \"01\"\n").unwrap(), "01");
        assert_eq!(
            version_of("version: '0.1.0-rc.1+build.5'\n").unwrap(),
            "0.1.0-rc.1+build.5"
        );
    }

    #[test]
    fn boolean_version_prints_yaml_spelling() {
        assert_eq!(version_of("version: true\n").unwrap(), "true");
    }

    #[test]
    fn missing_version_is_lookup_error() {
        let err = version_of("name: demo\n").unwrap_err();
        assert!(matches!(err, ChartError::MissingVersion { .. }));
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn sequence_document_is_lookup_error() {
        let err = parse("- version: 1.0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ChartError::NotAMapping {
                found: "sequence",
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn scalar_and_null_documents_are_lookup_errors() {
        let err = parse("just a string\n").unwrap_err();
        assert!(matches!(err, ChartError::NotAMapping { found: "string", .. }));

        let err = parse("~\n").unwrap_err();
        assert!(matches!(err, ChartError::NotAMapping { found: "null", .. }));
    }

    #[test]
    fn nested_version_is_lookup_error() {
        let err = version_of("version:\n  major: 1\n  minor: 2\n").unwrap_err();
        assert!(matches!(err, ChartError::NotAScalar { found: "mapping", .. }));

        let err = version_of("version: [1, 2, 3]\n").unwrap_err();
        assert!(matches!(err, ChartError::NotAScalar { found: "sequence", .. }));
    }

    #[test]
    fn null_version_is_lookup_error() {
        let err = version_of("name: demo\nversion:\n").unwrap_err();
        assert!(matches!(err, ChartError::NotAScalar { found: "null", .. }));
    }

    #[test]
    fn nested_version_key_is_not_top_level() {
        let err = version_of("dependencies:\n  - name: redis\n    version: 17.0.0\n").unwrap_err();
        assert!(matches!(err, ChartError::MissingVersion { .. }));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = parse("name: demo\nversion: [1.0\n").unwrap_err();
        assert!(matches!(err, ChartError::Parse { .. }));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn multiple_documents_are_parse_error() {
        let err = parse("version: 1.0.0\n---\nversion: 2.0.0\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn invalid_utf8_is_parse_error() {
        let err = ChartDocument::from_yaml(Path::new("Chart.yaml"), b"version: \xff\xfe\n")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn explicit_tags_are_refused() {
        let err = parse("version: !python/object/apply:os.system [\"true\"]\n").unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedTag { .. }));
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = parse("name: demo\nversion: 1.0.0\nextra:\n  - !Custom {a: 1}\n").unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedTag { .. }));
    }

    #[test]
    fn merge_keys_are_applied() {
        let content = "\
defaults: &defaults
  version: 3.1.4
chart:
  name: demo
<<: *defaults
";
        assert_eq!(version_of(content).unwrap(), "3.1.4");
    }

    #[test]
    fn explicit_version_wins_over_merge() {
        let content = "\
base: &base
  version: 0.0.1
<<: *base
version: 9.9.9
";
        assert_eq!(version_of(content).unwrap(), "9.9.9");
    }

    #[test]
    fn load_reads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Chart.yaml");
        std::fs::write(&path, "name: demo\nversion: 0.4.2\n").unwrap();

        let doc = ChartDocument::load(&path).unwrap();
        assert_eq!(doc.path(), path.as_path());
        assert_eq!(doc.version().unwrap(), "0.4.2");
        assert_eq!(read_version(&path).unwrap().as_str(), "0.4.2");
    }

    #[test]
    fn load_missing_file_is_file_access_error() {
        let tmp = TempDir::new().unwrap();
        let err = ChartDocument::load(&tmp.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ChartError::FileAccess { .. }));
        assert_eq!(err.kind(), ErrorKind::FileAccess);
    }

    #[test]
    fn load_directory_is_file_access_error() {
        let tmp = TempDir::new().unwrap();
        let err = ChartDocument::load(tmp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileAccess);
    }

    #[test]
    fn reading_twice_is_stable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Chart.yaml");
        std::fs::write(&path, "version: 1.2.3\n").unwrap();

        assert_eq!(read_version(&path).unwrap(), read_version(&path).unwrap());
    }
}
