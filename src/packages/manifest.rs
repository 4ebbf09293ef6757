//! The package requirement set.
//!
//! Requirements come from the manifest file when it exists, otherwise from
//! the configured default package list. A missing or unreadable manifest is
//! never fatal.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Leading project name of a requirement specifier.
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)")
        .expect("NAME_REGEX must compile")
});

/// `name @ url` and `name[extras] @ url` direct references.
static DIRECT_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*\s*(?:\[[^\]]*\])?\s*@")
        .expect("DIRECT_REFERENCE_REGEX must compile")
});

/// A `#` at line start or after whitespace begins a comment, as pip reads it.
static COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#.*$").expect("COMMENT_REGEX must compile"));

/// Separator runs collapsed by name normalization.
static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("SEPARATOR_REGEX must compile"));

/// Normalize a project name so `Foo_Bar`, `foo.bar` and `foo-bar` compare equal.
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_REGEX
        .replace_all(&name.trim().to_lowercase(), "-")
        .into_owned()
}

/// One line of the requirement set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    spec: String,
    name: Option<String>,
}

impl Requirement {
    /// Parse a specifier such as `pandas>=2.0` or `akshare`.
    ///
    /// Option lines (`-r other.txt`, `--index-url …`) and bare URLs have no
    /// project name; they are still passed to the installer. A direct
    /// reference (`akshare @ https://…`) is named by its left-hand side.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim().to_string();
        let name = if spec.starts_with('-') {
            None
        } else if spec.contains("://") && !DIRECT_REFERENCE_REGEX.is_match(&spec) {
            None
        } else {
            NAME_REGEX
                .captures(&spec)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        };
        Self { spec, name }
    }

    /// The specifier as written.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// The project name, if the line names one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

/// Where the requirement set came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum RequirementSource {
    /// Read from a manifest file.
    Manifest(PathBuf),
    /// The built-in default list.
    Defaults,
}

impl fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("default package list"),
        }
    }
}

/// Ordered set of packages the analysis program needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementSet {
    source: RequirementSource,
    requirements: Vec<Requirement>,
}

impl RequirementSet {
    /// The default list, used when there is no manifest.
    pub fn defaults(packages: &[String]) -> Self {
        Self {
            source: RequirementSource::Defaults,
            requirements: packages.iter().map(|p| Requirement::parse(p)).collect(),
        }
    }

    /// Parse manifest content; blank lines and `#` comments are skipped.
    pub fn from_manifest(path: &Path, content: &str) -> Self {
        let requirements = content
            .lines()
            .map(|line| COMMENT_REGEX.replace(line, ""))
            .filter(|line| !line.trim().is_empty())
            .map(|line| Requirement::parse(&line))
            .collect();

        Self {
            source: RequirementSource::Manifest(path.to_path_buf()),
            requirements,
        }
    }

    /// Load from `manifest` if present, else fall back to `defaults`.
    pub fn load(manifest: &Path, defaults: &[String]) -> Self {
        if !manifest.is_file() {
            tracing::debug!(
                "No manifest at {}; using default packages",
                manifest.display()
            );
            return Self::defaults(defaults);
        }

        match fs::read_to_string(manifest) {
            Ok(content) => Self::from_manifest(manifest, &content),
            Err(e) => {
                tracing::warn!(
                    "Cannot read {} ({}); using default packages",
                    manifest.display(),
                    e
                );
                Self::defaults(defaults)
            }
        }
    }

    /// Where the set came from.
    pub fn source(&self) -> &RequirementSource {
        &self.source
    }

    /// All requirements, in order.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Project names in order, without duplicates.
    pub fn names(&self) -> Vec<&str> {
        let mut seen = Vec::<String>::new();
        let mut names = Vec::new();
        for name in self.requirements.iter().filter_map(Requirement::name) {
            let normalized = normalize_name(name);
            if !seen.contains(&normalized) {
                seen.push(normalized);
                names.push(name);
            }
        }
        names
    }

    /// Number of requirement lines.
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Whether the set has no requirement lines.
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn defaults() -> Vec<String> {
        vec!["akshare".into(), "pandas".into(), "numpy".into()]
    }

    #[test]
    fn normalize_collapses_separators_and_case() {
        assert_eq!(normalize_name("Foo_Bar"), "foo-bar");
        assert_eq!(normalize_name("foo.bar"), "foo-bar");
        assert_eq!(normalize_name("foo__-.bar"), "foo-bar");
        assert_eq!(normalize_name(" AkShare "), "akshare");
    }

    #[test]
    fn requirement_name_stops_at_specifier() {
        assert_eq!(Requirement::parse("pandas>=2.0").name(), Some("pandas"));
        assert_eq!(Requirement::parse("numpy==1.26.4").name(), Some("numpy"));
        assert_eq!(Requirement::parse("requests[socks]").name(), Some("requests"));
        assert_eq!(
            Requirement::parse("typing_extensions; python_version<'3.11'").name(),
            Some("typing_extensions")
        );
        assert_eq!(Requirement::parse("akshare").name(), Some("akshare"));
    }

    #[test]
    fn option_lines_have_no_name() {
        assert_eq!(Requirement::parse("-r base.txt").name(), None);
        assert_eq!(Requirement::parse("--index-url https://x").name(), None);
        assert_eq!(
            Requirement::parse("https://example.com/pkg.whl").name(),
            None
        );
        assert_eq!(Requirement::parse("-r base.txt").spec(), "-r base.txt");
    }

    #[test]
    fn manifest_skips_comments_and_blanks() {
        let content = "# data\nakshare>=1.10\n\npandas  # frames\n   \nnumpy\n";
        let set = RequirementSet::from_manifest(Path::new("requirements.txt"), content);

        assert_eq!(set.len(), 3);
        assert_eq!(set.names(), vec!["akshare", "pandas", "numpy"]);
        assert_eq!(set.requirements()[1].spec(), "pandas");
    }

    #[test]
    fn comments_after_tabs_are_stripped() {
        let content = "pandas\t# frames\nnumpy\t\t#arrays\n\t# indented comment\n";
        let set = RequirementSet::from_manifest(Path::new("requirements.txt"), content);

        assert_eq!(set.len(), 2);
        assert_eq!(set.requirements()[0].spec(), "pandas");
        assert_eq!(set.requirements()[1].spec(), "numpy");
    }

    #[test]
    fn url_fragments_are_not_comments() {
        let content = "akshare @ https://example.com/akshare-1.3.0.whl#sha256=abc\n";
        let set = RequirementSet::from_manifest(Path::new("requirements.txt"), content);

        assert_eq!(
            set.requirements()[0].spec(),
            "akshare @ https://example.com/akshare-1.3.0.whl#sha256=abc"
        );
    }

    #[test]
    fn direct_references_are_named() {
        assert_eq!(
            Requirement::parse("akshare @ https://example.com/akshare-1.3.0.whl").name(),
            Some("akshare")
        );
        assert_eq!(
            Requirement::parse("pandas[excel]@https://example.com/pandas.whl").name(),
            Some("pandas")
        );
        assert_eq!(
            Requirement::parse("git+https://example.com/repo.git").name(),
            None
        );
    }

    #[test]
    fn direct_reference_is_presence_checked() {
        let content = "AkShare @ https://example.com/akshare.whl\npandas\n";
        let set = RequirementSet::from_manifest(Path::new("requirements.txt"), content);

        assert_eq!(set.names(), vec!["AkShare", "pandas"]);
    }

    #[test]
    fn names_are_deduplicated_after_normalization() {
        let set = RequirementSet::defaults(&[
            "Foo_Bar".to_string(),
            "foo-bar>=1".to_string(),
            "baz".to_string(),
        ]);
        assert_eq!(set.names(), vec!["Foo_Bar", "baz"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn missing_manifest_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let set = RequirementSet::load(&temp.path().join("requirements.txt"), &defaults());

        assert_eq!(set.source(), &RequirementSource::Defaults);
        assert_eq!(set.names(), vec!["akshare", "pandas", "numpy"]);
    }

    #[test]
    fn existing_manifest_is_used() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("requirements.txt");
        fs::write(&manifest, "akshare\nmatplotlib\n").unwrap();

        let set = RequirementSet::load(&manifest, &defaults());

        assert_eq!(set.source(), &RequirementSource::Manifest(manifest));
        assert_eq!(set.names(), vec!["akshare", "matplotlib"]);
    }

    #[test]
    fn manifest_directory_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("requirements.txt");
        fs::create_dir_all(&manifest).unwrap();

        let set = RequirementSet::load(&manifest, &defaults());

        assert_eq!(set.source(), &RequirementSource::Defaults);
    }

    #[test]
    fn source_display() {
        assert_eq!(RequirementSource::Defaults.to_string(), "default package list");
        assert_eq!(
            RequirementSource::Manifest(PathBuf::from("requirements.txt")).to_string(),
            "requirements.txt"
        );
    }
}
