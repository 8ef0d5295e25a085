//! Platform tags and the platform-conditional configure override table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker identifying Linux platform tags (`linux-x86_64`,
/// `cpython-311-x86_64-linux-gnu`, ...).
pub const LINUX_MARKER: &str = "linux";

/// Identifies the platform the bindings are packaged for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformTag(String);

impl PlatformTag {
    pub fn new(tag: impl Into<String>) -> Self {
        PlatformTag(tag.into())
    }

    /// Tag of the running host, e.g. `linux-x86_64`.
    pub fn host() -> Self {
        PlatformTag(format!(
            "{}-{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.0.contains(marker)
    }

    pub fn is_linux(&self) -> bool {
        self.contains(LINUX_MARKER)
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the override table: when the tag contains `contains`,
/// `args` are appended to the configure invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRule {
    /// Substring the platform tag must contain
    pub contains: String,

    /// Extra configure arguments, usually `VAR=value` overrides
    #[serde(default)]
    pub args: Vec<String>,
}

impl PlatformRule {
    pub fn new(contains: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        PlatformRule {
            contains: contains.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, tag: &PlatformTag) -> bool {
        tag.contains(&self.contains)
    }
}

/// Declarative platform predicate -> extra configure flags table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformTable {
    rules: Vec<PlatformRule>,
}

impl PlatformTable {
    pub fn new(rules: Vec<PlatformRule>) -> Self {
        PlatformTable { rules }
    }

    pub fn rules(&self) -> &[PlatformRule] {
        &self.rules
    }

    /// Extra arguments for `tag`, in table order.
    pub fn extra_args(&self, tag: &PlatformTag) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(tag))
            .flat_map(|rule| rule.args.iter().cloned())
            .collect()
    }

    /// Extra arguments for `tag`, extending variables already set in the
    /// caller's environment.
    ///
    /// configure lets a `VAR=value` argument shadow `VAR` from the
    /// environment, so `LDFLAGS=-Wl,...` with `LDFLAGS=-L/opt/lib` inherited
    /// becomes `LDFLAGS=-L/opt/lib -Wl,...`.
    pub fn extra_args_inheriting<F>(&self, tag: &PlatformTag, inherited: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.extra_args(tag)
            .into_iter()
            .map(|arg| extend_assignment(&arg, &inherited))
            .collect()
    }
}

fn extend_assignment<F>(arg: &str, inherited: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let Some((var, value)) = arg.split_once('=') else {
        return arg.to_string();
    };
    if var.is_empty() || var.starts_with('-') {
        return arg.to_string();
    }
    match inherited(var) {
        Some(existing) if !existing.trim().is_empty() => {
            format!("{}={} {}", var, existing.trim(), value)
        }
        _ => arg.to_string(),
    }
}

impl Default for PlatformTable {
    /// Linux bindings are linked without the interpreter library, so the
    /// shared object is allowed to carry the interpreter's symbols
    /// unresolved until load time.
    fn default() -> Self {
        PlatformTable::new(vec![PlatformRule::new(
            LINUX_MARKER,
            ["LDFLAGS=-Wl,--allow-shlib-undefined"],
        )])
    }
}
