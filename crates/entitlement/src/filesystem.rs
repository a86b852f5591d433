//! Filesystem entitlements.

use crate::entitlement::string_list;
use crate::{Entitlement, Error, Result, SecurityContext};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

pub const DOMAIN: &str = "filesystem";

/// What a filesystem entitlement does with its paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsRule {
    /// Mount the paths read-only.
    Readonly,
    /// Hide the paths from the process.
    Masked,
    /// Allow bind-mounting the paths.
    Mount,
}

impl FsRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FsRule::Readonly => "readonly",
            FsRule::Masked => "masked",
            FsRule::Mount => "mount",
        }
    }

    fn parse(identifier: &str) -> Option<Self> {
        match identifier {
            "readonly" => Some(FsRule::Readonly),
            "masked" => Some(FsRule::Masked),
            "mount" => Some(FsRule::Mount),
            _ => None,
        }
    }
}

/// Applies a [`FsRule`] to a set of absolute paths.
///
/// Paths are normalized on construction; paths containing `..` are invalid.
///
/// Mounting a masked path (or anything below one) is rejected, and so is
/// masking a path that is already mounted.
#[derive(Debug, Clone, PartialEq)]
pub struct FilesystemEntitlement {
    rule: FsRule,
    paths: Vec<String>,
    value: Value,
}

impl FilesystemEntitlement {
    pub fn new<I, S>(rule: FsRule, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths = paths
            .into_iter()
            .map(|p| {
                let raw: String = p.into();
                normalize(rule, &raw)
            })
            .collect::<Result<Vec<_>>>()?;

        let value = Value::Array(paths.iter().cloned().map(Value::String).collect());
        Ok(Self { rule, paths, value })
    }

    pub fn readonly<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FsRule::Readonly, paths)
    }

    pub fn masked<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FsRule::Masked, paths)
    }

    pub fn mount<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FsRule::Mount, paths)
    }

    /// Build from profile data.
    pub fn from_parts(identifier: &str, value: &Value) -> Result<Self> {
        let rule = FsRule::parse(identifier).ok_or_else(|| Error::Unknown {
            domain: DOMAIN.to_string(),
            identifier: identifier.to_string(),
        })?;
        Self::new(rule, string_list(identifier, value)?)
    }

    pub fn rule(&self) -> FsRule {
        self.rule
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

/// Lexically normalize an absolute path: repeated and trailing separators
/// and `.` components are dropped, `..` is refused.
fn normalize(rule: FsRule, raw: &str) -> Result<String> {
    if !raw.starts_with('/') {
        return Err(Error::invalid_value(
            rule.as_str(),
            format!("path '{raw}' is not absolute"),
        ));
    }

    let mut normalized = PathBuf::from("/");
    for component in Path::new(raw).components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(part) => normalized.push(part),
            Component::ParentDir | Component::Prefix(_) => {
                return Err(Error::invalid_value(
                    rule.as_str(),
                    format!("path '{raw}' must not contain '..'"),
                ));
            }
        }
    }
    Ok(normalized.to_string_lossy().into_owned())
}

/// `path` equals `base` or lies below it, compared component by component.
fn is_within(path: &str, base: &str) -> bool {
    Path::new(path).starts_with(base)
}

impl Entitlement for FilesystemEntitlement {
    fn identifier(&self) -> Result<&str> {
        Ok(self.rule.as_str())
    }

    fn domain(&self) -> Result<&str> {
        Ok(DOMAIN)
    }

    fn value(&self) -> Result<&Value> {
        Ok(&self.value)
    }

    fn enforce(&self, context: &SecurityContext) -> Result<SecurityContext> {
        let mut next = context.clone();

        for path in &self.paths {
            match self.rule {
                FsRule::Readonly => {
                    next.readonly_paths.insert(path.clone());
                }
                FsRule::Masked => {
                    if let Some(mount) = next.mounts.iter().find(|m| is_within(m, path)) {
                        return Err(Error::Rejected(format!(
                            "cannot mask {path}: {mount} is mounted"
                        )));
                    }
                    next.masked_paths.insert(path.clone());
                }
                FsRule::Mount => {
                    if let Some(masked) = next.masked_paths.iter().find(|m| is_within(path, m)) {
                        return Err(Error::Rejected(format!(
                            "cannot mount {path}: {masked} is masked"
                        )));
                    }
                    next.mounts.insert(path.clone());
                }
            }
        }

        next.touch();
        Ok(next)
    }
}
