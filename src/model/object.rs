// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::ids::TransportId;

/// The development-object kinds this server can drive through the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
    Domain,
    DataElement,
    Class,
    Interface,
    FunctionGroup,
    View,
    Package,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 7] = [
        ObjectKind::Domain,
        ObjectKind::DataElement,
        ObjectKind::Class,
        ObjectKind::Interface,
        ObjectKind::FunctionGroup,
        ObjectKind::View,
        ObjectKind::Package,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::DataElement => "data_element",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::FunctionGroup => "function_group",
            Self::View => "view",
            Self::Package => "package",
        }
    }

    /// Collection segment in remote endpoint paths.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Domain => "domains",
            Self::DataElement => "data-elements",
            Self::Class => "classes",
            Self::Interface => "interfaces",
            Self::FunctionGroup => "function-groups",
            Self::View => "views",
            Self::Package => "packages",
        }
    }

    /// Kinds whose content is a source text (as opposed to attribute records).
    pub fn has_source(self) -> bool {
        matches!(self, Self::Class | Self::Interface | Self::View)
    }

    /// Kinds that support a standalone syntax/consistency check.
    pub fn checkable(self) -> bool {
        self.has_source()
    }

    /// Packages are organizational containers and are never activated.
    pub fn activatable(self) -> bool {
        !matches!(self, Self::Package)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = ParseObjectKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseObjectKindError {
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseObjectKindError {
    value: String,
}

impl fmt::Display for ParseObjectKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown object kind '{}' (expected one of: domain, data_element, class, interface, function_group, view, package)",
            self.value
        )
    }
}

impl std::error::Error for ParseObjectKindError {}

/// A target package. Names starting with `$` are local (not transportable).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackageName {
    value: String,
}

impl PackageName {
    pub fn new(value: impl Into<String>) -> Result<Self, DescriptorError> {
        let value = value.into();
        if !package_pattern().is_match(&value) {
            return Err(DescriptorError::InvalidPackage { package: value });
        }
        Ok(Self { value })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_local(&self) -> bool {
        self.value.starts_with('$')
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Identity of one development object; immutable once a workflow run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    name: String,
    kind: ObjectKind,
    package: PackageName,
    transport: Option<TransportId>,
}

impl ObjectDescriptor {
    pub fn new(
        name: impl Into<String>,
        kind: ObjectKind,
        package: PackageName,
        transport: Option<TransportId>,
    ) -> Result<Self, DescriptorError> {
        let name = name.into();
        if !name_pattern().is_match(&name) {
            return Err(DescriptorError::InvalidName { name });
        }
        Ok(Self {
            name,
            kind,
            package,
            transport,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn package(&self) -> &PackageName {
        &self.package
    }

    pub fn transport(&self) -> Option<&TransportId> {
        self.transport.as_ref()
    }

    /// Non-local packages group changes via a transport request.
    pub fn requires_transport(&self) -> bool {
        !self.package.is_local()
    }

    pub fn ensure_transport(&self) -> Result<(), DescriptorError> {
        if self.requires_transport() && self.transport.is_none() {
            return Err(DescriptorError::MissingTransport {
                package: self.package.as_str().to_owned(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    InvalidName { name: String },
    InvalidPackage { package: String },
    MissingTransport { package: String },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { name } => {
                write!(
                    f,
                    "invalid object name '{name}' (letter first, then letters/digits/underscores, at most 30 chars)"
                )
            }
            Self::InvalidPackage { package } => {
                write!(f, "invalid package name '{package}'")
            }
            Self::MissingTransport { package } => {
                write!(
                    f,
                    "package '{package}' is transportable and requires a transport request"
                )
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,29}$").expect("valid pattern"))
}

fn package_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\$?[A-Za-z][A-Za-z0-9_]{0,29}$").expect("valid pattern"))
}

/// The content a mutating run applies: free-text description, optional source
/// text, and per-kind attribute records. Which parts are used is up to the
/// object kind's adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPayload {
    description: Option<String>,
    source: Option<String>,
    attributes: BTreeMap<String, Value>,
}

impl ObjectPayload {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::{DescriptorError, ObjectDescriptor, ObjectKind, PackageName};
    use crate::model::TransportId;

    fn local_package() -> PackageName {
        PackageName::new("$TMP").expect("valid package")
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in ObjectKind::ALL {
            assert_eq!(kind.as_str().parse::<ObjectKind>(), Ok(kind));
        }
    }

    #[test]
    fn kind_parse_rejects_unknown() {
        assert!("report".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn descriptor_rejects_bad_names() {
        for name in ["", "1BAD", "HAS SPACE", "WAY_TOO_LONG_FOR_A_REPOSITORY_OBJECT_NAME"] {
            let result = ObjectDescriptor::new(name, ObjectKind::Domain, local_package(), None);
            assert!(
                matches!(result, Err(DescriptorError::InvalidName { .. })),
                "accepted: {name}"
            );
        }
    }

    #[test]
    fn package_rejects_bad_names() {
        assert!(PackageName::new("$").is_err());
        assert!(PackageName::new("NO SPACES").is_err());
        assert!(PackageName::new("$TMP").expect("valid").is_local());
        assert!(!PackageName::new("ZBASIS").expect("valid").is_local());
    }

    #[test]
    fn local_package_needs_no_transport() {
        let descriptor = ObjectDescriptor::new("Z_DATE", ObjectKind::Domain, local_package(), None)
            .expect("valid descriptor");
        assert!(!descriptor.requires_transport());
        descriptor.ensure_transport().expect("no transport needed");
    }

    #[test]
    fn transportable_package_requires_transport() {
        let package = PackageName::new("ZBASIS").expect("valid package");
        let descriptor = ObjectDescriptor::new("Z_DATE", ObjectKind::Domain, package.clone(), None)
            .expect("valid descriptor");
        assert!(matches!(
            descriptor.ensure_transport(),
            Err(DescriptorError::MissingTransport { .. })
        ));

        let transport = TransportId::new("K900042").expect("valid transport");
        let descriptor =
            ObjectDescriptor::new("Z_DATE", ObjectKind::Domain, package, Some(transport))
                .expect("valid descriptor");
        descriptor.ensure_transport().expect("transport present");
    }

    #[test]
    fn source_and_check_capabilities_follow_kind() {
        assert!(ObjectKind::Class.has_source());
        assert!(ObjectKind::View.checkable());
        assert!(!ObjectKind::Domain.has_source());
        assert!(!ObjectKind::FunctionGroup.has_source());
        assert!(!ObjectKind::Package.activatable());
        assert!(ObjectKind::FunctionGroup.activatable());
    }
}
