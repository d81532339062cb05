//! Per-type resource descriptors.

use crate::attributes::AttributeMap;
use std::borrow::Cow;

/// Immutable description of a remote resource collection.
///
/// Declared once per kind as an associated constant and copied into each
/// [`ResourceClient`](crate::ResourceClient) bound to that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Type tag, e.g. `node`.
    pub kind: &'static str,
    /// Name of the identity attribute.
    pub chef_id: &'static str,
    /// Explicit collection path; defaults to the pluralized type tag.
    pub resource_path: Option<&'static str>,
    /// Attributes that must be present and non-empty to pass validation.
    pub required: &'static [&'static str],
}

impl ResourceDescriptor {
    /// Describe a kind with its type tag and identity attribute.
    #[must_use]
    pub const fn new(kind: &'static str, chef_id: &'static str) -> Self {
        Self {
            kind,
            chef_id,
            resource_path: None,
            required: &[],
        }
    }

    /// Override the collection path.
    #[must_use]
    pub const fn with_resource_path(mut self, path: &'static str) -> Self {
        self.resource_path = Some(path);
        self
    }

    /// Declare the required attributes.
    #[must_use]
    pub const fn with_required(mut self, required: &'static [&'static str]) -> Self {
        self.required = required;
        self
    }

    /// Collection path relative to the connection's base URL.
    #[must_use]
    pub fn resource_path(&self) -> Cow<'static, str> {
        match self.resource_path {
            Some(path) => Cow::Borrowed(path),
            None => Cow::Owned(format!("{}s", self.kind)),
        }
    }
}

/// Marker trait tying an entity type to its remote collection.
pub trait ResourceKind: Send + Sync + 'static {
    /// Descriptor for this kind.
    const DESCRIPTOR: ResourceDescriptor;

    /// Attributes assigned to locally constructed entities before caller
    /// supplied values are applied.
    fn defaults() -> AttributeMap {
        AttributeMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_path_defaults_to_plural_tag() {
        let descriptor = ResourceDescriptor::new("role", "name");
        assert_eq!(descriptor.resource_path(), "roles");
    }

    #[test]
    fn explicit_resource_path_wins() {
        let descriptor = ResourceDescriptor::new("data_bag", "name").with_resource_path("data");
        assert_eq!(descriptor.resource_path(), "data");
    }

    #[test]
    fn required_attributes_are_recorded() {
        const DESCRIPTOR: ResourceDescriptor =
            ResourceDescriptor::new("client", "name").with_required(&["name"]);
        assert_eq!(DESCRIPTOR.required, &["name"]);
        assert_eq!(DESCRIPTOR.chef_id, "name");
    }
}
