//! Typed local representation of remote resources.

use crate::attributes::AttributeMap;
use crate::client::ResourceClient;
use crate::kind::ResourceKind;
use ridley_core::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use tracing::debug;
use validator::{ValidationError, ValidationErrors};

/// A single remote resource of kind `K`.
///
/// Equality, ordering, and hashing consider only the identity attribute
/// (`K::DESCRIPTOR.chef_id`); every other attribute is ignored.
pub struct Entity<K: ResourceKind> {
    attributes: AttributeMap,
    kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> Entity<K> {
    /// Construct a local entity, applying the kind's defaults underneath the
    /// supplied attributes.
    #[must_use]
    pub fn new(attributes: impl Into<AttributeMap>) -> Self {
        Self::from_attributes(K::defaults().merged(attributes.into()))
    }

    /// Wrap attributes exactly as given, without defaults.
    #[must_use]
    pub fn from_attributes(attributes: AttributeMap) -> Self {
        Self {
            attributes,
            kind: PhantomData,
        }
    }

    /// Build an entity strictly from a response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the body is not a JSON object.
    pub fn from_response(body: Value) -> Result<Self> {
        AttributeMap::from_value(body).map(Self::from_attributes)
    }

    /// Build an entity holding only its identity attribute.
    #[must_use]
    pub fn from_identity(identity: impl Into<String>) -> Self {
        let mut attributes = AttributeMap::new();
        attributes.set(K::DESCRIPTOR.chef_id, identity.into());
        Self::from_attributes(attributes)
    }

    /// Value of the identity attribute, rendered as a string.
    #[must_use]
    pub fn chef_id(&self) -> Option<String> {
        match self.attributes.get(K::DESCRIPTOR.chef_id)? {
            Value::Null => None,
            Value::String(id) => Some(id.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Raw identity value, if present and not null.
    #[must_use]
    pub fn identity_value(&self) -> Option<&Value> {
        self.attributes
            .get(K::DESCRIPTOR.chef_id)
            .filter(|value| !value.is_null())
    }

    /// Borrow the attributes.
    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Mutably borrow the attributes.
    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    /// Convert into the attributes.
    #[must_use]
    pub fn into_attributes(self) -> AttributeMap {
        self.attributes
    }

    /// Returns the attribute stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Assign a single attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.set(key, value)
    }

    /// Merge `attributes` onto this entity; incoming values win.
    pub fn mass_assign(&mut self, attributes: AttributeMap) {
        self.attributes.merge(attributes);
    }

    /// Copy of the attributes as a plain JSON map.
    #[must_use]
    pub fn to_hash(&self) -> Map<String, Value> {
        self.attributes.as_map().clone()
    }

    /// Serialize the attributes as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.attributes).map_err(Error::from)
    }

    /// Check that every required attribute is present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns one `required` error per missing attribute.
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for &field in K::DESCRIPTOR.required {
            let missing = match self.attributes.get(field) {
                None | Some(Value::Null) => true,
                Some(Value::String(value)) => value.trim().is_empty(),
                Some(_) => false,
            };

            if missing {
                let mut error = ValidationError::new("required");
                error.message = Some(Cow::Owned(format!("{field} is required")));
                errors.add(field, error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Create this entity remotely, falling back to an update when the
    /// identity already exists. The server's response is merged onto `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] without contacting the server if
    /// validation fails; otherwise propagates request failures.
    pub async fn save(&mut self, client: &ResourceClient<K>) -> Result<()> {
        self.validate()?;

        match client.create(&*self).await {
            Ok(created) => {
                self.mass_assign(created.into_attributes());
                Ok(())
            }
            Err(Error::Conflict(message)) => {
                debug!(
                    kind = K::DESCRIPTOR.kind,
                    id = ?self.chef_id(),
                    %message,
                    "Create conflicted, updating instead"
                );
                self.update(client).await
            }
            Err(err) => Err(err),
        }
    }

    /// Push this entity's attributes to the server and merge the response
    /// onto `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] without contacting the server if
    /// validation fails; otherwise propagates request failures.
    pub async fn update(&mut self, client: &ResourceClient<K>) -> Result<()> {
        self.validate()?;

        let updated = client.update(&*self).await?;
        self.mass_assign(updated.into_attributes());
        Ok(())
    }

    /// Replace this entity's attributes with a fresh copy from the server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the resource no longer exists.
    pub async fn reload(&mut self, client: &ResourceClient<K>) -> Result<()> {
        let fresh = client.find_or_fail(&*self).await?;
        self.attributes = fresh.into_attributes();
        Ok(())
    }
}

impl<K: ResourceKind> Clone for Entity<K> {
    fn clone(&self) -> Self {
        Self::from_attributes(self.attributes.clone())
    }
}

impl<K: ResourceKind> fmt::Debug for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &K::DESCRIPTOR.kind)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl<K: ResourceKind> fmt::Display for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chef_id() {
            Some(id) => write!(f, "{} {id}", K::DESCRIPTOR.kind),
            None => write!(f, "{} (unsaved)", K::DESCRIPTOR.kind),
        }
    }
}

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over identity values: by JSON type first, then by content.
fn compare_identity(a: &Value, b: &Value) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    type_rank(a)
        .cmp(&type_rank(b))
        .then_with(|| match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => x.to_string().cmp(&y.to_string()),
            },
            _ => a.to_string().cmp(&b.to_string()),
        })
        .then_with(|| a.to_string().cmp(&b.to_string()))
}

impl<K: ResourceKind> PartialEq for Entity<K> {
    fn eq(&self, other: &Self) -> bool {
        self.identity_value() == other.identity_value()
    }
}

impl<K: ResourceKind> Eq for Entity<K> {}

impl<K: ResourceKind> PartialOrd for Entity<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: ResourceKind> Ord for Entity<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.identity_value(), other.identity_value()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => compare_identity(a, b),
        }
    }
}

impl<K: ResourceKind> Hash for Entity<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let Some(value) = self.identity_value() else {
            0u8.hash(state);
            return;
        };

        type_rank(value).hash(state);
        match value {
            Value::Bool(flag) => flag.hash(state),
            Value::String(id) => id.hash(state),
            Value::Number(number) => number.to_string().hash(state),
            // Containers hash by type only; map equality ignores key order.
            _ => {}
        }
    }
}

impl<K: ResourceKind> Serialize for Entity<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

impl<K: ResourceKind> From<&Entity<K>> for AttributeMap {
    fn from(entity: &Entity<K>) -> Self {
        entity.attributes.clone()
    }
}

impl<K: ResourceKind> From<Entity<K>> for AttributeMap {
    fn from(entity: Entity<K>) -> Self {
        entity.attributes
    }
}

/// Way of naming a resource: either its identity or an entity carrying it.
pub enum Reference<'a, K: ResourceKind> {
    /// Raw identity value.
    Identity(Cow<'a, str>),
    /// Entity whose identity attribute is used.
    Entity(&'a Entity<K>),
}

impl<K: ResourceKind> Reference<'_, K> {
    /// Extract the identity value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the referenced entity has no
    /// identity value.
    pub fn identity(&self) -> Result<String> {
        match self {
            Self::Identity(id) => Ok(id.clone().into_owned()),
            Self::Entity(entity) => entity.chef_id().ok_or_else(|| {
                Error::InvalidRequest(format!(
                    "{} has no `{}` attribute",
                    K::DESCRIPTOR.kind,
                    K::DESCRIPTOR.chef_id
                ))
            }),
        }
    }
}

impl<'a, K: ResourceKind> From<&'a str> for Reference<'a, K> {
    fn from(id: &'a str) -> Self {
        Self::Identity(Cow::Borrowed(id))
    }
}

impl<'a, K: ResourceKind> From<&'a String> for Reference<'a, K> {
    fn from(id: &'a String) -> Self {
        Self::Identity(Cow::Borrowed(id.as_str()))
    }
}

impl<K: ResourceKind> From<String> for Reference<'_, K> {
    fn from(id: String) -> Self {
        Self::Identity(Cow::Owned(id))
    }
}

impl<'a, K: ResourceKind> From<&'a Entity<K>> for Reference<'a, K> {
    fn from(entity: &'a Entity<K>) -> Self {
        Self::Entity(entity)
    }
}
