//! Generic CRUD client for a remote resource collection.

use crate::attributes::AttributeMap;
use crate::entity::{Entity, Reference};
use crate::kind::ResourceKind;
use crossbeam::queue::SegQueue;
use ridley_core::{Connection, Error, Result};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// CRUD client for the collection of kind `K`.
///
/// Entities are built fresh for every call; nothing is cached between calls.
pub struct ResourceClient<K: ResourceKind> {
    connection: Arc<dyn Connection>,
    resource_path: Arc<str>,
    kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> ResourceClient<K> {
    /// Bind the kind's collection to a connection.
    #[must_use]
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            resource_path: Arc::from(K::DESCRIPTOR.resource_path()),
            kind: PhantomData,
        }
    }

    /// Override the collection path, e.g. to reach an organization-scoped
    /// collection.
    #[must_use]
    pub fn with_resource_path(mut self, path: impl AsRef<str>) -> Self {
        self.resource_path = Arc::from(path.as_ref().trim_matches('/'));
        self
    }

    /// Collection path used by this client.
    #[must_use]
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// Connection used by this client.
    #[must_use]
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    fn member_path(&self, id: &str) -> String {
        format!("{}/{id}", self.resource_path)
    }

    /// List every resource in the collection.
    ///
    /// The collection index maps identities to locations; each returned
    /// entity carries only its identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the index is not a JSON object, or any
    /// transport error.
    pub async fn all(&self) -> Result<Vec<Entity<K>>> {
        let body = self.connection.get(&self.resource_path).await?;
        let Value::Object(index) = body else {
            return Err(Error::ParseError(format!(
                "expected an index object from `{}`",
                self.resource_path
            )));
        };

        debug!(path = %self.resource_path, count = index.len(), "Listed resources");
        Ok(index
            .into_iter()
            .map(|(identity, _location)| Entity::from_identity(identity))
            .collect())
    }

    /// Fetch a single resource, returning `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Propagates every failure except [`Error::NotFound`].
    pub async fn find<'a>(
        &self,
        reference: impl Into<Reference<'a, K>>,
    ) -> Result<Option<Entity<K>>> {
        match self.find_or_fail(reference).await {
            Ok(entity) => Ok(Some(entity)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Fetch a single resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the resource does not exist.
    pub async fn find_or_fail<'a>(
        &self,
        reference: impl Into<Reference<'a, K>>,
    ) -> Result<Entity<K>> {
        let id = reference.into().identity()?;
        let body = self.connection.get(&self.member_path(&id)).await?;
        Entity::from_response(body)
    }

    /// Create a resource and return it with the server's response merged
    /// over the submitted attributes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the identity is already taken.
    pub async fn create(&self, object: impl Into<AttributeMap>) -> Result<Entity<K>> {
        let mut entity = Entity::<K>::new(object);
        let body = entity.attributes().to_value();

        let response = self.connection.post(&self.resource_path, &body).await?;
        entity.mass_assign(AttributeMap::from_value(response)?);

        debug!(kind = K::DESCRIPTOR.kind, id = ?entity.chef_id(), "Created resource");
        Ok(entity)
    }

    /// Replace a resource and return exactly what the server sent back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the object has no identity, or
    /// [`Error::NotFound`] if the resource does not exist.
    pub async fn update(&self, object: impl Into<AttributeMap>) -> Result<Entity<K>> {
        let entity = Entity::<K>::new(object);
        let id = Reference::from(&entity).identity()?;

        let response = self
            .connection
            .put(&self.member_path(&id), &entity.attributes().to_value())
            .await?;

        debug!(kind = K::DESCRIPTOR.kind, %id, "Updated resource");
        Entity::from_response(response)
    }

    /// Delete a resource and return the server's representation of it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the resource does not exist.
    pub async fn delete<'a>(&self, reference: impl Into<Reference<'a, K>>) -> Result<Entity<K>> {
        let id = reference.into().identity()?;
        self.delete_member(&id).await
    }

    async fn delete_member(&self, id: &str) -> Result<Entity<K>> {
        let response = self.connection.delete(&self.member_path(id)).await?;

        debug!(kind = K::DESCRIPTOR.kind, %id, "Deleted resource");
        Entity::from_response(response)
    }

    /// Delete every resource in the collection concurrently.
    ///
    /// The full listing is fetched first, then up to
    /// [`Connection::thread_count`] workers drain a shared worklist. Results
    /// are returned in completion order.
    ///
    /// The first failing delete aborts the whole call. Deletions that had
    /// already completed are not reported.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the listing or by any worker.
    pub async fn delete_all(&self) -> Result<Vec<Entity<K>>> {
        let entities = self.all().await?;
        let total = entities.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let worklist = Arc::new(SegQueue::new());
        for entity in entities {
            worklist.push(entity);
        }

        let workers = self.connection.thread_count().clamp(1, total);
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();

        for _ in 0..workers {
            let client = self.clone();
            let worklist = Arc::clone(&worklist);
            let sender = sender.clone();

            tasks.spawn(async move {
                while let Some(entity) = worklist.pop() {
                    let id = Reference::from(&entity).identity()?;
                    let deleted = client.delete_member(&id).await?;
                    if sender.send(deleted).is_err() {
                        break;
                    }
                }
                Ok::<(), Error>(())
            });
        }
        drop(sender);

        debug!(kind = K::DESCRIPTOR.kind, total, workers, "Deleting all resources");

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.unwrap_or_else(|err| {
                Err(Error::InternalError(format!("delete worker failed: {err}")))
            });

            if let Err(err) = outcome {
                if err.should_log() {
                    error!(kind = K::DESCRIPTOR.kind, error = %err, "Bulk delete aborted");
                } else {
                    warn!(kind = K::DESCRIPTOR.kind, error = %err, "Bulk delete aborted");
                }
                tasks.abort_all();
                return Err(err);
            }
        }

        let mut deleted = Vec::with_capacity(total);
        while let Some(entity) = receiver.recv().await {
            deleted.push(entity);
        }
        Ok(deleted)
    }
}

impl<K: ResourceKind> Clone for ResourceClient<K> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            resource_path: Arc::clone(&self.resource_path),
            kind: PhantomData,
        }
    }
}

impl<K: ResourceKind> fmt::Debug for ResourceClient<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("kind", &K::DESCRIPTOR.kind)
            .field("resource_path", &self.resource_path)
            .finish_non_exhaustive()
    }
}
