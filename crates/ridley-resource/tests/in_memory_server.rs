//! Round trips against a stateful in-process connection.

use async_trait::async_trait;
use ridley_core::{Connection, Error, Result};
use ridley_resource::{AttributeMap, ClientKind, Environment, EnvironmentKind, ResourceClient};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Stores objects per collection and assigns a server-side `uri` on create.
struct InMemoryConnection {
    store: Mutex<BTreeMap<String, Map<String, Value>>>,
    deletes: AtomicUsize,
    thread_count: usize,
}

impl InMemoryConnection {
    fn new(thread_count: usize) -> Self {
        Self {
            store: Mutex::new(BTreeMap::new()),
            deletes: AtomicUsize::new(0),
            thread_count,
        }
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn get(&self, path: &str) -> Result<Value> {
        let store = self.store.lock().unwrap();
        if let Some(object) = store.get(path) {
            return Ok(Value::Object(object.clone()));
        }

        let prefix = format!("{path}/");
        let index: Map<String, Value> = store
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(|id| (id.to_string(), json!(format!("/{path}/{id}"))))
            .collect();
        Ok(Value::Object(index))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let name = body["name"].as_str().unwrap_or_default().to_string();
        let key = format!("{path}/{name}");
        let mut store = self.store.lock().unwrap();
        if store.contains_key(&key) {
            return Err(Error::Conflict(format!("{key} already exists")));
        }

        let mut object = body.as_object().cloned().unwrap_or_default();
        object.insert("uri".into(), json!(format!("/{key}")));
        store.insert(key.clone(), object);
        Ok(json!({ "uri": format!("/{key}") }))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        let mut store = self.store.lock().unwrap();
        if !store.contains_key(path) {
            return Err(Error::NotFound(path.to_string()));
        }
        let object = body.as_object().cloned().unwrap_or_default();
        store.insert(path.to_string(), object.clone());
        Ok(Value::Object(object))
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        let removed = self.store.lock().unwrap().remove(path);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        removed
            .map(Value::Object)
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    fn thread_count(&self) -> usize {
        self.thread_count
    }
}

fn attrs(value: Value) -> AttributeMap {
    AttributeMap::from_value(value).unwrap()
}

#[tokio::test]
async fn create_then_find_keeps_submitted_and_server_fields() {
    let connection = Arc::new(InMemoryConnection::new(2));
    let environments: ResourceClient<EnvironmentKind> = ResourceClient::new(connection);

    let submitted = attrs(json!({
        "name": "production",
        "cookbook_versions": { "nginx": ">= 2.0.0" }
    }));
    let created = environments.create(submitted.clone()).await.unwrap();
    let found = environments.find("production").await.unwrap().unwrap();

    for (key, value) in submitted.iter() {
        assert_eq!(found.get(key), Some(value));
    }
    assert_eq!(found.get("uri"), Some(&json!("/environments/production")));
    assert_eq!(created.get("uri"), found.get("uri"));
}

#[tokio::test]
async fn save_twice_updates_existing_resource() {
    let connection = Arc::new(InMemoryConnection::new(2));
    let environments: ResourceClient<EnvironmentKind> = ResourceClient::new(connection);

    let mut env = Environment::new(attrs(json!({ "name": "staging" })));
    env.save(&environments).await.unwrap();

    env.set("description", "pre-production");
    let mut replacement = Environment::new(env.attributes().clone());
    replacement.save(&environments).await.unwrap();

    let stored = environments.find_or_fail("staging").await.unwrap();
    assert_eq!(stored.description(), Some("pre-production"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn delete_all_empties_the_collection() {
    for (count, threads) in [(1, 1), (4, 1), (9, 3), (16, 16), (2, 8)] {
        let connection = Arc::new(InMemoryConnection::new(threads));
        let clients: ResourceClient<ClientKind> = ResourceClient::new(connection.clone());

        for i in 0..count {
            clients
                .create(attrs(json!({ "name": format!("client-{i}") })))
                .await
                .unwrap();
        }

        let deleted = clients.delete_all().await.unwrap();
        let mut ids: Vec<String> = deleted.iter().filter_map(|c| c.chef_id()).collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), count);
        assert_eq!(deleted.len(), count);
        assert_eq!(connection.deletes.load(Ordering::SeqCst), count);
        assert!(clients.all().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn delete_missing_resource_is_not_found() {
    let connection = Arc::new(InMemoryConnection::new(1));
    let clients: ResourceClient<ClientKind> = ResourceClient::new(connection);

    assert!(matches!(
        clients.delete("ghost").await,
        Err(Error::NotFound(_))
    ));
}
