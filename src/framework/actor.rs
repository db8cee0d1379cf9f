//! # Generic Actor Server
//!
//! `ResourceActor` owns the store for one entity type and processes every request
//! sequentially. That sequential loop is what makes check-then-insert on a unique key
//! atomic: no other request can interleave between the lookup and the insert.

use super::client::ResourceClient;
use super::entity::ActorEntity;
use super::error::FrameworkError;
use super::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` returns the actor (server) and a client.
/// 2.  **Wire**: pass dependencies into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// # Operations
///
/// * **Create**: allocates the next `u32` id, builds the entity with `from_create_params`,
///   rejects it with `Conflict` if its `unique_key` is taken, runs `on_create`, then stores it.
///   A failing `on_create` leaves no trace in the store.
/// * **Get**: clone of the stored entity, or `None`.
/// * **Update**: runs `on_update` on the stored entity and returns the new state.
/// * **Delete**: runs `on_delete`, then removes the entity and its unique key.
/// * **Action**: runs `handle_action` and returns its result.
/// * **Query**: clones of all entities matching the filter.
/// * **Purge**: removes all entities matching the filter (hooks are not run).
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    unique_index: HashMap<String, T::Id>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the mailbox capacity; when it is full, client calls wait.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            unique_index: HashMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    ///
    /// The `context` is injected into every entity hook.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "Order" instead of "order_fulfillment::model::order::Order")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);

                    let mut item = match T::from_create_params(id.clone(), params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };

                    let key = item.unique_key();
                    if let Some(key) = &key {
                        if let Some(existing) = self.unique_index.get(key) {
                            info!(entity_type, %key, %existing, "Duplicate key");
                            let _ = respond_to.send(Err(FrameworkError::Conflict(key.clone())));
                            continue;
                        }
                    }

                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }

                    self.next_id += 1;
                    if let Some(key) = key {
                        self.unique_index.insert(key, id.clone());
                    }
                    self.store.insert(id.clone(), item);
                    info!(entity_type, %id, size = self.store.len(), "Created");
                    let _ = respond_to.send(Ok(id));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    if let Some(item) = self.store.get_mut(&id) {
                        if let Err(e) = item.on_update(update, &context).await {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        info!(entity_type, %id, "Updated");
                        let _ = respond_to.send(Ok(item.clone()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    if let Some(item) = self.store.get(&id) {
                        if let Err(e) = item.on_delete(&context).await {
                            warn!(entity_type, %id, error = %e, "on_delete failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        if let Some(item) = self.store.remove(&id) {
                            if let Some(key) = item.unique_key() {
                                self.unique_index.remove(&key);
                            }
                        }
                        info!(entity_type, %id, size = self.store.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        match &result {
                            Ok(_) => info!(entity_type, %id, "Action ok"),
                            Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Query { filter, respond_to } => {
                    let matches: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| filter(item))
                        .cloned()
                        .collect();
                    debug!(entity_type, matched = matches.len(), "Query");
                    let _ = respond_to.send(Ok(matches));
                }
                ResourceRequest::Purge { filter, respond_to } => {
                    let doomed: Vec<T::Id> = self
                        .store
                        .iter()
                        .filter(|(_, item)| filter(item))
                        .map(|(id, _)| id.clone())
                        .collect();
                    for id in &doomed {
                        if let Some(item) = self.store.remove(id) {
                            if let Some(key) = item.unique_key() {
                                self.unique_index.remove(&key);
                            }
                        }
                    }
                    info!(entity_type, removed = doomed.len(), size = self.store.len(), "Purged");
                    let _ = respond_to.send(Ok(doomed.len()));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug)]
    struct Ticket {
        id: u32,
        code: String,
        open: bool,
    }

    #[derive(Debug)]
    struct TicketCreate {
        code: String,
        fail: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("ticket error: {0}")]
    struct TicketError(String);

    #[async_trait]
    impl ActorEntity for Ticket {
        type Id = u32;
        type Create = TicketCreate;
        type Update = bool;
        type Action = ();
        type ActionResult = bool;
        type Context = ();
        type Error = TicketError;

        fn from_create_params(id: u32, params: TicketCreate) -> Result<Self, Self::Error> {
            if params.fail {
                return Err(TicketError("rejected".into()));
            }
            Ok(Self {
                id,
                code: params.code,
                open: true,
            })
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.code.clone())
        }

        async fn on_update(&mut self, open: bool, _: &()) -> Result<(), Self::Error> {
            self.open = open;
            Ok(())
        }

        async fn handle_action(&mut self, _: (), _: &()) -> Result<bool, Self::Error> {
            Ok(self.open)
        }
    }

    fn ticket(code: &str) -> TicketCreate {
        TicketCreate {
            code: code.to_string(),
            fail: false,
        }
    }

    #[tokio::test]
    async fn test_unique_key_conflict() {
        let (actor, client) = ResourceActor::<Ticket>::new(8);
        let handle = tokio::spawn(actor.run(()));

        let first = client.create(ticket("A")).await.unwrap();
        let dup = client.create(ticket("A")).await;
        assert!(matches!(dup, Err(FrameworkError::Conflict(ref k)) if k == "A"));

        // Rejected creates do not consume ids
        let second = client.create(ticket("B")).await.unwrap();
        assert_eq!(second, first + 1);

        client.delete(first).await.unwrap();
        assert!(client.create(ticket("A")).await.is_ok());

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_query_and_purge() {
        let (actor, client) = ResourceActor::<Ticket>::new(8);
        let handle = tokio::spawn(actor.run(()));

        let a = client.create(ticket("A")).await.unwrap();
        client.create(ticket("B")).await.unwrap();
        client.update(a, false).await.unwrap();

        let open = client.query(|t: &Ticket| t.open).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].code, "B");

        let removed = client.purge(|t: &Ticket| !t.open).await.unwrap();
        assert_eq!(removed, 1);
        assert!(client.get(a).await.unwrap().is_none());
        assert!(client.perform_action(a, ()).await.is_err());

        let failed = client
            .create(TicketCreate {
                code: "C".into(),
                fail: true,
            })
            .await;
        assert!(matches!(failed, Err(FrameworkError::EntityError(_))));

        drop(client);
        handle.await.unwrap();
    }
}
