//! # Generic Messages
//!
//! The request envelope exchanged between [`ResourceClient`](super::ResourceClient) and
//! [`ResourceActor`](super::ResourceActor).

use super::entity::ActorEntity;
use super::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Predicate evaluated inside the actor against every stored entity.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Internal message type sent to the actor to request operations.
///
/// The variants map to the resource lifecycle (Create, Get, Update, Delete), plus:
///
/// - **Action**: executes a custom [`ActorEntity::Action`] on one entity.
/// - **Query**: returns clones of every entity matching a [`Filter`].
/// - **Purge**: removes every entity matching a [`Filter`] and reports how many went.
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Query {
        filter: Filter<T>,
        respond_to: Response<Vec<T>>,
    },
    Purge {
        filter: Filter<T>,
        respond_to: Response<usize>,
    },
}
