use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum HubError {
    /// The hub mailbox is full; the update was dropped.
    #[error("Broadcast hub saturated")]
    Saturated,

    #[error("Broadcast hub unavailable")]
    Unavailable,
}
