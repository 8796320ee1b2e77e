//! Collaborators of the direct message view
//!
//! The view never talks to a global client. Everything it needs is reached
//! through one injected service object implementing [`Backend`]:
//! - [`AuthProvider`] - the signed-in user
//! - [`ProfileDirectory`] - display profiles and the follow list
//! - [`MessageStore`] - durable message rows
//! - [`RealtimeChannel`] - push delivery of newly inserted rows
//!
//! [`SqliteBackend`] implements all four on top of a local SQLite file.

pub mod realtime;
pub mod sqlite;

pub use realtime::{InsertFilter, RealtimeHub, Subscription};
pub use sqlite::SqliteBackend;

use crate::{
    models::{Message, NewMessage, Profile, User},
    Result,
};
use std::future::Future;

/// Access to the current session
pub trait AuthProvider {
    /// The signed-in user, or `None` when there is no session
    fn current_user(&self) -> impl Future<Output = Result<Option<User>>> + Send;
}

/// Lookup of user display profiles
pub trait ProfileDirectory {
    /// Fetch the display profile of `user_id`
    fn fetch_profile(&self, user_id: &str) -> impl Future<Output = Result<Profile>> + Send;

    /// Profiles that `user_id` follows, i.e. people they can start a chat with
    fn followed_profiles(&self, user_id: &str)
        -> impl Future<Output = Result<Vec<Profile>>> + Send;
}

/// Durable storage of direct messages
pub trait MessageStore {
    /// All messages exchanged between `me` and `them`, oldest first
    fn fetch_conversation(
        &self,
        me: &str,
        them: &str,
    ) -> impl Future<Output = Result<Vec<Message>>> + Send;

    /// Insert a message and return the stored row
    ///
    /// Replaying a payload whose `client_token` is already stored returns the
    /// existing row without creating a second one.
    fn insert(&self, message: NewMessage) -> impl Future<Output = Result<Message>> + Send;
}

/// Push delivery of inserted message rows
pub trait RealtimeChannel {
    /// Start receiving rows matching `filter`
    ///
    /// Dropping the returned [`Subscription`] tears it down.
    fn subscribe(&self, filter: InsertFilter) -> impl Future<Output = Result<Subscription>> + Send;
}

/// Everything the direct message view depends on
pub trait Backend:
    AuthProvider + ProfileDirectory + MessageStore + RealtimeChannel + Clone + Send + Sync + 'static
{
}

impl<T> Backend for T where
    T: AuthProvider
        + ProfileDirectory
        + MessageStore
        + RealtimeChannel
        + Clone
        + Send
        + Sync
        + 'static
{
}
