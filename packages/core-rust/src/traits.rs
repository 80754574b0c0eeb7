use chrono::{DateTime, Utc};

use crate::schema::Validate;

/// A CRUD-managed record type.
///
/// A record is built from a validated draft plus a store-assigned id, and is
/// only ever changed by replacing every field except the id and creation time.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Display name used in responses, e.g. `"Pet"` in `"Pet not found"`.
    const NAME: &'static str;

    /// The client-supplied part of the record.
    type Draft: Validate + Send + 'static;

    /// Store-assigned identifier.
    fn id(&self) -> u64;

    /// Builds the stored record for a newly assigned `id`.
    fn from_draft(id: u64, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Replaces all client-supplied fields and stamps `updated_at`.
    fn replace(&mut self, draft: Self::Draft, now: DateTime<Utc>);
}
