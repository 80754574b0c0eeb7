//! Pet Store core: resource records, status enums, and field-level validation.

pub mod credentials;
pub mod schema;
pub mod traits;
pub mod types;

pub use schema::{Bound, Choice, FieldReader, FieldViolation, Loc, Validate, ValidationErrors};
pub use traits::Resource;
pub use types::{
    Item, ItemDraft, Order, OrderDraft, OrderStatus, Pet, PetDraft, PetStatus, User, UserDraft,
};
