use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::credentials::digest_password;
use crate::schema::{Bound, Choice, FieldReader, Validate, ValidationErrors};
use crate::traits::Resource;

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Sale status of a pet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    #[default]
    Available,
    Pending,
    Sold,
}

impl Choice for PetStatus {
    const ALL: &'static [Self] = &[Self::Available, Self::Pending, Self::Sold];

    fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Placed,
    Approved,
    Delivered,
}

impl Choice for OrderStatus {
    const ALL: &'static [Self] = &[Self::Placed, Self::Approved, Self::Delivered];

    fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Approved => "approved",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drops repeated tags, keeping the first occurrence of each.
fn unique_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Pet
// ---------------------------------------------------------------------------

/// A pet offered by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pet {
    pub id: u64,
    pub name: String,
    pub category: Option<String>,
    pub status: PetStatus,
    pub tags: Vec<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Client-supplied fields of a [`Pet`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PetDraft {
    pub name: String,
    pub category: Option<String>,
    pub status: PetStatus,
    pub tags: Vec<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub photo_urls: Vec<String>,
}

impl Validate for PetDraft {
    fn validate(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new("body", payload);
        let draft = Self {
            name: fields.required_str("name", 1, 100),
            category: fields.optional_str("category", 100),
            status: fields.choice("status").unwrap_or_default(),
            tags: unique_tags(fields.str_list("tags")),
            price: fields.optional_number("price", Bound::Gt(0.0)),
            description: fields.optional_str("description", 1000),
            photo_urls: fields.str_list("photo_urls"),
        };
        fields.finish(draft)
    }
}

impl Resource for Pet {
    const NAME: &'static str = "Pet";
    type Draft = PetDraft;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: PetDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            category: draft.category,
            status: draft.status,
            tags: draft.tags,
            price: draft.price,
            description: draft.description,
            photo_urls: draft.photo_urls,
            created_at: now,
            updated_at: None,
        }
    }

    fn replace(&mut self, draft: PetDraft, now: DateTime<Utc>) {
        *self = Self {
            updated_at: Some(now),
            ..Self::from_draft(self.id, draft, self.created_at)
        };
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// An order for a pet. `pet_id` and `user_id` are not checked against their stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: u64,
    pub pet_id: u64,
    pub user_id: Option<u64>,
    pub quantity: u32,
    pub ship_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Client-supplied fields of an [`Order`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderDraft {
    pub pet_id: u64,
    pub user_id: Option<u64>,
    pub quantity: u32,
    pub ship_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub complete: bool,
}

impl Validate for OrderDraft {
    fn validate(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new("body", payload);
        let draft = Self {
            pet_id: fields.required_id("pet_id"),
            user_id: fields.optional_id("user_id"),
            quantity: fields.positive_int("quantity"),
            ship_date: fields.optional_datetime("ship_date"),
            status: fields.choice("status").unwrap_or_default(),
            complete: fields.bool_or("complete", false),
        };
        fields.finish(draft)
    }
}

impl Resource for Order {
    const NAME: &'static str = "Order";
    type Draft = OrderDraft;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: OrderDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            pet_id: draft.pet_id,
            user_id: draft.user_id,
            quantity: draft.quantity,
            ship_date: draft.ship_date,
            status: draft.status,
            complete: draft.complete,
            created_at: now,
            updated_at: None,
        }
    }

    fn replace(&mut self, draft: OrderDraft, now: DateTime<Utc>) {
        *self = Self {
            updated_at: Some(now),
            ..Self::from_draft(self.id, draft, self.created_at)
        };
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A store user. The password is kept only as a salted digest and is
/// never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_digest: Option<String>,
    pub phone: Option<String>,
    /// 1 = active, 0 = inactive.
    pub user_status: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Client-supplied fields of a [`User`].
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub user_status: i64,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            username: String::new(),
            first_name: None,
            last_name: None,
            email: None,
            password: None,
            phone: None,
            user_status: 1,
        }
    }
}

impl Validate for UserDraft {
    fn validate(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new("body", payload);
        let username = fields.required_str("username", 3, 50);
        let first_name = fields.optional_str("first_name", 50);
        let last_name = fields.optional_str("last_name", 50);
        let email = fields.optional_email("email");
        let password = fields.optional_str_within("password", 6, 128);
        let draft = Self {
            username,
            first_name,
            last_name,
            email,
            password,
            phone: fields.optional_str("phone", 32),
            user_status: fields.int_or("user_status", 1),
        };
        fields.finish(draft)
    }
}

impl Resource for User {
    const NAME: &'static str = "User";
    type Draft = UserDraft;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username: draft.username,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            password_digest: draft.password.as_deref().map(digest_password),
            phone: draft.phone,
            user_status: draft.user_status,
            created_at: now,
            updated_at: None,
        }
    }

    fn replace(&mut self, draft: UserDraft, now: DateTime<Utc>) {
        *self = Self {
            updated_at: Some(now),
            ..Self::from_draft(self.id, draft, self.created_at)
        };
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A generic priced catalogue item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Client-supplied fields of an [`Item`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

impl Validate for ItemDraft {
    fn validate(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new("body", payload);
        let draft = Self {
            name: fields.required_str("name", 1, 100),
            description: fields.optional_str("description", 1000),
            price: fields.required_number("price", Bound::Ge(0.0)),
        };
        fields.finish(draft)
    }
}

impl Resource for Item {
    const NAME: &'static str = "Item";
    type Draft = ItemDraft;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: ItemDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            created_at: now,
            updated_at: None,
        }
    }

    fn replace(&mut self, draft: ItemDraft, now: DateTime<Utc>) {
        *self = Self {
            updated_at: Some(now),
            ..Self::from_draft(self.id, draft, self.created_at)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::verify_password;
    use serde_json::json;

    #[test]
    fn pet_draft_applies_defaults() {
        let draft = PetDraft::validate(&json!({ "name": "Rex" })).unwrap();
        assert_eq!(draft.name, "Rex");
        assert_eq!(draft.status, PetStatus::Available);
        assert!(draft.tags.is_empty());
        assert!(draft.photo_urls.is_empty());
        assert_eq!(draft.category, None);
    }

    #[test]
    fn pet_draft_requires_name() {
        let errors = PetDraft::validate(&json!({ "status": "sold" })).unwrap_err();
        let violation = &errors.violations()[0];
        assert_eq!(violation.kind, "missing");
        assert_eq!(
            serde_json::to_value(&violation.loc).unwrap(),
            json!(["body", "name"])
        );
    }

    #[test]
    fn pet_draft_rejects_unknown_status() {
        let errors = PetDraft::validate(&json!({ "name": "Rex", "status": "lost" })).unwrap_err();
        assert_eq!(errors.violations()[0].kind, "enum");
    }

    #[test]
    fn pet_draft_reports_empty_name_and_bad_price_together() {
        let errors = PetDraft::validate(&json!({ "name": "", "price": -10 })).unwrap_err();
        let kinds: Vec<_> = errors.violations().iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec!["string_too_short", "greater_than"]);
    }

    #[test]
    fn pet_tags_are_a_set() {
        let draft = PetDraft::validate(&json!({
            "name": "Rex",
            "tags": ["friendly", "loud", "friendly"],
        }))
        .unwrap();
        assert_eq!(draft.tags, vec!["friendly", "loud"]);
    }

    #[test]
    fn pet_replace_keeps_identity_and_creation_time() {
        let created = Utc::now();
        let mut pet = Pet::from_draft(
            7,
            PetDraft {
                name: "Rex".into(),
                ..PetDraft::default()
            },
            created,
        );
        let later = created + chrono::Duration::seconds(5);
        pet.replace(
            PetDraft {
                name: "Max".into(),
                status: PetStatus::Sold,
                ..PetDraft::default()
            },
            later,
        );
        assert_eq!(pet.id, 7);
        assert_eq!(pet.name, "Max");
        assert_eq!(pet.status, PetStatus::Sold);
        assert_eq!(pet.created_at, created);
        assert_eq!(pet.updated_at, Some(later));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(PetStatus::Pending).unwrap(), json!("pending"));
        assert_eq!(
            serde_json::to_value(OrderStatus::Delivered).unwrap(),
            json!("delivered")
        );
    }

    #[test]
    fn order_draft_requires_positive_quantity() {
        let errors = OrderDraft::validate(&json!({ "pet_id": 1, "quantity": 0 })).unwrap_err();
        assert_eq!(errors.violations()[0].kind, "greater_than");
    }

    #[test]
    fn order_draft_parses_ship_date_and_defaults() {
        let draft = OrderDraft::validate(&json!({
            "pet_id": 3,
            "quantity": 2,
            "ship_date": "2024-01-02T03:04:05Z",
        }))
        .unwrap();
        assert_eq!(draft.pet_id, 3);
        assert_eq!(draft.status, OrderStatus::Placed);
        assert!(!draft.complete);
        assert_eq!(draft.user_id, None);
        assert!(draft.ship_date.is_some());
    }

    #[test]
    fn user_draft_validates_email_and_password() {
        let errors = UserDraft::validate(&json!({
            "username": "jo",
            "email": "not-an-email",
            "password": "123",
        }))
        .unwrap_err();
        let kinds: Vec<_> = errors.violations().iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec!["string_too_short", "value_error", "string_too_short"]);
    }

    #[test]
    fn user_password_is_digested_and_hidden() {
        let draft = UserDraft::validate(&json!({
            "username": "johndoe",
            "password": "password123",
        }))
        .unwrap();
        let user = User::from_draft(1, draft, Utc::now());
        let digest = user.password_digest.as_deref().unwrap();
        assert!(verify_password("password123", digest));

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_digest").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["user_status"], 1);
    }

    #[test]
    fn item_price_may_be_zero_but_not_negative() {
        assert!(ItemDraft::validate(&json!({ "name": "Leash", "price": 0 })).is_ok());
        let errors = ItemDraft::validate(&json!({ "name": "Leash", "price": -1 })).unwrap_err();
        assert_eq!(errors.violations()[0].kind, "greater_than_equal");
    }
}
