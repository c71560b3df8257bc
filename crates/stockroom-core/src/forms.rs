//! # Form Schemas
//!
//! Every dashboard form is a plain `Deserialize` struct that validates into
//! a typed draft, collecting all failures into one [`FieldErrors`] map.
//!
//! ```text
//! JSON body ──serde──► XxxForm ──FormSchema::validate──► XxxDraft
//!                                        │
//!                                        └──► FieldErrors { "name": ["name is required"],
//!                                                           "items[1].quantity": [...] }
//! ```
//!
//! All form fields default when absent, so a missing field is reported as
//! a field error instead of a deserialization failure.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::lifecycle::{OrderStatus, PurchaseOrderStatus};
use crate::validation::{
    validate_email, validate_name, validate_opening_quantity, validate_optional_text,
    validate_password, validate_price_cents, validate_quantity, validate_uuid,
    ValidationResult,
};
use crate::MAX_LINE_ITEMS;

// =============================================================================
// Field Errors
// =============================================================================

/// Field name → messages, serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn push(&mut self, err: ValidationError) {
        self.add(err.field().to_string(), err.to_string());
    }

    /// Records the error (if any) and hands back the value (if any).
    pub fn check<T>(&mut self, result: ValidationResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(err);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<ValidationError> for FieldErrors {
    fn from(err: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.push(err);
        errors
    }
}

/// A form that validates into a typed draft.
pub trait FormSchema {
    type Output;

    fn validate(self) -> Result<Self::Output, FieldErrors>;
}

/// Unwraps collected values once no errors were recorded.
macro_rules! finish {
    ($errors:ident, $($field:ident),+ $(,)?) => {
        match ($($field),+,) {
            ($(Some($field)),+,) if $errors.is_empty() => ($($field),+,),
            _ => return Err($errors),
        }
    };
}

fn check_item_count(errors: &mut FieldErrors, count: usize) {
    if count == 0 {
        errors.add("items", "at least one line item is required");
    } else if count > MAX_LINE_ITEMS {
        errors.add(
            "items",
            format!("at most {MAX_LINE_ITEMS} line items are allowed"),
        );
    }
}

fn check_unique<'a>(errors: &mut FieldErrors, product_ids: impl Iterator<Item = &'a str>) {
    let mut seen = std::collections::HashSet::new();
    for id in product_ids {
        if !seen.insert(id) {
            errors.push(ValidationError::Duplicate {
                field: "items".to_string(),
                value: id.to_string(),
            });
        }
    }
}

// =============================================================================
// Reference Entities
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerForm {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDraft {
    pub name: String,
    pub location: Option<String>,
}

impl FormSchema for CustomerForm {
    type Output = CustomerDraft;

    fn validate(self) -> Result<CustomerDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check(validate_name("name", &self.name));
        let location =
            errors.check(validate_optional_text("location", self.location.as_deref(), 200));
        let (name, location) = finish!(errors, name, location);
        Ok(CustomerDraft { name, location })
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ManufacturerForm {
    pub name: String,
    pub contact: Option<String>,
    pub street_number: Option<i64>,
    pub street: Option<String>,
    pub zip: Option<i64>,
    pub bldg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManufacturerDraft {
    pub name: String,
    pub contact: Option<String>,
    pub street_number: Option<i64>,
    pub street: Option<String>,
    pub zip: Option<i64>,
    pub bldg: Option<String>,
}

impl FormSchema for ManufacturerForm {
    type Output = ManufacturerDraft;

    fn validate(self) -> Result<ManufacturerDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check(validate_name("name", &self.name));
        let contact = errors.check(validate_optional_text("contact", self.contact.as_deref(), 200));
        let street = errors.check(validate_optional_text("street", self.street.as_deref(), 200));
        let bldg = errors.check(validate_optional_text("bldg", self.bldg.as_deref(), 50));

        for (field, value) in [("streetNumber", self.street_number), ("zip", self.zip)] {
            if value.is_some_and(|v| v < 0) {
                errors.push(ValidationError::MustBePositive {
                    field: field.to_string(),
                });
            }
        }

        let (name, contact, street, bldg) = finish!(errors, name, contact, street, bldg);
        Ok(ManufacturerDraft {
            name,
            contact,
            street_number: self.street_number,
            street,
            zip: self.zip,
            bldg,
        })
    }
}

/// Product form. Stock counters are not part of it; `openingQuantity` is
/// only honoured on create and becomes a `received` ledger entry.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ProductForm {
    pub name: String,
    pub common_name: Option<String>,
    pub manufacturer_id: String,
    pub image_link: Option<String>,
    pub opening_quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub common_name: Option<String>,
    pub manufacturer_id: String,
    pub image_link: Option<String>,
    pub opening_quantity: i64,
}

impl FormSchema for ProductForm {
    type Output = ProductDraft;

    fn validate(self) -> Result<ProductDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check(validate_name("name", &self.name));
        let common_name =
            errors.check(validate_optional_text("commonName", self.common_name.as_deref(), 200));
        let manufacturer_id = errors.check(validate_uuid("manufacturerId", &self.manufacturer_id));
        let image_link =
            errors.check(validate_optional_text("imageLink", self.image_link.as_deref(), 2048));
        let opening_quantity = self.opening_quantity.unwrap_or(0);
        errors.check(validate_opening_quantity("openingQuantity", opening_quantity));

        let (name, common_name, manufacturer_id, image_link) =
            finish!(errors, name, common_name, manufacturer_id, image_link);
        Ok(ProductDraft {
            name,
            common_name,
            manufacturer_id,
            image_link,
            opening_quantity,
        })
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// Validated email and plaintext password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl FormSchema for SignInForm {
    type Output = Credentials;

    /// Only checks presence and email shape; password rules are for new
    /// passwords, not for telling a caller why a guess was wrong.
    fn validate(self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.check(validate_email("email", &self.email));
        let password = self.password.trim().to_string();
        if password.is_empty() {
            errors.push(ValidationError::Required {
                field: "password".to_string(),
            });
        }
        let (email,) = finish!(errors, email);
        Ok(Credentials { email, password })
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl FormSchema for SignUpForm {
    type Output = Credentials;

    fn validate(self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.check(validate_email("email", &self.email));
        let password = errors.check(validate_password("password", &self.password));
        if self.password.trim() != self.confirm_password.trim() {
            errors.add("confirmPassword", "passwords do not match");
        }
        let (email, password) = finish!(errors, email, password);
        Ok(Credentials { email, password })
    }
}

/// Account settings. `currentPassword` is always required.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateUserForm {
    pub email: Option<String>,
    pub current_password: String,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub current_password: String,
    pub new_password: Option<String>,
}

impl FormSchema for UpdateUserForm {
    type Output = AccountUpdate;

    fn validate(self) -> Result<AccountUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = match self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => errors.check(validate_email("email", email)).map(Some),
            None => Some(None),
        };

        let current_password = self.current_password.trim().to_string();
        if current_password.is_empty() {
            errors.push(ValidationError::Required {
                field: "currentPassword".to_string(),
            });
        }

        let new_password = self.new_password.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let new_password = match new_password {
            Some(password) => {
                if Some(password) != self.confirm_password.as_deref().map(str::trim) {
                    errors.add("confirmPassword", "passwords do not match");
                }
                errors.check(validate_password("newPassword", password)).map(Some)
            }
            None => Some(None),
        };

        let (email, new_password) = finish!(errors, email, new_password);
        if email.is_none() && new_password.is_none() {
            return Err(FieldErrors::single("email", "nothing to update"));
        }

        Ok(AccountUpdate {
            email,
            current_password,
            new_password,
        })
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLineForm {
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct OrderForm {
    pub name: String,
    pub customer_id: Option<String>,
    pub status: OrderStatus,
    #[ts(as = "Option<String>")]
    pub delivered_date: Option<NaiveDate>,
    /// Computed by the client; stored as submitted.
    pub total_cents: i64,
    pub items: Vec<OrderLineForm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub name: String,
    pub customer_id: Option<String>,
    pub status: OrderStatus,
    pub delivered_date: Option<NaiveDate>,
    pub total_cents: i64,
    pub items: Vec<OrderLine>,
}

impl FormSchema for OrderForm {
    type Output = OrderDraft;

    fn validate(self) -> Result<OrderDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check(validate_name("name", &self.name));
        let customer_id = self.customer_id.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let customer_id = match customer_id {
            Some(id) => errors.check(validate_uuid("customerId", id)).map(Some),
            None => Some(None),
        };
        errors.check(validate_price_cents("totalCents", self.total_cents));
        check_item_count(&mut errors, self.items.len());

        let mut items = Vec::with_capacity(self.items.len());
        for (i, line) in self.items.into_iter().enumerate() {
            let field = |name: &str| format!("items[{i}].{name}");
            let product_id = errors.check(validate_uuid(&field("productId"), &line.product_id));
            errors.check(validate_quantity(&field("quantity"), line.quantity));
            errors.check(validate_price_cents(&field("priceCents"), line.price_cents));
            if let Some(product_id) = product_id {
                items.push(OrderLine {
                    product_id,
                    quantity: line.quantity,
                    price_cents: line.price_cents,
                });
            }
        }
        check_unique(&mut errors, items.iter().map(|l| l.product_id.as_str()));

        let (name, customer_id) = finish!(errors, name, customer_id);
        Ok(OrderDraft {
            name,
            customer_id,
            status: self.status,
            delivered_date: self.delivered_date,
            total_cents: self.total_cents,
            items,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnLineForm {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Goods coming back on a delivered order.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnForm {
    pub items: Vec<ReturnLineForm>,
}

impl FormSchema for ReturnForm {
    type Output = Vec<ReturnLine>;

    fn validate(self) -> Result<Vec<ReturnLine>, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_item_count(&mut errors, self.items.len());

        let mut lines = Vec::with_capacity(self.items.len());
        for (i, line) in self.items.into_iter().enumerate() {
            let field = |name: &str| format!("items[{i}].{name}");
            let product_id = errors.check(validate_uuid(&field("productId"), &line.product_id));
            errors.check(validate_quantity(&field("quantity"), line.quantity));
            if let Some(product_id) = product_id {
                lines.push(ReturnLine {
                    product_id,
                    quantity: line.quantity,
                });
            }
        }
        check_unique(&mut errors, lines.iter().map(|l| l.product_id.as_str()));

        if errors.is_empty() {
            Ok(lines)
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Purchase Orders
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrderLineForm {
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrderForm {
    /// Defaults to today when absent.
    #[ts(as = "Option<String>")]
    pub order_date: Option<NaiveDate>,
    pub status: PurchaseOrderStatus,
    pub total_cents: i64,
    pub items: Vec<PurchaseOrderLineForm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrderDraft {
    pub order_date: Option<NaiveDate>,
    pub status: PurchaseOrderStatus,
    pub total_cents: i64,
    pub items: Vec<PurchaseOrderLine>,
}

impl FormSchema for PurchaseOrderForm {
    type Output = PurchaseOrderDraft;

    fn validate(self) -> Result<PurchaseOrderDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(validate_price_cents("totalCents", self.total_cents));
        check_item_count(&mut errors, self.items.len());

        let mut items = Vec::with_capacity(self.items.len());
        for (i, line) in self.items.into_iter().enumerate() {
            let field = |name: &str| format!("items[{i}].{name}");
            let product_id = errors.check(validate_uuid(&field("productId"), &line.product_id));
            errors.check(validate_quantity(&field("quantity"), line.quantity));
            errors.check(validate_price_cents(&field("priceCents"), line.price_cents));
            if let Some(product_id) = product_id {
                items.push(PurchaseOrderLine {
                    product_id,
                    quantity: line.quantity,
                    price_cents: line.price_cents,
                    expiration_date: line.expiration_date,
                });
            }
        }
        check_unique(&mut errors, items.iter().map(|l| l.product_id.as_str()));

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(PurchaseOrderDraft {
            order_date: self.order_date,
            status: self.status,
            total_cents: self.total_cents,
            items,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
