//! # Order Requests
//!
//! The shape of an incoming order and its validated form.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON ──► OrderRequest ──validate()──► ValidatedOrder ──► coordinator   │
//! │                                                                         │
//! │  validate() settles, once:                                              │
//! │  • who placed the order (exactly one of employee / customer)           │
//! │  • each modification's kind (modification_type, possible_modification, │
//! │    or ADD)                                                              │
//! │  • quantities, prices and ids                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Request
//! ```json
//! {
//!   "customer": { "external_token": "user_2f9", "email": "mei@example.com" },
//!   "total_cents": 1100,
//!   "items": [{
//!     "product_id": "…",
//!     "quantity": 2,
//!     "unit_price_cents": 475,
//!     "sugar_level": "50%",
//!     "size": "large",
//!     "ice_level": "less",
//!     "modifications": [
//!       { "ingredient_id": "…", "possible_modification": "ADD",
//!         "quantity_change_tenths": 10, "price_change_cents": 75 }
//!     ]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{CupSize, IceLevel, ModificationKind, SugarLevel};
use crate::validation::{
    validate_external_token, validate_line_item_count, validate_line_quantity,
    validate_modification_count, validate_modification_price_cents, validate_modification_tenths,
    validate_non_negative_cents, validate_optional_email, validate_price_cents, validate_uuid,
    ValidationResult,
};

// =============================================================================
// Wire Types
// =============================================================================

/// An order as submitted by a register or a customer app.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRequest {
    /// Staff member ringing up the order.
    #[serde(default)]
    pub employee_id: Option<String>,

    /// Customer placing the order themselves.
    #[serde(default)]
    pub customer: Option<CustomerIdentity>,

    /// Total as computed by the client. Stored as given.
    pub total_cents: i64,

    pub items: Vec<LineItemRequest>,
}

/// Identity of a self-service customer, as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerIdentity {
    pub external_token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemRequest {
    pub product_id: String,
    pub quantity: i64,
    /// Price the customer was shown. Frozen onto the line item.
    pub unit_price_cents: i64,
    #[serde(default)]
    pub sugar_level: SugarLevel,
    #[serde(default, alias = "size_level")]
    pub size: CupSize,
    #[serde(default)]
    pub ice_level: IceLevel,
    #[serde(default)]
    pub modifications: Vec<ModificationRequest>,
}

/// A requested ingredient change on one line item.
///
/// Older clients send the kind as `possible_modification` (the field name
/// used by the add-on menu); newer ones send `modification_type`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ModificationRequest {
    pub ingredient_id: String,
    #[serde(default)]
    pub modification_type: Option<String>,
    #[serde(default)]
    pub possible_modification: Option<String>,
    /// Amount per drink, in tenths. The sign is ignored.
    #[serde(default)]
    pub quantity_change_tenths: i64,
    /// Price per drink, in cents. The sign is ignored.
    #[serde(default)]
    pub price_change_cents: i64,
}

impl ModificationRequest {
    /// Resolves the modification kind: `modification_type` first, then
    /// `possible_modification`, then ADD.
    ///
    /// ```rust
    /// use teahouse_core::request::ModificationRequest;
    /// use teahouse_core::types::ModificationKind;
    ///
    /// let legacy = ModificationRequest {
    ///     ingredient_id: "pearls".into(),
    ///     modification_type: None,
    ///     possible_modification: Some("less".into()),
    ///     quantity_change_tenths: 5,
    ///     price_change_cents: 0,
    /// };
    /// assert_eq!(legacy.kind().unwrap(), ModificationKind::Less);
    /// ```
    pub fn kind(&self) -> ValidationResult<ModificationKind> {
        let raw = self
            .modification_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.possible_modification
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            });

        match raw {
            Some(raw) => raw.parse(),
            None => Ok(ModificationKind::default()),
        }
    }
}

// =============================================================================
// Validated Types
// =============================================================================

/// Who is placing the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Staff { employee_id: String },
    Customer(CustomerIdentity),
}

/// A modification with its kind resolved and deltas as magnitudes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationSpec {
    pub ingredient_id: String,
    pub kind: ModificationKind,
    /// Per-drink amount, never negative.
    pub quantity_change: Quantity,
    /// Per-drink price, never negative.
    pub price_change: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLineItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub sugar_level: SugarLevel,
    pub size: CupSize,
    pub ice_level: IceLevel,
    pub modifications: Vec<ModificationSpec>,
}

impl ValidatedLineItem {
    /// Line price: frozen unit price plus signed modification prices, times quantity.
    pub fn line_total(&self) -> Money {
        let per_drink = self
            .modifications
            .iter()
            .fold(self.unit_price, |acc, m| {
                if m.kind.consumes() {
                    acc + m.price_change
                } else {
                    acc - m.price_change
                }
            });
        per_drink.multiply_quantity(self.quantity)
    }
}

/// An order that passed every check that needs no database access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub actor: Actor,
    /// Total as submitted.
    pub total: Money,
    pub items: Vec<ValidatedLineItem>,
}

impl ValidatedOrder {
    /// Total recomputed from the line items.
    pub fn computed_total(&self) -> Money {
        self.items.iter().map(ValidatedLineItem::line_total).sum()
    }
}

// =============================================================================
// Validation
// =============================================================================

impl OrderRequest {
    /// Checks the request and resolves its actor and modification kinds.
    ///
    /// ## Errors
    /// - `MissingActor` when neither employee nor customer is given
    /// - `AmbiguousActor` when both are given
    /// - field errors for ids, quantities, prices and unknown kinds
    pub fn validate(&self) -> CoreResult<ValidatedOrder> {
        let actor = self.resolve_actor()?;

        validate_non_negative_cents("total_cents", self.total_cents)?;
        validate_line_item_count(self.items.len())?;

        let items = self
            .items
            .iter()
            .map(LineItemRequest::validate)
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(ValidatedOrder {
            actor,
            total: Money::from_cents(self.total_cents),
            items,
        })
    }

    fn resolve_actor(&self) -> ValidationResult<Actor> {
        let employee = self
            .employee_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let customer = self
            .customer
            .as_ref()
            .filter(|c| !c.external_token.trim().is_empty());

        match (employee, customer) {
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousActor),
            (None, None) => Err(ValidationError::MissingActor),
            (Some(employee_id), None) => {
                validate_uuid("employee_id", employee_id)?;
                Ok(Actor::Staff {
                    employee_id: employee_id.to_string(),
                })
            }
            (None, Some(customer)) => {
                validate_external_token(&customer.external_token)?;
                validate_optional_email(customer.email.as_deref())?;
                Ok(Actor::Customer(CustomerIdentity {
                    external_token: customer.external_token.trim().to_string(),
                    email: non_blank(customer.email.as_deref()),
                    name: non_blank(customer.name.as_deref()),
                }))
            }
        }
    }
}

impl LineItemRequest {
    fn validate(&self) -> ValidationResult<ValidatedLineItem> {
        validate_uuid("product_id", &self.product_id)?;
        validate_line_quantity(self.quantity)?;
        validate_price_cents("unit_price_cents", self.unit_price_cents)?;
        validate_modification_count(self.modifications.len())?;

        let modifications = self
            .modifications
            .iter()
            .map(|m| {
                if m.ingredient_id.trim().is_empty() {
                    return Err(ValidationError::Required {
                        field: "ingredient_id".to_string(),
                    });
                }
                validate_modification_tenths(m.quantity_change_tenths)?;
                validate_modification_price_cents(m.price_change_cents)?;
                Ok(ModificationSpec {
                    ingredient_id: m.ingredient_id.trim().to_string(),
                    kind: m.kind()?,
                    quantity_change: Quantity::from_tenths(m.quantity_change_tenths).abs(),
                    price_change: Money::from_cents(m.price_change_cents).abs(),
                })
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(ValidatedLineItem {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            unit_price: Money::from_cents(self.unit_price_cents),
            sugar_level: self.sugar_level,
            size: self.size,
            ice_level: self.ice_level,
            modifications,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::{
        MAX_ITEM_QUANTITY, MAX_LINE_ITEMS, MAX_MODIFICATIONS_PER_ITEM, MAX_MODIFICATION_TENTHS,
        MAX_PRICE_CENTS,
    };

    const PRODUCT: &str = "6f1c1f2e-52d4-4a8e-9a57-0d6d0f7f6b11";
    const EMPLOYEE: &str = "0b7e3c55-1f0a-4c0e-8a5e-7c2f9d1e4a20";

    fn line(modifications: Vec<ModificationRequest>) -> LineItemRequest {
        LineItemRequest {
            product_id: PRODUCT.to_string(),
            quantity: 2,
            unit_price_cents: 450,
            sugar_level: SugarLevel::default(),
            size: CupSize::default(),
            ice_level: IceLevel::default(),
            modifications,
        }
    }

    fn modification(kind: Option<&str>, legacy: Option<&str>) -> ModificationRequest {
        ModificationRequest {
            ingredient_id: "pearls".to_string(),
            modification_type: kind.map(str::to_string),
            possible_modification: legacy.map(str::to_string),
            quantity_change_tenths: 10,
            price_change_cents: 75,
        }
    }

    fn staff_order(items: Vec<LineItemRequest>) -> OrderRequest {
        OrderRequest {
            employee_id: Some(EMPLOYEE.to_string()),
            customer: None,
            total_cents: 900,
            items,
        }
    }

    fn validation_error(result: CoreResult<ValidatedOrder>) -> ValidationError {
        match result {
            Err(CoreError::Validation(err)) => err,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_resolution_order() {
        assert_eq!(
            modification(Some("EXTRA"), Some("LESS")).kind().unwrap(),
            ModificationKind::Extra
        );
        assert_eq!(
            modification(None, Some("remove")).kind().unwrap(),
            ModificationKind::Remove
        );
        assert_eq!(modification(None, None).kind().unwrap(), ModificationKind::Add);
        assert_eq!(
            modification(Some(""), Some("less")).kind().unwrap(),
            ModificationKind::Less
        );
        assert!(modification(Some("DOUBLE"), None).kind().is_err());
    }

    #[test]
    fn test_staff_order_validates() {
        let order = staff_order(vec![line(vec![modification(None, Some("ADD"))])])
            .validate()
            .unwrap();

        assert_eq!(
            order.actor,
            Actor::Staff {
                employee_id: EMPLOYEE.to_string()
            }
        );
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].modifications[0].kind, ModificationKind::Add);
        // (450 + 75) × 2
        assert_eq!(order.computed_total().cents(), 1050);
    }

    #[test]
    fn test_missing_and_ambiguous_actor() {
        let mut request = staff_order(vec![line(vec![])]);
        request.employee_id = None;
        assert!(matches!(
            validation_error(request.validate()),
            ValidationError::MissingActor
        ));

        request.customer = Some(CustomerIdentity {
            external_token: "   ".to_string(),
            email: None,
            name: None,
        });
        assert!(matches!(
            validation_error(request.validate()),
            ValidationError::MissingActor
        ));

        request.employee_id = Some(EMPLOYEE.to_string());
        request.customer = Some(CustomerIdentity {
            external_token: "user_1".to_string(),
            email: None,
            name: None,
        });
        assert!(matches!(
            validation_error(request.validate()),
            ValidationError::AmbiguousActor
        ));
    }

    #[test]
    fn test_customer_identity_is_trimmed() {
        let request = OrderRequest {
            employee_id: Some("  ".to_string()),
            customer: Some(CustomerIdentity {
                external_token: " user_9 ".to_string(),
                email: Some("".to_string()),
                name: Some("Mei".to_string()),
            }),
            total_cents: 450,
            items: vec![line(vec![])],
        };

        let order = request.validate().unwrap();
        assert_eq!(
            order.actor,
            Actor::Customer(CustomerIdentity {
                external_token: "user_9".to_string(),
                email: None,
                name: Some("Mei".to_string()),
            })
        );
    }

    #[test]
    fn test_rejects_bad_lines() {
        let mut bad_quantity = line(vec![]);
        bad_quantity.quantity = 0;
        assert!(staff_order(vec![bad_quantity]).validate().is_err());

        let mut bad_price = line(vec![]);
        bad_price.unit_price_cents = -1;
        assert!(staff_order(vec![bad_price]).validate().is_err());

        assert!(matches!(
            validation_error(staff_order(vec![]).validate()),
            ValidationError::Required { .. }
        ));

        let unknown_kind = line(vec![modification(Some("SPLASH"), None)]);
        assert!(matches!(
            validation_error(staff_order(vec![unknown_kind]).validate()),
            ValidationError::NotAllowed { .. }
        ));
    }

    #[test]
    fn test_modification_magnitudes_ignore_sign() {
        let mut m = modification(Some("LESS"), None);
        m.quantity_change_tenths = -5;
        m.price_change_cents = -25;

        let order = staff_order(vec![line(vec![m])]).validate().unwrap();
        let spec = &order.items[0].modifications[0];
        assert_eq!(spec.quantity_change, Quantity::from_tenths(5));
        assert_eq!(spec.price_change, Money::from_cents(25));
        // LESS takes the price off: (450 - 25) × 2
        assert_eq!(order.computed_total().cents(), 850);
    }

    #[test]
    fn test_rejects_extreme_amounts() {
        let mut lowest = modification(Some("LESS"), None);
        lowest.quantity_change_tenths = i64::MIN;
        assert!(matches!(
            validation_error(staff_order(vec![line(vec![lowest])]).validate()),
            ValidationError::OutOfRange { .. }
        ));

        let mut huge_change = modification(Some("EXTRA"), None);
        huge_change.quantity_change_tenths = i64::MAX / 2;
        assert!(matches!(
            validation_error(staff_order(vec![line(vec![huge_change])]).validate()),
            ValidationError::OutOfRange { .. }
        ));

        let mut huge_surcharge = modification(Some("ADD"), None);
        huge_surcharge.price_change_cents = i64::MIN;
        assert!(staff_order(vec![line(vec![huge_surcharge])]).validate().is_err());

        let mut huge_price = line(vec![]);
        huge_price.unit_price_cents = i64::MAX / 2;
        assert!(matches!(
            validation_error(staff_order(vec![huge_price]).validate()),
            ValidationError::OutOfRange { .. }
        ));
    }

    #[test]
    fn test_largest_accepted_order_totals_without_overflow() {
        let mut m = modification(Some("EXTRA"), None);
        m.quantity_change_tenths = MAX_MODIFICATION_TENTHS;
        m.price_change_cents = MAX_PRICE_CENTS;

        let mut item = line(vec![m; MAX_MODIFICATIONS_PER_ITEM]);
        item.quantity = MAX_ITEM_QUANTITY;
        item.unit_price_cents = MAX_PRICE_CENTS;

        let order = staff_order(vec![item; MAX_LINE_ITEMS]).validate().unwrap();
        let per_line = (MAX_PRICE_CENTS * (1 + MAX_MODIFICATIONS_PER_ITEM as i64)) * MAX_ITEM_QUANTITY;
        assert_eq!(order.computed_total().cents(), per_line * MAX_LINE_ITEMS as i64);
    }

    #[test]
    fn test_deserializes_defaults_and_aliases() {
        let json = format!(
            r#"{{
                "employee_id": "{EMPLOYEE}",
                "total_cents": 450,
                "items": [{{
                    "product_id": "{PRODUCT}",
                    "quantity": 1,
                    "unit_price_cents": 450,
                    "size_level": "large",
                    "modifications": [{{ "ingredient_id": "x", "possible_modification": "EXTRA" }}]
                }}]
            }}"#
        );

        let request: OrderRequest = serde_json::from_str(&json).unwrap();
        let item = &request.items[0];
        assert_eq!(item.size, CupSize::Large);
        assert_eq!(item.sugar_level, SugarLevel::Percent100);
        assert_eq!(item.ice_level, IceLevel::Regular);
        assert_eq!(item.modifications[0].kind().unwrap(), ModificationKind::Extra);
        assert_eq!(item.modifications[0].quantity_change_tenths, 0);
    }
}
