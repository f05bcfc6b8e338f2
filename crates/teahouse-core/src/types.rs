//! # Domain Types
//!
//! Core domain types used throughout Teahouse POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (read-only to orders)        Orders (written once)            │
//! │  ┌─────────────────┐                  ┌─────────────────┐              │
//! │  │    Product      │                  │     Order       │              │
//! │  │  recipe ────────┼──► RecipeEntry   │  employee_id?   │              │
//! │  └─────────────────┘        │         │  customer_id?   │              │
//! │                             ▼         └───────┬─────────┘              │
//! │  ┌─────────────────┐                          │ 1..N                    │
//! │  │   Ingredient    │◄─────────────┐   ┌───────▼─────────┐              │
//! │  │  on_hand_tenths │              │   │    LineItem     │              │
//! │  │  is_add_on      │              │   │  frozen price   │              │
//! │  └─────────────────┘              │   │  sugar/size/ice │              │
//! │                                   │   └───────┬─────────┘              │
//! │                                   │           │ 0..N                    │
//! │                                   │   ┌───────▼─────────┐              │
//! │                                   └───┤  Modification   │              │
//! │                                       │  kind, deltas   │              │
//! │                                       └─────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity is identified by a UUID v4 string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::{LARGE_CUP, MEDIUM_CUP, SMALL_CUP};

// =============================================================================
// Sugar Level
// =============================================================================

/// Sweetness of a drink, as a percentage of the standard recipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum SugarLevel {
    #[serde(rename = "200%")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "200%"))]
    Percent200,
    #[serde(rename = "150%")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "150%"))]
    Percent150,
    #[default]
    #[serde(rename = "100%")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "100%"))]
    Percent100,
    #[serde(rename = "80%")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "80%"))]
    Percent80,
    #[serde(rename = "50%")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "50%"))]
    Percent50,
    #[serde(rename = "30%")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "30%"))]
    Percent30,
    #[serde(rename = "0%")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "0%"))]
    Percent0,
}

impl SugarLevel {
    pub const ALL: [SugarLevel; 7] = [
        SugarLevel::Percent200,
        SugarLevel::Percent150,
        SugarLevel::Percent100,
        SugarLevel::Percent80,
        SugarLevel::Percent50,
        SugarLevel::Percent30,
        SugarLevel::Percent0,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SugarLevel::Percent200 => "200%",
            SugarLevel::Percent150 => "150%",
            SugarLevel::Percent100 => "100%",
            SugarLevel::Percent80 => "80%",
            SugarLevel::Percent50 => "50%",
            SugarLevel::Percent30 => "30%",
            SugarLevel::Percent0 => "0%",
        }
    }
}

impl fmt::Display for SugarLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Cup Size
// =============================================================================

/// Serving size. Each size consumes one cup of the matching container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CupSize {
    Small,
    #[default]
    Normal,
    Large,
}

impl CupSize {
    pub const ALL: [CupSize; 3] = [CupSize::Small, CupSize::Normal, CupSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            CupSize::Small => "small",
            CupSize::Normal => "normal",
            CupSize::Large => "large",
        }
    }

    /// Inventory name of the cup this size consumes.
    ///
    /// ```rust
    /// use teahouse_core::types::CupSize;
    ///
    /// assert_eq!(CupSize::Normal.container_name(), "Medium Cup");
    /// ```
    pub fn container_name(&self) -> &'static str {
        match self {
            CupSize::Small => SMALL_CUP,
            CupSize::Normal => MEDIUM_CUP,
            CupSize::Large => LARGE_CUP,
        }
    }
}

impl fmt::Display for CupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Ice Level
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum IceLevel {
    NoIce,
    Less,
    #[default]
    Regular,
    Hot,
}

impl IceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IceLevel::NoIce => "no_ice",
            IceLevel::Less => "less",
            IceLevel::Regular => "regular",
            IceLevel::Hot => "hot",
        }
    }
}

impl fmt::Display for IceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Modification Kind
// =============================================================================

/// What a modification does to its ingredient.
///
/// ## Effect on Inventory
/// ```text
/// ADD, EXTRA    → consume more  (+magnitude × line quantity)
/// REMOVE, LESS  → return stock  (−magnitude × line quantity)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModificationKind {
    #[default]
    Add,
    Remove,
    Less,
    Extra,
}

impl ModificationKind {
    pub const ALL: [ModificationKind; 4] = [
        ModificationKind::Add,
        ModificationKind::Remove,
        ModificationKind::Less,
        ModificationKind::Extra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModificationKind::Add => "ADD",
            ModificationKind::Remove => "REMOVE",
            ModificationKind::Less => "LESS",
            ModificationKind::Extra => "EXTRA",
        }
    }

    /// True when the modification draws more of the ingredient.
    pub fn consumes(&self) -> bool {
        matches!(self, ModificationKind::Add | ModificationKind::Extra)
    }

    /// Applies this kind's sign to a non-negative magnitude.
    pub fn signed(&self, magnitude: Quantity) -> Quantity {
        if self.consumes() {
            magnitude
        } else {
            -magnitude
        }
    }
}

impl fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse. Order clients send "add" as often as "ADD".
impl FromStr for ModificationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADD" => Ok(ModificationKind::Add),
            "REMOVE" => Ok(ModificationKind::Remove),
            "LESS" => Ok(ModificationKind::Less),
            "EXTRA" => Ok(ModificationKind::Extra),
            _ => Err(ValidationError::NotAllowed {
                field: "modification_type".to_string(),
                allowed: ModificationKind::ALL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// One ingredient of a product's recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RecipeEntry {
    pub ingredient_id: String,
    pub ingredient_name: String,
    /// Amount consumed per drink, in tenths.
    pub quantity_per_unit_tenths: i64,
}

impl RecipeEntry {
    #[inline]
    pub fn quantity_per_unit(&self) -> Quantity {
        Quantity::from_tenths(self.quantity_per_unit_tenths)
    }
}

/// A drink on the menu.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the menu and the receipt.
    pub name: String,

    /// Current menu price in cents. Orders copy this at sale time.
    pub unit_price_cents: i64,

    /// Dietary flag.
    pub vegan: bool,

    /// Menu section ("Milk Tea", "Fruit Tea", ...).
    pub category: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Ingredients consumed per drink, in recipe order.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub recipe: Vec<RecipeEntry>,
}

impl Product {
    /// Returns the current price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Ingredient
// =============================================================================

/// An inventory row.
///
/// Add-on ingredients (`is_add_on`) are the ones customers may request as
/// modifications; structural ingredients and cups are not.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    /// On-hand amount in tenths. May be negative under the permissive
    /// stock policy.
    pub on_hand_tenths: i64,
    pub is_add_on: bool,
    pub price_per_unit_cents: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    #[inline]
    pub fn on_hand(&self) -> Quantity {
        Quantity::from_tenths(self.on_hand_tenths)
    }

    #[inline]
    pub fn price_per_unit(&self) -> Option<Money> {
        self.price_per_unit_cents.map(Money::from_cents)
    }
}

// =============================================================================
// People
// =============================================================================

/// A customer known by an external identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    /// Token issued by the identity provider. Unique per customer.
    pub external_token: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeRole {
    #[default]
    Cashier,
    Manager,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub role: EmployeeRole,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A committed order. Exactly one of `employee_id` / `customer_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub total_cents: i64,
    pub employee_id: Option<String>,
    pub customer_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// True for orders rung up at the register.
    pub fn is_staff_order(&self) -> bool {
        self.employee_id.is_some()
    }
}

/// A line of an order.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub sugar_level: SugarLevel,
    pub size: CupSize,
    pub ice_level: IceLevel,
    /// Position within the order, starting at 0.
    pub position: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LineItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// A recorded modification. Both deltas are stored as magnitudes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Modification {
    pub id: String,
    pub line_item_id: String,
    /// May reference an ingredient that no longer exists.
    pub ingredient_id: String,
    pub kind: ModificationKind,
    pub quantity_change_tenths: i64,
    pub price_change_cents: i64,
    pub position: i64,
}

impl Modification {
    /// The inventory effect per drink, with the kind's sign applied.
    pub fn signed_quantity(&self) -> Quantity {
        self.kind
            .signed(Quantity::from_tenths(self.quantity_change_tenths))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_defaults() {
        assert_eq!(SugarLevel::default(), SugarLevel::Percent100);
        assert_eq!(CupSize::default(), CupSize::Normal);
        assert_eq!(IceLevel::default(), IceLevel::Regular);
        assert_eq!(ModificationKind::default(), ModificationKind::Add);
    }

    #[test]
    fn test_attribute_wire_names() {
        assert_eq!(serde_json::to_string(&SugarLevel::Percent30).unwrap(), "\"30%\"");
        assert_eq!(serde_json::to_string(&IceLevel::NoIce).unwrap(), "\"no_ice\"");
        assert_eq!(serde_json::to_string(&ModificationKind::Extra).unwrap(), "\"EXTRA\"");

        let size: CupSize = serde_json::from_str("\"large\"").unwrap();
        assert_eq!(size, CupSize::Large);
        assert!(serde_json::from_str::<SugarLevel>("\"75%\"").is_err());
    }

    #[test]
    fn test_container_names() {
        assert_eq!(CupSize::Small.container_name(), "Small Cup");
        assert_eq!(CupSize::Normal.container_name(), "Medium Cup");
        assert_eq!(CupSize::Large.container_name(), "Large Cup");
    }

    #[test]
    fn test_modification_kind_parsing() {
        assert_eq!("extra".parse::<ModificationKind>().unwrap(), ModificationKind::Extra);
        assert_eq!(" Remove ".parse::<ModificationKind>().unwrap(), ModificationKind::Remove);
        assert!(matches!(
            "double".parse::<ModificationKind>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_modification_kind_sign() {
        let one = Quantity::ONE;
        assert_eq!(ModificationKind::Add.signed(one), one);
        assert_eq!(ModificationKind::Extra.signed(one), one);
        assert_eq!(ModificationKind::Remove.signed(one), -one);
        assert_eq!(ModificationKind::Less.signed(one), -one);
    }
}
