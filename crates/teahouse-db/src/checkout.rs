//! # Order Transaction Coordinator
//!
//! Places one order as one SQLite transaction: the order rows and the
//! inventory they consume commit together or not at all.
//!
//! ## Stages
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       place_order(request)                              │
//! │                                                                         │
//! │  request.validate()            pure, before any transaction            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Started ─────────► BEGIN                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Validated ───────► customer upsert (or staff FK check via the order   │
//! │       │             insert), order header, products loaded             │
//! │       ▼                                                                 │
//! │  Persisted ───────► line items + modifications, consumption plan built │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InventoryApplied ► ledger.apply_deltas(plan)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Committed ───────► COMMIT, then notifier (errors logged only)         │
//! │                                                                         │
//! │  Any error before COMMIT ──► Aborted: explicit ROLLBACK                │
//! │  Caller drops the future ──► transaction drop rolls back               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The first statement inside the transaction is always a write (customer
//! upsert or order insert). From there on the transaction holds SQLite's
//! write lock, so concurrent orders run one after another at the database
//! and every ledger update sees the stock left by the previous commit.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{DbError, OrderError};
use crate::ledger::{InventoryLedger, StockAdjustment, StockPolicy};
use crate::notify::{NotificationError, OrderNotifier, TracingNotifier};
use crate::pool::Database;
use crate::repository::customer::CustomerRepository;
use crate::repository::inventory::InventoryRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use teahouse_core::modification::IngredientDirectory;
use teahouse_core::plan::ConsumptionPlan;
use teahouse_core::recipe::ContainerIndex;
use teahouse_core::request::{Actor, OrderRequest, ValidatedOrder};
use teahouse_core::summary::{OrderSummary, SummaryItem};
use teahouse_core::{
    LineItem, Modification, Order, Product, ValidationError, DEFAULT_CUSTOMER_NAME,
};

/// Default upper bound on a notifier call.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(2);

// =============================================================================
// Order Context
// =============================================================================

/// Where an order is in its transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStage {
    Started,
    Validated,
    Persisted,
    InventoryApplied,
    Committed,
    Aborted,
}

/// Everything one order holds until it commits or rolls back.
struct OrderContext {
    tx: Transaction<'static, Sqlite>,
    stage: OrderStage,
    order_id: String,
    placed_at: DateTime<Utc>,
    products: HashMap<String, Product>,
    plan: ConsumptionPlan,
}

impl OrderContext {
    fn new(tx: Transaction<'static, Sqlite>) -> Self {
        let context = OrderContext {
            tx,
            stage: OrderStage::Started,
            order_id: Uuid::new_v4().to_string(),
            placed_at: Utc::now(),
            products: HashMap::new(),
            plan: ConsumptionPlan::new(),
        };
        debug!(order_id = %context.order_id, stage = ?context.stage, "Order transaction started");
        context
    }

    fn advance(&mut self, next: OrderStage) {
        debug!(order_id = %self.order_id, from = ?self.stage, to = ?next, "Order stage");
        self.stage = next;
    }

    async fn commit(mut self) -> Result<(String, DateTime<Utc>), OrderError> {
        self.advance(OrderStage::Committed);
        let OrderContext {
            tx,
            order_id,
            placed_at,
            ..
        } = self;

        tx.commit().await.map_err(DbError::from)?;

        Ok((order_id, placed_at))
    }

    async fn abort(mut self, reason: &OrderError) {
        let failed_at = self.stage;
        self.advance(OrderStage::Aborted);
        warn!(
            order_id = %self.order_id,
            stage = ?failed_at,
            error = %reason,
            "Order aborted"
        );

        if let Err(e) = self.tx.rollback().await {
            warn!(error = %e, "Rollback failed; the connection discards the transaction");
        }
    }
}

/// What the transaction produced before commit.
struct Draft {
    summary_items: Vec<SummaryItem>,
    customer_name: String,
    recipient_email: Option<String>,
    adjustments: Vec<StockAdjustment>,
}

// =============================================================================
// Coordinator
// =============================================================================

/// A committed order.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order_id: String,
    pub summary: OrderSummary,
    pub adjustments: Vec<StockAdjustment>,
    /// False when no notifier is configured or it failed.
    pub notified: bool,
}

/// Places orders against a [`Database`].
///
/// ## Usage
/// ```rust,ignore
/// let coordinator = OrderCoordinator::new(db)
///     .with_stock_policy(StockPolicy::Strict)
///     .with_notifier(Arc::new(TracingNotifier));
///
/// let placed = coordinator.place_order(request).await?;
/// println!("{}", placed.summary.render_receipt());
/// ```
#[derive(Clone)]
pub struct OrderCoordinator {
    db: Database,
    ledger: InventoryLedger,
    notifier: Option<Arc<dyn OrderNotifier>>,
    notify_timeout: Duration,
}

impl OrderCoordinator {
    /// Permissive stock policy, no notifier.
    pub fn new(db: Database) -> Self {
        OrderCoordinator {
            db,
            ledger: InventoryLedger::default(),
            notifier: None,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    /// Stock policy and notification settings from `config`. Notifications
    /// go to the log when enabled.
    pub fn from_config(db: Database, config: &AppConfig) -> Self {
        let coordinator = Self::new(db)
            .with_stock_policy(config.stock_policy())
            .with_notify_timeout(config.notify_timeout());

        if config.notifications.enabled {
            coordinator.with_notifier(Arc::new(TracingNotifier))
        } else {
            coordinator
        }
    }

    pub fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.ledger = InventoryLedger::new(policy);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn OrderNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn stock_policy(&self) -> StockPolicy {
        self.ledger.policy()
    }

    /// Places an order.
    ///
    /// ## Returns
    /// * `Ok(PlacedOrder)` - committed; notification already attempted
    /// * `Err(OrderError)` - nothing was written
    ///
    /// ## Errors
    /// - `Validation` - malformed request, or an employee id that does not exist
    /// - `UnknownProduct` - a line item names a product not on the menu
    /// - `InsufficientStock` - strict stock policy refused the order
    /// - `Conflict` - the customer upsert lost a race twice
    /// - `Storage` - the database failed
    pub async fn place_order(&self, request: OrderRequest) -> Result<PlacedOrder, OrderError> {
        let order = request.validate()?;

        let computed = order.computed_total();
        if computed != order.total {
            warn!(
                submitted = %order.total,
                computed = %computed,
                "Order total differs from line items; storing submitted total"
            );
        }

        let mut context = OrderContext::new(self.db.begin().await?);

        let draft = match self.run(&mut context, &order).await {
            Ok(draft) => draft,
            Err(err) => {
                context.abort(&err).await;
                return Err(err);
            }
        };

        let (order_id, placed_at) = context.commit().await?;
        info!(
            order_id = %order_id,
            total = %order.total,
            lines = order.items.len(),
            adjustments = draft.adjustments.len(),
            "Order committed"
        );

        let summary = OrderSummary {
            order_id: order_id.clone(),
            customer_name: draft.customer_name,
            recipient_email: draft.recipient_email,
            total_cents: order.total.cents(),
            placed_at,
            items: draft.summary_items,
        };

        let notified = self.dispatch(&summary).await;

        Ok(PlacedOrder {
            order_id,
            summary,
            adjustments: draft.adjustments,
            notified,
        })
    }

    /// Everything between BEGIN and COMMIT.
    async fn run(
        &self,
        context: &mut OrderContext,
        order: &ValidatedOrder,
    ) -> Result<Draft, OrderError> {
        // ---------------------------------------------------------------------
        // Validated: actor, order header, products
        // ---------------------------------------------------------------------
        let (customer_name, recipient_email) = self.write_header(context, order).await?;

        for item in &order.items {
            if context.products.contains_key(&item.product_id) {
                continue;
            }
            let product = ProductRepository::get_by_id_in_tx(&mut context.tx, &item.product_id)
                .await?
                .ok_or_else(|| OrderError::UnknownProduct(item.product_id.clone()))?;
            context.products.insert(product.id.clone(), product);
        }

        let mut modified: Vec<&str> = order
            .items
            .iter()
            .flat_map(|item| item.modifications.iter())
            .map(|modification| modification.ingredient_id.as_str())
            .collect();
        modified.sort_unstable();
        modified.dedup();

        let inventory =
            InventoryRepository::list_for_order_in_tx(&mut context.tx, &modified).await?;
        let containers = ContainerIndex::from_inventory(&inventory);
        let directory = IngredientDirectory::from_inventory(&inventory);

        context.advance(OrderStage::Validated);

        // ---------------------------------------------------------------------
        // Persisted: line items, modifications, consumption plan
        // ---------------------------------------------------------------------
        let mut summary_items = Vec::with_capacity(order.items.len());

        for (position, item) in order.items.iter().enumerate() {
            let product = context
                .products
                .get(&item.product_id)
                .ok_or_else(|| OrderError::UnknownProduct(item.product_id.clone()))?;

            let line = LineItem {
                id: Uuid::new_v4().to_string(),
                order_id: context.order_id.clone(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
                sugar_level: item.sugar_level,
                size: item.size,
                ice_level: item.ice_level,
                position: position as i64,
                created_at: context.placed_at,
            };

            let effects = context
                .plan
                .add_line(product, item, &containers, &directory);
            let summary_item = SummaryItem::from_line(product.name.clone(), item, &effects);

            for skipped in effects.skipped() {
                warn!(
                    order_id = %context.order_id,
                    ingredient_id = %skipped.ingredient_id,
                    kind = %skipped.kind,
                    "Modification names an ingredient not in inventory; recorded without stock effect"
                );
            }

            OrderRepository::insert_line_item_in_tx(&mut context.tx, &line).await?;

            for (mod_position, spec) in item.modifications.iter().enumerate() {
                let modification = Modification {
                    id: Uuid::new_v4().to_string(),
                    line_item_id: line.id.clone(),
                    ingredient_id: spec.ingredient_id.clone(),
                    kind: spec.kind,
                    quantity_change_tenths: spec.quantity_change.tenths(),
                    price_change_cents: spec.price_change.cents(),
                    position: mod_position as i64,
                };
                OrderRepository::insert_modification_in_tx(&mut context.tx, &modification)
                    .await?;
            }

            summary_items.push(summary_item);
        }

        context.advance(OrderStage::Persisted);

        // ---------------------------------------------------------------------
        // InventoryApplied
        // ---------------------------------------------------------------------
        let adjustments = self
            .ledger
            .apply_deltas(&mut context.tx, &context.plan)
            .await?;

        context.advance(OrderStage::InventoryApplied);

        Ok(Draft {
            summary_items,
            customer_name,
            recipient_email,
            adjustments,
        })
    }

    /// Resolves the actor and inserts the order header. Both are writes, so
    /// the transaction takes the write lock here.
    ///
    /// Returns the greeting name and receipt email.
    async fn write_header(
        &self,
        context: &mut OrderContext,
        order: &ValidatedOrder,
    ) -> Result<(String, Option<String>), OrderError> {
        let mut header = Order {
            id: context.order_id.clone(),
            total_cents: order.total.cents(),
            employee_id: None,
            customer_id: None,
            created_at: context.placed_at,
        };

        match &order.actor {
            Actor::Customer(identity) => {
                let customer = CustomerRepository::resolve_or_create(
                    &mut context.tx,
                    &identity.external_token,
                    identity.email.as_deref(),
                    identity.name.as_deref(),
                )
                .await?;

                header.customer_id = Some(customer.id);
                OrderRepository::insert_order_in_tx(&mut context.tx, &header).await?;

                Ok((
                    customer
                        .name
                        .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
                    customer.email,
                ))
            }
            Actor::Staff { employee_id } => {
                header.employee_id = Some(employee_id.clone());
                match OrderRepository::insert_order_in_tx(&mut context.tx, &header).await {
                    Ok(()) => Ok((DEFAULT_CUSTOMER_NAME.to_string(), None)),
                    Err(DbError::ForeignKeyViolation { .. }) => {
                        debug!(employee_id = %employee_id, "Unknown employee");
                        Err(ValidationError::MissingActor.into())
                    }
                    Err(err) => Err(err.into()),
                }
            }
        }
    }

    /// Hands the summary to the notifier. Never fails the order.
    async fn dispatch(&self, summary: &OrderSummary) -> bool {
        let Some(notifier) = &self.notifier else {
            return false;
        };

        let result = match tokio::time::timeout(self.notify_timeout, notifier.notify(summary)).await
        {
            Ok(result) => result,
            Err(_) => Err(NotificationError::TimedOut(
                self.notify_timeout.as_millis() as u64
            )),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(order_id = %summary.order_id, error = %e, "Order notification failed");
                false
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
