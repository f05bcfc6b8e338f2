//! # Repository Module
//!
//! Database repository implementations for Teahouse POS.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pool-backed (&self)                 Transaction-scoped (conn)         │
//! │  ───────────────────                 ─────────────────────────         │
//! │  db.products().insert(&p)            ProductRepository::               │
//! │  db.inventory().restock(id, q)         get_by_id_in_tx(&mut tx, id)    │
//! │  db.orders().line_items(id)          OrderRepository::                 │
//! │                                        insert_order_in_tx(&mut tx, o)  │
//! │  Each call is its own statement.     Runs inside the caller's order    │
//! │  Menu admin, seeding, reads.         transaction; nothing commits      │
//! │                                      until the coordinator does.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer resolution by external token
//! - [`employee::EmployeeRepository`] - Staff records
//! - [`inventory::InventoryRepository`] - Ingredients and restocking
//! - [`order::OrderRepository`] - Orders, line items and modifications
//! - [`product::ProductRepository`] - Menu and recipes

pub mod customer;
pub mod employee;
pub mod inventory;
pub mod order;
pub mod product;
