//! Pricing steps.
//!
//! Steps that talk to collaborators are structs holding them; the pure
//! arithmetic steps live in [`steps`] as plain functions.

mod error_handler;
mod final_price;
mod input;
mod notification;
pub mod steps;

pub use error_handler::{ERROR_TYPE, ErrorHandlerNode};
pub use final_price::FinalPriceNode;
pub use input::InputNode;
pub use notification::NotificationNode;
