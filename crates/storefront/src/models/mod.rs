//! Domain models for the storefront.

pub mod order;
pub mod product;
pub mod session;
pub mod tracking;

pub use order::{Order, OrderDraft, OrderItemSnapshot, ShippingInfo};
pub use product::{CatalogProduct, Variant};
pub use session::{AdminCapability, CurrentUser, keys as session_keys};
pub use tracking::{
    LifecycleError, STEP_LABELS, StatusUpdate, StepOutcome, TrackingStep, TrackingSteps,
};
