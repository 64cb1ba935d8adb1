//! Application layer - use cases over the domain and ports.
//!
//! - `decisions` - rule and decision board with write-through persistence
//! - `preferences` - theme settings
//! - `realtime` - channel registry shared by realtime features
//! - `delivery` - per-order tracking channels and tracking links
//! - `business` - CRUD services over the hosted backend tables

pub mod business;
pub mod decisions;
pub mod delivery;
pub mod preferences;
pub mod realtime;

pub use business::{
    BusinessError, EmployeeFilter, HrService, InventoryService, PeopleFilter, PeopleService,
    ProductFilter, SaleFilter, SalesService,
};
pub use decisions::{DecisionRepository, DecisionService};
pub use delivery::{DeliveryError, DeliveryTracking, TrackingLinkOutcome};
pub use preferences::{PreferencesRepository, Theme, ThemePreferences};
pub use realtime::{ChannelRegistry, Subscription};
