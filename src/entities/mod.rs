pub mod alert_record;
pub mod inventory_record;
pub mod stock_movement;
pub mod store_location;

pub use alert_record::{AlertPriority, AlertStatus, AlertType};
pub use stock_movement::MovementType;
