//! Pure stock-health core: classification and restock scheduling.
//!
//! Everything in this module is a total function of its inputs. The stock
//! ledger calls into it synchronously after every mutation so the derived
//! columns on an inventory record are never stale.

pub mod classifier;
pub mod policy;
pub mod scheduler;

pub use classifier::{classify, StockAssessment, StockStatus, TriggerReason};
pub use policy::StockPolicy;
pub use scheduler::{schedule, RestockCadence, RestockPlan};
