pub mod alerts;
pub mod hub_economics;
pub mod ledger;
pub mod notifications;

pub use alerts::AlertService;
pub use ledger::StockLedgerService;
