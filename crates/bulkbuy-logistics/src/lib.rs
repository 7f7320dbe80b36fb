//! # BulkBuy Logistics
//!
//! 物流模型：車隊規模、運輸成本、碳排放比較

pub mod emissions;
pub mod fleet;
pub mod transport;

// Re-export 主要類型
pub use emissions::{EmissionsComparison, EmissionsModel};
pub use fleet::{BindingCapacity, FleetRequirement, FleetSizer};
pub use transport::TransportCost;
