//! # BulkBuy
//!
//! 社區團購折扣優化引擎
//!
//! 依訂單計算所需車隊與運輸成本，在目標毛利率約束下以
//! 混沌初始化 + 模式搜尋求出各商品折扣，並比較團購與個別配送的碳排放。
//!
//! ```no_run
//! use bulkbuy::{optimize, OptimizationParameters, ProductCostProfile};
//! use rust_decimal::Decimal;
//!
//! let products = vec![ProductCostProfile::new(
//!     "RICE-5KG".to_string(),
//!     Decimal::new(1200, 2),
//!     Decimal::new(800, 2),
//!     0.01,
//!     5.0,
//! )];
//! let params = OptimizationParameters::new(0.15, 0.3);
//!
//! let result = optimize(&products, &[80], &params)?;
//! println!("折扣 {:?}，毛利率 {:.3}", result.discounts, result.final_margin);
//! # Ok::<(), bulkbuy::BulkBuyError>(())
//! ```

pub use bulkbuy_core::{
    BulkBuyError, ChaosPolicy, DiscountVector, EmissionFactors, OptimizationParameters, OrderLine,
    ProductCostProfile, Result, SearchConfig,
};
pub use bulkbuy_logistics::{
    BindingCapacity, EmissionsComparison, EmissionsModel, FleetRequirement, FleetSizer,
    TransportCost,
};
pub use bulkbuy_optimizer::{
    DiscountOptimizer, FeasibilityModel, LineOutcome, OptimizationRequest, OptimizationResult,
    OptimizationWarning, SearchStats, SeedSource, WarningKind,
};

/// 以預設搜尋配置執行一次折扣優化
pub fn optimize(
    products: &[ProductCostProfile],
    quantities: &[u32],
    params: &OptimizationParameters,
) -> Result<OptimizationResult> {
    DiscountOptimizer::default().optimize(products, quantities, params)
}
