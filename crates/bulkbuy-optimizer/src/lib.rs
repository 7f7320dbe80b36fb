//! # BulkBuy Optimizer
//!
//! 折扣優化引擎：毛利率約束下最大化數量加權折扣
//! （混沌初始化 + 模式搜尋）

pub mod chaotic;
pub mod feasibility;
pub mod optimizer;
pub mod pattern_search;
pub mod pricing;

// Re-export 主要類型
pub use chaotic::{ChaoticInitializer, InitialSolution, LogisticMap, SeedSource};
pub use feasibility::FeasibilityModel;
pub use optimizer::{DiscountOptimizer, OptimizationRequest};
pub use pattern_search::{PatternSearchRefiner, RefinedSolution, RefinementStats};
pub use pricing::{LineOutcome, PricingSummary};

use bulkbuy_core::DiscountVector;
use bulkbuy_logistics::{EmissionsComparison, FleetRequirement};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 優化結果（建立後不再修改）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// 執行ID（供外部寫回使用）
    pub run_id: Uuid,

    /// 計算時間
    pub computed_at: DateTime<Utc>,

    /// 是否可行
    pub feasible: bool,

    /// 最終折扣向量
    pub discounts: DiscountVector,

    /// 目標值（數量加權總折扣）
    pub objective: f64,

    /// 各訂單行的價格與利潤
    pub lines: Vec<LineOutcome>,

    /// 總利潤（已扣運輸成本）
    pub total_profit: Decimal,

    /// 總營收
    pub total_revenue: Decimal,

    /// 最終毛利率
    pub final_margin: f64,

    /// 運輸成本
    pub transport_cost: Decimal,

    /// 車隊需求
    pub fleet: FleetRequirement,

    /// 碳排放比較
    pub emissions: EmissionsComparison,

    /// 搜尋統計
    pub stats: SearchStats,

    /// 警告（不影響結果）
    pub warnings: Vec<OptimizationWarning>,
}

impl OptimizationResult {
    /// 各行折扣後單價
    pub fn final_prices(&self) -> Vec<Decimal> {
        self.lines.iter().map(|l| l.final_price).collect()
    }

    /// 各行利潤
    pub fn profit_per_line(&self) -> Vec<Decimal> {
        self.lines.iter().map(|l| l.profit).collect()
    }

    /// 是否有指定類型的警告
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// 兩階段搜尋的統計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// 初始解來源
    pub seed_source: SeedSource,

    /// 初始目標值
    pub seed_objective: f64,

    /// 混沌迭代次數
    pub chaos_iterations: usize,

    /// 混沌階段可行候選數
    pub feasible_candidates: usize,

    /// 模式搜尋統計
    pub refinement: RefinementStats,
}

/// 優化警告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl OptimizationWarning {
    pub fn new(kind: WarningKind, message: String) -> Self {
        Self { kind, message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// 最終毛利率低於目標的 95%
    MarginBelowTarget,
    /// 混沌搜尋未找到可行解，改用備援初始解
    FallbackInitialization,
    /// 模式搜尋用盡迭代次數仍未收斂
    RefinementNotConverged,
}
