//! # BulkBuy Core
//!
//! 社區團購折扣優化的核心資料模型、配置與錯誤類型

pub mod config;
pub mod discount;
pub mod product;

// Re-export 主要類型
pub use config::{ChaosPolicy, EmissionFactors, OptimizationParameters, SearchConfig};
pub use discount::DiscountVector;
pub use product::{OrderLine, ProductCostProfile};

/// 團購優化錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BulkBuyError {
    /// 輸入參數不合法（計算前即拒絕）
    #[error("無效的輸入 `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    /// 商品與數量陣列長度不一致
    #[error("商品數量 ({products}) 與訂購數量筆數 ({quantities}) 不一致")]
    LengthMismatch { products: usize, quantities: usize },

    /// 即使完全不打折也無法達到目標毛利率
    #[error(
        "零折扣下仍不可行：約束值 {constraint_value:.4}，目標毛利率 {target_margin}，運輸成本 {transport_cost:.2}"
    )]
    InfeasibleAtZeroDiscount {
        constraint_value: f64,
        target_margin: f64,
        transport_cost: f64,
    },

    /// 初始化搜尋（含備援）未找到任何可行解
    #[error(
        "初始化階段未找到可行解：混沌迭代 {iterations} 次、備援嘗試 {fallback_attempts} 次，折扣上限 {max_discount}"
    )]
    NoFeasibleSolutionFound {
        iterations: usize,
        fallback_attempts: usize,
        max_discount: f64,
    },

    /// 數值計算錯誤（NaN、溢位、Decimal 轉換失敗）
    #[error("計算錯誤: {0}")]
    Computation(String),
}

impl BulkBuyError {
    /// 建立輸入錯誤
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 是否為不可行類錯誤（參數需調整，而非程式錯誤）
    pub fn is_infeasibility(&self) -> bool {
        matches!(
            self,
            Self::InfeasibleAtZeroDiscount { .. } | Self::NoFeasibleSolutionFound { .. }
        )
    }

    /// 是否為輸入錯誤
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::LengthMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, BulkBuyError>;

/// 檢查數值為有限正數
pub fn ensure_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BulkBuyError::invalid_input(field, format!("必須為正數，實際為 {value}")))
    }
}

/// 檢查數值為 [0, 1] 區間內的比例
pub fn ensure_fraction(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BulkBuyError::invalid_input(field, format!("必須介於 0 與 1 之間，實際為 {value}")))
    }
}
