//! 優化參數與搜尋配置

use serde::{Deserialize, Serialize};

use crate::{ensure_fraction, ensure_positive, BulkBuyError, Result};

/// 單次優化請求的參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationParameters {
    /// 目標毛利率 [0, 1]
    pub target_margin: f64,

    /// 折扣上限 [0, 1]
    pub max_discount: f64,

    /// 配送距離（公里）
    pub distance_km: f64,

    /// 每公里運輸成本
    pub cost_per_km: f64,

    /// 貨車容積上限（立方公尺）
    pub truck_volume_capacity: f64,

    /// 貨車載重上限（公斤）
    pub truck_weight_capacity: f64,

    /// 服務的住戶數（碳排放比較使用）
    pub num_households: u32,

    /// 碳排放係數（團購路線距離取 `distance_km`）
    pub emission_factors: EmissionFactors,
}

impl Default for OptimizationParameters {
    fn default() -> Self {
        Self {
            target_margin: 0.2,
            max_discount: 0.3,
            distance_km: 10.0,
            cost_per_km: 2.5,
            truck_volume_capacity: 15.0,
            truck_weight_capacity: 3000.0,
            num_households: 50,
            emission_factors: EmissionFactors::default(),
        }
    }
}

impl OptimizationParameters {
    /// 創建新的優化參數
    pub fn new(target_margin: f64, max_discount: f64) -> Self {
        Self {
            target_margin,
            max_discount,
            ..Self::default()
        }
    }

    /// 從 JSON 載入參數
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BulkBuyError::invalid_input("optimization_parameters", e.to_string()))
    }

    /// 建構器模式：設置配送路線（距離與每公里成本）
    pub fn with_route(mut self, distance_km: f64, cost_per_km: f64) -> Self {
        self.distance_km = distance_km;
        self.cost_per_km = cost_per_km;
        self
    }

    /// 建構器模式：設置貨車容量
    pub fn with_truck_capacity(mut self, volume: f64, weight: f64) -> Self {
        self.truck_volume_capacity = volume;
        self.truck_weight_capacity = weight;
        self
    }

    /// 建構器模式：設置住戶數
    pub fn with_households(mut self, num_households: u32) -> Self {
        self.num_households = num_households;
        self
    }

    /// 建構器模式：設置碳排放係數
    pub fn with_emission_factors(mut self, factors: EmissionFactors) -> Self {
        self.emission_factors = factors;
        self
    }

    /// 驗證參數（任何計算之前）
    pub fn validate(&self) -> Result<()> {
        ensure_fraction("target_margin", self.target_margin)?;
        ensure_fraction("max_discount", self.max_discount)?;
        ensure_positive("distance_km", self.distance_km)?;
        ensure_positive("cost_per_km", self.cost_per_km)?;
        ensure_positive("truck_volume_capacity", self.truck_volume_capacity)?;
        ensure_positive("truck_weight_capacity", self.truck_weight_capacity)?;
        if self.num_households == 0 {
            return Err(BulkBuyError::invalid_input("num_households", "必須大於 0"));
        }
        self.emission_factors.validate()
    }
}

/// 個別配送與團購配送的碳排放係數
///
/// 住戶數與團購路線距離取自 [`OptimizationParameters`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmissionFactors {
    /// 個別配送每戶距離（公里）
    pub individual_distance_km: f64,

    /// 個別配送車輛每公里排放（kg CO2）
    pub emission_per_km_individual: f64,

    /// 貨車每公里排放（kg CO2）
    pub emission_per_km_truck: f64,
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self {
            individual_distance_km: 4.0,
            emission_per_km_individual: 0.18,
            emission_per_km_truck: 0.55,
        }
    }
}

impl EmissionFactors {
    /// 驗證係數（允許 0，不允許負數或非有限值）
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("individual_distance_km", self.individual_distance_km),
            ("emission_per_km_individual", self.emission_per_km_individual),
            ("emission_per_km_truck", self.emission_per_km_truck),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(BulkBuyError::invalid_input(
                    format!("emission_factors.{name}"),
                    format!("不可為負數，實際為 {value}"),
                ));
            }
        }

        Ok(())
    }
}

/// 混沌初始化時折扣的產生方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChaosPolicy {
    /// 每一行獨立推進混沌狀態（折扣各不相同）
    #[default]
    PerLine,

    /// 每次迭代推進一次，所有行共用同一折扣
    Uniform,
}

/// 兩階段搜尋的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 混沌初始化迭代次數
    pub chaos_iterations: usize,

    /// 混沌狀態初值，須在 (0, 1) 內
    pub chaos_seed: f64,

    /// 折扣產生方式
    pub chaos_policy: ChaosPolicy,

    /// 備援隨機嘗試次數
    pub fallback_attempts: usize,

    /// 備援隨機折扣上限
    pub fallback_max_discount: f64,

    /// 備援亂數種子
    pub fallback_rng_seed: u64,

    /// 模式搜尋迭代次數
    pub pattern_iterations: usize,

    /// 初始步長
    pub initial_step: f64,

    /// 收斂容差
    pub epsilon: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            chaos_iterations: 1000,
            chaos_seed: 0.7,
            chaos_policy: ChaosPolicy::PerLine,
            fallback_attempts: 100,
            fallback_max_discount: 0.05,
            fallback_rng_seed: 42,
            pattern_iterations: 1000,
            initial_step: 0.05,
            epsilon: 1e-4,
        }
    }
}

impl SearchConfig {
    /// 從 JSON 載入配置
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BulkBuyError::invalid_input("search_config", e.to_string()))
    }

    /// 建構器模式：設置混沌初始化
    pub fn with_chaos(mut self, iterations: usize, seed: f64, policy: ChaosPolicy) -> Self {
        self.chaos_iterations = iterations;
        self.chaos_seed = seed;
        self.chaos_policy = policy;
        self
    }

    /// 建構器模式：設置備援搜尋
    pub fn with_fallback(mut self, attempts: usize, max_discount: f64, rng_seed: u64) -> Self {
        self.fallback_attempts = attempts;
        self.fallback_max_discount = max_discount;
        self.fallback_rng_seed = rng_seed;
        self
    }

    /// 建構器模式：設置模式搜尋
    pub fn with_pattern_search(mut self, iterations: usize, initial_step: f64, epsilon: f64) -> Self {
        self.pattern_iterations = iterations;
        self.initial_step = initial_step;
        self.epsilon = epsilon;
        self
    }

    pub fn validate(&self) -> Result<()> {
        // 0 與 1 都是 logistic map 的不動點（或會落入不動點）
        if !(self.chaos_seed > 0.0 && self.chaos_seed < 1.0) {
            return Err(BulkBuyError::invalid_input(
                "chaos_seed",
                format!("必須介於 0 與 1 之間（不含端點），實際為 {}", self.chaos_seed),
            ));
        }
        ensure_fraction("fallback_max_discount", self.fallback_max_discount)?;
        ensure_positive("initial_step", self.initial_step)?;
        ensure_positive("epsilon", self.epsilon)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_parameters() {
        let params = OptimizationParameters::default();

        assert_eq!(params.target_margin, 0.2);
        assert_eq!(params.num_households, 50);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_parameters_builder() {
        let params = OptimizationParameters::new(0.15, 0.4)
            .with_route(25.0, 1.8)
            .with_truck_capacity(20.0, 5000.0)
            .with_households(120)
            .with_emission_factors(EmissionFactors {
                emission_per_km_truck: 0.9,
                ..EmissionFactors::default()
            });

        assert_eq!(params.max_discount, 0.4);
        assert_eq!(params.distance_km, 25.0);
        assert_eq!(params.truck_weight_capacity, 5000.0);
        assert_eq!(params.num_households, 120);
        assert_eq!(params.emission_factors.emission_per_km_truck, 0.9);
        assert!(params.validate().is_ok());
    }

    #[rstest]
    #[case(OptimizationParameters::new(1.2, 0.3))]
    #[case(OptimizationParameters::new(0.2, -0.1))]
    #[case(OptimizationParameters::new(0.2, 0.3).with_route(0.0, 2.0))]
    #[case(OptimizationParameters::new(0.2, 0.3).with_truck_capacity(15.0, -1.0))]
    #[case(OptimizationParameters::new(0.2, 0.3).with_households(0))]
    fn test_invalid_parameters(#[case] params: OptimizationParameters) {
        assert!(params.validate().unwrap_err().is_input_error());
    }

    #[test]
    fn test_parameters_from_json_uses_defaults() {
        let params =
            OptimizationParameters::from_json_str(r#"{ "target_margin": 0.25, "distance_km": 8 }"#)
                .unwrap();

        assert_eq!(params.target_margin, 0.25);
        assert_eq!(params.distance_km, 8.0);
        assert_eq!(params.max_discount, 0.3);
        assert_eq!(params.emission_factors, EmissionFactors::default());

        assert!(OptimizationParameters::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_emission_factors_reject_request_level_fields() {
        // 住戶數只在參數頂層設定，放在係數內不可被默默忽略
        let json = r#"{ "num_households": 80, "emission_factors": { "num_households": 120 } }"#;
        let err = OptimizationParameters::from_json_str(json).unwrap_err();
        assert!(err.is_input_error());

        let params = OptimizationParameters::from_json_str(
            r#"{ "num_households": 80, "emission_factors": { "emission_per_km_truck": 0.6 } }"#,
        )
        .unwrap();
        assert_eq!(params.num_households, 80);
        assert_eq!(params.emission_factors.emission_per_km_truck, 0.6);
        assert_eq!(params.emission_factors.individual_distance_km, 4.0);
    }

    #[test]
    fn test_search_config() {
        let config = SearchConfig::default();
        assert_eq!(config.chaos_iterations, 1000);
        assert_eq!(config.chaos_seed, 0.7);
        assert_eq!(config.chaos_policy, ChaosPolicy::PerLine);
        assert!(config.validate().is_ok());

        let uniform = SearchConfig::from_json_str(r#"{ "chaos_policy": "Uniform" }"#).unwrap();
        assert_eq!(uniform.chaos_policy, ChaosPolicy::Uniform);
        assert_eq!(uniform.pattern_iterations, 1000);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(1.5)]
    fn test_invalid_chaos_seed(#[case] seed: f64) {
        let config = SearchConfig::default().with_chaos(10, seed, ChaosPolicy::PerLine);
        assert!(config.validate().is_err());
    }
}
