//! 優化主流程

use bulkbuy_core::{
    BulkBuyError, DiscountVector, OptimizationParameters, OrderLine, ProductCostProfile,
    SearchConfig,
};
use bulkbuy_logistics::{EmissionsModel, FleetSizer, TransportCost};
use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chaotic::ChaoticInitializer;
use crate::feasibility::FeasibilityModel;
use crate::pattern_search::PatternSearchRefiner;
use crate::pricing::PricingSummary;
use crate::{OptimizationResult, OptimizationWarning, SearchStats, WarningKind};

/// 低於目標毛利率此比例時發出警告
const MARGIN_WARNING_RATIO: f64 = 0.95;

/// 一次優化請求（批次計算用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub products: Vec<ProductCostProfile>,
    pub quantities: Vec<u32>,
    pub params: OptimizationParameters,
}

impl OptimizationRequest {
    pub fn new(
        products: Vec<ProductCostProfile>,
        quantities: Vec<u32>,
        params: OptimizationParameters,
    ) -> Self {
        Self {
            products,
            quantities,
            params,
        }
    }
}

/// 折扣優化器
///
/// 每次呼叫都是獨立、同步、無副作用的計算，可安全地平行執行。
#[derive(Debug, Clone, Default)]
pub struct DiscountOptimizer {
    config: SearchConfig,
}

impl DiscountOptimizer {
    /// 創建新的優化器
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// 主優化入口
    pub fn optimize(
        &self,
        products: &[ProductCostProfile],
        quantities: &[u32],
        params: &OptimizationParameters,
    ) -> bulkbuy_core::Result<OptimizationResult> {
        tracing::info!(
            "開始折扣優化：商品 {} 項，目標毛利率 {}，折扣上限 {}",
            products.len(),
            params.target_margin,
            params.max_discount
        );

        let start_time = std::time::Instant::now();

        // Step 1: 驗證輸入
        tracing::debug!("Step 1: 驗證輸入");
        let lines = self.validate(products, quantities, params)?;

        // Step 2: 車隊規模與運輸成本
        tracing::debug!("Step 2: 車隊規模與運輸成本");
        let fleet = FleetSizer::size(
            &lines,
            params.truck_volume_capacity,
            params.truck_weight_capacity,
        )?;
        let transport_cost =
            TransportCost::calculate(fleet.trucks_required, params.cost_per_km, params.distance_km)?;
        tracing::debug!(
            "需要 {} 輛車，運輸成本 {:.2}",
            fleet.trucks_required,
            transport_cost
        );

        // Step 3: 零折扣可行性
        tracing::debug!("Step 3: 零折扣可行性檢查");
        let model = FeasibilityModel::new(&lines, params.target_margin, transport_cost)?;
        let zero_constraint = model.margin_constraint(&DiscountVector::zeros(lines.len()))?;
        if zero_constraint < 0.0 {
            tracing::warn!(
                "零折扣下仍不可行：約束值 {:.4}（目標毛利率 {}，運輸成本 {:.2}）",
                zero_constraint,
                params.target_margin,
                transport_cost
            );
            return Err(BulkBuyError::InfeasibleAtZeroDiscount {
                constraint_value: zero_constraint,
                target_margin: params.target_margin,
                transport_cost,
            });
        }

        // Step 4: 混沌初始化
        tracing::debug!("Step 4: 混沌初始化");
        let seed = ChaoticInitializer::new(&model, params.max_discount, &self.config).initialize()?;

        // Step 5: 模式搜尋
        tracing::debug!("Step 5: 模式搜尋");
        let refined =
            PatternSearchRefiner::new(&model, params.max_discount, &self.config).refine(&seed.discounts)?;

        if !refined.discounts.is_finite() || !model.is_feasible(&refined.discounts)? {
            tracing::error!("模式搜尋回傳不可行或非有限的折扣向量");
            return Err(BulkBuyError::Computation(
                "模式搜尋回傳不可行或非有限的折扣向量".to_string(),
            ));
        }

        // Step 6: 定價、利潤與碳排放
        tracing::debug!("Step 6: 定價與碳排放");
        let pricing = PricingSummary::compute(&lines, &refined.discounts, transport_cost)?;
        let emissions = EmissionsModel::compare(
            &params.emission_factors,
            params.num_households,
            params.distance_km,
            fleet.trucks_required,
        );

        let mut warnings = Vec::new();
        if seed.used_fallback() {
            warnings.push(OptimizationWarning::new(
                WarningKind::FallbackInitialization,
                format!("混沌搜尋未找到可行解，使用 {:?} 初始解", seed.source),
            ));
        }
        if !refined.stats.converged {
            warnings.push(OptimizationWarning::new(
                WarningKind::RefinementNotConverged,
                format!(
                    "模式搜尋 {} 次迭代後最大步長仍為 {:.6}",
                    refined.stats.iterations, refined.stats.final_max_step
                ),
            ));
        }
        // 比較容許浮點誤差，避免目標毛利率為 0 時誤報
        if pricing.final_margin < MARGIN_WARNING_RATIO * params.target_margin - 1e-9 {
            tracing::warn!(
                "最終毛利率 {:.4} 低於目標 {} 的 95%",
                pricing.final_margin,
                params.target_margin
            );
            warnings.push(OptimizationWarning::new(
                WarningKind::MarginBelowTarget,
                format!(
                    "最終毛利率 {:.4} 低於目標毛利率 {} 的 95%",
                    pricing.final_margin, params.target_margin
                ),
            ));
        }

        let result = OptimizationResult {
            run_id: Uuid::new_v4(),
            computed_at: Utc::now(),
            feasible: true,
            discounts: refined.discounts,
            objective: refined.objective,
            lines: pricing.lines,
            total_profit: pricing.total_profit,
            total_revenue: pricing.total_revenue,
            final_margin: pricing.final_margin,
            transport_cost: pricing.transport_cost,
            fleet,
            emissions,
            stats: SearchStats {
                seed_source: seed.source,
                seed_objective: seed.objective,
                chaos_iterations: seed.chaos_iterations,
                feasible_candidates: seed.feasible_candidates,
                refinement: refined.stats,
            },
            warnings,
        };

        tracing::info!("折扣優化完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "目標值 {:.4}，總利潤 {}，毛利率 {:.4}",
            result.objective,
            result.total_profit,
            result.final_margin
        );

        Ok(result)
    }

    /// 以請求物件執行優化
    pub fn optimize_request(
        &self,
        request: &OptimizationRequest,
    ) -> bulkbuy_core::Result<OptimizationResult> {
        self.optimize(&request.products, &request.quantities, &request.params)
    }

    /// 平行執行多個獨立請求，結果順序與輸入相同
    pub fn optimize_batch(
        &self,
        requests: &[OptimizationRequest],
    ) -> Vec<bulkbuy_core::Result<OptimizationResult>> {
        tracing::info!("批次優化：{} 個請求", requests.len());

        requests
            .par_iter()
            .map(|request| self.optimize_request(request))
            .collect()
    }

    /// 驗證輸入並組合訂單行
    fn validate<'a>(
        &self,
        products: &'a [ProductCostProfile],
        quantities: &[u32],
        params: &OptimizationParameters,
    ) -> bulkbuy_core::Result<Vec<OrderLine<'a>>> {
        self.config.validate()?;
        params.validate()?;

        if products.is_empty() {
            return Err(BulkBuyError::invalid_input("products", "訂單不可為空"));
        }
        for product in products {
            product.validate()?;
        }

        OrderLine::zip(products, quantities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn flour() -> ProductCostProfile {
        ProductCostProfile::new(
            "FLOUR".to_string(),
            Decimal::new(1000, 2),
            Decimal::new(600, 2),
            0.01,
            1.0,
        )
        .with_operational_cost(Decimal::new(50, 2))
    }

    #[test]
    fn test_single_line_optimum() {
        let optimizer = DiscountOptimizer::default();
        let params = OptimizationParameters::new(0.2, 0.3);

        let result = optimizer.optimize(&[flour()], &[100], &params).unwrap();

        // 1 輛車 × 2.5 × 10 km = 25；125 - 800 d >= 0
        assert_eq!(result.fleet.trucks_required, 1);
        assert_eq!(result.transport_cost, Decimal::new(2500, 2));
        assert!(result.feasible);
        assert!(result.discounts[0] > 0.155 && result.discounts[0] <= 0.15625 + 1e-12);
        assert!(result.final_margin >= 0.2 - 1e-9);
        assert!(!result.has_warning(WarningKind::MarginBelowTarget));
        assert_eq!(result.final_prices().len(), 1);
        assert!(result.stats.refinement.converged);
        assert!(result.objective >= result.stats.seed_objective);
    }

    #[test]
    fn test_infeasible_at_zero_discount() {
        let optimizer = DiscountOptimizer::default();
        let params = OptimizationParameters::new(0.99, 0.3).with_route(500.0, 100.0);

        let err = optimizer.optimize(&[flour()], &[100], &params).unwrap_err();

        match err {
            BulkBuyError::InfeasibleAtZeroDiscount {
                constraint_value,
                target_margin,
                transport_cost,
            } => {
                assert!(constraint_value < 0.0);
                assert_eq!(target_margin, 0.99);
                assert!((transport_cost - 50_000.0).abs() < 1e-9);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_input_errors() {
        let optimizer = DiscountOptimizer::default();
        let params = OptimizationParameters::default();

        assert!(optimizer.optimize(&[], &[], &params).unwrap_err().is_input_error());
        assert!(optimizer
            .optimize(&[flour()], &[1, 2], &params)
            .unwrap_err()
            .is_input_error());
        assert!(optimizer
            .optimize(&[flour()], &[0], &params)
            .unwrap_err()
            .is_input_error());
        assert!(optimizer
            .optimize(&[flour()], &[10], &OptimizationParameters::new(0.2, 1.5))
            .unwrap_err()
            .is_input_error());

        let bad_config = DiscountOptimizer::new(SearchConfig::default().with_pattern_search(10, 0.0, 1e-4));
        assert!(bad_config
            .optimize(&[flour()], &[10], &params)
            .unwrap_err()
            .is_input_error());
    }

    #[test]
    fn test_emissions_use_fleet_size() {
        let optimizer = DiscountOptimizer::default();
        let params = OptimizationParameters::new(0.2, 0.3).with_households(50);

        let result = optimizer.optimize(&[flour()], &[100], &params).unwrap();

        assert!((result.emissions.individual_emissions_kg - 36.0).abs() < 1e-9);
        assert!((result.emissions.bulk_emissions_kg - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_emissions_follow_request_route_and_households() {
        let optimizer = DiscountOptimizer::default();
        let params = OptimizationParameters::new(0.2, 0.3)
            .with_route(20.0, 2.5)
            .with_households(80);

        let result = optimizer.optimize(&[flour()], &[100], &params).unwrap();

        // 個別 80 × 4 × 0.18，團購 1 × 20 × 0.55（與運費同一路線）
        assert_eq!(result.transport_cost, Decimal::new(5000, 2));
        assert!((result.emissions.individual_emissions_kg - 57.6).abs() < 1e-9);
        assert!((result.emissions.bulk_emissions_kg - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_unconverged_refinement_is_reported() {
        let optimizer =
            DiscountOptimizer::new(SearchConfig::default().with_pattern_search(1, 0.05, 1e-4));
        let params = OptimizationParameters::new(0.2, 0.3);

        let result = optimizer.optimize(&[flour()], &[100], &params).unwrap();

        assert!(result.has_warning(WarningKind::RefinementNotConverged));
        assert!(result.feasible);
    }

    #[test]
    fn test_batch_preserves_order() {
        let optimizer = DiscountOptimizer::default();
        let requests = vec![
            OptimizationRequest::new(vec![flour()], vec![100], OptimizationParameters::new(0.2, 0.3)),
            OptimizationRequest::new(
                vec![flour()],
                vec![100],
                OptimizationParameters::new(0.99, 0.3).with_route(500.0, 100.0),
            ),
            OptimizationRequest::new(vec![flour()], vec![100], OptimizationParameters::new(0.1, 0.05)),
        ];

        let results = optimizer.optimize_batch(&requests);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().unwrap_err().is_infeasibility());
        let capped = results[2].as_ref().unwrap();
        assert_eq!(capped.discounts.as_slice(), &[0.05]);
    }
}
