//! 模式搜尋（Hooke-Jeeves）局部改善

use bulkbuy_core::{BulkBuyError, DiscountVector, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::feasibility::FeasibilityModel;

/// 模式搜尋統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinementStats {
    /// 執行的迭代數
    pub iterations: usize,

    /// 接受的座標移動數
    pub coordinate_moves: usize,

    /// 接受的模式（外推）移動數
    pub pattern_moves: usize,

    /// 步長減半次數
    pub step_halvings: usize,

    /// 結束時的最大步長
    pub final_max_step: f64,

    /// 是否因步長小於容差而結束
    pub converged: bool,
}

/// 改善結果
#[derive(Debug, Clone)]
pub struct RefinedSolution {
    pub discounts: DiscountVector,
    pub objective: f64,
    pub stats: RefinementStats,
}

/// 模式搜尋改善器
///
/// 回傳的向量永遠可行，且目標值不低於初始解。
pub struct PatternSearchRefiner<'a> {
    model: &'a FeasibilityModel,
    max_discount: f64,
    config: &'a SearchConfig,
}

impl<'a> PatternSearchRefiner<'a> {
    pub fn new(model: &'a FeasibilityModel, max_discount: f64, config: &'a SearchConfig) -> Self {
        Self {
            model,
            max_discount,
            config,
        }
    }

    /// 從可行初始解出發改善
    ///
    /// 初始解須長度一致、位於 `[0, max_discount]` 內且可行，否則回傳 `InvalidInput`。
    pub fn refine(&self, seed: &DiscountVector) -> bulkbuy_core::Result<RefinedSolution> {
        if seed.len() != self.model.len() {
            return Err(BulkBuyError::invalid_input(
                "seed",
                format!("長度 {} 與訂單行數 {} 不一致", seed.len(), self.model.len()),
            ));
        }

        if !seed.within_bounds(self.max_discount) {
            return Err(BulkBuyError::invalid_input(
                "seed",
                format!("初始解超出折扣範圍 [0, {}]", self.max_discount),
            ));
        }

        let constraint = self.model.margin_constraint(seed)?;
        if constraint < 0.0 {
            return Err(BulkBuyError::invalid_input(
                "seed",
                format!("初始解不可行（約束值 {constraint:.4}）"),
            ));
        }

        let mut current = seed.clone();
        let mut current_objective = self.model.objective(&current)?;
        let mut steps = vec![self.config.initial_step; current.len()];
        let mut stats = RefinementStats::default();

        while stats.iterations < self.config.pattern_iterations {
            if max_step(&steps) < self.config.epsilon {
                stats.converged = true;
                break;
            }
            stats.iterations += 1;

            let (explored, explored_objective, moves) =
                self.explore(&current, current_objective, &steps)?;

            if moves == 0 {
                for step in steps.iter_mut() {
                    *step /= 2.0;
                }
                stats.step_halvings += 1;
                continue;
            }
            stats.coordinate_moves += moves;

            // 沿改善方向外推：2Y - X
            let mut pattern = explored.clone();
            for i in 0..pattern.len() {
                pattern.set_clamped(i, 2.0 * explored[i] - current[i], self.max_discount);
            }
            let pattern_objective = self.model.objective(&pattern)?;

            if pattern_objective > explored_objective && self.model.is_feasible(&pattern)? {
                current = pattern;
                current_objective = pattern_objective;
                stats.pattern_moves += 1;
            } else {
                current = explored;
                current_objective = explored_objective;
            }

            if !current_objective.is_finite() {
                tracing::error!("模式搜尋第 {} 次迭代產生非有限目標值", stats.iterations);
                return Err(BulkBuyError::Computation(format!(
                    "模式搜尋第 {} 次迭代目標值為 {}",
                    stats.iterations, current_objective
                )));
            }
        }

        if !stats.converged && max_step(&steps) < self.config.epsilon {
            stats.converged = true;
        }
        stats.final_max_step = max_step(&steps);

        tracing::debug!(
            "模式搜尋：{} 次迭代，座標移動 {}，模式移動 {}，步長減半 {}，目標值 {:.4}",
            stats.iterations,
            stats.coordinate_moves,
            stats.pattern_moves,
            stats.step_halvings,
            current_objective
        );

        Ok(RefinedSolution {
            discounts: current,
            objective: current_objective,
            stats,
        })
    }

    /// 逐座標探索：先 +step 再 -step，只接受可行且嚴格改善的移動
    fn explore(
        &self,
        base: &DiscountVector,
        base_objective: f64,
        steps: &[f64],
    ) -> bulkbuy_core::Result<(DiscountVector, f64, usize)> {
        let mut point = base.clone();
        let mut objective = base_objective;
        let mut moves = 0;

        for (i, &step) in steps.iter().enumerate() {
            for direction in [1.0, -1.0] {
                let mut candidate = point.clone();
                candidate.set_clamped(i, point[i] + direction * step, self.max_discount);
                if candidate[i] == point[i] {
                    continue;
                }

                let candidate_objective = self.model.objective(&candidate)?;
                if candidate_objective > objective && self.model.is_feasible(&candidate)? {
                    point = candidate;
                    objective = candidate_objective;
                    moves += 1;
                    break;
                }
            }
        }

        Ok((point, objective, moves))
    }
}

fn max_step(steps: &[f64]) -> f64 {
    steps.iter().copied().fold(0.0, f64::max)
}
