//! 混沌初始化：以 logistic map 產生候選折扣向量

use bulkbuy_core::{BulkBuyError, ChaosPolicy, DiscountVector, SearchConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::feasibility::FeasibilityModel;

/// 完全混沌參數（μ = 4）的 logistic map：`c ← 4c(1 - c)`
///
/// 同一種子產生相同序列，僅作為可重現的取樣工具，不保證跨平台逐位元一致。
#[derive(Debug, Clone)]
pub struct LogisticMap {
    seed: f64,
    state: f64,
}

impl LogisticMap {
    pub fn new(seed: f64) -> Self {
        Self { seed, state: seed }
    }

    /// 當前狀態
    pub fn state(&self) -> f64 {
        self.state
    }
}

impl Iterator for LogisticMap {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let next = 4.0 * self.state * (1.0 - self.state);

        // 落在 0 或 1 會永遠停在 0，回到種子附近重新出發
        self.state = if next > 0.0 && next < 1.0 {
            next
        } else {
            self.seed * 0.999_999
        };

        Some(self.state)
    }
}

/// 初始解的來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedSource {
    /// 混沌搜尋
    Chaos,
    /// 備援：小幅隨機折扣
    RandomFallback,
    /// 備援：零折扣
    ZeroDiscount,
}

/// 初始化結果
#[derive(Debug, Clone)]
pub struct InitialSolution {
    /// 可行的初始折扣向量
    pub discounts: DiscountVector,

    /// 初始目標值
    pub objective: f64,

    /// 來源
    pub source: SeedSource,

    /// 已評估的混沌候選數
    pub chaos_iterations: usize,

    /// 混沌階段遇到的可行候選數
    pub feasible_candidates: usize,
}

impl InitialSolution {
    /// 是否走了備援路徑
    pub fn used_fallback(&self) -> bool {
        self.source != SeedSource::Chaos
    }
}

/// 混沌初始化器
pub struct ChaoticInitializer<'a> {
    model: &'a FeasibilityModel,
    max_discount: f64,
    config: &'a SearchConfig,
}

impl<'a> ChaoticInitializer<'a> {
    pub fn new(model: &'a FeasibilityModel, max_discount: f64, config: &'a SearchConfig) -> Self {
        Self {
            model,
            max_discount,
            config,
        }
    }

    /// 執行初始化
    ///
    /// 依序嘗試：混沌搜尋 → 小幅隨機折扣 → 零折扣。
    /// 全部不可行時回傳 [`BulkBuyError::NoFeasibleSolutionFound`]。
    pub fn initialize(&self) -> bulkbuy_core::Result<InitialSolution> {
        let (best, feasible_candidates) = self.chaos_search()?;

        if let Some((discounts, objective)) = best {
            tracing::debug!(
                "混沌初始化：{} 個可行候選，最佳目標值 {:.4}",
                feasible_candidates,
                objective
            );
            return Ok(InitialSolution {
                discounts,
                objective,
                source: SeedSource::Chaos,
                chaos_iterations: self.config.chaos_iterations,
                feasible_candidates,
            });
        }

        tracing::warn!(
            "混沌初始化 {} 次迭代未找到可行解，改用隨機備援",
            self.config.chaos_iterations
        );

        if let Some((discounts, objective)) = self.random_fallback()? {
            return Ok(InitialSolution {
                discounts,
                objective,
                source: SeedSource::RandomFallback,
                chaos_iterations: self.config.chaos_iterations,
                feasible_candidates,
            });
        }

        let zero = DiscountVector::zeros(self.model.len());
        if self.model.is_feasible(&zero)? {
            tracing::warn!("隨機備援未找到可行解，使用零折扣作為初始解");
            return Ok(InitialSolution {
                discounts: zero,
                objective: 0.0,
                source: SeedSource::ZeroDiscount,
                chaos_iterations: self.config.chaos_iterations,
                feasible_candidates,
            });
        }

        Err(BulkBuyError::NoFeasibleSolutionFound {
            iterations: self.config.chaos_iterations,
            fallback_attempts: self.config.fallback_attempts,
            max_discount: self.max_discount,
        })
    }

    /// 混沌搜尋：回傳最佳可行解與可行候選數
    fn chaos_search(&self) -> bulkbuy_core::Result<(Option<(DiscountVector, f64)>, usize)> {
        let mut chaos = LogisticMap::new(self.config.chaos_seed);
        let mut best: Option<(DiscountVector, f64)> = None;
        let mut feasible_candidates = 0;

        for _ in 0..self.config.chaos_iterations {
            let candidate = self.next_candidate(&mut chaos);

            if !self.model.is_feasible(&candidate)? {
                continue;
            }
            feasible_candidates += 1;

            let objective = self.model.objective(&candidate)?;
            if best.as_ref().map_or(true, |(_, b)| objective > *b) {
                best = Some((candidate, objective));
            }
        }

        Ok((best, feasible_candidates))
    }

    /// 由混沌狀態產生一個候選向量（縮放到 [0, max_discount]）
    fn next_candidate(&self, chaos: &mut LogisticMap) -> DiscountVector {
        let len = self.model.len();

        match self.config.chaos_policy {
            ChaosPolicy::PerLine => chaos
                .by_ref()
                .take(len)
                .map(|c| c * self.max_discount)
                .collect::<Vec<_>>()
                .into(),
            ChaosPolicy::Uniform => {
                let c = chaos.next().unwrap_or(self.config.chaos_seed);
                DiscountVector::uniform(len, c * self.max_discount)
            }
        }
    }

    /// 備援：小幅均勻隨機折扣，保留最佳可行者
    fn random_fallback(&self) -> bulkbuy_core::Result<Option<(DiscountVector, f64)>> {
        let ceiling = self.config.fallback_max_discount.min(self.max_discount);
        let mut rng = StdRng::seed_from_u64(self.config.fallback_rng_seed);
        let mut best: Option<(DiscountVector, f64)> = None;

        for _ in 0..self.config.fallback_attempts {
            let candidate: DiscountVector = (0..self.model.len())
                .map(|_| rng.gen_range(0.0..=ceiling))
                .collect::<Vec<_>>()
                .into();

            if !self.model.is_feasible(&candidate)? {
                continue;
            }

            let objective = self.model.objective(&candidate)?;
            if best.as_ref().map_or(true, |(_, b)| objective > *b) {
                best = Some((candidate, objective));
            }
        }

        Ok(best)
    }
}
