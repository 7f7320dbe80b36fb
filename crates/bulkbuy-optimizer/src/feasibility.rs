//! 可行性模型：毛利率約束與目標函數

use bulkbuy_core::{BulkBuyError, DiscountVector, OrderLine};

/// 毛利率約束與折扣目標的線性模型
///
/// 約束值：
/// `Σ q[i] * ((1 - m) * p[i] * (1 - d[i]) - s[i] - o[i]) - T`，
/// 大於等於 0 即為可行。目標為最大化 `Σ q[i] * d[i]`。
#[derive(Debug, Clone)]
pub struct FeasibilityModel {
    quantities: Vec<f64>,
    retail_prices: Vec<f64>,
    /// 每單位供應商成本 + 營運成本
    unit_costs: Vec<f64>,
    target_margin: f64,
    transport_cost: f64,
}

impl FeasibilityModel {
    /// 由訂單行建立模型
    pub fn new(
        lines: &[OrderLine<'_>],
        target_margin: f64,
        transport_cost: f64,
    ) -> bulkbuy_core::Result<Self> {
        let mut quantities = Vec::with_capacity(lines.len());
        let mut retail_prices = Vec::with_capacity(lines.len());
        let mut unit_costs = Vec::with_capacity(lines.len());

        for line in lines {
            quantities.push(f64::from(line.quantity));
            retail_prices.push(line.product.retail_price_f64()?);
            unit_costs.push(line.product.unit_cost_f64()?);
        }

        Self::from_coefficients(quantities, retail_prices, unit_costs, target_margin, transport_cost)
    }

    /// 由平行係數陣列建立模型
    pub fn from_coefficients(
        quantities: Vec<f64>,
        retail_prices: Vec<f64>,
        unit_costs: Vec<f64>,
        target_margin: f64,
        transport_cost: f64,
    ) -> bulkbuy_core::Result<Self> {
        if quantities.len() != retail_prices.len() || quantities.len() != unit_costs.len() {
            return Err(BulkBuyError::invalid_input(
                "feasibility_model",
                "數量、零售價、單位成本長度不一致",
            ));
        }

        let all_finite = quantities
            .iter()
            .chain(&retail_prices)
            .chain(&unit_costs)
            .chain([&target_margin, &transport_cost])
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(BulkBuyError::Computation(
                "可行性模型係數包含非有限值".to_string(),
            ));
        }

        Ok(Self {
            quantities,
            retail_prices,
            unit_costs,
            target_margin,
            transport_cost,
        })
    }

    /// 訂單行數
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// 毛利率約束值（>= 0 為可行）
    pub fn margin_constraint(&self, discounts: &DiscountVector) -> bulkbuy_core::Result<f64> {
        self.check_len(discounts)?;

        let keep = 1.0 - self.target_margin;
        let total: f64 = discounts
            .iter()
            .zip(self.quantities.iter().zip(&self.retail_prices).zip(&self.unit_costs))
            .map(|(d, ((q, p), c))| q * (keep * p * (1.0 - d) - c))
            .sum();

        Ok(total - self.transport_cost)
    }

    /// 是否滿足毛利率約束
    pub fn is_feasible(&self, discounts: &DiscountVector) -> bulkbuy_core::Result<bool> {
        Ok(self.margin_constraint(discounts)? >= 0.0)
    }

    /// 目標值：數量加權的總折扣
    pub fn objective(&self, discounts: &DiscountVector) -> bulkbuy_core::Result<f64> {
        self.check_len(discounts)?;

        Ok(discounts
            .iter()
            .zip(&self.quantities)
            .map(|(d, q)| q * d)
            .sum())
    }

    fn check_len(&self, discounts: &DiscountVector) -> bulkbuy_core::Result<()> {
        if discounts.len() != self.len() {
            return Err(BulkBuyError::invalid_input(
                "discounts",
                format!("長度 {} 與訂單行數 {} 不一致", discounts.len(), self.len()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkbuy_core::ProductCostProfile;
    use rust_decimal::Decimal;

    fn two_line_model() -> FeasibilityModel {
        FeasibilityModel::from_coefficients(
            vec![100.0, 40.0],
            vec![10.0, 25.0],
            vec![6.5, 15.0],
            0.2,
            25.0,
        )
        .unwrap()
    }

    #[test]
    fn test_margin_constraint_at_zero() {
        let model = two_line_model();
        let zero = DiscountVector::zeros(2);

        // 100 * (8 - 6.5) + 40 * (20 - 15) - 25 = 150 + 200 - 25
        assert!((model.margin_constraint(&zero).unwrap() - 325.0).abs() < 1e-9);
        assert!(model.is_feasible(&zero).unwrap());
        assert_eq!(model.objective(&zero).unwrap(), 0.0);
    }

    #[test]
    fn test_objective_is_quantity_weighted() {
        let model = two_line_model();
        let discounts = DiscountVector::from_vec(vec![0.1, 0.05]);

        assert!((model.objective(&discounts).unwrap() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_constraint_decreases_in_each_discount() {
        let model = two_line_model();
        let h = 1e-3;

        for base in [vec![0.0, 0.0], vec![0.1, 0.2], vec![0.25, 0.05]] {
            let base = DiscountVector::from_vec(base);
            let g0 = model.margin_constraint(&base).unwrap();

            for i in 0..model.len() {
                let mut bumped = base.clone();
                bumped.set_clamped(i, base[i] + h, 1.0);
                let slope = (model.margin_constraint(&bumped).unwrap() - g0) / h;

                assert!(slope < 0.0);
                // 線性：斜率 = -q * (1 - m) * p，與基準點無關
                let expected = -[100.0, 40.0][i] * 0.8 * [10.0, 25.0][i];
                assert!((slope - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_from_order_lines() {
        let products = vec![ProductCostProfile::new(
            "FLOUR".to_string(),
            Decimal::new(1000, 2),
            Decimal::new(600, 2),
            0.01,
            1.0,
        )
        .with_operational_cost(Decimal::new(50, 2))];
        let lines = OrderLine::zip(&products, &[100]).unwrap();

        let model = FeasibilityModel::new(&lines, 0.2, 25.0).unwrap();

        // 125 - 800 d
        let d = DiscountVector::from_vec(vec![0.15625]);
        assert!(model.margin_constraint(&d).unwrap().abs() < 1e-9);
        assert!(!model.is_feasible(&DiscountVector::from_vec(vec![0.16])).unwrap());
    }

    #[test]
    fn test_rejects_non_finite_coefficients() {
        let result =
            FeasibilityModel::from_coefficients(vec![1.0], vec![f64::NAN], vec![1.0], 0.2, 0.0);
        assert!(matches!(result, Err(BulkBuyError::Computation(_))));

        let result = FeasibilityModel::from_coefficients(vec![1.0], vec![], vec![1.0], 0.2, 0.0);
        assert!(result.unwrap_err().is_input_error());
    }

    #[test]
    fn test_idempotent() {
        let model = two_line_model();
        let d = DiscountVector::from_vec(vec![0.07, 0.13]);

        assert_eq!(model.margin_constraint(&d), model.margin_constraint(&d));
        assert_eq!(model.objective(&d), model.objective(&d));
    }

    #[test]
    fn test_rejects_discounts_of_wrong_length() {
        let model = two_line_model();
        let short = DiscountVector::from_vec(vec![0.9]);
        let long = DiscountVector::from_vec(vec![0.1, 0.1, 0.1]);

        for discounts in [&short, &long] {
            assert!(model.margin_constraint(discounts).unwrap_err().is_input_error());
            assert!(model.is_feasible(discounts).unwrap_err().is_input_error());
            assert!(model.objective(discounts).unwrap_err().is_input_error());
        }

        let single =
            FeasibilityModel::from_coefficients(vec![100.0], vec![10.0], vec![6.5], 0.2, 25.0)
                .unwrap();
        let two = DiscountVector::from_vec(vec![0.1, 0.1]);
        assert!(single.margin_constraint(&two).is_err());
        assert!(single.objective(&two).is_err());
    }
}
