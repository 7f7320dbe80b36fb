//! 最終售價、利潤與毛利率

use bulkbuy_core::{BulkBuyError, DiscountVector, OrderLine};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 單一訂單行的定價結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOutcome {
    /// 商品ID
    pub product_id: String,

    /// 訂購數量
    pub quantity: u32,

    /// 折扣比例
    pub discount: f64,

    /// 折扣後單價（四捨五入到分）
    pub final_price: Decimal,

    /// 此行利潤 =（折扣後單價 - 供應商成本 - 營運成本）× 數量
    pub profit: Decimal,
}

/// 投資組合層級的定價彙總
///
/// 運輸成本只在總利潤扣除一次，不分攤到各行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSummary {
    pub lines: Vec<LineOutcome>,

    /// 總利潤（已扣運輸成本）
    pub total_profit: Decimal,

    /// 總營收
    pub total_revenue: Decimal,

    /// 運輸成本
    pub transport_cost: Decimal,

    /// 最終毛利率 = 總利潤 / 總營收（營收為 0 時為 0）
    pub final_margin: f64,
}

impl PricingSummary {
    /// 依折扣計算定價彙總
    ///
    /// 金額以未四捨五入的單價累計，只在輸出時取到分。
    pub fn compute(
        lines: &[OrderLine<'_>],
        discounts: &DiscountVector,
        transport_cost: f64,
    ) -> bulkbuy_core::Result<Self> {
        if lines.len() != discounts.len() {
            return Err(BulkBuyError::Computation(format!(
                "折扣向量長度 {} 與訂單行數 {} 不一致",
                discounts.len(),
                lines.len()
            )));
        }

        let transport_cost = to_decimal("transport_cost", transport_cost)?;
        let mut outcomes = Vec::with_capacity(lines.len());
        let mut gross_profit = Decimal::ZERO;
        let mut total_revenue = Decimal::ZERO;

        for (line, discount) in lines.iter().zip(discounts.iter()) {
            let product = line.product;
            let quantity = Decimal::from(line.quantity);

            let discount_rate = to_decimal(&product.product_id, discount)?;
            let unit_price = product.retail_price * (Decimal::ONE - discount_rate);
            let profit = (unit_price - product.supplier_cost - product.operational_cost) * quantity;

            gross_profit += profit;
            total_revenue += unit_price * quantity;

            outcomes.push(LineOutcome {
                product_id: product.product_id.clone(),
                quantity: line.quantity,
                discount,
                final_price: to_cents(unit_price),
                profit: to_cents(profit),
            });
        }

        let total_profit = gross_profit - transport_cost;
        let final_margin = if total_revenue.is_zero() {
            0.0
        } else {
            (total_profit / total_revenue).to_f64().ok_or_else(|| {
                BulkBuyError::Computation("毛利率無法轉換為浮點數".to_string())
            })?
        };

        Ok(Self {
            lines: outcomes,
            total_profit: to_cents(total_profit),
            total_revenue: to_cents(total_revenue),
            transport_cost: to_cents(transport_cost),
            final_margin,
        })
    }
}

fn to_decimal(field: &str, value: f64) -> bulkbuy_core::Result<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| BulkBuyError::Computation(format!("{field} 的數值 {value} 無法轉換為 Decimal")))
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkbuy_core::ProductCostProfile;

    fn products() -> Vec<ProductCostProfile> {
        vec![
            ProductCostProfile::new(
                "FLOUR".to_string(),
                Decimal::new(1000, 2),
                Decimal::new(600, 2),
                0.01,
                1.0,
            )
            .with_operational_cost(Decimal::new(50, 2)),
            ProductCostProfile::new(
                "HONEY".to_string(),
                Decimal::new(2500, 2),
                Decimal::new(1500, 2),
                0.002,
                0.6,
            ),
        ]
    }

    #[test]
    fn test_compute_summary() {
        let products = products();
        let lines = OrderLine::zip(&products, &[100, 40]).unwrap();
        let discounts = DiscountVector::from_vec(vec![0.1, 0.2]);

        let summary = PricingSummary::compute(&lines, &discounts, 25.0).unwrap();

        assert_eq!(summary.lines[0].final_price, Decimal::new(900, 2));
        assert_eq!(summary.lines[1].final_price, Decimal::new(2000, 2));
        // (9.00 - 6.50) * 100
        assert_eq!(summary.lines[0].profit, Decimal::new(25000, 2));
        // (20.00 - 15.00) * 40
        assert_eq!(summary.lines[1].profit, Decimal::new(20000, 2));
        assert_eq!(summary.total_revenue, Decimal::new(170000, 2));
        assert_eq!(summary.transport_cost, Decimal::new(2500, 2));
        assert_eq!(summary.total_profit, Decimal::new(42500, 2));
        assert!((summary.final_margin - 425.0 / 1700.0).abs() < 1e-12);
    }

    #[test]
    fn test_margin_at_constraint_bound_equals_target() {
        let products = products();
        let lines = OrderLine::zip(&products[..1], &[100]).unwrap();
        // 125 - 800 d = 0
        let discounts = DiscountVector::from_vec(vec![0.15625]);

        let summary = PricingSummary::compute(&lines, &discounts, 25.0).unwrap();

        assert!((summary.final_margin - 0.2).abs() < 1e-12);
        assert_eq!(summary.lines[0].final_price, Decimal::new(844, 2));
    }

    #[test]
    fn test_rejects_mismatched_discounts() {
        let products = products();
        let lines = OrderLine::zip(&products, &[1, 1]).unwrap();

        let result = PricingSummary::compute(&lines, &DiscountVector::zeros(1), 0.0);
        assert!(matches!(result, Err(BulkBuyError::Computation(_))));
    }

    #[test]
    fn test_full_discount_has_zero_margin() {
        let products = products();
        let lines = OrderLine::zip(&products[..1], &[10]).unwrap();

        let summary = PricingSummary::compute(&lines, &DiscountVector::uniform(1, 1.0), 0.0).unwrap();

        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.final_margin, 0.0);
    }
}
