//! 商品成本檔案與訂單行

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ensure_positive, BulkBuyError, Result};

/// 商品成本檔案（由外部商品主檔讀入，計算期間不可變）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCostProfile {
    /// 商品ID
    pub product_id: String,

    /// 零售價
    pub retail_price: Decimal,

    /// 供應商成本（預期不高於零售價，但不強制）
    pub supplier_cost: Decimal,

    /// 營運成本（每單位）
    #[serde(default)]
    pub operational_cost: Decimal,

    /// 單位體積（立方公尺）
    pub volume_per_unit: f64,

    /// 單位重量（公斤）
    pub weight_per_unit: f64,
}

impl ProductCostProfile {
    /// 創建新的商品成本檔案
    pub fn new(
        product_id: String,
        retail_price: Decimal,
        supplier_cost: Decimal,
        volume_per_unit: f64,
        weight_per_unit: f64,
    ) -> Self {
        Self {
            product_id,
            retail_price,
            supplier_cost,
            operational_cost: Decimal::ZERO,
            volume_per_unit,
            weight_per_unit,
        }
    }

    /// 建構器模式：設置營運成本
    pub fn with_operational_cost(mut self, cost: Decimal) -> Self {
        self.operational_cost = cost;
        self
    }

    /// 驗證成本與物流屬性
    pub fn validate(&self) -> Result<()> {
        let field = |name: &str| format!("{}.{}", self.product_id, name);

        if self.retail_price <= Decimal::ZERO {
            return Err(BulkBuyError::invalid_input(field("retail_price"), "必須大於 0"));
        }
        if self.supplier_cost <= Decimal::ZERO {
            return Err(BulkBuyError::invalid_input(field("supplier_cost"), "必須大於 0"));
        }
        if self.operational_cost < Decimal::ZERO {
            return Err(BulkBuyError::invalid_input(field("operational_cost"), "不可為負數"));
        }
        ensure_positive(&field("volume_per_unit"), self.volume_per_unit)?;
        ensure_positive(&field("weight_per_unit"), self.weight_per_unit)?;

        Ok(())
    }

    /// 零售價（浮點）
    pub fn retail_price_f64(&self) -> Result<f64> {
        decimal_to_f64(&self.product_id, self.retail_price)
    }

    /// 每單位總成本（供應商成本 + 營運成本，浮點）
    pub fn unit_cost_f64(&self) -> Result<f64> {
        decimal_to_f64(&self.product_id, self.supplier_cost + self.operational_cost)
    }
}

fn decimal_to_f64(product_id: &str, value: Decimal) -> Result<f64> {
    value.to_f64().ok_or_else(|| {
        BulkBuyError::Computation(format!("商品 {product_id} 的金額 {value} 無法轉換為浮點數"))
    })
}

/// 訂單行：商品與其彙總訂購數量
#[derive(Debug, Clone, Copy)]
pub struct OrderLine<'a> {
    /// 商品成本檔案
    pub product: &'a ProductCostProfile,

    /// 訂購數量
    pub quantity: u32,
}

impl<'a> OrderLine<'a> {
    /// 創建新的訂單行
    pub fn new(product: &'a ProductCostProfile, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// 將平行的商品與數量陣列組合成訂單行
    ///
    /// 陣列長度不一致或任何數量為 0 時回傳輸入錯誤。
    pub fn zip(products: &'a [ProductCostProfile], quantities: &[u32]) -> Result<Vec<Self>> {
        if products.len() != quantities.len() {
            return Err(BulkBuyError::LengthMismatch {
                products: products.len(),
                quantities: quantities.len(),
            });
        }

        products
            .iter()
            .zip(quantities)
            .map(|(product, &quantity)| {
                if quantity == 0 {
                    return Err(BulkBuyError::invalid_input(
                        format!("{}.quantity", product.product_id),
                        "必須大於 0",
                    ));
                }
                Ok(Self::new(product, quantity))
            })
            .collect()
    }

    /// 此行的總體積
    pub fn total_volume(&self) -> f64 {
        f64::from(self.quantity) * self.product.volume_per_unit
    }

    /// 此行的總重量
    pub fn total_weight(&self) -> f64 {
        f64::from(self.quantity) * self.product.weight_per_unit
    }
}
