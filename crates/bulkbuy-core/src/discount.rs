//! 折扣向量

use serde::{Deserialize, Serialize};

/// 每個訂單行一個折扣比例，各分量限制在 [0, max_discount]
///
/// 每次優化執行擁有自己的向量，不在執行之間共享。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountVector(Vec<f64>);

impl DiscountVector {
    /// 全零折扣
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// 所有行使用同一折扣
    pub fn uniform(len: usize, discount: f64) -> Self {
        Self(vec![discount; len])
    }

    pub fn from_vec(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// 設置單一分量，並夾在 [0, max_discount]
    pub fn set_clamped(&mut self, index: usize, value: f64, max_discount: f64) {
        self.0[index] = clamp_discount(value, max_discount);
    }

    /// 所有分量是否都在 [0, max_discount] 內
    pub fn within_bounds(&self, max_discount: f64) -> bool {
        self.0.iter().all(|&d| (0.0..=max_discount).contains(&d))
    }

    /// 所有分量是否為有限值
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|d| d.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<f64>> for DiscountVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl std::ops::Index<usize> for DiscountVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// 將折扣夾在 [0, max_discount]
fn clamp_discount(value: f64, max_discount: f64) -> f64 {
    value.max(0.0).min(max_discount)
}
