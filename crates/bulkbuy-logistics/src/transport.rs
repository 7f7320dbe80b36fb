//! 運輸成本

use bulkbuy_core::ensure_positive;

/// 運輸成本計算器
pub struct TransportCost;

impl TransportCost {
    /// 車隊運輸成本 = 車輛數 × 每公里成本 × 距離
    ///
    /// 0 輛車（無實體貨物）時成本為 0。
    pub fn calculate(trucks: u32, cost_per_km: f64, distance_km: f64) -> bulkbuy_core::Result<f64> {
        ensure_positive("cost_per_km", cost_per_km)?;
        ensure_positive("distance_km", distance_km)?;

        Ok(f64::from(trucks) * cost_per_km * distance_km)
    }
}
