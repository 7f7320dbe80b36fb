//! 車隊規模計算

use bulkbuy_core::{BulkBuyError, OrderLine};
use serde::{Deserialize, Serialize};

/// 決定車輛數的容量維度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingCapacity {
    /// 容積先滿
    Volume,
    /// 載重先滿
    Weight,
    /// 兩者需要相同車輛數
    Both,
    /// 無貨物，不需派車
    None,
}

/// 車隊需求（每次優化請求計算一次）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetRequirement {
    /// 所需車輛數
    pub trucks_required: u32,

    /// 依容積計算的車輛數
    pub trucks_by_volume: u32,

    /// 依載重計算的車輛數
    pub trucks_by_weight: u32,

    /// 總體積
    pub total_volume: f64,

    /// 總重量
    pub total_weight: f64,

    /// 決定車輛數的維度
    pub binding: BindingCapacity,

    /// 車隊容積使用率 [0, 1]
    pub volume_utilisation: f64,

    /// 車隊載重使用率 [0, 1]
    pub weight_utilisation: f64,
}

impl FleetRequirement {
    /// 是否需要實際配送
    ///
    /// 0 輛車代表沒有實體貨物需要運送，不是錯誤。
    pub fn needs_delivery(&self) -> bool {
        self.trucks_required > 0
    }
}

/// 車隊規模計算器
///
/// 假設貨物可任意分割與合併，不考慮裝箱碎片化。
pub struct FleetSizer;

impl FleetSizer {
    /// 依訂單行計算車隊需求
    pub fn size(
        lines: &[OrderLine<'_>],
        truck_volume: f64,
        truck_weight: f64,
    ) -> bulkbuy_core::Result<FleetRequirement> {
        let total_volume: f64 = lines.iter().map(OrderLine::total_volume).sum();
        let total_weight: f64 = lines.iter().map(OrderLine::total_weight).sum();

        Self::from_totals(total_volume, total_weight, truck_volume, truck_weight)
    }

    /// 平行陣列版本：數量、單位體積、單位重量
    pub fn trucks_required(
        quantities: &[u32],
        volume_per_unit: &[f64],
        weight_per_unit: &[f64],
        truck_volume: f64,
        truck_weight: f64,
    ) -> bulkbuy_core::Result<u32> {
        if quantities.len() != volume_per_unit.len() || quantities.len() != weight_per_unit.len() {
            return Err(BulkBuyError::invalid_input(
                "fleet",
                format!(
                    "數量 ({})、單位體積 ({})、單位重量 ({}) 長度不一致",
                    quantities.len(),
                    volume_per_unit.len(),
                    weight_per_unit.len()
                ),
            ));
        }

        let total_volume: f64 = quantities
            .iter()
            .zip(volume_per_unit)
            .map(|(&q, &v)| f64::from(q) * v)
            .sum();
        let total_weight: f64 = quantities
            .iter()
            .zip(weight_per_unit)
            .map(|(&q, &w)| f64::from(q) * w)
            .sum();

        Self::from_totals(total_volume, total_weight, truck_volume, truck_weight)
            .map(|fleet| fleet.trucks_required)
    }

    fn from_totals(
        total_volume: f64,
        total_weight: f64,
        truck_volume: f64,
        truck_weight: f64,
    ) -> bulkbuy_core::Result<FleetRequirement> {
        bulkbuy_core::ensure_positive("truck_volume_capacity", truck_volume)?;
        bulkbuy_core::ensure_positive("truck_weight_capacity", truck_weight)?;

        if !total_volume.is_finite() || !total_weight.is_finite() {
            return Err(BulkBuyError::Computation(format!(
                "總體積 {total_volume} 或總重量 {total_weight} 不是有限值"
            )));
        }

        let trucks_by_volume = Self::ceil_trucks(total_volume, truck_volume)?;
        let trucks_by_weight = Self::ceil_trucks(total_weight, truck_weight)?;
        let trucks_required = trucks_by_volume.max(trucks_by_weight);

        let binding = match (trucks_required, trucks_by_volume.cmp(&trucks_by_weight)) {
            (0, _) => BindingCapacity::None,
            (_, std::cmp::Ordering::Greater) => BindingCapacity::Volume,
            (_, std::cmp::Ordering::Less) => BindingCapacity::Weight,
            (_, std::cmp::Ordering::Equal) => BindingCapacity::Both,
        };

        let utilisation = |total: f64, capacity: f64| {
            if trucks_required == 0 {
                0.0
            } else {
                total / (f64::from(trucks_required) * capacity)
            }
        };

        let fleet = FleetRequirement {
            trucks_required,
            trucks_by_volume,
            trucks_by_weight,
            total_volume,
            total_weight,
            binding,
            volume_utilisation: utilisation(total_volume, truck_volume),
            weight_utilisation: utilisation(total_weight, truck_weight),
        };

        tracing::debug!(
            "車隊規模：總體積 {:.3}，總重量 {:.1}，需要 {} 輛車 ({:?})",
            total_volume,
            total_weight,
            trucks_required,
            binding
        );

        Ok(fleet)
    }

    fn ceil_trucks(total: f64, capacity: f64) -> bulkbuy_core::Result<u32> {
        let trucks = (total / capacity).ceil();
        if trucks < 0.0 || trucks > f64::from(u32::MAX) {
            return Err(BulkBuyError::Computation(format!(
                "車輛數 {trucks} 超出可表示範圍"
            )));
        }
        Ok(trucks as u32)
    }
}
