//! 碳排放比較：個別配送 vs 團購配送

use bulkbuy_core::EmissionFactors;
use serde::{Deserialize, Serialize};

/// 碳排放比較結果（kg CO2）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsComparison {
    /// 個別配送總排放
    pub individual_emissions_kg: f64,

    /// 團購配送總排放
    pub bulk_emissions_kg: f64,

    /// 減少的排放量（可能為負，代表團購反而較多）
    pub saved_kg: f64,

    /// 相對減少百分比（個別配送排放為 0 時回報 0）
    pub relative_reduction_pct: f64,

    /// 團購配送每戶分攤排放（無住戶時為 0）
    pub bulk_emissions_per_household_kg: f64,
}

/// 碳排放模型（純函數）
pub struct EmissionsModel;

impl EmissionsModel {
    /// 比較兩種配送方式的排放
    ///
    /// `bulk_distance_km` 為團購貨車實際行駛的路線距離，與運輸成本使用同一距離。
    pub fn compare(
        factors: &EmissionFactors,
        num_households: u32,
        bulk_distance_km: f64,
        num_trucks: u32,
    ) -> EmissionsComparison {
        let households = f64::from(num_households);

        let individual_emissions_kg =
            households * factors.individual_distance_km * factors.emission_per_km_individual;
        let bulk_emissions_kg =
            f64::from(num_trucks) * bulk_distance_km * factors.emission_per_km_truck;
        let saved_kg = individual_emissions_kg - bulk_emissions_kg;

        let relative_reduction_pct = if individual_emissions_kg > 0.0 {
            saved_kg / individual_emissions_kg * 100.0
        } else {
            0.0
        };

        let bulk_emissions_per_household_kg = if num_households > 0 {
            bulk_emissions_kg / households
        } else {
            0.0
        };

        tracing::debug!(
            "碳排放：個別 {:.2} kg，團購 {:.2} kg，減少 {:.1}%",
            individual_emissions_kg,
            bulk_emissions_kg,
            relative_reduction_pct
        );

        EmissionsComparison {
            individual_emissions_kg,
            bulk_emissions_kg,
            saved_kg,
            relative_reduction_pct,
            bulk_emissions_per_household_kg,
        }
    }
}
