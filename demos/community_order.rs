//! 社區團購折扣優化示例

use bulkbuy::{DiscountOptimizer, OptimizationParameters, ProductCostProfile, SearchConfig};
use rust_decimal::Decimal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== 社區團購折扣優化示例 ===\n");

    // 商品成本檔案
    let products = vec![
        ProductCostProfile::new(
            "RICE-5KG".to_string(),
            Decimal::new(1250, 2),
            Decimal::new(790, 2),
            0.008,
            5.0,
        )
        .with_operational_cost(Decimal::new(60, 2)),
        ProductCostProfile::new(
            "OIL-1L".to_string(),
            Decimal::new(650, 2),
            Decimal::new(410, 2),
            0.0012,
            0.95,
        ),
        ProductCostProfile::new(
            "TISSUE-12".to_string(),
            Decimal::new(899, 2),
            Decimal::new(520, 2),
            0.03,
            1.2,
        ),
    ];

    // 本週期彙總數量
    let quantities = [120, 80, 60];

    let params = OptimizationParameters::new(0.18, 0.25)
        .with_route(12.0, 2.2)
        .with_households(50);

    let optimizer = DiscountOptimizer::new(SearchConfig::default());
    let result = optimizer.optimize(&products, &quantities, &params)?;

    println!("\n車隊: {} 輛車（{:?}）", result.fleet.trucks_required, result.fleet.binding);
    println!("運輸成本: {}", result.transport_cost);
    println!("\n折扣結果:");
    for line in &result.lines {
        println!(
            "  - {}: 數量 {}, 折扣 {:.2}%, 售價 {}, 利潤 {}",
            line.product_id,
            line.quantity,
            line.discount * 100.0,
            line.final_price,
            line.profit
        );
    }
    println!(
        "\n總營收 {}，總利潤 {}，毛利率 {:.2}%",
        result.total_revenue,
        result.total_profit,
        result.final_margin * 100.0
    );
    println!(
        "碳排放: 個別配送 {:.1} kg → 團購 {:.1} kg（減少 {:.1}%）",
        result.emissions.individual_emissions_kg,
        result.emissions.bulk_emissions_kg,
        result.emissions.relative_reduction_pct
    );

    for warning in &result.warnings {
        println!("警告: {}", warning.message);
    }

    Ok(())
}
