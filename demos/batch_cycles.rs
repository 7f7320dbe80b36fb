//! 多個配送週期的批次優化示例

use bulkbuy::{DiscountOptimizer, OptimizationParameters, OptimizationRequest, ProductCostProfile};
use rust_decimal::Decimal;

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== 批次優化示例（多個社區週期） ===\n");

    let basket = vec![
        ProductCostProfile::new(
            "FLOUR-1KG".to_string(),
            Decimal::new(320, 2),
            Decimal::new(190, 2),
            0.0015,
            1.0,
        ),
        ProductCostProfile::new(
            "WATER-6PK".to_string(),
            Decimal::new(450, 2),
            Decimal::new(260, 2),
            0.012,
            9.0,
        ),
    ];

    // 社區規模不同，距離不同
    let requests: Vec<_> = [(30u32, 6.0), (80, 14.0), (200, 25.0), (500, 40.0)]
        .into_iter()
        .map(|(households, distance)| {
            OptimizationRequest::new(
                basket.clone(),
                vec![households * 2, households * 3],
                OptimizationParameters::new(0.2, 0.3)
                    .with_route(distance, 2.5)
                    .with_households(households),
            )
        })
        .collect();

    let optimizer = DiscountOptimizer::default();
    for (request, result) in requests.iter().zip(optimizer.optimize_batch(&requests)) {
        match result {
            Ok(result) => println!(
                "{:>4} 戶 / {:>4.0} km: {} 輛車, 折扣 {:?}, 毛利率 {:.2}%, 減碳 {:.1}%",
                request.params.num_households,
                request.params.distance_km,
                result.fleet.trucks_required,
                result
                    .discounts
                    .iter()
                    .map(|d| format!("{:.1}%", d * 100.0))
                    .collect::<Vec<_>>(),
                result.final_margin * 100.0,
                result.emissions.relative_reduction_pct
            ),
            Err(err) => println!(
                "{:>4} 戶 / {:>4.0} km: {}",
                request.params.num_households, request.params.distance_km, err
            ),
        }
    }
}
