use std::collections::BTreeMap;

use crate::models::{ConsumptionEstimate, RefuelingRecord};

/// Estimate average km/l per (plate, fuel type)
///
/// Fills are ordered by odometer reading, not by date.
/// Each fill is credited with the distance since the previous fill; pairs
/// with a non-positive distance or non-positive liters are discarded.
/// Partitions with fewer than two fills, or without any valid pair, are
/// left out of the result entirely. The result is sorted by average,
/// highest first.
pub fn estimate_consumption(records: &[RefuelingRecord]) -> Vec<ConsumptionEstimate> {
    let mut partitions: BTreeMap<(&str, &str), Vec<&RefuelingRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.has_vehicle()) {
        partitions
            .entry((record.plate.as_str(), record.fuel_type.as_str()))
            .or_default()
            .push(record);
    }

    let mut estimates: Vec<ConsumptionEstimate> = partitions
        .into_iter()
        .filter_map(|((plate, fuel_type), mut fills)| {
            if fills.len() < 2 {
                return None;
            }
            fills.sort_by(|a, b| a.odometer_km.total_cmp(&b.odometer_km));

            let mut total_distance = 0.0;
            let mut total_liters = 0.0;
            let mut valid_pairs = 0;

            for pair in fills.windows(2) {
                let distance = pair[1].odometer_km - pair[0].odometer_km;
                let liters = pair[1].liters;
                if distance <= 0.0 || liters <= 0.0 {
                    continue;
                }
                total_distance += distance;
                total_liters += liters;
                valid_pairs += 1;
            }

            if valid_pairs == 0 {
                return None;
            }

            Some(ConsumptionEstimate {
                plate: plate.to_string(),
                fuel_type: fuel_type.to_string(),
                average_km_per_liter: total_distance / total_liters,
                total_distance_km: total_distance,
                total_liters,
                valid_pairs,
                discarded_pairs: fills.len() - 1 - valid_pairs,
            })
        })
        .collect();

    estimates.sort_by(|a, b| b.average_km_per_liter.total_cmp(&a.average_km_per_liter));
    estimates
}
