use crate::adapters::sink::LedgerRow;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::Path;

const TOP_CITIES: usize = 10;
const UNSPECIFIED_PRICE: &str = "Not specified";

#[derive(Debug, Clone, Default)]
pub struct LedgerSummary {
    pub total: usize,
    pub rating_avg: Option<f64>,
    pub rating_min: Option<f64>,
    pub rating_max: Option<f64>,
    pub top_cities: Vec<(String, usize)>,
    pub price_distribution: Vec<(String, usize)>,
}

pub fn read_rows(path: &Path) -> Result<Vec<LedgerRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn summarize(rows: &[LedgerRow]) -> LedgerSummary {
    let ratings: Vec<f64> = rows.iter().filter_map(|r| r.rating).collect();
    let (rating_avg, rating_min, rating_max) = if ratings.is_empty() {
        (None, None, None)
    } else {
        (
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64),
            ratings.iter().copied().fold(f64::INFINITY, f64::min).into(),
            ratings
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max)
                .into(),
        )
    };

    let mut cities: HashMap<String, usize> = HashMap::new();
    let mut prices: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let city = if row.city.is_empty() {
            "Unknown".to_string()
        } else {
            row.city.clone()
        };
        *cities.entry(city).or_default() += 1;

        let price = if row.price.is_empty() {
            UNSPECIFIED_PRICE.to_string()
        } else {
            row.price.clone()
        };
        *prices.entry(price).or_default() += 1;
    }

    let mut top_cities: Vec<_> = cities.into_iter().collect();
    top_cities.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_cities.truncate(TOP_CITIES);

    let mut price_distribution: Vec<_> = prices.into_iter().collect();
    price_distribution.sort_by(|a, b| a.0.cmp(&b.0));

    LedgerSummary {
        total: rows.len(),
        rating_avg,
        rating_min,
        rating_max,
        top_cities,
        price_distribution,
    }
}

pub fn print_report(summary: &LedgerSummary) {
    println!(
        "\n--- Restaurant Collection Summary ({}) ---",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );
    println!("Total restaurants collected: {}", summary.total);

    if let (Some(avg), Some(min), Some(max)) =
        (summary.rating_avg, summary.rating_min, summary.rating_max)
    {
        println!("Average rating: {:.2}", avg);
        println!("Rating range: {} - {}", min, max);
    }

    if !summary.top_cities.is_empty() {
        println!("\nTop {} cities by restaurant count:", summary.top_cities.len());
        for (city, count) in &summary.top_cities {
            println!("  {}: {}", city, count);
        }
    }

    if !summary.price_distribution.is_empty() {
        println!("\nPrice distribution:");
        for (price, count) in &summary.price_distribution {
            println!("  {}: {}", price, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, city: &str, price: &str, rating: Option<f64>) -> LedgerRow {
        LedgerRow {
            cell_id: "0_0".to_string(),
            id: id.to_string(),
            name: format!("Restaurant {}", id),
            rating,
            review_count: Some(10),
            price: price.to_string(),
            categories: String::new(),
            address: String::new(),
            city: city.to_string(),
            state: "MD".to_string(),
            zip_code: String::new(),
            latitude: None,
            longitude: None,
            phone: String::new(),
            url: String::new(),
        }
    }

    #[test]
    fn empty_ledger_summarizes_to_zeroes() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.rating_avg.is_none());
        assert!(summary.top_cities.is_empty());
    }

    #[test]
    fn rating_stats_cover_avg_min_max() {
        let rows = vec![
            row("a", "Baltimore", "$", Some(3.0)),
            row("b", "Baltimore", "$$", Some(5.0)),
            row("c", "Bowie", "$", None),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rating_avg, Some(4.0));
        assert_eq!(summary.rating_min, Some(3.0));
        assert_eq!(summary.rating_max, Some(5.0));
    }

    #[test]
    fn cities_rank_by_count_then_name() {
        let rows = vec![
            row("a", "Baltimore", "$", None),
            row("b", "Baltimore", "$", None),
            row("c", "Annapolis", "$", None),
            row("d", "Bowie", "$", None),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.top_cities[0], ("Baltimore".to_string(), 2));
        assert_eq!(summary.top_cities[1], ("Annapolis".to_string(), 1));
        assert_eq!(summary.top_cities[2], ("Bowie".to_string(), 1));
    }

    #[test]
    fn missing_price_is_bucketed_as_unspecified() {
        let rows = vec![row("a", "Baltimore", "", None), row("b", "Bowie", "$$", None)];
        let summary = summarize(&rows);
        assert!(summary
            .price_distribution
            .contains(&("Not specified".to_string(), 1)));
        assert!(summary.price_distribution.contains(&("$$".to_string(), 1)));
    }
}
