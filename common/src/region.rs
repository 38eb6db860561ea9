//! 地域の静的情報と選択肢

use crate::types::RegionInfo;
use std::collections::BTreeMap;

/// ポリフェノール入力の地域候補
pub const POLYPHENOL_REGIONS: [&str; 3] =
    ["Dimbula Region", "Ruhuna Region", "Sabaragamuwa Region"];

/// グレード候補
pub const GRADES: [&str; 4] = ["BOP", "BOPF", "OP", "DUST"];

/// バックエンドが `info` を返さないときの地域情報
pub fn region_info(region: &str) -> Option<RegionInfo> {
    let (description, origin, notes): (&str, &str, [&str; 3]) = match region {
        "Sabaragamuwa" => (
            "Known for strong aroma and dark color.",
            "Sabaragamuwa province",
            ["Malty", "Earthy", "Rich"],
        ),
        "Central" => (
            "Balanced flavor, bright color.",
            "Central highlands",
            ["Floral", "Light", "Aromatic"],
        ),
        "Southern" => (
            "Smooth taste, golden color.",
            "Southern lowlands",
            ["Sweet", "Mellow", "Smooth"],
        ),
        _ => return None,
    };
    Some(RegionInfo {
        description: description.to_string(),
        origin: origin.to_string(),
        flavor_notes: notes.iter().map(|n| n.to_string()).collect(),
    })
}

/// 棒グラフの1本
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub label: String,
    /// 0..=100
    pub percent: f64,
}

/// 確率の大きい順に並べた棒グラフデータ
pub fn probability_bars(probabilities: &BTreeMap<String, f64>) -> Vec<ProbabilityBar> {
    let mut bars: Vec<ProbabilityBar> = probabilities
        .iter()
        .map(|(label, p)| ProbabilityBar {
            label: label.clone(),
            percent: p * 100.0,
        })
        .collect();
    bars.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_info_known() {
        let info = region_info("Central").unwrap();
        assert_eq!(info.origin, "Central highlands");
        assert_eq!(info.flavor_notes, vec!["Floral", "Light", "Aromatic"]);
        assert!(region_info("Dimbula Region").is_none());
    }

    #[test]
    fn test_probability_bars_sorted_descending() {
        let mut probs = BTreeMap::new();
        probs.insert("Central".to_string(), 0.2);
        probs.insert("Sabaragamuwa".to_string(), 0.7);
        probs.insert("Southern".to_string(), 0.1);
        let bars = probability_bars(&probs);
        let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Sabaragamuwa", "Central", "Southern"]);
        assert!((bars[0].percent - 70.0).abs() < 1e-9);
    }
}
