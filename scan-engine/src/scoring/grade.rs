use common::config::GradeBand;

/// First band whose minimum the score reaches; the lowest band otherwise
pub fn grade_for(score: f64, bands: &[GradeBand]) -> (String, String) {
    bands
        .iter()
        .find(|b| score >= b.min_score)
        .or_else(|| bands.last())
        .map(|b| (b.grade.clone(), b.confidence.clone()))
        .unwrap_or_else(|| ("N/A".to_string(), String::new()))
}
