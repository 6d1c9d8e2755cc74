use common::config::CatalystKeyword;
use common::NewsItem;
use serde::{Deserialize, Serialize};

/// Best-scoring news item among the most recent ones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalystScore {
    pub points: f64,
    pub headline: Option<String>,
    pub matched: Vec<String>,
}

/// Sum of keyword points found in the headline or summary, case-insensitive, capped at `cap`
pub fn score_item(item: &NewsItem, keywords: &[CatalystKeyword], cap: f64) -> (f64, Vec<String>) {
    let text = format!("{} {}", item.headline, item.summary).to_lowercase();
    let mut points = 0.0;
    let mut matched = Vec::new();
    for kw in keywords {
        if text.contains(&kw.keyword.to_lowercase()) {
            points += kw.points;
            matched.push(kw.keyword.clone());
        }
    }
    (points.min(cap), matched)
}

pub fn score_news(news: &[NewsItem], keywords: &[CatalystKeyword], items: usize, cap: f64) -> CatalystScore {
    let mut best = CatalystScore::default();
    for item in news.iter().take(items) {
        let (points, matched) = score_item(item, keywords, cap);
        if points > best.points {
            best = CatalystScore {
                points,
                headline: Some(item.headline.clone()),
                matched,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use common::config::OracleWeights;

    fn item(headline: &str) -> NewsItem {
        NewsItem {
            headline: headline.to_string(),
            summary: String::new(),
        }
    }

    #[test]
    fn test_keywords_sum_and_cap() {
        let w = OracleWeights::default();
        let (points, matched) = score_item(&item("FDA approval granted"), &w.news_keywords, w.news_max);
        // 30 + 25 capped at 30
        assert_relative_eq!(points, 30.0);
        assert_eq!(matched, vec!["FDA".to_string(), "approval".to_string()]);

        let (points, _) = score_item(&item("Signs new contract"), &w.news_keywords, w.news_max);
        assert_relative_eq!(points, 15.0);
    }

    #[test]
    fn test_best_of_recent_items() {
        let w = OracleWeights::default();
        let news = vec![
            item("Quarterly update"),
            item("Patent granted for coating process"),
            item("Strategic partnership with distributor"),
        ];
        let score = score_news(&news, &w.news_keywords, 5, w.news_max);
        assert_relative_eq!(score.points, 20.0);
        assert_eq!(score.headline.as_deref(), Some("Strategic partnership with distributor"));

        // Only the first item is considered
        let score = score_news(&news, &w.news_keywords, 1, w.news_max);
        assert_relative_eq!(score.points, 0.0);
        assert!(score.headline.is_none());
    }
}
