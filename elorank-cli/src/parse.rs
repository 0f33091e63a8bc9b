/// Parsing of item lists and of typed verdicts.
use std::collections::BTreeMap;

use elorank_core::constants::{SCALED_RATING_MAX, SCALED_RATING_MIN};
use elorank_core::{Item, Verdict};
use serde_json::Value;

/// An item as read from an items file, before it has a rating.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedItem {
    pub name: String,
    /// Prior rating in whatever scale the source used (stars, scores, ...).
    pub prior: Option<f64>,
    pub extra: BTreeMap<String, String>,
}

impl SeedItem {
    fn named(name: String) -> Self {
        SeedItem {
            name,
            prior: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Parse a string as a JSON array (of names or of objects) or as plain text,
/// one item per line.
///
/// Objects must have a `name`. A numeric `rating` becomes the prior; every
/// other field is kept as an opaque string and written back out untouched.
pub fn parse_items_from_str(content: &str) -> Result<Vec<SeedItem>, String> {
    let trimmed = content.trim();
    if !trimmed.starts_with('[') {
        return Ok(trimmed
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| SeedItem::named(l.to_string()))
            .collect());
    }

    let values: Vec<Value> = serde_json::from_str(trimmed)
        .map_err(|e| format!("File looks like JSON but failed to parse: {e}"))?;

    let mut items = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        match value {
            Value::String(name) => {
                if !name.trim().is_empty() {
                    items.push(SeedItem::named(name.trim().to_string()));
                }
            }
            Value::Object(fields) => items.push(seed_from_object(idx, fields)?),
            other => return Err(format!("Entry {idx} must be a string or an object, got {other}")),
        }
    }
    Ok(items)
}

fn seed_from_object(idx: usize, fields: serde_json::Map<String, Value>) -> Result<SeedItem, String> {
    let mut seed = SeedItem::named(String::new());
    for (key, value) in fields {
        match key.as_str() {
            "name" => match value {
                Value::String(name) => seed.name = name.trim().to_string(),
                other => return Err(format!("Entry {idx}: \"name\" must be a string, got {other}")),
            },
            "rating" => match value {
                Value::Number(n) => seed.prior = n.as_f64(),
                Value::Null => {}
                other => return Err(format!("Entry {idx}: \"rating\" must be a number, got {other}")),
            },
            _ => {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                seed.extra.insert(key, text);
            }
        }
    }
    if seed.name.is_empty() {
        return Err(format!("Entry {idx} has no \"name\""));
    }
    Ok(seed)
}

/// Linearly map `rating` from `[min, max]` onto the scaled rating range.
pub fn scale_prior(rating: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return (SCALED_RATING_MIN + SCALED_RATING_MAX) / 2.0;
    }
    SCALED_RATING_MIN + (rating - min) * (SCALED_RATING_MAX - SCALED_RATING_MIN) / (max - min)
}

/// Turn seeds into fresh items.
///
/// Priors are rescaled onto a common Elo range so that a 1-5 star list and a
/// 0-100 score list start out comparable. Items without a prior get
/// `standard_rating`.
pub fn seed_items(seeds: Vec<SeedItem>, standard_rating: f64) -> Vec<Item> {
    let priors: Vec<f64> = seeds.iter().filter_map(|s| s.prior).collect();
    let min = priors.iter().copied().fold(f64::INFINITY, f64::min);
    let max = priors.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    seeds
        .into_iter()
        .map(|seed| {
            let rating = match seed.prior {
                Some(prior) => scale_prior(prior, min, max),
                None => standard_rating,
            };
            let mut item = Item::new(seed.name, rating);
            item.extra = seed.extra;
            item
        })
        .collect()
}

/// Interpret one line typed at the comparison prompt.
pub fn parse_verdict(input: &str) -> Option<Verdict> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" => Some(Verdict::FirstWins),
        "2" => Some(Verdict::SecondWins),
        "d" | "draw" | "=" => Some(Verdict::Draw),
        "q" | "quit" | "exit" => Some(Verdict::Stop),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_lines() {
        let items = parse_items_from_str("  Alien\n\nHeat  \n Ran\n").unwrap();
        let names: Vec<&str> = items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Alien", "Heat", "Ran"]);
        assert!(items.iter().all(|s| s.prior.is_none()));
    }

    #[test]
    fn test_parse_json_names() {
        let items = parse_items_from_str(r#"["Alien", " ", "Heat"]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "Heat");
    }

    #[test]
    fn test_parse_json_objects() {
        let json = r#"[
            {"name": "Alien", "rating": 8.5, "year": 1979, "director": "Scott"},
            {"name": "Heat"}
        ]"#;
        let items = parse_items_from_str(json).unwrap();
        assert_eq!(items[0].prior, Some(8.5));
        assert_eq!(items[0].extra["year"], "1979");
        assert_eq!(items[0].extra["director"], "Scott");
        assert_eq!(items[1].prior, None);
        assert!(items[1].extra.is_empty());
    }

    #[test]
    fn test_parse_json_rejects_nameless_object() {
        let err = parse_items_from_str(r#"[{"rating": 3}]"#).unwrap_err();
        assert!(err.contains("no \"name\""), "{err}");
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_items_from_str("[\"unterminated").is_err());
    }

    #[test]
    fn test_scale_prior_range() {
        assert_eq!(scale_prior(1.0, 1.0, 5.0), 1000.0);
        assert_eq!(scale_prior(5.0, 1.0, 5.0), 2000.0);
        assert_eq!(scale_prior(3.0, 1.0, 5.0), 1500.0);
        assert_eq!(scale_prior(7.0, 7.0, 7.0), 1500.0);
    }

    #[test]
    fn test_seed_items_mixed_priors() {
        let seeds = parse_items_from_str(
            r#"[{"name": "a", "rating": 2}, {"name": "b", "rating": 4}, {"name": "c"}]"#,
        )
        .unwrap();
        let items = seed_items(seeds, 1000.0);
        assert_eq!(items[0].rating, 1000.0);
        assert_eq!(items[1].rating, 2000.0);
        assert_eq!(items[2].rating, 1000.0);
        assert!(items.iter().all(|i| i.comparisons == 0));
    }

    #[test]
    fn test_seed_items_without_priors_use_standard() {
        let seeds = parse_items_from_str("x\ny").unwrap();
        let items = seed_items(seeds, 1234.0);
        assert!(items.iter().all(|i| i.rating == 1234.0));
    }

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("1\n"), Some(Verdict::FirstWins));
        assert_eq!(parse_verdict(" 2 "), Some(Verdict::SecondWins));
        assert_eq!(parse_verdict("D"), Some(Verdict::Draw));
        assert_eq!(parse_verdict("quit"), Some(Verdict::Stop));
        assert_eq!(parse_verdict("3"), None);
        assert_eq!(parse_verdict(""), None);
    }
}
