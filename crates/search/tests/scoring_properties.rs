//! Behavioural properties of scoring and search.

use crm_search::{search, similarity_score, Contractor, EntityKind, RequestDigest, Scorer, SiteObject};
use proptest::prelude::*;
use serde_json::json;

fn site(id: i64, name: &str, address: &str) -> SiteObject {
    SiteObject {
        id,
        name: name.to_string(),
        address: Some(address.to_string()),
        customer: None,
        phone: None,
    }
}

#[test]
fn substring_match_scores_one() {
    assert_eq!(similarity_score("Moscow", "Moscow Tower", 0.4), 1.0);
}

#[test]
fn close_misspelling_scores_between_threshold_and_one() {
    let score = similarity_score("Pulsar", "Pulsr Ltd", 0.4);
    assert!((0.4..1.0).contains(&score), "score was {}", score);
}

#[test]
fn unrelated_text_scores_zero() {
    assert_eq!(similarity_score("xyz123", "completely unrelated text", 0.4), 0.0);
}

#[test]
fn search_returns_only_matching_item() {
    let items = vec![json!({"name": "Ivanov Group"}), json!({"name": "Petrov LLC"})];
    let results = search("Ivanov", &items, &["name"], 0.4);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].item["name"], "Ivanov Group");
    assert_eq!(results[0].score, 1.0);
}

#[test]
fn search_over_nothing_is_empty() {
    let items: Vec<SiteObject> = Vec::new();
    assert!(search("qqq", &items, &["name"], 0.4).is_empty());
}

#[test]
fn better_address_match_is_reported() {
    let items = vec![site(1, "Northern Depot", "Moscow Tower, Presnenskaya 12")];
    let results = search("moscow tower", &items, &["name", "address"], 0.4);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].field, "address");
}

#[test]
fn request_search_finds_contractor_names() {
    let obj = site(3, "Tower A", "Lenina 5");
    let pulsar = Contractor {
        id: 9,
        name: "Pulsar Engineering".to_string(),
        inn: Some("7701234567".to_string()),
        contact_person: None,
        phone: None,
        email: None,
    };
    let requests = vec![
        RequestDigest::assemble(1, Some(&obj), Some("Daikin"), [&pulsar]),
        RequestDigest::assemble(2, Some(&obj), Some("Mitsubishi"), []),
    ];

    let kind = EntityKind::Request;
    let results = search("pulsar", &requests, kind.search_fields(), kind.default_threshold());

    assert_eq!(results[0].item.id, 1);
    assert_eq!(results[0].field, "contractor_names");
}

#[test]
fn scorer_is_shareable_across_threads() {
    let scorer = Scorer::default();
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(move || scorer.score("Pulsar", "Pulsr Ltd", 0.4)))
        .collect();
    let scores: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] == w[1]));
}

proptest! {
    #[test]
    fn contained_query_scores_one(
        prefix in "[a-zA-Z ]{0,10}",
        query in "[a-zA-Z]{1,10}",
        suffix in "[a-zA-Z ]{0,10}",
        threshold in 0.0f64..=1.0,
    ) {
        let text = format!("{}{}{}", prefix, query.to_uppercase(), suffix);
        prop_assert_eq!(similarity_score(&query, &text, threshold), 1.0);
    }

    #[test]
    fn score_is_zero_or_above_threshold(
        query in "[a-zа-я ]{1,12}",
        text in "[a-zа-я ]{1,24}",
        threshold in 0.0f64..=1.0,
    ) {
        let score = similarity_score(&query, &text, threshold);
        prop_assert!(score == 0.0 || (score >= threshold && score <= 1.0));
    }

    #[test]
    fn empty_inputs_score_zero(text in ".{0,20}", threshold in 0.0f64..=1.0) {
        prop_assert_eq!(similarity_score("", &text, threshold), 0.0);
        prop_assert_eq!(similarity_score(&text, "", threshold), 0.0);
    }

    #[test]
    fn scoring_ignores_case(query in "[a-zA-Z ]{1,10}", text in "[a-zA-Z ]{1,20}") {
        let lower = similarity_score(&query.to_lowercase(), &text.to_lowercase(), 0.0);
        let upper = similarity_score(&query.to_uppercase(), &text, 0.0);
        prop_assert_eq!(lower, upper);
    }

    #[test]
    fn scoring_is_deterministic(query in ".{1,10}", text in ".{1,20}") {
        prop_assert_eq!(
            similarity_score(&query, &text, 0.3),
            similarity_score(&query, &text, 0.3)
        );
    }

    #[test]
    fn search_results_sorted_and_above_threshold(
        names in proptest::collection::vec("[a-z ]{1,15}", 0..20),
        query in "[a-z]{1,6}",
        threshold in 0.1f64..=1.0,
    ) {
        let items: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
        let results = search(&query, &items, &["name"], threshold);

        for result in &results {
            prop_assert!(result.score >= threshold);
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
