use std::fs;
use std::path::PathBuf;

use disball::fotmob_fetch::parse_match_payload_json;
use disball::ratings::{Rating, RatingTier, color_for, extract_ratings};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn color_tiers_match_thresholds() {
    assert_eq!(color_for("9.5"), RatingTier::Exceptional);
    assert_eq!(color_for("7.0"), RatingTier::Good);
    assert_eq!(color_for("6.999"), RatingTier::Average);
    assert_eq!(color_for("5.9"), RatingTier::Poor);
    assert_eq!(color_for("NaN-text"), RatingTier::Unrated);
    assert_eq!(color_for("No Rating"), RatingTier::Unrated);
    assert_eq!(color_for("NaN"), RatingTier::Unrated);
    assert_eq!(color_for(" 8 "), RatingTier::Good);
}

#[test]
fn starters_are_rated_in_lineup_order() {
    let payload = parse_match_payload_json(&read_fixture("match_details.json"))
        .expect("fixture should parse");
    let ratings = extract_ratings(&payload);

    assert_eq!(ratings.home.len(), 2);
    assert_eq!(ratings.home[1].name, "Keeper");
    assert_eq!(ratings.home[1].rating, Rating::Value(7.0));
    assert_eq!(ratings.home[1].rating.tier(), RatingTier::Good);

    assert_eq!(ratings.away.len(), 2);
    assert_eq!(ratings.away[0].name, "Unknown Player");
    assert_eq!(ratings.away[0].rating.tier(), RatingTier::Poor);
    assert_eq!(ratings.away[1].name, "No Id");
    assert_eq!(ratings.away[1].rating, Rating::NoRating);
}

#[test]
fn player_absent_from_stats_has_no_rating() {
    let payload = parse_match_payload_json(&read_fixture("match_details.json"))
        .expect("fixture should parse");
    let ratings = extract_ratings(&payload);
    let missing = &ratings.home[0];
    assert_eq!(missing.name, "Missing Stats");
    assert_eq!(missing.rating, Rating::NoRating);
    assert_eq!(missing.rating.to_string(), "No Rating");
    assert_eq!(missing.rating.tier(), RatingTier::Unrated);
}

#[test]
fn payload_without_lineup_or_stats_is_empty() {
    let payload = parse_match_payload_json(r#"{"content":{"playerStats":null}}"#)
        .expect("payload should parse");
    let ratings = extract_ratings(&payload);
    assert!(ratings.home.is_empty());
    assert!(ratings.away.is_empty());

    let payload = parse_match_payload_json(
        r#"{"content":{"lineup":{"homeTeam":{"starters":[{"id":5,"name":"Solo"}]}}}}"#,
    )
    .expect("payload should parse");
    let ratings = extract_ratings(&payload);
    assert_eq!(ratings.home[0].rating, Rating::NoRating);
    assert!(ratings.away.is_empty());
}
