use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use disball::fotmob_fetch::parse_match_payload_json;
use disball::pitch::PitchDims;
use disball::ratings::extract_ratings;
use disball::shotmap::{compose, render_match};
use disball::state::{MatchDetail, Shot, ShotEvent, TeamRef};

const MATCH_JSON: &str = include_str!("../data/demo_match.json");

fn busy_detail(shots: usize) -> MatchDetail {
    MatchDetail {
        home: TeamRef {
            id: Some(1),
            name: "Home".to_string(),
        },
        away: TeamRef {
            id: Some(2),
            name: "Away".to_string(),
        },
        score: Some("3 - 3".to_string()),
        status_reason: Some("Full-Time".to_string()),
        shots: (0..shots)
            .map(|i| Shot {
                x: (i * 37 % 100) as f64,
                y: (i * 53 % 100) as f64,
                event: if i % 9 == 0 {
                    ShotEvent::Goal
                } else {
                    ShotEvent::Other("Miss".to_string())
                },
                expected_goals: Some((i % 10) as f64 / 10.0),
                team_id: Some((i % 2 + 1) as u64),
            })
            .collect(),
    }
}

fn bench_payload_parse(c: &mut Criterion) {
    c.bench_function("match_payload_parse", |b| {
        b.iter(|| {
            let payload = parse_match_payload_json(black_box(MATCH_JSON)).unwrap();
            black_box(payload.header.is_some());
        })
    });
}

fn bench_render_and_ratings(c: &mut Criterion) {
    let payload = parse_match_payload_json(MATCH_JSON).expect("valid demo json");
    c.bench_function("render_match_and_ratings", |b| {
        b.iter(|| {
            let render = render_match(black_box(&payload), PitchDims::default());
            let ratings = extract_ratings(black_box(&payload));
            black_box((render, ratings));
        })
    });
}

fn bench_compose(c: &mut Criterion) {
    let detail = busy_detail(40);
    c.bench_function("compose_40_shots", |b| {
        b.iter(|| {
            let figure = compose(black_box(&detail), PitchDims::default());
            black_box(figure.shapes.len());
        })
    });
    c.bench_function("compose_40_shots_svg", |b| {
        b.iter(|| {
            let svg = compose(black_box(&detail), PitchDims::default()).to_svg();
            black_box(svg.len());
        })
    });
}

criterion_group!(
    benches,
    bench_payload_parse,
    bench_render_and_ratings,
    bench_compose
);
criterion_main!(benches);
