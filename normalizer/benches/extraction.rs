use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use normalizer_pipeline::extractor::extract;
use normalizer_shared::catalog::{LOCATIONS_CATEGORY, SIMILAR_COMPANIES_CATEGORY, UPDATES_CATEGORY};
use serde_json::{json, Value as JsonValue};

/// A location list the size of a large company profile.
fn make_locations(count: usize) -> JsonValue {
    JsonValue::Array(
        (0..count)
            .map(|i| {
                json!({
                    "country": if i % 10 == 0 { "  " } else { "US" },
                    "city": format!("City {i}"),
                    "postal_code": format!("{:05}", i),
                    "line_1": format!("{i} Main Street"),
                    "is_hq": if i == 1 { "true" } else { "false" },
                    "state": "NY"
                })
            })
            .collect(),
    )
}

fn make_updates(count: usize) -> JsonValue {
    JsonValue::Array(
        (0..count)
            .map(|i| {
                json!({
                    "article_link": format!("https://example.com/posts/{i}"),
                    "text": "  Quarterly update  ",
                    "posted_on": { "year": 2020 + (i % 5) as i64, "month": 1 + (i % 12) as i64 },
                    "total_likes": i
                })
            })
            .collect(),
    )
}

fn count_entries(payload: &JsonValue, category: &normalizer_shared::types::CategorySpec) -> usize {
    match extract(Some(payload), category) {
        Ok(entries) => entries.filter(|entry| entry.is_ok()).count(),
        Err(_) => 0,
    }
}

/// Benchmark extraction of object lists
fn list_extraction(c: &mut Criterion) {
    let locations = make_locations(100);
    let updates = make_updates(100);

    c.bench_function("extract_100_locations", |b| {
        b.iter(|| count_entries(black_box(&locations), &LOCATIONS_CATEGORY))
    });

    c.bench_function("extract_100_updates", |b| {
        b.iter(|| count_entries(black_box(&updates), &UPDATES_CATEGORY))
    });
}

/// Benchmark payloads stored as JSON text, which are parsed before extraction
fn textual_payload_extraction(c: &mut Criterion) {
    let similar = JsonValue::String(
        json!([
            { "name": "Globex", "link": "https://example.com/globex", "industry": "Energy", "location": "Springfield" },
            { "name": "Initech", "link": "https://example.com/initech" },
            { "name": " " }
        ])
        .to_string(),
    );

    c.bench_function("extract_textual_similar_companies", |b| {
        b.iter_batched(
            || similar.clone(),
            |payload| count_entries(black_box(&payload), &SIMILAR_COMPANIES_CATEGORY),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, list_extraction, textual_payload_extraction);
criterion_main!(benches);
