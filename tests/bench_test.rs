//! Benchmark tests for critical operations
//!
//! Run with: cargo test --release --test bench_test -- --ignored --nocapture

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use catalog::database::{AppState, Store};
use catalog::model::Author;
use catalog::route::create_app;

fn report(name: &str, iterations: usize, duration: Duration) {
    let avg_ms = duration.as_millis() as f64 / iterations as f64;
    let ops_per_sec = (iterations as f64 / duration.as_secs_f64()) as u64;

    println!("  {} ({} iterations)", name, iterations);
    println!("    Total time: {:?}", duration);
    println!("    Avg time: {:.3}ms", avg_ms);
    println!("    Throughput: {} ops/sec\n", ops_per_sec);
}

fn setup() -> (Router, Store, NamedTempFile) {
    let temp_db = NamedTempFile::new().unwrap();
    let store = Store::open(temp_db.path().to_str().unwrap()).unwrap();
    let app = create_app(AppState {
        store: store.clone(),
    });
    (app, store, temp_db)
}

async fn create_author(app: &Router, n: usize) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/catalog/author/create")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("first_name=Bench{n}&family_name=Author{n}")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
async fn bench_create_authors() {
    println!("\n=== Benchmark: Create authors ===\n");

    let (app, store, _temp_db) = setup();

    // Each create also scans for a duplicate name, so this slows as the table grows
    let iterations = 500;
    let start = Instant::now();
    for n in 0..iterations {
        create_author(&app, n).await;
    }
    report("Create via form post", iterations, start.elapsed());

    let count = store.count(|_: &Author| true).await.unwrap();
    assert_eq!(count, iterations);
}

#[tokio::test]
#[ignore]
async fn bench_list_authors() {
    println!("\n=== Benchmark: List authors ===\n");

    let (app, _store, _temp_db) = setup();
    for n in 0..1000 {
        create_author(&app, n).await;
    }

    let iterations = 100;
    let start = Instant::now();
    for _ in 0..iterations {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/catalog/authors")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    report("List 1000 authors", iterations, start.elapsed());
}
