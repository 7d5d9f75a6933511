//! Integration tests for the public catalog.
//!
//! These tests require:
//! - A running `PostgreSQL` database with site migrations applied
//! - The site server running (cargo run -p nothanks-site)
//!
//! Run with: cargo test -p nothanks-integration-tests -- --ignored

use reqwest::{Client, StatusCode};

use nothanks_integration_tests::site_base_url;

fn client() -> Client {
    Client::new()
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_catalog_lists_seed_products() {
    let client = client();
    let base_url = site_base_url();

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to fetch catalog");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");

    // Seed entries are always present regardless of database contents
    assert!(body.contains("Bamba"));
    assert!(body.contains("product-grid"));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_catalog_search_narrows_results() {
    let client = client();
    let base_url = site_base_url();

    let resp = client
        .get(format!("{base_url}/products?q=wix"))
        .send()
        .await
        .expect("Failed to search catalog");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Wix"));
    assert!(!body.contains("Bamba"));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_catalog_category_filter() {
    let client = client();
    let base_url = site_base_url();

    let resp = client
        .get(format!("{base_url}/products?category=Beverages"))
        .send()
        .await
        .expect("Failed to filter catalog");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Wissotzky Tea"));
    assert!(!body.contains("Sabra Hummus"));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_exclude_flag_empties_all_flagged_catalog() {
    let client = client();
    let base_url = site_base_url();

    // Every catalog entry is flagged, so excluding flagged entries leaves
    // nothing.
    let resp = client
        .get(format!("{base_url}/products?exclude=true"))
        .send()
        .await
        .expect("Failed to filter catalog");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("No products match"));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_out_of_range_page_is_clamped() {
    let client = client();
    let base_url = site_base_url();

    let resp = client
        .get(format!("{base_url}/products?page=999"))
        .send()
        .await
        .expect("Failed to fetch catalog");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    // A stale page index never renders an empty page
    assert!(!body.contains("No products match"));
}
