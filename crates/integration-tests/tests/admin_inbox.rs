//! Integration tests for the moderation inbox.
//!
//! These tests drive the full flow: submit on the site, review in the admin.
//! They require:
//! - A running `PostgreSQL` database with both migration sets applied
//! - Both servers running (site on 3000, admin on 3001)
//! - A moderator account with `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` set
//!
//! Run with: cargo test -p nothanks-integration-tests -- --ignored

use reqwest::{Client, StatusCode, multipart};
use uuid::Uuid;

use nothanks_integration_tests::{admin_base_url, site_base_url};

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

async fn authenticated_client() -> Client {
    let client = client();
    let email = std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL must be set");
    let password = std::env::var("TEST_ADMIN_PASSWORD").expect("TEST_ADMIN_PASSWORD must be set");

    let resp = client
        .post(format!("{}/login", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    client
}

/// Submit a pending product through the public form and return its name.
async fn submit_test_product() -> String {
    let name = format!("Inbox Test Product {}", Uuid::new_v4());
    let form = multipart::Form::new()
        .text("name", name.clone())
        .text("submitted_by", "Inbox Tester");

    let resp = Client::new()
        .post(format!("{}/products/submit", site_base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to submit product");
    assert!(resp.status().is_success() || resp.status().is_redirection());

    name
}

/// Find a request's id on the inbox page by the product name.
///
/// The action forms embed the id as `/dashboard/inbox/{id}/approve`, so the
/// id is recoverable from the row's markup.
fn extract_request_id(body: &str, name: &str) -> Option<i64> {
    let row_start = body.find(name)?;
    let tail = &body[row_start..];
    let marker = "/dashboard/inbox/";
    let idx = tail.find(marker)?;
    let after = &tail[idx + marker.len()..];
    let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[tokio::test]
#[ignore = "Requires both servers, database, and TEST_ADMIN_* credentials"]
async fn test_submission_appears_in_inbox_as_pending() {
    let name = submit_test_product().await;
    let client = authenticated_client().await;

    let resp = client
        .get(format!("{}/dashboard/inbox", admin_base_url()))
        .send()
        .await
        .expect("Failed to fetch inbox");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains(&name), "new submission is missing from inbox");
    assert!(extract_request_id(&body, &name).is_some());
}

#[tokio::test]
#[ignore = "Requires both servers, database, and TEST_ADMIN_* credentials"]
async fn test_approve_publishes_to_catalog() {
    let name = submit_test_product().await;
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let body = client
        .get(format!("{base_url}/dashboard/inbox"))
        .send()
        .await
        .expect("Failed to fetch inbox")
        .text()
        .await
        .expect("body");
    let id = extract_request_id(&body, &name).expect("request id");

    let resp = client
        .post(format!("{base_url}/dashboard/inbox/{id}/approve"))
        .send()
        .await
        .expect("Failed to approve");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").expect("location"),
        "/dashboard/inbox?success=approved"
    );

    // Approval is the publication mechanism: the catalog now carries it
    let catalog = Client::new()
        .get(format!("{}/products?q={}", site_base_url(), name.replace(' ', "+")))
        .send()
        .await
        .expect("Failed to fetch catalog")
        .text()
        .await
        .expect("body");
    assert!(catalog.contains(&name), "approved product missing from catalog");

    // A second approve is a guarded no-op
    let resp = client
        .post(format!("{base_url}/dashboard/inbox/{id}/approve"))
        .send()
        .await
        .expect("Failed to re-approve");
    assert_eq!(
        resp.headers().get("location").expect("location"),
        "/dashboard/inbox?error=not-pending"
    );
}

#[tokio::test]
#[ignore = "Requires both servers, database, and TEST_ADMIN_* credentials"]
async fn test_reject_keeps_product_out_of_catalog() {
    let name = submit_test_product().await;
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let body = client
        .get(format!("{base_url}/dashboard/inbox"))
        .send()
        .await
        .expect("Failed to fetch inbox")
        .text()
        .await
        .expect("body");
    let id = extract_request_id(&body, &name).expect("request id");

    let resp = client
        .post(format!("{base_url}/dashboard/inbox/{id}/reject"))
        .send()
        .await
        .expect("Failed to reject");
    assert_eq!(
        resp.headers().get("location").expect("location"),
        "/dashboard/inbox?success=rejected"
    );

    let catalog = Client::new()
        .get(format!("{}/products?q={}", site_base_url(), name.replace(' ', "+")))
        .send()
        .await
        .expect("Failed to fetch catalog")
        .text()
        .await
        .expect("body");
    assert!(!catalog.contains(&name), "rejected product leaked into catalog");
}

#[tokio::test]
#[ignore = "Requires both servers, database, and TEST_ADMIN_* credentials"]
async fn test_stale_edit_reports_conflict() {
    let name = submit_test_product().await;
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let body = client
        .get(format!("{base_url}/dashboard/inbox"))
        .send()
        .await
        .expect("Failed to fetch inbox")
        .text()
        .await
        .expect("body");
    let id = extract_request_id(&body, &name).expect("request id");

    // Approving bumps updated_at, making any previously-read version stale
    client
        .post(format!("{base_url}/dashboard/inbox/{id}/approve"))
        .send()
        .await
        .expect("Failed to approve");

    let resp = client
        .post(format!("{base_url}/dashboard/inbox/{id}/edit"))
        .form(&[
            ("name", name.as_str()),
            ("submitted_by", "Inbox Tester"),
            ("status", "pending"),
            // Guaranteed-stale version
            ("read_updated_at", "2020-01-01T00:00:00+00:00"),
        ])
        .send()
        .await
        .expect("Failed to post edit");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").expect("location"),
        "/dashboard/inbox?error=conflict"
    );
}

#[tokio::test]
#[ignore = "Requires both servers, database, and TEST_ADMIN_* credentials"]
async fn test_delete_flow_requires_confirmation_page() {
    let name = submit_test_product().await;
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let body = client
        .get(format!("{base_url}/dashboard/inbox"))
        .send()
        .await
        .expect("Failed to fetch inbox")
        .text()
        .await
        .expect("body");
    let id = extract_request_id(&body, &name).expect("request id");

    // The GET renders a confirmation, it must not delete anything
    let resp = client
        .get(format!("{base_url}/dashboard/inbox/{id}/delete"))
        .send()
        .await
        .expect("Failed to fetch confirmation page");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("no undo"));

    // The POST performs the delete
    let resp = client
        .post(format!("{base_url}/dashboard/inbox/{id}/delete"))
        .send()
        .await
        .expect("Failed to delete");
    assert_eq!(
        resp.headers().get("location").expect("location"),
        "/dashboard/inbox?success=deleted"
    );

    // Deleting again reports the row as gone
    let resp = client
        .post(format!("{base_url}/dashboard/inbox/{id}/delete"))
        .send()
        .await
        .expect("Failed to re-delete");
    assert_eq!(
        resp.headers().get("location").expect("location"),
        "/dashboard/inbox?error=missing"
    );
}
