mod common;

use serde_json::Value;

fn png_part() -> reqwest::multipart::Part {
    let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    reqwest::multipart::Part::bytes(png)
        .file_name("resolution.png")
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn admin_endpoints_reject_regular_users() {
    let app = common::spawn_app().await;
    let (_phone, token) = common::create_test_user(&app).await;

    for path in [
        "/admin/complaints",
        "/admin/stats",
        "/admin/heatmap",
        "/admin/export/complaints.csv",
    ] {
        let resp = app
            .client
            .get(app.url(path))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 403, "{} should be admin only", path);
    }
}

#[tokio::test]
async fn resolve_requires_proof() {
    let app = common::spawn_app().await;
    let (_phone, token) = common::create_test_user(&app).await;
    let (_admin_phone, admin_token) = common::create_test_admin(&app).await;
    let id = common::create_test_complaint(&app, &token, "Puri").await;

    // Resolving without a proof file is rejected
    let form = reqwest::multipart::Form::new().text("status", "Resolved");
    let resp = app
        .client
        .put(app.url(&format!("/admin/complaints/{}/status", id)))
        .bearer_auth(&admin_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // And the complaint is untouched
    let resp = app
        .client
        .get(app.url(&format!("/complaints/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "Pending");
    assert!(body["data"]["admin_proof"].is_null());

    // With a proof file it goes through
    let form = reqwest::multipart::Form::new()
        .text("status", "Resolved")
        .part("admin_proof", png_part());
    let resp = app
        .client
        .put(app.url(&format!("/admin/complaints/{}/status", id)))
        .bearer_auth(&admin_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "Resolved");
    let proof = body["data"]["admin_proof"].as_str().unwrap();
    assert!(proof.starts_with("/uploads/admin_proofs/"));
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let app = common::spawn_app().await;
    let (_phone, token) = common::create_test_user(&app).await;
    let (_admin_phone, admin_token) = common::create_test_admin(&app).await;
    let id = common::create_test_complaint(&app, &token, "Puri").await;

    let form = reqwest::multipart::Form::new().text("status", "Closed");
    let resp = app
        .client
        .put(app.url(&format!("/admin/complaints/{}/status", id)))
        .bearer_auth(&admin_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn complaint_search_and_pagination() {
    let app = common::spawn_app().await;
    let (_phone, token) = common::create_test_user(&app).await;
    let (_admin_phone, admin_token) = common::create_test_admin(&app).await;

    common::create_test_complaint(&app, &token, "Puri").await;
    common::create_test_complaint(&app, &token, "Cuttack").await;
    common::create_test_complaint(&app, &token, "Khordha").await;

    // Case-insensitive district match
    let resp = app
        .client
        .get(app.url("/admin/complaints?q=cutta"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["district"], "Cuttack");

    // Pagination metadata
    let resp = app
        .client
        .get(app.url("/admin/complaints?page=1&per_page=2"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total_pages"], 2);
}

#[tokio::test]
async fn user_complaint_listing_by_phone() {
    let app = common::spawn_app().await;
    let (phone, token) = common::create_test_user(&app).await;
    let (_phone2, other_token) = common::create_test_user(&app).await;
    let (_admin_phone, admin_token) = common::create_test_admin(&app).await;

    common::create_test_complaint(&app, &token, "Puri").await;
    common::create_test_complaint(&app, &token, "Cuttack").await;
    common::create_test_complaint(&app, &other_token, "Khordha").await;

    let resp = app
        .client
        .get(app.url(&format!("/admin/users/{}/complaints", phone)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i["user_phone"] == phone.as_str()));
}

#[tokio::test]
async fn stats_aggregate_the_complaint_table() {
    let app = common::spawn_app().await;
    let (_phone, token) = common::create_test_user(&app).await;
    let (_admin_phone, admin_token) = common::create_test_admin(&app).await;

    let first = common::create_test_complaint(&app, &token, "Puri").await;
    common::create_test_complaint(&app, &token, "Puri").await;
    common::create_test_complaint(&app, &token, "Cuttack").await;

    // Resolve one
    let form = reqwest::multipart::Form::new()
        .text("status", "Resolved")
        .part("admin_proof", png_part());
    let resp = app
        .client
        .put(app.url(&format!("/admin/complaints/{}/status", first)))
        .bearer_auth(&admin_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/admin/stats"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let stats = &body["data"];

    assert_eq!(stats["total"], 3);
    assert_eq!(stats["by_status"]["Pending"], 2);
    assert_eq!(stats["by_status"]["Resolved"], 1);
    assert_eq!(stats["by_department"]["Water Supply"], 3);
    assert_eq!(stats["department_status"]["Water Supply"]["pending"], 2);
    assert_eq!(stats["department_status"]["Water Supply"]["resolved"], 1);
    assert_eq!(stats["top_districts"][0]["label"], "Puri");
    assert_eq!(stats["top_districts"][0]["count"], 2);
    // Every complaint was touched today
    let over_time = stats["over_time"].as_object().unwrap();
    assert_eq!(over_time.values().map(|v| v.as_u64().unwrap()).sum::<u64>(), 3);
    // Nothing is 5 days stale yet
    assert_eq!(stats["stale_pending"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn heatmap_joins_districts_with_boundary_names() {
    let app = common::spawn_app().await;
    let (_phone, token) = common::create_test_user(&app).await;
    let (_admin_phone, admin_token) = common::create_test_admin(&app).await;

    common::create_test_complaint(&app, &token, "Puri").await;
    common::create_test_complaint(&app, &token, "keonjhar").await;

    let resp = app
        .client
        .get(app.url("/admin/heatmap"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let rows = body["data"].as_array().unwrap();

    // All 30 districts, zero-filled
    assert_eq!(rows.len(), 30);

    let puri = rows.iter().find(|r| r["district"] == "Puri").unwrap();
    assert_eq!(puri["pending"], 1);
    assert_eq!(puri["total"], 1);

    // Stored as "keonjhar", reported under the boundary spelling
    let kendujhar = rows.iter().find(|r| r["district"] == "Kendujhar").unwrap();
    assert_eq!(kendujhar["total"], 1);
    assert!(!rows.iter().any(|r| r["district"] == "Keonjhar"));

    let empty = rows.iter().find(|r| r["district"] == "Malkangiri").unwrap();
    assert_eq!(empty["total"], 0);
}

#[tokio::test]
async fn csv_export_contains_every_complaint() {
    let app = common::spawn_app().await;
    let (phone, token) = common::create_test_user(&app).await;
    let (_admin_phone, admin_token) = common::create_test_admin(&app).await;

    common::create_test_complaint(&app, &token, "Puri").await;
    common::create_test_complaint(&app, &token, "Cuttack").await;

    let resp = app
        .client
        .get(app.url("/admin/export/complaints.csv"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let body = resp.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3); // header + 2 rows
    assert!(lines[0].starts_with("id,user_phone,name"));
    assert!(lines[1..].iter().all(|l| l.contains(phone.as_str())));
}
