mod common;

use anyhow::Result;
use common::{id_of, names, orders, project_payload, TestApp};
use reqwest::Method;
use serde_json::{json, Value};

/// 建立 A、B、C 後排序為 [C, A, B]，重新讀取要完全一致
#[tokio::test]
async fn test_create_then_reorder_round_trip() -> Result<()> {
    let app = TestApp::spawn().await;

    let a = app.create_project("A").await;
    let b = app.create_project("B").await;
    let c = app.create_project("C").await;
    assert_eq!(a["order"], 0);
    assert_eq!(b["order"], 1);
    assert_eq!(c["order"], 2);

    let response = app
        .admin(Method::PUT, "/admin/projects/reorder")
        .json(&json!({ "ids": [id_of(&c), id_of(&a), id_of(&b)] }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], true);

    let list = app.get_json("/projects").await;
    assert_eq!(names(&list), vec!["C", "A", "B"]);
    assert_eq!(orders(&list), vec![0, 1, 2]);

    let admin_list: Value = app
        .admin(Method::GET, "/admin/projects")
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(names(&admin_list), vec!["C", "A", "B"]);
    Ok(())
}

#[tokio::test]
async fn test_reorder_rejects_partial_permutation() -> Result<()> {
    let app = TestApp::spawn().await;
    let a = app.create_project("A").await;
    let b = app.create_project("B").await;

    for ids in [
        json!([id_of(&b)]),
        json!([id_of(&b), id_of(&b)]),
        json!([id_of(&b), id_of(&a), "missing"]),
    ] {
        let response = app
            .admin(Method::PUT, "/admin/projects/reorder")
            .json(&json!({ "ids": ids }))
            .send()
            .await?;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await?;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    let list = app.get_json("/projects").await;
    assert_eq!(names(&list), vec!["A", "B"]);
    assert_eq!(orders(&list), vec![0, 1]);
    Ok(())
}

#[tokio::test]
async fn test_reorder_with_stale_version_conflicts() -> Result<()> {
    let app = TestApp::spawn().await;
    let a = app.create_project("A").await;
    let b = app.create_project("B").await;

    let version: Value = app
        .admin(Method::GET, "/admin/projects/version")
        .send()
        .await?
        .json()
        .await?;
    let current = version["version"].as_u64().unwrap_or_default();

    let response = app
        .admin(Method::PUT, "/admin/projects/reorder")
        .json(&json!({ "ids": [id_of(&b), id_of(&a)], "expectedVersion": current }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["version"].as_u64(), Some(current + 1));

    // 另一個分頁仍拿著舊版本
    let response = app
        .admin(Method::PUT, "/admin/projects/reorder")
        .json(&json!({ "ids": [id_of(&a), id_of(&b)], "expectedVersion": current }))
        .send()
        .await?;
    assert_eq!(response.status(), 409);

    assert_eq!(app.public_names("/projects").await, vec!["B", "A"]);
    Ok(())
}

#[tokio::test]
async fn test_delete_keeps_relative_order() -> Result<()> {
    let app = TestApp::spawn().await;
    app.create_project("A").await;
    let b = app.create_project("B").await;
    app.create_project("C").await;

    let response = app
        .admin(Method::DELETE, &format!("/admin/projects/{}", id_of(&b)))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let list = app.get_json("/projects").await;
    assert_eq!(names(&list), vec!["A", "C"]);
    assert_eq!(orders(&list), vec![0, 2]);

    // 刪除後新增的項目排在最後
    let d = app.create_project("D").await;
    assert_eq!(d["order"], 3);

    let response = app
        .admin(Method::DELETE, &format!("/admin/projects/{}", id_of(&b)))
        .send()
        .await?;
    assert_eq!(response.status(), 404);
    Ok(())
}

#[tokio::test]
async fn test_update_keeps_order_and_refreshes_public_pages() -> Result<()> {
    let app = TestApp::spawn().await;
    app.create_project("A").await;
    let b = app.create_project("B").await;

    // 先讓公開列表與詳細頁進入快取
    assert_eq!(app.public_names("/projects").await, vec!["A", "B"]);
    let detail = app.get_json(&format!("/projects/{}", id_of(&b))).await;
    assert_eq!(detail["name"], "B");

    let mut payload = project_payload("B2");
    payload["comingSoon"] = json!(true);
    let response = app
        .admin(Method::PUT, &format!("/admin/projects/{}", id_of(&b)))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await?;
    assert_eq!(updated["order"], 1);
    assert_eq!(updated["comingSoon"], true);

    assert_eq!(app.public_names("/projects").await, vec!["A", "B2"]);
    let detail = app.get_json(&format!("/projects/{}", id_of(&b))).await;
    assert_eq!(detail["name"], "B2");
    Ok(())
}

#[tokio::test]
async fn test_public_list_carries_cache_headers() -> Result<()> {
    let app = TestApp::spawn().await;
    let response = app.http.get(app.url("/projects")).send().await?;
    assert_eq!(response.status(), 200);
    let cache_control = response
        .headers()
        .get("cache-control")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cache_control.contains("s-maxage=86400"));
    let body: Value = response.json().await?;
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn test_validation_errors_report_fields() -> Result<()> {
    let app = TestApp::spawn().await;

    let mut payload = project_payload("A");
    payload["name"] = json!("   ");
    payload["layoutVariant"] = json!("Z");
    let response = app
        .admin(Method::POST, "/admin/projects")
        .json(&payload)
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await?;
    let fields: Vec<&str> = body["error"]["fields"]
        .as_array()
        .map(|fields| fields.iter().filter_map(|f| f["field"].as_str()).collect())
        .unwrap_or_default();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"layoutVariant"));

    let response = app
        .admin(Method::POST, "/admin/projects")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(response.status(), 400);

    // 空字串的開始年視為未填
    let mut payload = project_payload("B");
    payload["startYear"] = json!("");
    let response = app
        .admin(Method::POST, "/admin/projects")
        .json(&payload)
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["fields"][0]["field"], "startYear");
    assert_eq!(body["error"]["fields"].as_array().map(Vec::len), Some(1));

    assert!(app.get_json("/projects").await.as_array().is_some_and(|a| a.is_empty()));
    Ok(())
}

#[tokio::test]
async fn test_case_study_resolution() -> Result<()> {
    let app = TestApp::spawn().await;

    let mut payload = project_payload("Fieldnotes");
    payload["caseStudySlug"] = json!("fieldnotes");
    payload["caseStudy"] = json!("# Ignored");
    let custom = app
        .admin(Method::POST, "/admin/projects")
        .json(&payload)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let view = app
        .get_json(&format!("/projects/{}/case-study", id_of(&custom)))
        .await;
    assert_eq!(view["kind"], "custom");
    assert_eq!(view["slug"], "fieldnotes");

    let mut payload = project_payload("Story");
    payload["caseStudy"] = json!("# The story");
    let markdown = app
        .admin(Method::POST, "/admin/projects")
        .json(&payload)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let view = app
        .get_json(&format!("/projects/{}/case-study", id_of(&markdown)))
        .await;
    assert_eq!(view["kind"], "markdown");
    assert_eq!(view["body"], "# The story");

    let plain = app.create_project("Plain").await;
    let response = app
        .http
        .get(app.url(&format!("/projects/{}/case-study", id_of(&plain))))
        .send()
        .await?;
    assert_eq!(response.status(), 404);

    let mut payload = project_payload("Unknown");
    payload["caseStudySlug"] = json!("not-registered");
    let response = app
        .admin(Method::POST, "/admin/projects")
        .json(&payload)
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_coming_soon_case_study_stays_private() -> Result<()> {
    let app = TestApp::spawn().await;

    let mut payload = project_payload("Lumen");
    payload["comingSoon"] = json!(true);
    payload["caseStudy"] = json!("# Unreleased story");
    payload["caseStudySlug"] = json!("lumen-health");
    let created = app
        .admin(Method::POST, "/admin/projects")
        .json(&payload)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = id_of(&created);

    let listed = app.get_json("/projects").await;
    assert_eq!(listed[0]["comingSoon"], true);
    assert!(listed[0]["caseStudy"].is_null());
    assert!(listed[0]["caseStudySlug"].is_null());

    let detail = app.get_json(&format!("/projects/{}", id)).await;
    assert_eq!(detail["name"], "Lumen");
    assert!(detail["caseStudy"].is_null());
    assert!(detail["caseStudySlug"].is_null());

    let view = app.get_json(&format!("/projects/{}/case-study", id)).await;
    assert_eq!(view["kind"], "comingSoon");

    // 管理後台仍看得到完整內容
    let admin: Value = app
        .admin(Method::GET, "/admin/projects")
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(admin[0]["caseStudy"], "# Unreleased story");
    assert_eq!(admin[0]["caseStudySlug"], "lumen-health");
    Ok(())
}

#[tokio::test]
async fn test_team_collection_is_ordered_independently() -> Result<()> {
    let app = TestApp::spawn().await;
    app.create_project("P").await;
    let ada = app.create_member("Ada").await;
    let grace = app.create_member("Grace").await;
    assert_eq!(ada["order"], 0);
    assert_eq!(grace["order"], 1);

    assert_eq!(app.public_names("/team").await, vec!["Ada", "Grace"]);

    let response = app
        .admin(Method::PUT, "/admin/team/reorder")
        .json(&json!({ "ids": [id_of(&grace), id_of(&ada)] }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    assert_eq!(app.public_names("/team").await, vec!["Grace", "Ada"]);
    assert_eq!(app.public_names("/projects").await, vec!["P"]);
    Ok(())
}
