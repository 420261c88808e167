//! Integration tests for transactional inspection recording.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post, seed_category, seed_project, seed_task, seed_user, token_for};
use sqlx::PgPool;

use sitetrack_db::models::issue::CreateIssue;
use sitetrack_db::repositories::{
    AllocationRepo, InspectionRepo, IssueRepo, SnapshotRepo, TaskRepo,
};

// ---------------------------------------------------------------------------
// Happy path: batched edits, journal, single snapshot
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn inspection_applies_batched_edits_atomically(pool: PgPool) {
    let admin = seed_user(&pool, "admin", "admin").await;
    let token = token_for(&admin);
    let project = seed_project(&pool, "Site", None, None).await;
    let category = seed_category(&pool, project.id, "Works").await;
    let t1 = seed_task(&pool, category, "Excavation", 0).await;
    let t2 = seed_task(&pool, category, "Formwork", 20).await;
    let t3 = seed_task(&pool, category, "Rebar", 70).await;

    let app = common::build_test_app(pool.clone());
    let response = post(
        app,
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "observations": "Weekly walkthrough",
            "task_edits": [
                { "task_id": t1.id, "percent": 30 },
                { "task_id": t2.id, "percent": 50 },
                { "task_id": t3.id, "percent": 70 },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    // Only the two tasks whose value actually changed are journaled.
    assert_eq!(json["data"]["changes"].as_array().unwrap().len(), 2);
    assert!(json["warnings"].as_array().unwrap().is_empty());

    let t1_after = TaskRepo::find_with_project(&pool, t1.id).await.unwrap().unwrap();
    let t2_after = TaskRepo::find_with_project(&pool, t2.id).await.unwrap().unwrap();
    assert_eq!(t1_after.percent, 30);
    assert_eq!(t1_after.status, "in_progress");
    assert_eq!(t2_after.percent, 50);

    // Exactly one snapshot row for the project, not one per task.
    let snapshots = SnapshotRepo::list_for_project(&pool, project.id).await.unwrap();
    assert_eq!(snapshots.len(), 1);
    // mean([30, 50, 70]) = 50.0
    assert_eq!(snapshots[0].real_pct, 50.0);
}

// ---------------------------------------------------------------------------
// Rollback scenarios
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_percent_rolls_back_the_whole_batch(pool: PgPool) {
    let admin = seed_user(&pool, "admin", "admin").await;
    let token = token_for(&admin);
    let project = seed_project(&pool, "Site", None, None).await;
    let category = seed_category(&pool, project.id, "Works").await;
    let t1 = seed_task(&pool, category, "Excavation", 0).await;
    let t2 = seed_task(&pool, category, "Formwork", 20).await;
    let t3 = seed_task(&pool, category, "Rebar", 40).await;

    let app = common::build_test_app(pool.clone());
    let response = post(
        app,
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "task_edits": [
                { "task_id": t1.id, "percent": 30 },
                { "task_id": t2.id, "percent": 150 },
                { "task_id": t3.id, "percent": 90 },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Zero task edits, zero journal rows, zero inspections, zero snapshots.
    let t1_after = TaskRepo::find_with_project(&pool, t1.id).await.unwrap().unwrap();
    let t3_after = TaskRepo::find_with_project(&pool, t3.id).await.unwrap().unwrap();
    assert_eq!(t1_after.percent, 0);
    assert_eq!(t3_after.percent, 40);

    let inspections = InspectionRepo::list_by_project(&pool, project.id).await.unwrap();
    assert!(inspections.is_empty());

    let snapshots = SnapshotRepo::list_for_project(&pool, project.id).await.unwrap();
    assert!(snapshots.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn open_issue_on_one_task_rolls_back_all_edits(pool: PgPool) {
    let admin = seed_user(&pool, "admin", "admin").await;
    let token = token_for(&admin);
    let project = seed_project(&pool, "Site", None, None).await;
    let category = seed_category(&pool, project.id, "Works").await;
    let t1 = seed_task(&pool, category, "Excavation", 0).await;
    let t2 = seed_task(&pool, category, "Formwork", 90).await;

    IssueRepo::create(
        &pool,
        project.id,
        Some(category),
        &CreateIssue {
            task_id: t2.id,
            description: "Formwork out of tolerance".to_string(),
            priority: None,
            responsible_id: None,
            due_date: None,
            problem_photo_ref: None,
        },
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post(
        app,
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "task_edits": [
                { "task_id": t1.id, "percent": 30 },
                { "task_id": t2.id, "percent": 100 },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let t1_after = TaskRepo::find_with_project(&pool, t1.id).await.unwrap().unwrap();
    assert_eq!(t1_after.percent, 0, "earlier edits in the batch must roll back");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn edit_for_unknown_task_rolls_back(pool: PgPool) {
    let admin = seed_user(&pool, "admin", "admin").await;
    let token = token_for(&admin);
    let project = seed_project(&pool, "Site", None, None).await;
    let category = seed_category(&pool, project.id, "Works").await;
    let t1 = seed_task(&pool, category, "Excavation", 0).await;

    let app = common::build_test_app(pool.clone());
    let response = post(
        app,
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "task_edits": [
                { "task_id": t1.id, "percent": 30 },
                { "task_id": 999_999, "percent": 10 },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let t1_after = TaskRepo::find_with_project(&pool, t1.id).await.unwrap().unwrap();
    assert_eq!(t1_after.percent, 0);
}

// ---------------------------------------------------------------------------
// Role gate inside the batch
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn level1_completed_task_edit_is_forbidden_in_batch(pool: PgPool) {
    let level1 = seed_user(&pool, "fieldworker", "level1").await;
    let token = token_for(&level1);
    let project = seed_project(&pool, "Site", None, None).await;
    let category = seed_category(&pool, project.id, "Works").await;
    let done = seed_task(&pool, category, "Excavation", 100).await;
    let open = seed_task(&pool, category, "Formwork", 10).await;
    AllocationRepo::grant(&pool, level1.id, project.id, level1.id).await.unwrap();

    let app = common::build_test_app(pool.clone());

    // Changing the completed task is forbidden and rolls back the batch.
    let response = post(
        app.clone(),
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "task_edits": [
                { "task_id": open.id, "percent": 60 },
                { "task_id": done.id, "percent": 90 },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let open_after = TaskRepo::find_with_project(&pool, open.id).await.unwrap().unwrap();
    assert_eq!(open_after.percent, 10);

    // Re-submitting the completed task's current value is a no-op and the
    // rest of the batch applies.
    let response = post(
        app,
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "task_edits": [
                { "task_id": open.id, "percent": 60 },
                { "task_id": done.id, "percent": 100 },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["changes"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Geolocation and photos
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unparsable_geolocation_warns_but_saves(pool: PgPool) {
    let admin = seed_user(&pool, "admin", "admin").await;
    let token = token_for(&admin);
    let project = seed_project(&pool, "Site", None, None).await;

    let app = common::build_test_app(pool.clone());
    let response = post(
        app.clone(),
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "observations": "No GPS fix",
            "latitude": "not-a-number",
            "longitude": "-46.6",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
    let inspection_id = json["data"]["id"].as_i64().unwrap();

    let response = get(
        app,
        &format!("/api/v1/inspections/{inspection_id}"),
        Some(&token),
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"]["latitude"].is_null());
    assert!(json["data"]["longitude"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn photos_are_validated_and_stored_in_order(pool: PgPool) {
    let admin = seed_user(&pool, "admin", "admin").await;
    let token = token_for(&admin);
    let project = seed_project(&pool, "Site", None, None).await;

    let app = common::build_test_app(pool.clone());

    // A disallowed content type fails fast with nothing committed.
    let response = post(
        app.clone(),
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "photos": [
                { "storage_ref": "inspections/a.pdf", "content_type": "application/pdf" },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(InspectionRepo::list_by_project(&pool, project.id)
        .await
        .unwrap()
        .is_empty());

    // Valid photos attach in submission order.
    let response = post(
        app.clone(),
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        serde_json::json!({
            "photos": [
                { "storage_ref": "inspections/north.jpg", "caption": "North face" },
                { "storage_ref": "inspections/south.jpg", "caption": "South face" },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let inspection_id = json["data"]["id"].as_i64().unwrap();

    let photos = InspectionRepo::photos(&pool, inspection_id).await.unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].caption, "North face");
    assert_eq!(photos[0].position, 0);
    assert_eq!(photos[1].caption, "South face");
    assert_eq!(photos[1].position, 1);
}

// ---------------------------------------------------------------------------
// One inspection per author/project/day
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_inspection_same_day_is_a_conflict(pool: PgPool) {
    let admin = seed_user(&pool, "admin", "admin").await;
    let token = token_for(&admin);
    let project = seed_project(&pool, "Site", None, None).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "observations": "Visit" });

    let response = post(
        app.clone(),
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(
        app,
        &format!("/api/v1/projects/{}/inspections", project.id),
        Some(&token),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
