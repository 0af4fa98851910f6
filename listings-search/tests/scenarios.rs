//! End-to-end scenarios over both query paths and the sync hooks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use listings_search::seed::{apply_seed, SeedFile};
use listings_search::{Dependencies, SearchConfig};
use listings_search_repository::SqliteListingStore;
use listings_search_shared::{EntityKind, JobQuery, JobRecord, JobSort};
use listings_search_sync::{SyncOutcome, WriteAction, WritePredicate};

fn config(host: Option<&str>) -> SearchConfig {
    let mut vars = HashMap::from([
        ("SEARCH_TASK_POLL_INTERVAL_MS", "1".to_string()),
        ("SEARCH_TASK_MAX_ATTEMPTS", "5".to_string()),
    ]);
    if let Some(host) = host {
        vars.insert("SEARCH_ENABLED", "true".to_string());
        vars.insert("SEARCH_HOST", host.to_string());
    }
    SearchConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn dependencies(host: Option<&str>) -> Dependencies {
    let store = Arc::new(SqliteListingStore::in_memory().unwrap());
    Dependencies::with_store(config(host), store).unwrap()
}

fn posted(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
}

fn job(id: &str, remote: bool, skills: &[&str], salary: i64, day: u32) -> JobRecord {
    let mut job = JobRecord::new(id, format!("Engineer {}", id), posted(day));
    job.remote = Some(remote);
    job.skills = Some(skills.iter().map(|s| s.to_string()).collect());
    job.salary_min = Some(salary);
    job
}

fn react_query(page: u32) -> JobQuery {
    JobQuery {
        skills: vec!["React".to_string()],
        remote: Some(true),
        sort: JobSort::SalaryDesc,
        page,
        per_page: 5,
        ..JobQuery::default()
    }
}

fn hit(id: usize) -> Value {
    json!({
        "id": format!("job-{}", id),
        "title": "Frontend engineer",
        "description": "",
        "remote": true,
        "skills": ["React"],
        "tags": [],
        "salaryMin": 90_000 - id as i64 * 1_000,
        "postedAt": 1_714_564_800
    })
}

fn enqueued(uid: u64) -> Value {
    json!({ "taskUid": uid, "indexUid": "jobs", "status": "enqueued", "type": "documentAdditionOrUpdate" })
}

#[tokio::test]
async fn test_index_query_serves_requested_page() {
    let server = MockServer::start().await;
    let hits: Vec<Value> = (5..10).map(hit).collect();
    Mock::given(method("POST"))
        .and(path("/indexes/jobs/search"))
        .and(body_partial_json(json!({
            "offset": 5,
            "limit": 5,
            "filter": ["remote = true", "skills = \"React\""],
            "sort": ["salaryMin:desc"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": hits,
            "estimatedTotalHits": 11,
            "offset": 5,
            "limit": 5,
            "processingTimeMs": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let deps = dependencies(Some(&server.uri()));
    assert!(deps.queries.uses_index());

    let page = deps
        .queries
        .search_jobs(&react_query(2), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.items[0].id, "job-5");
    assert_eq!(page.total, 11);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next);
    assert!(page.has_prev);
}

#[tokio::test]
async fn test_store_fallback_serves_same_page_shape() {
    let deps = dependencies(None);
    assert!(!deps.queries.uses_index());

    for i in 1..=11 {
        deps.store
            .save_job(&job(&format!("job-{}", i), true, &["React", "TypeScript"], i * 10_000, i as u32))
            .unwrap();
    }
    deps.store.save_job(&job("onsite", false, &["React"], 500_000, 20)).unwrap();
    deps.store.save_job(&job("backend", true, &["Go"], 500_000, 21)).unwrap();

    let page = deps
        .queries
        .search_jobs(&react_query(2), &CancellationToken::new())
        .await
        .unwrap();

    let salaries: Vec<_> = page.items.iter().map(|job| job.salary_min).collect();
    assert_eq!(
        salaries,
        vec![Some(60_000), Some(50_000), Some(40_000), Some(30_000), Some(20_000)]
    );
    assert_eq!(page.total, 11);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next && page.has_prev);

    let clamped = deps
        .queries
        .search_jobs(&react_query(9), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(clamped.page, 3);
    assert_eq!(clamped.items.len(), 1);
    assert_eq!(clamped.items[0].id, "job-1");
    assert!(!clamped.has_next);
}

#[tokio::test]
async fn test_delete_by_other_predicate_leaves_index_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(202).set_body_json(enqueued(1)))
        .expect(0)
        .mount(&server)
        .await;

    let deps = dependencies(Some(&server.uri()));
    deps.store.save_job(&job("old", true, &["Rust"], 40_000, 1)).unwrap();
    deps.store.save_job(&job("new", true, &["Rust"], 40_000, 28)).unwrap();

    let cutoff = posted(15);
    let action = WriteAction::BulkDelete(WritePredicate::Other(format!("postedAt < {}", cutoff)));
    let removed = deps
        .hooks
        .around_write(
            EntityKind::Job,
            async { deps.store.delete_jobs_posted_before(cutoff) },
            |_| Some(action.clone()),
        )
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(
        deps.hooks.try_sync(EntityKind::Job, &action).await.unwrap(),
        SyncOutcome::Skipped
    );
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| r.method.as_str() != "DELETE"));
}

#[tokio::test]
async fn test_bulk_create_replaces_documents_once() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/indexes/jobs/documents"))
        .respond_with(ResponseTemplate::new(202).set_body_json(enqueued(7)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "uid": 7, "indexUid": "jobs", "status": "succeeded" })),
        )
        .mount(&server)
        .await;

    let deps = dependencies(Some(&server.uri()));
    let base = posted(1);
    let seed = SeedFile {
        jobs: (0..50)
            .map(|i| JobRecord::new(uuid::Uuid::new_v4().to_string(), "Engineer", base + Duration::hours(i)))
            .collect(),
        events: Vec::new(),
    };

    let report = apply_seed(&deps.store, &deps.hooks, &seed).await.unwrap();
    assert_eq!(report.jobs, 50);

    let requests = server.received_requests().await.unwrap_or_default();
    let puts: Vec<_> = requests
        .iter()
        .filter(|r| r.method.as_str() == "PUT")
        .collect();
    assert_eq!(puts.len(), 1);
    let documents: Vec<Value> = serde_json::from_slice(&puts[0].body).unwrap();
    assert_eq!(documents.len(), 50);
}
