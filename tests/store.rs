use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

use tflog_harness::config::Config;
use tflog_harness::export::export_jsonl;
use tflog_harness::get::get_log_detail;
use tflog_harness::ingest::{ingest_lines, ingest_text};
use tflog_harness::models::{Level, NewJsonBody, NewLogRecord, SearchFilters, Section};
use tflog_harness::rules::Rules;
use tflog_harness::sqlite_store::SqliteStore;
use tflog_harness::store::Store;

async fn open_store() -> (TempDir, SqliteStore) {
    let tmp = TempDir::new().unwrap();
    let config = Config::for_db_path(tmp.path().join("data").join("logs.sqlite"));
    let store = SqliteStore::open(&config).await.unwrap();
    (tmp, store)
}

fn record(ts: Option<&str>, level: Option<Level>, section: Option<Section>) -> NewLogRecord {
    NewLogRecord {
        raw_json: json!({"ts": ts}).to_string(),
        ts: ts.map(str::to_string),
        level,
        section,
        text_excerpt: "excerpt".to_string(),
        ..Default::default()
    }
}

const SAMPLE: &str = r#"{"@level":"info","@message":"Terraform plan starting","timestamp":"2024-01-01T00:00:01.000Z"}
{"level":"warn","tf_resource":"aws_s3_bucket","tf_req_id":"abc-1","timestamp":"2024-01-01T00:00:00.000Z"}

not valid json {{{
{"@level":"debug","tf_req_id":"abc-1","tf_http_res_body":"{\"Name\":\"bucket\"}","tf_http_req_body":"{\"Bucket\":\"bucket\"}","timestamp":"2024-01-01T00:00:02.000Z"}

{"@message":"aws_vpc.main: Refreshing state... [id=vpc-1]","timestamp":"2024-01-01T00:00:03.000Z"}
"#;

#[tokio::test]
async fn test_one_record_per_non_blank_line() {
    let (_tmp, store) = open_store().await;
    let inserted = ingest_text(&store, Rules::terraform(), SAMPLE).await.unwrap();
    assert_eq!(inserted, 5);
    assert_eq!(store.count_logs().await.unwrap(), 5);
}

#[tokio::test]
async fn test_structured_fields_stored() {
    let (_tmp, store) = open_store().await;
    let line = r#"{"level":"warn","tf_resource":"aws_s3_bucket","tf_req_id":"abc-1","timestamp":"2024-01-01T00:00:00.000Z"}"#;
    ingest_lines(&store, Rules::terraform(), [line]).await.unwrap();

    let rows = store.search(&SearchFilters::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.level, Some(Level::Warning));
    assert_eq!(row.tf_resource.as_deref(), Some("aws_s3_bucket"));
    assert_eq!(row.tf_req_id.as_deref(), Some("abc-1"));
    assert_eq!(row.ts.as_deref(), Some("2024-01-01T00:00:00.000Z"));
    assert!(!row.read_flag);

    let stored: Value = serde_json::from_str(&row.raw_json).unwrap();
    let original: Value = serde_json::from_str(line).unwrap();
    assert_eq!(stored, original);
}

#[tokio::test]
async fn test_invalid_json_stored_as_raw_wrapper() {
    let (_tmp, store) = open_store().await;
    ingest_lines(&store, Rules::terraform(), ["not valid json {{{"])
        .await
        .unwrap();

    let rows = store.search(&SearchFilters::default()).await.unwrap();
    assert_eq!(rows[0].raw_json, json!({"raw": "not valid json {{{"}).to_string());
}

#[tokio::test]
async fn test_ids_monotonic() {
    let (_tmp, store) = open_store().await;
    let a = store.insert_log(&record(None, None, None)).await.unwrap();
    let b = store.insert_log(&record(None, None, None)).await.unwrap();
    let c = store
        .insert_entry(&record(None, None, None), &[])
        .await
        .unwrap();
    assert!(a < b && b < c);
}

#[tokio::test]
async fn test_bodies_stored_in_declaration_order() {
    let (_tmp, store) = open_store().await;
    ingest_text(&store, Rules::terraform(), SAMPLE).await.unwrap();

    let filters = SearchFilters {
        level: Some(Level::Debug),
        ..Default::default()
    };
    let rows = store.search(&filters).await.unwrap();
    assert_eq!(rows.len(), 1);

    let bodies = store.get_json_bodies_for_log(rows[0].id).await.unwrap();
    let types: Vec<&str> = bodies.iter().map(|b| b.body_type.as_str()).collect();
    assert_eq!(types, vec!["tf_http_req_body", "tf_http_res_body"]);
    assert_eq!(bodies[0].body_json, r#"{"Bucket":"bucket"}"#);
}

#[tokio::test]
async fn test_insert_json_body_and_detail() {
    let (_tmp, store) = open_store().await;
    let id = store.insert_log(&record(None, None, None)).await.unwrap();
    store
        .insert_json_body(id, "response_body", "plain text")
        .await
        .unwrap();

    let detail = get_log_detail(&store, id).await.unwrap();
    assert_eq!(detail.record.id, id);
    assert_eq!(detail.bodies.len(), 1);
    assert_eq!(detail.bodies[0].body_json, "plain text");

    assert!(get_log_detail(&store, id + 100).await.is_err());
}

#[tokio::test]
async fn test_insert_entry_is_atomic_with_bodies() {
    let (_tmp, store) = open_store().await;
    let bodies = vec![
        NewJsonBody {
            body_type: "request_body".to_string(),
            body_json: "{}".to_string(),
        },
        NewJsonBody {
            body_type: "response_body".to_string(),
            body_json: "[]".to_string(),
        },
    ];
    let id = store
        .insert_entry(&record(None, None, None), &bodies)
        .await
        .unwrap();
    assert_eq!(store.get_json_bodies_for_log(id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_mark_read() {
    let (_tmp, store) = open_store().await;
    let mut ids = Vec::new();
    for _ in 0..6 {
        ids.push(store.insert_log(&record(None, None, None)).await.unwrap());
    }

    store.mark_read(&[]).await.unwrap();
    assert_eq!(store.count_unread().await.unwrap(), 6);

    store.mark_read(&[ids[4]]).await.unwrap();
    for id in &ids {
        let row = store.get_log(*id).await.unwrap().unwrap();
        assert_eq!(row.read_flag, *id == ids[4], "unexpected flag on {}", id);
    }

    // Marking again keeps it read.
    store.mark_read(&[ids[4]]).await.unwrap();
    assert!(store.get_log(ids[4]).await.unwrap().unwrap().read_flag);

    let unread = store
        .search(&SearchFilters {
            unread_only: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(unread.len(), 5);
    assert!(unread.iter().all(|r| !r.read_flag));
}

#[tokio::test]
async fn test_search_order_and_limit() {
    let (_tmp, store) = open_store().await;
    store
        .insert_log(&record(Some("2024-01-01 10:00:00"), None, None))
        .await
        .unwrap();
    store.insert_log(&record(None, None, None)).await.unwrap();
    store
        .insert_log(&record(Some("2024-01-03 10:00:00"), None, None))
        .await
        .unwrap();
    store
        .insert_log(&record(Some("2024-01-02 10:00:00"), None, None))
        .await
        .unwrap();

    let rows = store.search(&SearchFilters::default()).await.unwrap();
    let ts: Vec<Option<&str>> = rows.iter().map(|r| r.ts.as_deref()).collect();
    assert_eq!(
        ts,
        vec![
            Some("2024-01-03 10:00:00"),
            Some("2024-01-02 10:00:00"),
            Some("2024-01-01 10:00:00"),
            None
        ]
    );

    let limited = store
        .search(&SearchFilters {
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);

    let negative = store
        .search(&SearchFilters {
            limit: Some(-1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(negative.len(), 1);
    assert_eq!(negative[0].ts.as_deref(), Some("2024-01-03 10:00:00"));
}

#[tokio::test]
async fn test_lone_carriage_returns_split_lines() {
    let (_tmp, store) = open_store().await;
    let text = "line one\rline two\r\nline three\u{2028}line four";
    let inserted = ingest_text(&store, Rules::terraform(), text).await.unwrap();
    assert_eq!(inserted, 4);
    assert_eq!(store.count_logs().await.unwrap(), 4);
}

#[tokio::test]
async fn test_search_filters() {
    let (_tmp, store) = open_store().await;
    ingest_text(&store, Rules::terraform(), SAMPLE).await.unwrap();

    let by_req = store
        .search(&SearchFilters {
            tf_req_id: Some("abc-1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_req.len(), 2);

    let by_resource = store
        .search(&SearchFilters {
            resource: Some("S3_BUCK".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_resource.len(), 1);

    let by_text = store
        .search(&SearchFilters {
            q: Some("vpc-1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].section, Some(Section::Refresh));

    let by_range = store
        .search(&SearchFilters {
            ts_from: Some("2024-01-01T00:00:01.000Z".to_string()),
            ts_to: Some("2024-01-01T00:00:02.000Z".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_range.len(), 2);

    let combined = store
        .search(&SearchFilters {
            tf_req_id: Some("abc-1".to_string()),
            level: Some(Level::Warning),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(combined.len(), 1);

    let wildcard = store
        .search(&SearchFilters {
            q: Some("%".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(wildcard.is_empty());
}

#[tokio::test]
async fn test_sections_summary() {
    let (_tmp, store) = open_store().await;
    store
        .insert_log(&record(Some("2024-01-01 00:00:05"), None, Some(Section::Apply)))
        .await
        .unwrap();
    store
        .insert_log(&record(Some("2024-01-01 00:00:09"), None, Some(Section::Apply)))
        .await
        .unwrap();
    store
        .insert_log(&record(Some("2024-01-01 00:00:01"), None, Some(Section::Plan)))
        .await
        .unwrap();
    store
        .insert_log(&record(Some("2024-01-01 00:00:00"), None, None))
        .await
        .unwrap();

    let summary = store.get_sections_summary().await.unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].section, Section::Plan);
    assert_eq!(summary[0].count, 1);
    assert_eq!(summary[1].section, Section::Apply);
    assert_eq!(summary[1].count, 2);
    assert_eq!(summary[1].start_time.as_deref(), Some("2024-01-01 00:00:05"));
    assert_eq!(summary[1].end_time.as_deref(), Some("2024-01-01 00:00:09"));
}

#[tokio::test]
async fn test_level_counts() {
    let (_tmp, store) = open_store().await;
    for level in [Some(Level::Error), Some(Level::Error), None] {
        store.insert_log(&record(None, level, None)).await.unwrap();
    }
    let counts = store.level_counts().await.unwrap();
    assert_eq!(counts[0].level, Some(Level::Error));
    assert_eq!(counts[0].count, 2);
    assert_eq!(counts[1].level, None);
    assert_eq!(counts[1].count, 1);
}

#[tokio::test]
async fn test_export_jsonl() {
    let (_tmp, store) = open_store().await;
    ingest_text(&store, Rules::terraform(), SAMPLE).await.unwrap();

    let mut out = Vec::new();
    let filters = SearchFilters {
        tf_req_id: Some("abc-1".to_string()),
        ..Default::default()
    };
    let written = export_jsonl(&store, &filters, &mut out).await.unwrap();
    assert_eq!(written, 2);

    let text = String::from_utf8(out).unwrap();
    for line in text.lines() {
        let value: Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["tf_req_id"], "abc-1");
    }
}

#[tokio::test]
async fn test_concurrent_ingest() {
    let (_tmp, store) = open_store().await;
    let store = Arc::new(store);

    let mut handles = Vec::new();
    for worker in 0..4 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let lines: Vec<String> = (0..25)
                .map(|i| {
                    format!(
                        r#"{{"@message":"worker {} line {}","tf_http_req_body":"{{\"n\":{}}}"}}"#,
                        worker, i, i
                    )
                })
                .collect();
            ingest_lines(store.as_ref(), Rules::terraform(), &lines)
                .await
                .unwrap()
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap();
    }
    assert_eq!(total, 100);
    assert_eq!(store.count_logs().await.unwrap(), 100);

    let rows = store
        .search(&SearchFilters {
            limit: Some(1000),
            ..Default::default()
        })
        .await
        .unwrap();
    for row in rows {
        assert_eq!(store.get_json_bodies_for_log(row.id).await.unwrap().len(), 1);
    }
}
