use httpmock::prelude::*;
use tempfile::TempDir;
use yelp_harvest::adapters::ledger::DedupLedger;
use yelp_harvest::adapters::sink::{CsvSink, BACKUP_SNAPSHOT};
use yelp_harvest::{LocationCollector, YelpClient};

fn business_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "rating": 4.5,
        "location": {"city": "Townville", "state": "MD", "display_address": ["1 Main St"]}
    })
}

#[tokio::test]
async fn detail_failure_falls_back_to_the_search_summary() {
    let dir = TempDir::new().unwrap();
    let ledger_path = dir.path().join("restaurants.csv");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/businesses/search")
            .query_param("location", "Townville, MD")
            .query_param("sort_by", "best_match")
            .query_param("offset", "0");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "businesses": [
                    business_json("l1", "Detailed Diner"),
                    business_json("l2", "Summary Shack")
                ],
                "total": 2
            }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/businesses/l1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "id": "l1",
                "name": "Detailed Diner",
                "rating": 4.5,
                "price": "$$",
                "location": {"city": "Townville", "state": "MD", "display_address": ["1 Main St"]}
            }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/businesses/l2");
        then.status(500).body("backend exploded");
    });
    // The second location's search fails outright; the run still finishes.
    server.mock(|when, then| {
        when.method(GET)
            .path("/businesses/search")
            .query_param("location", "Cityburg, MD");
        then.status(503).body("unavailable");
    });

    let client = YelpClient::new("test-key").with_base_url(server.url(""));
    let mut collector = LocationCollector::new(
        &client,
        DedupLedger::load_existing(&ledger_path),
        CsvSink::new(&ledger_path),
        dir.path(),
    );
    let locations = vec!["Townville, MD".to_string(), "Cityburg, MD".to_string()];
    let stats = collector.run(&locations).await.unwrap();

    assert_eq!(stats.businesses_found, 2);
    assert_eq!(stats.new_records, 2);

    let csv_text = std::fs::read_to_string(&ledger_path).unwrap();
    let lines: Vec<_> = csv_text.lines().collect();
    assert_eq!(lines.len(), 3);
    // Detail succeeded for l1, so its row carries the detailed price.
    assert!(lines[1].contains("l1") && lines[1].contains("$$"));
    // l2 fell back to the summary record instead of being dropped.
    assert!(lines[2].contains("l2") && lines[2].contains("Summary Shack"));
    // The tag column is the location string in this mode.
    assert!(lines[1].starts_with("\"Townville, MD\""));

    let backup: Vec<serde_json::Value> = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(BACKUP_SNAPSHOT)).unwrap(),
    )
    .unwrap();
    assert_eq!(backup.len(), 2);
}

#[tokio::test]
async fn businesses_seen_in_one_location_are_not_duplicated_by_the_next() {
    let dir = TempDir::new().unwrap();
    let ledger_path = dir.path().join("restaurants.csv");

    let server = MockServer::start();
    // Both towns return the same business; it must be appended only once.
    for town in ["Townville, MD", "Cityburg, MD"] {
        server.mock(|when, then| {
            when.method(GET)
                .path("/businesses/search")
                .query_param("location", town);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "businesses": [business_json("shared", "Border Cafe")],
                    "total": 1
                }));
        });
    }
    let detail = server.mock(|when, then| {
        when.method(GET).path("/businesses/shared");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(business_json("shared", "Border Cafe"));
    });

    let client = YelpClient::new("test-key").with_base_url(server.url(""));
    let mut collector = LocationCollector::new(
        &client,
        DedupLedger::load_existing(&ledger_path),
        CsvSink::new(&ledger_path),
        dir.path(),
    );
    let locations = vec!["Townville, MD".to_string(), "Cityburg, MD".to_string()];
    let stats = collector.run(&locations).await.unwrap();

    assert_eq!(detail.hits(), 1);
    assert_eq!(stats.new_records, 1);
    assert_eq!(stats.duplicates_skipped, 1);

    let csv_text = std::fs::read_to_string(&ledger_path).unwrap();
    assert_eq!(csv_text.matches("shared").count(), 1);
}

#[tokio::test]
async fn rate_limit_aborts_the_location_run_after_a_snapshot() {
    let dir = TempDir::new().unwrap();
    let ledger_path = dir.path().join("restaurants.csv");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/businesses/search")
            .query_param("location", "Townville, MD");
        then.status(429).body("Too Many Requests");
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/businesses/search")
            .query_param("location", "Cityburg, MD");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"businesses": [], "total": 0}));
    });

    let client = YelpClient::new("test-key").with_base_url(server.url(""));
    let mut collector = LocationCollector::new(
        &client,
        DedupLedger::load_existing(&ledger_path),
        CsvSink::new(&ledger_path),
        dir.path(),
    );
    let locations = vec!["Townville, MD".to_string(), "Cityburg, MD".to_string()];
    let err = collector.run(&locations).await.unwrap_err();

    assert!(err.is_rate_limit());
    assert_eq!(second.hits(), 0);
    assert!(dir.path().join(BACKUP_SNAPSHOT).exists());
}
