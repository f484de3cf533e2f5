use chrono::NaiveDate;
use mockito::{Matcher, Server, ServerGuard};
use tracker_report::config::{Credentials, ReportConfig, Settings};
use tracker_report::publish::DryRunSink;
use tracker_report::report::Cell;
use tracker_report::rules::Rule;
use tracker_report::{run, ReportError, RunOutcome};

fn settings_for(server: &ServerGuard) -> Settings {
    let report: ReportConfig = serde_json::from_value(serde_json::json!({
        "sharedPercentage": 0.95,
        "filterId": 42,
        "team": ["jdoe"],
        "trackerUrl": server.url(),
        "rowCapacity": 10,
    }))
    .expect("report config");
    let credentials = Credentials {
        user_name: Some("jdoe".to_string()),
        password: Some("secret".to_string()),
    };
    Settings::new(report, credentials).expect("settings")
}

fn run_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 5, 20).expect("valid date")
}

async fn mock_filter(server: &mut ServerGuard) -> mockito::Mock {
    let body = format!(
        r#"{{"id": "42", "name": "Sprint", "searchUrl": "{}/rest/api/2/search?jql=filter%3D42"}}"#,
        server.url()
    );
    server
        .mock("GET", "/rest/api/2/filter/42")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

const SEARCH_PAGE: &str = r#"{
    "startAt": 0,
    "maxResults": 100,
    "total": 2,
    "issues": [
        {
            "id": "10",
            "key": "PRJ-1",
            "fields": {
                "summary": "Checkout flow",
                "status": {"name": "In progress"},
                "assignee": {"name": "jdoe", "displayName": "Jane Doe"},
                "project": {"name": "Shop"},
                "issuetype": {"name": "Story"},
                "created": "2019-04-01T09:00:00.000+0200",
                "updated": "2019-05-15T09:00:00.000+0200",
                "fixVersions": [{"name": "1.0"}],
                "timeoriginalestimate": 36000,
                "timeestimate": 7200,
                "timespent": 3600
            }
        },
        {
            "id": "20",
            "key": "PRJ-2",
            "fields": {
                "summary": "Payment form",
                "status": {"name": "Closed"},
                "project": {"name": "Shop"},
                "issuetype": {"name": "Sub-task"},
                "created": "2019-04-02T09:00:00.000+0200",
                "updated": "2019-05-16T09:00:00.000+0200",
                "resolutiondate": "2019-05-16T09:00:00.000+0200",
                "fixVersions": [{"name": "1.0"}],
                "parent": {"id": "10", "key": "PRJ-1", "fields": {"summary": "Checkout flow"}},
                "timeoriginalestimate": 3600,
                "timeestimate": 0,
                "timespent": 0
            }
        }
    ]
}"#;

async fn mock_search(server: &mut ServerGuard, body: &str) -> mockito::Mock {
    server
        .mock("GET", Matcher::Regex(r"^/rest/api/2/search".to_string()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

async fn mock_worklogs(server: &mut ServerGuard, issue_id: &str, body: &str) -> mockito::Mock {
    server
        .mock("GET", format!("/rest/api/2/issue/{}/worklog", issue_id).as_str())
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn run_publishes_all_three_tables_and_the_stamp() {
    let mut server = Server::new_async().await;
    let _filter = mock_filter(&mut server).await;
    let _search = mock_search(&mut server, SEARCH_PAGE).await;
    let parent_logs = mock_worklogs(
        &mut server,
        "10",
        r#"{"total": 1, "worklogs": [{
            "id": "100",
            "author": {"name": "jdoe", "displayName": "Jane Doe"},
            "comment": "wiring",
            "started": "2019-05-02T10:00:00.000+0200",
            "timeSpentSeconds": 3600
        }]}"#,
    )
    .await;
    let child_logs = mock_worklogs(&mut server, "20", r#"{"total": 0, "worklogs": []}"#).await;

    let settings = settings_for(&server);
    let mut sink = DryRunSink::default();
    let outcome = run(&settings, &mut sink, run_day()).await.expect("run succeeds");

    assert_eq!(
        outcome,
        RunOutcome::Published {
            issues: 2,
            worklog_rows: 1,
            violations: 2,
        }
    );
    parent_logs.assert_async().await;
    child_logs.assert_async().await;

    let detail = sink.rows("JIRADATA").expect("detail tab written");
    assert_eq!(detail.len(), 10);
    assert_eq!(sink.data_rows("JIRADATA"), 1);
    assert_eq!(detail[0][2], Cell::from("PRJ-1"));
    assert_eq!(detail[0][7], Cell::from("02/05/2019"));
    assert_eq!(detail[0][11], Cell::from("No"));
    assert_eq!(detail[0][12], Cell::from("Yes"));

    assert_eq!(sink.data_rows("TASKSDATA"), 2);
    let summary = sink.rows("TASKSDATA").expect("summary tab written");
    assert_eq!(summary[1][2], Cell::from("Unassigned"));
    assert_eq!(summary[1][11], Cell::from("2019/05"));
    assert_eq!(summary[1][13], Cell::from("Checkout flow"));

    let errors = sink.rows("Errores").expect("error tab written");
    let titles: Vec<&str> = errors
        .iter()
        .filter_map(|row| row.first().and_then(Cell::as_text))
        .filter(|text| text.starts_with("** "))
        .collect();
    assert_eq!(
        titles,
        vec![Rule::ClosedWithoutSpent.title(), Rule::ParentWithSpent.title()]
    );

    assert_eq!(sink.cell("Índice", "E4"), Some("20/May/2019 (jdoe)"));
    assert!(sink.finished());
}

#[tokio::test]
async fn rejected_filter_stops_without_publishing() {
    let mut server = Server::new_async().await;
    let _filter = server
        .mock("GET", "/rest/api/2/filter/42")
        .with_status(400)
        .with_body(r#"{"errorMessages": ["The filter does not exist"]}"#)
        .create_async()
        .await;

    let settings = settings_for(&server);
    let mut sink = DryRunSink::default();
    let outcome = run(&settings, &mut sink, run_day()).await.expect("rejection is not fatal");

    assert_eq!(outcome, RunOutcome::NoIssues);
    assert!(sink.rows("JIRADATA").is_none());
    assert!(!sink.finished());
}

#[tokio::test]
async fn empty_filter_publishes_nothing() {
    let mut server = Server::new_async().await;
    let _filter = mock_filter(&mut server).await;
    let _search = mock_search(&mut server, "").await;

    let settings = settings_for(&server);
    let mut sink = DryRunSink::default();
    let outcome = run(&settings, &mut sink, run_day()).await.expect("empty run");

    assert_eq!(outcome, RunOutcome::NoIssues);
    assert!(sink.rows("TASKSDATA").is_none());
}

#[tokio::test]
async fn failing_worklog_request_aborts_the_run() {
    let mut server = Server::new_async().await;
    let _filter = mock_filter(&mut server).await;
    let _search = mock_search(&mut server, SEARCH_PAGE).await;
    let _logs = server
        .mock("GET", "/rest/api/2/issue/10/worklog")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let settings = settings_for(&server);
    let mut sink = DryRunSink::default();
    let err = run(&settings, &mut sink, run_day())
        .await
        .expect_err("worklog failure is fatal");

    assert!(matches!(err, ReportError::Tracker(_)));
    assert!(sink.rows("JIRADATA").is_none());
}
