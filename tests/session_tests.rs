use std::io::Write;
use tempfile::NamedTempFile;

use tabview::config::Config;
use tabview::error::SessionError;
use tabview::session::Session;

fn fixture(extension: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn people_csv() -> NamedTempFile {
    fixture(
        ".csv",
        "name,age\nalice,30\nbob,10\nalan,20\ncarol,5\n",
    )
}

#[tokio::test]
async fn test_load_gives_identity_view() {
    let file = people_csv();
    let mut session = Session::new(Config::default());

    let view = session.load(file.path()).await.unwrap();
    assert_eq!(view.row_count(), 4);
    assert_eq!(view.headers(), &["name", "age"]);
    assert_eq!(view.sort_state(), None);
    assert_eq!(view.filter_term(), "");
}

#[tokio::test]
async fn test_filter_reports_visible_count() {
    let file = people_csv();
    let mut session = Session::new(Config::default());
    session.load(file.path()).await.unwrap();

    assert_eq!(session.filter_change("al").unwrap(), 2);
    assert_eq!(session.filter_change("").unwrap(), 4);
}

#[tokio::test]
async fn test_export_csv_reflects_filtered_sorted_view() {
    let file = people_csv();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");

    let mut session = Session::new(Config::default());
    session.load(file.path()).await.unwrap();
    session.filter_change("al").unwrap();
    session.sort_click(1).unwrap(); // numeric ascending by age

    let message = session.export_csv(&out).await.unwrap();
    assert!(message.contains("2 rows"));

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, "name,age\nalan,20\nalice,30\n");
}

#[tokio::test]
async fn test_export_json_reflects_view() {
    let file = people_csv();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.json");

    let mut session = Session::new(Config::default());
    session.load(file.path()).await.unwrap();
    session.sort_click(1).unwrap();
    session.sort_click(1).unwrap(); // descending

    session.export_json(&out).await.unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["name"], "alice");
    assert_eq!(rows[0]["age"], "30"); // cells stay strings on export
    assert_eq!(rows[3]["name"], "carol");
}

#[tokio::test]
async fn test_new_load_resets_filter_and_sort() {
    let first = people_csv();
    let second = fixture(".csv", "x\n1\n2\n");

    let mut session = Session::new(Config::default());
    session.load(first.path()).await.unwrap();
    session.filter_change("al").unwrap();
    session.sort_click(0).unwrap();

    let view = session.load(second.path()).await.unwrap();
    assert_eq!(view.headers(), &["x"]);
    assert_eq!(view.row_count(), 2);
    assert_eq!(view.sort_state(), None);
    assert_eq!(view.filter_term(), "");
}

#[tokio::test]
async fn test_failed_load_keeps_previous_table() {
    let good = people_csv();
    let bad = fixture(".xlsx", "not supported");

    let mut session = Session::new(Config::default());
    session.load(good.path()).await.unwrap();
    session.filter_change("al").unwrap();

    let err = session.load(bad.path()).await.unwrap_err();
    assert!(matches!(err, SessionError::Load(_)));

    // Previous table, filter and counts are untouched
    let view = session.view().unwrap();
    assert_eq!(view.headers(), &["name", "age"]);
    assert_eq!(view.row_count(), 2);
}

#[tokio::test]
async fn test_failed_export_keeps_view_usable() {
    let file = people_csv();
    let mut session = Session::new(Config::default());
    session.load(file.path()).await.unwrap();

    let err = session
        .export_csv("/nonexistent-dir/out.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Export(_)));

    assert_eq!(session.view().unwrap().row_count(), 4);
    assert_eq!(session.filter_change("bob").unwrap(), 1);
}

#[tokio::test]
async fn test_handlers_require_a_table() {
    let mut session = Session::new(Config::default());

    assert!(matches!(
        session.filter_change("x"),
        Err(SessionError::NoTable)
    ));
    assert!(matches!(session.sort_click(0), Err(SessionError::NoTable)));
    assert!(matches!(session.clear_sort(), Err(SessionError::NoTable)));
    assert!(matches!(
        session.export_csv("out.csv").await,
        Err(SessionError::NoTable)
    ));
}

#[tokio::test]
async fn test_sort_click_out_of_bounds() {
    let file = people_csv();
    let mut session = Session::new(Config::default());
    session.load(file.path()).await.unwrap();

    let err = session.sort_click(9).unwrap_err();
    assert!(matches!(err, SessionError::ColumnOutOfBounds(9)));
    // The view keeps its previous ordering
    assert_eq!(session.view().unwrap().sort_state(), None);
}
