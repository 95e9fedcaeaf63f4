//! End-to-end tests of the suggestion engine over the real stores.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use mailsuggest_core::{
    Action, Query, RecipientKind, RecipientRecord, RecipientStore, Response, SqliteHistoryStore,
    SuggestionEngine, XmlHistoryStore, handle_actions,
};

const HISTORY: &str = r"<recipients>
    <recipient>
        <name>Bob Jones</name>
        <email>bob@x.com</email>
        <count>5</count>
        <last_used>1700000000</last_used>
        <objecttype>6</objecttype>
    </recipient>
    <recipient>
        <name>Alice Bobcat</name>
        <email>alice@x.com</email>
        <count>1</count>
        <last_used>1690000000</last_used>
    </recipient>
    <recipient>
        <name>Bobsled Team</name>
        <email>team@x.com</email>
        <count>3</count>
        <objecttype>8</objecttype>
    </recipient>
    <recipient>
        <name>Missing Address</name>
    </recipient>
</recipients>";

fn labels(engine_output: &[mailsuggest_core::Suggestion]) -> Vec<&str> {
    engine_output
        .iter()
        .map(|s| s.display_label.as_str())
        .collect()
}

#[tokio::test]
async fn test_xml_history_suggestions() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("history.xml");
    std::fs::write(&path, HISTORY).unwrap();

    let engine = SuggestionEngine::new(XmlHistoryStore::new(&path));
    let suggestions = engine.suggest(&Query::new("bob")).await;

    assert_eq!(
        labels(&suggestions),
        vec![
            "Alice Bobcat <alice@x.com>",
            "Bob Jones <bob@x.com>",
            "[Bobsled Team]",
        ]
    );
}

#[tokio::test]
async fn test_windows_1252_history_suggestions() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("history.xml");
    let xml: &[u8] = b"<recipients>\
        <recipient><name>J\xFCrgen M\xFCller</name><email>jm@x.com</email><count>2</count></recipient>\
        <recipient><name>Bob Jones</name><email>bob@x.com</email></recipient>\
        </recipients>";
    std::fs::write(&path, xml).unwrap();

    let engine = SuggestionEngine::new(XmlHistoryStore::new(&path));
    let suggestions = engine.suggest(&Query::new("m\u{fc}l")).await;
    assert_eq!(labels(&suggestions), vec!["J\u{fc}rgen M\u{fc}ller <jm@x.com>"]);

    // The rest of the history stays usable and survives a write
    engine
        .record("", "bob@x.com", RecipientKind::Person)
        .await
        .unwrap();
    let history = engine.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].name, "J\u{fc}rgen M\u{fc}ller");
    assert_eq!(history[1].use_count, 1);
}

#[tokio::test]
async fn test_corrupt_xml_history_gives_no_suggestions() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("history.xml");
    std::fs::write(&path, "<recipients><recipient><name>Bob").unwrap();

    let engine = SuggestionEngine::new(XmlHistoryStore::new(&path));
    assert!(engine.suggest(&Query::new("bob")).await.is_empty());

    // Deletion must not overwrite a history it could not read
    let emails: HashSet<String> = ["bob@x.com".to_string()].into();
    assert!(engine.delete_and_save(&emails).await.is_err());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "<recipients><recipient><name>Bob"
    );
}

#[tokio::test]
async fn test_xml_delete_persists() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("history.xml");
    std::fs::write(&path, HISTORY).unwrap();

    let engine = SuggestionEngine::new(XmlHistoryStore::new(&path));
    let responses = handle_actions(
        &engine,
        vec![Action::DeleteRecipient {
            addresses: "bob@x.com;TEAM@x.com".into(),
        }],
        10,
    )
    .await;
    assert_eq!(responses, vec![Response::Done]);

    // Case-sensitive: only the exact address is gone
    let reloaded = XmlHistoryStore::new(&path).load().await.unwrap();
    let emails: Vec<_> = reloaded.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, vec!["alice@x.com", "team@x.com"]);
}

#[tokio::test]
async fn test_import_xml_into_sqlite() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("history.xml");
    std::fs::write(&path, HISTORY).unwrap();

    let records = XmlHistoryStore::new(&path).load().await.unwrap();
    let sqlite = SqliteHistoryStore::in_memory().await.unwrap();
    sqlite.save(&records).await.unwrap();

    let engine = SuggestionEngine::new(sqlite);
    let loaded = engine.history().await;
    assert_eq!(loaded, records);
    assert_eq!(loaded[2].kind, RecipientKind::DistributionList);

    let suggestions = engine.suggest(&Query::new("ALICE")).await;
    assert_eq!(labels(&suggestions), vec!["Alice Bobcat <alice@x.com>"]);
}

#[tokio::test]
async fn test_sqlite_record_feeds_suggestions() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("history.db");
    let store = SqliteHistoryStore::new(db.to_str().unwrap()).await.unwrap();

    store
        .record("Jane Roe", "jane@x.com", RecipientKind::Person)
        .await
        .unwrap();

    let engine = SuggestionEngine::new(store);
    // The only match is the full address that was typed
    assert!(engine.suggest(&Query::new("Jane@X.com")).await.is_empty());

    let suggestions = engine.suggest(&Query::new("roe")).await;
    assert_eq!(labels(&suggestions), vec!["Jane Roe <jane@x.com>"]);
}

#[tokio::test]
async fn test_frequency_then_alphabetical() {
    let mut records: Vec<RecipientRecord> = (1..=12)
        .map(|i| RecipientRecord::new(format!("Dev {i}"), format!("dev{i}@x.com")).with_use_count(i))
        .collect();
    records.push(RecipientRecord::new("Undevoted", "u@x.com").with_use_count(1000));

    let sqlite = SqliteHistoryStore::in_memory().await.unwrap();
    sqlite.save(&records).await.unwrap();
    let engine = SuggestionEngine::new(sqlite);

    let suggestions = engine.suggest(&Query::new("dev")).await;
    let names: Vec<_> = suggestions.iter().map(|s| s.name.as_str()).collect();

    // Ten most used boundary matches, shown in natural order; the mid-word match
    // never gets a slot
    assert_eq!(
        names,
        vec![
            "Dev 3", "Dev 4", "Dev 5", "Dev 6", "Dev 7", "Dev 8", "Dev 9", "Dev 10", "Dev 11",
            "Dev 12",
        ]
    );
}
