mod helpers;

use std::collections::HashSet;

use helpers::{chain, dead_chain, meta, sink, temp_store, write_document, ScriptedProvider};

use daybook::companion::{CompanionChain, FALLBACK_REPLY};
use daybook::journal::store::SUMMARY_MAX_CHARS;
use daybook::journal::types::{Exchange, JournalError};

const DAY: &str = "2026-02-03";

#[tokio::test]
async fn first_append_creates_the_day_document() {
    let (dir, store) = temp_store();
    let companion = chain(ScriptedProvider::replying("That sounds like progress."));

    let receipt = store
        .append_exchange_at(DAY, "went for a walk", &companion, &sink())
        .await
        .unwrap();

    assert_eq!(receipt.id, DAY);
    assert_eq!(receipt.user, "went for a walk");
    assert_eq!(receipt.agent, "That sounds like progress.");
    assert!(dir.path().join("2026-02-03.md").exists());

    let entry = store.entry_by_id(DAY).unwrap();
    assert_eq!(entry.date.as_deref(), Some(DAY));
    assert_eq!(entry.summary, "That sounds like progress.");
    let exchanges = Exchange::parse_blocks(&entry.body);
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].user, "went for a walk");
}

#[tokio::test]
async fn second_append_preserves_the_first_exchange() {
    let (_dir, store) = temp_store();
    let s = sink();

    let first = chain(ScriptedProvider::replying("first reply"));
    store
        .append_exchange_at(DAY, "first message", &first, &s)
        .await
        .unwrap();

    let second = chain(ScriptedProvider::replying("second reply"));
    store
        .append_exchange_at(DAY, "second message", &second, &s)
        .await
        .unwrap();

    let entry = store.entry_by_id(DAY).unwrap();
    let exchanges = Exchange::parse_blocks(&entry.body);
    assert_eq!(exchanges.len(), 2);
    assert_eq!(exchanges[0].user, "first message");
    assert_eq!(exchanges[0].agent, "first reply");
    assert_eq!(exchanges[1].user, "second message");

    // Summary always tracks the latest reply.
    assert_eq!(entry.summary, "second reply");
}

#[tokio::test]
async fn suggested_tags_merge_without_duplicates() {
    let (dir, store) = temp_store();
    write_document(
        dir.path(),
        DAY,
        &meta(Some(DAY), &["mood"], ""),
        "# Entry\n",
    );

    let companion = chain(ScriptedProvider::new(
        "noted",
        "Fatigue, fatigue, mood",
        "none",
    ));
    store
        .append_exchange_at(DAY, "so tired today", &companion, &sink())
        .await
        .unwrap();

    let entry = store.entry_by_id(DAY).unwrap();
    let tags: HashSet<&str> = entry.tags.iter().map(|t| t.as_str()).collect();
    assert_eq!(tags, HashSet::from(["mood", "fatigue"]));
}

#[tokio::test]
async fn weather_is_never_overwritten() {
    let (_dir, store) = temp_store();
    let s = sink();

    let morning = chain(ScriptedProvider::new("ok", "none", "cold and clear"));
    store
        .append_exchange_at(DAY, "chilly walk", &morning, &s)
        .await
        .unwrap();

    let evening = chain(ScriptedProvider::new("ok", "none", "raining hard"));
    store
        .append_exchange_at(DAY, "it started raining", &evening, &s)
        .await
        .unwrap();

    let entry = store.entry_by_id(DAY).unwrap();
    assert_eq!(entry.weather.as_deref(), Some("cold and clear"));
}

#[tokio::test]
async fn unknown_metadata_fields_survive_appends() {
    let (dir, store) = temp_store();
    let mut m = meta(Some(DAY), &[], "");
    m.insert(
        "mood_score".into(),
        serde_yaml::Value::Number(7.into()),
    );
    m.insert(
        "medication".into(),
        serde_yaml::Value::String("morning dose taken".into()),
    );
    write_document(dir.path(), DAY, &m, "# Entry\n");

    let companion = chain(ScriptedProvider::replying("noted"));
    store
        .append_exchange_at(DAY, "checking in", &companion, &sink())
        .await
        .unwrap();

    let entry = store.entry_by_id(DAY).unwrap();
    assert_eq!(
        entry.extra.get("mood_score"),
        Some(&serde_yaml::Value::Number(7.into()))
    );
    assert_eq!(
        entry.extra.get("medication"),
        Some(&serde_yaml::Value::String("morning dose taken".into()))
    );
}

#[tokio::test]
async fn summary_is_truncated_to_the_cap() {
    let (_dir, store) = temp_store();
    let long_reply = "y".repeat(400);
    let companion = chain(ScriptedProvider::replying(&long_reply));

    store
        .append_exchange_at(DAY, "long day", &companion, &sink())
        .await
        .unwrap();

    let entry = store.entry_by_id(DAY).unwrap();
    assert_eq!(entry.summary.chars().count(), SUMMARY_MAX_CHARS);
    // The body keeps the full reply; only the summary is cut.
    assert!(entry.body.contains(&long_reply));
}

#[tokio::test]
async fn empty_and_whitespace_messages_are_rejected() {
    let (_dir, store) = temp_store();
    let companion = chain(ScriptedProvider::replying("unused"));

    let err = store
        .append_exchange_at(DAY, "   ", &companion, &sink())
        .await
        .unwrap_err();
    assert!(matches!(err, JournalError::EmptyMessage));
}

#[tokio::test]
async fn dead_backends_still_persist_the_entry() {
    let (_dir, store) = temp_store();

    let receipt = store
        .append_exchange_at(DAY, "ok", &dead_chain(), &sink())
        .await
        .unwrap();

    assert_eq!(receipt.agent, FALLBACK_REPLY);
    let entry = store.entry_by_id(DAY).unwrap();
    assert!(entry.body.contains("**You:** ok"));
    assert_eq!(entry.summary, daybook::journal::store::truncate_summary(FALLBACK_REPLY));
    // No backend answered, so no tags and no weather were invented.
    assert!(entry.tags.is_empty());
    assert!(entry.weather.is_none());
}

#[tokio::test]
async fn chain_falls_through_to_a_working_backend() {
    let (_dir, store) = temp_store();
    let companion = CompanionChain::new(vec![
        Box::new(helpers::FailingProvider),
        Box::new(ScriptedProvider::replying("backup answered")),
    ]);

    let receipt = store
        .append_exchange_at(DAY, "hello", &companion, &sink())
        .await
        .unwrap();
    assert_eq!(receipt.agent, "backup answered");
}

#[tokio::test]
async fn malformed_existing_document_is_rescued_not_lost() {
    let (dir, store) = temp_store();
    let malformed = "---\ndate: [unclosed\n---\nprecious old words\n";
    std::fs::write(dir.path().join("2026-02-03.md"), malformed).unwrap();

    let companion = chain(ScriptedProvider::replying("starting fresh"));
    store
        .append_exchange_at(DAY, "new message", &companion, &sink())
        .await
        .unwrap();

    // The unparsable original is preserved byte-for-byte in a sidecar.
    let rescued =
        std::fs::read_to_string(dir.path().join("2026-02-03.md.unparsed")).unwrap();
    assert_eq!(rescued, malformed);

    // The rewritten document starts from the clean template.
    let entry = store.entry_by_id(DAY).unwrap();
    let exchanges = Exchange::parse_blocks(&entry.body);
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].user, "new message");

    // Listings see exactly one document for the day.
    assert_eq!(store.list_entries().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_same_day_appends_both_land() {
    let (_dir, store) = temp_store();
    let store = std::sync::Arc::new(store);
    let s = sink();

    let a = {
        let store = store.clone();
        let s = s.clone();
        tokio::spawn(async move {
            let companion = chain(ScriptedProvider::replying("reply a"));
            store
                .append_exchange_at(DAY, "message a", &companion, &s)
                .await
        })
    };
    let b = {
        let store = store.clone();
        let s = s.clone();
        tokio::spawn(async move {
            let companion = chain(ScriptedProvider::replying("reply b"));
            store
                .append_exchange_at(DAY, "message b", &companion, &s)
                .await
        })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let entry = store.entry_by_id(DAY).unwrap();
    let exchanges = Exchange::parse_blocks(&entry.body);
    assert_eq!(exchanges.len(), 2);
    let users: HashSet<String> = exchanges.into_iter().map(|e| e.user).collect();
    assert_eq!(
        users,
        HashSet::from(["message a".to_string(), "message b".to_string()])
    );
}
