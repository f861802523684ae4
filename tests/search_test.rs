mod helpers;

use helpers::{meta, temp_store, write_document};

use daybook::journal::search::{search, SearchQuery};

fn seed(dir: &std::path::Path) {
    write_document(
        dir,
        "2026-01-01",
        &meta(Some("2026-01-01"), &["mood", "sleep"], "restless night"),
        "# Entry\n\n**You:** barely slept, too much coffee\n\n**Agent:** Caffeine late in the day can do that.\n",
    );
    write_document(
        dir,
        "2026-01-02",
        &meta(Some("2026-01-02"), &["mood"], "better spirits"),
        "# Entry\n\n**You:** long walk in the park\n\n**Agent:** Movement seems to help you.\n",
    );
    write_document(
        dir,
        "2026-01-03",
        &meta(Some("2026-01-03"), &["fatigue"], "tired again"),
        "# Entry\n\n**You:** heavy legs all afternoon\n\n**Agent:** Worth tracking alongside sleep.\n",
    );
}

#[test]
fn empty_query_returns_every_parseable_entry() {
    let (dir, store) = temp_store();
    seed(dir.path());
    std::fs::write(dir.path().join("broken.md"), "---\n[bad\n---\n").unwrap();

    let hits = search(&store, &SearchQuery::default()).unwrap();
    assert_eq!(hits.len(), 3);
    // Date descending.
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["2026-01-03", "2026-01-02", "2026-01-01"]);
}

#[test]
fn query_is_case_insensitive_over_body_and_summary() {
    let (dir, store) = temp_store();
    seed(dir.path());

    let by_body = search(
        &store,
        &SearchQuery {
            query: "COFFEE".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(by_body.len(), 1);
    assert_eq!(by_body[0].id, "2026-01-01");

    let by_summary = search(
        &store,
        &SearchQuery {
            query: "spirits".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(by_summary.len(), 1);
    assert_eq!(by_summary[0].id, "2026-01-02");
}

#[test]
fn all_requested_tags_must_match() {
    let (dir, store) = temp_store();
    seed(dir.path());

    let one_tag = search(
        &store,
        &SearchQuery {
            tags: vec!["mood".into()],
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(one_tag.len(), 2);

    let both_tags = search(
        &store,
        &SearchQuery {
            tags: vec!["mood".into(), "sleep".into()],
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(both_tags.len(), 1);
    assert_eq!(both_tags[0].id, "2026-01-01");

    let no_match = search(
        &store,
        &SearchQuery {
            tags: vec!["mood".into(), "fatigue".into()],
            ..Default::default()
        },
    )
    .unwrap();
    assert!(no_match.is_empty());
}

#[test]
fn tag_filter_ignores_case() {
    let (dir, store) = temp_store();
    seed(dir.path());

    let hits = search(
        &store,
        &SearchQuery {
            tags: vec!["MOOD".into()],
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn date_range_is_inclusive_on_both_ends() {
    let (dir, store) = temp_store();
    seed(dir.path());

    let hits = search(
        &store,
        &SearchQuery {
            date_from: Some("2026-01-02".into()),
            date_to: Some("2026-01-03".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["2026-01-03", "2026-01-02"]);

    let open_ended = search(
        &store,
        &SearchQuery {
            date_from: Some("2026-01-03".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(open_ended.len(), 1);
    assert_eq!(open_ended[0].id, "2026-01-03");
}

#[test]
fn undated_entries_are_excluded_by_date_bounds() {
    let (dir, store) = temp_store();
    write_document(dir.path(), "undated", &meta(None, &[], ""), "timeless\n");

    let unbounded = search(&store, &SearchQuery::default()).unwrap();
    assert_eq!(unbounded.len(), 1);

    let bounded = search(
        &store,
        &SearchQuery {
            date_from: Some("2020-01-01".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(bounded.is_empty());
}

#[test]
fn excerpt_surrounds_the_first_match() {
    let (dir, store) = temp_store();
    seed(dir.path());

    let hits = search(
        &store,
        &SearchQuery {
            query: "heavy legs".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].excerpt.to_lowercase().contains("heavy legs"));
}

#[test]
fn combined_filters_intersect() {
    let (dir, store) = temp_store();
    seed(dir.path());

    let hits = search(
        &store,
        &SearchQuery {
            query: "walk".into(),
            tags: vec!["mood".into()],
            date_from: Some("2026-01-02".into()),
            date_to: Some("2026-01-02".into()),
        },
    )
    .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "2026-01-02");
}
