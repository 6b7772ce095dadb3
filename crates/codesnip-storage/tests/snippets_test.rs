use codesnip_core::models::snippet::SnippetId;
use codesnip_core::policy::sanitize_snippet;
use codesnip_storage::{StorageError, db, snippets};
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = db::open_in_memory().expect("open in-memory db");
    db::init(&mut conn).expect("init db");
    conn
}

fn id(raw: i64) -> SnippetId {
    SnippetId::new(raw).unwrap()
}

#[test]
fn save_then_get_round_trips_markup() {
    let conn = setup();
    let body = sanitize_snippet("<div>Hi</div>").unwrap();

    let created = snippets::create_snippet(&conn, "Hello", &body).unwrap();
    assert_eq!(created.get(), 1);

    let snippet = snippets::get_snippet(&conn, created).unwrap();
    assert_eq!(snippet.title, "Hello");
    assert_eq!(snippet.slug, "hello");
    assert_eq!(snippet.snippet, "<div>Hi</div>");
    assert!(snippet.status);
}

#[test]
fn duplicate_titles_get_suffixed_slugs() {
    let conn = setup();
    let body = sanitize_snippet("<p>x</p>").unwrap();

    for _ in 0..3 {
        snippets::create_snippet(&conn, "Hero Banner", &body).unwrap();
    }

    let mut slugs: Vec<String> = snippets::list_snippets(&conn)
        .unwrap()
        .into_iter()
        .map(|s| s.slug)
        .collect();
    slugs.sort();
    assert_eq!(slugs, ["hero-banner", "hero-banner-1", "hero-banner-2"]);
}

#[test]
fn list_is_newest_first() {
    let conn = setup();
    let body = sanitize_snippet("<p>x</p>").unwrap();
    for title in ["One", "Two", "Three"] {
        snippets::create_snippet(&conn, title, &body).unwrap();
    }
    conn.execute("UPDATE snippets SET created_at = 100 WHERE id = 3", [])
        .unwrap();

    let ids: Vec<i64> = snippets::list_snippets(&conn)
        .unwrap()
        .iter()
        .map(|s| s.id.get())
        .collect();
    assert_eq!(ids, [2, 1, 3]);
}

#[test]
fn update_keeps_slug_for_unchanged_title() {
    let conn = setup();
    let body = sanitize_snippet("<p>v1</p>").unwrap();
    let created = snippets::create_snippet(&conn, "Card", &body).unwrap();

    let body = sanitize_snippet("<p>v2</p>").unwrap();
    snippets::update_snippet(&conn, created, "Card", &body).unwrap();

    let snippet = snippets::get_snippet(&conn, created).unwrap();
    assert_eq!(snippet.slug, "card");
    assert_eq!(snippet.snippet, "<p>v2</p>");
}

#[test]
fn same_title_update_moves_to_freed_lower_slug() {
    let conn = setup();
    let body = sanitize_snippet("<p>x</p>").unwrap();
    let first = snippets::create_snippet(&conn, "Hello", &body).unwrap();
    let second = snippets::create_snippet(&conn, "Hello", &body).unwrap();
    assert_eq!(snippets::get_snippet(&conn, second).unwrap().slug, "hello-1");

    snippets::delete_snippet(&conn, first).unwrap();
    snippets::update_snippet(&conn, second, "Hello", &body).unwrap();

    assert_eq!(snippets::get_snippet(&conn, second).unwrap().slug, "hello");
}

#[test]
fn update_rederives_slug_from_new_title() {
    let conn = setup();
    let body = sanitize_snippet("<p>x</p>").unwrap();
    snippets::create_snippet(&conn, "Footer Links", &body).unwrap();
    let second = snippets::create_snippet(&conn, "Draft", &body).unwrap();

    snippets::update_snippet(&conn, second, "Footer Links", &body).unwrap();

    assert_eq!(
        snippets::get_snippet(&conn, second).unwrap().slug,
        "footer-links-1"
    );
}

#[test]
fn update_leaves_status_alone() {
    let conn = setup();
    let body = sanitize_snippet("<p>x</p>").unwrap();
    let created = snippets::create_snippet(&conn, "Quiet", &body).unwrap();
    snippets::set_status(&conn, created, false).unwrap();

    snippets::update_snippet(&conn, created, "Quiet", &body).unwrap();

    assert!(!snippets::get_snippet(&conn, created).unwrap().status);
}

#[test]
fn missing_rows_report_not_found() {
    let conn = setup();
    let body = sanitize_snippet("<p>x</p>").unwrap();

    assert!(matches!(
        snippets::get_snippet(&conn, id(42)),
        Err(StorageError::NotFound { id: 42 })
    ));
    assert!(snippets::update_snippet(&conn, id(42), "t", &body)
        .unwrap_err()
        .is_not_found());
    assert!(snippets::set_status(&conn, id(42), true)
        .unwrap_err()
        .is_not_found());
    assert!(snippets::delete_snippet(&conn, id(42))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn delete_then_get_is_not_found_and_ids_are_not_reused() {
    let conn = setup();
    let body = sanitize_snippet("<p>x</p>").unwrap();
    let first = snippets::create_snippet(&conn, "Gone", &body).unwrap();

    snippets::delete_snippet(&conn, first).unwrap();
    assert!(snippets::get_snippet(&conn, first).unwrap_err().is_not_found());

    let next = snippets::create_snippet(&conn, "Gone", &body).unwrap();
    assert_eq!(next.get(), 2);
    // Slug is free again once the row is gone.
    assert_eq!(snippets::get_snippet(&conn, next).unwrap().slug, "gone");
}

#[test]
fn embed_row_reports_markup_and_status() {
    let conn = setup();
    let body = sanitize_snippet("<b>promo</b>").unwrap();
    let created = snippets::create_snippet(&conn, "Promo", &body).unwrap();

    assert_eq!(
        snippets::embed_row(&conn, created.get()).unwrap(),
        Some(("<b>promo</b>".to_string(), true))
    );

    snippets::set_status(&conn, created, false).unwrap();
    assert_eq!(
        snippets::embed_row(&conn, created.get()).unwrap(),
        Some(("<b>promo</b>".to_string(), false))
    );

    assert_eq!(snippets::embed_row(&conn, 0).unwrap(), None);
    assert_eq!(snippets::embed_row(&conn, 99).unwrap(), None);
}

#[test]
fn slug_exists_honours_exclusion() {
    let conn = setup();
    let body = sanitize_snippet("<p>x</p>").unwrap();
    let created = snippets::create_snippet(&conn, "Pricing", &body).unwrap();

    assert!(snippets::slug_exists(&conn, "pricing", None).unwrap());
    assert!(!snippets::slug_exists(&conn, "pricing", Some(created)).unwrap());
    assert!(!snippets::slug_exists(&conn, "other", None).unwrap());
}
