use std::collections::HashSet;

use book_catalog::{Book, BookField, CatalogError, CatalogStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn book(id: i64, title: &str, author: &str, year: &str) -> Book {
    Book {
        id,
        title: title.to_string(),
        author: author.to_string(),
        year: year.to_string(),
    }
}

fn seeded() -> CatalogStore {
    let store = CatalogStore::open_in_memory().unwrap();
    for (title, author, year) in [
        ("Dune", "Frank Herbert", "1965"),
        ("1984", "George Orwell", "1949"),
        ("Children of Dune", "Frank Herbert", "1976"),
        ("The Left Hand of Darkness", "Ursula K. Le Guin", "1969"),
    ] {
        store.create(title, author, year).unwrap();
    }
    store
}

#[test]
fn reference_scenario() {
    let store = CatalogStore::open_in_memory().unwrap();
    assert_eq!(store.create("Dune", "Frank Herbert", "1965").unwrap(), 1);
    assert_eq!(store.create("1984", "George Orwell", "1949").unwrap(), 2);

    assert_eq!(
        store.search("du").unwrap(),
        vec![book(1, "Dune", "Frank Herbert", "1965")]
    );

    assert!(store.delete_by_id(1).unwrap());
    assert_eq!(
        store.list_all().unwrap(),
        vec![book(2, "1984", "George Orwell", "1949")]
    );
}

#[test]
fn create_adds_exactly_one_matching_record() {
    let store = seeded();
    let before = store.list_all().unwrap();

    let id = store.create("Kindred", "Octavia E. Butler", "1979").unwrap();
    let after = store.list_all().unwrap();

    assert_eq!(after.len(), before.len() + 1);
    assert!(before.iter().all(|b| b.id != id));
    let added: Vec<_> = after.iter().filter(|b| b.id == id).collect();
    assert_eq!(added, vec![&book(id, "Kindred", "Octavia E. Butler", "1979")]);
}

#[test]
fn ids_are_never_reused_after_deletion() {
    let store = seeded();
    let mut issued: HashSet<i64> = store.list_all().unwrap().iter().map(|b| b.id).collect();

    store.delete_by_id(4).unwrap();
    store.delete_by_id(3).unwrap();

    for _ in 0..3 {
        let id = store.create("Again", "Someone", "2024").unwrap();
        assert!(issued.insert(id), "id {id} was issued twice");
    }
}

#[test]
fn create_with_blank_field_leaves_table_unchanged() {
    let store = seeded();
    let count = store.count().unwrap();

    for (title, author, year, field) in [
        ("", "Someone", "2000", BookField::Title),
        ("Title", "", "2000", BookField::Author),
        ("Title", "Someone", "", BookField::Year),
    ] {
        match store.create(title, author, year) {
            Err(CatalogError::Validation { field: reported }) => assert_eq!(reported, field),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    assert_eq!(store.count().unwrap(), count);
}

#[test]
fn search_is_a_case_insensitive_title_filter_of_list_all() {
    let store = seeded();
    let all = store.list_all().unwrap();

    for query in ["", "dune", "DUNE", "e", "of", "herbert", "zzz", "1984"] {
        let expected: Vec<Book> = all
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .collect();
        assert_eq!(store.search(query).unwrap(), expected, "query {query:?}");
    }

    assert_eq!(store.search("").unwrap(), all);
}

#[test]
fn search_sees_writes_made_after_previous_search() {
    let store = seeded();
    assert_eq!(store.search("kindred").unwrap().len(), 0);
    store.create("Kindred", "Octavia E. Butler", "1979").unwrap();
    assert_eq!(store.search("kindred").unwrap().len(), 1);
}

#[test]
fn update_field_changes_only_the_target_cell() {
    let store = seeded();
    let before = store.list_all().unwrap();

    store.update_field(2, BookField::Author, "X").unwrap();

    let after = store.list_all().unwrap();
    let expected: Vec<Book> = before
        .into_iter()
        .map(|mut b| {
            if b.id == 2 {
                b.author = "X".to_string();
            }
            b
        })
        .collect();
    assert_eq!(after, expected);
}

#[test]
fn update_field_reports_missing_ids() {
    let store = seeded();
    match store.update_field(99, BookField::Title, "Ghost") {
        Err(CatalogError::NotFound { id }) => assert_eq!(id, 99),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn update_field_refuses_the_id_column() {
    let store = seeded();
    let before = store.list_all().unwrap();
    assert!(matches!(
        store.update_field(1, BookField::Id, "2"),
        Err(CatalogError::ImmutableField {
            field: BookField::Id
        })
    ));
    assert_eq!(store.list_all().unwrap(), before);
}

#[test]
fn delete_removes_one_record_and_ignores_missing_ids() {
    let store = seeded();
    let before = store.list_all().unwrap();

    assert!(store.delete_by_id(3).unwrap());
    let after = store.list_all().unwrap();
    let expected: Vec<Book> = before.iter().filter(|b| b.id != 3).cloned().collect();
    assert_eq!(after, expected);

    assert!(!store.delete_by_id(3).unwrap());
    assert!(!store.delete_by_id(42).unwrap());
    assert_eq!(store.list_all().unwrap(), expected);
}

#[test]
fn records_survive_reopening_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("books.db");

    {
        let store = CatalogStore::open(&path).unwrap();
        store.create("Dune", "Frank Herbert", "1965").unwrap();
        store.create("1984", "George Orwell", "1949").unwrap();
        store.update_field(2, BookField::Year, "1948/49").unwrap();
    }

    let reopened = CatalogStore::open(&path).unwrap();
    assert_eq!(
        reopened.list_all().unwrap(),
        vec![
            book(1, "Dune", "Frank Herbert", "1965"),
            book(2, "1984", "George Orwell", "1948/49"),
        ]
    );
    assert_eq!(reopened.create("Kindred", "Octavia E. Butler", "1979").unwrap(), 3);
}
