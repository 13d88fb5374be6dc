use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use vizcol_core::db::open_db_in_memory;
use vizcol_core::{
    resolve_tags, CollectionDraft, CollectionRepository, CollectionService,
    CollectionValidationError, NewCollection, RepoError, SqliteCollectionRepository,
};

#[test]
fn add_tag_treats_case_variants_as_same_tag() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        assert!(repo.add_tag("Retro").unwrap());
        assert!(!repo.add_tag("retro").unwrap());
        assert!(!repo.add_tag("  RETRO  ").unwrap());
        assert_eq!(repo.list_tags().unwrap(), vec!["Retro".to_string()]);
    }
    assert_eq!(count_rows(&conn, "tags"), 1);
}

#[test]
fn add_tag_rejects_blank_and_delimited_names() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();

    let blank = repo.add_tag("   ").unwrap_err();
    assert!(matches!(
        blank,
        RepoError::Validation(CollectionValidationError::EmptyTagName)
    ));
    assert!(blank.is_declined());

    let delimited = repo.add_tag("movie,poster").unwrap_err();
    assert!(matches!(
        delimited,
        RepoError::Validation(CollectionValidationError::TagNameContainsDelimiter(_))
    ));
    assert!(repo.list_tags().unwrap().is_empty());
}

#[test]
fn create_collection_collapses_duplicate_tag_inputs() {
    let mut conn = open_db_in_memory().unwrap();
    let collection_id = {
        let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        let id = repo
            .create_collection(
                &NewCollection::new("A", "/f")
                    .with_cover_image("/img.png")
                    .with_tags(["x", "y", "x"]),
            )
            .unwrap();

        let listed = repo.list_collections().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].cover_image_path.as_deref(), Some("/img.png"));
        let names: BTreeSet<&str> = listed[0].tag_names().into_iter().collect();
        assert_eq!(names, BTreeSet::from(["x", "y"]));
        id
    };

    assert_eq!(count_rows(&conn, "tags"), 2);
    assert_eq!(count_rows(&conn, "collection_tags"), 2);

    let linked_ids = linked_tag_ids(&conn, collection_id);
    let repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
    let record = repo.get_collection(collection_id).unwrap().unwrap();
    assert_eq!(record.tag_ids, linked_ids);
    assert_eq!(record.tag_names, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn create_collection_reuses_existing_tags_case_insensitively() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        assert!(repo.add_tag("Retro").unwrap());
        repo.create_collection(&NewCollection::new("Old Posters", "/b").with_tags(["retro", "80s"]))
            .unwrap();
        assert_eq!(
            repo.list_tags().unwrap(),
            vec!["80s".to_string(), "Retro".to_string()]
        );
        let listed = repo.list_collections().unwrap();
        let names: BTreeSet<&str> = listed[0].tag_names().into_iter().collect();
        assert_eq!(names, BTreeSet::from(["80s", "Retro"]));
    }
    assert_eq!(count_rows(&conn, "tags"), 2);
}

#[test]
fn create_collection_with_blank_name_is_declined() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
    repo.create_collection(&NewCollection::new("Existing", "/e"))
        .unwrap();
    let before = repo.list_collections().unwrap().len();

    let err = repo
        .create_collection(&NewCollection::new("", "/f").with_cover_image("/img.png"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(CollectionValidationError::EmptyName)
    ));
    assert!(err.is_declined());
    assert_eq!(repo.list_collections().unwrap().len(), before);
}

#[test]
fn create_collection_without_tags_lists_absent_tag_string() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
    let id = repo
        .create_collection(&NewCollection::new("Rare Objects", "/c"))
        .unwrap();

    let listed = repo.list_collections().unwrap();
    assert_eq!(listed[0].tags, None);
    assert_eq!(listed[0].cover_image_path, None);
    assert!(listed[0].tag_names().is_empty());

    let record = repo.get_collection(id).unwrap().unwrap();
    assert!(record.tag_ids.is_empty());
    assert!(record.created_at > 0);
}

#[test]
fn duplicate_collection_name_is_declined_without_side_effects() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        repo.create_collection(&NewCollection::new("Posters", "/a").with_tags(["x"]))
            .unwrap();

        let err = repo
            .create_collection(&NewCollection::new("  POSTERS ", "/b").with_tags(["brand new"]))
            .unwrap_err();
        assert!(matches!(err, RepoError::DuplicateCollectionName(_)));
        assert!(err.is_declined());
        assert_eq!(repo.list_tags().unwrap(), vec!["x".to_string()]);
    }
    assert_eq!(count_rows(&conn, "collections"), 1);
}

#[test]
fn failed_collection_insert_rolls_back_new_tags_and_retry_succeeds() {
    let mut conn = open_db_in_memory().unwrap();
    install_insert_fault(&conn);
    let input = NewCollection::new("A", "/f").with_tags(["fresh", "Second"]);

    {
        let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        let err = repo.create_collection(&input).unwrap_err();
        assert!(matches!(err, RepoError::Db(_)));
        assert!(!err.is_declined());
    }
    assert_eq!(count_rows(&conn, "tags"), 0);
    assert_eq!(count_rows(&conn, "collections"), 0);
    assert_eq!(count_rows(&conn, "collection_tags"), 0);

    remove_insert_fault(&conn);
    {
        let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        repo.create_collection(&input).unwrap();
        assert_eq!(
            repo.list_tags().unwrap(),
            vec!["Second".to_string(), "fresh".to_string()]
        );
    }
    assert_eq!(count_rows(&conn, "tags"), 2);
    assert_eq!(count_rows(&conn, "collection_tags"), 2);
}

#[test]
fn resolve_tags_creates_missing_tags_inside_caller_transaction() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tags (name, name_key) VALUES ('Retro', 'retro');",
        [],
    )
    .unwrap();
    let retro_id = conn.last_insert_rowid();

    {
        let tx = conn.transaction().unwrap();
        let names = ["retro", "New", "  ", "NEW"].map(String::from);
        let ids = resolve_tags(&tx, &names).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&retro_id));

        let stored: String = tx
            .query_row(
                "SELECT name FROM tags WHERE name_key = 'new';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, "New");
        tx.rollback().unwrap();
    }

    assert_eq!(count_rows(&conn, "tags"), 1);
}

#[test]
fn list_tags_uses_case_sensitive_order_across_sources() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
    assert!(repo.add_tag("banana").unwrap());
    assert!(repo.add_tag("Zebra").unwrap());
    repo.create_collection(
        &NewCollection::new("Fruit", "/fruit").with_tags(["cherry", "Apple", "BANANA"]),
    )
    .unwrap();

    assert_eq!(
        repo.list_tags().unwrap(),
        vec![
            "Apple".to_string(),
            "Zebra".to_string(),
            "banana".to_string(),
            "cherry".to_string()
        ]
    );
}

#[test]
fn list_collections_returns_newest_first() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = {
        let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        ["t1", "t2", "t3"]
            .into_iter()
            .map(|name| {
                repo.create_collection(&NewCollection::new(name, format!("/{name}")))
                    .unwrap()
            })
            .collect::<Vec<_>>()
    };

    for (id, created_at) in ids.iter().zip([1_000_i64, 2_000, 3_000]) {
        conn.execute(
            "UPDATE collections SET created_at = ?1 WHERE id = ?2;",
            params![created_at, id],
        )
        .unwrap();
    }

    let repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
    let names = repo
        .list_collections()
        .unwrap()
        .into_iter()
        .map(|summary| summary.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["t3", "t2", "t1"]);
}

#[test]
fn list_collections_breaks_timestamp_ties_by_creation_order() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        for name in ["first", "second", "third"] {
            repo.create_collection(&NewCollection::new(name, "/same"))
                .unwrap();
        }
    }
    conn.execute("UPDATE collections SET created_at = 5000;", [])
        .unwrap();

    let repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
    let names = repo
        .list_collections()
        .unwrap()
        .into_iter()
        .map(|summary| summary.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[test]
fn created_at_has_millisecond_resolution() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();

    let mut stamps = Vec::new();
    for name in ["m1", "m2", "m3"] {
        let id = repo
            .create_collection(&NewCollection::new(name, "/ms"))
            .unwrap();
        stamps.push(repo.get_collection(id).unwrap().unwrap().created_at);
        std::thread::sleep(std::time::Duration::from_millis(7));
    }

    assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
    // Values are epoch milliseconds, not seconds.
    assert!(stamps[0] > 1_000_000_000_000);
}

#[test]
fn get_collection_rejects_malformed_tag_cache() {
    let mut conn = open_db_in_memory().unwrap();
    let id = {
        let mut repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
        repo.create_collection(&NewCollection::new("A", "/f").with_tags(["x"]))
            .unwrap()
    };
    conn.execute(
        "UPDATE collections SET tag_id_cache = '1,oops' WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
    let err = repo.get_collection(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(repo.get_collection(id + 100).unwrap().is_none());
}

#[test]
fn submit_draft_persists_selection_and_reads_back() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteCollectionRepository::try_new(&mut conn).unwrap();
    let mut service = CollectionService::new(repo);

    let mut draft = CollectionDraft::new();
    draft.select_folder("/photos/My Collection A");
    draft.select_cover_image("/images/coverA.jpg");
    draft.toggle_tag("illustration");
    draft.toggle_tag("80s");

    let record = service.submit_draft(draft, true).unwrap();
    assert_eq!(record.name, "My Collection A");
    assert_eq!(record.folder_path, "/photos/My Collection A");
    assert_eq!(record.cover_image_path.as_deref(), Some("/images/coverA.jpg"));
    assert_eq!(
        record.tag_names,
        vec!["80s".to_string(), "illustration".to_string()]
    );
    assert_eq!(record.tag_ids.len(), 2);

    let incomplete = CollectionDraft::new();
    let err = service.submit_draft(incomplete, false).unwrap_err();
    assert!(err.is_declined());
    assert_eq!(service.list_collections().unwrap().len(), 1);
}

fn install_insert_fault(conn: &Connection) {
    conn.execute_batch(
        "CREATE TRIGGER fail_collection_insert
         BEFORE INSERT ON collections
         BEGIN
             SELECT RAISE(ABORT, 'simulated fault');
         END;",
    )
    .unwrap();
}

fn remove_insert_fault(conn: &Connection) {
    conn.execute_batch("DROP TRIGGER fail_collection_insert;")
        .unwrap();
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn linked_tag_ids(conn: &Connection, collection_id: i64) -> Vec<i64> {
    let mut stmt = conn
        .prepare(
            "SELECT tag_id FROM collection_tags WHERE collection_id = ?1 ORDER BY tag_id ASC;",
        )
        .unwrap();
    stmt.query_map([collection_id], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<i64>, _>>()
        .unwrap()
}
