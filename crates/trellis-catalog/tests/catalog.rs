//! Catalog behavior over the file-backed document store.

use std::sync::{Arc, Barrier};

use trellis_catalog::{CatalogError, RelationshipCatalog};
use trellis_core::{Relationship, Segment, View};
use trellis_store::{DocumentStore, FileDocumentStore, StoreError};

fn file_catalog(dir: &tempfile::TempDir) -> (Arc<FileDocumentStore>, RelationshipCatalog) {
    let store = Arc::new(FileDocumentStore::new(dir.path()).unwrap());
    let catalog = RelationshipCatalog::new(store.clone());
    (store, catalog)
}

#[test]
fn test_catalog_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (_, catalog) = file_catalog(&dir);

    let authored = catalog
        .add_relationship(Relationship::new("authored"))
        .unwrap();
    let on = catalog.add_relationship(Relationship::new("on")).unwrap();
    catalog
        .add_view(View::new(
            "user comments on assets",
            vec![Segment::out(&authored), Segment::out(&on)],
        ))
        .unwrap();
    drop(catalog);

    let (_, reopened) = file_catalog(&dir);
    let manager = reopened.manager().unwrap();
    assert_eq!(manager.relationships.len(), 2);
    assert_eq!(manager.views.len(), 1);
    assert_eq!(
        reopened.relationship_by_predicate("on").unwrap().id,
        on
    );
}

#[test]
fn test_manager_stored_as_single_document() {
    let dir = tempfile::tempdir().unwrap();
    let (store, catalog) = file_catalog(&dir);

    catalog
        .add_relationship(Relationship::new("authored"))
        .unwrap();
    catalog.add_relationship(Relationship::new("on")).unwrap();

    let docs = store.list("relationship_manager").unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].key, "manager");
    assert_eq!(docs[0].revision, 2);
}

#[test]
fn test_predicate_uniqueness_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let (_, first) = file_catalog(&dir);
    let (_, second) = file_catalog(&dir);

    first.add_relationship(Relationship::new("authored")).unwrap();
    let err = second
        .add_relationship(Relationship::new("authored"))
        .unwrap_err();
    assert!(matches!(err, CatalogError::PredicateExists { .. }));
    assert_eq!(first.relationships().unwrap().len(), 1);
}

#[test]
fn test_concurrent_adds_never_duplicate_predicate() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = file_catalog(&dir);
    let shared: Arc<dyn DocumentStore> = store;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let catalog = RelationshipCatalog::new(shared.clone());
            std::thread::spawn(move || catalog.add_relationship(Relationship::new("authored")))
        })
        .collect();

    let mut added = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => added += 1,
            Err(CatalogError::PredicateExists { .. })
            | Err(CatalogError::Store(StoreError::Conflict { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(added, 1);
    let catalog = RelationshipCatalog::new(shared);
    let authored: Vec<_> = catalog
        .relationships()
        .unwrap()
        .into_iter()
        .filter(|r| r.predicate == "authored")
        .collect();
    assert_eq!(authored.len(), 1);
}

#[test]
fn test_separately_opened_stores_never_duplicate_predicate() {
    for _ in 0..50 {
        let dir = tempfile::tempdir().unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let (_, catalog) = file_catalog(&dir);
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    catalog.add_relationship(Relationship::new("authored"))
                })
            })
            .collect();

        let mut added = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(_) => added += 1,
                Err(CatalogError::PredicateExists { .. })
                | Err(CatalogError::Store(StoreError::Conflict { .. })) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(added, 1);

        let (_, reopened) = file_catalog(&dir);
        assert_eq!(reopened.relationships().unwrap().len(), 1);
    }
}

#[test]
fn test_view_dependency_blocks_removal() {
    let dir = tempfile::tempdir().unwrap();
    let (_, catalog) = file_catalog(&dir);

    let authored = catalog
        .add_relationship(Relationship::new("authored"))
        .unwrap();
    let on = catalog.add_relationship(Relationship::new("on")).unwrap();
    let view = catalog
        .add_view(View::new(
            "asset commenters",
            vec![Segment::inbound(&on), Segment::inbound(&authored)],
        ))
        .unwrap();

    for id in [&authored, &on] {
        assert!(matches!(
            catalog.remove_relationship(id),
            Err(CatalogError::ActiveViewDependency { .. })
        ));
    }
    assert_eq!(catalog.relationships().unwrap().len(), 2);

    catalog.remove_view(&view).unwrap();
    catalog.remove_relationship(&authored).unwrap();
    catalog.remove_relationship(&on).unwrap();
    assert!(catalog.manager().unwrap().relationships.is_empty());
}
