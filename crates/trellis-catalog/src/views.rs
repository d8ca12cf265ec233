//! View validation: reference checks and relationship-removal protection.

use trellis_core::{Direction, RelationshipManager, View};

use crate::error::{CatalogError, Result};

/// Names of the views whose path references `relationship_id`.
pub fn dependent_views(manager: &RelationshipManager, relationship_id: &str) -> Vec<String> {
    manager
        .views
        .iter()
        .filter(|v| v.references(relationship_id))
        .map(|v| v.name.clone())
        .collect()
}

/// Fail with `ActiveViewDependency` if any view still uses the relationship.
pub fn ensure_removable(manager: &RelationshipManager, relationship_id: &str) -> Result<()> {
    let views = dependent_views(manager, relationship_id);
    if views.is_empty() {
        return Ok(());
    }
    Err(CatalogError::ActiveViewDependency {
        relationship_id: relationship_id.to_string(),
        views,
    })
}

/// Check a view against the catalog: structurally valid, name unique among
/// other views, and every segment pointing at an existing relationship.
pub fn validate_view(manager: &RelationshipManager, view: &View) -> Result<()> {
    view.validate()?;

    if let Some(other) = manager.view_by_name(&view.name) {
        if other.id != view.id {
            return Err(CatalogError::ViewExists {
                name: view.name.clone(),
            });
        }
    }

    for id in view.relationship_ids() {
        if manager.relationship(id).is_none() {
            return Err(CatalogError::RelationshipNotFound { id: id.to_string() });
        }
    }
    Ok(())
}

/// Resolve a view's segments to (predicate, direction) hops.
pub fn resolve_hops(manager: &RelationshipManager, view: &View) -> Result<Vec<(String, Direction)>> {
    view.path
        .iter()
        .map(|segment| {
            manager
                .relationship(&segment.relationship_id)
                .map(|rel| (rel.predicate.clone(), segment.direction))
                .ok_or_else(|| CatalogError::RelationshipNotFound {
                    id: segment.relationship_id.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{Relationship, Segment};

    fn manager() -> RelationshipManager {
        let mut rm = RelationshipManager::default();
        rm.upsert_relationship(Relationship::new("authored").with_id("r-authored"));
        rm.upsert_relationship(Relationship::new("on").with_id("r-on"));
        rm.upsert_relationship(Relationship::new("flagged").with_id("r-flagged"));

        let mut view = View::new(
            "user comments on assets",
            vec![Segment::out("r-authored"), Segment::out("r-on")],
        );
        view.id = "v1".into();
        rm.upsert_view(view);
        rm
    }

    #[test]
    fn finds_dependent_views() {
        let rm = manager();
        assert_eq!(dependent_views(&rm, "r-on"), vec!["user comments on assets"]);
        assert!(dependent_views(&rm, "r-flagged").is_empty());
    }

    #[test]
    fn blocks_removal_of_used_relationship() {
        let rm = manager();
        let err = ensure_removable(&rm, "r-authored").unwrap_err();
        assert!(matches!(err, CatalogError::ActiveViewDependency { ref views, .. } if views.len() == 1));
        assert!(ensure_removable(&rm, "r-flagged").is_ok());
    }

    #[test]
    fn rejects_dangling_segment() {
        let rm = manager();
        let mut view = View::new("dangling", vec![Segment::out("r-missing")]);
        view.id = "v2".into();
        assert!(matches!(
            validate_view(&rm, &view),
            Err(CatalogError::RelationshipNotFound { id }) if id == "r-missing"
        ));
    }

    #[test]
    fn rejects_duplicate_view_name_but_allows_self_replace() {
        let rm = manager();
        let mut dup = View::new("user comments on assets", vec![Segment::out("r-on")]);
        dup.id = "v2".into();
        assert!(matches!(
            validate_view(&rm, &dup),
            Err(CatalogError::ViewExists { .. })
        ));

        dup.id = "v1".into();
        assert!(validate_view(&rm, &dup).is_ok());
    }

    #[test]
    fn resolves_hops_in_path_order() {
        let rm = manager();
        let mut view = View::new(
            "asset commenters",
            vec![Segment::inbound("r-on"), Segment::inbound("r-authored")],
        );
        view.id = "v3".into();
        let hops = resolve_hops(&rm, &view).unwrap();
        assert_eq!(
            hops,
            vec![
                ("on".to_string(), Direction::In),
                ("authored".to_string(), Direction::In)
            ]
        );
    }
}
