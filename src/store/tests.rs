//! Behavior tests for the store, run against in-memory databases

use super::{BoxUpdate, Capability, InstanceUpdate, LocationUpdate, Store};
use crate::core::error::Error;
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::home::Role;
use crate::entities::instance::InstanceStatus;
use crate::entities::location::LocationKind;
use crate::entities::photo::PhotoOwner;

fn alice() -> IdentityId {
    IdentityId::from("alice")
}

fn bob() -> IdentityId {
    IdentityId::from("bob")
}

/// Fresh store with one home owned (admin) by alice
fn setup() -> (Store, EntityId) {
    let mut store = Store::open_in_memory().unwrap();
    let home = store.create_home(&alice(), "Chez Alice").unwrap();
    (store, home.id)
}

fn audit_count(store: &Store) -> i64 {
    store
        .conn
        .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_authorize_truth_table() {
    let (mut store, home) = setup();

    // Creator is auto-admin
    assert!(store.authorized(&alice(), &home, Capability::Read).unwrap());
    assert!(store.authorized(&alice(), &home, Capability::Write).unwrap());
    assert!(store.authorized(&alice(), &home, Capability::Admin).unwrap());

    // No membership row: deny everything
    assert!(!store.authorized(&bob(), &home, Capability::Read).unwrap());
    assert!(!store.authorized(&bob(), &home, Capability::Admin).unwrap());

    // Member role: read/write yes, admin no
    store.join_home(&bob(), &home, &bob(), Role::Member).unwrap();
    assert!(store.authorized(&bob(), &home, Capability::Read).unwrap());
    assert!(store.authorized(&bob(), &home, Capability::Write).unwrap());
    assert!(!store.authorized(&bob(), &home, Capability::Admin).unwrap());

    // Revocation takes effect on the next check
    store.remove_member(&alice(), &home, &bob()).unwrap();
    assert!(!store.authorized(&bob(), &home, Capability::Read).unwrap());
}

#[test]
fn test_membership_insert_is_self_only() {
    let (mut store, home) = setup();

    let err = store
        .join_home(&alice(), &home, &bob(), Role::Member)
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    // Duplicate self-join is a duplicate key
    store.join_home(&bob(), &home, &bob(), Role::Member).unwrap();
    let err = store
        .join_home(&bob(), &home, &bob(), Role::Member)
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { .. }));
}

#[test]
fn test_member_cannot_administer_but_can_write() {
    let (mut store, home) = setup();
    store.join_home(&bob(), &home, &bob(), Role::Member).unwrap();

    let err = store.update_home(&bob(), &home, "Renamed").unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    let err = store.remove_member(&bob(), &home, &alice()).unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    // The same member updates a box just fine
    let b = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let updated = store
        .update_box(
            &bob(),
            &b.id,
            BoxUpdate {
                label: Some("B1 bis".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.label, "B1 bis");
}

#[test]
fn test_resolver_follows_box() {
    let (mut store, home) = setup();
    let b1 = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let b2 = store
        .create_box(&alice(), &home, "B2", None, None, None)
        .unwrap();
    let item = store.create_item(&alice(), &home, "Perceuse", None).unwrap();
    let inst = store
        .create_instance(&alice(), &item.id, &b1.id, 1, InstanceStatus::Ok, None, None)
        .unwrap();

    assert_eq!(store.resolve_tenant(EntityKind::Inst, &inst.id).unwrap(), home);
    assert_eq!(
        store.resolve_tenant(EntityKind::Inst, &inst.id).unwrap(),
        store.resolve_tenant(EntityKind::Box, &b1.id).unwrap()
    );

    // Immediately after a box change the derivation still holds
    let moved = store
        .update_instance(
            &alice(),
            &inst.id,
            InstanceUpdate {
                box_id: Some(b2.id.clone()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(moved.box_id, b2.id);
    assert_eq!(
        store.resolve_tenant(EntityKind::Inst, &inst.id).unwrap(),
        store.resolve_tenant(EntityKind::Box, &b2.id).unwrap()
    );
}

#[test]
fn test_instance_cannot_bridge_homes() {
    let (mut store, home) = setup();
    let other = store.create_home(&alice(), "Maison 2").unwrap();

    let b1 = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let foreign_box = store
        .create_box(&alice(), &other.id, "B-other", None, None, None)
        .unwrap();
    let item = store.create_item(&alice(), &home, "Scie", None).unwrap();

    // Create with a box from another home
    let err = store
        .create_instance(
            &alice(),
            &item.id,
            &foreign_box.id,
            1,
            InstanceStatus::Ok,
            None,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    // Move into a box from another home
    let inst = store
        .create_instance(&alice(), &item.id, &b1.id, 1, InstanceStatus::Ok, None, None)
        .unwrap();
    let err = store
        .update_instance(
            &alice(),
            &inst.id,
            InstanceUpdate {
                box_id: Some(foreign_box.id.clone()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[test]
fn test_resolver_reports_dangling_box() {
    let (mut store, home) = setup();
    let b = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let item = store.create_item(&alice(), &home, "Lampe", None).unwrap();
    let inst = store
        .create_instance(&alice(), &item.id, &b.id, 1, InstanceStatus::Ok, None, None)
        .unwrap();

    // Break referential integrity behind the resolver's back
    store
        .conn
        .execute_batch("PRAGMA foreign_keys=OFF;")
        .unwrap();
    store
        .conn
        .execute(
            "DELETE FROM boxes WHERE id = ?1",
            rusqlite::params![b.id.to_string()],
        )
        .unwrap();

    let err = store.resolve_tenant(EntityKind::Inst, &inst.id).unwrap_err();
    assert!(matches!(err, Error::DanglingReference { .. }));
}

#[test]
fn test_category_names_unique_case_insensitive() {
    let (mut store, home) = setup();
    store.create_category(&alice(), &home, "Câbles").unwrap();

    let err = store.create_category(&alice(), &home, "câbles").unwrap_err();
    assert!(matches!(
        err,
        Error::DuplicateKey {
            field: "category name",
            ..
        }
    ));

    // A different home is free to reuse the name
    let other = store.create_home(&alice(), "Maison 2").unwrap();
    store.create_category(&alice(), &other.id, "câbles").unwrap();
}

#[test]
fn test_item_names_unique_case_insensitive() {
    let (mut store, home) = setup();
    store.create_item(&alice(), &home, "Perceuse", None).unwrap();
    let err = store
        .create_item(&alice(), &home, "PERCEUSE", None)
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { field: "item name", .. }));
}

#[test]
fn test_scan_token_unique_across_homes() {
    let (mut store, home) = setup();
    let other = store.create_home(&alice(), "Maison 2").unwrap();

    store
        .create_box(&alice(), &home, "B1", None, Some("box:1".into()), None)
        .unwrap();
    let err = store
        .create_box(&alice(), &other.id, "B2", None, Some("box:1".into()), None)
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { field: "scan token", .. }));
}

#[test]
fn test_box_delete_cascades_instances_and_photos() {
    let (mut store, home) = setup();
    let b = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let item = store.create_item(&alice(), &home, "Livre", None).unwrap();
    let inst = store
        .create_instance(&alice(), &item.id, &b.id, 3, InstanceStatus::Ok, None, None)
        .unwrap();
    store
        .create_photo(
            &alice(),
            &home,
            PhotoOwner::Box,
            &b.id.to_string(),
            "blob://photos/1",
        )
        .unwrap();

    store.delete_box(&alice(), &b.id).unwrap();

    let err = store.get_instance(&alice(), &inst.id).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    let photos = store.list_photos(&alice(), &home, None).unwrap();
    assert!(photos.is_empty());
}

#[test]
fn test_every_box_and_instance_mutation_is_audited() {
    let (mut store, home) = setup();

    let b = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    assert_eq!(audit_count(&store), 1);

    let item = store.create_item(&alice(), &home, "Vis", None).unwrap();
    // Item creation is not an audited kind
    assert_eq!(audit_count(&store), 1);

    let inst = store
        .create_instance(&alice(), &item.id, &b.id, 5, InstanceStatus::Ok, None, None)
        .unwrap();
    assert_eq!(audit_count(&store), 2);

    store
        .update_instance(
            &alice(),
            &inst.id,
            InstanceUpdate {
                quantity: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(audit_count(&store), 3);

    store.delete_instance(&alice(), &inst.id).unwrap();
    assert_eq!(audit_count(&store), 4);

    let trail = store.list_audit(&alice(), &home).unwrap();
    let actions: Vec<&str> = trail.iter().map(|r| r.action.as_str()).collect();
    assert_eq!(
        actions,
        vec![
            "insert_box",
            "insert_instance",
            "update_instance",
            "delete_instance"
        ]
    );

    // Image presence per operation
    assert!(trail[0].before.is_none() && trail[0].after.is_some());
    assert!(trail[2].before.is_some() && trail[2].after.is_some());
    assert!(trail[3].before.is_some() && trail[3].after.is_none());

    // Every record carries the resolved home and the acting identity
    for record in &trail {
        assert_eq!(record.home_id.as_ref(), Some(&home));
        assert_eq!(record.actor.as_ref(), Some(&alice()));
    }
}

#[test]
fn test_box_delete_audits_cascaded_instances() {
    let (mut store, home) = setup();
    let b = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let item = store.create_item(&alice(), &home, "Jouet", None).unwrap();
    store
        .create_instance(&alice(), &item.id, &b.id, 1, InstanceStatus::Ok, None, None)
        .unwrap();
    store
        .create_instance(&alice(), &item.id, &b.id, 2, InstanceStatus::ToGive, None, None)
        .unwrap();

    store.delete_box(&alice(), &b.id).unwrap();

    let trail = store.list_audit(&alice(), &home).unwrap();
    let deletes: Vec<&str> = trail
        .iter()
        .map(|r| r.action.as_str())
        .filter(|a| a.starts_with("delete"))
        .collect();
    assert_eq!(deletes, vec!["delete_instance", "delete_instance", "delete_box"]);
}

#[test]
fn test_quantity_boundary() {
    let (mut store, home) = setup();
    let b = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let item = store.create_item(&alice(), &home, "Clous", None).unwrap();
    let inst = store
        .create_instance(&alice(), &item.id, &b.id, 3, InstanceStatus::Ok, None, None)
        .unwrap();

    // Zero is the allowed minimum
    let updated = store
        .update_instance(
            &alice(),
            &inst.id,
            InstanceUpdate {
                quantity: Some(0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.quantity, 0);

    let err = store
        .update_instance(
            &alice(),
            &inst.id,
            InstanceUpdate {
                quantity: Some(-1),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    let err = store
        .create_instance(&alice(), &item.id, &b.id, -5, InstanceStatus::Ok, None, None)
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[test]
fn test_update_stamps_fresh_timestamp() {
    let (mut store, home) = setup();
    let b = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let item = store.create_item(&alice(), &home, "Montre", None).unwrap();
    let inst = store
        .create_instance(&alice(), &item.id, &b.id, 1, InstanceStatus::Ok, None, None)
        .unwrap();

    let updated = store
        .update_instance(
            &alice(),
            &inst.id,
            InstanceUpdate {
                status: Some(InstanceStatus::ToSell),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(updated.updated_at >= inst.updated_at);
}

#[test]
fn test_rows_outside_callers_homes_are_invisible() {
    let (mut store, home) = setup();
    let b = store
        .create_box(&alice(), &home, "B1", None, Some("box:42".into()), None)
        .unwrap();

    // By-reference reads and writes look like missing rows
    let err = store.get_box(&bob(), &b.id).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    let err = store.find_box_by_token(&bob(), "box:42").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    let err = store.delete_box(&bob(), &b.id).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    // Explicit-tenant operations deny without confirming existence
    let err = store.list_boxes(&bob(), &home).unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
    let err = store.get_home(&bob(), &home).unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
    let missing_home = EntityId::new(EntityKind::Home);
    let err = store.list_boxes(&bob(), &missing_home).unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
}

#[test]
fn test_location_tree_constraints() {
    let (mut store, home) = setup();
    let house = store
        .create_location(&alice(), &home, LocationKind::House, None, "Maison")
        .unwrap();
    let room = store
        .create_location(&alice(), &home, LocationKind::Room, Some(&house.id), "Salon")
        .unwrap();

    // Cycle: the house cannot hang under its own room
    let err = store
        .update_location(
            &alice(),
            &house.id,
            LocationUpdate {
                parent_id: Some(Some(room.id.clone())),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    // Self-parenting is the degenerate cycle
    let err = store
        .update_location(
            &alice(),
            &room.id,
            LocationUpdate {
                parent_id: Some(Some(room.id.clone())),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    // Cross-home parent reads as nonexistent
    let other = store.create_home(&alice(), "Maison 2").unwrap();
    let err = store
        .create_location(&alice(), &other.id, LocationKind::Room, Some(&house.id), "Bureau")
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    // Deleting the house takes the room with it
    store.delete_location(&alice(), &house.id).unwrap();
    let err = store.get_location(&alice(), &room.id).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_deleting_location_keeps_boxes() {
    let (mut store, home) = setup();
    let room = store
        .create_location(&alice(), &home, LocationKind::Room, None, "Cave")
        .unwrap();
    let b = store
        .create_box(&alice(), &home, "B1", Some(&room.id), None, None)
        .unwrap();

    store.delete_location(&alice(), &room.id).unwrap();

    let b = store.get_box(&alice(), &b.id).unwrap();
    assert!(b.location_id.is_none());
}

#[test]
fn test_audit_survives_home_deletion() {
    let (mut store, home) = setup();
    let b = store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();
    let item = store.create_item(&alice(), &home, "Chaise", None).unwrap();
    store
        .create_instance(&alice(), &item.id, &b.id, 1, InstanceStatus::Ok, None, None)
        .unwrap();

    store.delete_home(&alice(), &home).unwrap();

    // insert_box + insert_instance + delete_instance + delete_box
    assert_eq!(audit_count(&store), 4);
    let home_gone: bool = store
        .conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM homes WHERE id = ?1)",
            rusqlite::params![home.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert!(!home_gone);
}

#[test]
fn test_audit_has_no_direct_write_path() {
    let (mut store, home) = setup();
    store
        .create_box(&alice(), &home, "B1", None, None, None)
        .unwrap();

    // Member-read works; the only writes come from the interceptor
    let trail = store.list_audit(&alice(), &home).unwrap();
    assert_eq!(trail.len(), 1);
    let fetched = store.get_audit(&alice(), &trail[0].id).unwrap();
    assert_eq!(fetched.action, "insert_box");

    // Non-members cannot read the trail
    let err = store.list_audit(&bob(), &home).unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
    let err = store.get_audit(&bob(), &trail[0].id).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_scenario_quantity_five_to_two() {
    // Identity A creates home H, is auto-admin, creates box B1 with token
    // "box:1", places 5 of an item there, then updates the quantity to 2.
    let mut store = Store::open_in_memory().unwrap();
    let a = IdentityId::from("identity-a");

    let h = store.create_home(&a, "H").unwrap();
    assert!(store.authorized(&a, &h.id, Capability::Admin).unwrap());

    let b1 = store
        .create_box(&a, &h.id, "B1", None, Some("box:1".into()), None)
        .unwrap();
    let item = store.create_item(&a, &h.id, "Widget", None).unwrap();
    let inst = store
        .create_instance(&a, &item.id, &b1.id, 5, InstanceStatus::Ok, None, None)
        .unwrap();
    store
        .update_instance(
            &a,
            &inst.id,
            InstanceUpdate {
                quantity: Some(2),
                ..Default::default()
            },
        )
        .unwrap();

    let trail = store.list_audit(&a, &h.id).unwrap();
    let updates: Vec<_> = trail
        .iter()
        .filter(|r| r.action == "update_instance")
        .collect();
    assert_eq!(updates.len(), 1);

    let record = updates[0];
    assert_eq!(record.home_id.as_ref(), Some(&h.id));
    let before = record.before.as_ref().unwrap();
    let after = record.after.as_ref().unwrap();
    assert_eq!(before["quantity"], 5);
    assert_eq!(after["quantity"], 2);
}
