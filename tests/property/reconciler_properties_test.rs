//! Property-based tests for the Reconciler.
//!
//! These tests drive the reconciler with arbitrary action sequences and
//! check it against a straightforward model of the flat collection.

use bookmarksync::managers::reconciler::Reconciler;
use bookmarksync::services::durable_store::MemoryStore;
use bookmarksync::types::bookmark::BookmarkRecord;
use bookmarksync::types::sync::SyncAction;
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Small id space so removals and changes often hit existing records.
fn arb_id() -> impl Strategy<Value = String> {
    "[a-e]"
}

fn arb_record() -> impl Strategy<Value = BookmarkRecord> {
    (arb_id(), "[A-Za-z ]{0,12}", proptest::option::of("https://[a-z]{3,8}\\.example"))
        .prop_map(|(id, title, url)| BookmarkRecord::new(&id, &title, url.as_deref()))
}

fn arb_fields() -> impl Strategy<Value = Map<String, Value>> {
    (
        proptest::option::of(prop_oneof![
            "[A-Za-z ]{0,12}".prop_map(Value::String),
            Just(Value::Null),
            any::<i32>().prop_map(Value::from),
        ]),
        proptest::option::of("https://[a-z]{3,8}\\.example"),
        proptest::option::of(0u32..20),
    )
        .prop_map(|(title, url, index)| {
            let mut fields = Map::new();
            if let Some(title) = title {
                fields.insert("title".to_string(), title);
            }
            if let Some(url) = url {
                fields.insert("url".to_string(), Value::String(url));
            }
            if let Some(index) = index {
                fields.insert("index".to_string(), Value::from(index));
            }
            fields
        })
}

fn arb_action() -> impl Strategy<Value = SyncAction> {
    prop_oneof![
        arb_record().prop_map(SyncAction::Created),
        arb_id().prop_map(SyncAction::Removed),
        (arb_id(), arb_fields()).prop_map(|(id, fields)| SyncAction::Changed(id, fields)),
    ]
}

/// Reference model of the collection.
fn model_apply(model: &mut Vec<BookmarkRecord>, action: &SyncAction) {
    match action {
        SyncAction::Created(record) => match model.iter().position(|r| r.id == record.id) {
            Some(i) => model[i] = record.clone(),
            None => model.push(record.clone()),
        },
        SyncAction::Removed(id) => model.retain(|r| &r.id != id),
        SyncAction::Changed(id, fields) => {
            if let Some(record) = model.iter_mut().find(|r| &r.id == id) {
                record.merge(fields);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reconciler_matches_model(actions in proptest::collection::vec(arb_action(), 0..40)) {
        let reconciler = Reconciler::open(MemoryStore::new()).unwrap();
        let mut model = Vec::new();

        for action in &actions {
            reconciler.apply(action.clone()).unwrap();
            model_apply(&mut model, action);
        }

        prop_assert_eq!(reconciler.records(), model.clone());
        prop_assert_eq!(reconciler.inspect_store(|s| s.saved().to_vec()), model);
        prop_assert_eq!(reconciler.inspect_store(|s| s.save_count()), actions.len());
    }

    #[test]
    fn ids_stay_unique_under_single_actions(actions in proptest::collection::vec(arb_action(), 0..40)) {
        let reconciler = Reconciler::open(MemoryStore::new()).unwrap();
        for action in actions {
            reconciler.apply(action).unwrap();
        }

        let mut ids: Vec<String> = reconciler.records().into_iter().map(|r| r.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }

    #[test]
    fn removal_is_idempotent(
        records in proptest::collection::vec(arb_record(), 0..10),
        id in arb_id(),
    ) {
        let reconciler = Reconciler::open(MemoryStore::new()).unwrap();
        for record in records {
            reconciler.apply(SyncAction::Created(record)).unwrap();
        }

        reconciler.apply(SyncAction::Removed(id.clone())).unwrap();
        let once = reconciler.records();
        reconciler.apply(SyncAction::Removed(id.clone())).unwrap();

        prop_assert_eq!(reconciler.records(), once);
        prop_assert!(reconciler.get(&id).is_none());
    }

    #[test]
    fn merge_only_touches_named_fields(record in arb_record(), fields in arb_fields()) {
        let reconciler = Reconciler::open(MemoryStore::new()).unwrap();
        reconciler.apply(SyncAction::Created(record.clone())).unwrap();
        reconciler
            .apply(SyncAction::Changed(record.id.clone(), fields.clone()))
            .unwrap();

        let merged = reconciler.get(&record.id).unwrap();
        for (key, value) in &fields {
            prop_assert_eq!(merged.field(key), Some(value));
        }
        for (key, value) in &record.fields {
            if !fields.contains_key(key) {
                prop_assert_eq!(merged.field(key), Some(value));
            }
        }
        let added = fields
            .keys()
            .filter(|key| !record.fields.contains_key(*key))
            .count();
        prop_assert_eq!(merged.fields.len(), record.fields.len() + added);
    }

    #[test]
    fn replace_all_discards_prior_state(
        before in proptest::collection::vec(arb_action(), 0..20),
        snapshot in proptest::collection::vec(arb_record(), 0..10),
    ) {
        let reconciler = Reconciler::open(MemoryStore::new()).unwrap();
        for action in before {
            reconciler.apply(action).unwrap();
        }
        reconciler.replace_all(snapshot.clone()).unwrap();
        prop_assert_eq!(reconciler.records(), snapshot);
    }
}
