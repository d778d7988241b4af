use std::io::Write;

use apuntes_browser::{
    codec::{decode_segment, encode_segment, segment_of},
    models::KindLabel,
    navigation::Breadcrumb,
    search::{norm, MAX_LIMIT},
    Catalog, CatalogError, NavigationError, ParentRef,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

const BASIC_TREE: &str = r#"[
    {"id":"A","name":"1_Basicas","type":"folder","children":[
        {"id":"B","name":"Análisis_I.pdf","type":"application/pdf","url":"http://x/B"}
    ]}
]"#;

fn basic() -> Catalog {
    Catalog::from_json(BASIC_TREE, 64).unwrap()
}

#[test]
fn root_listing_ships_no_grandchildren() {
    let children = basic().list_children(ParentRef::Root);
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id.as_deref(), Some("A"));
    assert_eq!(children[0].name, "1_Basicas");
    assert_eq!(children[0].kind, KindLabel::Folder);

    let value = serde_json::to_value(&children).unwrap();
    assert!(value[0].get("children").is_none());
}

#[test]
fn resolves_top_level_folder_with_breadcrumb() {
    let catalog = basic();
    let res = assert_ok!(catalog.resolve_path(&["1-basicas--A"]));
    assert_eq!(res.folder.unwrap().id.as_deref(), Some("A"));
    assert_eq!(
        res.breadcrumbs,
        vec![Breadcrumb {
            name: "Basicas".into(),
            href: "/1-basicas--A".into()
        }]
    );
    assert_eq!(res.children.len(), 1);
    assert_eq!(res.children[0].href, "http://x/B");
}

#[test]
fn accent_insensitive_search_finds_file() {
    let results = basic().search("analisis", 20).results;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id.as_deref(), Some("B"));
    assert_eq!(results[0].route, "http://x/B");
    assert!(!results[0].is_folder);
}

#[test]
fn fake_child_is_rejected_not_listed() {
    let catalog = basic();
    let err = assert_err!(catalog.resolve_path(&["1-basicas--A", "x--FAKE"]));
    assert_eq!(
        err,
        NavigationError::InvalidPath {
            fallback: "/1-basicas--A".into()
        }
    );
}

#[test]
fn one_char_query_yields_empty_results() {
    assert!(basic().search("a", 5).results.is_empty());
}

#[test]
fn same_name_different_ids_stay_separate() {
    let catalog = Catalog::from_json(
        r#"[
            {"id":"P1","name":"Fisica","type":"folder","children":[
                {"id":"X1","name":"Parciales","type":"folder"}
            ]},
            {"id":"P2","name":"Quimica","type":"folder","children":[
                {"id":"X2","name":"Parciales","type":"folder"}
            ]}
        ]"#,
        64,
    )
    .unwrap();

    let results = catalog.search("parciales", 20).results;
    let routes: Vec<_> = results.iter().map(|r| r.route.as_str()).collect();
    assert_eq!(
        routes,
        vec!["/fisica--P1/parciales--X1", "/quimica--P2/parciales--X2"]
    );
    assert!(catalog.resolve_path(&["fisica--P1", "parciales--X2"]).is_err());
}

#[test]
fn ancestor_chain_must_match_source_tree() {
    let catalog = Catalog::from_json(
        r#"[
            {"id":"A","name":"A","type":"folder","children":[
                {"id":"A1","name":"A1","type":"folder"}
            ]},
            {"id":"B","name":"B","type":"folder","children":[
                {"id":"B1","name":"B1","type":"folder"}
            ]}
        ]"#,
        64,
    )
    .unwrap();
    assert!(catalog.resolve_path(&["a--A", "a1--A1"]).is_ok());
    assert!(catalog.resolve_path(&["a--A", "b1--B1"]).is_err());
    assert!(catalog.resolve_path(&["b--B", "a1--A1"]).is_err());
}

#[test]
fn limit_is_capped_at_fifty() {
    let nodes: Vec<Value> = (0..120)
        .map(|i| json!({"id": format!("n{i}"), "name": format!("Apunte {i}"), "type": "application/pdf"}))
        .collect();
    let catalog = Catalog::from_nodes(serde_json::from_value(Value::Array(nodes)).unwrap(), 64)
        .unwrap();
    assert_eq!(catalog.search("apunte", 1000).results.len(), MAX_LIMIT);
    assert_eq!(catalog.search("apunte", 7).results.len(), 7);
}

#[test]
fn every_folder_round_trips_through_its_segment() {
    let catalog = Catalog::from_json(
        r#"[
            {"id":"A","name":"Año -- raro","type":"folder","children":[
                {"id":"B","name":"--","type":"folder"},
                {"id":"C","name":"Ñandú_2","type":"folder"}
            ]}
        ]"#,
        64,
    )
    .unwrap();
    for (_, node) in catalog.index().nodes().filter(|(_, n)| n.is_folder()) {
        let segment = segment_of(node).unwrap();
        assert_eq!(Some(decode_segment(&segment)), node.id.as_deref());
    }
}

#[test]
fn loads_snapshot_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(BASIC_TREE.as_bytes()).unwrap();
    let catalog = Catalog::load(file.path(), 64).unwrap();
    assert!(catalog.get("B").is_some());
}

#[test]
fn missing_snapshot_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Catalog::load(&dir.path().join("nope.json"), 64).unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
}

fn flat_tree(entries: &[(bool, String)]) -> Catalog {
    let nodes: Vec<Value> = entries
        .iter()
        .enumerate()
        .map(|(i, (folder, name))| {
            json!({
                "id": format!("id{i}"),
                "name": name,
                "type": if *folder { "folder" } else { "application/pdf" },
            })
        })
        .collect();
    Catalog::from_nodes(serde_json::from_value(Value::Array(nodes)).unwrap(), 64).unwrap()
}

proptest! {
    #[test]
    fn norm_is_idempotent(s in any::<String>()) {
        let once = norm(&s);
        prop_assert_eq!(norm(&once), once);
    }

    #[test]
    fn segment_round_trip(name in any::<String>(), id in "[A-Za-z0-9_][A-Za-z0-9_-]{0,32}") {
        prop_assume!(!id.contains("--"));
        let segment = encode_segment(&name, &id);
        prop_assert_eq!(decode_segment(&segment), id.as_str());
    }

    #[test]
    fn results_contain_query_and_folders_come_first(
        entries in prop::collection::vec((any::<bool>(), "[a-zA-Z_ 0-9áé]{0,12}"), 0..40),
        query in "[a-z]{2,3}",
    ) {
        let catalog = flat_tree(&entries);
        let needle = norm(&query);
        let results = catalog.search(&query, 50).results;
        for r in &results {
            prop_assert!(norm(&r.name).contains(&needle));
        }
        let first_file = results.iter().position(|r| !r.is_folder).unwrap_or(results.len());
        prop_assert!(results[first_file..].iter().all(|r| !r.is_folder));

        let listing = catalog.list_children(ParentRef::Root);
        let first_file = listing.iter().position(|n| !n.is_folder).unwrap_or(listing.len());
        prop_assert!(listing[first_file..].iter().all(|n| !n.is_folder));
        prop_assert_eq!(listing.len(), entries.len());
    }
}
