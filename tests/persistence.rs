//! Collection files on disk: layout, round-trips through the library, and failed saves.

use std::fs::{create_dir, read_to_string, write};
use std::path::Path;

use serde_json::Value;
use tempfile::TempDir;

use lookbook_core::{
    CatalogConfig, CatalogError, CollectionId, CollectionStore, ErrorKind, ItemKey, Library,
    PageId, Season,
};

fn seed(dir: &Path) {
    write(
        dir.join("page_items.json"),
        r#"{"page_1": ["Saint Laurent ivory trouser", "The Row brown tassel loafer"],
            "page_2": ["Alden loafer (Footwear)"]}"#,
    )
    .unwrap();
    write(
        dir.join("spring_page_items.json"),
        r#"{"page_10": [{"name": "Sunspel tee", "category": "Tops"}],
            "page_2": [{"name": "Incotex chino", "category": "Bottoms"},
                       {"name": "Sunspel tee", "category": "Tops"}]}"#,
    )
    .unwrap();
    write(
        dir.join("fw_page_items.json"),
        r#"{"page_1": [{"name": "Barbour jacket", "category": "Outerwear"}],
            "page_2": [{"name": "Zegna suit", "category": "Suits"}]}"#,
    )
    .unwrap();
    write(dir.join("page_seasons.json"), r#"{"page_1": "fall", "page_2": "both"}"#).unwrap();
}

fn open(dir: &TempDir) -> Library {
    Library::open(CatalogConfig::default().with_data_dir(dir.path())).unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&read_to_string(path).unwrap()).unwrap()
}

#[test]
fn library_loads_every_collection_independently() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let library = open(&dir);
    assert_eq!(library.collection_ids().count(), 3);

    let summer_items = library.read(CollectionId::Summer, |c| c.item_count()).unwrap();
    let spring_pages = library
        .read(CollectionId::Spring, |c| c.pages_for_item(&ItemKey::from_name("sunspel tee")))
        .unwrap();
    assert_eq!(summer_items, 3);
    assert_eq!(spring_pages, vec![PageId::new(2), PageId::new(10)]);
    let winter = library
        .read(CollectionId::Fw, |c| c.pages_in_season(Season::Winter))
        .unwrap();
    assert_eq!(winter, vec![PageId::new(2)]);
}

#[test]
fn edits_persist_in_the_expected_layout() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let library = open(&dir);
    library
        .edit(CollectionId::Spring, |catalog| {
            catalog.add_item_to_page(PageId::new(3), "Alden loafer", Some("Footwear"))
        })
        .unwrap();

    let raw = read_to_string(dir.path().join("spring_page_items.json")).unwrap();
    let first = raw.find("\"page_2\"").unwrap();
    let second = raw.find("\"page_3\"").unwrap();
    let third = raw.find("\"page_10\"").unwrap();
    assert!(first < second && second < third, "pages not in numeric order:\n{raw}");
    assert!(raw.contains("  \"page_2\": ["), "not pretty printed:\n{raw}");

    let inverse = read_json(&dir.path().join("spring_clothing_index.json"));
    assert_eq!(inverse["Sunspel tee"], serde_json::json!(["page_2", "page_10"]));
    assert_eq!(inverse["Alden loafer"], serde_json::json!(["page_3"]));

    let stats = read_json(&dir.path().join("spring_category_stats.json"));
    assert_eq!(
        stats,
        serde_json::json!({"Tops": 1, "Bottoms": 1, "Footwear": 1})
    );

    library
        .edit(CollectionId::Summer, |catalog| {
            catalog.rename_item(&ItemKey::from_name("The Row brown tassel loafer"), "The Row Tassel Loafer")
        })
        .unwrap();
    let summer = read_json(&dir.path().join("page_items.json"));
    assert_eq!(
        summer["page_1"],
        serde_json::json!(["Saint Laurent ivory trouser", "The Row Tassel Loafer"])
    );
    assert!(!dir.path().join("category_stats.json").exists());
}

#[test]
fn saved_collections_reload_identically() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let library = open(&dir);
    library
        .edit(CollectionId::Fw, |catalog| {
            catalog.add_item_to_page(PageId::new(3), "Moncler parka", Some("Outerwear"))?;
            catalog.set_page_season(&[PageId::new(3)], Season::Winter)
        })
        .unwrap();
    let before = library.read(CollectionId::Fw, Clone::clone).unwrap();

    let reopened = open(&dir);
    let after = reopened.read(CollectionId::Fw, Clone::clone).unwrap();
    assert_eq!(after.forward(), before.forward());
    assert_eq!(after.inverse(), before.inverse());
    assert_eq!(after.category_stats(), before.category_stats());
    assert_eq!(after.seasons(), before.seasons());

    let seasons = read_json(&dir.path().join("page_seasons.json"));
    assert_eq!(
        seasons,
        serde_json::json!({"page_1": "fall", "page_2": "both", "page_3": "winter"})
    );
}

#[test]
fn failed_mutation_rolls_back_and_leaves_files_alone() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let library = open(&dir);
    let path = dir.path().join("page_items.json");
    let on_disk = read_to_string(&path).unwrap();

    let err = library
        .edit(CollectionId::Summer, |catalog| {
            catalog.delete_item(&ItemKey::from_name("Alden loafer (Footwear)"))?;
            catalog.add_item_to_page(PageId::new(1), "the row brown tassel LOAFER", None)
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateItemOnPage);
    assert_eq!(read_to_string(&path).unwrap(), on_disk);
    let still_there = library
        .read(CollectionId::Summer, |c| c.find_item("Alden loafer (Footwear)").is_some())
        .unwrap();
    assert!(still_there);
}

#[test]
fn failed_save_rolls_back_and_keeps_the_forward_index() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let library = open(&dir);
    let forward_path = dir.path().join("fw_page_items.json");
    let on_disk = read_to_string(&forward_path).unwrap();
    // A directory where the inverse index should go makes the save fail.
    create_dir(dir.path().join("fw_clothing_index.json")).unwrap();

    let err = library
        .edit(CollectionId::Fw, |catalog| catalog.delete_page(PageId::new(1)))
        .unwrap_err();
    assert!(err.is_store_error(), "{err}");
    assert!(matches!(err, CatalogError::StoreIo { .. }));
    assert_eq!(read_to_string(&forward_path).unwrap(), on_disk);
    let pages = library.read(CollectionId::Fw, |c| c.page_count()).unwrap();
    assert_eq!(pages, 2);
}

#[test]
fn failed_forward_commit_leaves_derived_files_matching_the_old_state() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let library = open(&dir);
    library.repair(CollectionId::Fw).unwrap();
    let inverse_path = dir.path().join("fw_clothing_index.json");
    let stats_path = dir.path().join("fw_category_stats.json");
    let inverse_before = read_to_string(&inverse_path).unwrap();
    let stats_before = read_to_string(&stats_path).unwrap();

    // The forward index path turns into a directory, so only its write can fail.
    let forward_path = dir.path().join("fw_page_items.json");
    std::fs::remove_file(&forward_path).unwrap();
    create_dir(&forward_path).unwrap();

    let err = library
        .edit(CollectionId::Fw, |catalog| {
            catalog.add_item_to_page(PageId::new(3), "Moncler parka", Some("Outerwear"))
        })
        .unwrap_err();
    assert!(err.is_store_error(), "{err}");
    assert_eq!(read_to_string(&inverse_path).unwrap(), inverse_before);
    assert_eq!(read_to_string(&stats_path).unwrap(), stats_before);
    let parka = library
        .read(CollectionId::Fw, |c| c.find_item("Moncler parka").is_some())
        .unwrap();
    assert!(!parka);
}

#[test]
fn hand_edited_artifact_names_rebuild_into_one_item() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    write(
        dir.path().join("page_items.json"),
        r#"{"page_1": ["i The Row brown tassel loafer"], "page_2": ["The Row brown tassel loafer"]}"#,
    )
    .unwrap();
    let library = open(&dir);
    library.repair(CollectionId::Summer).unwrap();

    let (count, pages) = library
        .read(CollectionId::Summer, |c| {
            let key = c.normalizer().clean("The Row brown tassel loafer").unwrap().key;
            (c.item_count(), c.pages_for_item(&key))
        })
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(pages, vec![PageId::new(1), PageId::new(2)]);
    let inverse = read_json(&dir.path().join("clothing_index.json"));
    assert_eq!(inverse.as_object().unwrap().len(), 1);
}

#[test]
fn opening_without_files_is_a_store_error() {
    let dir = TempDir::new().unwrap();
    let err = Library::open(CatalogConfig::default().with_data_dir(dir.path())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreIo);
}

#[test]
fn store_loads_single_collections_from_a_custom_config() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let config = CatalogConfig::default().with_data_dir(dir.path());
    let only_summer = config
        .clone()
        .with_collections(vec![config.collection(CollectionId::Summer).unwrap().clone()]);
    let library = Library::open(only_summer).unwrap();
    assert!(matches!(
        library.read(CollectionId::Spring, |c| c.item_count()),
        Err(CatalogError::CollectionNotLoaded { .. })
    ));

    let store = CollectionStore::new(config);
    let (forward, schema) = store.load(CollectionId::Spring).unwrap();
    assert!(schema.has_categories());
    assert_eq!(forward.len(), 2);
}
