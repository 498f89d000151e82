use neo_catalog::config::RefreshConfig;
use neo_catalog::datasource::MockNeoSource;
use neo_catalog::db::init_db;
use neo_catalog::domain::{
    CatalogItem, FilterSpec, HazardFilter, Neo, Owner, PageRequest, SortBy, Valuation,
};
use neo_catalog::{CacheCoordinator, CatalogError, CatalogQueryService, CatalogStore, Repository};
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    repo: Arc<Repository>,
    source: Arc<MockNeoSource>,
    query: CatalogQueryService,
    _temp: TempDir,
}

async fn setup(source: MockNeoSource) -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let source = Arc::new(source);

    let coordinator = Arc::new(CacheCoordinator::new(
        source.clone(),
        repo.clone(),
        repo.clone(),
        RefreshConfig::default(),
    ));
    let query = CatalogQueryService::new(repo.clone(), repo.clone(), coordinator);

    Harness {
        repo,
        source,
        query,
        _temp: temp_dir,
    }
}

fn raw_neo(id: &str, hazardous: bool, miss_km: f64, orbit_class: Option<&str>) -> Neo {
    let mut value = serde_json::json!({
        "id": id,
        "neo_reference_id": id,
        "name": format!("({})", id),
        "nasa_jpl_url": format!("https://ssd.jpl.nasa.gov/?sstr={}", id),
        "absolute_magnitude_h": 20.1,
        "estimated_diameter": { "kilometers": {
            "estimated_diameter_min": 0.1,
            "estimated_diameter_max": 0.3
        }},
        "is_potentially_hazardous_asteroid": hazardous,
        "close_approach_data": [{
            "close_approach_date": "2024-06-08",
            "relative_velocity": { "kilometers_per_second": "9.0" },
            "miss_distance": { "kilometers": miss_km.to_string() },
            "orbiting_body": "Earth"
        }],
        "is_sentry_object": false
    });
    if let Some(class) = orbit_class {
        value["orbital_data"] = serde_json::json!({
            "orbit_class": { "orbit_class_type": class }
        });
    }
    serde_json::from_value(value).unwrap()
}

fn item(
    id: &str,
    size: f64,
    price: i64,
    miss_km: f64,
    hazardous: bool,
    orbit_class: Option<&str>,
) -> CatalogItem {
    CatalogItem::from_neo(
        raw_neo(id, hazardous, miss_km, orbit_class),
        Valuation { price, size },
    )
}

async fn seed_abc(repo: &Repository) {
    let items = [
        item("A", 50.0, 200, 1000.0, false, Some("APO")),
        item("B", 80.0, 150, 500.0, true, Some("AMO")),
        item("C", 30.0, 900, 2000.0, false, None),
    ];
    for it in &items {
        repo.upsert_item(it).await.unwrap();
    }
}

fn ids(entries: &[neo_catalog::CatalogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.item.id.as_str()).collect()
}

#[tokio::test]
async fn test_list_sorts_by_price() {
    let h = setup(MockNeoSource::new()).await;
    seed_abc(&h.repo).await;

    let filters = FilterSpec {
        sort_by: Some(SortBy::PriceAsc),
        ..Default::default()
    };
    let result = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &filters)
        .await
        .unwrap();

    assert_eq!(ids(&result.items), vec!["B", "A", "C"]);
    assert_eq!(result.total_count, 3);
    assert_eq!(result.total_pages, 1);
    assert_eq!(h.source.range_calls(), 0);
}

#[tokio::test]
async fn test_list_without_sort_keeps_store_order() {
    let h = setup(MockNeoSource::new()).await;
    seed_abc(&h.repo).await;

    let result = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &FilterSpec::default())
        .await
        .unwrap();

    assert_eq!(ids(&result.items), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_list_filters_hazardous() {
    let h = setup(MockNeoSource::new()).await;
    seed_abc(&h.repo).await;

    let filters = FilterSpec {
        hazardous: HazardFilter::Hazardous,
        ..Default::default()
    };
    let result = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &filters)
        .await
        .unwrap();
    assert_eq!(ids(&result.items), vec!["B"]);

    let filters = FilterSpec {
        hazardous: HazardFilter::NotHazardous,
        ..Default::default()
    };
    let result = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &filters)
        .await
        .unwrap();
    assert_eq!(ids(&result.items), vec!["A", "C"]);
}

#[tokio::test]
async fn test_distance_filter_counts_after_filtering() {
    let h = setup(MockNeoSource::new()).await;
    seed_abc(&h.repo).await;

    let filters = FilterSpec {
        distance_max: Some(1000.0),
        ..Default::default()
    };
    let result = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &filters)
        .await
        .unwrap();

    assert_eq!(ids(&result.items), vec!["A", "B"]);
    assert_eq!(result.total_count, 2);
    assert_eq!(result.total_pages, 1);
}

#[tokio::test]
async fn test_size_price_and_orbit_filters_combine() {
    let h = setup(MockNeoSource::new()).await;
    seed_abc(&h.repo).await;

    let filters = FilterSpec {
        size_min: Some(40.0),
        price_max: Some(900.0),
        orbit_types: vec!["apo".to_string(), "ATE".to_string()],
        ..Default::default()
    };
    let result = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &filters)
        .await
        .unwrap();

    assert_eq!(ids(&result.items), vec!["A"]);
}

#[tokio::test]
async fn test_pagination_slices_pages() {
    let h = setup(MockNeoSource::new()).await;
    for i in 1..=25 {
        let it = item(&format!("neo-{:02}", i), 100.0, 100 + i, 1000.0, false, None);
        h.repo.upsert_item(&it).await.unwrap();
    }

    let first = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &FilterSpec::default())
        .await
        .unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].item.id, "neo-01");
    assert_eq!(first.items[9].item.id, "neo-10");
    assert_eq!(first.total_count, 25);
    assert_eq!(first.total_pages, 3);

    let last = h
        .query
        .list(PageRequest::new(3, 10).unwrap(), &FilterSpec::default())
        .await
        .unwrap();
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.items[0].item.id, "neo-21");
    assert_eq!(last.page, 3);

    let beyond = h
        .query
        .list(PageRequest::new(4, 10).unwrap(), &FilterSpec::default())
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_count, 25);
}

#[tokio::test]
async fn test_invalid_filters_rejected_before_any_work() {
    let h = setup(MockNeoSource::new()).await;

    let filters = FilterSpec {
        price_min: Some(500.0),
        price_max: Some(100.0),
        ..Default::default()
    };
    let err = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &filters)
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Validation(_)));
    assert_eq!(h.source.range_calls(), 0);
}

#[tokio::test]
async fn test_empty_catalog_populated_on_first_list() {
    let source = MockNeoSource::new().with_chunk(vec![
        raw_neo("n1", false, 1000.0, None),
        raw_neo("n2", true, 2000.0, None),
    ]);
    let h = setup(source).await;

    let result = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &FilterSpec::default())
        .await
        .unwrap();

    assert_eq!(result.total_count, 2);
    assert_eq!(h.source.range_calls(), 5);

    h.query
        .list(PageRequest::new(1, 10).unwrap(), &FilterSpec::default())
        .await
        .unwrap();
    assert_eq!(h.source.range_calls(), 5);
}

#[tokio::test]
async fn test_get_by_id_fetches_once_on_miss() {
    let source = MockNeoSource::new().with_record(raw_neo("3542519", true, 750.0, Some("APO")));
    let h = setup(source).await;

    let entry = h.query.get_by_id("3542519").await.unwrap();
    assert_eq!(h.source.neo_calls(), 1);
    assert!((100..=900).contains(&entry.item.price));
    assert!((entry.item.size - 200.0).abs() < 1e-9);
    assert!(entry.owner.is_none());

    let stored = h.repo.get_item("3542519").await.unwrap().unwrap();
    assert_eq!(stored, entry.item);

    let again = h.query.get_by_id("3542519").await.unwrap();
    assert_eq!(h.source.neo_calls(), 1);
    assert_eq!(again.item, entry.item);
}

#[tokio::test]
async fn test_get_by_id_unknown_and_blank() {
    let h = setup(MockNeoSource::new()).await;

    let err = h.query.get_by_id("no-such-id").await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
    assert!(h.repo.get_item("no-such-id").await.unwrap().is_none());

    let err = h.query.get_by_id("  ").await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[tokio::test]
async fn test_owner_attached_on_reads() {
    let h = setup(MockNeoSource::new()).await;
    seed_abc(&h.repo).await;

    let owner = Owner {
        user_id: "user-42".to_string(),
        display_name: "Ada".to_string(),
    };
    h.repo.assign_owner("A", &owner).await.unwrap();

    let entry = h.query.get_by_id("A").await.unwrap();
    assert_eq!(entry.owner, Some(owner.clone()));
    assert!(h.query.get_by_id("B").await.unwrap().owner.is_none());

    let page = h
        .query
        .list(PageRequest::new(1, 10).unwrap(), &FilterSpec::default())
        .await
        .unwrap();
    let owners: Vec<Option<&str>> = page
        .items
        .iter()
        .map(|e| e.owner.as_ref().map(|o| o.user_id.as_str()))
        .collect();
    assert_eq!(owners, vec![Some("user-42"), None, None]);

    assert!(h.repo.clear_owner("A").await.unwrap());
    assert!(h.query.get_by_id("A").await.unwrap().owner.is_none());
}
