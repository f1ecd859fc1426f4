//! Read operations against PostgreSQL.
//!
//! Tests the query catalog and both views over the seeded fixture, and checks
//! that the in-memory catalog answers the same way.

use super::support::get_test_store;
use pretty_assertions::assert_eq;
use zoo_reports::db::{MockCatalog, ZooCatalog};
use zoo_reports::error::ZooError;

#[tokio::test]
async fn test_ping() {
    let Some(store) = get_test_store().await else {
        return;
    };

    store.catalog.ping().await.unwrap();

    store.teardown().await;
}

#[tokio::test]
async fn test_food_by_supplier() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let mut foods: Vec<(String, f64)> = store
        .catalog
        .food_by_supplier(5)
        .await
        .unwrap()
        .into_iter()
        .map(|f| (f.food_name, f.mass_kg))
        .collect();
    foods.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        foods,
        vec![
            ("Carne bovina".to_string(), 25.0),
            ("Frango".to_string(), 10.5)
        ]
    );

    assert!(store.catalog.food_by_supplier(3).await.unwrap().is_empty());

    store.teardown().await;
}

#[tokio::test]
async fn test_late_employees_strictly_after_nine() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let emails: Vec<String> = store
        .catalog
        .late_employees()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.email)
        .collect();
    assert_eq!(emails, vec!["carla@zoo.br", "diego@zoo.br"]);

    store.teardown().await;
}

#[tokio::test]
async fn test_primary_supplier_phone() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let phone = store.catalog.primary_supplier_phone(4).await.unwrap();
    assert_eq!(phone.phone, "(61) 3333-0005");

    let err = store.catalog.primary_supplier_phone(5).await.unwrap_err();
    assert!(matches!(err, ZooError::NotFound(_)));

    store.teardown().await;
}

#[tokio::test]
async fn test_medicated_habitats_once_each() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let names: Vec<String> = store
        .catalog
        .medicated_habitats()
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.name)
        .collect();
    assert_eq!(names, vec!["Floresta Tropical", "Savana"]);

    store.teardown().await;
}

#[tokio::test]
async fn test_caretakers_count_distinct_animals() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let top = store.catalog.top_caretaker().await.unwrap().unwrap();
    assert_eq!((top.name.as_str(), top.animal_count), ("Bruno Lima", 3));

    let ranking = store.catalog.caretaker_ranking().await.unwrap();
    let ana = ranking.iter().find(|r| r.name == "Ana Souza").unwrap();
    assert_eq!(ana.animal_count, 2);

    store.teardown().await;
}

#[tokio::test]
async fn test_cleaner_ranking() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let ranking: Vec<(String, i64)> = store
        .catalog
        .cleaner_ranking()
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.name, r.habitat_count))
        .collect();
    assert_eq!(
        ranking,
        vec![
            ("Carla Dias".to_string(), 2),
            ("Ana Souza".to_string(), 1),
            ("Diego Alves".to_string(), 1),
        ]
    );

    store.teardown().await;
}

#[tokio::test]
async fn test_views() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let summary = store.catalog.animal_summary().await.unwrap();
    assert_eq!(summary.len(), 5);
    let nemo = summary.iter().find(|r| r.animal_name == "Nemo").unwrap();
    assert_eq!(nemo.products_consumed, 0);
    assert_eq!(nemo.total_consumed, 0.0);

    let top = store.catalog.animal_food_ranking(true).await.unwrap();
    assert_eq!(top.len(), 4);
    assert!(top.iter().all(|r| r.rank == 1));

    let all = store.catalog.animal_food_ranking(false).await.unwrap();
    assert_eq!(all.len(), 7);

    store.teardown().await;
}

#[tokio::test]
async fn test_supplier_info() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let info = store.catalog.supplier_info(5).await.unwrap();
    assert_eq!(info.name, "Nutri Fauna");
    assert_eq!(info.email, "pedidos@nutrifauna.com.br");

    let err = store.catalog.supplier_info(404).await.unwrap_err();
    assert!(matches!(err, ZooError::NotFound(_)));

    store.teardown().await;
}

#[tokio::test]
async fn test_mock_catalog_matches_store() {
    let Some(store) = get_test_store().await else {
        return;
    };
    let mock = MockCatalog::seeded();
    let pg = &store.catalog;

    let sorted = |mut foods: Vec<zoo_reports::db::SuppliedFood>| {
        foods.sort_by(|a, b| a.food_name.cmp(&b.food_name));
        foods
    };
    for supplier_id in [1, 2, 3, 5] {
        assert_eq!(
            sorted(pg.food_by_supplier(supplier_id).await.unwrap()),
            sorted(mock.food_by_supplier(supplier_id).await.unwrap())
        );
    }

    assert_eq!(
        pg.employee_emails().await.unwrap(),
        mock.employee_emails().await.unwrap()
    );
    assert_eq!(
        pg.late_employees().await.unwrap(),
        mock.late_employees().await.unwrap()
    );
    for animal_id in 1..=4 {
        assert_eq!(
            pg.primary_supplier_phone(animal_id).await.unwrap(),
            mock.primary_supplier_phone(animal_id).await.unwrap()
        );
    }
    assert_eq!(
        pg.medicated_habitats().await.unwrap(),
        mock.medicated_habitats().await.unwrap()
    );
    assert_eq!(
        pg.caretaker_ranking().await.unwrap(),
        mock.caretaker_ranking().await.unwrap()
    );
    assert_eq!(
        pg.cleaner_ranking().await.unwrap(),
        mock.cleaner_ranking().await.unwrap()
    );
    assert_eq!(
        pg.animal_summary().await.unwrap(),
        mock.animal_summary().await.unwrap()
    );
    assert_eq!(
        pg.animal_food_ranking(false).await.unwrap(),
        mock.animal_food_ranking(false).await.unwrap()
    );
    assert_eq!(
        pg.list_habitats().await.unwrap(),
        mock.list_habitats().await.unwrap()
    );
    assert_eq!(
        pg.list_employees().await.unwrap(),
        mock.list_employees().await.unwrap()
    );
    assert_eq!(
        pg.list_products().await.unwrap(),
        mock.list_products().await.unwrap()
    );

    store.teardown().await;
}
