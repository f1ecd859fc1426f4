//! Write operations against PostgreSQL.
//!
//! Tests direct inserts, the `InserirAnimal` procedure and the trigger on
//! `Produto.quantidade`.

use super::support::get_test_store;
use chrono::NaiveDate;
use zoo_reports::db::{NewAnimal, NewEmployee, NewHabitat, QuantityUpdate, ZooCatalog};
use zoo_reports::error::{RejectionRule, ZooError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn animal(name: &str, habitat_id: i32) -> NewAnimal {
    NewAnimal {
        name: name.to_string(),
        species: "Panthera leo".to_string(),
        sex: "M".to_string(),
        birth_date: date(2024, 5, 10),
        entry_date: date(2025, 7, 28),
        weight: 150.5,
        notes: "Filho de Simba".to_string(),
        habitat_id,
    }
}

#[tokio::test]
async fn test_insert_animal_through_procedure() {
    let Some(store) = get_test_store().await else {
        return;
    };

    store.catalog.insert_animal(&animal("Kion", 1)).await.unwrap();
    assert_eq!(store.count("animal").await, 6);

    let summary = store.catalog.animal_summary().await.unwrap();
    let kion = summary.iter().find(|r| r.animal_name == "Kion").unwrap();
    assert_eq!(kion.habitat, "Savana");

    store.teardown().await;
}

#[tokio::test]
async fn test_insert_animal_missing_habitat_is_rejected() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let err = store
        .catalog
        .insert_animal(&animal("Babu", 99))
        .await
        .unwrap_err();

    match err {
        ZooError::Rejected { rule, message } => {
            assert_eq!(rule, RejectionRule::Procedure);
            assert!(message.contains("99"), "unexpected message: {message}");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(store.count("animal").await, 5);

    store.teardown().await;
}

#[tokio::test]
async fn test_quantity_update_guarded_by_trigger() {
    let Some(store) = get_test_store().await else {
        return;
    };

    store
        .catalog
        .update_product_quantity(QuantityUpdate {
            product_id: 1,
            new_quantity: 80,
        })
        .await
        .unwrap();
    assert_eq!(store.product_quantity(1).await, 80);

    let err = store
        .catalog
        .update_product_quantity(QuantityUpdate {
            product_id: 1,
            new_quantity: -10,
        })
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ZooError::Rejected {
                rule: RejectionRule::Trigger,
                ..
            }
        ),
        "unexpected error: {err:?}"
    );
    assert_eq!(store.product_quantity(1).await, 80);

    store.teardown().await;
}

#[tokio::test]
async fn test_quantity_update_missing_product() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let err = store
        .catalog
        .update_product_quantity(QuantityUpdate {
            product_id: 42,
            new_quantity: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::NotFound(_)));

    store.teardown().await;
}

#[tokio::test]
async fn test_insert_habitat_then_list() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let new = NewHabitat {
        name: "Pântano".to_string(),
        kind: "Alagado".to_string(),
        location: "Setor Oeste".to_string(),
        average_temperature: 26.5,
    };
    store.catalog.insert_habitat(&new).await.unwrap();

    let habitats = store.catalog.list_habitats().await.unwrap();
    let stored = habitats.iter().find(|h| h.name == "Pântano").unwrap();
    assert_eq!(stored.kind, new.kind);
    assert_eq!(stored.location, new.location);
    assert_eq!(stored.average_temperature, new.average_temperature);

    store.teardown().await;
}

#[tokio::test]
async fn test_insert_employee_duplicate_cpf() {
    let Some(store) = get_test_store().await else {
        return;
    };

    let employee = NewEmployee {
        name: "Eva Rocha".to_string(),
        admission_date: date(2025, 7, 29),
        cpf: "555.555.555-55".to_string(),
        email: "eva@zoo.br".to_string(),
        address: "Rua Nova, 1".to_string(),
    };
    store.catalog.insert_employee(&employee).await.unwrap();

    let err = store.catalog.insert_employee(&employee).await.unwrap_err();
    match err {
        ZooError::Statement(message) => {
            assert!(message.contains("funcionario_cpf_key"), "{message}");
        }
        other => panic!("expected statement error, got {other:?}"),
    }

    let employees = store.catalog.list_employees().await.unwrap();
    assert_eq!(employees.len(), 5);
    assert_eq!(employees[4].admission_date, date(2025, 7, 29));

    store.teardown().await;
}
