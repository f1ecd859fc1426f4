//! Route handlers.
//!
//! Collection routes degrade to an empty array when the catalog fails.
//! Lookup, listing and write routes map failures to a status code.

use super::responses::{ActionResponse, ApiError, InsertResponse, MessageResponse};
use super::SharedCatalog;
use crate::db::{
    AnimalFoodRank, AnimalSummary, CaretakerRank, CleanerRank, Employee, EmployeeEmail, Habitat,
    HabitatName, NewAnimal, NewEmployee, NewHabitat, Product, QuantityUpdate, SuppliedFood,
    SupplierInfo, SupplierPhone,
};
use crate::error::{Result, ZooError};
use axum::extract::{Path, State};
use axum::Json;
use tracing::{info, warn};

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn or_empty<T>(route: &str, result: Result<Vec<T>>) -> Json<Vec<T>> {
    match result {
        Ok(rows) => Json(rows),
        Err(e) => {
            warn!("{route}: returning empty list after failure: {e}");
            Json(Vec::new())
        }
    }
}

fn or_status<T>(route: &str, result: Result<T>, not_found: &str) -> ApiResult<T> {
    result.map(Json).map_err(|e| {
        warn!("{route}: {e}");
        ApiError::from_catalog(&e, not_found)
    })
}

fn inserted(route: &str, result: Result<()>, message: &str) -> Json<InsertResponse> {
    Json(match result {
        Ok(()) => InsertResponse::Done {
            mensagem: message.to_string(),
        },
        Err(ZooError::Connection(e)) => {
            warn!("{route}: connection failure: {e}");
            InsertResponse::Done {
                mensagem: "Erro de conexão.".to_string(),
            }
        }
        Err(e) => {
            warn!("{route}: insert failed: {e}");
            InsertResponse::Failed {
                erro: e.message().to_string(),
            }
        }
    })
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("API do Zoológico está rodando!"))
}

pub async fn food_by_supplier(
    State(catalog): State<SharedCatalog>,
    Path(supplier_id): Path<i32>,
) -> Json<Vec<SuppliedFood>> {
    or_empty(
        "/fornecedor/:id/alimentos",
        catalog.food_by_supplier(supplier_id).await,
    )
}

pub async fn employee_emails(State(catalog): State<SharedCatalog>) -> Json<Vec<EmployeeEmail>> {
    or_empty("/funcionarios/emails", catalog.employee_emails().await)
}

pub async fn late_employees(State(catalog): State<SharedCatalog>) -> Json<Vec<EmployeeEmail>> {
    or_empty("/funcionarios/emails-tardios", catalog.late_employees().await)
}

pub async fn caretaker_ranking(State(catalog): State<SharedCatalog>) -> Json<Vec<CaretakerRank>> {
    or_empty("/cuidadores/ranking", catalog.caretaker_ranking().await)
}

pub async fn cleaner_ranking(State(catalog): State<SharedCatalog>) -> Json<Vec<CleanerRank>> {
    or_empty("/faxineiros/ranking", catalog.cleaner_ranking().await)
}

pub async fn list_habitats(State(catalog): State<SharedCatalog>) -> Json<Vec<Habitat>> {
    or_empty("/habitats", catalog.list_habitats().await)
}

pub async fn medicated_habitats(State(catalog): State<SharedCatalog>) -> Json<Vec<HabitatName>> {
    or_empty("/habitats/medicados", catalog.medicated_habitats().await)
}

pub async fn animal_summary(State(catalog): State<SharedCatalog>) -> Json<Vec<AnimalSummary>> {
    or_empty("/animais/resumo", catalog.animal_summary().await)
}

pub async fn animal_food_ranking(
    State(catalog): State<SharedCatalog>,
) -> Json<Vec<AnimalFoodRank>> {
    or_empty(
        "/animais/ranking-alimentos",
        catalog.animal_food_ranking(false).await,
    )
}

pub async fn supplier_info(
    State(catalog): State<SharedCatalog>,
    Path(supplier_id): Path<i32>,
) -> ApiResult<SupplierInfo> {
    or_status(
        "/fornecedor/:id/info",
        catalog.supplier_info(supplier_id).await,
        "Fornecedor não encontrado.",
    )
}

pub async fn primary_supplier_phone(
    State(catalog): State<SharedCatalog>,
    Path(animal_id): Path<i32>,
) -> ApiResult<SupplierPhone> {
    or_status(
        "/animal/:id/fornecedor-principal",
        catalog.primary_supplier_phone(animal_id).await,
        "Fornecedor principal não encontrado.",
    )
}

pub async fn list_employees(State(catalog): State<SharedCatalog>) -> ApiResult<Vec<Employee>> {
    or_status("/funcionarios", catalog.list_employees().await, "")
}

pub async fn list_products(State(catalog): State<SharedCatalog>) -> ApiResult<Vec<Product>> {
    or_status("/produtos", catalog.list_products().await, "")
}

pub async fn create_employee(
    State(catalog): State<SharedCatalog>,
    Json(employee): Json<NewEmployee>,
) -> Json<InsertResponse> {
    inserted(
        "POST /funcionarios",
        catalog.insert_employee(&employee).await,
        "Funcionário adicionado com sucesso!",
    )
}

pub async fn create_habitat(
    State(catalog): State<SharedCatalog>,
    Json(habitat): Json<NewHabitat>,
) -> Json<InsertResponse> {
    inserted(
        "POST /habitats",
        catalog.insert_habitat(&habitat).await,
        "Habitat adicionado com sucesso!",
    )
}

pub async fn create_animal(
    State(catalog): State<SharedCatalog>,
    Json(animal): Json<NewAnimal>,
) -> ApiResult<ActionResponse> {
    catalog.insert_animal(&animal).await.map_err(|e| {
        warn!("POST /animal/: {e}");
        ApiError::from_catalog(&e, "Habitat não encontrado.")
    })?;

    info!(name = %animal.name, "Animal inserted");
    Ok(Json(ActionResponse {
        msg: format!("Animal '{}' inserido com sucesso!", animal.name),
    }))
}

pub async fn update_product(
    State(catalog): State<SharedCatalog>,
    Json(update): Json<QuantityUpdate>,
) -> ApiResult<ActionResponse> {
    catalog.update_product_quantity(update).await.map_err(|e| {
        warn!("PUT /produto/: {e}");
        ApiError::from_catalog(&e, "Produto não encontrado.")
    })?;

    Ok(Json(ActionResponse {
        msg: format!(
            "Quantidade do produto {} atualizada com sucesso!",
            update.product_id
        ),
    }))
}
