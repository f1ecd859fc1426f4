//! Row and record types for catalog operations.
//!
//! Rust field names are English; the JSON wire names (and the view column
//! names they mirror) are kept through `serde` renames. SQL statements alias
//! their columns to the Rust field names so `sqlx::FromRow` maps them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A food supplied by a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SuppliedFood {
    #[serde(rename = "nome_alimento")]
    pub food_name: String,
    #[serde(rename = "quantidade_kg")]
    pub mass_kg: f64,
}

/// An employee e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeEmail {
    pub email: String,
}

/// A habitat name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HabitatName {
    #[serde(rename = "nome")]
    pub name: String,
}

/// A caretaker and the number of distinct animals they cared for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CaretakerRank {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "animais_cuidados")]
    pub animal_count: i64,
}

/// A cleaner and the number of distinct habitats they cleaned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CleanerRank {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "habitats_higienizados")]
    pub habitat_count: i64,
}

/// Contact details of a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SupplierInfo {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
}

/// Phone of the supplier behind an animal's primary food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SupplierPhone {
    #[serde(rename = "telefone")]
    pub phone: String,
}

/// A habitat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Habitat {
    #[serde(rename = "id_habitat")]
    pub id: i32,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "localizacao")]
    pub location: String,
    #[serde(rename = "temp_media")]
    pub average_temperature: f64,
}

/// An employee row. The admission date serializes as ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    #[serde(rename = "id_funcionario")]
    pub id: i32,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data_admissao")]
    pub admission_date: NaiveDate,
    pub cpf: String,
    pub email: String,
    #[serde(rename = "endereco")]
    pub address: String,
}

/// A product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    #[serde(rename = "id_produto")]
    pub id: i32,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: i32,
}

/// One row of the `vw_resumo_animal` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnimalSummary {
    #[serde(rename = "id_animal")]
    pub animal_id: i32,
    #[serde(rename = "nome_animal")]
    pub animal_name: String,
    #[serde(rename = "especie")]
    pub species: String,
    pub habitat: String,
    #[serde(rename = "tipo")]
    pub habitat_kind: String,
    #[serde(rename = "qtd_produtos_consumidos")]
    pub products_consumed: i64,
    #[serde(rename = "total_consumido")]
    pub total_consumed: f64,
}

/// One row of the `vw_ranking_alimentos_por_animal` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnimalFoodRank {
    #[serde(rename = "nome_animal")]
    pub animal_name: String,
    #[serde(rename = "especie")]
    pub species: String,
    #[serde(rename = "alimento")]
    pub food: String,
    #[serde(rename = "fornecedor")]
    pub supplier: String,
    #[serde(rename = "quantidade_consumida")]
    pub quantity_consumed: f64,
    #[serde(rename = "ranking_consumo")]
    pub rank: i64,
}

/// Fields of a new employee (`FuncionarioCreate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data_admissao")]
    pub admission_date: NaiveDate,
    pub cpf: String,
    pub email: String,
    #[serde(rename = "endereco")]
    pub address: String,
}

/// Fields of a new habitat (`HabitatCreate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHabitat {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "localizacao")]
    pub location: String,
    #[serde(rename = "temp_media")]
    pub average_temperature: f64,
}

/// Positional arguments of the `InserirAnimal` procedure (`AnimalIn`).
///
/// Field order is the procedure's argument order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnimal {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "especie")]
    pub species: String,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "dt_nasc")]
    pub birth_date: NaiveDate,
    #[serde(rename = "dt_entrada")]
    pub entry_date: NaiveDate,
    #[serde(rename = "peso")]
    pub weight: f64,
    #[serde(rename = "obs")]
    pub notes: String,
    #[serde(rename = "id_hab")]
    pub habitat_id: i32,
}

/// A requested product quantity change (`ProdutoUpdate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    #[serde(rename = "id_produto")]
    pub product_id: i32,
    #[serde(rename = "nova_quantidade")]
    pub new_quantity: i32,
}
