//! Console rendering of catalog results.
//!
//! Each function returns the lines for one result set, every line ending in
//! a newline. An empty result renders as an empty string.

use crate::db::{
    AnimalFoodRank, AnimalSummary, CaretakerRank, CleanerRank, EmployeeEmail, HabitatName,
    SuppliedFood, SupplierPhone,
};
use crate::error::{Result, ZooError};

pub fn supplied_foods(rows: &[SuppliedFood]) -> String {
    rows.iter()
        .map(|r| {
            format!(
                "- Alimento: {}, Quantidade (kg): {:.2}\n",
                r.food_name, r.mass_kg
            )
        })
        .collect()
}

pub fn emails(rows: &[EmployeeEmail]) -> String {
    rows.iter().map(|r| format!("- Email: {}\n", r.email)).collect()
}

pub fn supplier_phone(phone: &SupplierPhone) -> String {
    format!("- Telefone: {}\n", phone.phone)
}

pub fn habitats(rows: &[HabitatName]) -> String {
    rows.iter().map(|r| format!("- Habitat: {}\n", r.name)).collect()
}

pub fn caretaker(rank: Option<&CaretakerRank>) -> String {
    rank.map(|r| format!("- Nome: {}, Animais Cuidados: {}\n", r.name, r.animal_count))
        .unwrap_or_default()
}

pub fn cleaners(rows: &[CleanerRank]) -> String {
    rows.iter()
        .map(|r| {
            format!(
                "- Nome: {:<15} | Habitats Higienizados: {}\n",
                r.name, r.habitat_count
            )
        })
        .collect()
}

pub fn animal_summary(rows: &[AnimalSummary]) -> String {
    rows.iter()
        .map(|r| {
            format!(
                "- ID: {}, Animal: {:<10}, Espécie: {:<20}, Habitat: {:<20}, Total Consumido: {:.2}\n",
                r.animal_id, r.animal_name, r.species, r.habitat, r.total_consumed
            )
        })
        .collect()
}

pub fn food_ranking(rows: &[AnimalFoodRank]) -> String {
    rows.iter()
        .map(|r| {
            format!(
                "- Animal: {:<10}, Alimento Principal: {:<18}, Fornecedor: {:<22}, Qtd: {:.2}\n",
                r.animal_name, r.food, r.supplier, r.quantity_consumed
            )
        })
        .collect()
}

/// A read that failed; `view` names the view the statement reads, if any.
pub fn read_failure(error: &ZooError, view: Option<&str>) -> String {
    match view {
        Some(view) => format!(
            "O erro '{}' ocorreu. Verifique se a visão '{view}' foi criada.\n",
            error.message()
        ),
        None => format!("O erro '{}' ocorreu\n", error.message()),
    }
}

/// Outcome of an `InserirAnimal` call.
pub fn procedure_outcome(name: &str, outcome: &Result<()>) -> String {
    match outcome {
        Ok(()) => format!("-> Sucesso! Animal '{name}' inserido.\n"),
        Err(e @ ZooError::Rejected { .. }) => {
            format!("-> Erro esperado! O banco de dados retornou: {}\n", e.message())
        }
        Err(e) => format!("-> Erro: {e}\n"),
    }
}

/// Outcome of a guarded quantity update.
pub fn trigger_outcome(product_id: i32, outcome: &Result<()>) -> String {
    match outcome {
        Ok(()) => format!("-> Sucesso! Quantidade do produto {product_id} atualizada.\n"),
        Err(e @ ZooError::Rejected { .. }) => {
            format!("-> Erro esperado! O gatilho impediu a operação: {}\n", e.message())
        }
        Err(e) => format!("-> Erro: {e}\n"),
    }
}
