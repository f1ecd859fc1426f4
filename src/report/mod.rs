//! Console demonstration of the catalog.
//!
//! `run_demo` runs every query, both view reads, two `InserirAnimal` calls
//! (one accepted, one rejected for a missing habitat) and two quantity
//! updates (one accepted, one refused by the trigger), printing labelled
//! lines. Per-statement failures are printed and never abort the sequence.

pub mod render;

use crate::db::{NewAnimal, QuantityUpdate, ZooCatalog};
use crate::error::{Result, ZooError};
use chrono::NaiveDate;
use std::io::Write;
use tracing::{info, warn};

/// Supplier whose foods are listed.
pub const DEMO_SUPPLIER_ID: i32 = 5;
/// Animal whose primary supplier is looked up.
pub const DEMO_ANIMAL_ID: i32 = 4;
/// Product used by the trigger tests.
pub const DEMO_PRODUCT_ID: i32 = 1;
/// Accepted by the trigger.
pub const DEMO_VALID_QUANTITY: i32 = 80;
/// Refused by the trigger.
pub const DEMO_INVALID_QUANTITY: i32 = -10;

const ANIMAL_SUMMARY_VIEW: &str = "vw_resumo_animal";
const FOOD_RANKING_VIEW: &str = "vw_ranking_alimentos_por_animal";

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ZooError::internal(format!("invalid date {year}-{month}-{day}")))
}

/// The two animals the demonstration tries to insert, in order.
///
/// The second one points at habitat 99, which the procedure refuses.
pub fn demo_animals() -> Result<[NewAnimal; 2]> {
    Ok([
        NewAnimal {
            name: "Kion".to_string(),
            species: "Panthera leo".to_string(),
            sex: "M".to_string(),
            birth_date: ymd(2024, 5, 10)?,
            entry_date: ymd(2025, 7, 28)?,
            weight: 150.5,
            notes: "Filho de Simba".to_string(),
            habitat_id: 1,
        },
        NewAnimal {
            name: "Babu".to_string(),
            species: "Ursus arctos".to_string(),
            sex: "M".to_string(),
            birth_date: ymd(2024, 1, 10)?,
            entry_date: ymd(2025, 2, 1)?,
            weight: 300.0,
            notes: "Habitat inexistente".to_string(),
            habitat_id: 99,
        },
    ])
}

/// Writes a block of text, mapping I/O failures.
fn emit(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .map_err(|e| ZooError::internal(format!("Failed to write output: {e}")))
}

/// Renders a read result or its failure.
fn read_block<T>(
    result: Result<T>,
    label: &str,
    view: Option<&str>,
    render: impl FnOnce(&T) -> String,
) -> String {
    match result {
        Ok(rows) => render(&rows),
        Err(e) => {
            warn!("{label} failed: {e}");
            render::read_failure(&e, view)
        }
    }
}

/// Runs the demonstration against `catalog`, writing to `out`.
///
/// Only output failures are returned; catalog failures are printed. The
/// catalog is closed before the closing line is written.
pub async fn run_demo(catalog: &dyn ZooCatalog, out: &mut impl Write) -> Result<()> {
    if let Err(e) = catalog.ping().await {
        warn!("Connection check failed: {e}");
        emit(
            out,
            &format!("O erro '{}' ocorreu ao tentar conectar.\n", e.message()),
        )?;
        catalog.close().await;
        return Ok(());
    }
    emit(out, "Conexão com o PostgreSQL bem-sucedida!\n")?;
    info!("Running demonstration sequence");

    emit(out, "\n--- EXECUTANDO CONSULTAS ---\n")?;

    emit(
        out,
        &format!(
            "\n[CONSULTA 1] Alimentos fornecidos pelo fornecedor com ID {DEMO_SUPPLIER_ID}:\n"
        ),
    )?;
    let result = catalog.food_by_supplier(DEMO_SUPPLIER_ID).await;
    emit(
        out,
        &read_block(result, "food_by_supplier", None, |rows| {
            render::supplied_foods(rows)
        }),
    )?;

    emit(
        out,
        "\n[CONSULTA 2] Emails de funcionários que entraram após as 09:00:\n",
    )?;
    let result = catalog.late_employees().await;
    emit(
        out,
        &read_block(result, "late_employees", None, |rows| render::emails(rows)),
    )?;

    emit(
        out,
        &format!(
            "\n[CONSULTA 3] Telefone do fornecedor principal para o animal com ID {DEMO_ANIMAL_ID}:\n"
        ),
    )?;
    // No consumption rows prints nothing.
    let text = match catalog.primary_supplier_phone(DEMO_ANIMAL_ID).await {
        Ok(phone) => render::supplier_phone(&phone),
        Err(ZooError::NotFound(_)) => String::new(),
        Err(e) => {
            warn!("primary_supplier_phone failed: {e}");
            render::read_failure(&e, None)
        }
    };
    emit(out, &text)?;

    emit(
        out,
        "\n[CONSULTA 4] Habitats com animais que já foram medicados:\n",
    )?;
    let result = catalog.medicated_habitats().await;
    emit(
        out,
        &read_block(result, "medicated_habitats", None, |rows| {
            render::habitats(rows)
        }),
    )?;

    emit(
        out,
        "\n[CONSULTA 5] Cuidador com o maior número de animais diferentes cuidados:\n",
    )?;
    let result = catalog.top_caretaker().await;
    emit(
        out,
        &read_block(result, "top_caretaker", None, |top| {
            render::caretaker(top.as_ref())
        }),
    )?;

    emit(
        out,
        "\n[CONSULTA 6] Ranking de faxineiros por número de habitats limpos:\n",
    )?;
    let result = catalog.cleaner_ranking().await;
    emit(
        out,
        &read_block(result, "cleaner_ranking", None, |rows| render::cleaners(rows)),
    )?;

    emit(out, "\n\n--- LENDO DADOS DAS VISÕES ---\n")?;

    emit(
        out,
        &format!("\n[VISÃO 1] Lendo dados da '{ANIMAL_SUMMARY_VIEW}':\n"),
    )?;
    let result = catalog.animal_summary().await;
    emit(
        out,
        &read_block(result, "animal_summary", Some(ANIMAL_SUMMARY_VIEW), |rows| {
            render::animal_summary(rows)
        }),
    )?;

    emit(
        out,
        &format!("\n[VISÃO 2] Lendo dados da '{FOOD_RANKING_VIEW}':\n"),
    )?;
    let result = catalog.animal_food_ranking(true).await;
    emit(
        out,
        &read_block(result, "animal_food_ranking", Some(FOOD_RANKING_VIEW), |rows| {
            render::food_ranking(rows)
        }),
    )?;

    emit(out, "\n\n--- EXECUTANDO PROCEDURE E TESTANDO TRIGGER ---\n")?;

    for animal in demo_animals()? {
        emit(
            out,
            &format!("\n[PROCEDURE] Tentando inserir o animal '{}'...\n", animal.name),
        )?;
        let outcome = catalog.insert_animal(&animal).await;
        if let Err(e) = &outcome {
            info!("InserirAnimal refused '{}': {e}", animal.name);
        }
        emit(out, &render::procedure_outcome(&animal.name, &outcome))?;
    }

    for new_quantity in [DEMO_VALID_QUANTITY, DEMO_INVALID_QUANTITY] {
        let update = QuantityUpdate {
            product_id: DEMO_PRODUCT_ID,
            new_quantity,
        };
        emit(
            out,
            &format!(
                "\n[TRIGGER] Tentando atualizar produto ID {} para a quantidade {}...\n",
                update.product_id, update.new_quantity
            ),
        )?;
        let outcome = catalog.update_product_quantity(update).await;
        if let Err(e) = &outcome {
            info!("Quantity update refused: {e}");
        }
        emit(out, &render::trigger_outcome(update.product_id, &outcome))?;
    }

    catalog.close().await;
    emit(out, "\n\n>>> Conexão com o PostgreSQL foi fechada.\n")?;
    out.flush()
        .map_err(|e| ZooError::internal(format!("Failed to write output: {e}")))
}
