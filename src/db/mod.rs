//! Database layer for the zoo reporting tools.
//!
//! Provides the `ZooCatalog` trait, the fixed set of parameterized read and
//! write operations over the zoo schema, with a PostgreSQL implementation and
//! in-memory implementations for tests and offline use.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingCatalog, MockCatalog};
pub use postgres::PgCatalog;
pub use types::{
    AnimalFoodRank, AnimalSummary, CaretakerRank, CleanerRank, Employee, EmployeeEmail, Habitat,
    HabitatName, NewAnimal, NewEmployee, NewHabitat, Product, QuantityUpdate, SuppliedFood,
    SupplierInfo, SupplierPhone,
};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Creates the PostgreSQL catalog for the given configuration.
///
/// The pool connects lazily: a store that is down surfaces as a
/// `Connection` error from the first operation, not from this call.
pub fn connect(config: &ConnectionConfig) -> Result<PgCatalog> {
    PgCatalog::connect(config)
}

/// Opens the catalog the binary runs against: the seeded in-memory one for
/// `--mock-db`, otherwise PostgreSQL. Call it from inside the runtime.
pub fn open_catalog(mock: bool, config: &ConnectionConfig) -> Result<Arc<dyn ZooCatalog>> {
    if mock {
        info!("Using in-memory mock catalog");
        return Ok(Arc::new(MockCatalog::seeded()));
    }

    info!("Connection: {}", config.display_string());
    Ok(Arc::new(connect(config)?))
}

/// The fixed catalog of operations over the zoo schema.
///
/// Every operation runs exactly one statement on one pooled connection.
/// Business rules owned by the store (the `InserirAnimal` habitat check and
/// the `Produto.quantidade` trigger) surface as `ZooError::Rejected`.
#[async_trait]
pub trait ZooCatalog: Send + Sync {
    /// Foods (name and mass) supplied by the given supplier. Unordered.
    async fn food_by_supplier(&self, supplier_id: i32) -> Result<Vec<SuppliedFood>>;

    /// Every employee e-mail.
    async fn employee_emails(&self) -> Result<Vec<EmployeeEmail>>;

    /// E-mails of employees whose shift started strictly after 09:00:00.
    async fn late_employees(&self) -> Result<Vec<EmployeeEmail>>;

    /// Phone of the supplier of the food the animal consumed the most.
    ///
    /// Returns `NotFound` when the animal has no consumption rows.
    async fn primary_supplier_phone(&self, animal_id: i32) -> Result<SupplierPhone>;

    /// Habitats holding at least one animal with a prescription, once each.
    async fn medicated_habitats(&self) -> Result<Vec<HabitatName>>;

    /// The caretaker with the most distinct animals, if anyone cared for any.
    async fn top_caretaker(&self) -> Result<Option<CaretakerRank>>;

    /// Every caretaker ranked by distinct animals cared for.
    async fn caretaker_ranking(&self) -> Result<Vec<CaretakerRank>>;

    /// Every cleaner ranked by distinct habitats cleaned.
    async fn cleaner_ranking(&self) -> Result<Vec<CleanerRank>>;

    /// All rows of `vw_resumo_animal`.
    async fn animal_summary(&self) -> Result<Vec<AnimalSummary>>;

    /// Rows of `vw_ranking_alimentos_por_animal`; only rank 1 when `top_only`.
    async fn animal_food_ranking(&self, top_only: bool) -> Result<Vec<AnimalFoodRank>>;

    /// All habitats.
    async fn list_habitats(&self) -> Result<Vec<Habitat>>;

    /// All employees.
    async fn list_employees(&self) -> Result<Vec<Employee>>;

    /// All products.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Contact details of a supplier, `NotFound` if the id is unknown.
    async fn supplier_info(&self, supplier_id: i32) -> Result<SupplierInfo>;

    /// Inserts an employee.
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<()>;

    /// Inserts a habitat.
    async fn insert_habitat(&self, habitat: &NewHabitat) -> Result<()>;

    /// Inserts an animal through the `InserirAnimal` procedure.
    async fn insert_animal(&self, animal: &NewAnimal) -> Result<()>;

    /// Sets a product quantity, subject to the store's trigger.
    async fn update_product_quantity(&self, update: QuantityUpdate) -> Result<()>;

    /// Checks that a connection can be acquired, without running a statement.
    async fn ping(&self) -> Result<()>;

    /// Releases every connection held by the catalog.
    async fn close(&self);
}
