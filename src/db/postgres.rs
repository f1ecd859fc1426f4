//! PostgreSQL catalog implementation.
//!
//! Provides the `PgCatalog` struct that implements the `ZooCatalog` trait
//! over the zoo schema using sqlx. Every operation acquires one pooled
//! connection, binds its parameters, runs a single statement and releases the
//! connection when the guard drops.

use crate::config::{ConnectionConfig, DEFAULT_HOST};
use crate::db::{
    AnimalFoodRank, AnimalSummary, CaretakerRank, CleanerRank, Employee, EmployeeEmail, Habitat,
    HabitatName, NewAnimal, NewEmployee, NewHabitat, Product, QuantityUpdate, SuppliedFood,
    SupplierInfo, SupplierPhone, ZooCatalog,
};
use crate::error::{RejectionRule, Result, ZooError};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Postgres;
use tracing::{debug, warn};

/// Where the pool points, kept for error messages.
#[derive(Debug, Clone)]
struct ConnectionTarget {
    host: String,
    port: u16,
    user: String,
    database: String,
}

impl From<&ConnectionConfig> for ConnectionTarget {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            host: config.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: config.port(),
            user: config.user.clone().unwrap_or_else(|| "unknown".to_string()),
            database: config.database.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// PostgreSQL-backed catalog.
#[derive(Debug)]
pub struct PgCatalog {
    pool: PgPool,
    target: ConnectionTarget,
}

impl PgCatalog {
    /// Builds a lazily-connecting pool for the given configuration.
    ///
    /// Must be called from inside a Tokio runtime: the pool spawns its
    /// maintenance task on creation.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = config.to_connect_options()?;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(ZooError::internal(
                "The connection pool must be created inside a Tokio runtime",
            ));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(options);

        debug!("Created connection pool for {}", config.display_string());

        Ok(Self {
            pool,
            target: ConnectionTarget::from(config),
        })
    }

    /// Acquires one pooled connection. It returns to the pool on drop.
    async fn acquire(&self) -> Result<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| map_connection_error(e, &self.target))
    }
}

#[async_trait]
impl ZooCatalog for PgCatalog {
    async fn food_by_supplier(&self, supplier_id: i32) -> Result<Vec<SuppliedFood>> {
        let mut conn = self.acquire().await?;
        debug!(supplier_id, "Fetching foods by supplier");

        sqlx::query_as::<_, SuppliedFood>(
            r#"
            SELECT p.nome AS food_name, a.massa::float8 AS mass_kg
            FROM Proporciona pr
            JOIN Produto p ON pr.id_produto = p.id_produto
            JOIN Alimento a ON p.id_produto = a.id_produto
            WHERE pr.id_fornecedor = $1
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn employee_emails(&self) -> Result<Vec<EmployeeEmail>> {
        let mut conn = self.acquire().await?;
        debug!("Fetching employee e-mails");

        sqlx::query_as::<_, EmployeeEmail>(
            "SELECT email FROM Funcionario ORDER BY id_funcionario",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn late_employees(&self) -> Result<Vec<EmployeeEmail>> {
        let mut conn = self.acquire().await?;
        debug!("Fetching employees entering after 09:00");

        sqlx::query_as::<_, EmployeeEmail>(
            r#"
            SELECT DISTINCT f.email
            FROM Jornada j
            JOIN Funcionario f ON j.id_funcionario = f.id_funcionario
            WHERE j.hora_entrada > TIME '09:00:00'
            ORDER BY f.email
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn primary_supplier_phone(&self, animal_id: i32) -> Result<SupplierPhone> {
        let mut conn = self.acquire().await?;
        debug!(animal_id, "Fetching primary supplier phone");

        sqlx::query_as::<_, SupplierPhone>(
            r#"
            SELECT fo.telefone AS phone
            FROM Consome c
            JOIN Alimento a ON c.id_produto = a.id_produto
            JOIN Proporciona pr ON a.id_produto = pr.id_produto
            JOIN Fornecedor fo ON pr.id_fornecedor = fo.id_fornecedor
            WHERE c.id_animal = $1
            ORDER BY c.quantidade_consumida DESC, fo.id_fornecedor ASC
            LIMIT 1
            "#,
        )
        .bind(animal_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))?
        .ok_or_else(|| ZooError::not_found(format!("No primary supplier for animal {animal_id}")))
    }

    async fn medicated_habitats(&self) -> Result<Vec<HabitatName>> {
        let mut conn = self.acquire().await?;
        debug!("Fetching habitats with medicated animals");

        sqlx::query_as::<_, HabitatName>(
            r#"
            SELECT DISTINCT h.nome AS name
            FROM Habitat h
            JOIN Animal a ON h.id_habitat = a.id_habitat
            WHERE EXISTS (
                SELECT 1
                FROM Prescreve p
                WHERE p.id_animal = a.id_animal
            )
            ORDER BY h.nome
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn top_caretaker(&self) -> Result<Option<CaretakerRank>> {
        let mut conn = self.acquire().await?;
        debug!("Fetching top caretaker");

        sqlx::query_as::<_, CaretakerRank>(
            r#"
            SELECT f.nome AS name, COUNT(DISTINCT c.id_animal) AS animal_count
            FROM Cuida c
            JOIN Funcionario f ON f.id_funcionario = c.id_funcionario
            GROUP BY f.id_funcionario, f.nome
            ORDER BY animal_count DESC, f.nome ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn caretaker_ranking(&self) -> Result<Vec<CaretakerRank>> {
        let mut conn = self.acquire().await?;
        debug!("Fetching caretaker ranking");

        sqlx::query_as::<_, CaretakerRank>(
            r#"
            SELECT f.nome AS name, COUNT(DISTINCT c.id_animal) AS animal_count
            FROM Cuida c
            JOIN Funcionario f ON f.id_funcionario = c.id_funcionario
            GROUP BY f.id_funcionario, f.nome
            ORDER BY animal_count DESC, f.nome ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn cleaner_ranking(&self) -> Result<Vec<CleanerRank>> {
        let mut conn = self.acquire().await?;
        debug!("Fetching cleaner ranking");

        sqlx::query_as::<_, CleanerRank>(
            r#"
            SELECT f.nome AS name, COUNT(DISTINCT h.id_habitat) AS habitat_count
            FROM Higieniza h
            JOIN Funcionario f ON h.id_funcionario = f.id_funcionario
            GROUP BY f.id_funcionario, f.nome
            ORDER BY habitat_count DESC, f.nome ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn animal_summary(&self) -> Result<Vec<AnimalSummary>> {
        let mut conn = self.acquire().await?;
        debug!("Reading vw_resumo_animal");

        sqlx::query_as::<_, AnimalSummary>(
            r#"
            SELECT
                id_animal AS animal_id,
                nome_animal AS animal_name,
                especie AS species,
                habitat,
                tipo AS habitat_kind,
                qtd_produtos_consumidos::int8 AS products_consumed,
                COALESCE(total_consumido, 0)::float8 AS total_consumed
            FROM vw_resumo_animal
            ORDER BY id_animal
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn animal_food_ranking(&self, top_only: bool) -> Result<Vec<AnimalFoodRank>> {
        let mut conn = self.acquire().await?;
        debug!(top_only, "Reading vw_ranking_alimentos_por_animal");

        sqlx::query_as::<_, AnimalFoodRank>(
            r#"
            SELECT
                nome_animal AS animal_name,
                especie AS species,
                alimento AS food,
                fornecedor AS supplier,
                quantidade_consumida::float8 AS quantity_consumed,
                ranking_consumo::int8 AS rank
            FROM vw_ranking_alimentos_por_animal
            WHERE NOT $1 OR ranking_consumo = 1
            ORDER BY nome_animal, ranking_consumo
            "#,
        )
        .bind(top_only)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn list_habitats(&self) -> Result<Vec<Habitat>> {
        let mut conn = self.acquire().await?;
        debug!("Listing habitats");

        sqlx::query_as::<_, Habitat>(
            r#"
            SELECT
                id_habitat AS id,
                nome AS name,
                tipo AS kind,
                localizacao AS location,
                temp_media::float8 AS average_temperature
            FROM Habitat
            ORDER BY id_habitat
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn list_employees(&self) -> Result<Vec<Employee>> {
        let mut conn = self.acquire().await?;
        debug!("Listing employees");

        sqlx::query_as::<_, Employee>(
            r#"
            SELECT
                id_funcionario AS id,
                nome AS name,
                data_admissao AS admission_date,
                cpf,
                email,
                endereco AS address
            FROM Funcionario
            ORDER BY id_funcionario
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let mut conn = self.acquire().await?;
        debug!("Listing products");

        sqlx::query_as::<_, Product>(
            "SELECT id_produto AS id, nome AS name, quantidade AS quantity FROM Produto ORDER BY id_produto",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))
    }

    async fn supplier_info(&self, supplier_id: i32) -> Result<SupplierInfo> {
        let mut conn = self.acquire().await?;
        debug!(supplier_id, "Fetching supplier info");

        sqlx::query_as::<_, SupplierInfo>(
            r#"
            SELECT nome AS name, email, telefone AS phone
            FROM Fornecedor
            WHERE id_fornecedor = $1
            "#,
        )
        .bind(supplier_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))?
        .ok_or_else(|| ZooError::not_found(format!("Supplier {supplier_id} not found")))
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> Result<()> {
        let mut conn = self.acquire().await?;
        debug!(cpf = %employee.cpf, "Inserting employee");

        sqlx::query(
            r#"
            INSERT INTO Funcionario (nome, data_admissao, cpf, email, endereco)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&employee.name)
        .bind(employee.admission_date)
        .bind(&employee.cpf)
        .bind(&employee.email)
        .bind(&employee.address)
        .execute(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))?;

        Ok(())
    }

    async fn insert_habitat(&self, habitat: &NewHabitat) -> Result<()> {
        let mut conn = self.acquire().await?;
        debug!(name = %habitat.name, "Inserting habitat");

        sqlx::query(
            r#"
            INSERT INTO Habitat (nome, tipo, localizacao, temp_media)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&habitat.name)
        .bind(&habitat.kind)
        .bind(&habitat.location)
        .bind(habitat.average_temperature)
        .execute(&mut *conn)
        .await
        .map_err(|e| classify_error(e, None))?;

        Ok(())
    }

    async fn insert_animal(&self, animal: &NewAnimal) -> Result<()> {
        let mut conn = self.acquire().await?;
        debug!(name = %animal.name, habitat_id = animal.habitat_id, "Calling InserirAnimal");

        // Positional arguments, in the procedure's declared order.
        sqlx::query("SELECT InserirAnimal($1, $2, $3, $4, $5, $6::numeric, $7, $8)")
            .bind(&animal.name)
            .bind(&animal.species)
            .bind(&animal.sex)
            .bind(animal.birth_date)
            .bind(animal.entry_date)
            .bind(animal.weight)
            .bind(&animal.notes)
            .bind(animal.habitat_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| classify_error(e, Some(RejectionRule::Procedure)))?;

        Ok(())
    }

    async fn update_product_quantity(&self, update: QuantityUpdate) -> Result<()> {
        let mut conn = self.acquire().await?;
        debug!(
            product_id = update.product_id,
            new_quantity = update.new_quantity,
            "Updating product quantity"
        );

        // One statement reports both whether the product exists and whether
        // the trigger let the row through (a BEFORE trigger may return NULL).
        let (existing, updated): (i64, i64) = sqlx::query_as(
            r#"
            WITH target AS (
                SELECT id_produto FROM Produto WHERE id_produto = $2
            ), changed AS (
                UPDATE Produto SET quantidade = $1 WHERE id_produto = $2
                RETURNING id_produto
            )
            SELECT
                (SELECT COUNT(*) FROM target) AS existing,
                (SELECT COUNT(*) FROM changed) AS updated
            "#,
        )
        .bind(update.new_quantity)
        .bind(update.product_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| classify_error(e, Some(RejectionRule::Trigger)))?;

        settle_quantity_update(update, existing, updated)
    }

    async fn ping(&self) -> Result<()> {
        self.acquire().await.map(drop)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Turns the row counts of a guarded update into its outcome.
fn settle_quantity_update(update: QuantityUpdate, existing: i64, updated: i64) -> Result<()> {
    if existing == 0 {
        return Err(ZooError::not_found(format!(
            "Product {} not found",
            update.product_id
        )));
    }
    if updated == 0 {
        warn!(
            product_id = update.product_id,
            "Trigger skipped quantity update without raising"
        );
        return Err(ZooError::rejected(
            RejectionRule::Trigger,
            format!(
                "Quantity {} refused for product {}",
                update.new_quantity, update.product_id
            ),
        ));
    }
    Ok(())
}

/// Maps errors raised while executing a statement.
///
/// `guarded_by` names the store-side rule that may legitimately refuse the
/// statement; its refusals become `Rejected` instead of `Statement`.
fn classify_error(error: sqlx::Error, guarded_by: Option<RejectionRule>) -> ZooError {
    match error {
        sqlx::Error::Database(ref db_error) => {
            let code = db_error.code();
            classify_database_error(code.as_deref(), guarded_by)
                .map(|rule| ZooError::rejected(rule, db_error.message()))
                .unwrap_or_else(|| {
                    if code.as_deref().is_some_and(is_connection_state) {
                        ZooError::connection(db_error.message())
                    } else {
                        ZooError::statement(format_statement_error(&error))
                    }
                })
        }
        sqlx::Error::RowNotFound => ZooError::not_found("No rows returned"),
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Configuration(_) => ZooError::connection(error.to_string()),
        other => ZooError::statement(other.to_string()),
    }
}

/// Decides whether a SQLSTATE is a refusal by the guarding rule.
///
/// Class `P0` is PL/pgSQL `RAISE`; class `23` covers integrity violations a
/// procedure or trigger may let through to the table.
fn classify_database_error(
    code: Option<&str>,
    guarded_by: Option<RejectionRule>,
) -> Option<RejectionRule> {
    let rule = guarded_by?;
    let code = code?;
    (code.starts_with("P0") || code.starts_with("23")).then_some(rule)
}

/// SQLSTATE classes that mean the session itself is gone.
fn is_connection_state(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("57P") || code.starts_with("28")
}

/// Maps sqlx errors raised while acquiring a connection to user-friendly messages.
fn map_connection_error(error: sqlx::Error, target: &ConnectionTarget) -> ZooError {
    let ConnectionTarget {
        host,
        port,
        user,
        database,
    } = target;

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ZooError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ZooError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ZooError::connection(format!("Database '{database}' does not exist."))
    } else if matches!(error, sqlx::Error::PoolTimedOut) || error_str.contains("timed out") {
        ZooError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ZooError::connection(error.to_string())
    }
}

/// Formats a statement error with PostgreSQL detail, hint and constraint.
fn format_statement_error(error: &sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }

        if let Some(constraint) = pg_error.constraint() {
            result.push_str("\n  CONSTRAINT: ");
            result.push_str(constraint);
        }
    }

    result
}
