//! In-memory catalogs for testing and offline use.
//!
//! `MockCatalog` keeps a small zoo dataset in memory and answers every
//! catalog operation with the same semantics as the SQL statements, including
//! the rules the real store enforces (the `InserirAnimal` habitat check and the
//! non-negative quantity trigger). `FailingCatalog` fails every call as if the
//! store were unreachable.

use super::{
    AnimalFoodRank, AnimalSummary, CaretakerRank, CleanerRank, Employee, EmployeeEmail, Habitat,
    HabitatName, NewAnimal, NewEmployee, NewHabitat, Product, QuantityUpdate, SuppliedFood,
    SupplierInfo, SupplierPhone, ZooCatalog,
};
use crate::error::{RejectionRule, Result, ZooError};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct Supplier {
    id: i32,
    name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Clone)]
struct Animal {
    id: i32,
    name: String,
    species: String,
    habitat_id: i32,
}

#[derive(Debug, Clone)]
struct Consumption {
    animal_id: i32,
    product_id: i32,
    quantity: f64,
}

/// Tables of the zoo schema, as far as the catalog reads them.
#[derive(Debug, Clone, Default)]
struct Dataset {
    suppliers: Vec<Supplier>,
    products: Vec<Product>,
    /// Food mass in kg, keyed by product id.
    foods: BTreeMap<i32, f64>,
    employees: Vec<Employee>,
    habitats: Vec<Habitat>,
    animals: Vec<Animal>,
    /// (employee id, shift entry time)
    shifts: Vec<(i32, NaiveTime)>,
    /// (employee id, animal id), one entry per care day
    care: Vec<(i32, i32)>,
    /// (employee id, habitat id), one entry per cleaning day
    cleaning: Vec<(i32, i32)>,
    /// Animal ids with a prescription row.
    prescriptions: Vec<i32>,
    /// (supplier id, product id)
    supplies: Vec<(i32, i32)>,
    consumption: Vec<Consumption>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn time(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap_or_default()
}

impl Dataset {
    /// The demonstration dataset; mirrors `tests/fixtures/zoo.sql`.
    fn seeded() -> Self {
        let supplier = |id, name: &str, email: &str, phone: &str| Supplier {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        };
        let product = |id, name: &str, quantity| Product {
            id,
            name: name.to_string(),
            quantity,
        };
        let employee = |id, name: &str, admitted, cpf: &str, email: &str, address: &str| Employee {
            id,
            name: name.to_string(),
            admission_date: admitted,
            cpf: cpf.to_string(),
            email: email.to_string(),
            address: address.to_string(),
        };
        let habitat = |id, name: &str, kind: &str, location: &str, temp| Habitat {
            id,
            name: name.to_string(),
            kind: kind.to_string(),
            location: location.to_string(),
            average_temperature: temp,
        };
        let animal = |id, name: &str, species: &str, habitat_id| Animal {
            id,
            name: name.to_string(),
            species: species.to_string(),
            habitat_id,
        };
        let eats = |animal_id, product_id, quantity| Consumption {
            animal_id,
            product_id,
            quantity,
        };

        Self {
            suppliers: vec![
                supplier(1, "Agro Zoo", "contato@agrozoo.com.br", "(61) 3333-0001"),
                supplier(2, "Hortifruti Central", "vendas@hortifruti.com.br", "(61) 3333-0002"),
                supplier(3, "Sementes Brasil", "sac@sementes.com.br", "(61) 3333-0003"),
                supplier(5, "Nutri Fauna", "pedidos@nutrifauna.com.br", "(61) 3333-0005"),
            ],
            products: vec![
                product(1, "Carne bovina", 100),
                product(2, "Frango", 50),
                product(3, "Feno", 200),
                product(4, "Frutas variadas", 60),
                product(5, "Vermífugo", 20),
            ],
            foods: BTreeMap::from([(1, 25.0), (2, 10.5), (3, 30.0), (4, 5.25)]),
            employees: vec![
                employee(1, "Ana Souza", date(2023, 1, 10), "111.111.111-11", "ana@zoo.br", "Rua das Acácias, 10"),
                employee(2, "Bruno Lima", date(2022, 3, 15), "222.222.222-22", "bruno@zoo.br", "Av. Central, 200"),
                employee(3, "Carla Dias", date(2021, 6, 1), "333.333.333-33", "carla@zoo.br", "Quadra 5, Casa 3"),
                employee(4, "Diego Alves", date(2024, 2, 20), "444.444.444-44", "diego@zoo.br", "Rua do Lago, 42"),
            ],
            habitats: vec![
                habitat(1, "Savana", "Terrestre", "Setor Norte", 28.5),
                habitat(2, "Floresta Tropical", "Terrestre", "Setor Leste", 25.0),
                habitat(3, "Lago", "Aquático", "Setor Sul", 22.0),
            ],
            animals: vec![
                animal(1, "Simba", "Panthera leo", 1),
                animal(2, "Nala", "Panthera leo", 1),
                animal(3, "Dumbo", "Loxodonta africana", 2),
                animal(4, "Zazu", "Buphagus africanus", 2),
                animal(5, "Nemo", "Amphiprion ocellaris", 3),
            ],
            shifts: vec![
                (1, time(8, 30, 0)),
                (2, time(9, 0, 0)),
                (3, time(9, 15, 0)),
                (3, time(10, 0, 0)),
                (4, time(9, 0, 1)),
            ],
            care: vec![(1, 1), (1, 1), (1, 2), (2, 1), (2, 3), (2, 4), (3, 5), (3, 3)],
            cleaning: vec![(3, 1), (3, 3), (3, 1), (4, 2), (1, 3)],
            prescriptions: vec![1, 2, 3],
            supplies: vec![(5, 1), (5, 2), (1, 3), (1, 5), (2, 4)],
            consumption: vec![
                eats(1, 1, 12.0),
                eats(1, 2, 1.0),
                eats(2, 1, 8.0),
                eats(3, 3, 30.0),
                eats(3, 4, 6.0),
                eats(4, 2, 10.0),
                eats(4, 4, 3.0),
            ],
        }
    }

    fn employee_name(&self, id: i32) -> Option<&str> {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }

    fn product_name(&self, id: i32) -> Option<&str> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    fn habitat(&self, id: i32) -> Option<&Habitat> {
        self.habitats.iter().find(|h| h.id == id)
    }

    fn supplier(&self, id: i32) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }

    /// Suppliers of a food, following Alimento -> Proporciona -> Fornecedor.
    fn food_suppliers(&self, product_id: i32) -> impl Iterator<Item = &Supplier> + '_ {
        self.supplies
            .iter()
            .filter(move |(_, p)| *p == product_id && self.foods.contains_key(p))
            .filter_map(move |(s, _)| self.supplier(*s))
    }

    /// Distinct-count ranking over (employee, target) pairs, ordered by
    /// count descending then name ascending.
    fn distinct_ranking(&self, pairs: &[(i32, i32)]) -> Vec<(String, i64)> {
        let mut per_employee: HashMap<i32, BTreeSet<i32>> = HashMap::new();
        for (employee_id, target) in pairs {
            per_employee.entry(*employee_id).or_default().insert(*target);
        }

        let mut ranking: Vec<(String, i64)> = per_employee
            .into_iter()
            .filter_map(|(id, targets)| {
                self.employee_name(id)
                    .map(|name| (name.to_string(), targets.len() as i64))
            })
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranking
    }

    fn caretakers(&self) -> Vec<CaretakerRank> {
        self.distinct_ranking(&self.care)
            .into_iter()
            .map(|(name, animal_count)| CaretakerRank { name, animal_count })
            .collect()
    }

    fn food_ranking(&self) -> Vec<AnimalFoodRank> {
        let mut rows = Vec::new();

        for animal in &self.animals {
            let mut eaten: Vec<(&Consumption, &Supplier)> = self
                .consumption
                .iter()
                .filter(|c| c.animal_id == animal.id)
                .flat_map(|c| self.food_suppliers(c.product_id).map(move |s| (c, s)))
                .collect();
            eaten.sort_by(|a, b| b.0.quantity.total_cmp(&a.0.quantity));

            // RANK(): ties share a rank, the next rank skips.
            let mut rank = 0;
            let mut previous = None;
            for (position, (consumed, supplier)) in eaten.iter().enumerate() {
                if previous != Some(consumed.quantity) {
                    rank = position as i64 + 1;
                    previous = Some(consumed.quantity);
                }
                rows.push(AnimalFoodRank {
                    animal_name: animal.name.clone(),
                    species: animal.species.clone(),
                    food: self
                        .product_name(consumed.product_id)
                        .unwrap_or_default()
                        .to_string(),
                    supplier: supplier.name.clone(),
                    quantity_consumed: consumed.quantity,
                    rank,
                });
            }
        }

        rows.sort_by(|a, b| {
            a.animal_name
                .cmp(&b.animal_name)
                .then_with(|| a.rank.cmp(&b.rank))
        });
        rows
    }
}

/// A catalog over an in-memory zoo dataset.
pub struct MockCatalog {
    data: Mutex<Dataset>,
}

impl MockCatalog {
    /// Creates a mock catalog with no rows at all.
    pub fn new() -> Self {
        Self {
            data: Mutex::new(Dataset::default()),
        }
    }

    /// Creates a mock catalog holding the demonstration dataset.
    pub fn seeded() -> Self {
        Self {
            data: Mutex::new(Dataset::seeded()),
        }
    }

    /// Number of stored animals.
    pub fn animal_count(&self) -> usize {
        self.data().animals.len()
    }

    /// Current quantity of a product, if it exists.
    pub fn product_quantity(&self, product_id: i32) -> Option<i32> {
        self.data()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.quantity)
    }

    fn data(&self) -> MutexGuard<'_, Dataset> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZooCatalog for MockCatalog {
    async fn food_by_supplier(&self, supplier_id: i32) -> Result<Vec<SuppliedFood>> {
        let data = self.data();
        Ok(data
            .supplies
            .iter()
            .filter(|(s, _)| *s == supplier_id)
            .filter_map(|(_, p)| {
                let mass_kg = *data.foods.get(p)?;
                let food_name = data.product_name(*p)?.to_string();
                Some(SuppliedFood { food_name, mass_kg })
            })
            .collect())
    }

    async fn employee_emails(&self) -> Result<Vec<EmployeeEmail>> {
        Ok(self
            .data()
            .employees
            .iter()
            .map(|e| EmployeeEmail {
                email: e.email.clone(),
            })
            .collect())
    }

    async fn late_employees(&self) -> Result<Vec<EmployeeEmail>> {
        let data = self.data();
        let cutoff = time(9, 0, 0);
        let emails: BTreeSet<String> = data
            .shifts
            .iter()
            .filter(|(_, entry)| *entry > cutoff)
            .filter_map(|(id, _)| data.employees.iter().find(|e| e.id == *id))
            .map(|e| e.email.clone())
            .collect();
        Ok(emails
            .into_iter()
            .map(|email| EmployeeEmail { email })
            .collect())
    }

    async fn primary_supplier_phone(&self, animal_id: i32) -> Result<SupplierPhone> {
        let data = self.data();
        let mut candidates: Vec<(f64, &Supplier)> = data
            .consumption
            .iter()
            .filter(|c| c.animal_id == animal_id)
            .flat_map(|c| data.food_suppliers(c.product_id).map(move |s| (c.quantity, s)))
            .collect();
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        candidates
            .first()
            .map(|(_, s)| SupplierPhone {
                phone: s.phone.clone(),
            })
            .ok_or_else(|| ZooError::not_found(format!("No primary supplier for animal {animal_id}")))
    }

    async fn medicated_habitats(&self) -> Result<Vec<HabitatName>> {
        let data = self.data();
        let names: BTreeSet<String> = data
            .animals
            .iter()
            .filter(|a| data.prescriptions.contains(&a.id))
            .filter_map(|a| data.habitat(a.habitat_id))
            .map(|h| h.name.clone())
            .collect();
        Ok(names.into_iter().map(|name| HabitatName { name }).collect())
    }

    async fn top_caretaker(&self) -> Result<Option<CaretakerRank>> {
        Ok(self.data().caretakers().into_iter().next())
    }

    async fn caretaker_ranking(&self) -> Result<Vec<CaretakerRank>> {
        Ok(self.data().caretakers())
    }

    async fn cleaner_ranking(&self) -> Result<Vec<CleanerRank>> {
        let data = self.data();
        Ok(data
            .distinct_ranking(&data.cleaning)
            .into_iter()
            .map(|(name, habitat_count)| CleanerRank {
                name,
                habitat_count,
            })
            .collect())
    }

    async fn animal_summary(&self) -> Result<Vec<AnimalSummary>> {
        let data = self.data();
        let mut rows: Vec<AnimalSummary> = data
            .animals
            .iter()
            .filter_map(|animal| {
                let habitat = data.habitat(animal.habitat_id)?;
                let eaten: Vec<&Consumption> = data
                    .consumption
                    .iter()
                    .filter(|c| c.animal_id == animal.id)
                    .collect();
                let products: BTreeSet<i32> = eaten.iter().map(|c| c.product_id).collect();
                Some(AnimalSummary {
                    animal_id: animal.id,
                    animal_name: animal.name.clone(),
                    species: animal.species.clone(),
                    habitat: habitat.name.clone(),
                    habitat_kind: habitat.kind.clone(),
                    products_consumed: products.len() as i64,
                    total_consumed: eaten.iter().map(|c| c.quantity).sum(),
                })
            })
            .collect();
        rows.sort_by_key(|r| r.animal_id);
        Ok(rows)
    }

    async fn animal_food_ranking(&self, top_only: bool) -> Result<Vec<AnimalFoodRank>> {
        let rows = self.data().food_ranking();
        Ok(rows
            .into_iter()
            .filter(|r| !top_only || r.rank == 1)
            .collect())
    }

    async fn list_habitats(&self) -> Result<Vec<Habitat>> {
        Ok(self.data().habitats.clone())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>> {
        Ok(self.data().employees.clone())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.data().products.clone())
    }

    async fn supplier_info(&self, supplier_id: i32) -> Result<SupplierInfo> {
        self.data()
            .supplier(supplier_id)
            .map(|s| SupplierInfo {
                name: s.name.clone(),
                email: s.email.clone(),
                phone: s.phone.clone(),
            })
            .ok_or_else(|| ZooError::not_found(format!("Supplier {supplier_id} not found")))
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> Result<()> {
        let mut data = self.data();
        if data.employees.iter().any(|e| e.cpf == employee.cpf) {
            return Err(ZooError::statement(format!(
                "ERROR: duplicate key value violates unique constraint \"funcionario_cpf_key\"\n  DETAIL: Key (cpf)=({}) already exists.",
                employee.cpf
            )));
        }

        let id = data.employees.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        data.employees.push(Employee {
            id,
            name: employee.name.clone(),
            admission_date: employee.admission_date,
            cpf: employee.cpf.clone(),
            email: employee.email.clone(),
            address: employee.address.clone(),
        });
        Ok(())
    }

    async fn insert_habitat(&self, habitat: &NewHabitat) -> Result<()> {
        let mut data = self.data();
        let id = data.habitats.iter().map(|h| h.id).max().unwrap_or(0) + 1;
        data.habitats.push(Habitat {
            id,
            name: habitat.name.clone(),
            kind: habitat.kind.clone(),
            location: habitat.location.clone(),
            average_temperature: habitat.average_temperature,
        });
        Ok(())
    }

    async fn insert_animal(&self, animal: &NewAnimal) -> Result<()> {
        let mut data = self.data();
        if data.habitat(animal.habitat_id).is_none() {
            return Err(ZooError::rejected(
                RejectionRule::Procedure,
                format!("Habitat com ID {} não existe.", animal.habitat_id),
            ));
        }

        let id = data.animals.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        data.animals.push(Animal {
            id,
            name: animal.name.clone(),
            species: animal.species.clone(),
            habitat_id: animal.habitat_id,
        });
        Ok(())
    }

    async fn update_product_quantity(&self, update: QuantityUpdate) -> Result<()> {
        let mut data = self.data();
        let product = data
            .products
            .iter_mut()
            .find(|p| p.id == update.product_id)
            .ok_or_else(|| ZooError::not_found(format!("Product {} not found", update.product_id)))?;

        if update.new_quantity < 0 {
            return Err(ZooError::rejected(
                RejectionRule::Trigger,
                format!(
                    "Quantidade não pode ser negativa (produto {}: {}).",
                    update.product_id, update.new_quantity
                ),
            ));
        }

        product.quantity = update.new_quantity;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {}
}

/// A catalog whose store is always unreachable.
#[derive(Debug, Default)]
pub struct FailingCatalog;

impl FailingCatalog {
    fn fail<T>() -> Result<T> {
        Err(ZooError::connection(
            "Cannot connect to localhost:5432. Check that the server is running.",
        ))
    }
}

#[async_trait]
impl ZooCatalog for FailingCatalog {
    async fn food_by_supplier(&self, _supplier_id: i32) -> Result<Vec<SuppliedFood>> {
        Self::fail()
    }

    async fn employee_emails(&self) -> Result<Vec<EmployeeEmail>> {
        Self::fail()
    }

    async fn late_employees(&self) -> Result<Vec<EmployeeEmail>> {
        Self::fail()
    }

    async fn primary_supplier_phone(&self, _animal_id: i32) -> Result<SupplierPhone> {
        Self::fail()
    }

    async fn medicated_habitats(&self) -> Result<Vec<HabitatName>> {
        Self::fail()
    }

    async fn top_caretaker(&self) -> Result<Option<CaretakerRank>> {
        Self::fail()
    }

    async fn caretaker_ranking(&self) -> Result<Vec<CaretakerRank>> {
        Self::fail()
    }

    async fn cleaner_ranking(&self) -> Result<Vec<CleanerRank>> {
        Self::fail()
    }

    async fn animal_summary(&self) -> Result<Vec<AnimalSummary>> {
        Self::fail()
    }

    async fn animal_food_ranking(&self, _top_only: bool) -> Result<Vec<AnimalFoodRank>> {
        Self::fail()
    }

    async fn list_habitats(&self) -> Result<Vec<Habitat>> {
        Self::fail()
    }

    async fn list_employees(&self) -> Result<Vec<Employee>> {
        Self::fail()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Self::fail()
    }

    async fn supplier_info(&self, _supplier_id: i32) -> Result<SupplierInfo> {
        Self::fail()
    }

    async fn insert_employee(&self, _employee: &NewEmployee) -> Result<()> {
        Self::fail()
    }

    async fn insert_habitat(&self, _habitat: &NewHabitat) -> Result<()> {
        Self::fail()
    }

    async fn insert_animal(&self, _animal: &NewAnimal) -> Result<()> {
        Self::fail()
    }

    async fn update_product_quantity(&self, _update: QuantityUpdate) -> Result<()> {
        Self::fail()
    }

    async fn ping(&self) -> Result<()> {
        Self::fail()
    }

    async fn close(&self) {}
}
