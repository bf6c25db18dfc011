use async_trait::async_trait;
use entity::{Employee, employees};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::{DbPool, DbResult};

/// Fields accepted when inserting an employee; the id is left to the database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub role: String,
}

/// Storage port used by the HTTP handlers. Each method issues one statement.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// All employees ordered by ascending id.
    async fn list(&self) -> DbResult<Vec<Employee>>;

    /// Inserts a row and returns it with the assigned id.
    async fn create(&self, employee: NewEmployee) -> DbResult<Employee>;

    /// Returns `false` when no row had the given id.
    async fn delete(&self, id: i32) -> DbResult<bool>;

    async fn ping(&self) -> DbResult<()>;
}

/// [`EmployeeStore`] backed by the shared SeaORM pool.
#[derive(Clone, Debug)]
pub struct SeaOrmEmployees {
    pool: DbPool,
}

impl SeaOrmEmployees {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for SeaOrmEmployees {
    async fn list(&self) -> DbResult<Vec<Employee>> {
        let rows = employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, employee: NewEmployee) -> DbResult<Employee> {
        let model = employees::ActiveModel {
            name: Set(employee.name),
            role: Set(employee.role),
            ..Default::default()
        };
        Ok(model.insert(&self.pool).await?)
    }

    async fn delete(&self, id: i32) -> DbResult<bool> {
        let result = employees::Entity::delete_by_id(id).exec(&self.pool).await?;
        Ok(result.rows_affected > 0)
    }

    async fn ping(&self) -> DbResult<()> {
        crate::ping(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Database, DatabaseBackend, Statement};

    use super::*;
    use crate::DbError;

    async fn sqlite_store() -> SeaOrmEmployees {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        pool.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "CREATE TABLE employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                role TEXT NOT NULL
            );",
        ))
        .await
        .unwrap();
        SeaOrmEmployees::new(pool)
    }

    fn new_employee(name: &str, role: &str) -> NewEmployee {
        NewEmployee {
            name: name.into(),
            role: role.into(),
        }
    }

    #[tokio::test]
    async fn list_is_empty_without_rows() {
        let store = sqlite_store().await;
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_assigns_ids_and_list_orders_them() {
        let store = sqlite_store().await;
        let alice = store
            .create(new_employee("Alice", "Engineer"))
            .await
            .unwrap();
        let bob = store.create(new_employee("Bob", "Designer")).await.unwrap();
        assert!(bob.id > alice.id);
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.role, "Engineer");

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![alice, bob]);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_matched() {
        let store = sqlite_store().await;
        let alice = store
            .create(new_employee("Alice", "Engineer"))
            .await
            .unwrap();

        assert!(!store.delete(999_999).await.unwrap());
        assert!(store.delete(alice.id).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.delete(alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn missing_table_surfaces_as_query_error() {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        let store = SeaOrmEmployees::new(pool);
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, DbError::Query(_)));
        store.ping().await.unwrap();
    }
}
