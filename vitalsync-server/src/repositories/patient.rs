use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::Patient;

pub struct PatientRepository {
    storage: Arc<Storage>,
}

impl PatientRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl PatientRepository {
    pub async fn create(
        &self,
        item: &Patient,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO patients (name, created_at)
            VALUES ($1, $2)
            "#,
        )
        .bind(&item.name)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Patient>, Error> {
        let patient: Option<Patient> = sqlx::query_as("SELECT * FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(patient)
    }

    pub async fn find_all(&self) -> Result<Vec<Patient>, Error> {
        let patients: Vec<Patient> = sqlx::query_as("SELECT * FROM patients ORDER BY id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(patients)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
            .fetch_one(self.storage.get_pool())
            .await?;

        Ok(count)
    }

    pub async fn delete(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }
}
