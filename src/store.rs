//! Persistence layer for the front-desk service: SQLite via sqlx, with an
//! in-process hot cache and an optional Redis read-through cache for
//! patient lookups. Billing-affecting writes record an audit trail entry
//! in the same transaction.

use std::str::FromStr;
use std::sync::Arc;

use bb8_redis::bb8::Pool as RedisPool;
use bb8_redis::redis;
use bb8_redis::RedisConnectionManager;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::core::drafts::{NewAppointment, NewPayment};
use crate::error::StoreError;
use crate::models::{
    Action, Appointment, AppointmentStatus, AppointmentType, AuditTrailEntry, Doctor, Patient,
    Payment, PaymentStatus, UserProfile,
};

const REDIS_TTL: u64 = 300; // 5 minutes cache TTL
const DEFAULT_APPOINTMENT_TYPE: &str = "Consultation";
const BILLING_ACTION_TYPE: &str = "Billing";

pub struct ClinicStore {
    pool: SqlitePool,
    redis: Option<RedisPool<RedisConnectionManager>>,
    cache: Arc<DashMap<String, serde_json::Value>>,
}

impl ClinicStore {
    pub async fn connect(db_url: &str, redis_url: Option<&str>) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(db_url).await?;
        Self::initialize_schema(&pool).await?;

        let redis = match redis_url {
            Some(url) => {
                let manager = RedisConnectionManager::new(url)?;
                Some(RedisPool::builder().max_size(15).build(manager).await?)
            }
            None => None,
        };

        Ok(Self {
            pool,
            redis,
            cache: Arc::new(DashMap::new()),
        })
    }

    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self, StoreError> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::initialize_schema(&pool).await?;
        Ok(Self {
            pool,
            redis: None,
            cache: Arc::new(DashMap::new()),
        })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                date_of_birth TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                gender TEXT NOT NULL,
                medical_history TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS doctors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                date_of_birth TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                gender TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS appointment_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS actions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                appointment_type_id INTEGER NOT NULL,
                patient_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                total_payment REAL NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT,
                is_completed INTEGER NOT NULL,
                completed_at TEXT,
                FOREIGN KEY (appointment_type_id) REFERENCES appointment_types(id),
                FOREIGN KEY (patient_id) REFERENCES patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL,
                action_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                status TEXT NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients(id),
                FOREIGN KEY (action_id) REFERENCES actions(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL,
                doctor_id INTEGER NOT NULL,
                action_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients(id),
                FOREIGN KEY (doctor_id) REFERENCES doctors(id),
                FOREIGN KEY (action_id) REFERENCES actions(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS audit_trail (
                id TEXT PRIMARY KEY,
                action TEXT NOT NULL,
                amount REAL NOT NULL,
                user TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                details TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // ===== Patients =====

    #[instrument(skip(self, profile, medical_history))]
    pub async fn create_patient(
        &self,
        profile: UserProfile,
        medical_history: Option<String>,
    ) -> Result<Patient, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO patients (
                first_name, last_name, date_of_birth, email, phone, gender,
                medical_history, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.date_of_birth)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.gender)
        .bind(&medical_history)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(patient_id = id, "patient registered");
        Ok(Patient {
            id,
            user: profile,
            medical_history,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_patient(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        let cache_key = format!("patient_{id}");

        // Hot cache first, Redis next, database last.
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(Some(serde_json::from_value(cached.value().clone())?));
        }

        if let Some(redis_pool) = &self.redis {
            if let Ok(mut conn) = redis_pool.get().await {
                let cached: Option<String> = redis::cmd("GET")
                    .arg(&cache_key)
                    .query_async(&mut *conn)
                    .await
                    .ok()
                    .flatten();
                if let Some(data) = cached {
                    let patient: Patient = serde_json::from_str(&data)?;
                    self.cache
                        .insert(cache_key, serde_json::to_value(&patient)?);
                    return Ok(Some(patient));
                }
            } else {
                debug!("redis unavailable, falling through to database");
            }
        }

        let row = sqlx::query(
            "SELECT id, first_name, last_name, date_of_birth, email, phone, gender,
                    medical_history
             FROM patients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let patient = Self::patient_from_row(&row)?;

        self.cache
            .insert(cache_key.clone(), serde_json::to_value(&patient)?);
        if let Some(redis_pool) = &self.redis {
            if let Ok(mut conn) = redis_pool.get().await {
                let payload = serde_json::to_string(&patient)?;
                let stored: Result<(), _> = redis::cmd("SETEX")
                    .arg(&cache_key)
                    .arg(REDIS_TTL)
                    .arg(payload)
                    .query_async(&mut *conn)
                    .await;
                if stored.is_err() {
                    debug!(patient_id = id, "failed to populate redis cache");
                }
            }
        }

        Ok(Some(patient))
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, date_of_birth, email, phone, gender,
                    medical_history
             FROM patients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::patient_from_row).collect()
    }

    async fn patient_exists(&self, id: i64) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT id FROM patients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    // ===== Doctors =====

    #[instrument(skip(self, profile))]
    pub async fn create_doctor(&self, profile: UserProfile) -> Result<Doctor, StoreError> {
        let result = sqlx::query(
            "INSERT INTO doctors (first_name, last_name, date_of_birth, email, phone, gender)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.date_of_birth)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.gender)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(doctor_id = id, "doctor registered");
        Ok(Doctor { id, user: profile })
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, date_of_birth, email, phone, gender
             FROM doctors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(Doctor {
                    id: row.try_get("id")?,
                    user: Self::profile_from_row(row)?,
                })
            })
            .collect()
    }

    // ===== Appointments =====

    #[instrument(skip(self, request), fields(patient_id = request.patient_id))]
    pub async fn create_appointment(
        &self,
        request: NewAppointment,
    ) -> Result<Appointment, StoreError> {
        if !self.patient_exists(request.patient_id).await? {
            return Err(StoreError::UnknownPatient(request.patient_id));
        }

        let description = request
            .notes
            .clone()
            .unwrap_or_else(|| DEFAULT_APPOINTMENT_TYPE.to_string());

        let mut tx = self.pool.begin().await?;
        let type_id = Self::appointment_type_id(&mut tx, DEFAULT_APPOINTMENT_TYPE).await?;

        let action_result = sqlx::query(
            "INSERT INTO actions (
                appointment_type_id, patient_id, description, total_payment,
                start_date, end_date, is_completed, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(type_id)
        .bind(request.patient_id)
        .bind(&description)
        .bind(0.0_f64)
        .bind(request.date)
        .bind(None::<NaiveDate>)
        .bind(false)
        .bind(None::<DateTime<Utc>>)
        .execute(&mut *tx)
        .await?;
        let action_id = action_result.last_insert_rowid();

        let appointment_result = sqlx::query(
            "INSERT INTO appointments (patient_id, action_id, date, time, status)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(request.patient_id)
        .bind(action_id)
        .bind(request.date)
        .bind(request.time)
        .bind(AppointmentStatus::Waiting.label())
        .execute(&mut *tx)
        .await?;
        let id = appointment_result.last_insert_rowid();

        tx.commit().await?;
        info!(appointment_id = id, "appointment created");

        Ok(Appointment {
            id,
            patient_id: request.patient_id,
            date: request.date,
            time: request.time,
            action: Action {
                id: action_id,
                appointment_type: AppointmentType {
                    id: type_id,
                    name: DEFAULT_APPOINTMENT_TYPE.to_string(),
                },
                patient_id: request.patient_id,
                description,
                total_payment: 0.0,
                start_date: request.date,
                end_date: None,
                is_completed: false,
                completed_at: None,
            },
            status: AppointmentStatus::Waiting,
        })
    }

    /// Appointments in insertion order, the order the filter engine sees.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query(
            "SELECT a.id, a.patient_id, a.date, a.time, a.status,
                    act.id AS action_id, act.description, act.total_payment,
                    act.start_date, act.end_date, act.is_completed, act.completed_at,
                    t.id AS type_id, t.name AS type_name
             FROM appointments a
             JOIN actions act ON act.id = a.action_id
             JOIN appointment_types t ON t.id = act.appointment_type_id
             ORDER BY a.id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::appointment_from_row).collect()
    }

    #[instrument(skip(self))]
    pub async fn update_appointment_status(
        &self,
        id: i64,
        next: AppointmentStatus,
    ) -> Result<(), StoreError> {
        let row = sqlx::query("SELECT status FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UnknownAppointment(id))?;
        let current = AppointmentStatus::from_str(&row.try_get::<String, _>("status")?)?;

        if !current.can_transition_to(next) {
            warn!(
                appointment_id = id,
                from = current.label(),
                to = next.label(),
                "rejected status transition"
            );
            return Err(StoreError::InvalidTransition {
                from: current.label(),
                to: next.label(),
            });
        }

        sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
            .bind(next.label())
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!(appointment_id = id, status = next.label(), "appointment status updated");
        Ok(())
    }

    // ===== Payments =====

    /// Record a payment. Every payment is backed by a completed billing
    /// action and leaves an audit trail entry; all three rows commit in a
    /// single transaction.
    #[instrument(skip(self, request), fields(patient_id = request.patient_id))]
    pub async fn create_payment(&self, request: NewPayment) -> Result<Payment, StoreError> {
        if !self.patient_exists(request.patient_id).await? {
            return Err(StoreError::UnknownPatient(request.patient_id));
        }

        let description = if request.description.is_empty() {
            BILLING_ACTION_TYPE.to_string()
        } else {
            request.description.clone()
        };
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let type_id = Self::appointment_type_id(&mut tx, BILLING_ACTION_TYPE).await?;

        let action_result = sqlx::query(
            "INSERT INTO actions (
                appointment_type_id, patient_id, description, total_payment,
                start_date, end_date, is_completed, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(type_id)
        .bind(request.patient_id)
        .bind(&description)
        .bind(request.amount)
        .bind(request.date)
        .bind(request.date)
        .bind(true)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let action_id = action_result.last_insert_rowid();

        let payment_result = sqlx::query(
            "INSERT INTO payments (
                patient_id, doctor_id, action_id, status, amount, date, time, description
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.patient_id)
        .bind(request.doctor_id)
        .bind(action_id)
        .bind(PaymentStatus::Pending.label())
        .bind(request.amount)
        .bind(request.date)
        .bind(request.time)
        .bind(&description)
        .execute(&mut *tx)
        .await?;
        let id = payment_result.last_insert_rowid();

        let entry = AuditTrailEntry::record(
            "payment recorded",
            request.amount,
            format!("doctor-{}", request.doctor_id),
            format!("payment {id} for patient {}: {description}", request.patient_id),
        );
        Self::insert_audit(&mut tx, &entry).await?;

        tx.commit().await?;
        info!(payment_id = id, amount = request.amount, "payment recorded");

        Ok(Payment {
            id,
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            action_id,
            status: PaymentStatus::Pending,
            amount: request.amount,
            date: request.date,
            time: request.time,
            description,
        })
    }

    #[instrument(skip(self))]
    pub async fn update_payment_status(
        &self,
        id: i64,
        next: PaymentStatus,
    ) -> Result<(), StoreError> {
        let row = sqlx::query("SELECT status, amount, doctor_id FROM payments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UnknownPayment(id))?;
        let current = PaymentStatus::from_str(&row.try_get::<String, _>("status")?)?;
        let amount: f64 = row.try_get("amount")?;
        let doctor_id: i64 = row.try_get("doctor_id")?;

        if !current.can_transition_to(next) {
            warn!(
                payment_id = id,
                from = current.label(),
                to = next.label(),
                "rejected payment transition"
            );
            return Err(StoreError::InvalidTransition {
                from: current.label(),
                to: next.label(),
            });
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE payments SET status = ? WHERE id = ?")
            .bind(next.label())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let entry = AuditTrailEntry::record(
            "payment status updated",
            amount,
            format!("doctor-{doctor_id}"),
            format!("payment {id}: {} -> {}", current.label(), next.label()),
        );
        Self::insert_audit(&mut tx, &entry).await?;
        tx.commit().await?;

        info!(payment_id = id, status = next.label(), "payment status updated");
        Ok(())
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, patient_id, doctor_id, action_id, status, amount, date, time,
                    description
             FROM payments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::payment_from_row).collect()
    }

    pub async fn list_payments_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<Payment>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, patient_id, doctor_id, action_id, status, amount, date, time,
                    description
             FROM payments WHERE patient_id = ? ORDER BY id",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::payment_from_row).collect()
    }

    // ===== Audit trail =====

    pub async fn record_audit(&self, entry: &AuditTrailEntry) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::insert_audit(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Most recent entries first.
    pub async fn audit_trail(&self, limit: i64) -> Result<Vec<AuditTrailEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, action, amount, user, timestamp, details
             FROM audit_trail ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::audit_from_row).collect()
    }

    // ===== Row mapping =====

    async fn appointment_type_id(
        tx: &mut Transaction<'_, Sqlite>,
        name: &str,
    ) -> Result<i64, StoreError> {
        sqlx::query("INSERT OR IGNORE INTO appointment_types (name) VALUES (?)")
            .bind(name)
            .execute(&mut **tx)
            .await?;
        let row = sqlx::query("SELECT id FROM appointment_types WHERE name = ?")
            .bind(name)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.try_get("id")?)
    }

    async fn insert_audit(
        tx: &mut Transaction<'_, Sqlite>,
        entry: &AuditTrailEntry,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO audit_trail (id, action, amount, user, timestamp, details)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(&entry.action)
        .bind(entry.amount)
        .bind(&entry.user)
        .bind(entry.timestamp)
        .bind(&entry.details)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    fn profile_from_row(row: &SqliteRow) -> Result<UserProfile, StoreError> {
        Ok(UserProfile {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            date_of_birth: row.try_get("date_of_birth")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            gender: row.try_get("gender")?,
        })
    }

    fn patient_from_row(row: &SqliteRow) -> Result<Patient, StoreError> {
        Ok(Patient {
            id: row.try_get("id")?,
            user: Self::profile_from_row(row)?,
            medical_history: row.try_get("medical_history")?,
        })
    }

    fn appointment_from_row(row: &SqliteRow) -> Result<Appointment, StoreError> {
        let status = AppointmentStatus::from_str(&row.try_get::<String, _>("status")?)?;
        Ok(Appointment {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            action: Action {
                id: row.try_get("action_id")?,
                appointment_type: AppointmentType {
                    id: row.try_get("type_id")?,
                    name: row.try_get("type_name")?,
                },
                patient_id: row.try_get("patient_id")?,
                description: row.try_get("description")?,
                total_payment: row.try_get("total_payment")?,
                start_date: row.try_get("start_date")?,
                end_date: row.try_get("end_date")?,
                is_completed: row.try_get("is_completed")?,
                completed_at: row.try_get("completed_at")?,
            },
            status,
        })
    }

    fn payment_from_row(row: &SqliteRow) -> Result<Payment, StoreError> {
        let status = PaymentStatus::from_str(&row.try_get::<String, _>("status")?)?;
        Ok(Payment {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            doctor_id: row.try_get("doctor_id")?,
            action_id: row.try_get("action_id")?,
            status,
            amount: row.try_get("amount")?,
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            description: row.try_get("description")?,
        })
    }

    fn audit_from_row(row: &SqliteRow) -> Result<AuditTrailEntry, StoreError> {
        let id: String = row.try_get("id")?;
        Ok(AuditTrailEntry {
            id: Uuid::parse_str(&id).map_err(|_| StoreError::Corrupt(format!("audit id {id}")))?,
            action: row.try_get("action")?,
            amount: row.try_get("amount")?,
            user: row.try_get("user")?,
            timestamp: row.try_get("timestamp")?,
            details: row.try_get("details")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::drafts::{AppointmentDraft, PaymentDraft};

    fn profile(first: &str) -> UserProfile {
        UserProfile {
            first_name: first.to_string(),
            last_name: "Reyes".to_string(),
            date_of_birth: "1979-11-23".parse().unwrap(),
            email: format!("{}@example.com", first.to_lowercase()),
            phone: "555-0100".to_string(),
            gender: "male".to_string(),
        }
    }

    fn appointment_request(patient_id: i64, date: &str) -> NewAppointment {
        AppointmentDraft {
            date: date.to_string(),
            time: "09:30".to_string(),
            notes: "Blood pressure review".to_string(),
        }
        .validate(patient_id)
        .unwrap()
    }

    fn payment_request(patient_id: i64, doctor_id: i64, amount: &str) -> NewPayment {
        PaymentDraft {
            amount: amount.to_string(),
            date: "2026-03-02".to_string(),
            time: "10:00".to_string(),
            description: "Consultation fee".to_string(),
        }
        .validate(patient_id, doctor_id)
        .unwrap()
    }

    #[tokio::test]
    async fn patient_round_trips_through_cache_and_db() {
        let store = ClinicStore::in_memory().await.unwrap();
        let created = store.create_patient(profile("Marco"), None).await.unwrap();

        let fetched = store.get_patient(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        // Second read is served from the hot cache.
        let cached = store.get_patient(created.id).await.unwrap().unwrap();
        assert_eq!(cached, created);

        assert!(store.get_patient(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn appointment_creation_requires_a_known_patient() {
        let store = ClinicStore::in_memory().await.unwrap();
        let err = store
            .create_appointment(appointment_request(42, "2026-03-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownPatient(42)));
    }

    #[tokio::test]
    async fn appointments_list_in_insertion_order() {
        let store = ClinicStore::in_memory().await.unwrap();
        let patient = store.create_patient(profile("Marco"), None).await.unwrap();

        store
            .create_appointment(appointment_request(patient.id, "2026-03-02"))
            .await
            .unwrap();
        store
            .create_appointment(appointment_request(patient.id, "2026-03-01"))
            .await
            .unwrap();

        let appointments = store.list_appointments().await.unwrap();
        assert_eq!(appointments.len(), 2);
        assert!(appointments[0].id < appointments[1].id);
        assert_eq!(appointments[0].status, AppointmentStatus::Waiting);
        assert_eq!(appointments[0].action.description, "Blood pressure review");
    }

    #[tokio::test]
    async fn status_updates_follow_the_transition_table() {
        let store = ClinicStore::in_memory().await.unwrap();
        let patient = store.create_patient(profile("Marco"), None).await.unwrap();
        let appointment = store
            .create_appointment(appointment_request(patient.id, "2026-03-02"))
            .await
            .unwrap();

        store
            .update_appointment_status(appointment.id, AppointmentStatus::Completed)
            .await
            .unwrap();

        let err = store
            .update_appointment_status(appointment.id, AppointmentStatus::Waiting)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        let err = store
            .update_appointment_status(999, AppointmentStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownAppointment(999)));
    }

    #[tokio::test]
    async fn payments_leave_an_audit_trail() {
        let store = ClinicStore::in_memory().await.unwrap();
        let patient = store.create_patient(profile("Marco"), None).await.unwrap();
        let doctor = store.create_doctor(profile("Ada")).await.unwrap();

        let payment = store
            .create_payment(payment_request(patient.id, doctor.id, "45.50"))
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount, 45.5);

        store
            .update_payment_status(payment.id, PaymentStatus::Paid)
            .await
            .unwrap();

        let trail = store.audit_trail(10).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert!(trail.iter().all(|entry| entry.amount == 45.5));
        assert!(trail
            .iter()
            .any(|entry| entry.action == "payment status updated"));

        let listed = store
            .list_payments_for_patient(patient.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn manual_audit_entries_are_appended() {
        let store = ClinicStore::in_memory().await.unwrap();
        let entry = AuditTrailEntry::record(
            "manual adjustment",
            12.0,
            "doctor-1",
            "waived late fee",
        );
        store.record_audit(&entry).await.unwrap();

        let trail = store.audit_trail(10).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].id, entry.id);
        assert_eq!(trail[0].details, "waived late fee");
    }

    #[tokio::test]
    async fn settled_payments_reject_further_updates() {
        let store = ClinicStore::in_memory().await.unwrap();
        let patient = store.create_patient(profile("Marco"), None).await.unwrap();
        let doctor = store.create_doctor(profile("Ada")).await.unwrap();
        let payment = store
            .create_payment(payment_request(patient.id, doctor.id, "30"))
            .await
            .unwrap();

        store
            .update_payment_status(payment.id, PaymentStatus::Cancelled)
            .await
            .unwrap();
        let err = store
            .update_payment_status(payment.id, PaymentStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
    }
}
