use crate::store::{AuditStore, PlateStore, RegistrationStore, StoreError, UserStore};
use crate::types::{Plate, RegistrationForm, ScanLogEntry, User};
use async_trait::async_trait;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task;
use uuid::Uuid;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS plate (
        plate_id TEXT NOT NULL PRIMARY KEY,
        vehicle_id TEXT NOT NULL,
        plate_number TEXT NOT NULL UNIQUE,
        plate_type TEXT NOT NULL,
        plate_issue_date TEXT NOT NULL,
        plate_expiration_date TEXT NOT NULL,
        status TEXT NOT NULL
    ) WITHOUT ROWID;
    CREATE INDEX IF NOT EXISTS plate_vehicle ON plate(vehicle_id);
    CREATE TABLE IF NOT EXISTS lto_client (
        lto_client_id TEXT NOT NULL PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        contact_number TEXT,
        role TEXT NOT NULL
    ) WITHOUT ROWID;
    CREATE TABLE IF NOT EXISTS registration_form (
        registration_id TEXT NOT NULL PRIMARY KEY,
        vehicle_id TEXT NOT NULL,
        lto_client_id TEXT NOT NULL,
        registration_type TEXT NOT NULL,
        status TEXT NOT NULL,
        submitted_date TEXT NOT NULL
    ) WITHOUT ROWID;
    CREATE INDEX IF NOT EXISTS registration_vehicle ON registration_form(vehicle_id);
    CREATE TABLE IF NOT EXISTS scan_log (
        log_id TEXT NOT NULL PRIMARY KEY,
        plate_id TEXT NOT NULL,
        registration_id TEXT NOT NULL,
        lto_client_id TEXT NOT NULL,
        scanned_at TEXT NOT NULL,
        FOREIGN KEY(plate_id) REFERENCES plate(plate_id),
        FOREIGN KEY(registration_id) REFERENCES registration_form(registration_id)
    ) WITHOUT ROWID;
";

const PLATE_COLUMNS: &str = "plate_id, vehicle_id, plate_number, plate_type, \
                             plate_issue_date, plate_expiration_date, status";

/// SQLite-backed implementation of every store seam. Queries run on the
/// blocking pool against one shared connection, so a caller waiting on a
/// slow or locked database can still give up at its deadline.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// `busy_timeout` bounds how long a query waits on another writer's lock.
    pub fn open(path: &str, busy_timeout: Duration) -> Result<SqliteStore, StoreError> {
        info!("Opening plate database at {}", path);
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        SqliteStore::init(conn)
    }

    pub fn open_in_memory() -> Result<SqliteStore, StoreError> {
        SqliteStore::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<SqliteStore, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("sqlite connection poisoned".to_string()))?;
            op(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("sqlite task failed: {}", e)))?
    }

    pub async fn insert_plate(&self, plate: &Plate) -> Result<(), StoreError> {
        let plate = plate.clone();
        self.with_conn(move |conn| {
            conn.execute(
                &format!("INSERT INTO plate({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)", PLATE_COLUMNS),
                params![
                    plate.plate_id,
                    plate.vehicle_id,
                    plate.plate_number,
                    plate.plate_type,
                    plate.plate_issue_date,
                    plate.plate_expiration_date,
                    plate.status,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn insert_registration_form(&self, form: &RegistrationForm) -> Result<(), StoreError> {
        let form = form.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO registration_form(registration_id, vehicle_id, lto_client_id, \
                 registration_type, status, submitted_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    form.registration_id,
                    form.vehicle_id,
                    form.lto_client_id,
                    form.registration_type,
                    form.status,
                    form.submitted_date,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let user = user.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO lto_client(lto_client_id, first_name, last_name, email, contact_number, role) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.lto_client_id,
                    user.first_name,
                    user.last_name,
                    user.email,
                    user.contact_number,
                    user.role,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn scan_log_count(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM scan_log", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

fn plate_from_row(row: &Row) -> rusqlite::Result<Plate> {
    Ok(Plate {
        plate_id: row.get(0)?,
        vehicle_id: row.get(1)?,
        plate_number: row.get(2)?,
        plate_type: row.get(3)?,
        plate_issue_date: row.get(4)?,
        plate_expiration_date: row.get(5)?,
        status: row.get(6)?,
    })
}

#[async_trait]
impl PlateStore for SqliteStore {
    async fn find_plate_by_number(&self, number: &str) -> Result<Option<Plate>, StoreError> {
        let number = number.to_string();
        self.with_conn(move |conn| {
            let plate = conn
                .query_row(
                    &format!("SELECT {} FROM plate WHERE plate_number = ?1", PLATE_COLUMNS),
                    params![number],
                    plate_from_row,
                )
                .optional()?;
            Ok(plate)
        })
        .await
    }

    async fn list_plates_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Plate>, StoreError> {
        let vehicle_id = vehicle_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM plate WHERE vehicle_id = ?1 ORDER BY plate_issue_date",
                PLATE_COLUMNS
            ))?;
            let plates = stmt
                .query_map(params![vehicle_id], plate_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(plates)
        })
        .await
    }
}

#[async_trait]
impl RegistrationStore for SqliteStore {
    async fn find_registration_form_by_vehicle(
        &self,
        vehicle_id: &str,
    ) -> Result<Option<RegistrationForm>, StoreError> {
        let vehicle_id = vehicle_id.to_string();
        self.with_conn(move |conn| {
            // Latest submission wins when a vehicle has several forms.
            let form = conn
                .query_row(
                    "SELECT registration_id, vehicle_id, lto_client_id, registration_type, status, \
                     submitted_date FROM registration_form WHERE vehicle_id = ?1 \
                     ORDER BY submitted_date DESC LIMIT 1",
                    params![vehicle_id],
                    |row| {
                        Ok(RegistrationForm {
                            registration_id: row.get(0)?,
                            vehicle_id: row.get(1)?,
                            lto_client_id: row.get(2)?,
                            registration_type: row.get(3)?,
                            status: row.get(4)?,
                            submitted_date: row.get(5)?,
                        })
                    },
                )
                .optional()?;
            Ok(form)
        })
        .await
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find_user_by_client_id(&self, client_id: &str) -> Result<User, StoreError> {
        let client_id = client_id.to_string();
        self.with_conn(move |conn| {
            let user = conn
                .query_row(
                    "SELECT lto_client_id, first_name, last_name, email, contact_number, role \
                     FROM lto_client WHERE lto_client_id = ?1",
                    params![client_id],
                    |row| {
                        Ok(User {
                            lto_client_id: row.get(0)?,
                            first_name: row.get(1)?,
                            last_name: row.get(2)?,
                            email: row.get(3)?,
                            contact_number: row.get(4)?,
                            role: row.get(5)?,
                        })
                    },
                )
                .optional()?;
            user.ok_or(StoreError::NotFound {
                kind: "user",
                key: client_id,
            })
        })
        .await
    }
}

#[async_trait]
impl AuditStore for SqliteStore {
    async fn append_scan_log(&self, entry: &ScanLogEntry) -> Result<String, StoreError> {
        let entry = entry.clone();
        self.with_conn(move |conn| {
            let log_id = Uuid::new_v4().simple().to_string();
            conn.execute(
                "INSERT INTO scan_log(log_id, plate_id, registration_id, lto_client_id, scanned_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    log_id,
                    entry.plate_id,
                    entry.registration_id,
                    entry.lto_client_id,
                    entry.scanned_at,
                ],
            )?;
            debug!("Wrote scan log {} for plate {}", log_id, entry.plate_id);
            Ok(log_id)
        })
        .await
    }
}
