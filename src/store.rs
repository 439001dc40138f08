use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Booking, ClientBookingRow, FitnessClass, NewBooking, NewFitnessClass};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Fitness class {0} does not exist")]
    ClassNotFound(i64),
    #[error("No slots available")]
    NoSlots,
    #[error("Already booked")]
    AlreadyBooked,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct BookingStore {
    pool: SqlitePool,
}

impl BookingStore {
    /// Opens the pool and applies pending migrations. In-memory databases
    /// are private to a connection, so `max_connections` must be 1 for them.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(opts)
            .await?;

        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn create_class(&self, class: &NewFitnessClass) -> Result<FitnessClass, StoreError> {
        let id = sqlx::query(
            "INSERT INTO fitness_classes (name, instructor, date_time, capacity, available_slots)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&class.name)
        .bind(&class.instructor)
        .bind(class.date_time)
        .bind(class.capacity)
        .bind(class.capacity)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(FitnessClass {
            id,
            name: class.name.clone(),
            instructor: class.instructor.clone(),
            date_time: class.date_time,
            capacity: class.capacity,
            available_slots: class.capacity,
        })
    }

    pub async fn get_class(&self, id: i64) -> Result<Option<FitnessClass>, StoreError> {
        let class = sqlx::query_as::<_, FitnessClass>(
            "SELECT id, name, instructor, date_time, capacity, available_slots
             FROM fitness_classes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(class)
    }

    /// Classes scheduled strictly after `now`, earliest first.
    pub async fn upcoming_classes(&self, now: DateTime<Utc>) -> Result<Vec<FitnessClass>, StoreError> {
        let classes = sqlx::query_as::<_, FitnessClass>(
            "SELECT id, name, instructor, date_time, capacity, available_slots
             FROM fitness_classes
             WHERE date_time > ?
             ORDER BY date_time ASC, id ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(classes)
    }

    /// Inserts the booking and takes one slot in a single transaction.
    ///
    /// The insert goes first so the unique (class, email) constraint decides
    /// duplicates; the decrement is conditional on a free slot. Any failure
    /// drops the transaction, which rolls both writes back.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Booking, StoreError> {
        if self.get_class(booking.fitness_class).await?.is_none() {
            return Err(StoreError::ClassNotFound(booking.fitness_class));
        }

        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO bookings (fitness_class_id, client_name, client_email, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(booking.fitness_class)
        .bind(&booking.client_name)
        .bind(&booking.client_email)
        .bind(created_at)
        .execute(&mut *tx)
        .await;

        let id = match inserted {
            Ok(result) => result.last_insert_rowid(),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                debug!(class = booking.fitness_class, "duplicate booking rejected");
                return Err(StoreError::AlreadyBooked);
            }
            Err(sqlx::Error::Database(err)) if err.is_foreign_key_violation() => {
                return Err(StoreError::ClassNotFound(booking.fitness_class));
            }
            Err(err) => return Err(err.into()),
        };

        let taken = sqlx::query(
            "UPDATE fitness_classes SET available_slots = available_slots - 1
             WHERE id = ? AND available_slots > 0",
        )
        .bind(booking.fitness_class)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if taken == 0 {
            debug!(class = booking.fitness_class, "class is full");
            return Err(StoreError::NoSlots);
        }

        tx.commit().await?;
        info!(booking = id, class = booking.fitness_class, "booking created");

        Ok(Booking {
            id,
            fitness_class: booking.fitness_class,
            client_name: booking.client_name.clone(),
            client_email: booking.client_email.clone(),
            created_at,
        })
    }

    /// Bookings of `email` whose class starts strictly after `now`, ordered by
    /// class start.
    pub async fn client_bookings(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ClientBookingRow>, StoreError> {
        let rows = sqlx::query_as::<_, ClientBookingRow>(
            "SELECT b.id, b.fitness_class_id AS fitness_class, b.client_name, b.client_email,
                    b.created_at, c.name AS class_name, c.instructor, c.date_time AS class_date_time
             FROM bookings b
             JOIN fitness_classes c ON c.id = b.fitness_class_id
             WHERE b.client_email = ? AND c.date_time > ?
             ORDER BY c.date_time ASC, b.id ASC",
        )
        .bind(email)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Inserts a small demo timetable when no classes exist yet.
    pub async fn seed_demo_classes(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM fitness_classes")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            warn!(count, "classes already present, skipping demo seed");
            return Ok(0);
        }

        let demo = [
            ("Yoga", "Asha Mehta", 1, 20),
            ("Zumba", "Carlos Ruiz", 2, 15),
            ("HIIT", "Maya Chen", 3, 10),
        ];
        for (name, instructor, days, capacity) in demo {
            self.create_class(&NewFitnessClass {
                name: name.to_string(),
                instructor: instructor.to_string(),
                date_time: now + chrono::Duration::days(days),
                capacity,
            })
            .await?;
        }
        info!(count = demo.len(), "seeded demo classes");
        Ok(demo.len())
    }
}
