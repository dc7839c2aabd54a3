//! MongoDB-backed simulation store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, DateTime as BsonDateTime},
    error::{ErrorKind, WriteError, WriteFailure},
    options::{
        FindOneAndUpdateOptions, FindOneOptions, FindOptions, IndexOptions, ReturnDocument,
        UpdateOptions,
    },
    Client as MongoClient, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::time::Instant;
use tracing::instrument;

use super::store::{SimulationFilter, SimulationStore, StoreError};
use crate::gst::parse_sequence;
use crate::models::{LearningProgress, SimulationRecord};

const DUPLICATE_KEY: i32 = 11000;

/// Per-day invoice counter document: `{ _id: "INV20261019", seq: 7 }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InvoiceCounter {
    #[serde(rename = "_id")]
    prefix: String,
    seq: i64,
}

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for gst-simulation-service");

        let simulations = self.simulations();

        // Backstop for the counter: two records can never share a number.
        let invoice_number_index = IndexModel::builder()
            .keys(doc! { "invoiceNumber": 1 })
            .options(
                IndexOptions::builder()
                    .name("invoice_number_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        simulations
            .create_index(invoice_number_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create unique invoiceNumber index: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on gst_simulations.invoiceNumber");

        let learner_index = IndexModel::builder()
            .keys(doc! { "learnerId": 1, "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("learner_recent_lookup".to_string())
                    .build(),
            )
            .build();

        simulations
            .create_index(learner_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create learner index on gst_simulations: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on gst_simulations.(learnerId, createdAt)");

        Ok(())
    }

    pub fn simulations(&self) -> Collection<SimulationRecord> {
        self.db.collection("gst_simulations")
    }

    fn invoice_counters(&self) -> Collection<InvoiceCounter> {
        self.db.collection("invoice_counters")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError {
            code: DUPLICATE_KEY,
            ..
        }))
    )
}

fn observe(operation: &'static str, started: Instant) {
    metrics::histogram!("gst_db_query_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}

#[async_trait]
impl SimulationStore for MongoDb {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(simulation_id = %record.id, invoice_number = %record.invoice_number))]
    async fn insert_simulation(&self, record: &SimulationRecord) -> Result<(), StoreError> {
        let started = Instant::now();
        let result = self.simulations().insert_one(record, None).await;
        observe("insert_simulation", started);

        result.map(|_| ()).map_err(|e| {
            if is_duplicate_key(&e) {
                tracing::warn!("Invoice number already taken");
                StoreError::DuplicateInvoiceNumber(record.invoice_number.clone())
            } else {
                tracing::error!("Failed to insert simulation: {}", e);
                StoreError::from(e)
            }
        })
    }

    #[instrument(skip(self))]
    async fn get_simulation(&self, id: &str) -> Result<Option<SimulationRecord>, StoreError> {
        let started = Instant::now();
        let record = self.simulations().find_one(doc! { "_id": id }, None).await?;
        observe("get_simulation", started);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list_simulations(
        &self,
        filter: &SimulationFilter,
    ) -> Result<(Vec<SimulationRecord>, u64), StoreError> {
        let started = Instant::now();

        let mut query = doc! {};
        if let Some(learner_id) = &filter.learner_id {
            query.insert("learnerId", learner_id.as_str());
        }

        let total = self
            .simulations()
            .count_documents(query.clone(), None)
            .await?;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(filter.skip)
            .limit(filter.limit)
            .build();

        let cursor = self.simulations().find(query, options).await?;
        let records: Vec<SimulationRecord> = cursor.try_collect().await?;

        observe("list_simulations", started);
        Ok((records, total))
    }

    #[instrument(skip(self, record), fields(simulation_id = %record.id))]
    async fn replace_simulation(&self, record: &SimulationRecord) -> Result<bool, StoreError> {
        let started = Instant::now();
        let result = self
            .simulations()
            .replace_one(doc! { "_id": record.id.as_str() }, record, None)
            .await?;
        observe("replace_simulation", started);
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self, progress))]
    async fn update_progress(
        &self,
        id: &str,
        progress: &LearningProgress,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<SimulationRecord>, StoreError> {
        let started = Instant::now();

        let progress = bson::to_bson(progress).map_err(|e| {
            StoreError::Database(anyhow::anyhow!("Failed to serialize progress: {}", e))
        })?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let record = self
            .simulations()
            .find_one_and_update(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "progress": progress,
                        "updatedAt": BsonDateTime::from_chrono(updated_at),
                    }
                },
                options,
            )
            .await?;

        observe("update_progress", started);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn delete_simulation(&self, id: &str) -> Result<bool, StoreError> {
        let started = Instant::now();
        let result = self.simulations().delete_one(doc! { "_id": id }, None).await?;
        observe("delete_simulation", started);
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn latest_invoice_number(&self, prefix: &str) -> Result<Option<String>, StoreError> {
        // Prefixes are fixed-width, so string order equals sequence order.
        let options = FindOneOptions::builder()
            .sort(doc! { "invoiceNumber": -1 })
            .build();

        let latest = self
            .simulations()
            .find_one(
                doc! { "invoiceNumber": { "$regex": format!("^{}", regex::escape(prefix)) } },
                options,
            )
            .await?;

        Ok(latest.map(|record| record.invoice_number))
    }

    #[instrument(skip(self))]
    async fn next_invoice_sequence(&self, prefix: &str) -> Result<u32, StoreError> {
        let started = Instant::now();
        let counters = self.invoice_counters();

        // $max is monotonic, so racing callers can only raise the floor.
        let persisted = self
            .latest_invoice_number(prefix)
            .await?
            .as_deref()
            .and_then(parse_sequence);
        if let Some(seq) = persisted {
            counters
                .update_one(
                    doc! { "_id": prefix },
                    doc! { "$max": { "seq": i64::from(seq) } },
                    UpdateOptions::builder().upsert(true).build(),
                )
                .await?;
        }

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = counters
            .find_one_and_update(
                doc! { "_id": prefix },
                doc! { "$inc": { "seq": 1_i64 } },
                options,
            )
            .await?
            .ok_or_else(|| {
                StoreError::Database(anyhow::anyhow!(
                    "Invoice counter {} missing after upsert",
                    prefix
                ))
            })?;

        observe("next_invoice_sequence", started);

        u32::try_from(counter.seq).map_err(|_| {
            StoreError::Database(anyhow::anyhow!(
                "Invoice counter {} holds out-of-range value {}",
                counter.prefix,
                counter.seq
            ))
        })
    }

    #[instrument(skip(self))]
    async fn current_invoice_sequence(&self, prefix: &str) -> Result<u32, StoreError> {
        let counter = self
            .invoice_counters()
            .find_one(doc! { "_id": prefix }, None)
            .await?;

        match counter {
            Some(counter) => u32::try_from(counter.seq).map_err(|_| {
                StoreError::Database(anyhow::anyhow!(
                    "Invoice counter {} holds out-of-range value {}",
                    counter.prefix,
                    counter.seq
                ))
            }),
            None => Ok(0),
        }
    }
}
