use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{bson, bson::doc, bson::oid::ObjectId, Client, ClientSession, Collection};
use parcelchat_types::ThreadStatus;

use crate::dbs::mongo::models::MongoThread;
use crate::error::Result;
use crate::models::{Contact, ThreadFilter};

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("chat_threads");
        Self { collection }
    }

    /// Create a new open thread
    pub async fn create_thread(&self, contact: Contact) -> Result<MongoThread> {
        let now = Utc::now();
        let thread = MongoThread {
            id: ObjectId::new(),
            contact,
            status: ThreadStatus::Open,
            created_at: now,
            updated_at: now,
            last_seq: 0,
        };

        self.collection.insert_one(&thread).await?;
        Ok(thread)
    }

    /// Get thread by ID
    pub async fn get_thread(&self, thread_id: ObjectId) -> Result<Option<MongoThread>> {
        let filter = doc! { "_id": thread_id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// List threads in `Thread::cmp_by_activity` order
    pub async fn list_threads(&self, filter: &ThreadFilter) -> Result<Vec<MongoThread>> {
        let mut query = doc! {};
        if let Some(status) = filter.status {
            query.insert("status", status.as_str());
        }

        let threads = self
            .collection
            .find(query)
            .sort(doc! { "updated_at": -1, "created_at": -1, "_id": -1 })
            .limit(filter.limit)
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    /// Set status and return the updated thread, or None if it does not exist.
    /// `updated_at` only moves when the status actually changes.
    pub async fn set_status(
        &self,
        thread_id: ObjectId,
        status: ThreadStatus,
    ) -> Result<Option<MongoThread>> {
        let filter = doc! { "_id": thread_id, "status": { "$ne": status.as_str() } };
        let update = doc! {
            "$set": {
                "status": status.as_str(),
                "updated_at": bson::DateTime::now()
            }
        };

        let changed = self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;

        match changed {
            Some(thread) => Ok(Some(thread)),
            None => self.get_thread(thread_id).await,
        }
    }

    /// Reserve the next message sequence number and touch `updated_at` inside
    /// the caller's transaction. Returns None if the thread does not exist.
    pub async fn next_seq(
        &self,
        thread_id: ObjectId,
        session: &mut ClientSession,
    ) -> Result<Option<i64>> {
        let filter = doc! { "_id": thread_id };
        let update = doc! {
            "$inc": { "last_seq": 1_i64 },
            "$set": { "updated_at": bson::DateTime::now() }
        };

        let thread = self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .session(&mut *session)
            .await?;
        Ok(thread.map(|t| t.last_seq))
    }

    /// Delete thread inside the caller's transaction, returning the number removed
    pub async fn delete_thread(
        &self,
        thread_id: ObjectId,
        session: &mut ClientSession,
    ) -> Result<u64> {
        let filter = doc! { "_id": thread_id };
        let result = self.collection.delete_one(filter).session(&mut *session).await?;
        Ok(result.deleted_count)
    }

    pub async fn ping(&self) -> Result<()> {
        self.collection.estimated_document_count().await?;
        Ok(())
    }
}
