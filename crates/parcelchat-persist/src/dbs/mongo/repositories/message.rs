use futures::TryStreamExt;
use mongodb::{bson::doc, bson::oid::ObjectId, Client, ClientSession, Collection};

use crate::dbs::mongo::models::MongoMessage;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("chat_messages");
        Self { collection }
    }

    /// Save a single message inside the caller's transaction
    pub async fn save_message(
        &self,
        message: &MongoMessage,
        session: &mut ClientSession,
    ) -> Result<ObjectId> {
        self.collection.insert_one(message).session(&mut *session).await?;
        Ok(message.id)
    }

    /// Get all messages for a thread in display order
    pub async fn get_messages(&self, thread_id: ObjectId) -> Result<Vec<MongoMessage>> {
        let filter = doc! { "thread_id": thread_id };
        let messages = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1, "seq": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    /// Delete every message of a thread inside the caller's transaction
    pub async fn delete_for_thread(
        &self,
        thread_id: ObjectId,
        session: &mut ClientSession,
    ) -> Result<u64> {
        let filter = doc! { "thread_id": thread_id };
        let result = self.collection.delete_many(filter).session(&mut *session).await?;
        Ok(result.deleted_count)
    }
}
