use async_trait::async_trait;
use mongodb::error::TRANSIENT_TRANSACTION_ERROR;
use mongodb::{bson::oid::ObjectId, Client, ClientSession};
use parcelchat_types::ThreadStatus;

use crate::dbs::mongo::models::MongoMessage;
use crate::dbs::mongo::repositories::{MongoMessageRepository, MongoThreadRepository};
use crate::error::{PersistError, Result};
use crate::models::{Contact, Message, NewMessage, Thread, ThreadFilter};
use crate::trait_client::PersistenceClient;

/// MongoDB backend
///
/// Thread deletion and message appends run in multi-document transactions,
/// which require the server to be a replica set or sharded cluster.
pub struct MongoPersistenceClient {
    client: Client,
    message_repo: MongoMessageRepository,
    thread_repo: MongoThreadRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let message_repo = MongoMessageRepository::new(&client, database);
        let thread_repo = MongoThreadRepository::new(&client, database);

        Ok(Self {
            client,
            message_repo,
            thread_repo,
        })
    }
}

const TRANSACTION_ATTEMPTS: usize = 3;

fn is_transient(err: &PersistError) -> bool {
    matches!(err, PersistError::Database(e) if e.contains_label(TRANSIENT_TRANSACTION_ERROR))
}

impl MongoPersistenceClient {
    /// Remove the thread and its messages, committing on success.
    /// Returns None, uncommitted, when the thread does not exist.
    async fn delete_in_transaction(
        &self,
        thread_id: ObjectId,
        session: &mut ClientSession,
    ) -> Result<Option<u64>> {
        if self.thread_repo.delete_thread(thread_id, session).await? == 0 {
            return Ok(None);
        }
        let messages = self.message_repo.delete_for_thread(thread_id, session).await?;
        session.commit_transaction().await?;
        Ok(Some(messages))
    }

    /// Reserve a seq and insert the message in one transaction, so a
    /// concurrent delete either sees the message or prevents it.
    /// Returns None, uncommitted, when the thread does not exist.
    async fn append_in_transaction(
        &self,
        thread_id: ObjectId,
        message: &NewMessage,
        session: &mut ClientSession,
    ) -> Result<Option<MongoMessage>> {
        let Some(seq) = self.thread_repo.next_seq(thread_id, session).await? else {
            return Ok(None);
        };

        let mongo_message = MongoMessage {
            id: ObjectId::new(),
            thread_id,
            sender: message.sender,
            text: message.text.clone(),
            seq,
            created_at: mongodb::bson::DateTime::now().to_chrono(),
        };
        self.message_repo.save_message(&mongo_message, session).await?;
        session.commit_transaction().await?;
        Ok(Some(mongo_message))
    }
}

/// Thread ids are opaque to callers; anything that is not a valid ObjectId
/// simply names a thread that does not exist.
fn parse_thread_id(thread_id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(thread_id).map_err(|_| PersistError::ThreadNotFound(thread_id.to_string()))
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn create_thread(&self, contact: Contact) -> Result<Thread> {
        let mongo_thread = self.thread_repo.create_thread(contact).await?;
        Ok(mongo_thread.into())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let Ok(object_id) = ObjectId::parse_str(thread_id) else {
            return Ok(None);
        };
        let mongo_thread = self.thread_repo.get_thread(object_id).await?;
        Ok(mongo_thread.map(|t| t.into()))
    }

    async fn list_threads(&self, filter: ThreadFilter) -> Result<Vec<Thread>> {
        let mongo_threads = self.thread_repo.list_threads(&filter).await?;
        Ok(mongo_threads.into_iter().map(|t| t.into()).collect())
    }

    async fn set_status(&self, thread_id: &str, status: ThreadStatus) -> Result<Thread> {
        let object_id = parse_thread_id(thread_id)?;
        self.thread_repo
            .set_status(object_id, status)
            .await?
            .map(|t| t.into())
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let object_id = parse_thread_id(thread_id)?;

        let mut attempt = 1;
        let messages = loop {
            let mut session = self.client.start_session().await?;
            session.start_transaction().await?;

            match self.delete_in_transaction(object_id, &mut session).await {
                Ok(Some(messages)) => break messages,
                Ok(None) => {
                    session.abort_transaction().await?;
                    return Err(PersistError::ThreadNotFound(thread_id.to_string()));
                }
                Err(e) => {
                    let _ = session.abort_transaction().await;
                    if attempt < TRANSACTION_ATTEMPTS && is_transient(&e) {
                        attempt += 1;
                        continue;
                    }
                    return Err(e);
                }
            }
        };

        tracing::debug!(thread_id = %thread_id, messages, "Deleted thread with messages");
        Ok(())
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message> {
        let thread_oid = parse_thread_id(&message.thread_id)?;

        let mut attempt = 1;
        loop {
            let mut session = self.client.start_session().await?;
            session.start_transaction().await?;

            match self.append_in_transaction(thread_oid, &message, &mut session).await {
                Ok(Some(saved)) => return Ok(saved.into()),
                Ok(None) => {
                    session.abort_transaction().await?;
                    return Err(PersistError::ThreadNotFound(message.thread_id.clone()));
                }
                Err(e) => {
                    let _ = session.abort_transaction().await;
                    if attempt < TRANSACTION_ATTEMPTS && is_transient(&e) {
                        tracing::debug!(thread_id = %message.thread_id, attempt, "Retrying message append");
                        attempt += 1;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let Ok(object_id) = ObjectId::parse_str(thread_id) else {
            return Ok(Vec::new());
        };
        let mongo_messages = self.message_repo.get_messages(object_id).await?;
        Ok(mongo_messages.into_iter().map(|m| m.into()).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.thread_repo.ping().await
    }
}
