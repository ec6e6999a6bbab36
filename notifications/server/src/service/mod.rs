mod collaborator;
mod database;
pub mod error;
mod guid;
mod job_enqueuer;
mod message_status;
mod queue;
mod registration;
mod sql_executor;
pub mod strategy;
#[cfg(test)]
pub mod testing;

pub use self::{
    collaborator::{
        AllUserGuids, FindsUserGuids, OrganizationLoader, SpaceLoader, TokenLoader,
        ZonedTokenLoader,
    },
    database::{Connection, PgTransaction, Transaction},
    error::{Error, Result},
    guid::{GuidGenerator, UuidGenerator},
    job_enqueuer::{DeliveryJobEnqueuer, EnqueueContext, JobEnqueuer},
    message_status::{MessageStatusStore, PostgresMessageStatusStore},
    queue::{Job, PostgresQueue, Queue, DEFAULT_QUEUE_NAME},
    registration::{ClientRegistry, PostgresClientRegistry},
    strategy::{Strategy, StrategyDependencies, StrategyRegistry},
};
