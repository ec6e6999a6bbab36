//! Recording fakes of the collaborators of the dispatch pipeline.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notifications_core::model::{
    Client, Delivery, Kind, MessageStatus, MessageStatusRecord, Options, Organization,
    OrganizationRole, Recipient, Response, Space, Token,
};

use crate::{
    service::{
        collaborator::{
            AllUserGuids, FindsUserGuids, OrganizationLoader, SpaceLoader, TokenLoader,
            ZonedTokenLoader,
        },
        database::{Connection, Transaction},
        error::{Error, Result},
        guid::GuidGenerator,
        job_enqueuer::{EnqueueContext, JobEnqueuer},
        message_status::MessageStatusStore,
        queue::{Job, Queue},
        registration::ClientRegistry,
    },
    uaa_client,
};

/// The error every failing fake returns.
pub fn boom() -> Error {
    Error::UaaGeneric { source: uaa_client::Error::Unexpected { message: "BOOM!".to_string() } }
}

pub fn request_received() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2015-06-08T14:38:03.180764129-07:00")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[derive(Debug, Default)]
struct ConnectionState {
    begins: usize,
    commits: usize,
    rollbacks: usize,
    fail_on_begin: bool,
    fail_on_commit: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FakeConnection {
    state: Arc<Mutex<ConnectionState>>,
}

impl FakeConnection {
    pub fn fail_on_begin(&self) { self.state.lock().unwrap().fail_on_begin = true; }

    pub fn fail_on_commit(&self) { self.state.lock().unwrap().fail_on_commit = true; }

    pub fn begin_count(&self) -> usize { self.state.lock().unwrap().begins }

    pub fn commit_count(&self) -> usize { self.state.lock().unwrap().commits }

    pub fn rollback_count(&self) -> usize { self.state.lock().unwrap().rollbacks }
}

#[async_trait]
impl Connection for FakeConnection {
    type Transaction = FakeTransaction;

    async fn begin(&self) -> Result<Self::Transaction> {
        let mut state = self.state.lock().unwrap();
        state.begins += 1;
        if state.fail_on_begin {
            return Err(Error::BeginTransaction {
                source: sqlx::Error::Protocol("the begin blew up".to_string()),
            });
        }
        Ok(FakeTransaction { state: self.state.clone() })
    }
}

#[derive(Debug)]
pub struct FakeTransaction {
    state: Arc<Mutex<ConnectionState>>,
}

#[async_trait]
impl Transaction for FakeTransaction {
    async fn commit(self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.commits += 1;
        if state.fail_on_commit {
            return Err(Error::CommitTransaction {
                source: sqlx::Error::Protocol("the commit blew up".to_string()),
            });
        }
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.state.lock().unwrap().rollbacks += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeGuidGenerator {
    guids: Mutex<VecDeque<String>>,
    generated: Mutex<usize>,
}

impl FakeGuidGenerator {
    pub fn new<I>(guids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self { guids: Mutex::new(guids.into_iter().map(Into::into).collect()), generated: Mutex::default() }
    }
}

impl GuidGenerator for FakeGuidGenerator {
    fn generate(&self) -> String {
        let mut generated = self.generated.lock().unwrap();
        *generated += 1;
        self.guids.lock().unwrap().pop_front().unwrap_or_else(|| format!("random-guid-{generated}"))
    }
}

#[derive(Debug, Default)]
pub struct FakeQueue {
    jobs: Mutex<Vec<Job>>,
    calls: Mutex<usize>,
    fail_on: Mutex<Option<usize>>,
}

impl FakeQueue {
    /// Makes the `call`-th enqueue (1-based) fail.
    pub fn fail_on_enqueue(&self, call: usize) { *self.fail_on.lock().unwrap() = Some(call); }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.jobs.lock().unwrap().iter().map(|job| job.decode().unwrap()).collect()
    }
}

#[async_trait]
impl Queue for FakeQueue {
    async fn enqueue(&self, job: Job) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *self.fail_on.lock().unwrap() == Some(*calls) {
            return Err(Error::InsertJob {
                queue_name: "deliveries".to_string(),
                source: sqlx::Error::Protocol("BOOM!".to_string()),
            });
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeMessageStatusStore {
    records: Mutex<Vec<MessageStatusRecord>>,
    calls: Mutex<usize>,
    fail_on: Mutex<Option<usize>>,
}

impl FakeMessageStatusStore {
    /// Makes the `call`-th insert (1-based) fail.
    pub fn fail_on_insert(&self, call: usize) { *self.fail_on.lock().unwrap() = Some(call); }

    pub fn records(&self) -> Vec<MessageStatusRecord> { self.records.lock().unwrap().clone() }
}

#[async_trait]
impl MessageStatusStore<FakeTransaction> for FakeMessageStatusStore {
    async fn insert(
        &self,
        _transaction: &mut FakeTransaction,
        record: &MessageStatusRecord,
    ) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *self.fail_on.lock().unwrap() == Some(*calls) {
            return Err(Error::InsertMessageStatus {
                message_id: record.id.clone(),
                source: sqlx::Error::Protocol("BOOM!".to_string()),
            });
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeTokenLoader {
    fail: Mutex<bool>,
    zones: Mutex<Vec<String>>,
    loads: Mutex<usize>,
}

impl FakeTokenLoader {
    pub fn fail(&self) { *self.fail.lock().unwrap() = true; }

    pub fn load_count(&self) -> usize { *self.loads.lock().unwrap() }

    pub fn zones(&self) -> Vec<String> { self.zones.lock().unwrap().clone() }

    fn token(&self) -> Result<Token> {
        *self.loads.lock().unwrap() += 1;
        if *self.fail.lock().unwrap() {
            return Err(boom());
        }
        Ok(Token::new("mister-client-token"))
    }
}

#[async_trait]
impl TokenLoader for FakeTokenLoader {
    async fn load(&self) -> Result<Token> { self.token() }
}

#[async_trait]
impl ZonedTokenLoader for FakeTokenLoader {
    async fn load(&self, uaa_host: &str) -> Result<Token> {
        self.zones.lock().unwrap().push(uaa_host.to_string());
        self.token()
    }
}

/// Audience resolver backed by fixed tables.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    pub space_users: HashMap<String, Vec<String>>,
    pub organization_users: HashMap<String, Vec<String>>,
    pub organization_role_users: HashMap<(String, OrganizationRole), Vec<String>>,
    pub scope_users: HashMap<String, Vec<String>>,
    pub all_users: Vec<String>,
    pub spaces: HashMap<String, Space>,
    pub organizations: HashMap<String, Organization>,
    pub fail: Mutex<bool>,
    pub calls: Mutex<usize>,
}

impl FakeDirectory {
    pub fn fail(&self) { *self.fail.lock().unwrap() = true; }

    pub fn call_count(&self) -> usize { *self.calls.lock().unwrap() }

    fn answer<T>(&self, value: Option<&T>) -> Result<T>
    where
        T: Clone + Default,
    {
        *self.calls.lock().unwrap() += 1;
        if *self.fail.lock().unwrap() {
            return Err(boom());
        }
        Ok(value.cloned().unwrap_or_default())
    }
}

#[async_trait]
impl FindsUserGuids for FakeDirectory {
    async fn user_guids_belonging_to_space(
        &self,
        space_guid: &str,
        _token: &Token,
    ) -> Result<Vec<String>> {
        self.answer(self.space_users.get(space_guid))
    }

    async fn user_guids_belonging_to_organization(
        &self,
        organization_guid: &str,
        role: Option<OrganizationRole>,
        _token: &Token,
    ) -> Result<Vec<String>> {
        match role {
            Some(role) => self.answer(
                self.organization_role_users.get(&(organization_guid.to_string(), role)),
            ),
            None => self.answer(self.organization_users.get(organization_guid)),
        }
    }

    async fn user_guids_belonging_to_scope(
        &self,
        scope: &str,
        _token: &Token,
    ) -> Result<Vec<String>> {
        self.answer(self.scope_users.get(scope))
    }
}

#[async_trait]
impl AllUserGuids for FakeDirectory {
    async fn all_user_guids(&self, _token: &Token) -> Result<Vec<String>> {
        self.answer(Some(&self.all_users))
    }
}

#[async_trait]
impl SpaceLoader for FakeDirectory {
    async fn load_space(&self, space_guid: &str, _token: &Token) -> Result<Space> {
        *self.calls.lock().unwrap() += 1;
        if *self.fail.lock().unwrap() {
            return Err(boom());
        }
        self.spaces.get(space_guid).cloned().ok_or_else(|| Error::CloudControllerNotFound {
            resource: "Space",
            guid: space_guid.to_string(),
        })
    }
}

#[async_trait]
impl OrganizationLoader for FakeDirectory {
    async fn load_organization(
        &self,
        organization_guid: &str,
        _token: &Token,
    ) -> Result<Organization> {
        *self.calls.lock().unwrap() += 1;
        if *self.fail.lock().unwrap() {
            return Err(boom());
        }
        self.organizations.get(organization_guid).cloned().ok_or_else(|| {
            Error::CloudControllerNotFound {
                resource: "Organization",
                guid: organization_guid.to_string(),
            }
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnqueueCall {
    pub recipients: Vec<Recipient>,
    pub options: Options,
    pub context: EnqueueContext,
}

/// Records its arguments and acknowledges every recipient.
#[derive(Debug, Default)]
pub struct FakeJobEnqueuer {
    calls: Mutex<Vec<EnqueueCall>>,
}

impl FakeJobEnqueuer {
    pub fn calls(&self) -> Vec<EnqueueCall> { self.calls.lock().unwrap().clone() }

    pub fn last_call(&self) -> EnqueueCall {
        self.calls.lock().unwrap().last().cloned().expect("enqueue was called")
    }
}

#[async_trait]
impl<C> JobEnqueuer<C> for FakeJobEnqueuer
where
    C: Connection,
{
    async fn enqueue(
        &self,
        _connection: &C,
        recipients: Vec<Recipient>,
        options: Options,
        context: EnqueueContext,
    ) -> Result<Vec<Response>> {
        let responses = recipients
            .iter()
            .enumerate()
            .map(|(index, recipient)| Response {
                status: MessageStatus::Queued,
                recipient: recipient.identity().to_string(),
                notification_id: format!("notification-{index}"),
                vcap_request_id: context.vcap_request_id.clone(),
            })
            .collect();
        self.calls.lock().unwrap().push(EnqueueCall { recipients, options, context });
        Ok(responses)
    }
}

/// Keeps registered clients and kinds in memory.
#[derive(Debug, Default)]
pub struct FakeClientRegistry {
    clients: Mutex<HashMap<String, Client>>,
    kinds: Mutex<HashMap<(String, String), Kind>>,
    fail: Mutex<bool>,
}

impl FakeClientRegistry {
    pub fn with_kind(self, client_id: &str, kind: Kind) -> Self {
        let _kind = self
            .kinds
            .lock()
            .unwrap()
            .insert((client_id.to_string(), kind.id.clone()), kind);
        self
    }

    pub fn fail(&self) { *self.fail.lock().unwrap() = true; }

    pub fn client(&self, client_id: &str) -> Option<Client> {
        self.clients.lock().unwrap().get(client_id).cloned()
    }

    /// Kinds of `client_id`, ordered by id.
    pub fn kinds(&self, client_id: &str) -> Vec<Kind> {
        let mut kinds = self
            .kinds
            .lock()
            .unwrap()
            .iter()
            .filter(|((owner, _), _)| owner == client_id)
            .map(|(_, kind)| kind.clone())
            .collect::<Vec<_>>();
        kinds.sort_by(|a, b| a.id.cmp(&b.id));
        kinds
    }
}

#[async_trait]
impl ClientRegistry for FakeClientRegistry {
    async fn register(&self, client: &Client, kinds: Option<&[Kind]>) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(Error::UpsertClient {
                client_id: client.id.clone(),
                source: sqlx::Error::Protocol("BOOM!".to_string()),
            });
        }
        let _client = self.clients.lock().unwrap().insert(client.id.clone(), client.clone());
        if let Some(kinds) = kinds {
            let mut stored = self.kinds.lock().unwrap();
            stored.retain(|(owner, id), _| {
                owner != &client.id || kinds.iter().any(|kind| &kind.id == id)
            });
            for kind in kinds {
                let _kind = stored.insert((client.id.clone(), kind.id.clone()), kind.clone());
            }
        }
        Ok(())
    }

    async fn find_or_create(&self, client_id: &str, kind_id: &str) -> Result<(Client, Kind)> {
        if *self.fail.lock().unwrap() {
            return Err(Error::FindClient {
                client_id: client_id.to_string(),
                source: sqlx::Error::Protocol("BOOM!".to_string()),
            });
        }
        let client = self
            .clients
            .lock()
            .unwrap()
            .entry(client_id.to_string())
            .or_insert_with(|| Client { id: client_id.to_string(), ..Client::default() })
            .clone();
        let kind = if kind_id.is_empty() {
            Kind::default()
        } else {
            self.kinds
                .lock()
                .unwrap()
                .entry((client_id.to_string(), kind_id.to_string()))
                .or_insert_with(|| Kind { id: kind_id.to_string(), ..Kind::default() })
                .clone()
        };
        Ok((client, kind))
    }
}
