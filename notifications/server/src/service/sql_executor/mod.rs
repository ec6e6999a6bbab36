mod job;
mod message;
mod registration;

pub use self::{
    job::JobSqlExecutor, message::MessageSqlExecutor, registration::RegistrationSqlExecutor,
};
