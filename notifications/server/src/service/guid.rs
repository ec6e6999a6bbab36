/// Source of message IDs, called once per recipient.
pub trait GuidGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl GuidGenerator for UuidGenerator {
    fn generate(&self) -> String { uuid::Uuid::new_v4().to_string() }
}
