use uuid::Uuid;

pub const ID_PREFIX: &str = "access-modal-";
const SUFFIX_LEN: usize = 6;

/// Source of ids for modals configured without one
pub trait IdGenerator {
    fn generate(&self) -> String;
}

/// `access-modal-` followed by six characters of a v4 UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!("{ID_PREFIX}{}", &uuid[..SUFFIX_LEN])
    }
}
