pub mod dynamo;
pub mod memory;

pub use dynamo::{DynamoStorage, DynamoTable, ShortieTable};
pub use memory::MemoryStorage;
