pub mod memo;

pub use memo::{InMemoryMemoRepository, MemoRepository};
