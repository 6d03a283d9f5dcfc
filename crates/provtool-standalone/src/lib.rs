//! Standalone Builder (§4.4 design notes, §6.3 `standalone`): single-file
//! container creation outside the Directory Wrapper's batch flow, either
//! driven by interactive Q&A with input memoization, or by the most recent
//! Git commit that touched a file.

pub mod gitsource;
pub mod interactive;
pub mod memo;
pub mod writer;

pub use gitsource::{last_commit_for_file, CommitProvenance};
pub use interactive::{Session, StandaloneAnswers};
pub use memo::{MemoStore, MEMO_COLUMNS};
pub use writer::{write_prov_file, WrittenContainer};

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
