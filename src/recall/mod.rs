pub mod storage;
pub mod types;

pub use storage::{get_recall_path, load_recall_state, save_recall_state};
pub use types::{RecallEntry, RecallState};
