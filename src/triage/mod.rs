pub mod agent;
pub mod interpret;
pub mod pipeline;
pub mod thread;

pub use agent::{Agent, urgent_indices};
pub use interpret::{
    answer_question, categorize_email, draft_reply, extract_actions, parse_action_items,
    parse_category,
};
pub use pipeline::run_ingestion;
pub use thread::collect_thread_context;
