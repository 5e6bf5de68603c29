// Core Layer
pub mod executor;
pub mod interpreter;
pub mod llm_client;
pub mod pipeline;
pub mod prompts;

pub use executor::{BatchOperation, BatchReport, FileOperationExecutor};
pub use interpreter::{CommandInterpreter, Interpretation};
pub use llm_client::{ChatCompletionClient, ChatMessage, Role, TextGenerator};
pub use pipeline::{CommandPipeline, CommandTicket, Delivery, PipelineOutcome, PipelineState};
