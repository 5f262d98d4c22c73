//! TaskDost — task management with a bilingual natural-language chat agent.
//!
//! Library surface used by the server binary (`taskdost`), the offline CLI
//! (`taskdost-cli`), and the integration tests.

pub mod agent;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod llm;
pub mod logger;
pub mod store;
