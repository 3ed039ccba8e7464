pub mod builder;
pub mod sections;
pub mod types;

pub use builder::{generation_prompt, refinement_prompt, PromptBuilder};
pub use sections::{
    build_rule_list, build_study_title, GENERATION_SYSTEM_ROLE, REFINEMENT_SYSTEM_ROLE,
};
pub use types::{PromptOptions, Rule};
