use protoscribe_protocol::TrialParameters;

use crate::types::Rule;

/// System role for the generation pass
pub const GENERATION_SYSTEM_ROLE: &str =
    "You are a clinical scientist with expertise in writing clinical trial protocols.";

/// System role for the refinement pass
pub const REFINEMENT_SYSTEM_ROLE: &str =
    "You are a helpful assistant that analyzes clinical trial descriptions.";

const RULES_HEADER: &str = "Write as the following rules:";

/// Build the study title sentence from the trial parameters
pub fn build_study_title(params: &TrialParameters) -> String {
    format!(
        "(MOA) of {}, a {}, in combination with immunotherapy, in patients with {}, phase {}",
        params.specific_moa, params.moa_category, params.cancer_type, params.phase
    )
}

/// Build the opening request naming the section and the study
pub fn build_section_request(params: &TrialParameters) -> String {
    format!(
        "Write a clinical trial protocol section for \n'{}'\nfor the study titled: \n'{}'\n",
        params.section_request,
        build_study_title(params)
    )
}

/// Build a bulleted rule list, one `- rule` per line, ending with a newline
pub fn build_rule_list(rules: &[Rule], length_limit: u32) -> String {
    let mut lines = vec![RULES_HEADER.to_string()];
    lines.extend(rules.iter().map(|r| format!("- {}", r.text(length_limit))));
    let mut list = lines.join("\n");
    list.push('\n');
    list
}

/// Build the trailing additional-request line
pub fn build_additional_request(request: &str) -> String {
    format!("\nAdditional request: {}\n", request)
}

/// Build the refinement header wrapping the draft text
pub fn build_refinement_header(draft: &str) -> String {
    format!(
        "Refine the following text to match the given rules:\n\n{}\n\n",
        draft
    )
}
