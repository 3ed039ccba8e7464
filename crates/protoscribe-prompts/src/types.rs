use serde::{Deserialize, Serialize};

/// A formatting rule appended to a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Prose made of full sentences; no one-word items
    FullSentences,
    /// Company and medicine names replaced with generic words
    Deidentify,
    /// No dates, page numbers or page titles
    NoMetadata,
    /// No references to other sections or pages
    SelfContained,
    /// Over-specific content made broader
    Broaden,
    /// Stay within the letter limit
    LengthLimit,
}

impl Rule {
    /// Rule text; `length_limit` is only used by [`Rule::LengthLimit`]
    pub fn text(&self, length_limit: u32) -> String {
        match self {
            Self::FullSentences => {
                "Write only the passage with full sentence and exclude other items with a single word"
                    .to_string()
            }
            Self::Deidentify => {
                "If there's company name or medicine name in the text, change it to unidentifiable words such as medicine, drug, company, hospital"
                    .to_string()
            }
            Self::NoMetadata => {
                "Additional letters that doesn't belong to the main text such as 'Date, page, Title of the page' should never be included. Only the FULL sentence is available"
                    .to_string()
            }
            Self::SelfContained => {
                "Do not indicate other section or page number. The section you wrote should be understandable in itself"
                    .to_string()
            }
            Self::Broaden => "If there's too specific contents, make it broader".to_string(),
            Self::LengthLimit => format!("Write within {} letters", length_limit),
        }
    }
}

/// Knobs for prompt construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOptions {
    /// Ask the refinement pass to replace company and medicine names
    #[serde(default = "default_true")]
    pub deidentify: bool,
    /// Append the additional free-text request when present
    #[serde(default = "default_true")]
    pub include_additional_request: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            deidentify: true,
            include_additional_request: true,
        }
    }
}

impl PromptOptions {
    pub fn with_deidentify(mut self, deidentify: bool) -> Self {
        self.deidentify = deidentify;
        self
    }

    /// Rules for the generation pass, in prompt order
    pub fn generation_rules(&self) -> Vec<Rule> {
        vec![
            Rule::FullSentences,
            Rule::NoMetadata,
            Rule::SelfContained,
            Rule::LengthLimit,
        ]
    }

    /// Rules for the refinement pass, in prompt order
    pub fn refinement_rules(&self) -> Vec<Rule> {
        let mut rules = vec![Rule::FullSentences];
        if self.deidentify {
            rules.push(Rule::Deidentify);
        }
        rules.extend([
            Rule::NoMetadata,
            Rule::SelfContained,
            Rule::Broaden,
            Rule::LengthLimit,
        ]);
        rules
    }
}
