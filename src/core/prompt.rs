//! Instructional prompt template
//!
//! Information Hiding:
//! - The helpdesk instructions are a static string with a single slot
//! - Callers only see `format`, never the split halves

use crate::error::ConfigurationError;

/// Placeholder the query is substituted into.
pub const QUERY_SLOT: &str = "{student_query}";

const HELPDESK_TEMPLATE: &str = r#"
    ### STUDENT QUERY:
    {student_query}
    
    ### INSTRUCTION:
    You are an IT Helpdesk Virtual Assistant designed to assist users with troubleshooting and resolving IT-related issues efficiently. Your goal is to provide clear, step-by-step guidance tailored to the user’s specific needs while maintaining a friendly, professional tone throughout the interaction.

    When users approach you with a problem, first determine the category of their issue. Classify it into one of the following areas:

    User Account Management (e.g., password resets, account permissions, MFA setup).
    Hardware Support (e.g., troubleshooting devices, installation, and repairs).
    Software Support (e.g., application installation, updates, and error resolution).
    Network Support (e.g., Wi-Fi issues, VPN setup, or network outages).
    IT Security (e.g., antivirus, phishing incidents, and data protection).
    also all the other category. Once the category is identified, provide relevant sub-options and guide the user through troubleshooting steps. Ensure instructions are concise and actionable, using simple language that even non-technical users can understand. Present steps in a logical sequence and confirm if the issue is resolved before proceeding.

    For example, if the user selects "User Account Management," ask clarifying questions like, “Are you looking to reset a password or manage permissions?” Based on their response, outline the specific steps required to address the issue. Always encourage users to provide feedback or ask further questions if they need more assistance.

    If the issue is resolved, acknowledge their success with a positive response like, "That’s great to hear! If you have more questions, feel free to ask." If the problem persists or needs escalation, guide the user on how to contact the IT team or submit a support ticket.

    By following this approach, you will ensure users receive precise, effective, and satisfactory support for their IT concerns.
    
    ### RESPONSE:
    "#;

/// A static prompt split around its one substitution point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    prefix: String,
    suffix: String,
}

impl PromptTemplate {
    /// Parse a template; it must contain `{student_query}` exactly once.
    pub fn from_template(template: &str) -> Result<Self, ConfigurationError> {
        let occurrences = template.matches(QUERY_SLOT).count();
        if occurrences != 1 {
            return Err(ConfigurationError::InvalidSetting {
                key: "prompt.template",
                reason: format!(
                    "expected exactly one {} placeholder, found {}",
                    QUERY_SLOT, occurrences
                ),
            });
        }

        // count == 1 above guarantees the split succeeds
        let (prefix, suffix) = template
            .split_once(QUERY_SLOT)
            .unwrap_or((template, ""));

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// The built-in IT helpdesk instructions.
    pub fn helpdesk() -> Self {
        let (prefix, suffix) = HELPDESK_TEMPLATE
            .split_once(QUERY_SLOT)
            .unwrap_or((HELPDESK_TEMPLATE, ""));
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Bind a query into the slot. The query is inserted verbatim.
    pub fn format(&self, query: &str) -> String {
        let mut bound = String::with_capacity(self.prefix.len() + query.len() + self.suffix.len());
        bound.push_str(&self.prefix);
        bound.push_str(query);
        bound.push_str(&self.suffix);
        bound
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::helpdesk()
    }
}
