//! Response Resolver - one query in, one reply out
//!
//! Stateless: every call binds the query into the helpdesk template and
//! makes exactly one completion request. Prior turns are never sent.

use crate::core::llm::CompletionService;
use crate::core::prompt::PromptTemplate;
use crate::error::ResolutionError;
use std::sync::Arc;

#[derive(Clone)]
pub struct ResponseResolver {
    template: PromptTemplate,
    service: Arc<dyn CompletionService>,
}

impl ResponseResolver {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self::with_template(PromptTemplate::helpdesk(), service)
    }

    pub fn with_template(template: PromptTemplate, service: Arc<dyn CompletionService>) -> Self {
        Self { template, service }
    }

    pub async fn resolve(&self, query: &str) -> Result<String, ResolutionError> {
        let prompt = self.template.format(query);

        tracing::info!(
            "[ResponseResolver] Resolving query ({} chars) with model {}",
            query.chars().count(),
            self.service.model()
        );

        match self.service.complete(&prompt).await {
            Ok(reply) => {
                tracing::debug!("[ResponseResolver] Reply received ({} chars)", reply.len());
                Ok(reply)
            }
            Err(e) => {
                tracing::error!("[ResponseResolver] Resolution failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }
}
