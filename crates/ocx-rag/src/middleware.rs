//! Conditional RAG middleware.
//!
//! Sits in front of a generation call and decides, per request, whether to
//! splice retrieved context into the prompt. Every gate fails open: a
//! request that doesn't qualify passes through byte-identical.

use std::sync::Arc;

use tracing::{debug, instrument};

use ocx_core::{
    ContentBlock, ContextSource, GenerationBackend, ModelCallParams, PromptMessage, Result,
    RetrievalQuery, Role,
};

use crate::prompts::{classify, hypothetical_answer, MessageKind, CONTEXT_PREAMBLE};

/// Middleware transforming model-call parameters ahead of generation.
pub struct RagMiddleware {
    generator: Arc<dyn GenerationBackend>,
    source: Arc<dyn ContextSource>,
}

impl RagMiddleware {
    pub fn new(generator: Arc<dyn GenerationBackend>, source: Arc<dyn ContextSource>) -> Self {
        Self { generator, source }
    }

    /// Transform call parameters, possibly enriching the final user message
    /// with retrieved context.
    ///
    /// Gates, in order: a retrieval scope must be present; the last message
    /// must exist and be a user message; the classifier must label it a
    /// question; the vector store must be available. Failing any gate
    /// returns the parameters unchanged. LLM and retrieval errors propagate.
    #[instrument(skip(self, params), fields(subsystem = "rag", component = "middleware", op = "transform_params"))]
    pub async fn transform_params(&self, params: ModelCallParams) -> Result<ModelCallParams> {
        let Some(scope) = params.provider_options.clone() else {
            return Ok(params);
        };

        let Some(last) = params.prompt.last() else {
            return Ok(params);
        };
        if last.role != Role::User {
            debug!("Last message is not from the user, skipping retrieval");
            return Ok(params);
        }

        let question = last.joined_text();

        if classify(&self.generator, &question).await? != MessageKind::Question {
            debug!("Message not classified as a question, skipping retrieval");
            return Ok(params);
        }

        let hypothetical = hypothetical_answer(&self.generator, &question).await?;

        let retrieved = self
            .source
            .top_k(RetrievalQuery {
                user_id: scope.user_id,
                job_ids: scope.job_ids,
                k: ocx_core::defaults::RETRIEVAL_TOP_K,
                query: hypothetical,
            })
            .await?;

        let Some(chunks) = retrieved else {
            debug!("Vector store unavailable, passing request through");
            return Ok(params);
        };

        debug!(result_count = chunks.len(), "Splicing retrieved context");

        let mut prompt = params.prompt;
        if let Some(mut last) = prompt.pop() {
            last.content.push(ContentBlock::text(CONTEXT_PREAMBLE));
            for chunk in chunks {
                last.content.push(ContentBlock::text(chunk.page_content));
            }
            prompt.push(PromptMessage {
                role: Role::User,
                content: last.content,
            });
        }

        Ok(ModelCallParams {
            prompt,
            provider_options: params.provider_options,
        })
    }
}
