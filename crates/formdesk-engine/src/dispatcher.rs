//! Dispatcher: the single entry point a transport adapter calls
//!
//! `handle` parses one inbound message, routes the command to its handler and
//! returns the reply. The dispatcher holds no per-request state and is shared
//! across threads behind a reference or `Arc`.
//!
//! ## Errors
//!
//! Only `StorageUnavailable` comes back as `Err`; the adapter decides whether
//! to retry or to answer with [`Dispatcher::failure_reply`]. Any other fault
//! is logged and answered with the failure reply directly.

#![allow(clippy::result_large_err)]

use crate::handlers::{conversation, report, timesheet, HandlerEnv};
use crate::ingest::{AttachmentFetcher, UriFetcher};
use crate::replies;
use formdesk_core::errors::{ExErrorKind, Result};
use formdesk_core::{log_op_end, log_op_error, log_op_start};
use formdesk_core::{
    AccessPolicy, AllowListPolicy, Command, DeskConfig, Grammar, OutboundReply, ParsedInbound,
    ProjectId,
};
use formdesk_core_types::{RequestContext, Sensitive};
use formdesk_store::ArtifactStore;
use std::sync::Arc;
use std::time::Instant;

pub struct Dispatcher {
    grammar: Grammar,
    policy: Arc<dyn AccessPolicy>,
    store: Arc<ArtifactStore>,
    fetcher: Arc<dyn AttachmentFetcher>,
    submit_project: ProjectId,
}

impl Dispatcher {
    pub fn new(
        grammar: Grammar,
        policy: Arc<dyn AccessPolicy>,
        store: Arc<ArtifactStore>,
        fetcher: Arc<dyn AttachmentFetcher>,
        submit_project: ProjectId,
    ) -> Self {
        Self {
            grammar,
            policy,
            store,
            fetcher,
            submit_project,
        }
    }

    /// Wire grammar, allow-list policy and URI fetcher from one config
    pub fn from_config(config: &DeskConfig, store: Arc<ArtifactStore>) -> Result<Self> {
        let fetcher = UriFetcher::from_config(&config.storage)?;
        Ok(Self::new(
            Grammar::from_config(config),
            Arc::new(AllowListPolicy::from_config(config)),
            store,
            Arc::new(fetcher),
            ProjectId::new(config.submit_project.as_str()),
        ))
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Reply for a message that failed with a storage error
    pub fn failure_reply() -> OutboundReply {
        OutboundReply::text(replies::TEMPORARY_FAILURE)
    }

    /// Handle one message with a fresh request id
    pub fn handle(&self, inbound: &ParsedInbound) -> Result<OutboundReply> {
        self.handle_with_context(&RequestContext::new(), inbound)
    }

    /// Handle one message under an adapter-supplied request context
    pub fn handle_with_context(
        &self,
        ctx: &RequestContext,
        inbound: &ParsedInbound,
    ) -> Result<OutboundReply> {
        let command = self.grammar.parse(inbound);
        let sender = Sensitive::new(inbound.sender.as_str()).masked();

        log_op_start!(
            "dispatch",
            request_id = ctx.request_id.as_str(),
            sender = sender.as_str(),
            command = command.name()
        );
        let start = Instant::now();

        match self.route(&inbound.sender, &command) {
            Ok(reply) => {
                log_op_end!(
                    "dispatch",
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = ctx.request_id.as_str(),
                    command = command.name(),
                    attachments = reply.attachment_uris.len()
                );
                Ok(reply)
            }
            Err(e) => {
                let mut e = e.with_request_id(ctx.request_id.clone());
                if let Some(trace_id) = &ctx.trace_id {
                    e = e.with_trace_id(trace_id.clone());
                }
                log_op_error!(
                    "dispatch",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = ctx.request_id.as_str(),
                    command = command.name()
                );
                if e.kind() == ExErrorKind::StorageUnavailable {
                    Err(e)
                } else {
                    Ok(Self::failure_reply())
                }
            }
        }
    }

    /// Run the handler for an already parsed command
    pub fn route(&self, sender: &str, command: &Command) -> Result<OutboundReply> {
        let env = HandlerEnv {
            policy: self.policy.as_ref(),
            store: self.store.as_ref(),
            fetcher: self.fetcher.as_ref(),
            submit_project: &self.submit_project,
        };

        match command {
            Command::Greeting => Ok(conversation::greeting()),
            Command::Help { topic } => Ok(conversation::help(*topic)),
            Command::RequestTimesheet { project_id } => {
                timesheet::request(&env, sender, project_id)
            }
            Command::SubmitTimesheet { attachment } => timesheet::submit(&env, sender, attachment),
            Command::RequestReport { project_id, period } => {
                report::request(&env, sender, project_id, *period)
            }
            Command::ParseFailure { .. }
            | Command::InvalidPeriod { .. }
            | Command::UnsupportedAttachment { .. }
            | Command::Unrecognized { .. } => Ok(conversation::guidance(command)
                .unwrap_or_else(|| OutboundReply::text(replies::unrecognized("")))),
        }
    }
}
