use std::sync::PoisonError;

use declarative_render::{
    ComponentHandle, DomEvent, Item, MemoryDom, Mounts, NodeId, Resolver, TopologyResolver,
};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::SessionError;
use crate::protocol::{ClientEnvelope, HostEnvelope, RenderRequest, error_envelope};

#[derive(Debug)]
pub struct HostSession {
    sid: String,
    last_rev: Option<u64>,
    resolver: TopologyResolver,
    dom: MemoryDom,
    mounts: Mounts<NodeId>,
}

impl HostSession {
    pub fn new(sid: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            last_rev: None,
            resolver: TopologyResolver::new(),
            dom: MemoryDom::new(),
            mounts: Mounts::new(),
        }
    }

    /// Handles one inbound envelope; failures come back as `error` envelopes.
    pub fn handle(&mut self, envelope: ClientEnvelope) -> Option<HostEnvelope> {
        let rev = match &envelope {
            ClientEnvelope::Render(request) => Some(request.rev),
            _ => None,
        };

        match self.dispatch(envelope) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(sid = %self.sid, ?rev, code = err.code(), "request failed: {err}");
                Some(error_envelope(self.sid.clone(), rev, err.code(), err.to_string()))
            }
        }
    }

    pub fn decode_error(&self, err: &serde_json::Error) -> HostEnvelope {
        warn!(sid = %self.sid, "undecodable frame: {err}");
        error_envelope(self.sid.clone(), None, "decode_error", err.to_string())
    }

    fn dispatch(&mut self, envelope: ClientEnvelope) -> Result<Option<HostEnvelope>, SessionError> {
        self.check_sid(envelope.sid())?;

        match envelope {
            ClientEnvelope::Render(request) => self.render(request).map(Some),
            ClientEnvelope::Event {
                target,
                event,
                path,
                ..
            } => self.event(target, event, &path),
            ClientEnvelope::Dispose { target, .. } => {
                if self.mounts.dispose(&target)? {
                    debug!(sid = %self.sid, dom_id = %target, "component disposed");
                    Ok(None)
                } else {
                    Err(SessionError::UnknownTarget(target))
                }
            }
        }
    }

    fn check_sid(&self, got: &str) -> Result<(), SessionError> {
        if got == self.sid {
            Ok(())
        } else {
            Err(SessionError::SidMismatch {
                expected: self.sid.clone(),
                got: got.to_string(),
            })
        }
    }

    fn render(&mut self, request: RenderRequest) -> Result<HostEnvelope, SessionError> {
        validate_render_rev(self.last_rev, request.rev)?;

        let replacement = request.registry.as_ref().map(TopologyResolver::from_value);
        let handle = RequestHandle {
            request: &request,
            resolver: replacement.as_ref().unwrap_or(&self.resolver),
        };
        let outcome = declarative_render::render(&mut self.dom, &self.mounts, &handle)?;

        if let Some(resolver) = replacement {
            debug!(sid = %self.sid, descriptions = resolver.len(), "registry replaced");
            self.resolver = resolver;
        }
        mark_applied_rev(&mut self.last_rev, request.rev);

        debug!(
            sid = %self.sid,
            rev = request.rev,
            dom_id = %request.target,
            patches = outcome.reconciled.patches.len(),
            created = outcome.reconciled.created,
            assets = outcome.injected_assets,
            "render applied"
        );

        Ok(HostEnvelope::Rendered {
            sid: self.sid.clone(),
            rev: request.rev,
            target: request.target,
            html: outcome.html,
            patches: outcome.reconciled.patches,
            created: outcome.reconciled.created,
        })
    }

    fn event(
        &self,
        target: String,
        event: String,
        path: &[usize],
    ) -> Result<Option<HostEnvelope>, SessionError> {
        let component = self
            .mounts
            .get(&target)
            .ok_or_else(|| SessionError::UnknownTarget(target.clone()))?;
        let component = component.lock().unwrap_or_else(PoisonError::into_inner);

        let node = component.node_at(&self.dom, path)?;
        let Some(command) = component.dispatch(&self.dom, &DomEvent::new(event, node)) else {
            trace!(sid = %self.sid, dom_id = %target, "event not delegated");
            return Ok(None);
        };

        Ok(Some(HostEnvelope::Command {
            sid: self.sid.clone(),
            target,
            event: command.event,
            command: command.command,
            element_id: command.element_id,
        }))
    }
}

/// The first render may carry any revision; later ones must follow on.
pub fn validate_render_rev(last_rev: Option<u64>, rev: u64) -> Result<(), SessionError> {
    match last_rev {
        Some(last_rev) if rev == last_rev.wrapping_add(1) => Ok(()),
        Some(last_rev) => Err(SessionError::RevMismatch {
            rev,
            expected: last_rev.wrapping_add(1),
        }),
        None => Ok(()),
    }
}

pub fn mark_applied_rev(last_rev: &mut Option<u64>, rev: u64) {
    *last_rev = Some(rev);
}

struct RequestHandle<'a> {
    request: &'a RenderRequest,
    resolver: &'a TopologyResolver,
}

impl ComponentHandle for RequestHandle<'_> {
    fn dom_id(&self) -> &str {
        &self.request.target
    }

    fn resolver(&self) -> &dyn Resolver {
        self.resolver
    }

    fn view(&self) -> Item {
        Item::from(&self.request.view)
    }

    fn credentials(&self) -> Option<&Value> {
        self.request.credentials.as_ref()
    }

    fn root_id(&self) -> Option<&str> {
        self.request.root.as_deref()
    }

    fn trace(&self, message: &str) {
        trace!(target: "render_host::widgets", dom_id = %self.request.target, "{message}");
    }
}
