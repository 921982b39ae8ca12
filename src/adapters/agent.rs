use crate::domain::model::AgentEvent;
use crate::domain::ports::AgentSink;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Forwards agent events over an unbounded channel; whoever owns the
/// receiver decides how to surface them.
#[derive(Debug, Clone)]
pub struct ChannelAgentSink {
    sender: UnboundedSender<AgentEvent>,
}

impl ChannelAgentSink {
    pub fn new() -> (Self, UnboundedReceiver<AgentEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl AgentSink for ChannelAgentSink {
    fn notify(&self, event: AgentEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Agent receiver dropped, event discarded");
        }
    }
}
