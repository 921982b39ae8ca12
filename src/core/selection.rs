use crate::domain::model::{AgentEvent, Project};
use crate::domain::ports::AgentSink;
use chrono::Utc;

/// The one shared "selected project" slot, written by grid and map alike.
pub struct SelectionBridge<A: AgentSink> {
    selected: Option<Project>,
    detail_visible: bool,
    agent: A,
}

impl<A: AgentSink> SelectionBridge<A> {
    pub fn new(agent: A) -> Self {
        Self {
            selected: None,
            detail_visible: false,
            agent,
        }
    }

    /// Replaces any previous selection and opens the detail view.
    pub fn select(&mut self, project: Project) {
        tracing::debug!("Selected project '{}'", project.name);
        self.selected = Some(project);
        self.detail_visible = true;
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.detail_visible = false;
    }

    /// Hands the project to the agent subsystem. The detail view closes since
    /// the conversation takes focus; the selection itself is kept.
    pub fn request_agent_focus(&mut self, project: &Project) {
        tracing::info!("Requesting agent focus for '{}'", project.name);
        self.agent.notify(AgentEvent {
            project: project.clone(),
            requested_at: Utc::now(),
        });
        self.detail_visible = false;
    }

    pub fn selected(&self) -> Option<&Project> {
        self.selected.as_ref()
    }

    pub fn detail_visible(&self) -> bool {
        self.detail_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        events: RefCell<Vec<AgentEvent>>,
    }

    impl AgentSink for &RecordingSink {
        fn notify(&self, event: AgentEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn test_select_replaces_previous_selection() {
        let sink = RecordingSink::default();
        let mut bridge = SelectionBridge::new(&sink);

        bridge.select(Project::new("Palm Hills", "New Cairo"));
        bridge.select(Project::new("Mountain View", "Maadi"));

        assert_eq!(bridge.selected().unwrap().name, "Mountain View");
        assert!(bridge.detail_visible());

        bridge.deselect();
        assert!(bridge.selected().is_none());
        assert!(!bridge.detail_visible());
    }

    #[test]
    fn test_agent_focus_emits_event_and_closes_detail() {
        let sink = RecordingSink::default();
        let mut bridge = SelectionBridge::new(&sink);
        let project = Project::new("Palm Hills", "New Cairo").with_id("1");

        bridge.select(project.clone());
        bridge.request_agent_focus(&project);

        let events = sink.events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].project, project);
        assert!(!bridge.detail_visible());
        assert_eq!(bridge.selected(), Some(&project));
    }
}
