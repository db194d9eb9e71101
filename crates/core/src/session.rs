//! Per-conversation state.
//!
//! The fields collected by the grading flow live inside the step that
//! needs them, so a group name can only exist once a student name does.

use crate::command::CommandKind;
use crate::identity::Identity;

/// Progress through the grading flow. Steps advance strictly in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeStep {
    StudentName,
    GroupName {
        student_name: String,
    },
    GradeValue {
        student_name: String,
        group_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    AssignGrade(GradeStep),
}

/// Borrowed view of whatever the active flow has collected so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectedFields<'a> {
    pub student_name: Option<&'a str>,
    pub group_name: Option<&'a str>,
}

impl CollectedFields<'_> {
    pub fn is_empty(&self) -> bool {
        self.student_name.is_none() && self.group_name.is_none()
    }
}

/// Conversation context of one logged-in user.
///
/// Created at login and dropped when the conversation ends. Only the
/// interpreter changes the flow.
#[derive(Debug, Clone)]
pub struct SessionState {
    identity: Identity,
    flow: FlowState,
}

impl SessionState {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            flow: FlowState::Idle,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn flow(&self) -> &FlowState {
        &self.flow
    }

    /// `None` only while idle. The first grading step has a command but no
    /// collected fields yet.
    pub fn active_command(&self) -> Option<CommandKind> {
        match self.flow {
            FlowState::Idle => None,
            FlowState::AssignGrade(_) => Some(CommandKind::AssignGrade),
        }
    }

    pub fn collected_fields(&self) -> CollectedFields<'_> {
        match &self.flow {
            FlowState::Idle | FlowState::AssignGrade(GradeStep::StudentName) => {
                CollectedFields::default()
            }
            FlowState::AssignGrade(GradeStep::GroupName { student_name }) => CollectedFields {
                student_name: Some(student_name.as_str()),
                group_name: None,
            },
            FlowState::AssignGrade(GradeStep::GradeValue {
                student_name,
                group_name,
            }) => CollectedFields {
                student_name: Some(student_name.as_str()),
                group_name: Some(group_name.as_str()),
            },
        }
    }

    pub(crate) fn set_flow(&mut self, flow: FlowState) {
        self.flow = flow;
    }

    /// Moves the flow out, leaving the session idle until `set_flow`.
    pub(crate) fn take_flow(&mut self) -> FlowState {
        std::mem::take(&mut self.flow)
    }
}
