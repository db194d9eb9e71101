//! Command Interpreter
//!
//! Consumes one input line at a time for a session. Each line is first
//! validated against the current flow state into an [`Event`] (this is the
//! only place that reads from the store), then [`transition`] decides the
//! next state, the replies and at most one side effect. The side effect,
//! committing a grade, is executed by [`CommandInterpreter::handle`].

use crate::command::CommandKind;
use crate::error::{CommandError, ValidationError};
use crate::grade::{GradeValue, NewGrade};
use crate::reply::Reply;
use crate::session::{FlowState, GradeStep, SessionState};
use crate::store::PersistenceStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// A line after validation against the state it arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Command(CommandKind),
    Unrecognized(CommandError),
    /// Blank input while a field is expected.
    EmptyField,
    StudentName(String),
    GroupFound(String),
    Grade(GradeValue),
    Invalid(ValidationError),
    /// The store could not answer a read needed to validate the line.
    StoreUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CommitGrade {
        student_name: String,
        group_name: String,
        value: GradeValue,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: FlowState,
    pub effect: Option<Effect>,
    pub replies: Vec<Reply>,
}

impl Transition {
    fn to(next: FlowState, reply: Reply) -> Self {
        Self {
            next,
            effect: None,
            replies: vec![reply],
        }
    }
}

/// The transition table: `(state, event) -> (next state, effect, replies)`.
///
/// Pairs that validation never produces fall through to a generic error
/// and reset to idle.
pub fn transition(state: FlowState, event: Event) -> Transition {
    use FlowState::{AssignGrade, Idle};

    match (state, event) {
        (Idle, Event::Command(CommandKind::AssignGrade)) => {
            Transition::to(AssignGrade(GradeStep::StudentName), Reply::AskStudentName)
        }
        (Idle, Event::Command(CommandKind::ShowSchedule)) => {
            Transition::to(Idle, Reply::ScheduleStub)
        }
        (Idle, Event::Command(CommandKind::AddAssignment)) => {
            Transition::to(Idle, Reply::AddAssignmentStub)
        }
        (Idle, Event::Unrecognized(_)) => Transition::to(Idle, Reply::UnknownCommand),

        (AssignGrade(GradeStep::StudentName), Event::EmptyField) => {
            Transition::to(AssignGrade(GradeStep::StudentName), Reply::AskStudentName)
        }
        (AssignGrade(GradeStep::StudentName), Event::StudentName(student_name)) => {
            Transition::to(
                AssignGrade(GradeStep::GroupName { student_name }),
                Reply::AskGroupName,
            )
        }

        (AssignGrade(step @ GradeStep::GroupName { .. }), Event::EmptyField) => {
            Transition::to(AssignGrade(step), Reply::AskGroupName)
        }
        (AssignGrade(GradeStep::GroupName { student_name }), Event::GroupFound(group_name)) => {
            Transition::to(
                AssignGrade(GradeStep::GradeValue {
                    student_name,
                    group_name,
                }),
                Reply::AskGrade,
            )
        }
        // Unlike a bad grade, an unknown group abandons the whole flow.
        (
            AssignGrade(GradeStep::GroupName { .. }),
            Event::Invalid(ValidationError::GroupNotFound(_)),
        ) => Transition::to(Idle, Reply::GroupNotFound),
        (AssignGrade(step @ GradeStep::GroupName { .. }), Event::StoreUnavailable) => {
            Transition::to(AssignGrade(step), Reply::StorageUnavailable)
        }

        (
            AssignGrade(step @ GradeStep::GradeValue { .. }),
            Event::Invalid(
                err @ (ValidationError::GradeNotANumber(_) | ValidationError::GradeOutOfRange(_)),
            ),
        ) => Transition::to(AssignGrade(step), Reply::from(&err)),
        (
            AssignGrade(GradeStep::GradeValue {
                student_name,
                group_name,
            }),
            Event::Grade(value),
        ) => Transition {
            next: Idle,
            replies: vec![Reply::GradeSaved {
                student_name: student_name.clone(),
                group_name: group_name.clone(),
                value,
            }],
            effect: Some(Effect::CommitGrade {
                student_name,
                group_name,
                value,
            }),
        },

        (state, event) => {
            error!(?state, ?event, "Unreachable interpreter transition; resetting to idle");
            Transition::to(Idle, Reply::InternalError)
        }
    }
}

/// Drives sessions through the transition table against a shared store.
#[derive(Clone)]
pub struct CommandInterpreter {
    store: Arc<dyn PersistenceStore>,
    today: Arc<dyn Fn() -> NaiveDate + Send + Sync>,
}

impl CommandInterpreter {
    /// Creates an interpreter that dates grades with the local calendar day.
    pub fn new(store: Arc<dyn PersistenceStore>) -> Self {
        Self {
            store,
            today: Arc::new(|| chrono::Local::now().date_naive()),
        }
    }

    /// Replaces the date source used for committed grades.
    pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    /// Handles one raw input line and returns the replies to show.
    ///
    /// At most one store write happens per call, and only when a grading
    /// flow completes. If that write fails the session stays at the grade
    /// step with student and group kept.
    #[instrument(skip_all, fields(user_id = session.identity().id))]
    pub async fn handle(&self, session: &mut SessionState, line: &str) -> Vec<Reply> {
        let line = line.trim();
        let event = self.read_event(session.flow(), line).await;
        debug!(?event, "Input classified");

        let Transition {
            next,
            effect,
            replies,
        } = transition(session.take_flow(), event);

        match effect {
            None => {
                session.set_flow(next);
                replies
            }
            Some(Effect::CommitGrade {
                student_name,
                group_name,
                value,
            }) => {
                let grade = NewGrade {
                    student_name,
                    group_name,
                    value,
                    assigned_on: (self.today)(),
                };
                match self.store.insert_grade(&grade).await {
                    Ok(()) => {
                        info!(
                            student = %grade.student_name,
                            group = %grade.group_name,
                            grade = %grade.value,
                            "Grade saved"
                        );
                        session.set_flow(next);
                        replies
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to save grade");
                        session.set_flow(FlowState::AssignGrade(GradeStep::GradeValue {
                            student_name: grade.student_name,
                            group_name: grade.group_name,
                        }));
                        vec![Reply::SaveFailed]
                    }
                }
            }
        }
    }

    async fn read_event(&self, flow: &FlowState, line: &str) -> Event {
        match flow {
            FlowState::Idle => match CommandKind::parse(&line.to_lowercase()) {
                Ok(kind) => Event::Command(kind),
                Err(err) => Event::Unrecognized(err),
            },
            FlowState::AssignGrade(GradeStep::StudentName | GradeStep::GroupName { .. })
                if line.is_empty() =>
            {
                Event::EmptyField
            }
            FlowState::AssignGrade(GradeStep::StudentName) => Event::StudentName(line.to_string()),
            FlowState::AssignGrade(GradeStep::GroupName { .. }) => {
                match self.store.group_exists(line).await {
                    Ok(true) => Event::GroupFound(line.to_string()),
                    Ok(false) => Event::Invalid(ValidationError::GroupNotFound(line.to_string())),
                    Err(e) => {
                        warn!(error = %e, "Group lookup failed");
                        Event::StoreUnavailable
                    }
                }
            }
            FlowState::AssignGrade(GradeStep::GradeValue { .. }) => match GradeValue::parse(line) {
                Ok(value) => Event::Grade(value),
                Err(err) => Event::Invalid(err),
            },
        }
    }
}
