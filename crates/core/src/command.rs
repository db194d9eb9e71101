use crate::error::CommandError;

/// Top-level commands recognised while no flow is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Starts the guided grading flow.
    AssignGrade,
    ShowSchedule,
    AddAssignment,
}

/// Exact-match command table, in the order the greeting lists them.
pub const COMMAND_TABLE: [(&str, CommandKind); 3] = [
    ("выставить оценку", CommandKind::AssignGrade),
    ("расписание", CommandKind::ShowSchedule),
    ("добавить задание", CommandKind::AddAssignment),
];

impl CommandKind {
    /// Looks up an already trimmed, case-folded line.
    pub fn parse(normalized: &str) -> Result<Self, CommandError> {
        COMMAND_TABLE
            .iter()
            .find(|(text, _)| *text == normalized)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| CommandError::Unrecognized(normalized.to_string()))
    }

    pub fn text(self) -> &'static str {
        match self {
            CommandKind::AssignGrade => COMMAND_TABLE[0].0,
            CommandKind::ShowSchedule => COMMAND_TABLE[1].0,
            CommandKind::AddAssignment => COMMAND_TABLE[2].0,
        }
    }
}
