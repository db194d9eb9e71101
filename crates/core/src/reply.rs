//! Every message the assistant can show, and the labelled lines a
//! front end renders.

use crate::error::ValidationError;
use crate::grade::GradeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Welcome { display_name: String },
    CommandListHeader,
    CommandListItem(&'static str),
    AskStudentName,
    AskGroupName,
    AskGrade,
    ScheduleStub,
    AddAssignmentStub,
    UnknownCommand,
    GroupNotFound,
    GradeNotANumber,
    GradeOutOfRange,
    GradeSaved {
        student_name: String,
        group_name: String,
        value: GradeValue,
    },
    SaveFailed,
    StorageUnavailable,
    InternalError,
    LoginFailed,
    LoginUnavailable,
}

impl From<&ValidationError> for Reply {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::GroupNotFound(_) => Reply::GroupNotFound,
            ValidationError::GradeOutOfRange(_) => Reply::GradeOutOfRange,
            ValidationError::GradeNotANumber(_) => Reply::GradeNotANumber,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Welcome { display_name } => write!(f, "Добро пожаловать, {}!", display_name),
            Reply::CommandListHeader => write!(f, "Доступные команды:"),
            Reply::CommandListItem(command) => write!(f, "- {}", command),
            Reply::AskStudentName => write!(f, "Введите ФИО студента."),
            Reply::AskGroupName => write!(f, "Введите название группы."),
            Reply::AskGrade => write!(f, "Введите оценку."),
            Reply::ScheduleStub => write!(f, "Ваше расписание (пока не реализовано)."),
            Reply::AddAssignmentStub => {
                write!(f, "Добавьте домашнее задание (пока не реализовано).")
            }
            Reply::UnknownCommand => write!(f, "Неизвестная команда. Попробуйте снова."),
            Reply::GroupNotFound => write!(f, "Группа не найдена. Попробуйте заново."),
            Reply::GradeNotANumber => {
                write!(f, "Некорректный формат оценки. Введите число от 1 до 5.")
            }
            Reply::GradeOutOfRange => {
                write!(f, "Оценка должна быть числом от 1 до 5. Попробуйте снова.")
            }
            Reply::GradeSaved {
                student_name,
                group_name,
                value,
            } => write!(
                f,
                "Оценка {} для {} из группы {} сохранена.",
                value, student_name, group_name
            ),
            Reply::SaveFailed => write!(f, "Не удалось сохранить оценку. Введите оценку ещё раз."),
            Reply::StorageUnavailable => {
                write!(f, "Хранилище недоступно. Повторите ввод.")
            }
            Reply::InternalError => write!(f, "Произошла ошибка. Начните заново."),
            Reply::LoginFailed => write!(f, "Неверный логин или пароль"),
            Reply::LoginUnavailable => {
                write!(f, "Не удалось проверить учётные данные. Попробуйте позже.")
            }
        }
    }
}

/// Who a chat line is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    Bot,
    User,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::Bot => write!(f, "Бот"),
            Sender::User => write!(f, "Вы"),
        }
    }
}

/// One rendered line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    pub sender: Sender,
    pub text: String,
}

impl ChatLine {
    pub fn bot(reply: &Reply) -> Self {
        Self {
            sender: Sender::Bot,
            text: reply.to_string(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }
}

impl fmt::Display for ChatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.text)
    }
}
