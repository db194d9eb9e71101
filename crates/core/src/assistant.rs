//! Presentation Boundary
//!
//! What a front end talks to: a login attempt either opens a
//! [`Conversation`] with its greeting or yields a failure notice, and each
//! user line yields bot lines labelled for display.

use crate::auth::{AuthGateway, CredentialPolicy};
use crate::command::COMMAND_TABLE;
use crate::error::AuthError;
use crate::identity::Identity;
use crate::interpreter::CommandInterpreter;
use crate::reply::{ChatLine, Reply};
use crate::session::SessionState;
use crate::store::PersistenceStore;
use std::sync::Arc;
use tracing::error;

/// One logged-in user's session plus the chat history shown so far.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub state: SessionState,
    /// Everything shown on the chat screen since login, in order. Kept for
    /// the whole conversation and dropped with it.
    pub transcript: Vec<ChatLine>,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success {
        conversation: Conversation,
        greeting: Vec<ChatLine>,
    },
    Failure {
        notice: ChatLine,
    },
}

/// The welcome line followed by the list of top-level commands.
pub fn greeting(identity: &Identity) -> Vec<Reply> {
    let mut replies = vec![
        Reply::Welcome {
            display_name: identity.display_name.clone(),
        },
        Reply::CommandListHeader,
    ];
    replies.extend(
        COMMAND_TABLE
            .iter()
            .map(|(text, _)| Reply::CommandListItem(*text)),
    );
    replies
}

#[derive(Clone)]
pub struct Assistant {
    gateway: Arc<AuthGateway>,
    interpreter: CommandInterpreter,
}

impl Assistant {
    pub fn new(store: Arc<dyn PersistenceStore>, policy: CredentialPolicy) -> Self {
        Self {
            gateway: Arc::new(AuthGateway::new(store.clone(), policy)),
            interpreter: CommandInterpreter::new(store),
        }
    }

    pub fn with_interpreter(mut self, interpreter: CommandInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub async fn on_login_attempt(&self, login: &str, password: &str) -> LoginOutcome {
        match self.gateway.authenticate(login, password).await {
            Ok(identity) => {
                let greeting: Vec<ChatLine> =
                    greeting(&identity).iter().map(ChatLine::bot).collect();
                LoginOutcome::Success {
                    conversation: Conversation {
                        state: SessionState::new(identity),
                        transcript: greeting.clone(),
                    },
                    greeting,
                }
            }
            Err(AuthError::InvalidCredentials) => LoginOutcome::Failure {
                notice: ChatLine::bot(&Reply::LoginFailed),
            },
            Err(e @ AuthError::Storage(_)) => {
                error!(error = %e, "Login could not be checked");
                LoginOutcome::Failure {
                    notice: ChatLine::bot(&Reply::LoginUnavailable),
                }
            }
        }
    }

    /// Runs one user line through the interpreter and returns the bot lines.
    pub async fn on_user_line(&self, conversation: &mut Conversation, text: &str) -> Vec<ChatLine> {
        conversation.transcript.push(ChatLine::user(text.trim()));
        let lines: Vec<ChatLine> = self
            .interpreter
            .handle(&mut conversation.state, text)
            .await
            .iter()
            .map(ChatLine::bot)
            .collect();
        conversation.transcript.extend(lines.iter().cloned());
        lines
    }
}
