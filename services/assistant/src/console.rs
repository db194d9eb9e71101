//! Interactive line front end.
//!
//! Prompts for a login and password until one is accepted, prints the
//! greeting, then feeds every following line to the assistant and prints
//! the bot's replies with their sender label. Ends at end of input.

use crate::state::AppState;
use anyhow::Result;
use teacher_assistant_core::{LoginOutcome, reply::ChatLine};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

const LOGIN_PROMPT: &str = "Логин: ";
const PASSWORD_PROMPT: &str = "Пароль: ";

async fn prompt<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

async fn print_lines<W: AsyncWrite + Unpin>(output: &mut W, lines: &[ChatLine]) -> Result<()> {
    for line in lines {
        output.write_all(format!("{}\n", line).as_bytes()).await?;
    }
    output.flush().await?;
    Ok(())
}

/// Runs one console session over `input`/`output`.
pub async fn run<R, W>(state: &AppState, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    let mut conversation = loop {
        prompt(&mut output, LOGIN_PROMPT).await?;
        let Some(login) = lines.next_line().await? else {
            info!("Input closed before login");
            return Ok(());
        };
        prompt(&mut output, PASSWORD_PROMPT).await?;
        let Some(password) = lines.next_line().await? else {
            info!("Input closed before login");
            return Ok(());
        };

        match state.assistant.on_login_attempt(&login, &password).await {
            LoginOutcome::Success {
                conversation,
                greeting,
            } => {
                print_lines(&mut output, &greeting).await?;
                break conversation;
            }
            LoginOutcome::Failure { notice } => {
                print_lines(&mut output, std::slice::from_ref(&notice)).await?;
            }
        }
    };

    let user = conversation.state.identity().login.clone();
    info!(%user, "Conversation started");

    while let Some(line) = lines.next_line().await? {
        let replies = state.assistant.on_user_line(&mut conversation, &line).await;
        print_lines(&mut output, &replies).await?;
    }

    info!(%user, lines = conversation.transcript.len(), "Conversation ended");
    Ok(())
}
