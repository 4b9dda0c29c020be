use std::time::Duration;

use chrono::{Local, Utc};
use vault_core::inbox::{Inbox, SentReply};
use vault_core::realtime::{MessageEvent, MessageFeed};
use vault_core::store::MessageStore;
use vault_core::{Message, MessageId};

use crate::cli::InboxCommands;
use crate::commands::common::{
    capture_editor_input_with_initial, format_message_lines, message_to_list_item,
    normalize_content, normalize_message_identifier, print_notices, read_piped_stdin,
    MessageListItem,
};
use crate::error::CliError;

pub async fn run_inbox<S>(store: S, command: InboxCommands) -> Result<(), CliError>
where
    S: MessageStore + Clone + Send + Sync + 'static,
{
    let mut inbox = Inbox::new(store.clone());
    let result = match command {
        InboxCommands::List { json } => load(&mut inbox)
            .await
            .and_then(|()| print_messages(inbox.messages(), json)),
        InboxCommands::Show { id } => show_message(&mut inbox, &id).await.map(|message| {
            println!("{}", render_message(&message));
        }),
        InboxCommands::Delete { id } => delete_message(&mut inbox, &id).await,
        InboxCommands::BulkDelete { ids } => delete_messages(&mut inbox, &ids).await.map(|_| ()),
        InboxCommands::Reply { id, text } => {
            let text = match normalize_content(&text.join(" ")) {
                Some(text) => Some(text),
                None => match read_piped_stdin()? {
                    Some(text) => Some(text),
                    None => capture_editor_input_with_initial("")?,
                },
            };
            reply(&mut inbox, &id, text.as_deref().unwrap_or(""))
                .await
                .map(|_| ())
        }
        InboxCommands::Watch { interval } => {
            watch(&mut inbox, store, Duration::from_secs(interval.max(1))).await
        }
    };
    print_notices(&inbox.take_notices());
    result
}

async fn load<S: MessageStore>(inbox: &mut Inbox<S>) -> Result<(), CliError> {
    Ok(inbox.load().await?)
}

fn print_messages(messages: &[Message], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = messages
            .iter()
            .map(message_to_list_item)
            .collect::<Vec<MessageListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if messages.is_empty() {
        println!("No messages yet");
    } else {
        for line in format_message_lines(messages, Utc::now()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn show_message<S: MessageStore>(
    inbox: &mut Inbox<S>,
    id: &str,
) -> Result<Message, CliError> {
    let id = message_id(id)?;
    load(inbox).await?;
    inbox
        .open(&id)
        .cloned()
        .map_err(|_| CliError::MessageNotFound(id.to_string()))
}

pub fn render_message(message: &Message) -> String {
    format!(
        "From: {} <{}>\nDate: {}\n\n{}",
        message.name,
        message.email,
        message
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M"),
        message.message.trim_end()
    )
}

pub async fn delete_message<S: MessageStore>(
    inbox: &mut Inbox<S>,
    id: &str,
) -> Result<(), CliError> {
    let id = message_id(id)?;
    load(inbox).await?;
    if inbox.find(&id).is_none() {
        return Err(CliError::MessageNotFound(id.to_string()));
    }
    Ok(inbox.delete_message(&id).await?)
}

/// Select every given id and delete them with one request
pub async fn delete_messages<S: MessageStore>(
    inbox: &mut Inbox<S>,
    ids: &[String],
) -> Result<usize, CliError> {
    load(inbox).await?;
    for raw in ids {
        let id = message_id(raw)?;
        if inbox.find(&id).is_none() {
            return Err(CliError::MessageNotFound(id.to_string()));
        }
        if !inbox.selected().contains(&id) {
            inbox.toggle_selected(&id);
        }
    }
    Ok(inbox.delete_selected().await?)
}

pub async fn reply<S: MessageStore>(
    inbox: &mut Inbox<S>,
    id: &str,
    text: &str,
) -> Result<SentReply, CliError> {
    let message = show_message(inbox, id).await?;
    if text.trim().is_empty() {
        return Err(CliError::EmptyReply);
    }
    inbox.compose_reply(text);
    let sent = inbox.send_reply()?;
    tracing::debug!("Reply to {} accepted", message.id);
    Ok(sent)
}

async fn watch<S>(inbox: &mut Inbox<S>, store: S, interval: Duration) -> Result<(), CliError>
where
    S: MessageStore + Send + Sync + 'static,
{
    load(inbox).await?;
    let since = inbox
        .messages()
        .iter()
        .map(|message| message.created_at)
        .max()
        .unwrap_or_else(Utc::now);
    let mut subscription = MessageFeed::subscribe(store, since, interval);
    println!("Watching for new messages (Ctrl-C to stop)");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(MessageEvent::Inserted(message)) = event else {
                    break;
                };
                if inbox.apply_insert(message.clone()) {
                    print_notices(&inbox.take_notices());
                    for line in format_message_lines(std::slice::from_ref(&message), Utc::now()) {
                        println!("{line}");
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    subscription.unsubscribe();
    Ok(())
}

fn message_id(raw: &str) -> Result<MessageId, CliError> {
    normalize_message_identifier(raw).map(MessageId::new)
}
