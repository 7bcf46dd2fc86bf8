//! Discord transport.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ChannelId, Client, Context, CreateAttachment, CreateMessage, EditMessage, EventHandler,
    GatewayIntents, Http, Mentionable, Message, MessageId, Ready,
};
use tracing::{info, warn};

use super::{Bot, ChatChannel, ChatError, MessageRef};

/// One Discord text channel.
pub struct DiscordChannel {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordChannel {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ChatChannel for DiscordChannel {
    async fn post(&self, text: &str) -> Result<MessageRef, ChatError> {
        let message = self.channel_id.say(&*self.http, text).await?;
        Ok(MessageRef(message.id.get()))
    }

    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), ChatError> {
        self.channel_id
            .edit_message(
                &*self.http,
                MessageId::new(message.0),
                EditMessage::new().content(text),
            )
            .await?;
        Ok(())
    }

    async fn send_image(&self, filename: &str, png: Vec<u8>) -> Result<MessageRef, ChatError> {
        let message = self
            .channel_id
            .send_message(
                &*self.http,
                CreateMessage::new().add_file(CreateAttachment::bytes(png, filename)),
            )
            .await?;
        Ok(MessageRef(message.id.get()))
    }
}

/// Routes gateway messages to the [`Bot`].
pub struct Handler {
    bot: Arc<Bot>,
}

impl Handler {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let channel = DiscordChannel::new(Arc::clone(&ctx.http), msg.channel_id);
        let user_id = msg.author.id.to_string();
        let mention = msg.author.mention().to_string();

        if let Err(e) = self
            .bot
            .handle(&user_id, &mention, &msg.content, &channel)
            .await
        {
            warn!("Failed to answer message in channel {}: {}", msg.channel_id, e);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Connected to Discord as {} ({})", ready.user.name, ready.user.id);
    }
}

/// Connect to the gateway and serve commands until the connection ends.
pub async fn run(token: &str, bot: Arc<Bot>) -> Result<(), ChatError> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler::new(bot))
        .await?;

    info!("Starting Discord client");
    client.start().await?;
    Ok(())
}
