use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::SerenityInit;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rusty_dj::commands::music::{
    audio_sources::{CatalogExpander, SourceResolver, spotify::SpotifyApi, youtube::YoutubeResolver},
    join::*,
    play::*,
    queue::*,
    skip::*,
    stop::*,
    utils::{announcer::ChannelAnnouncer, session_store::SessionStore},
};
use rusty_dj::config::Config;
use rusty_dj::{CommandResult, Context, Data, Error, HTTP_CLIENT};

#[poise::command(slash_command, prefix_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rusty_dj=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = Config::from_env()?;

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let resolver: Arc<dyn SourceResolver> = Arc::new(YoutubeResolver::new(config.ytdlp_path.clone()));

    let catalog: Option<Arc<dyn CatalogExpander>> = match &config.spotify {
        Some(credentials) => Some(Arc::new(SpotifyApi::new(
            HTTP_CLIENT.clone(),
            credentials.clone(),
        ))),
        None => {
            warn!("Spotify credentials not set; Spotify links will be rejected");
            None
        }
    };

    let commands = vec![
        // Default commands
        register(),
        help(),
        // Music commands
        join(),
        play(),
        skip(),
        stop(),
        queue(),
    ];

    let auto_disconnect = config.auto_disconnect;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Logged in as {}", ready.user.name);

                let announcer = Arc::new(ChannelAnnouncer::new(ctx.http.clone()));
                Ok(Data {
                    sessions: SessionStore::new(resolver.clone(), announcer, auto_disconnect),
                    resolver,
                    catalog,
                })
            })
        });

    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework.build())
        .register_songbird()
        .await?;

    client.start().await.map_err(Into::into)
}
