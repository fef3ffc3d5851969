use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;

use chat_relay::application::services::{ChatClient, ChatSession, PayloadStyle, RelayService};
use chat_relay::infrastructure::http::HttpRelayTransport;
use chat_relay::infrastructure::llm::GeneratorFactory;
use chat_relay::infrastructure::observability::{TracingConfig, init_tracing};
use chat_relay::presentation::{
    AppState, EMPTY_STATE, Environment, Settings, TerminalRenderer, create_router,
};

#[derive(Parser)]
#[command(name = "chat-relay", version, about = "Relay chat requests to a hosted LLM")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay endpoint (`POST /api/chat`).
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Chat with a running relay from the terminal.
    Chat {
        /// Relay endpoint, e.g. http://127.0.0.1:3000/api/chat
        #[arg(long)]
        url: Option<String>,
        /// Send the whole conversation instead of only the latest message.
        #[arg(long)]
        history: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    let tracing_config = TracingConfig::from_settings(&settings.logging, environment.as_str());
    match cli.command {
        Command::Serve { port } => {
            init_tracing(&tracing_config);
            serve(settings, port).await
        }
        Command::Chat { url, history } => {
            init_tracing(&tracing_config.to_stderr());
            chat(settings, url, history).await
        }
    }
}

async fn serve(settings: Settings, port: Option<u16>) -> anyhow::Result<()> {
    let generator = GeneratorFactory::create(&settings.llm).await?;
    let relay_service = RelayService::new(generator, settings.relay.mode);
    let state = AppState::new(relay_service, settings.relay.role_mapping());
    let router = create_router(state);

    let port = port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{}:{}", settings.server.host, port).parse()?;
    tracing::info!(
        address = %addr,
        provider = ?settings.llm.provider,
        mode = ?settings.relay.mode,
        "Listening"
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn chat(settings: Settings, url: Option<String>, history: bool) -> anyhow::Result<()> {
    let mut format = settings.client.payload;
    if history {
        format.style = PayloadStyle::History;
    }
    let url = url.unwrap_or(settings.client.relay_url);
    tracing::info!(url = %url, style = ?format.style, "Chat view connected");

    let client = ChatClient::new(HttpRelayTransport::new(url, format.clone()));
    let mut session = ChatSession::new(format.style);
    let mut renderer = TerminalRenderer::new(std::io::stdout());
    println!("{}", EMPTY_STATE);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        session.set_input(line);
        client
            .send(&mut session, |session| {
                if let Err(e) = renderer.render(session) {
                    tracing::warn!(error = %e, "Failed to render transcript");
                }
            })
            .await;
    }

    Ok(())
}
