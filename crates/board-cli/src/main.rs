use board_cli::{cli, commands, logging};
use board_sync::RequestStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli::build().get_matches();
    let (globals, command) = cli::parse(&matches)?;

    logging::init(globals.log_json);

    let config = globals.resolve_config()?;
    let store = RequestStore::connect(&config)?;
    tracing::info!("Request board started in {:?} mode", store.mode());

    let mut out = std::io::stdout().lock();
    commands::execute(&store, command, &mut out).await
}
