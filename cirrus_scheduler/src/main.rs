use ::std::net::{Ipv4Addr, SocketAddrV4};

use ::cirrus_common::{
    config::{load_config, Args},
    error::{CirrusError, Result},
    kvs::surrealdb_client::SurrealKvsClient,
};
use ::cirrus_scheduler::{
    executor::{http_client::HttpExecutorClient, PinAcceptor},
    get_server,
    scheduler::Scheduler,
    SchedulerConfig,
};
use ::tracing::info;

#[tokio::main]
/// Start Cirrus scheduler
async fn main() -> Result<()> {
    // setup tracing
    tracing_subscriber::fmt::init();

    let Args { config_path } = Args::parse_args();
    info!("Get config path: {}", config_path);
    let config: SchedulerConfig = load_config(&config_path)?;

    let kvs = SurrealKvsClient::connect(&config.store).await?;
    let (pin_sender, pin_acceptor) = PinAcceptor::channel();
    let options = config.placement_options();
    let executor_client = HttpExecutorClient::with_timeout(options.pin_timeout)?;
    let scheduler = Scheduler::new(kvs, executor_client, pin_acceptor, options);
    let app = get_server(scheduler, pin_sender)?;

    // run it
    let endpoint = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port);
    let listener = tokio::net::TcpListener::bind(endpoint)
        .await
        .map_err(CirrusError::fail_to_start_server)?;
    info!(
        "Cirrus scheduler is listening on {}",
        listener
            .local_addr()
            .map_err(CirrusError::fail_to_start_server)?
    );
    axum::serve(listener, app)
        .await
        .map_err(CirrusError::fail_to_start_server)?;
    Ok(())
}
