use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::{DisabledLocator, FixedLocator, GeoLocator, IpGeolocator, PriceApiClient};
use commands::Reply;
use config::{Config, GeolocationSource};
use services::Session;

fn build_locator(source: &GeolocationSource) -> Arc<dyn GeoLocator> {
    match source {
        GeolocationSource::Fixed(coordinates) => Arc::new(FixedLocator::new(*coordinates)),
        GeolocationSource::Lookup(url) => Arc::new(IpGeolocator::new(url.clone())),
        GeolocationSource::Disabled => Arc::new(DisabledLocator),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("basket_compare=info".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    info!("🛒 Starting basket-compare against {}", config.api_base_url);

    let backend = Arc::new(PriceApiClient::new(config.api_base_url.clone()));
    let locator = build_locator(&config.geolocation);
    let (mut session, mut completions) =
        Session::new(backend, locator, config.retry, config.default_origin);
    let mut snapshots = session.subscribe();
    let mut rendered = snapshots.borrow_and_update().clone();
    let mut last_notice = 0;

    session.start();
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match commands::handle_line(&mut session, &line, config.chart_size) {
                    Reply::Output(output) => println!("{}", output),
                    Reply::Quit => break,
                    Reply::Nothing => {}
                },
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            },
            Some(completion) = completions.recv() => session.apply(completion),
            Ok(()) = snapshots.changed() => {
                let current = snapshots.borrow_and_update().clone();
                for line in commands::render_update(&rendered, &current, &mut last_notice) {
                    println!("{}", line);
                }
                rendered = current;
            }
        }
    }

    info!("Bye");
}
