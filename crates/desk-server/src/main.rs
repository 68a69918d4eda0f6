// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Desk help-desk server binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use desk_server::{create_app_state, create_router, version};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Desk server - HTTP server for help-desk tickets.
#[derive(Parser, Debug)]
#[command(name = "desk-server", about = "Desk help-desk ticket server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/desk/server.toml)
	#[arg(long, env = "DESK_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => desk_server_config::load_config_with_file(path)?,
		None => desk_server_config::load_config()?,
	};

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	if config.logging.json {
		tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer().json())
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer())
			.init();
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting desk-server"
	);

	let pool =
		desk_server_db::create_pool(&config.database.url, config.database.max_connections).await?;
	desk_server_db::run_migrations(&pool).await?;

	let state = create_app_state(pool, &config);
	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
