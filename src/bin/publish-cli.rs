use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use blog_publisher::adapter::{EventRequest, RequestWire, WireResponse};
use blog_publisher::{Gateway, PublisherApp, Services};

#[derive(Parser)]
#[command(name = "publish-cli")]
#[command(about = "Local invoke tool for the blog publisher backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one event-shape JSON request through the adapter and print the reply
    Invoke {
        /// Path to the event JSON; stdin when omitted
        file: Option<PathBuf>,
    },
    /// List the API surface
    Routes,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Invoke { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let event: EventRequest = serde_json::from_str(&raw)?;

            let config = blog_publisher::config::resolve()?;
            let debug = config.server.debug;
            let services = Services::from_config(&config);
            let gateway = Gateway::new(PublisherApp::new(config, services)).debug(debug);

            match gateway.adapt(&RequestWire::Event(event)) {
                WireResponse::Event(reply) => {
                    println!("{}", serde_json::to_string_pretty(&reply)?);
                }
                WireResponse::Object(_) => {
                    eprintln!("Error: adapter replied in the wrong wire family");
                    std::process::exit(1);
                }
            }
        }
        Commands::Routes => {
            for route in [
                "GET    /",
                "GET    /api/health",
                "GET    /api/config",
                "POST   /api/format",
                "POST   /api/preview",
                "POST   /api/publish",
                "GET    /api/files",
                "GET    /api/file",
                "DELETE /api/file",
                "POST   /api/verify-password",
                "POST   /api/upload-image",
            ] {
                println!("{route}");
            }
        }
    }

    Ok(())
}
