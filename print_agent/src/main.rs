use dotenvy::dotenv;
use log::info;
use print_agent::{agent::run_agent, cli::handle_command_line_args, config::AgentConfig};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if handle_command_line_args() {
        return;
    }
    let config = AgentConfig::from_env_or_default();

    info!("🚀️ Starting print agent for {}", config.api_url);
    match run_agent(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        },
    }
}
