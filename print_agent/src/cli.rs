use std::{env, env::VarError};

/// The agent takes no arguments. Any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // DPA_PASSWORD is deliberately absent
    const DISPLAY_ENVS: [&str; 10] = [
        "RUST_LOG",
        "DPA_API_URL",
        "DPA_USERNAME",
        "DPA_VENDOR_ID",
        "DPA_CHECK_INTERVAL",
        "DPA_PRINTER_ID",
        "DPA_DATA_DIR",
        "DPA_REQUEST_TIMEOUT",
        "DPA_HISTORY_SIZE",
        "DPA_SKIP_PREFLIGHT",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
