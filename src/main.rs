use std::env;

#[tokio::main]
async fn main() {
    olg::logging::init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = olg::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("simulate") => match olg::api::run_cli(&raw_args[1..]) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
                    clap_err.exit();
                }
                eprintln!("Simulation error: {e}");
                std::process::exit(1);
            }
        },
        _ => {
            eprintln!("Usage: olg serve [port] | olg simulate [--help]");
            std::process::exit(1);
        }
    }
}
