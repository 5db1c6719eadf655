use std::env;

use tools::{Command, ReqwestFetch, cards, index, parse_args, preload_states, usage};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    let exe = args
        .first()
        .cloned()
        .unwrap_or_else(|| "supplier-map".to_string());
    let command = parse_args(args.get(1..).unwrap_or_default())
        .map_err(|e| format!("{e}\n\n{}", usage(&exe)))?;

    // Fetch futures are not Send; a current-thread runtime drives them in place.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("start runtime: {e}"))?;

    let fetch = ReqwestFetch::default();
    let output = runtime.block_on(async {
        match command {
            Command::Index { suppliers_url } => index(&fetch, &suppliers_url).await,
            Command::Preload { base_url } => preload_states(fetch.clone(), &base_url).await,
            Command::Card {
                suppliers_url,
                city_key,
            } => {
                let today = chrono::Utc::now().date_naive();
                cards(&fetch, &suppliers_url, &city_key, today).await
            }
        }
    })?;
    println!("{output}");
    Ok(())
}
