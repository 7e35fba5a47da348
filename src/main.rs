// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use tracing_subscriber::EnvFilter;

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();

	println!("Native library loaded: {}", gplnative::is_native_code_loaded());
}
