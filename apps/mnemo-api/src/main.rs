use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = mnemo_api::Args::parse();
	mnemo_api::run(args).await
}
