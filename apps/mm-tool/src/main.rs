use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = mm_tool::Args::parse();

	mm_tool::run(args).await
}
