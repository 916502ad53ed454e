use clap::Parser;

use super::{argparse::AppConfig, helpers};

#[derive(Parser, Debug)]
pub struct ShowConfig {
    #[command(flatten)]
    pub app: AppConfig,
}

impl ShowConfig {
    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let app = helpers::get_app(&self.app).await?;
        println!("{:#?}", app.config);
        Ok(())
    }
}
