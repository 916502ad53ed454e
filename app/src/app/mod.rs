use std::sync::Arc;

use database::Database;

use crate::{generate::MediaGenerator, VeepiacAppError};

mod veepiac_config;

pub use veepiac_config::{ConfigBuilder, ConfigError, VeepiacConfig};

#[derive(Debug)]
pub struct VeepiacBuilder {
    pub config: veepiac_config::ConfigBuilder,
}

impl VeepiacBuilder {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(VeepiacBuilder {
            config: veepiac_config::ConfigBuilder::new_with_user_dirs()?.load_environment(true),
        })
    }

    pub fn update(
        self,
        f: impl FnOnce(
            veepiac_config::ConfigBuilder,
        ) -> Result<veepiac_config::ConfigBuilder, ConfigError>,
    ) -> Result<Self, ConfigError> {
        let VeepiacBuilder {
            config: config_builder,
        } = self;
        let config_builder = f(config_builder)?;
        Ok(Self {
            config: config_builder,
        })
    }

    pub async fn build(self) -> Result<VeepiacApp, VeepiacAppError> {
        let Self {
            config: config_builder,
        } = self;
        let config = config_builder.build()?;

        let db = Database::open(config.database()).await?;
        let generator = MediaGenerator::new(&config, Arc::new(db));

        let app = VeepiacApp { config, generator };
        log::trace!("{:#?}", app);
        Ok(app)
    }
}

#[derive(Debug)]
pub struct VeepiacApp {
    pub config: veepiac_config::VeepiacConfig,
    pub generator: MediaGenerator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generator_follows_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConfigBuilder::new_test_config(dir.path()).unwrap();
        let db = Arc::new(Database::memory().await.unwrap());
        let app = VeepiacApp {
            generator: MediaGenerator::new(&config, db),
            config,
        };
        assert_eq!(app.generator.store().root(), app.config.output_root());
        assert_eq!(
            app.generator.locator().static_root(),
            app.config.static_root()
        );
    }

    #[tokio::test]
    async fn build_app_from_user_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = VeepiacBuilder {
            config: ConfigBuilder::new_with_dirs(dir.path(), dir.path()).unwrap(),
        }
        .update(|c| c.output_root(Some(&dir.path().join("out"))))
        .unwrap()
        .build()
        .await
        .unwrap();
        assert_eq!(app.config.output_root(), dir.path().join("out"));
        assert!(dir.path().join("subtitles.db").exists());
    }
}
