use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "veepiac";
const APP: &str = "veepiac";
const APP_CAPS: &str = "VEEPIAC";

const DATABASE_KEY: &str = "database";
const DEFAULT_DB_NAME: &str = "subtitles.db";

const STATIC_ROOT_KEY: &str = "static_root";
const STATIC_DIR: &str = "static";

const OUTPUT_ROOT_KEY: &str = "output_root";
const OUTPUT_DIR: &str = "media_output";

const FONT_DIR_KEY: &str = "font_dir";
const FONT_DIR: &str = "fonts";
const DEFAULT_FONT_KEY: &str = "default_font";
const DEFAULT_FONT: &str = "impact";

const BASE_URL_KEY: &str = "base_url";
const DEFAULT_BASE_URL: &str = "https://cdn.veepiac.com";

const EXPIRY_DAYS_KEY: &str = "file_expiry_days";
const DEFAULT_EXPIRY_DAYS: i64 = 7;

const FFMPEG_CMD_KEY: &str = "ffmpeg";
const TRANSCODE_TIMEOUT_KEY: &str = "transcode_timeout_secs";
const DEFAULT_TRANSCODE_TIMEOUT_SECS: i64 = 300;

const MAX_GIF_FRAMES_KEY: &str = "max_gif_frames";
const DEFAULT_MAX_GIF_FRAMES: i64 = 600;

const DEFAULT_CONFIG_FILE: &str = "veepiac.toml";

type ExtConfigBuilder = config::ConfigBuilder<config::builder::DefaultState>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),
    #[error("unable to get user home directory")]
    NoUserHome,
    #[error("path is not utf8: {:?}", _0)]
    NonUtf8Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_dir: Utf8PathBuf,
    config_path: Option<Utf8PathBuf>,
    load_environment: bool,
    config_builder: ExtConfigBuilder,
}

fn camino_path(std_path: &Path) -> Result<&Utf8Path, ConfigError> {
    Utf8Path::from_path(std_path).ok_or_else(|| ConfigError::NonUtf8Path(std_path.to_path_buf()))
}

fn new_config_builder(data_dir: &Utf8Path) -> Result<ExtConfigBuilder, ConfigError> {
    Ok(config::Config::builder()
        .set_default(FFMPEG_CMD_KEY, Option::<&str>::None)?
        .set_default(STATIC_ROOT_KEY, data_dir.join(STATIC_DIR).as_str())?
        .set_default(OUTPUT_ROOT_KEY, data_dir.join(OUTPUT_DIR).as_str())?
        .set_default(FONT_DIR_KEY, data_dir.join(FONT_DIR).as_str())?
        .set_default(DATABASE_KEY, data_dir.join(DEFAULT_DB_NAME).as_str())?
        .set_default(DEFAULT_FONT_KEY, DEFAULT_FONT)?
        .set_default(BASE_URL_KEY, DEFAULT_BASE_URL)?
        .set_default(EXPIRY_DAYS_KEY, DEFAULT_EXPIRY_DAYS)?
        .set_default(TRANSCODE_TIMEOUT_KEY, DEFAULT_TRANSCODE_TIMEOUT_SECS)?
        .set_default(MAX_GIF_FRAMES_KEY, DEFAULT_MAX_GIF_FRAMES)?)
}

impl ConfigBuilder {
    #[cfg(test)]
    pub fn new_test_config(root: &Path) -> Result<VeepiacConfig, ConfigError> {
        let root = camino_path(root)?;
        let data_dir = root.join("app_data_dir");
        let settings = new_config_builder(&data_dir)?
            .set_override(FFMPEG_CMD_KEY, "no_ffmpeg_in_tests")?
            .set_override(BASE_URL_KEY, "https://cdn.test/")?
            .build()?
            .try_deserialize()?;
        Ok(VeepiacConfig { settings })
    }

    pub fn new_with_user_dirs() -> Result<Self, ConfigError> {
        let dirs = directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APP)
            .ok_or(ConfigError::NoUserHome)?;
        Self::new_with_dirs(dirs.data_dir(), dirs.config_dir())
    }

    /// Defaults are placed under `data_dir`, `veepiac.toml` is looked up in `config_dir`.
    pub fn new_with_dirs(data_dir: &Path, config_dir: &Path) -> Result<Self, ConfigError> {
        let data_dir = camino_path(data_dir)?;
        let config_dir = camino_path(config_dir)?.to_path_buf();
        let config_builder = new_config_builder(data_dir)?;
        let builder = Self {
            load_environment: false,
            config_path: None,
            config_dir,
            config_builder,
        };

        Ok(builder)
    }

    /// Should we load configuration from the environment?
    pub fn load_environment(mut self, load_environment: bool) -> Self {
        self.load_environment = load_environment;
        self
    }

    fn set_path_override(mut self, key: &str, path: Option<&Path>) -> Result<Self, ConfigError> {
        let path_override = path.map(camino_path).transpose()?;
        let str_override = path_override.as_ref().map(|c| c.as_str());
        self.config_builder = self
            .config_builder
            .set_override_option(key, str_override)?;
        Ok(self)
    }

    pub fn config_file(mut self, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        self.config_path = config_file
            .map(|p| camino_path(p).map(|p| p.to_path_buf()))
            .transpose()?;
        Ok(self)
    }

    pub fn static_root(self, static_root: Option<&Path>) -> Result<Self, ConfigError> {
        self.set_path_override(STATIC_ROOT_KEY, static_root)
    }

    pub fn output_root(self, output_root: Option<&Path>) -> Result<Self, ConfigError> {
        self.set_path_override(OUTPUT_ROOT_KEY, output_root)
    }

    pub fn font_dir(self, font_dir: Option<&Path>) -> Result<Self, ConfigError> {
        self.set_path_override(FONT_DIR_KEY, font_dir)
    }

    pub fn database_path(self, database_path: Option<&Path>) -> Result<Self, ConfigError> {
        self.set_path_override(DATABASE_KEY, database_path)
    }

    pub fn ffmpeg_override(self, ffmpeg: Option<&Path>) -> Result<Self, ConfigError> {
        self.set_path_override(FFMPEG_CMD_KEY, ffmpeg)
    }

    pub fn base_url(mut self, base_url: Option<&str>) -> Result<Self, ConfigError> {
        self.config_builder = self
            .config_builder
            .set_override_option(BASE_URL_KEY, base_url)?;
        Ok(self)
    }

    pub fn build(mut self) -> Result<VeepiacConfig, ConfigError> {
        let cfg_file = self
            .config_path
            .unwrap_or_else(|| self.config_dir.join(DEFAULT_CONFIG_FILE));

        if cfg_file.exists() {
            log::debug!("loading config file {}", cfg_file);
            self.config_builder = self
                .config_builder
                .add_source(config::File::from(cfg_file.as_std_path()));
        }

        if self.load_environment {
            self.config_builder = self
                .config_builder
                .add_source(config::Environment::with_prefix(APP_CAPS))
        }

        let veepiac_cfg = VeepiacConfig {
            settings: self.config_builder.build()?.try_deserialize()?,
        };
        log::trace!("{:#?}", veepiac_cfg);
        Ok(veepiac_cfg)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Settings {
    static_root: PathBuf,
    output_root: PathBuf,
    font_dir: PathBuf,
    default_font: String,
    base_url: String,
    file_expiry_days: u32,
    database: String,
    ffmpeg: Option<PathBuf>,
    transcode_timeout_secs: u64,
    max_gif_frames: u64,
}

#[derive(Debug, Clone)]
pub struct VeepiacConfig {
    settings: Settings,
}

impl VeepiacConfig {
    /// Root of the frame and video archive.
    pub fn static_root(&self) -> &Path {
        &self.settings.static_root
    }
    /// Root of generated memes, gifs and clips.
    pub fn output_root(&self) -> &Path {
        &self.settings.output_root
    }
    pub fn font_dir(&self) -> &Path {
        &self.settings.font_dir
    }
    pub fn default_font(&self) -> &str {
        &self.settings.default_font
    }
    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }
    /// How long the external sweeper keeps artifacts around.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.settings.file_expiry_days as i64)
    }
    pub fn database(&self) -> &str {
        &self.settings.database
    }
    pub fn ffmpeg(&self) -> crate::ffmpeg::FFMpegBinary {
        crate::ffmpeg::FFMpegBinary::from(self.settings.ffmpeg.clone())
    }
    pub fn transcode_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.transcode_timeout_secs)
    }
    pub fn max_gif_frames(&self) -> u64 {
        self.settings.max_gif_frames
    }
}
