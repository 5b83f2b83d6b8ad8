use log::{error, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─── Persisted config ────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// OAuth client id of the implicit-grant app registered in the org.
    pub client_id: String,
    /// Must point at a loopback address; the login listener binds to it.
    pub redirect_uri: String,
    /// Platform region, e.g. `mypurecloud.com` or `usw2.pure.cloud`.
    pub region: String,
    pub translate_service_uri: String,
    /// Value for `{{AGENT_ALIAS}}` in canned responses. Empty leaves it unresolved.
    pub agent_alias: String,
    pub persist_token: bool,
    pub font_name: String,
    pub font_size: f32,
    pub theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: "http://localhost:8085/email".into(),
            region: "mypurecloud.com".into(),
            translate_service_uri: "http://localhost:3000/translate".into(),
            agent_alias: String::new(),
            persist_token: true,
            font_name: "segoeui".into(),
            font_size: 18.0,
            theme: "Dark".into(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl AppConfig {
    pub fn load() -> Self {
        let path = config_dir().join("config.toml");
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                info!("Loaded config from {}", path.display());
                Self::parse(&content)
            }
            Err(_) => {
                info!("No config file found, creating default config");
                let config = Self::default();
                config.save();
                config
            }
        }
    }

    fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_else(|e| {
            error!("Invalid config file, using defaults: {}", e);
            Self::default()
        })
    }

    pub fn save(&self) {
        let path = config_dir().join("config.toml");
        match toml::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = std::fs::write(&path, content) {
                    error!("Failed to save config: {}", e);
                }
            }
            Err(e) => error!("Failed to serialize config: {}", e),
        }
    }

    pub fn api_base_url(&self) -> String {
        format!("https://api.{}", self.region.trim())
    }

    pub fn login_base_url(&self) -> String {
        format!("https://login.{}", self.region.trim())
    }

    pub fn agent_alias(&self) -> Option<String> {
        let alias = self.agent_alias.trim();
        (!alias.is_empty()).then(|| alias.to_string())
    }
}

// ─── Font discovery ──────────────────────────────────────────────────

pub struct FontEntry {
    pub name: String,
    pub path: String,
}

pub fn discover_system_fonts() -> Vec<FontEntry> {
    let mut fonts = Vec::new();

    let dirs: &[&str] = if cfg!(windows) {
        &["C:\\Windows\\Fonts"]
    } else {
        &[
            "/usr/share/fonts/truetype",
            "/usr/share/fonts/TTF",
            "/usr/share/fonts/truetype/dejavu",
        ]
    };

    for dir in dirs {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let is_ttf = path
                .extension()
                .map_or(false, |e| e.to_string_lossy().eq_ignore_ascii_case("ttf"));
            if is_ttf {
                let name = path
                    .file_stem()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .into_owned();
                fonts.push(FontEntry {
                    name,
                    path: path.to_string_lossy().into_owned(),
                });
            }
        }
    }

    fonts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    info!("Discovered {} system fonts", fonts.len());
    fonts
}
