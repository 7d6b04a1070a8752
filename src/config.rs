//! Configuration loading for queuebot.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::transport::{Author, MessageContent, RichMessage};

/// Get the queuebot home directory (~/.queuebot).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".queuebot"))
}

/// Get the default settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from `path`, or ~/.queuebot/settings.json when `None`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_settings_path()?,
    };

    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}. Run 'queuebot setup' first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Write default settings to `path`. Refuses to overwrite unless `force`.
pub fn write_default_settings(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "Settings file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&Settings::default())?;
    std::fs::write(path, content)?;
    tracing::info!("Wrote default settings to {}", path.display());
    Ok(())
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.prefix.is_empty() {
        return Err(Error::Config("prefix must not be empty".to_string()));
    }
    if settings.prefix.chars().any(char::is_whitespace) {
        return Err(Error::Config(format!(
            "prefix '{}' must not contain whitespace",
            settings.prefix
        )));
    }
    if settings.admin_roles.is_empty() {
        tracing::warn!("No admin roles configured; queue add/remove will be refused for everyone");
    }
    Ok(())
}

/// Text used for the queue and help messages.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DisplaySettings {
    #[serde(default = "default_queue_title")]
    pub queue_title: String,
    #[serde(default = "default_help_title")]
    pub help_title: String,
    #[serde(default = "default_help_description")]
    pub help_description: String,
    pub author_name: Option<String>,
    pub author_link: Option<String>,
    #[serde(default = "default_footer_text")]
    pub footer_text: String,
}

fn default_queue_title() -> String {
    "Queue".to_string()
}

fn default_help_title() -> String {
    "Queue Commands".to_string()
}

fn default_help_description() -> String {
    "Join the queue and wait for your turn.".to_string()
}

fn default_footer_text() -> String {
    "Queue Bot v".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            queue_title: default_queue_title(),
            help_title: default_help_title(),
            help_description: default_help_description(),
            author_name: None,
            author_link: None,
            footer_text: default_footer_text(),
        }
    }
}

impl DisplaySettings {
    fn author(&self) -> Option<Author> {
        self.author_name.as_ref().map(|name| Author {
            name: name.clone(),
            link: self.author_link.clone(),
        })
    }

    fn footer(&self) -> String {
        format!("{}{}", self.footer_text, env!("CARGO_PKG_VERSION"))
    }

    /// Wrap a rendered queue body in the queue message template.
    pub fn queue_message(&self, body: String, rich: bool) -> MessageContent {
        if !rich {
            return MessageContent::Plain(body);
        }
        MessageContent::Rich(RichMessage {
            title: self.queue_title.clone(),
            author: self.author(),
            description: body,
            fields: Vec::new(),
            footer: Some(self.footer()),
        })
    }

    /// Static help message listing the queue commands.
    pub fn help_message(&self, prefix: &str, rich: bool) -> MessageContent {
        let fields = vec![
            ("Join the queue".to_string(), format!("{}queue join", prefix)),
            ("Leave the queue".to_string(), format!("{}queue leave", prefix)),
            (
                "See how long you have been in the queue".to_string(),
                format!("{}queue time [m|h|d]", prefix),
            ),
            (
                "Add or remove someone (admins)".to_string(),
                format!("{p}queue add <user>, {p}queue remove <user>", p = prefix),
            ),
            (
                "Get a list of available commands".to_string(),
                format!("{p}queue commands or {p}queue help", p = prefix),
            ),
        ];

        if rich {
            return MessageContent::Rich(RichMessage {
                title: self.help_title.clone(),
                author: self.author(),
                description: self.help_description.clone(),
                fields,
                footer: Some(self.footer()),
            });
        }

        let mut text = format!("{}\n{}\n", self.help_title, self.help_description);
        for (name, value) in fields {
            text.push_str(&format!("\n{}: {}", name, value));
        }
        MessageContent::Plain(text)
    }
}

/// queuebot settings.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    /// Telegram bot token
    pub bot_token: Option<String>,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Role names allowed to add/remove other users
    #[serde(default = "default_admin_roles")]
    pub admin_roles: Vec<String>,

    #[serde(default = "default_use_rich_rendering")]
    pub use_rich_rendering: bool,

    #[serde(default)]
    pub display: DisplaySettings,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_admin_roles() -> Vec<String> {
    vec!["owner".to_string(), "administrator".to_string()]
}

fn default_use_rich_rendering() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot_token: None,
            prefix: default_prefix(),
            admin_roles: default_admin_roles(),
            use_rich_rendering: default_use_rich_rendering(),
            display: DisplaySettings::default(),
        }
    }
}

impl Settings {
    pub fn admin_role_set(&self) -> HashSet<String> {
        self.admin_roles.iter().cloned().collect()
    }

    /// Copy with the bot token masked, for display.
    pub fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        if copy.bot_token.is_some() {
            copy.bot_token = Some("********".to_string());
        }
        copy
    }
}
