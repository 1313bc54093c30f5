use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{
    validate_endpoint_path, validate_non_empty_string, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub navigation: NavigationConfig,
    pub scroll: ScrollConfig,
    pub contact_form: ContactFormConfig,
    pub carousel: CarouselConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub name: String,
    pub base_url: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "RacketPro Web".to_string(),
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Viewports at or below this width get the mobile menu toggle.
    pub mobile_breakpoint_px: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint_px: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Height of the fixed header kept clear above a scroll target.
    pub header_offset_px: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            header_offset_px: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFormConfig {
    pub endpoint_path: String,
    pub required_fields: Vec<String>,
    pub busy_label: String,
    pub validation_alert: String,
    pub failure_alert: String,
    pub success_heading: String,
    /// `{name}` is replaced with the submitted name.
    pub success_body: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for ContactFormConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/api/leads".to_string(),
            required_fields: vec![
                "name".to_string(),
                "email".to_string(),
                "message".to_string(),
            ],
            busy_label: "Sending Message...".to_string(),
            validation_alert: "Please fill in all required fields.".to_string(),
            failure_alert: "Something went wrong. Please try calling us directly.".to_string(),
            success_heading: "Inquiry Received!".to_string(),
            success_body:
                "Thanks {name}, our professional stringing team will contact you within 24 hours."
                    .to_string(),
            timeout_seconds: None,
        }
    }
}

impl ContactFormConfig {
    pub fn success_message(&self, name: &str) -> String {
        self.success_body.replace("{name}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub autoplay: bool,
    pub interval_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            interval_ms: 5000,
        }
    }
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未填的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SiteError::ConfigError {
            message: format!("TOML serialization error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LEADS_BASE_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SiteError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Full URL the contact form posts to.
    pub fn lead_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.site.base_url.trim_end_matches('/'),
            self.contact_form.endpoint_path
        )
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("site.base_url", &self.site.base_url)?;
        validate_endpoint_path("contact_form.endpoint_path", &self.contact_form.endpoint_path)?;
        validate_range(
            "navigation.mobile_breakpoint_px",
            self.navigation.mobile_breakpoint_px,
            1,
            10_000,
        )?;
        validate_range("scroll.header_offset_px", self.scroll.header_offset_px, 0.0, 1_000.0)?;
        validate_non_empty_string("contact_form.busy_label", &self.contact_form.busy_label)?;
        for field in &self.contact_form.required_fields {
            validate_non_empty_string("contact_form.required_fields", field)?;
        }
        if let Some(timeout) = self.contact_form.timeout_seconds {
            validate_positive_number("contact_form.timeout_seconds", timeout, 1)?;
        }
        if self.carousel.autoplay {
            validate_positive_number("carousel.interval_ms", self.carousel.interval_ms, 1)?;
        }
        Ok(())
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
