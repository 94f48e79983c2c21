use serde::Deserialize;

/// `/` query parameters; `flash` carries a flash code
#[derive(Deserialize, Debug, Default)]
pub struct WelcomeParams {
    pub flash: Option<String>,
}

/// `/contact` query parameters; `error` names the field that failed
#[derive(Deserialize, Debug, Default)]
pub struct ContactPageParams {
    pub error: Option<String>,
}

/// Urlencoded contact form; absent fields are reported, not rejected
#[derive(Deserialize, Debug, Default)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
