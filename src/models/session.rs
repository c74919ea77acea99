use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserType {
    #[default]
    #[serde(alias = "employee")]
    Employee,
    #[serde(alias = "administrator", alias = "Admin", alias = "admin")]
    Administrator,
}

/// The connected user. Built once at start-up and handed to every container.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    pub email: String,
}

impl Session {
    #[cfg(test)]
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user_type: UserType::Employee,
            email: email.into(),
        }
    }
}
