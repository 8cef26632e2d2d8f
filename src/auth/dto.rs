use serde::Deserialize;

/// Form body for user registration. Fields default to empty so a missing
/// field becomes a 400 from our validation rather than a deserialize
/// rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirmPassword")]
    pub confirm_password: String,
}

/// Form body for login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_form_accepts_camel_case_confirm_field() {
        let form: RegisterForm = serde_urlencoded::from_str(
            "name=Alice&email=a%40x.com&password=pw123&confirmPassword=pw123",
        )
        .unwrap();
        assert_eq!(form.name.as_deref(), Some("Alice"));
        assert_eq!(form.email, "a@x.com");
        assert_eq!(form.confirm_password, "pw123");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let form: RegisterForm = serde_urlencoded::from_str("name=Alice").unwrap();
        assert!(form.email.is_empty());
        assert!(form.password.is_empty());
    }
}
