use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Casebook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
/// ~/Casebook/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Casebook")
}

/// Default location of the durable casebook store
pub fn default_store_path() -> PathBuf {
    app_data_dir().join("casebook.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Casebook"));
    }

    #[test]
    fn store_path_under_app_data() {
        let path = default_store_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("casebook.db"));
    }

    #[test]
    fn app_name_is_casebook() {
        assert_eq!(APP_NAME, "Casebook");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn log_filter_names_the_crate() {
        assert!(default_log_filter().contains("casebook=debug"));
    }
}
